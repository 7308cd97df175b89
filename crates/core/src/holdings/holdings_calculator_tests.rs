#[cfg(test)]
mod tests {
    use crate::errors::{CalculatorError, Error};
    use crate::holdings::{compute_holding, HoldingStatus, PositionState};
    use crate::transactions::{Transaction, TransactionType};
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn create_transaction(
        id: &str,
        date: NaiveDate,
        transaction_type: TransactionType,
        shares: Decimal,
        cost_per_share: Decimal,
    ) -> Transaction {
        Transaction {
            id: id.to_string(),
            portfolio_id: "pf-main".to_string(),
            asset_id: "AAPL".to_string(),
            currency_id: "USD".to_string(),
            date,
            transaction_type,
            shares,
            cost_per_share,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn buy(id: &str, d: u32, shares: Decimal, price: Decimal) -> Transaction {
        create_transaction(id, day(d), TransactionType::Buy, shares, price)
    }

    fn sell(id: &str, d: u32, shares: Decimal, price: Decimal) -> Transaction {
        create_transaction(id, day(d), TransactionType::Sell, shares, price)
    }

    #[test]
    fn test_empty_history_is_a_no_op() {
        assert!(compute_holding(&[]).unwrap().is_none());
    }

    #[test]
    fn test_single_buy() {
        let snapshot = compute_holding(&[buy("b1", 1, dec!(10), dec!(100))])
            .unwrap()
            .unwrap();

        assert_eq!(snapshot.portfolio_id, "pf-main");
        assert_eq!(snapshot.asset_id, "AAPL");
        assert_eq!(snapshot.currency_id, "USD");
        assert_eq!(snapshot.shares, dec!(10));
        assert_eq!(snapshot.average_cost, dec!(100));
        assert_eq!(snapshot.transactions_count, 1);
        assert_eq!(snapshot.status, HoldingStatus::Active);
        assert_eq!(snapshot.removed_at, None);
    }

    #[test]
    fn test_weighted_average_of_two_buys() {
        let snapshot = compute_holding(&[
            buy("b1", 1, dec!(10), dec!(100)),
            buy("b2", 2, dec!(5), dec!(120)),
        ])
        .unwrap()
        .unwrap();

        let expected = (dec!(10) * dec!(100) + dec!(5) * dec!(120)) / (dec!(10) + dec!(5));
        assert_eq!(snapshot.shares, dec!(15));
        assert_eq!(snapshot.average_cost, expected);
    }

    #[test]
    fn test_partial_sell_keeps_average_cost_unchanged() {
        let b1 = buy("b1", 1, dec!(10), dec!(100));
        let b2 = buy("b2", 2, dec!(3), dec!(117.37));
        let s1 = sell("s1", 3, dec!(4), dec!(150));

        let mut state = PositionState::new("USD");
        state.apply(&b1).unwrap();
        state.apply(&b2).unwrap();
        let before = state.clone();

        state.apply(&s1).unwrap();

        assert_eq!(state.shares, dec!(9));
        assert_eq!(state.average_cost, before.average_cost);
        assert_eq!(
            state.average_cost.unwrap().serialize(),
            before.average_cost.unwrap().serialize()
        );
        assert_eq!(state.total_cost_bought, before.total_cost_bought);
        assert_eq!(state.total_shares_bought, before.total_shares_bought);
    }

    #[test]
    fn test_full_liquidation_removes_holding() {
        let snapshot = compute_holding(&[
            buy("b1", 1, dec!(10), dec!(100)),
            buy("b2", 2, dec!(5), dec!(120)),
            sell("s1", 3, dec!(15), dec!(130)),
        ])
        .unwrap()
        .unwrap();

        assert_eq!(snapshot.shares, Decimal::ZERO);
        assert_eq!(snapshot.status, HoldingStatus::Removed);
        assert_eq!(snapshot.average_cost, Decimal::ZERO);
        assert_eq!(snapshot.transactions_count, 3);
        assert_eq!(snapshot.removed_at, Some(day(3)));
    }

    #[test]
    fn test_rebuy_after_liquidation_starts_fresh_average() {
        let snapshot = compute_holding(&[
            buy("b1", 1, dec!(10), dec!(100)),
            buy("b2", 2, dec!(5), dec!(120)),
            sell("s1", 3, dec!(15), dec!(130)),
            buy("b3", 4, dec!(8), dec!(90)),
        ])
        .unwrap()
        .unwrap();

        assert_eq!(snapshot.shares, dec!(8));
        assert_eq!(snapshot.average_cost, dec!(90));
        assert_eq!(snapshot.status, HoldingStatus::Active);
        assert_eq!(snapshot.removed_at, None);
        assert_eq!(snapshot.transactions_count, 4);
    }

    #[test]
    fn test_buy_after_partial_sell_keeps_running_totals() {
        // Running totals are only reset by a full liquidation.
        let snapshot = compute_holding(&[
            buy("b1", 1, dec!(10), dec!(100)),
            sell("s1", 2, dec!(5), dec!(110)),
            buy("b2", 3, dec!(10), dec!(130)),
        ])
        .unwrap()
        .unwrap();

        assert_eq!(snapshot.shares, dec!(15));
        assert_eq!(snapshot.average_cost, dec!(2300) / dec!(20));
    }

    #[test]
    fn test_same_day_buy_is_absorbed_before_sell() {
        // Unsorted input: a same-day SELL listed before the BUY it depends on.
        let snapshot = compute_holding(&[
            sell("s1", 2, dec!(15), dec!(130)),
            buy("b2", 2, dec!(5), dec!(120)),
            buy("b1", 1, dec!(10), dec!(100)),
        ])
        .unwrap()
        .unwrap();

        assert_eq!(snapshot.status, HoldingStatus::Removed);
        assert_eq!(snapshot.removed_at, Some(day(2)));
    }

    #[test]
    fn test_oversell_is_rejected() {
        let result = compute_holding(&[
            buy("b1", 1, dec!(10), dec!(100)),
            sell("s1", 2, dec!(11), dec!(100)),
        ]);

        match result {
            Err(Error::Calculation(CalculatorError::InsufficientShares {
                held, sold, date, ..
            })) => {
                assert_eq!(held, dec!(10));
                assert_eq!(sold, dec!(11));
                assert_eq!(date, day(2));
            }
            other => panic!("Expected InsufficientShares, got {:?}", other),
        }
    }

    #[test]
    fn test_sell_without_position_is_rejected() {
        let result = compute_holding(&[sell("s1", 1, dec!(1), dec!(100))]);
        assert!(matches!(
            result,
            Err(Error::Calculation(CalculatorError::InsufficientShares { .. }))
        ));
    }

    #[test]
    fn test_mixed_positions_are_rejected() {
        let mut other = buy("b2", 2, dec!(1), dec!(10));
        other.asset_id = "MSFT".to_string();

        let result = compute_holding(&[buy("b1", 1, dec!(1), dec!(10)), other]);
        assert!(matches!(
            result,
            Err(Error::Calculation(CalculatorError::MixedPositions { .. }))
        ));
    }

    #[test]
    fn test_non_positive_shares_are_rejected() {
        let result = compute_holding(&[buy("b1", 1, Decimal::ZERO, dec!(10))]);
        assert!(matches!(
            result,
            Err(Error::Calculation(CalculatorError::InvalidTransaction(_)))
        ));
    }

    #[test]
    fn test_buy_amount_overflow_is_a_calculation_error() {
        let huge = Decimal::from_i128_with_scale(10i128.pow(20), 0);
        let mut state = PositionState::new("USD");
        state.apply(&buy("b1", 1, dec!(10), dec!(100))).unwrap();
        let before = state.clone();

        let result = state.apply(&buy("b2", 2, huge, huge));

        assert!(matches!(
            result,
            Err(Error::Calculation(CalculatorError::Calculation(_)))
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_share_total_overflow_is_a_calculation_error() {
        let result = compute_holding(&[
            buy("b1", 1, Decimal::MAX, Decimal::ZERO),
            buy("b2", 2, Decimal::MAX, Decimal::ZERO),
        ]);

        assert!(matches!(
            result,
            Err(Error::Calculation(CalculatorError::Calculation(_)))
        ));
    }

    #[test]
    fn test_zero_cost_buy_lowers_average() {
        let snapshot = compute_holding(&[
            buy("b1", 1, dec!(10), dec!(100)),
            buy("bonus", 2, dec!(10), Decimal::ZERO),
        ])
        .unwrap()
        .unwrap();

        assert_eq!(snapshot.average_cost, dec!(50));
    }

    #[test]
    fn test_currency_comes_from_first_transaction() {
        let mut later = buy("b2", 2, dec!(1), dec!(10));
        later.currency_id = "EUR".to_string();

        let snapshot = compute_holding(&[later, buy("b1", 1, dec!(1), dec!(10))])
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.currency_id, "USD");
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let history = vec![
            buy("b1", 1, dec!(3), dec!(33.33)),
            buy("b2", 1, dec!(7), dec!(41.07)),
            sell("s1", 2, dec!(4), dec!(50)),
            buy("b3", 5, dec!(1.5), dec!(39.99)),
        ];

        let first = compute_holding(&history).unwrap();
        let second = compute_holding(&history).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_helpers() {
        let snapshot = compute_holding(&[
            buy("b1", 1, dec!(1), dec!(10)),
            buy("b2", 2, dec!(2), dec!(10.01)),
        ])
        .unwrap()
        .unwrap();

        assert_eq!(snapshot.id(), "pf-main_AAPL");
        assert!(snapshot.is_active());
        assert_eq!(snapshot.display_average_cost(), dec!(10.006667));
        assert_eq!(snapshot.cost_basis(), dec!(30.02));
    }
}
