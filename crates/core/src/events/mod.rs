//! Domain events module.
//!
//! Provides domain event types and the sink trait used to publish them.
//! Services emit transaction and holding events after successful writes;
//! the import session emits stage, row and step transitions as they happen.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
