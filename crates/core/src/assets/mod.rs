//! Assets module - reference records and the lookup collaborator.

mod assets_model;
mod assets_traits;

pub use assets_model::{find_asset_for_code, AssetRecord};
pub use assets_traits::AssetLookupTrait;
