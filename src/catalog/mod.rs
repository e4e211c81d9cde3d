//! Card reference data.
//!
//! ## Module Structure
//!
//! - `card`: card records as served by ThronesDB
//! - `faction`: the nine factions with their colors and icons
//! - `store`: the in-memory catalog and its lookups
//! - `fetch`: startup download of the dataset

pub mod card;
pub mod faction;
pub mod fetch;
pub mod store;

pub use card::{Card, CardType, Stat};
pub use faction::Faction;
pub use fetch::fetch_catalog;
pub use store::CardCatalog;
