pub mod models;
pub mod store;

pub use models::{LineItem, ProductSnapshot};
pub use store::CartStore;
