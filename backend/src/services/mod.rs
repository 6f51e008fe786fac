//! Business logic services for the Fragrance Production Engine

pub mod pg_store;
pub mod production;
pub mod store;

pub use pg_store::PgStore;
pub use production::{CreateOrderInput, ProductionService};
pub use store::{CatalogSource, InMemoryStore, OrderStore};
