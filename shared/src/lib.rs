//! Shared types and the production engine for the Fragrance Production Engine
//!
//! This crate contains the manufacturing-order model and every pure
//! calculation over it, shared between the backend and the browser (via WASM).

pub mod lifecycle;
pub mod models;
pub mod planning;
pub mod types;
pub mod validation;

pub use lifecycle::*;
pub use models::*;
pub use planning::*;
pub use types::*;
pub use validation::*;
