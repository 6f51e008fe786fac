//! HTTP handlers for the Fragrance Production Engine

pub mod health;
pub mod production;

pub use health::health_check;
pub use production::*;
