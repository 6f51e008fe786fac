//! Domain models for the fragrance production engine

mod batch_yield;
mod catalog;
mod cost;
mod distribution;
mod formula;
mod order;
mod quality;
mod reservation;

pub use batch_yield::*;
pub use catalog::*;
pub use cost::*;
pub use distribution::*;
pub use formula::*;
pub use order::*;
pub use quality::*;
pub use reservation::*;
