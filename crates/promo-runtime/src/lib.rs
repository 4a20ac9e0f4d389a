#![deny(warnings)]

//! Explicit state containers for the pricing simulator and comparison screens.
//!
//! Seeds are loaded once and never mutated. Every edit goes through a store
//! method which recomputes the affected derived fields before returning, so
//! reads never trigger recomputation.

pub mod session;
pub mod store;

pub use session::ComparisonSession;
pub use store::{PortfolioTotals, ProductRow, SimulationStore};

use promo_core::{ProductId, ValidationError};
use thiserror::Error;

/// Errors raised by the state containers.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// No product with this id was seeded.
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),
    /// No column with this id is in the comparison set.
    #[error("unknown comparison column: {0}")]
    UnknownColumn(String),
    /// Only boolean attributes can be toggled.
    #[error("attribute {attribute} of {column} is not a yes/no value")]
    NotAFlag { column: String, attribute: String },
    /// Seed data or configuration failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
