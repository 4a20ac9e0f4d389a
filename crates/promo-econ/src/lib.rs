#![deny(warnings)]

//! Economic models: price elasticity projection and margin helpers.
//!
//! This crate provides pure, deterministic utilities for:
//! - Projecting units and revenue after a price change under a constant
//!   elasticity approximation
//! - Current versus projected gross margin and gross profit
//! - Rounding and display formatting shared by both

pub mod elasticity;
pub mod margin;
pub mod rounding;

pub use elasticity::{project_price_change, project_raw, Projection};
pub use margin::{compute_margin, markup_pct, price_for_target_margin, MarginResult};

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by economic helpers.
///
/// The projection and margin calculators never fail for domain input; these
/// are reserved for helpers with a genuinely undefined result.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Target margin must be within [0, 100).
    #[error("target margin {0}% is unreachable")]
    UnreachableMargin(Decimal),
    /// Cost must be non-negative.
    #[error("invalid cost value")]
    InvalidCost,
    /// Arithmetic exceeded the decimal range.
    #[error("decimal overflow")]
    Overflow,
}
