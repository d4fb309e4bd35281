//! Core retention types, field formatting, validation, and voucher numbering.
//!
//! Everything here is synchronous and side-effect free; persistence of the
//! voucher counter belongs to the export engine.

mod builder;
pub mod concepts;
mod error;
pub mod format;
mod numbering;
mod types;
mod validation;

pub use builder::*;
pub use concepts::{ISLR_CONCEPTS, IslrConcept, islr_concept};
pub use error::*;
pub use format::*;
pub use numbering::*;
pub use types::*;
pub use validation::*;
