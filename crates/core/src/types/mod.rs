//! Core types for Hitchyard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;
pub mod weight;
pub mod zip;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{AmountError, UsdAmount};
pub use status::LoadStatus;
pub use weight::{Weight, WeightError};
pub use zip::{ZipCode, ZipCodeError};
