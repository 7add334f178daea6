//! Hitchyard Core - Shared domain types.
//!
//! This crate provides the value types used by the Hitchyard web application:
//! type-safe IDs for users, loads, bids and vetting requests, plus validated
//! wrappers for the form inputs the marketplace accepts (emails, ZIP codes,
//! load weights and dollar amounts).
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Validation
//! lives here so the web crate can reject bad input before any remote call.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, ZIP codes, weights, money and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
