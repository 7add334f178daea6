//! Hitchyard web application.
//!
//! Shippers post freight loads, carriers bid on them and apply for vetting.
//! All persistence and identity live in a hosted Supabase project; this
//! crate renders pages, guards every mutating action with a fresh identity
//! check and forwards the write.
//!
//! # Architecture
//!
//! - Axum web framework with HTMX for the lazy tables and bid toasts
//! - Askama templates for server-side rendering
//! - Supabase `PostgREST` for the `loads`, `bids`, `user_profiles` and
//!   `vetting_requests` tables
//! - Supabase `GoTrue` for signup, login and token verification
//! - A CRM webhook notified of new vetting requests

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod supabase;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
