//! Domain models for the marketplace.
//!
//! Row types mirror the remote tables (`loads`, `bids`, `user_profiles`,
//! `vetting_requests`). `New*` types are what the flows insert; the plain
//! types are what listing reads back.

pub mod bid;
pub mod load;
pub mod profile;
pub mod session;
pub mod vetting;

pub use bid::NewBid;
pub use load::{Load, NewLoad};
pub use profile::UserProfile;
pub use session::{AccessToken, AuthenticatedUser, Identity, StoredAuth, keys as session_keys};
pub use vetting::NewVettingRequest;
