//! Wire types exchanged with the library backend.
//!
//! The backend is authoritative for all of these records; the client only
//! reads the fields it needs for filtering and display.

mod auth;
mod book;
mod borrow;
mod profile;
mod user;

pub use auth::*;
pub use book::*;
pub use borrow::*;
pub use profile::*;
pub use user::*;

/// Identifier type used by every backend record.
pub type RecordId = i64;
