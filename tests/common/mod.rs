//! Common test infrastructure
//!
//! Tests import from this module only.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestApp, PARTY_ID};
//!
//! #[test]
//! fn test_song_bank_starts_empty() {
//!     let test_app = TestApp::with_party();
//!     assert!(test_app.app.song_bank().get_song_bank(PARTY_ID).unwrap().is_empty());
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::TestApp;
