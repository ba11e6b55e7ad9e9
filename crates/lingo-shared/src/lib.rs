//! # lingo-shared
//!
//! Domain types shared between the Lingo server, store, and client crates.
//!
//! Everything in here is pure: conversation-key derivation, the
//! nationality-to-language table, message payload validation, and the
//! viewer-dependent text projection.  No I/O, no clocks, no randomness.

pub mod locale;
pub mod projection;
pub mod thread;
pub mod types;

mod error;

pub use error::ValidationError;
pub use thread::conversation_key;
pub use types::*;
