//! # lingo-client
//!
//! Client-side library for the Lingo messaging application: the REST API
//! client, a session-scoped store with optimistic local updates and
//! inspectable write intents, outgoing-message composition (translation
//! included), durable local preferences, and the in-memory fallback user
//! set for offline mode.
//!
//! The UI layer proper (rendering, input) sits on top of this crate and is
//! out of scope here; everything below the projection/session boundary
//! lives in these modules.

pub mod api;
pub mod compose;
pub mod fallback;
pub mod prefs;
pub mod session;

mod error;

pub use api::ApiClient;
pub use error::{ApiError, PrefsError};
pub use prefs::Prefs;
pub use session::{Session, SessionError, WriteIntent};
