//! Tracking-session lifecycle.
//!
//! `SessionManager` is not internally synchronized. Lifecycle calls arrive from the
//! host's lifecycle thread and `tick` from the render thread, so the two are
//! serialized through [`SharedSession`].

mod manager;

pub use manager::{lock_session, SessionManager, SessionState, SharedSession};
