use thiserror::Error;

use crate::session::SessionState;

/// Errors raised by the tracking backend or by lifecycle misuse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("tracking runtime installation is pending")]
    InstallationPending,

    #[error("tracking runtime is not installed")]
    RuntimeNotInstalled,

    #[error("device does not support world tracking")]
    DeviceIncompatible,

    #[error("tracking runtime is too old")]
    RuntimeOutdated,

    #[error("application is too old for the installed tracking runtime")]
    AppOutdated,

    #[error("camera is not available")]
    CameraUnavailable,

    #[error("`{op}` is not valid in session state {state:?}")]
    InvalidState { op: &'static str, state: SessionState },

    #[error("tracking backend error: {0}")]
    Backend(String),
}

impl SessionError {
    /// The AR feature cannot run on this device at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::DeviceIncompatible)
    }

    /// The user can fix this (install or update something).
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            SessionError::InstallationPending
                | SessionError::RuntimeNotInstalled
                | SessionError::RuntimeOutdated
                | SessionError::AppOutdated
        )
    }

    /// Retrying on a later frame may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, SessionError::CameraUnavailable)
    }

    /// Message a host may show to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::InstallationPending | SessionError::RuntimeNotInstalled => {
                "Please install the AR tracking service"
            }
            SessionError::RuntimeOutdated => "Please update the AR tracking service",
            SessionError::AppOutdated => "Please update this app",
            SessionError::DeviceIncompatible => "This device does not support AR",
            SessionError::CameraUnavailable => "Camera not available. Try restarting the app.",
            SessionError::InvalidState { .. } | SessionError::Backend(_) => {
                "Failed to create AR session"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_disjoint_for_key_kinds() {
        assert!(SessionError::DeviceIncompatible.is_fatal());
        assert!(!SessionError::DeviceIncompatible.is_user_actionable());

        assert!(SessionError::RuntimeOutdated.is_user_actionable());
        assert!(!SessionError::RuntimeOutdated.is_fatal());

        assert!(SessionError::CameraUnavailable.is_transient());
        assert!(!SessionError::CameraUnavailable.is_fatal());
    }

    #[test]
    fn invalid_state_names_the_operation() {
        let err = SessionError::InvalidState {
            op: "tick",
            state: SessionState::Paused,
        };
        assert_eq!(err.to_string(), "`tick` is not valid in session state Paused");
    }
}
