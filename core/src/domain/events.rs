//! Lifecycle events emitted by the token provider.

use std::fmt;

use crate::domain::entities::token::{OpaqueToken, TokenSet};

/// Why a refresh token is being invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidateAction {
    Refresh,
    Revoke,
}

impl fmt::Display for InvalidateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidateAction::Refresh => write!(f, "refresh"),
            InvalidateAction::Revoke => write!(f, "revoke"),
        }
    }
}

/// Events describing token lifecycle transitions.
///
/// The provider emits exactly one event per corresponding call and awaits
/// the dispatcher before returning. `Created` fires after the new set is
/// fully constructed; `Invalidating` fires before the presented refresh
/// token is deleted, followed by `Refreshed` or `Revoked` once the
/// transition completes.
#[derive(Debug, Clone)]
pub enum TokenEvent<S> {
    Created {
        set: TokenSet,
        subject: S,
    },
    Invalidating {
        refresh_token: OpaqueToken,
        subject: S,
        action: InvalidateAction,
    },
    Refreshed {
        new_set: TokenSet,
        old_refresh_token: OpaqueToken,
        subject: S,
    },
    Revoked {
        old_refresh_token: OpaqueToken,
        subject: S,
    },
}

impl<S> TokenEvent<S> {
    /// Short name for logging and dispatch routing.
    pub fn name(&self) -> &'static str {
        match self {
            TokenEvent::Created { .. } => "created",
            TokenEvent::Invalidating { .. } => "invalidating",
            TokenEvent::Refreshed { .. } => "refreshed",
            TokenEvent::Revoked { .. } => "revoked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_action_display() {
        assert_eq!(InvalidateAction::Refresh.to_string(), "refresh");
        assert_eq!(InvalidateAction::Revoke.to_string(), "revoke");
    }

    #[test]
    fn test_event_names() {
        let token = OpaqueToken::new("t".to_string(), "s".to_string(), 0);
        let event: TokenEvent<String> = TokenEvent::Revoked {
            old_refresh_token: token,
            subject: "s".to_string(),
        };
        assert_eq!(event.name(), "revoked");
    }
}
