//! Caller role and session access.
//!
//! The tracker never talks to the authentication system directly. It consults
//! a [`SessionAccess`] collaborator for the caller's [`AccessRole`] once per
//! fetch, so a role change on the session side takes effect on the very next
//! fetch without restarting the tracker.

/// Data-access role of the console user.
///
/// Elevated roles see all active responders regardless of search radius;
/// restricted roles only see the time-windowed public view within radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRole {
    /// Dispatch operator with full operational visibility.
    Dispatcher,
    /// Area coordinator with full operational visibility.
    Coordinator,
    /// Field responder with baseline read access.
    Responder,
    /// Public/reporting user with the most restricted view.
    Reporter,
}

impl AccessRole {
    /// True for roles with unrestricted operational visibility.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Dispatcher | Self::Coordinator)
    }
}

impl std::fmt::Display for AccessRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dispatcher => write!(f, "dispatcher"),
            Self::Coordinator => write!(f, "coordinator"),
            Self::Responder => write!(f, "responder"),
            Self::Reporter => write!(f, "reporter"),
        }
    }
}

/// Role-aware session accessor.
///
/// Implemented by the host application on top of its session store.
pub trait SessionAccess: Send + Sync {
    /// The role of the current caller.
    fn current_role(&self) -> AccessRole;
}

/// A fixed role, for callers whose session cannot change mid-flight.
#[derive(Debug, Clone, Copy)]
pub struct StaticSession(pub AccessRole);

impl SessionAccess for StaticSession {
    fn current_role(&self) -> AccessRole {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevated_roles() {
        assert!(AccessRole::Dispatcher.is_elevated());
        assert!(AccessRole::Coordinator.is_elevated());
        assert!(!AccessRole::Responder.is_elevated());
        assert!(!AccessRole::Reporter.is_elevated());
    }

    #[test]
    fn test_static_session_returns_fixed_role() {
        let session = StaticSession(AccessRole::Reporter);
        assert_eq!(session.current_role(), AccessRole::Reporter);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(AccessRole::Dispatcher.to_string(), "dispatcher");
        assert_eq!(AccessRole::Reporter.to_string(), "reporter");
    }
}
