//! Ordered fetch tiers.

use crate::session::AccessRole;

/// One candidate data source in the ordered fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTier {
    /// All known active locations; elevated roles only.
    Privileged,
    /// Time-windowed, count-capped public view; restricted roles.
    RestrictedPublic,
    /// Raw rows under row-level access rules; any role with baseline read.
    DirectFallback,
}

impl FetchTier {
    /// The ordered tier chain for a caller role.
    ///
    /// Selected once per fetch; the first tier to produce a usable answer
    /// short-circuits the rest.
    pub fn chain_for(role: AccessRole) -> &'static [FetchTier] {
        if role.is_elevated() {
            &[FetchTier::Privileged, FetchTier::DirectFallback]
        } else {
            &[FetchTier::RestrictedPublic, FetchTier::DirectFallback]
        }
    }
}

impl std::fmt::Display for FetchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Privileged => write!(f, "privileged"),
            Self::RestrictedPublic => write!(f, "restricted-public"),
            Self::DirectFallback => write!(f, "direct-fallback"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevated_chain_starts_privileged() {
        assert_eq!(
            FetchTier::chain_for(AccessRole::Dispatcher),
            &[FetchTier::Privileged, FetchTier::DirectFallback]
        );
        assert_eq!(
            FetchTier::chain_for(AccessRole::Coordinator),
            &[FetchTier::Privileged, FetchTier::DirectFallback]
        );
    }

    #[test]
    fn test_restricted_chain_starts_public() {
        assert_eq!(
            FetchTier::chain_for(AccessRole::Reporter),
            &[FetchTier::RestrictedPublic, FetchTier::DirectFallback]
        );
        assert_eq!(
            FetchTier::chain_for(AccessRole::Responder),
            &[FetchTier::RestrictedPublic, FetchTier::DirectFallback]
        );
    }

    #[test]
    fn test_restricted_chain_never_reaches_privileged() {
        for role in [AccessRole::Responder, AccessRole::Reporter] {
            assert!(!FetchTier::chain_for(role).contains(&FetchTier::Privileged));
        }
    }
}
