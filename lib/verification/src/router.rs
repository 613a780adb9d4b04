//! Mapping session state to destinations.

use gatehouse_core::Provider;
use gatehouse_session::Entitlement;

/// Final access decision for an authenticated visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// At least one entitlement is satisfied.
    Granted,
    /// No entitlement is satisfied.
    Denied,
}

/// Where a visitor is sent after a pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// The entry point. Anonymous visitors always land here.
    Root,
    /// The gated success page.
    SuccessPage,
    /// The generic "access denied" page.
    DenialPage,
    /// The page explaining a failed check right after authenticating.
    ProviderFailure(Provider),
}

impl Destination {
    /// Returns the route path for this destination.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::SuccessPage => "/login/success",
            Self::DenialPage => "/login/failed",
            Self::ProviderFailure(Provider::Google) => "/youtube/verification/failed",
            Self::ProviderFailure(Provider::GitHub) => "/github/verification/failed",
        }
    }
}

/// OR over both entitlements; `Unknown` counts as not satisfied.
#[must_use]
pub fn decide(subscription: Entitlement, following: Entitlement) -> Decision {
    if subscription.is_satisfied() || following.is_satisfied() {
        Decision::Granted
    } else {
        Decision::Denied
    }
}

/// Picks the destination for a visit to the gated route.
///
/// Provider-specific failure pages are never chosen here; they are only
/// reached directly from an OAuth callback.
#[must_use]
pub fn route(
    is_authenticated: bool,
    subscription: Entitlement,
    following: Entitlement,
) -> Destination {
    if !is_authenticated {
        return Destination::Root;
    }
    match decide(subscription, following) {
        Decision::Granted => Destination::SuccessPage,
        Decision::Denied => Destination::DenialPage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [Entitlement; 3] = [
        Entitlement::Unknown,
        Entitlement::Satisfied,
        Entitlement::Unsatisfied,
    ];

    #[test]
    fn granted_iff_either_entitlement_is_satisfied() {
        for subscription in STATES {
            for following in STATES {
                let expected = subscription == Entitlement::Satisfied
                    || following == Entitlement::Satisfied;
                assert_eq!(
                    decide(subscription, following) == Decision::Granted,
                    expected,
                    "subscription={subscription:?} following={following:?}"
                );
            }
        }
    }

    #[test]
    fn unknown_is_never_granting() {
        assert_eq!(
            decide(Entitlement::Unknown, Entitlement::Unknown),
            Decision::Denied
        );
    }

    #[test]
    fn anonymous_visitors_go_to_root_regardless_of_cache() {
        assert_eq!(
            route(false, Entitlement::Satisfied, Entitlement::Satisfied),
            Destination::Root
        );
    }

    #[test]
    fn authenticated_visitors_get_success_or_denial() {
        assert_eq!(
            route(true, Entitlement::Satisfied, Entitlement::Unknown),
            Destination::SuccessPage
        );
        assert_eq!(
            route(true, Entitlement::Unknown, Entitlement::Unsatisfied),
            Destination::DenialPage
        );
    }

    #[test]
    fn destination_paths() {
        assert_eq!(Destination::Root.path(), "/");
        assert_eq!(Destination::DenialPage.path(), "/login/failed");
        assert_eq!(
            Destination::ProviderFailure(Provider::Google).path(),
            "/youtube/verification/failed"
        );
        assert_eq!(
            Destination::ProviderFailure(Provider::GitHub).path(),
            "/github/verification/failed"
        );
    }
}
