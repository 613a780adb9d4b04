//! The verification pipeline.

use std::sync::Arc;

use gatehouse_core::{AccessToken, Identity, Provider, Result};
use gatehouse_entitlement::EntitlementChecker;
use gatehouse_session::{Entitlement, Session};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::error::VerificationError;
use crate::router::{Decision, Destination, decide, route};

/// Whether entitlement checks re-run on every visit to the gated route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecheckPolicy {
    /// Query both providers on every evaluation.
    #[default]
    Always,
    /// Reuse a known cached result; only `Unknown` fields are checked.
    TrustCached,
}

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationState {
    /// No provider token in the session.
    Anonymous,
    /// Authenticated, but the entitlement for at least one held token has
    /// not been evaluated yet.
    Authenticated(Provider),
    /// At least one entitlement is satisfied.
    Granted,
    /// Every held token has been checked and none is satisfied.
    Denied,
}

impl VerificationState {
    /// Derives the state from a session's tokens and cached entitlements.
    #[must_use]
    pub fn of(session: &Session) -> Self {
        let Some(last_provider) = session.last_provider() else {
            return Self::Anonymous;
        };
        if !session.is_authenticated() {
            return Self::Anonymous;
        }
        if decide(session.subscription(), session.following()) == Decision::Granted {
            return Self::Granted;
        }
        let pending = Provider::ALL.into_iter().any(|provider| {
            session.access_token(provider).is_some() && !session.entitlement(provider).is_known()
        });
        if pending {
            Self::Authenticated(last_provider)
        } else {
            Self::Denied
        }
    }
}

/// Orchestrates authentication results and entitlement checks for a session.
#[derive(Clone)]
pub struct VerificationPipeline {
    subscription: Arc<dyn EntitlementChecker>,
    following: Arc<dyn EntitlementChecker>,
    recheck: RecheckPolicy,
}

impl VerificationPipeline {
    /// Creates a pipeline from the YouTube and GitHub checkers.
    ///
    /// # Errors
    ///
    /// Returns an error if either checker consumes the other provider's
    /// token, e.g. when the arguments are swapped.
    pub fn new(
        subscription: Arc<dyn EntitlementChecker>,
        following: Arc<dyn EntitlementChecker>,
    ) -> Result<Self, VerificationError> {
        for (expected, checker) in [
            (Provider::Google, &subscription),
            (Provider::GitHub, &following),
        ] {
            let actual = checker.provider();
            if actual != expected {
                return Err(VerificationError::CheckerMismatch { expected, actual }.into());
            }
        }
        Ok(Self {
            subscription,
            following,
            recheck: RecheckPolicy::default(),
        })
    }

    /// Sets the recheck policy for the gated route.
    #[must_use]
    pub fn with_recheck_policy(mut self, recheck: RecheckPolicy) -> Self {
        self.recheck = recheck;
        self
    }

    /// Returns the configured recheck policy.
    #[must_use]
    pub fn recheck_policy(&self) -> RecheckPolicy {
        self.recheck
    }

    fn checker(&self, provider: Provider) -> &dyn EntitlementChecker {
        match provider {
            Provider::Google => self.subscription.as_ref(),
            Provider::GitHub => self.following.as_ref(),
        }
    }

    /// Records a successful authentication in the session.
    pub fn authenticate(&self, session: &mut Session, identity: Identity) {
        info!(provider = %identity.provider, "visitor authenticated");
        session.record_identity(identity);
    }

    /// Runs the just-authenticated provider's check once.
    ///
    /// Returns the success page if the entitlement holds, otherwise that
    /// provider's failure page.
    #[instrument(skip_all, fields(provider = %provider))]
    pub async fn verify_callback(&self, session: &mut Session, provider: Provider) -> Destination {
        let entitlement = self.run_guard(session, provider).await;
        if entitlement.is_satisfied() {
            Destination::SuccessPage
        } else {
            Destination::ProviderFailure(provider)
        }
    }

    /// Evaluates a visit to the gated route.
    ///
    /// Anonymous sessions go straight to the root without any provider
    /// call. Otherwise both guards run in order (subscription, then
    /// following) before the OR decision is applied.
    #[instrument(skip_all)]
    pub async fn evaluate(&self, session: &mut Session) -> Destination {
        if !session.is_authenticated() {
            debug!("anonymous visitor reached gated route");
            return Destination::Root;
        }

        for provider in Provider::ALL {
            if self.recheck == RecheckPolicy::TrustCached
                && session.entitlement(provider).is_known()
            {
                continue;
            }
            self.run_guard(session, provider).await;
        }

        let destination = route(true, session.subscription(), session.following());
        info!(
            state = ?VerificationState::of(session),
            subscription = ?session.subscription(),
            following = ?session.following(),
            session_started = %session.created_at(),
            "verification evaluated"
        );
        destination
    }

    /// Runs one provider's check if the session holds its token, caching
    /// the result. Without a token the field is reset to `Unknown`.
    async fn run_guard(&self, session: &mut Session, provider: Provider) -> Entitlement {
        let entitlement = match session.access_token(provider) {
            Some(token) => Entitlement::from(self.check(provider, token).await),
            None => Entitlement::Unknown,
        };
        session.set_entitlement(provider, entitlement);
        entitlement
    }

    /// Calls the checker, treating any failure as "not entitled".
    async fn check(&self, provider: Provider, token: &AccessToken) -> bool {
        match self.checker(provider).check(token).await {
            Ok(satisfied) => satisfied,
            Err(report) => {
                warn!(
                    provider = %provider,
                    error = %report,
                    "entitlement check failed, treating as unsatisfied"
                );
                false
            }
        }
    }
}
