//! Entitlement checks against external provider APIs.
//!
//! An entitlement is a yes/no fact a provider can vouch for, given the
//! visitor's access token:
//! - [`YouTubeSubscriptionChecker`]: is the visitor subscribed to a channel?
//! - [`GitHubFollowChecker`]: does the visitor follow an account?
//!
//! Checkers report failures as [`EntitlementError`] instead of collapsing
//! them to `false`; applying the fail-closed default is the caller's job.

pub mod checker;
pub mod error;
pub mod github;
pub mod youtube;

pub use checker::{EntitlementChecker, http_client};
pub use error::EntitlementError;
pub use github::GitHubFollowChecker;
pub use youtube::YouTubeSubscriptionChecker;
