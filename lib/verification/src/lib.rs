//! The gatehouse verification pipeline.
//!
//! A visitor moves through these states within one session:
//!
//! ```text
//! Anonymous ──auth──▶ Authenticated(provider) ──checks──▶ Granted | Denied
//! ```
//!
//! [`VerificationPipeline`] drives the transitions by storing identities and
//! running the entitlement checkers, writing every result into the
//! [`Session`](gatehouse_session::Session). The [`router`] module turns the
//! resulting session state into a [`Destination`].
//!
//! Either entitlement alone is enough: a visitor subscribed on YouTube *or*
//! following on GitHub is granted, whichever account they signed in with.

pub mod error;
pub mod pipeline;
pub mod router;

pub use error::VerificationError;
pub use pipeline::{RecheckPolicy, VerificationPipeline, VerificationState};
pub use router::{Decision, Destination, decide, route};
