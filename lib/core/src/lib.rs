//! Core domain types and utilities for gatehouse.
//!
//! This crate provides the identity primitives shared by every other crate:
//! the supported identity providers, opaque access tokens, session
//! identifiers, and the rootcause-based `Result` alias.

pub mod error;
pub mod id;
pub mod provider;

pub use error::Result;
pub use id::SessionId;
pub use provider::{AccessToken, Identity, Provider};
