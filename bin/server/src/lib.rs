//! gatehouse web server.
//!
//! Gates a success page behind Google or GitHub sign-in plus an entitlement
//! check: the visitor must be subscribed to a YouTube channel or follow a
//! GitHub account.

pub mod app;
pub mod auth;
pub mod config;
pub mod pages;
