//! Public website and admin console for a policy-research institute.
//!
//! Content lives in an external REST backend; this crate renders the public
//! site, runs the admin editors against that backend and relays image
//! uploads to the media host.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
