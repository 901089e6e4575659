//! Application services coordinating the domain with the backend.

pub mod backend;
pub mod editor;
pub mod error;
pub mod intake;
pub mod optimistic;
pub mod reader;
pub mod session;
pub mod stream;
pub mod uploads;
pub mod workspaces;
