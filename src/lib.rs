//! Fisherman is a terminal client for the AI Fisherman content site.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the backend payloads and the HTTP client that talks to
//!   the site's REST and streaming endpoints.
//! - [`core`] owns client-side state: the signed-in session, the article
//!   cache, the chat widget with its offline fallback, theme and locale
//!   preferences, the built-in course catalog and the route table.
//! - [`cli`] parses arguments and drives the stores for each command.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod utils;
