//! Domain services behind the HTTP routes and the CLI.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the auth flow: input checks, the identity backend
//! client, session persistence, and the context that ties them together.
//! Route handlers stay focused on protocol translation.

pub mod context;
pub mod credentials;
pub mod identity;
pub mod provider;
pub mod session;
