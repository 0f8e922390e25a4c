//! LearnFlow authentication and session flow.
//!
//! Credential verification against the identity backend, session
//! persistence, the session context state machine, and route protection.
//! The `learnflow-server` binary serves these over HTTP; `learnflow-cli`
//! drives the same context against a session file.

pub mod config;
pub mod error;
pub mod guard;
pub mod routes;
pub mod services;
pub mod state;
pub mod templates;
pub mod types;
