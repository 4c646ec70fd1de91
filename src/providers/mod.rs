//! External collaborators consumed by the core.
//!
//! This module defines traits for every external dependency the core
//! touches. Providers are **interfaces**, not implementations: the
//! resolver, merger, and binder depend on these traits, and the hosting
//! application supplies concrete implementations backed by its own
//! persistence and crypto.
//!
//! This enables:
//! - **Testing**: use mocks (in-memory, deterministic)
//! - **Production**: use real services (a database, a password KDF)
//! - **Development**: use instrumented versions (logging, tracing)

pub mod hasher;
pub mod session;
pub mod user;

pub use hasher::CredentialHasher;
pub use session::SessionStore;
pub use user::UserStore;
