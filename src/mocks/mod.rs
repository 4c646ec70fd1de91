//! Mock providers for testing.
//!
//! In-memory, deterministic implementations of the provider traits. The
//! mock user store enforces the real uniqueness invariants under a single
//! lock, so conflict and race behavior can be exercised at memory speed.
//!
//! Available by default via the `test-utils` feature.

pub mod hasher;
pub mod session;
pub mod user;

pub use hasher::MockHasher;
pub use session::MockSessionStore;
pub use user::MockUserStore;
