//! Authentication and authorization gate.
//!
//! ARCHITECTURE
//! ============
//! `path` classifies, `verify` asks the auth service, `decision` combines
//! the two into one verdict, and `middleware` applies it to every request.
//! `role` holds the finer page-level checks, which consume the verdict the
//! middleware attached to the request rather than computing their own.

pub mod cookie;
pub mod decision;
pub mod middleware;
pub mod path;
pub mod role;
pub mod verify;

pub use decision::FailurePolicy;
pub use middleware::session_gate;
pub use role::{AdminUser, GateRejection, OrgAccessLevel, SignedIn};
