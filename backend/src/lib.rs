//! Octocat catalogue backend: a JWT-authenticated CRUD API over a single
//! named collection resource, with offset pagination and role-gated
//! mutation.

pub mod auth;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use doc::ApiDoc;
pub use middleware::Trace;
