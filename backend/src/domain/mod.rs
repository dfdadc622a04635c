//! Domain entities, validation, authorization, and ports.
//!
//! Everything here is transport agnostic: inbound adapters translate these
//! types to HTTP, outbound adapters implement the ports over PostgreSQL or
//! memory. Types are strongly typed with fallible constructors so invalid
//! values cannot exist past the validation boundary.

pub mod authorization;
pub mod catalogue;
pub mod error;
pub mod identity;
pub mod octocat;
pub mod ports;

pub use self::authorization::{FORBIDDEN_MESSAGE, Operation, authorize};
pub use self::catalogue::{OctocatCatalogue, OctocatListing};
pub use self::error::{Error, ErrorCode};
pub use self::identity::{
    AuthenticatedIdentity, Email, Identity, IdentityValidationError, NewIdentity, StoredIdentity,
};
pub use self::octocat::{
    Deadline, InfoUrl, NewOctocat, Octocat, OctocatChanges, OctocatName, OctocatValidationError,
    Owner,
};

/// Response header carrying the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Convenient result alias for fallible domain and adapter calls.
pub type ApiResult<T> = Result<T, Error>;
