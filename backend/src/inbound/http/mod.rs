//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod bearer;
pub mod error;
pub mod health;
pub mod octocats;
pub mod state;
pub mod validation;

pub use octocats::COLLECTION_PATH;
pub use state::HttpState;
