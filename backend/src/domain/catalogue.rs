//! Octocat lifecycle controller.
//!
//! Orchestrates create/retrieve/list/update/delete over the
//! [`OctocatRepository`] port: authorization gate first, then validation,
//! then store access. Each operation is atomic from the caller's
//! perspective; per-resource state is simply `absent -> created ->
//! (updated)* -> deleted`.

use std::sync::Arc;

use pagination::{PageRequest, PageWindow};
use serde_json::json;
use tracing::{error, info};

use super::authorization::{Operation, authorize};
use super::error::Error;
use super::identity::AuthenticatedIdentity;
use super::octocat::{NewOctocat, Octocat, OctocatChanges, OctocatName};
use super::ports::{OctocatRepository, OctocatRepositoryError};

/// One page of the collection together with its computed window.
#[derive(Debug, Clone)]
pub struct OctocatListing {
    /// The computed page window.
    pub window: PageWindow,
    /// Octocats in creation order for this window.
    pub items: Vec<Octocat>,
}

/// The octocat lifecycle service.
///
/// Handlers depend on this service rather than on the repository directly so
/// the authorization gate and error mapping cannot be bypassed.
#[derive(Clone)]
pub struct OctocatCatalogue {
    octocats: Arc<dyn OctocatRepository>,
}

impl OctocatCatalogue {
    /// Create a catalogue over the given repository.
    #[must_use]
    pub fn new(octocats: Arc<dyn OctocatRepository>) -> Self {
        Self { octocats }
    }

    /// Create a new octocat. Admin only.
    ///
    /// # Errors
    /// `Forbidden` when the gate denies the caller, `Conflict` when the name
    /// is already taken, `InternalError` on store failures.
    pub async fn create(
        &self,
        caller: &AuthenticatedIdentity,
        new: NewOctocat,
    ) -> Result<Octocat, Error> {
        authorize(caller, Operation::Create)?;
        let created = self
            .octocats
            .insert(new)
            .await
            .map_err(map_repository_error)?;
        info!(name = %created.name, owner = %created.owner.public_id, "octocat created");
        Ok(created)
    }

    /// Retrieve a single octocat by name. Any authenticated identity.
    ///
    /// # Errors
    /// `NotFound` (message names the resource) when absent.
    pub async fn retrieve(
        &self,
        caller: &AuthenticatedIdentity,
        name: &OctocatName,
    ) -> Result<Octocat, Error> {
        authorize(caller, Operation::Retrieve)?;
        self.octocats
            .find_by_name(name)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(name))
    }

    /// List one page of the collection in creation order. Any authenticated
    /// identity.
    ///
    /// A page beyond the end of the collection yields an empty window, not
    /// an error.
    ///
    /// # Errors
    /// `InternalError` on store failures.
    pub async fn list(
        &self,
        caller: &AuthenticatedIdentity,
        request: PageRequest,
    ) -> Result<OctocatListing, Error> {
        authorize(caller, Operation::List)?;
        let offset = u64::from(request.page() - 1) * u64::from(request.per_page());
        let (items, total_items) = self
            .octocats
            .list(offset, request.per_page())
            .await
            .map_err(map_repository_error)?;
        Ok(OctocatListing {
            window: PageWindow::compute(request, total_items),
            items,
        })
    }

    /// Apply the supplied mutable attributes to an existing octocat. Admin
    /// only; `name` itself is never updatable.
    ///
    /// # Errors
    /// `Forbidden`, `NotFound`, `ValidationFailed` when no attribute is
    /// supplied, `InternalError` on store failures.
    pub async fn update(
        &self,
        caller: &AuthenticatedIdentity,
        name: &OctocatName,
        changes: OctocatChanges,
    ) -> Result<Octocat, Error> {
        authorize(caller, Operation::Update)?;
        if changes.is_empty() {
            return Err(Error::validation_failed("Input payload validation failed")
                .with_details(json!({
                    "errors": { "body": "provide at least one of: url, deadline" }
                })));
        }
        let updated = self
            .octocats
            .update(name, changes)
            .await
            .map_err(map_repository_error)?;
        info!(name = %updated.name, "octocat updated");
        Ok(updated)
    }

    /// Permanently remove an octocat. Admin only.
    ///
    /// # Errors
    /// `Forbidden`, `NotFound`, `InternalError` on store failures.
    pub async fn delete(
        &self,
        caller: &AuthenticatedIdentity,
        name: &OctocatName,
    ) -> Result<(), Error> {
        authorize(caller, Operation::Delete)?;
        self.octocats
            .delete(name)
            .await
            .map_err(map_repository_error)?;
        info!(name = %name, "octocat deleted");
        Ok(())
    }
}

fn not_found(name: &OctocatName) -> Error {
    Error::not_found(format!("{name} not found in database."))
}

fn map_repository_error(err: OctocatRepositoryError) -> Error {
    match err {
        OctocatRepositoryError::DuplicateName { name } => Error::conflict(format!(
            "Octocat name: {name} already exists, must be unique."
        )),
        OctocatRepositoryError::NotFound { name } => {
            Error::not_found(format!("{name} not found in database."))
        }
        OctocatRepositoryError::Connection { message } | OctocatRepositoryError::Query { message } => {
            error!(error = %message, "octocat store failure");
            Error::internal("database error")
        }
    }
}
