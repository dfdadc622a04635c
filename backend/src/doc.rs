//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] assembles the specification from the inbound layer's path
//! annotations and DTO schemas, and registers the bearer-token security
//! scheme. The document is served by tooling, not by the server itself.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::auth::{CredentialsRequest, IdentityDto, TokenResponse};
use crate::inbound::http::octocats::{
    CreateOctocatRequest, OctocatDto, OctocatPageDto, OwnerDto, UpdateOctocatRequest,
};

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /api/v1/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Octocat catalogue API",
        description = "JWT-authenticated CRUD interface for the octocat collection."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::octocats::create_octocat,
        crate::inbound::http::octocats::list_octocats,
        crate::inbound::http::octocats::retrieve_octocat,
        crate::inbound::http::octocats::update_octocat,
        crate::inbound::http::octocats::delete_octocat,
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::auth::logout,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CreateOctocatRequest,
        UpdateOctocatRequest,
        OctocatDto,
        OwnerDto,
        OctocatPageDto,
        CredentialsRequest,
        TokenResponse,
        IdentityDto,
    )),
    tags(
        (name = "octocats", description = "Octocat collection lifecycle"),
        (name = "auth", description = "Registration, login and token revocation"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
