//! Octocat collection handlers.
//!
//! ```text
//! POST   /api/v1/octocats
//! GET    /api/v1/octocats?page=&per_page=
//! GET    /api/v1/octocats/{name}
//! PUT    /api/v1/octocats/{name}
//! DELETE /api/v1/octocats/{name}
//! ```
//!
//! Every handler runs the same chain: authenticate, authorize, validate,
//! then call the catalogue. The gate is also enforced inside the catalogue,
//! so skipping a handler-level check cannot widen access.

use actix_web::{HttpRequest, HttpResponse, delete, get, http::header, post, put, web};
use chrono::{DateTime, NaiveDate, Utc};
use pagination::{NavLinks, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    ApiResult, Deadline, Error, InfoUrl, NewOctocat, Octocat, OctocatChanges, OctocatListing,
    OctocatName, Operation, authorize,
};

use super::bearer::authenticate;
use super::state::HttpState;
use super::validation::FieldErrors;

/// Canonical path of the octocat collection.
pub const COLLECTION_PATH: &str = "/api/v1/octocats";

/// Request body for `POST /api/v1/octocats`.
///
/// All three fields are required; they are optional here so a missing field
/// is reported in the validation bundle alongside any other failures rather
/// than as a deserialisation error.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateOctocatRequest {
    /// Unique name, `[A-Za-z0-9_-]+`.
    pub name: Option<String>,
    /// Absolute http/https URL.
    pub url: Option<String>,
    /// ISO-8601 date or RFC 3339 timestamp, today or later.
    pub deadline: Option<String>,
}

/// Request body for `PUT /api/v1/octocats/{name}`.
///
/// At least one field must be supplied; `name` is never updatable.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateOctocatRequest {
    /// Replacement URL, when supplied.
    pub url: Option<String>,
    /// Replacement deadline, when supplied.
    pub deadline: Option<String>,
}

/// Query parameters for `GET /api/v1/octocats`.
///
/// Carried as strings so malformed numbers surface in the standard error
/// envelope instead of the framework's deserialisation response.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    per_page: Option<String>,
}

impl ListQuery {
    fn into_page_request(self) -> ApiResult<PageRequest> {
        let page = parse_positive("page", self.page)?;
        let per_page = parse_positive("per_page", self.per_page)?;
        PageRequest::new(page, per_page).map_err(|err| Error::invalid_request(err.to_string()))
    }
}

fn parse_positive(field: &str, value: Option<String>) -> ApiResult<Option<u32>> {
    value
        .map(|raw| {
            raw.parse::<u32>()
                .map_err(|_| Error::invalid_request(format!("{field} must be a positive integer")))
        })
        .transpose()
}

/// Owner fields exposed on octocat representations.
#[derive(Debug, Serialize, ToSchema)]
pub struct OwnerDto {
    /// Owner's email address.
    pub email: String,
    /// Owner's stable public identifier.
    pub public_id: Uuid,
}

/// One octocat as returned by retrieve, list and update.
#[derive(Debug, Serialize, ToSchema)]
pub struct OctocatDto {
    /// Unique name.
    pub name: String,
    /// Informational URL.
    pub url: String,
    /// End-of-day UTC deadline.
    pub deadline: DateTime<Utc>,
    /// The identity that created the resource.
    pub owner: OwnerDto,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Canonical link to this resource.
    pub link: String,
}

impl From<Octocat> for OctocatDto {
    fn from(octocat: Octocat) -> Self {
        let link = resource_path(&octocat.name);
        Self {
            name: octocat.name.as_str().to_owned(),
            url: octocat.url.as_str().to_owned(),
            deadline: octocat.deadline,
            owner: OwnerDto {
                email: octocat.owner.email.as_str().to_owned(),
                public_id: octocat.owner.public_id,
            },
            created_at: octocat.created_at,
            link,
        }
    }
}

/// One page of the collection.
#[derive(Debug, Serialize, ToSchema)]
pub struct OctocatPageDto {
    /// Requested page number (1-based).
    pub page: u32,
    /// Total number of pages; zero for an empty collection.
    pub total_pages: u64,
    /// Page size in effect.
    pub items_per_page: u32,
    /// Total number of octocats in the collection.
    pub total_items: u64,
    /// Whether a previous page exists.
    pub has_prev: bool,
    /// Whether a further page exists.
    pub has_next: bool,
    /// Navigation links; `prev`/`next` are omitted when inapplicable.
    #[schema(value_type = Object)]
    pub links: NavLinks,
    /// Octocats in creation order for this page.
    pub items: Vec<OctocatDto>,
}

impl From<OctocatListing> for OctocatPageDto {
    fn from(listing: OctocatListing) -> Self {
        let window = listing.window;
        Self {
            page: window.page(),
            total_pages: window.total_pages(),
            items_per_page: window.per_page(),
            total_items: window.total_items(),
            has_prev: window.has_prev(),
            has_next: window.has_next(),
            links: NavLinks::for_window(COLLECTION_PATH, &window),
            items: listing.items.into_iter().map(OctocatDto::from).collect(),
        }
    }
}

fn resource_path(name: &OctocatName) -> String {
    format!("{COLLECTION_PATH}/{name}")
}

/// An unparsable path segment can never match a stored name, so it reads as
/// an absent resource rather than a malformed request.
fn path_name(raw: &str) -> ApiResult<OctocatName> {
    OctocatName::new(raw).map_err(|_| Error::not_found(format!("{raw} not found in database.")))
}

fn validate_create(
    payload: CreateOctocatRequest,
    owner_id: Uuid,
    today: NaiveDate,
) -> ApiResult<NewOctocat> {
    let mut errors = FieldErrors::new();
    let name = require(&mut errors, "name", payload.name)
        .and_then(|raw| errors.capture("name", OctocatName::new(raw)));
    let url = require(&mut errors, "url", payload.url)
        .and_then(|raw| errors.capture("url", InfoUrl::parse(raw)));
    let deadline = require(&mut errors, "deadline", payload.deadline)
        .and_then(|raw| errors.capture("deadline", Deadline::parse(&raw, today)));
    if let (Some(name), Some(url), Some(deadline)) = (name, url, deadline) {
        Ok(NewOctocat {
            name,
            url,
            deadline,
            owner_id,
        })
    } else {
        Err(errors.into_error())
    }
}

fn require(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    if value.is_none() {
        errors.push(field, "required field");
    }
    value
}

fn validate_update(payload: UpdateOctocatRequest, today: NaiveDate) -> ApiResult<OctocatChanges> {
    let mut errors = FieldErrors::new();
    let url = payload
        .url
        .and_then(|raw| errors.capture("url", InfoUrl::parse(raw)));
    let deadline = payload
        .deadline
        .and_then(|raw| errors.capture("deadline", Deadline::parse(&raw, today)));
    errors.finish(OctocatChanges { url, deadline })
}

/// Add an octocat to the collection. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/octocats",
    request_body = CreateOctocatRequest,
    responses(
        (status = 201, description = "Octocat created", headers(("Location" = String, description = "Canonical resource path"))),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Name already taken", body = Error),
        (status = 422, description = "Validation failed", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["octocats"],
    operation_id = "createOctocat"
)]
#[post("/octocats")]
pub async fn create_octocat(
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<CreateOctocatRequest>,
) -> ApiResult<HttpResponse> {
    let caller = authenticate(&req, &state).await?;
    authorize(&caller, Operation::Create)?;
    let new = validate_create(
        payload.into_inner(),
        caller.public_id,
        Utc::now().date_naive(),
    )?;
    let created = state.catalogue.create(&caller, new).await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, resource_path(&created.name)))
        .json(json!({
            "status": "success",
            "message": format!("New octocat added: {}.", created.name),
        })))
}

/// List one page of the collection. Any authenticated identity.
#[utoipa::path(
    get,
    path = "/api/v1/octocats",
    params(
        ("page" = Option<u32>, Query, description = "Page number, 1-based (default 1)"),
        ("per_page" = Option<u32>, Query, description = "Page size: 5, 10, 25, 50 or 100 (default 10)")
    ),
    responses(
        (status = 200, description = "One page of octocats", body = OctocatPageDto),
        (status = 400, description = "Invalid pagination parameters", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["octocats"],
    operation_id = "listOctocats"
)]
#[get("/octocats")]
pub async fn list_octocats(
    req: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<OctocatPageDto>> {
    let caller = authenticate(&req, &state).await?;
    authorize(&caller, Operation::List)?;
    let request = query.into_inner().into_page_request()?;
    let listing = state.catalogue.list(&caller, request).await?;
    Ok(web::Json(listing.into()))
}

/// Retrieve one octocat by name. Any authenticated identity.
#[utoipa::path(
    get,
    path = "/api/v1/octocats/{name}",
    params(("name" = String, Path, description = "Octocat name")),
    responses(
        (status = 200, description = "The octocat", body = OctocatDto),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["octocats"],
    operation_id = "retrieveOctocat"
)]
#[get("/octocats/{name}")]
pub async fn retrieve_octocat(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<OctocatDto>> {
    let caller = authenticate(&req, &state).await?;
    authorize(&caller, Operation::Retrieve)?;
    let name = path_name(&path.into_inner())?;
    let octocat = state.catalogue.retrieve(&caller, &name).await?;
    Ok(web::Json(octocat.into()))
}

/// Replace the supplied mutable attributes of an octocat. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/octocats/{name}",
    params(("name" = String, Path, description = "Octocat name")),
    request_body = UpdateOctocatRequest,
    responses(
        (status = 200, description = "The updated octocat", body = OctocatDto),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 422, description = "Validation failed", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["octocats"],
    operation_id = "updateOctocat"
)]
#[put("/octocats/{name}")]
pub async fn update_octocat(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateOctocatRequest>,
) -> ApiResult<web::Json<OctocatDto>> {
    let caller = authenticate(&req, &state).await?;
    authorize(&caller, Operation::Update)?;
    let name = path_name(&path.into_inner())?;
    let changes = validate_update(payload.into_inner(), Utc::now().date_naive())?;
    let updated = state.catalogue.update(&caller, &name, changes).await?;
    Ok(web::Json(updated.into()))
}

/// Permanently remove an octocat. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/octocats/{name}",
    params(("name" = String, Path, description = "Octocat name")),
    responses(
        (status = 204, description = "Octocat deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["octocats"],
    operation_id = "deleteOctocat"
)]
#[delete("/octocats/{name}")]
pub async fn delete_octocat(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = authenticate(&req, &state).await?;
    authorize(&caller, Operation::Delete)?;
    let name = path_name(&path.into_inner())?;
    state.catalogue.delete(&caller, &name).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestHarness;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::Value;

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api/v1")
                .service(create_octocat)
                .service(list_octocats)
                .service(retrieve_octocat)
                .service(update_octocat)
                .service(delete_octocat),
        )
    }

    fn bearer(token: &str) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    fn create_body(name: &str) -> CreateOctocatRequest {
        CreateOctocatRequest {
            name: Some(name.to_owned()),
            url: Some("http://www.one.com".to_owned()),
            deadline: Some(Utc::now().date_naive().to_string()),
        }
    }

    #[actix_web::test]
    async fn create_returns_created_with_location_and_message() {
        let harness = TestHarness::new();
        let token = harness.admin_token();
        let app = actix_test::init_service(test_app(harness.state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/octocats")
            .insert_header(bearer(&token))
            .set_json(create_body("octocat1"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/api/v1/octocats/octocat1")
        );
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
        assert_eq!(
            value.get("message").and_then(Value::as_str),
            Some("New octocat added: octocat1.")
        );
    }

    #[actix_web::test]
    async fn create_bundles_every_field_failure() {
        let harness = TestHarness::new();
        let token = harness.admin_token();
        let app = actix_test::init_service(test_app(harness.state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/octocats")
            .insert_header(bearer(&token))
            .set_json(CreateOctocatRequest {
                name: Some("has space".to_owned()),
                url: Some("not a url".to_owned()),
                deadline: None,
            })
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
        let errors = value
            .pointer("/details/errors")
            .and_then(Value::as_object)
            .expect("errors map");
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.get("deadline").and_then(Value::as_str),
            Some("required field")
        );
    }

    #[actix_web::test]
    async fn requests_without_a_token_are_unauthorised() {
        let harness = TestHarness::new();
        let app = actix_test::init_service(test_app(harness.state)).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/octocats")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn non_admin_create_is_forbidden_before_validation() {
        let harness = TestHarness::new();
        let token = harness.member_token();
        let app = actix_test::init_service(test_app(harness.state)).await;

        // Invalid body on purpose: the gate must answer first.
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/octocats")
            .insert_header(bearer(&token))
            .set_json(CreateOctocatRequest {
                name: None,
                url: None,
                deadline: None,
            })
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn malformed_pagination_parameters_are_bad_requests() {
        let harness = TestHarness::new();
        let token = harness.member_token();
        let app = actix_test::init_service(test_app(harness.state)).await;

        for uri in [
            "/api/v1/octocats?page=abc",
            "/api/v1/octocats?page=0",
            "/api/v1/octocats?per_page=7",
        ] {
            let request = actix_test::TestRequest::get()
                .uri(uri)
                .insert_header(bearer(&token))
                .to_request();
            let response = actix_test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let value: Value =
                serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
            assert_eq!(
                value.get("code").and_then(Value::as_str),
                Some("invalid_request")
            );
        }
    }

    #[actix_web::test]
    async fn path_names_outside_the_character_class_read_as_not_found() {
        let harness = TestHarness::new();
        let token = harness.member_token();
        let app = actix_test::init_service(test_app(harness.state)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/octocats/dotted.name")
            .insert_header(bearer(&token))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
        assert_eq!(
            value.get("message").and_then(Value::as_str),
            Some("dotted.name not found in database.")
        );
    }

    #[actix_web::test]
    async fn update_rejects_an_empty_body() {
        let harness = TestHarness::new();
        let token = harness.admin_token();
        let app = actix_test::init_service(test_app(harness.state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/octocats")
            .insert_header(bearer(&token))
            .set_json(create_body("octocat1"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/octocats/octocat1")
            .insert_header(bearer(&token))
            .set_json(UpdateOctocatRequest {
                url: None,
                deadline: None,
            })
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
