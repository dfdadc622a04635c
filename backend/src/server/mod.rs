//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use crate::auth::TokenService;
use crate::inbound::http::auth::{current_user, login, logout, register};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::octocats::{
    create_octocat, delete_octocat, list_octocats, retrieve_octocat, update_octocat,
};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::persistence::{
    DieselIdentityRepository, DieselOctocatRepository, DieselTokenBlacklist,
};

/// Assemble handler state from the configuration.
///
/// Diesel adapters when a pool is attached, in-memory adapters otherwise.
fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.db_pool {
        Some(pool) => HttpState::new(
            Arc::new(DieselOctocatRepository::new(pool.clone())),
            Arc::new(DieselIdentityRepository::new(pool.clone())),
            Arc::new(DieselTokenBlacklist::new(pool.clone())),
            TokenService::new(&config.jwt_secret, config.token_ttl),
        ),
        None => HttpState::in_memory(&config.jwt_secret, config.token_ttl),
    }
}

/// Build one application instance for the server factory.
pub fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .service(register)
        .service(login)
        .service(current_user)
        .service(logout)
        .service(create_octocat)
        .service(list_octocats)
        .service(retrieve_octocat)
        .service(update_octocat)
        .service(delete_octocat);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live)
}

/// Construct the HTTP server from `config`, marking `health_state` ready
/// once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config));
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
