//! Route table

mod auth;
mod call;
mod connector;

use actix_web::web;

use crate::error::ApiError;

/// Register every route, the JSON body policy and the 404 fallback.
///
/// Authorization-code routes exist only when `oauth` is set.
pub fn configure(cfg: &mut web::ServiceConfig, body_limit: usize, oauth: bool) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(body_limit)
            .error_handler(|err, _req| ApiError::from(err).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::resource("/")
            .route(web::get().to(connector::index))
            .route(web::post().to(connector::index)),
    )
    .route("/health", web::get().to(connector::health))
    .route("/favicon.ico", web::get().to(connector::favicon))
    .route("/tools/list", web::get().to(connector::tools_list))
    .route("/call/search", web::post().to(call::search))
    .route("/call/fetch", web::post().to(call::fetch))
    .route("/leads", web::get().to(call::leads));

    if oauth {
        cfg.route("/auth/login", web::get().to(auth::login))
            .route("/auth/salesforce", web::get().to(auth::login))
            .route("/auth/callback", web::get().to(auth::callback))
            .route("/oauth2/callback", web::get().to(auth::callback))
            .route("/auth/status", web::get().to(auth::status));
    }

    cfg.default_service(web::to(not_found));
}

async fn not_found() -> Result<actix_web::HttpResponse, ApiError> {
    Err(ApiError::NotFound)
}

#[cfg(test)]
#[path = "../test_mocks.rs"]
mod test_mocks;

#[cfg(test)]
#[path = "../routes_tests.rs"]
mod tests;
