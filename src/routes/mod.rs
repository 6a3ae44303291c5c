use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    get,
    http::Method,
    web::{self, Data},
    HttpRequest, HttpResponse, Responder,
};
use serde_json::json;

use crate::{errors::AppError, AppState};

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod queries;
pub mod requests;
pub mod spaces;


/// Registers every API route plus extractor configs that turn bad input into JSON 400s.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(health_handler)
        .service(auth::register_handler)
        .service(auth::login_handler)
        .service(auth::lister_register_handler)
        .service(auth::lister_login_handler)
        .service(auth::admin_login_handler)
        .service(auth::me_handler)
        .service(spaces::list_spaces_handler)
        .service(spaces::availability_handler)
        .service(spaces::get_space_handler)
        .service(spaces::update_space_handler)
        .service(spaces::delete_space_handler)
        .service(spaces::lister_spaces_handler)
        .service(bookings::lister_bookings_handler)
        .service(requests::create_request_handler)
        .service(requests::my_requests_handler)
        .service(requests::list_requests_handler)
        .service(requests::approve_request_handler)
        .service(requests::reject_request_handler)
        .service(bookings::create_booking_handler)
        .service(bookings::my_bookings_handler)
        .service(bookings::get_booking_handler)
        .service(bookings::update_status_handler)
        .service(bookings::update_payment_status_handler)
        .service(queries::create_query_handler)
        .service(queries::my_queries_handler)
        .service(admin::dashboard_handler)
        .service(admin::list_queries_handler)
        .service(admin::update_query_handler);
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(format!("Invalid JSON body: {err}")).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(format!("Invalid query string: {err}")).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(format!("Invalid path: {err}")).into()
}

#[get("/health")]
pub async fn health_handler(state: Data<AppState>) -> Result<impl Responder, AppError> {
    sqlx::query("SELECT 1").execute(&state.db_pool).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

pub async fn default_handler(req_method: Method) -> HttpResponse {
    match req_method {
        Method::GET => HttpResponse::NotFound().json(json!({ "error": "Not found" })),
        _ => HttpResponse::MethodNotAllowed().json(json!({ "error": "Method not allowed" })),
    }
}
