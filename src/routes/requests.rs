use actix_web::{
    get, post, put,
    web::{self, Data},
    HttpResponse, Responder,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{AuthUser, Role},
    db::{requests, spaces::SpaceDetails},
    errors::AppError,
    structs::RequestStatus,
    AppState,
};

#[derive(Deserialize)]
pub struct StatusFilter {
    status: Option<RequestStatus>,
}

#[post("/parking-requests")]
pub async fn create_request_handler(
    auth: AuthUser,
    web::Json(details): web::Json<SpaceDetails>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let lister_id = auth.require(Role::Lister)?;
    details.validate()?;
    let request = requests::create_request(&state, lister_id, &details).await?;
    Ok(HttpResponse::Created().json(request))
}

#[get("/parking-requests/mine")]
pub async fn my_requests_handler(
    auth: AuthUser,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let lister_id = auth.require(Role::Lister)?;
    let requests = requests::list_requests_by_lister(&state, lister_id).await?;
    Ok(HttpResponse::Ok().json(requests))
}

#[get("/parking-requests")]
pub async fn list_requests_handler(
    auth: AuthUser,
    web::Query(filter): web::Query<StatusFilter>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    auth.require(Role::Admin)?;
    let requests = requests::list_requests(&state, filter.status).await?;
    Ok(HttpResponse::Ok().json(requests))
}

#[put("/parking-requests/{id}/approve")]
pub async fn approve_request_handler(
    path: web::Path<i64>,
    auth: AuthUser,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    auth.require(Role::Admin)?;
    let (request, space) = requests::approve_request(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "request": request, "parkingSpace": space })))
}

#[put("/parking-requests/{id}/reject")]
pub async fn reject_request_handler(
    path: web::Path<i64>,
    auth: AuthUser,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    auth.require(Role::Admin)?;
    let request = requests::reject_request(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "request": request })))
}
