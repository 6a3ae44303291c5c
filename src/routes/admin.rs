use actix_web::{
    get, put,
    web::{self, Data},
    HttpResponse, Responder,
};
use serde::Deserialize;

use crate::{
    auth::{AuthUser, Role},
    db::{queries, stats},
    errors::AppError,
    structs::QueryStatus,
    AppState,
};

#[derive(Deserialize)]
pub struct QueryFilter {
    status: Option<QueryStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryUpdate {
    status: Option<QueryStatus>,
    admin_response: Option<String>,
}

#[get("/admin/dashboard")]
pub async fn dashboard_handler(
    auth: AuthUser,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    auth.require(Role::Admin)?;
    let stats = stats::dashboard_stats(&state).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/admin/queries")]
pub async fn list_queries_handler(
    auth: AuthUser,
    web::Query(filter): web::Query<QueryFilter>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    auth.require(Role::Admin)?;
    let queries = queries::list_queries(&state, filter.status).await?;
    Ok(HttpResponse::Ok().json(queries))
}

#[put("/admin/queries/{id}")]
pub async fn update_query_handler(
    path: web::Path<i64>,
    auth: AuthUser,
    web::Json(update): web::Json<QueryUpdate>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    auth.require(Role::Admin)?;
    let admin_response = update
        .admin_response
        .map(|r| r.trim().to_owned())
        .filter(|r| !r.is_empty());
    if update.status.is_none() && admin_response.is_none() {
        return Err(AppError::validation(
            "Provide a status or an adminResponse",
        ));
    }

    let query =
        queries::respond_to_query(&state, path.into_inner(), update.status, admin_response)
            .await?;
    Ok(HttpResponse::Ok().json(query))
}
