use actix_web::{
    get, post,
    web::{self, Data},
    HttpResponse, Responder,
};
use serde::Deserialize;

use crate::{
    auth::{AuthUser, Role},
    db::queries,
    errors::AppError,
    utils, AppState,
};

#[derive(Deserialize)]
pub struct NewQuery {
    subject: String,
    description: String,
    category: Option<String>,
}

#[post("/queries")]
pub async fn create_query_handler(
    auth: AuthUser,
    web::Json(form): web::Json<NewQuery>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let lister_id = auth.require(Role::Lister)?;
    utils::require_field(&form.subject, "subject")?;
    utils::require_field(&form.description, "description")?;
    let category = form
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("general");

    let query = queries::create_query(
        &state,
        lister_id,
        form.subject.trim(),
        form.description.trim(),
        category,
    )
    .await?;
    Ok(HttpResponse::Created().json(query))
}

#[get("/queries/mine")]
pub async fn my_queries_handler(
    auth: AuthUser,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let lister_id = auth.require(Role::Lister)?;
    let queries = queries::list_queries_by_lister(&state, lister_id).await?;
    Ok(HttpResponse::Ok().json(queries))
}
