use actix_web::{
    delete, get, put,
    web::{self, Data},
    HttpResponse, Responder,
};
use serde::Deserialize;

use crate::{
    auth::{AuthUser, Role},
    db::{bookings, spaces},
    errors::AppError,
    utils::{self, TimeSlot},
    AppState,
};

#[derive(Deserialize)]
pub struct SpaceSearch {
    location: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    date: String,
    start_time: String,
    end_time: String,
}

#[get("/parking-spaces")]
pub async fn list_spaces_handler(
    web::Query(search): web::Query<SpaceSearch>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let spaces = spaces::list_spaces(&state, search.location.as_deref()).await?;
    Ok(HttpResponse::Ok().json(spaces))
}

#[get("/parking-spaces/{id}")]
pub async fn get_space_handler(
    path: web::Path<i64>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let space = spaces::get_space(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(space))
}

/// Read-only check: nothing is reserved until `POST /bookings` succeeds.
#[get("/parking-spaces/{id}/availability")]
pub async fn availability_handler(
    path: web::Path<i64>,
    web::Query(query): web::Query<AvailabilityQuery>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let date = utils::parse_date(&query.date)?;
    let slot = TimeSlot::parse(&query.start_time, &query.end_time)?;
    let availability =
        bookings::check_availability(&state, path.into_inner(), date, &slot).await?;
    Ok(HttpResponse::Ok().json(availability))
}

#[put("/parking-spaces/{id}")]
pub async fn update_space_handler(
    path: web::Path<i64>,
    auth: AuthUser,
    web::Json(update): web::Json<spaces::SpaceUpdate>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let lister_id = auth.require(Role::Lister)?;
    let id = path.into_inner();
    let space = spaces::get_space(&state, id).await?;
    if space.lister_id != lister_id {
        return Err(AppError::forbidden("You do not own this parking space"));
    }

    update.validate()?;

    let updated = spaces::update_space(&state, id, update).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/parking-spaces/{id}")]
pub async fn delete_space_handler(
    path: web::Path<i64>,
    auth: AuthUser,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    auth.require_any(&[Role::Lister, Role::Admin])?;
    let id = path.into_inner();
    let space = spaces::get_space(&state, id).await?;
    if auth.role == Role::Lister && space.lister_id != auth.id {
        return Err(AppError::forbidden("You do not own this parking space"));
    }

    spaces::delete_space(&state, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/lister/parking-spaces")]
pub async fn lister_spaces_handler(
    auth: AuthUser,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let lister_id = auth.require(Role::Lister)?;
    let spaces = spaces::list_spaces_by_lister(&state, lister_id).await?;
    Ok(HttpResponse::Ok().json(spaces))
}
