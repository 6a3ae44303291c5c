use sqlx::Sqlite;

use crate::{
    db::spaces::{self, SpaceDetails},
    errors::AppError,
    structs::{ParkingSpace, ParkingSpaceRequest, RequestStatus},
    utils, AppState,
};

pub async fn create_request(
    state: &AppState,
    lister_id: i64,
    details: &SpaceDetails,
) -> Result<ParkingSpaceRequest, AppError> {
    let created_at = utils::now();
    let request = sqlx::query_as::<_, ParkingSpaceRequest>(
        "INSERT INTO parking_space_requests (lister_id, location, lat, lng, price, availability, description, contact, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
    )
    .bind(lister_id)
    .bind(&details.location)
    .bind(details.lat)
    .bind(details.lng)
    .bind(&details.price)
    .bind(&details.availability)
    .bind(&details.description)
    .bind(&details.contact)
    .bind(RequestStatus::Pending)
    .bind(&created_at)
    .bind(&created_at)
    .fetch_one(&state.db_pool)
    .await?;
    log::info!("Parking request {} submitted by lister {}", request.id, lister_id);
    Ok(request)
}

pub async fn list_requests(
    state: &AppState,
    status: Option<RequestStatus>,
) -> Result<Vec<ParkingSpaceRequest>, AppError> {
    let requests = match status {
        Some(status) => {
            sqlx::query_as::<_, ParkingSpaceRequest>(
                "SELECT * FROM parking_space_requests WHERE status = $1 ORDER BY created_at DESC, id DESC",
            )
            .bind(status)
            .fetch_all(&state.db_pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ParkingSpaceRequest>(
                "SELECT * FROM parking_space_requests ORDER BY created_at DESC, id DESC",
            )
            .fetch_all(&state.db_pool)
            .await?
        }
    };
    Ok(requests)
}

pub async fn list_requests_by_lister(
    state: &AppState,
    lister_id: i64,
) -> Result<Vec<ParkingSpaceRequest>, AppError> {
    let requests = sqlx::query_as::<_, ParkingSpaceRequest>(
        "SELECT * FROM parking_space_requests WHERE lister_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(lister_id)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(requests)
}

pub async fn get_request(state: &AppState, id: i64) -> Result<ParkingSpaceRequest, AppError> {
    sqlx::query_as::<_, ParkingSpaceRequest>("SELECT * FROM parking_space_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Parking request {id} not found")))
}

fn check_transition(
    request: &ParkingSpaceRequest,
    next: RequestStatus,
) -> Result<(), AppError> {
    if request.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::conflict(format!(
            "Parking request {} is already {}",
            request.id, request.status
        )))
    }
}

/// Marks the request approved and publishes its listing in one transaction.
pub async fn approve_request(
    state: &AppState,
    id: i64,
) -> Result<(ParkingSpaceRequest, ParkingSpace), AppError> {
    let mut tx = state.db_pool.begin().await?;

    let request = sqlx::query_as::<Sqlite, ParkingSpaceRequest>(
        "SELECT * FROM parking_space_requests WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found(format!("Parking request {id} not found")))?;

    check_transition(&request, RequestStatus::Approved)?;

    let details = SpaceDetails {
        location: request.location.clone(),
        lat: request.lat,
        lng: request.lng,
        price: request.price.clone(),
        availability: request.availability.clone(),
        description: request.description.clone(),
        contact: request.contact.clone(),
    };
    let space = spaces::insert_space(&mut *tx, request.lister_id, &details).await?;

    let approved = sqlx::query_as::<Sqlite, ParkingSpaceRequest>(
        "UPDATE parking_space_requests SET status = $1, parking_space_id = $2, updated_at = $3 \
         WHERE id = $4 AND status = $5 RETURNING *",
    )
    .bind(RequestStatus::Approved)
    .bind(space.id)
    .bind(utils::now())
    .bind(id)
    .bind(RequestStatus::Pending)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::conflict(format!("Parking request {id} is no longer pending")))?;

    tx.commit().await?;
    log::info!("Parking request {} approved as space {}", id, space.id);
    Ok((approved, space))
}

pub async fn reject_request(state: &AppState, id: i64) -> Result<ParkingSpaceRequest, AppError> {
    let request = get_request(state, id).await?;
    check_transition(&request, RequestStatus::Rejected)?;

    let rejected = sqlx::query_as::<_, ParkingSpaceRequest>(
        "UPDATE parking_space_requests SET status = $1, updated_at = $2 \
         WHERE id = $3 AND status = $4 RETURNING *",
    )
    .bind(RequestStatus::Rejected)
    .bind(utils::now())
    .bind(id)
    .bind(RequestStatus::Pending)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::conflict(format!("Parking request {id} is no longer pending")))?;

    log::info!("Parking request {} rejected", id);
    Ok(rejected)
}
