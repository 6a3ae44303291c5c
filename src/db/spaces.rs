use serde::Deserialize;
use sqlx::{Sqlite, SqliteExecutor};

use crate::{errors::AppError, structs::ParkingSpace, utils, AppState};

/// Listing fields shared by live spaces and pending requests.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SpaceDetails {
    pub location: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub price: String,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contact: String,
}

impl SpaceDetails {
    pub fn validate(&self) -> Result<(), AppError> {
        utils::require_field(&self.location, "location")?;
        utils::require_field(&self.price, "price")?;
        validate_coordinates(self.lat, self.lng)
    }
}

fn validate_coordinates(lat: Option<f64>, lng: Option<f64>) -> Result<(), AppError> {
    if let Some(lat) = lat {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::validation("lat must be between -90 and 90"));
        }
    }
    if let Some(lng) = lng {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::validation("lng must be between -180 and 180"));
        }
    }
    Ok(())
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpaceUpdate {
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub price: Option<String>,
    pub availability: Option<String>,
    pub description: Option<String>,
    pub contact: Option<String>,
}

impl SpaceUpdate {
    /// Only the fields present in the update are checked.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(location) = &self.location {
            utils::require_field(location, "location")?;
        }
        if let Some(price) = &self.price {
            utils::require_field(price, "price")?;
        }
        validate_coordinates(self.lat, self.lng)
    }
}

pub async fn insert_space<'e, E>(
    executor: E,
    lister_id: i64,
    details: &SpaceDetails,
) -> Result<ParkingSpace, AppError>
where
    E: SqliteExecutor<'e>,
{
    let created_at = utils::now();
    let space = sqlx::query_as::<Sqlite, ParkingSpace>(
        "INSERT INTO parking_spaces (lister_id, location, lat, lng, price, availability, description, contact, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(lister_id)
    .bind(&details.location)
    .bind(details.lat)
    .bind(details.lng)
    .bind(&details.price)
    .bind(&details.availability)
    .bind(&details.description)
    .bind(&details.contact)
    .bind(&created_at)
    .bind(&created_at)
    .fetch_one(executor)
    .await?;
    log::info!("Parking space {} created for lister {}", space.id, lister_id);
    Ok(space)
}

pub async fn list_spaces(
    state: &AppState,
    location: Option<&str>,
) -> Result<Vec<ParkingSpace>, AppError> {
    let spaces = match location.map(str::trim).filter(|l| !l.is_empty()) {
        Some(term) => {
            sqlx::query_as::<_, ParkingSpace>(
                "SELECT * FROM parking_spaces WHERE LOWER(location) LIKE $1 ORDER BY created_at DESC, id DESC",
            )
            .bind(format!("%{}%", term.to_lowercase()))
            .fetch_all(&state.db_pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ParkingSpace>(
                "SELECT * FROM parking_spaces ORDER BY created_at DESC, id DESC",
            )
            .fetch_all(&state.db_pool)
            .await?
        }
    };
    Ok(spaces)
}

pub async fn get_space(state: &AppState, id: i64) -> Result<ParkingSpace, AppError> {
    sqlx::query_as::<_, ParkingSpace>("SELECT * FROM parking_spaces WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Parking space {id} not found")))
}

pub async fn list_spaces_by_lister(
    state: &AppState,
    lister_id: i64,
) -> Result<Vec<ParkingSpace>, AppError> {
    let spaces = sqlx::query_as::<_, ParkingSpace>(
        "SELECT * FROM parking_spaces WHERE lister_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(lister_id)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(spaces)
}

pub async fn update_space(
    state: &AppState,
    id: i64,
    update: SpaceUpdate,
) -> Result<ParkingSpace, AppError> {
    let updated_at = utils::now();
    let space = sqlx::query_as::<_, ParkingSpace>(
        "UPDATE parking_spaces SET \
            location = COALESCE($1, location), \
            lat = COALESCE($2, lat), \
            lng = COALESCE($3, lng), \
            price = COALESCE($4, price), \
            availability = COALESCE($5, availability), \
            description = COALESCE($6, description), \
            contact = COALESCE($7, contact), \
            updated_at = $8 \
         WHERE id = $9 RETURNING *",
    )
    .bind(update.location)
    .bind(update.lat)
    .bind(update.lng)
    .bind(update.price)
    .bind(update.availability)
    .bind(update.description)
    .bind(update.contact)
    .bind(&updated_at)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found(format!("Parking space {id} not found")))?;
    log::info!("Parking space {} updated", id);
    Ok(space)
}

pub async fn delete_space(state: &AppState, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM parking_spaces WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Parking space {id} not found")));
    }
    log::info!("Parking space {} deleted", id);
    Ok(())
}
