use chrono::NaiveDate;
use sqlx::{Sqlite, SqliteExecutor};

use crate::{
    availability::{self, Availability},
    errors::AppError,
    structs::{Booking, BookingStatus, ParkingSpace, PaymentStatus},
    utils::{self, TimeSlot},
    AppState,
};

pub struct NewBooking {
    pub parking_space_id: i64,
    pub user_id: i64,
    pub booking_date: NaiveDate,
    pub slot: TimeSlot,
    pub vehicle_info: String,
    pub notes: String,
    pub client_total: Option<f64>,
    pub payment_status: PaymentStatus,
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub async fn list_active_bookings<'e, E>(
    executor: E,
    parking_space_id: i64,
    date: NaiveDate,
) -> Result<Vec<Booking>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let bookings = sqlx::query_as::<Sqlite, Booking>(
        "SELECT * FROM bookings WHERE parking_space_id = $1 AND booking_date = $2 AND status != $3 \
         ORDER BY start_time",
    )
    .bind(parking_space_id)
    .bind(date_key(date))
    .bind(BookingStatus::Cancelled)
    .fetch_all(executor)
    .await?;
    Ok(bookings)
}

pub async fn check_availability(
    state: &AppState,
    parking_space_id: i64,
    date: NaiveDate,
    slot: &TimeSlot,
) -> Result<Availability, AppError> {
    super::spaces::get_space(state, parking_space_id).await?;
    let existing = list_active_bookings(&state.db_pool, parking_space_id, date).await?;
    Ok(availability::evaluate(&existing, slot))
}

/// Re-runs the overlap check and inserts inside one transaction, so two callers that
/// both saw the slot free cannot both book it.
pub async fn create_booking(state: &AppState, new: NewBooking) -> Result<Booking, AppError> {
    let mut tx = state.db_pool.begin().await?;

    // Taking the write lock up front serialises concurrent bookings.
    let locked = sqlx::query("UPDATE parking_spaces SET updated_at = updated_at WHERE id = $1")
        .bind(new.parking_space_id)
        .execute(&mut *tx)
        .await?;
    if locked.rows_affected() == 0 {
        return Err(AppError::not_found(format!(
            "Parking space {} not found",
            new.parking_space_id
        )));
    }

    let space = sqlx::query_as::<Sqlite, ParkingSpace>("SELECT * FROM parking_spaces WHERE id = $1")
        .bind(new.parking_space_id)
        .fetch_one(&mut *tx)
        .await?;

    let existing = list_active_bookings(&mut *tx, new.parking_space_id, new.booking_date).await?;
    let check = availability::evaluate(&existing, &new.slot);
    if !check.available {
        log::warn!(
            "Booking refused for space {} on {}: {} conflicting booking(s)",
            new.parking_space_id,
            new.booking_date,
            check.conflict_count
        );
        return Err(AppError::conflict(
            "The selected time slot overlaps an existing booking",
        ));
    }

    let total_amount = availability::quote_total(&space.price, &new.slot, new.client_total)?;
    let status = match new.payment_status {
        PaymentStatus::Paid => BookingStatus::Confirmed,
        _ => BookingStatus::Pending,
    };
    let created_at = utils::now();

    let booking = sqlx::query_as::<Sqlite, Booking>(
        "INSERT INTO bookings (parking_space_id, user_id, booking_date, start_time, end_time, vehicle_info, notes, total_amount, status, payment_status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
    )
    .bind(new.parking_space_id)
    .bind(new.user_id)
    .bind(date_key(new.booking_date))
    .bind(new.slot.start_str())
    .bind(new.slot.end_str())
    .bind(new.vehicle_info)
    .bind(new.notes)
    .bind(total_amount)
    .bind(status)
    .bind(new.payment_status)
    .bind(&created_at)
    .bind(&created_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    log::info!(
        "Booking {} created for space {} by user {}",
        booking.id,
        booking.parking_space_id,
        booking.user_id
    );
    Ok(booking)
}

pub async fn get_booking(state: &AppState, id: i64) -> Result<Booking, AppError> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))
}

pub async fn list_bookings_by_user(
    state: &AppState,
    user_id: i64,
) -> Result<Vec<Booking>, AppError> {
    let bookings = sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE user_id = $1 ORDER BY booking_date DESC, start_time DESC",
    )
    .bind(user_id)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(bookings)
}

pub async fn list_bookings_for_lister(
    state: &AppState,
    lister_id: i64,
) -> Result<Vec<Booking>, AppError> {
    let bookings = sqlx::query_as::<_, Booking>(
        "SELECT b.* FROM bookings b JOIN parking_spaces s ON s.id = b.parking_space_id \
         WHERE s.lister_id = $1 ORDER BY b.booking_date DESC, b.start_time DESC",
    )
    .bind(lister_id)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(bookings)
}

/// Applies `next` only if the row still holds `current`; a lost race surfaces as a conflict.
pub async fn update_booking_status(
    state: &AppState,
    id: i64,
    current: BookingStatus,
    next: BookingStatus,
) -> Result<Booking, AppError> {
    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4 RETURNING *",
    )
    .bind(next)
    .bind(utils::now())
    .bind(id)
    .bind(current)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::conflict(format!("Booking {id} was modified concurrently")))?;
    log::info!("Booking {} status {} -> {}", id, current, next);
    Ok(booking)
}

pub async fn update_payment_status(
    state: &AppState,
    id: i64,
    current: PaymentStatus,
    next: PaymentStatus,
) -> Result<Booking, AppError> {
    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings SET payment_status = $1, updated_at = $2 \
         WHERE id = $3 AND payment_status = $4 RETURNING *",
    )
    .bind(next)
    .bind(utils::now())
    .bind(id)
    .bind(current)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::conflict(format!("Booking {id} was modified concurrently")))?;
    log::info!("Booking {} payment {} -> {}", id, current, next);
    Ok(booking)
}
