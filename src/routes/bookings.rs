use actix_web::{
    get, post, put,
    web::{self, Data},
    HttpResponse, Responder,
};
use serde::Deserialize;

use crate::{
    auth::{AuthUser, Role},
    db::{
        bookings::{self, NewBooking},
        spaces,
    },
    errors::AppError,
    structs::{Booking, BookingStatus, PaymentStatus},
    utils::{self, TimeSlot},
    AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    parking_space_id: i64,
    booking_date: String,
    start_time: String,
    end_time: String,
    vehicle_info: String,
    #[serde(default)]
    notes: String,
    total_amount: Option<f64>,
    payment_status: Option<PaymentStatus>,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    status: BookingStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    payment_status: PaymentStatus,
}

/// How the caller relates to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Party {
    Customer,
    SpaceOwner,
    Admin,
}

async fn party_for(state: &AppState, auth: &AuthUser, booking: &Booking) -> Result<Party, AppError> {
    match auth.role {
        Role::Admin => Ok(Party::Admin),
        Role::User if auth.id == booking.user_id => Ok(Party::Customer),
        Role::Lister => {
            let space = spaces::get_space(state, booking.parking_space_id).await?;
            if space.lister_id == auth.id {
                Ok(Party::SpaceOwner)
            } else {
                Err(AppError::forbidden("This booking is not for one of your spaces"))
            }
        }
        Role::User => Err(AppError::forbidden("This booking belongs to another user")),
    }
}

#[post("/bookings")]
pub async fn create_booking_handler(
    auth: AuthUser,
    web::Json(form): web::Json<CreateBooking>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user_id = auth.require(Role::User)?;

    utils::require_field(&form.vehicle_info, "vehicleInfo")?;
    let booking_date = utils::parse_date(&form.booking_date)?;
    let slot = TimeSlot::parse(&form.start_time, &form.end_time)?;
    let payment_status = form.payment_status.unwrap_or(PaymentStatus::Pending);
    if payment_status == PaymentStatus::Refunded {
        return Err(AppError::validation("A new booking cannot start out refunded"));
    }

    let booking = bookings::create_booking(
        &state,
        NewBooking {
            parking_space_id: form.parking_space_id,
            user_id,
            booking_date,
            slot,
            vehicle_info: form.vehicle_info.trim().to_owned(),
            notes: form.notes,
            client_total: form.total_amount,
            payment_status,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(booking))
}

#[get("/bookings/mine")]
pub async fn my_bookings_handler(
    auth: AuthUser,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let user_id = auth.require(Role::User)?;
    let bookings = bookings::list_bookings_by_user(&state, user_id).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

#[get("/lister/bookings")]
pub async fn lister_bookings_handler(
    auth: AuthUser,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let lister_id = auth.require(Role::Lister)?;
    let bookings = bookings::list_bookings_for_lister(&state, lister_id).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

#[get("/bookings/{id}")]
pub async fn get_booking_handler(
    path: web::Path<i64>,
    auth: AuthUser,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let booking = bookings::get_booking(&state, path.into_inner()).await?;
    party_for(&state, &auth, &booking).await?;
    Ok(HttpResponse::Ok().json(booking))
}

#[put("/bookings/{id}/status")]
pub async fn update_status_handler(
    path: web::Path<i64>,
    auth: AuthUser,
    web::Json(update): web::Json<StatusUpdate>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let booking = bookings::get_booking(&state, path.into_inner()).await?;
    let party = party_for(&state, &auth, &booking).await?;

    // customers may only cancel
    if party == Party::Customer && update.status != BookingStatus::Cancelled {
        return Err(AppError::forbidden("Customers can only cancel their bookings"));
    }
    if !booking.status.can_transition_to(update.status) {
        return Err(AppError::conflict(format!(
            "Cannot move booking from {} to {}",
            booking.status, update.status
        )));
    }

    let updated =
        bookings::update_booking_status(&state, booking.id, booking.status, update.status).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[put("/bookings/{id}/payment-status")]
pub async fn update_payment_status_handler(
    path: web::Path<i64>,
    auth: AuthUser,
    web::Json(update): web::Json<PaymentUpdate>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let booking = bookings::get_booking(&state, path.into_inner()).await?;
    let party = party_for(&state, &auth, &booking).await?;

    let permitted = match update.payment_status {
        PaymentStatus::Paid => matches!(party, Party::Customer | Party::Admin),
        PaymentStatus::Refunded => matches!(party, Party::SpaceOwner | Party::Admin),
        PaymentStatus::Pending => false,
    };
    if !permitted {
        return Err(AppError::forbidden(format!(
            "Not allowed to mark this booking {}",
            update.payment_status
        )));
    }
    if !booking.payment_status.can_transition_to(update.payment_status) {
        return Err(AppError::conflict(format!(
            "Cannot move payment from {} to {}",
            booking.payment_status, update.payment_status
        )));
    }

    let updated = bookings::update_payment_status(
        &state,
        booking.id,
        booking.payment_status,
        update.payment_status,
    )
    .await?;
    Ok(HttpResponse::Ok().json(updated))
}
