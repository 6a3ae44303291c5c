use serde::Serialize;

use crate::{
    errors::AppError,
    structs::{Booking, BookingStatus},
    utils::{self, TimeSlot},
};

/// An existing reservation shown to clients picking a slot.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlot {
    pub id: i64,
    pub start_time: String,
    pub end_time: String,
    pub status: BookingStatus,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub available: bool,
    pub conflict_count: usize,
    pub bookings: Vec<BookedSlot>,
}

/// Tests `slot` against the bookings already held for one space and date.
/// Cancelled bookings never conflict and are not listed.
pub fn evaluate(existing: &[Booking], slot: &TimeSlot) -> Availability {
    let active: Vec<&Booking> = existing
        .iter()
        .filter(|b| b.status != BookingStatus::Cancelled)
        .collect();

    let conflict_count = active
        .iter()
        .filter_map(|b| match TimeSlot::parse(&b.start_time, &b.end_time) {
            Ok(held) => Some(held),
            Err(_) => {
                log::warn!("Booking {} has an unreadable interval", b.id);
                None
            }
        })
        .filter(|held| held.overlaps(slot))
        .count();

    Availability {
        available: conflict_count == 0,
        conflict_count,
        bookings: active
            .into_iter()
            .map(|b| BookedSlot {
                id: b.id,
                start_time: b.start_time.clone(),
                end_time: b.end_time.clone(),
                status: b.status,
            })
            .collect(),
    }
}

/// Price for `slot` from the listing's free-text price. Falls back to the amount the
/// client computed when the price carries no number.
pub fn quote_total(
    price: &str,
    slot: &TimeSlot,
    client_total: Option<f64>,
) -> Result<f64, AppError> {
    match utils::parse_unit_price(price) {
        Some(unit) => Ok(utils::total_amount(unit, slot)),
        None => match client_total {
            Some(total) if total.is_finite() && total >= 0.0 => Ok(utils::round_currency(total)),
            Some(_) => Err(AppError::validation("totalAmount must be a non-negative number")),
            None => Err(AppError::validation(format!(
                "Cannot derive an hourly rate from price {price:?}; totalAmount is required"
            ))),
        },
    }
}
