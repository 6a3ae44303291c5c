use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub pwd_hash: String,
    pub full_name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lister {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub pwd_hash: String,
    pub full_name: String,
    pub business_name: String,
    pub phone: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSpace {
    pub id: i64,
    pub lister_id: i64,
    pub location: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub price: String,
    pub availability: String,
    pub description: String,
    pub contact: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSpaceRequest {
    pub id: i64,
    pub lister_id: i64,
    pub location: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub price: String,
    pub availability: String,
    pub description: String,
    pub contact: String,
    pub status: RequestStatus,
    /// Set once the request is approved and its listing goes live.
    pub parking_space_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub parking_space_id: i64,
    pub user_id: i64,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub vehicle_info: String,
    pub notes: String,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub id: i64,
    pub lister_id: i64,
    pub subject: String,
    pub description: String,
    pub category: String,
    pub status: QueryStatus,
    pub admin_response: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum QueryStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

macro_rules! display_via_serde {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let value = serde_json::to_value(self).map_err(|_| fmt::Error)?;
                f.write_str(value.as_str().unwrap_or_default())
            }
        })*
    };
}

display_via_serde!(RequestStatus, BookingStatus, PaymentStatus, QueryStatus);
