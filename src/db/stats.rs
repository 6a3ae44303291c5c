use serde::Serialize;

use crate::{
    errors::AppError,
    structs::{PaymentStatus, QueryStatus, RequestStatus},
    AppState,
};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_listers: i64,
    pub total_parking_spaces: i64,
    pub total_bookings: i64,
    pub pending_requests: i64,
    pub pending_queries: i64,
    pub total_revenue: f64,
}

async fn count(state: &AppState, sql: &str) -> Result<i64, AppError> {
    let (n,): (i64,) = sqlx::query_as(sql).fetch_one(&state.db_pool).await?;
    Ok(n)
}

pub async fn dashboard_stats(state: &AppState) -> Result<DashboardStats, AppError> {
    let (pending_requests,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM parking_space_requests WHERE status = $1")
            .bind(RequestStatus::Pending)
            .fetch_one(&state.db_pool)
            .await?;

    let (pending_queries,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM queries WHERE status = $1")
            .bind(QueryStatus::Pending)
            .fetch_one(&state.db_pool)
            .await?;

    let (total_revenue,): (f64,) = sqlx::query_as(
        "SELECT CAST(COALESCE(SUM(total_amount), 0) AS REAL) FROM bookings WHERE payment_status = $1",
    )
    .bind(PaymentStatus::Paid)
    .fetch_one(&state.db_pool)
    .await?;

    Ok(DashboardStats {
        total_users: count(state, "SELECT COUNT(*) FROM users").await?,
        total_listers: count(state, "SELECT COUNT(*) FROM listers").await?,
        total_parking_spaces: count(state, "SELECT COUNT(*) FROM parking_spaces").await?,
        total_bookings: count(state, "SELECT COUNT(*) FROM bookings").await?,
        pending_requests,
        pending_queries,
        total_revenue,
    })
}
