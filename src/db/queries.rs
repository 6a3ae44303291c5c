use crate::{
    errors::AppError,
    structs::{Query, QueryStatus},
    utils, AppState,
};

pub async fn create_query(
    state: &AppState,
    lister_id: i64,
    subject: &str,
    description: &str,
    category: &str,
) -> Result<Query, AppError> {
    let created_at = utils::now();
    let query = sqlx::query_as::<_, Query>(
        "INSERT INTO queries (lister_id, subject, description, category, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(lister_id)
    .bind(subject)
    .bind(description)
    .bind(category)
    .bind(QueryStatus::Pending)
    .bind(&created_at)
    .bind(&created_at)
    .fetch_one(&state.db_pool)
    .await?;
    log::info!("Query {} opened by lister {}", query.id, lister_id);
    Ok(query)
}

pub async fn list_queries(
    state: &AppState,
    status: Option<QueryStatus>,
) -> Result<Vec<Query>, AppError> {
    let queries = match status {
        Some(status) => {
            sqlx::query_as::<_, Query>(
                "SELECT * FROM queries WHERE status = $1 ORDER BY created_at DESC, id DESC",
            )
            .bind(status)
            .fetch_all(&state.db_pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Query>("SELECT * FROM queries ORDER BY created_at DESC, id DESC")
                .fetch_all(&state.db_pool)
                .await?
        }
    };
    Ok(queries)
}

pub async fn list_queries_by_lister(
    state: &AppState,
    lister_id: i64,
) -> Result<Vec<Query>, AppError> {
    let queries = sqlx::query_as::<_, Query>(
        "SELECT * FROM queries WHERE lister_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(lister_id)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(queries)
}

/// Admin update: either field may be omitted to leave it unchanged.
pub async fn respond_to_query(
    state: &AppState,
    id: i64,
    status: Option<QueryStatus>,
    admin_response: Option<String>,
) -> Result<Query, AppError> {
    let query = sqlx::query_as::<_, Query>(
        "UPDATE queries SET status = COALESCE($1, status), admin_response = COALESCE($2, admin_response), updated_at = $3 \
         WHERE id = $4 RETURNING *",
    )
    .bind(status)
    .bind(admin_response)
    .bind(utils::now())
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found(format!("Query {id} not found")))?;
    log::info!("Query {} updated, status {}", id, query.status);
    Ok(query)
}
