use crate::{errors::AppError, structs::User, utils, AppState};

pub async fn create_user(
    state: &AppState,
    email: String,
    password: &str,
    full_name: String,
) -> Result<User, AppError> {
    let created_at = utils::now();
    let pwd_hash = utils::hash_password(password)?;
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, pwd_hash, full_name, created_at, updated_at) VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(email)
    .bind(pwd_hash)
    .bind(full_name)
    .bind(&created_at)
    .bind(&created_at)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::conflict("Email is already registered"),
        other => other,
    })?;
    log::info!("User created: {}", user.id);
    Ok(user)
}

pub async fn find_user_by_email(state: &AppState, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(user)
}

pub async fn get_user_by_id(state: &AppState, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
}
