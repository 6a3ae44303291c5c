use crate::{errors::AppError, structs::Lister, utils, AppState};

pub struct NewLister {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub business_name: String,
    pub phone: String,
}

pub async fn create_lister(state: &AppState, new: NewLister) -> Result<Lister, AppError> {
    let created_at = utils::now();
    let pwd_hash = utils::hash_password(&new.password)?;
    let lister = sqlx::query_as::<_, Lister>(
        "INSERT INTO listers (email, pwd_hash, full_name, business_name, phone, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(new.email)
    .bind(pwd_hash)
    .bind(new.full_name)
    .bind(new.business_name)
    .bind(new.phone)
    .bind(&created_at)
    .bind(&created_at)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::conflict("Email is already registered"),
        other => other,
    })?;
    log::info!("Lister created: {}", lister.id);
    Ok(lister)
}

pub async fn find_lister_by_email(
    state: &AppState,
    email: &str,
) -> Result<Option<Lister>, AppError> {
    let lister = sqlx::query_as::<_, Lister>("SELECT * FROM listers WHERE email = $1")
        .bind(email)
        .fetch_optional(&state.db_pool)
        .await?;
    Ok(lister)
}

pub async fn get_lister_by_id(state: &AppState, id: i64) -> Result<Lister, AppError> {
    sqlx::query_as::<_, Lister>("SELECT * FROM listers WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Lister {id} not found")))
}
