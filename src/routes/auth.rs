use actix_web::{
    get, post,
    web::{self, Data},
    HttpResponse, Responder,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{issue_token, AuthUser, Role, ADMIN_SUBJECT_ID},
    db::{
        listers::{self, NewLister},
        users,
    },
    errors::AppError,
    utils, AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Register {
    email: String,
    password: String,
    full_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLister {
    email: String,
    password: String,
    full_name: String,
    #[serde(default)]
    business_name: String,
    #[serde(default)]
    phone: String,
}

#[derive(Deserialize)]
pub struct Login {
    email: String,
    password: String,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_owned())
}

fn check_login(form: &Login) -> Result<String, AppError> {
    if form.email.is_empty() || form.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }
    utils::validate_email(&form.email)
}

/// User signup
#[post("/auth/register")]
pub async fn register_handler(
    web::Json(form): web::Json<Register>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let email = utils::validate_email(&form.email)?;
    utils::validate_password(&form.password)?;
    utils::require_field(&form.full_name, "fullName")?;

    let full_name = form.full_name.trim().to_owned();
    let user = users::create_user(&state, email, &form.password, full_name).await?;
    let token = issue_token(&state.config, Role::User, user.id, &user.email)?;

    Ok(HttpResponse::Created().json(json!({ "token": token, "role": Role::User, "user": user })))
}

#[post("/auth/login")]
pub async fn login_handler(
    web::Json(form): web::Json<Login>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let email = check_login(&form)?;
    let user = users::find_user_by_email(&state, &email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !utils::verify_password(&form.password, &user.pwd_hash)? {
        log::warn!("Failed login for user {}", user.id);
        return Err(invalid_credentials());
    }

    let token = issue_token(&state.config, Role::User, user.id, &user.email)?;
    Ok(HttpResponse::Ok().json(json!({ "token": token, "role": Role::User, "user": user })))
}

#[post("/auth/lister/register")]
pub async fn lister_register_handler(
    web::Json(form): web::Json<RegisterLister>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let email = utils::validate_email(&form.email)?;
    utils::validate_password(&form.password)?;
    utils::require_field(&form.full_name, "fullName")?;

    let lister = listers::create_lister(
        &state,
        NewLister {
            email,
            password: form.password,
            full_name: form.full_name.trim().to_owned(),
            business_name: form.business_name.trim().to_owned(),
            phone: form.phone.trim().to_owned(),
        },
    )
    .await?;
    let token = issue_token(&state.config, Role::Lister, lister.id, &lister.email)?;

    Ok(HttpResponse::Created()
        .json(json!({ "token": token, "role": Role::Lister, "user": lister })))
}

#[post("/auth/lister/login")]
pub async fn lister_login_handler(
    web::Json(form): web::Json<Login>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let email = check_login(&form)?;
    let lister = listers::find_lister_by_email(&state, &email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !utils::verify_password(&form.password, &lister.pwd_hash)? {
        log::warn!("Failed login for lister {}", lister.id);
        return Err(invalid_credentials());
    }

    let token = issue_token(&state.config, Role::Lister, lister.id, &lister.email)?;
    Ok(HttpResponse::Ok().json(json!({ "token": token, "role": Role::Lister, "user": lister })))
}

#[post("/auth/admin/login")]
pub async fn admin_login_handler(
    web::Json(form): web::Json<Login>,
    state: Data<AppState>,
) -> Result<impl Responder, AppError> {
    let email = check_login(&form)?;
    let Some(admin_password) = state.config.admin_password.as_deref() else {
        log::warn!("Admin login attempted but ADMIN_PASSWORD is not configured");
        return Err(AppError::Unauthorized("Admin login is disabled".to_owned()));
    };

    if email != state.config.admin_email || form.password != admin_password {
        log::warn!("Failed admin login for {}", email);
        return Err(invalid_credentials());
    }

    let token = issue_token(&state.config, Role::Admin, ADMIN_SUBJECT_ID, &email)?;
    Ok(HttpResponse::Ok().json(json!({
        "token": token,
        "role": Role::Admin,
        "user": { "id": ADMIN_SUBJECT_ID, "email": email },
    })))
}

#[get("/auth/me")]
pub async fn me_handler(auth: AuthUser, state: Data<AppState>) -> Result<impl Responder, AppError> {
    let body = match auth.role {
        Role::User => {
            let user = users::get_user_by_id(&state, auth.id).await?;
            json!({ "role": auth.role, "user": user })
        }
        Role::Lister => {
            let lister = listers::get_lister_by_id(&state, auth.id).await?;
            json!({ "role": auth.role, "user": lister })
        }
        Role::Admin => json!({ "role": auth.role, "user": { "id": auth.id, "email": auth.email } }),
    };
    Ok(HttpResponse::Ok().json(body))
}
