use std::{str::FromStr, sync::Arc};

use actix_web::{
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web::{self, Data},
    App,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::{
    auth::{issue_token, Role, ADMIN_SUBJECT_ID},
    config::Config,
    db::{
        self,
        listers::NewLister,
        spaces::{self, SpaceDetails},
    },
    routes,
    structs::{Lister, ParkingSpace, User},
    AppState,
};

pub const ADMIN_EMAIL: &str = "admin@parkspot.test";
pub const ADMIN_PASSWORD: &str = "let-me-in-please";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        token_ttl_hours: 1,
        admin_email: ADMIN_EMAIL.into(),
        admin_password: Some(ADMIN_PASSWORD.into()),
    }
}

/// Fresh migrated in-memory database. One connection, so every query sees the same data.
pub async fn test_state() -> AppState {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await
        .unwrap();
    db::migrate(&pool).await.unwrap();
    AppState {
        db_pool: pool,
        config: Arc::new(test_config()),
    }
}

pub fn test_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(Data::new(state))
        .configure(routes::configure)
        .default_service(web::to(routes::default_handler))
}

pub async fn seed_user(state: &AppState, email: &str) -> (User, String) {
    let user = db::users::create_user(state, email.into(), "password123", "Test User".into())
        .await
        .unwrap();
    let token = issue_token(&state.config, Role::User, user.id, &user.email).unwrap();
    (user, token)
}

pub async fn seed_lister(state: &AppState, email: &str) -> (Lister, String) {
    let lister = db::listers::create_lister(
        state,
        NewLister {
            email: email.into(),
            password: "password123".into(),
            full_name: "Test Lister".into(),
            business_name: "Lots Ltd".into(),
            phone: "555-0100".into(),
        },
    )
    .await
    .unwrap();
    let token = issue_token(&state.config, Role::Lister, lister.id, &lister.email).unwrap();
    (lister, token)
}

pub fn admin_token(state: &AppState) -> String {
    issue_token(&state.config, Role::Admin, ADMIN_SUBJECT_ID, ADMIN_EMAIL).unwrap()
}

pub fn space_details(price: &str) -> SpaceDetails {
    SpaceDetails {
        location: "MG Road, Bengaluru".into(),
        lat: Some(12.975),
        lng: Some(77.606),
        price: price.into(),
        availability: "24x7".into(),
        description: "Covered basement slot".into(),
        contact: "555-0100".into(),
    }
}

pub async fn seed_space(state: &AppState, lister_id: i64, price: &str) -> ParkingSpace {
    spaces::insert_space(&state.db_pool, lister_id, &space_details(price))
        .await
        .unwrap()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
