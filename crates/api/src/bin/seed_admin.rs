//! Create the initial `admin` account.
//!
//! | Env Var          | Default             |
//! |------------------|---------------------|
//! | `DATABASE_URL`   | required            |
//! | `ADMIN_EMAIL`    | `admin@example.com` |
//! | `ADMIN_PASSWORD` | `admin123`          |
//! | `ADMIN_NAME`     | `Administrator`     |
//!
//! Does nothing if a user with that email already exists.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursehub_api::auth::password::hash_password;
use coursehub_core::roles::ROLE_ADMIN;
use coursehub_db::models::user::CreateUser;
use coursehub_db::repositories::UserRepo;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_admin=info,coursehub_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let email = std::env::var("ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@example.com".into())
        .trim()
        .to_lowercase();
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".into());

    let pool = coursehub_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    coursehub_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    if let Some(existing) = UserRepo::find_by_email(&pool, &email)
        .await
        .expect("Failed to look up admin user")
    {
        tracing::info!(user_id = existing.id, %email, "Admin user already exists, nothing to do");
        return;
    }

    let password_hash = hash_password(&password).expect("Failed to hash admin password");
    let admin = UserRepo::create(
        &pool,
        &CreateUser {
            name,
            email: email.clone(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await
    .expect("Failed to create admin user");

    tracing::info!(user_id = admin.id, %email, "Admin user created");
}
