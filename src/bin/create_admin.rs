//! Bootstrap the first administrator account.
//!
//! Reads `DATABASE_URL` and `ADMIN_USERNAME` / `ADMIN_EMAIL` / `ADMIN_PASSWORD`
//! from the environment (or `.env`), creates the tables if needed and adds the
//! admin unless an account with that username already exists.

use migrant_health_core::errors::ServiceResult;
use migrant_health_core::{globals, initialize, AppConfig};

#[tokio::main]
async fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("create_admin failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> ServiceResult<()> {
    let config = AppConfig::from_env()?;
    initialize(&config).await?;

    let auth = globals::get_auth_service()?;
    match auth
        .ensure_admin(&config.admin_username, &config.admin_email, &config.admin_password)
        .await?
    {
        Some(admin) => {
            println!("Admin user created successfully!");
            println!("Username: {}", admin.username);
            println!("Password: {}", config.admin_password);
        }
        None => println!("Admin user '{}' already exists.", config.admin_username),
    }

    Ok(())
}
