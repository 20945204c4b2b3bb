use clinicbook_api::config::ApiConfig;
use clinicbook_db::{create_pool, schema::initialize_database};
use color_eyre::eyre::Result;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;

    // Make sure the tables exist before serving requests
    initialize_database(&db_pool).await?;

    // Start API server
    clinicbook_api::start_server(config, db_pool).await?;

    Ok(())
}
