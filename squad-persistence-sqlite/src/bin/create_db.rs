use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path = std::env::var("CATALOG_DB").expect("CATALOG_DB env var not set");

    let conn_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(conn_options)
        .await
        .expect("Failed to create pool");

    squad_persistence_sqlite::init_schema(&pool)
        .await
        .expect("Failed to create players table");

    println!("Created database at [{}] successfully", db_path);
}
