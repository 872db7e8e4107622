pub mod players;

use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub fn create_catalog_db_pool() -> Pool<Sqlite> {
    let db_path = std::env::var("CATALOG_DB").expect("CATALOG_DB env var not set");

    let conn_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(false);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_lazy_with(conn_options)
}

const SCHEMA_SQL: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS players (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        team TEXT NOT NULL,
        nationality TEXT NOT NULL,
        jersey_number INTEGER NOT NULL,
        age INTEGER NOT NULL,
        image_url TEXT NOT NULL,
        position TEXT NOT NULL,
        rating INTEGER NOT NULL,
        market_value INTEGER NOT NULL,
        is_active INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_players_team ON players (team)",
    "CREATE INDEX IF NOT EXISTS idx_players_nationality ON players (nationality)",
    "CREATE INDEX IF NOT EXISTS idx_players_age ON players (age)",
    "CREATE INDEX IF NOT EXISTS idx_players_rating ON players (rating)",
];

pub async fn init_schema(pool: &Pool<Sqlite>) -> sqlx::Result<()> {
    for statement in SCHEMA_SQL {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
