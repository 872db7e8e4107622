use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};
use squad_server_domain::{
    ServiceError, ServiceResult,
    player::{
        ListFilter, Player, PlayerId, PlayerQuery, PlayerRepository, Position, SearchFilter,
        SortOrder,
    },
    stats::{CatalogStats, GeneralStats, NationalityStats, TeamStats},
};

use crate::create_catalog_db_pool;

pub struct SqlitePlayerRepository {
    pool: Pool<Sqlite>,
}

/// Bind value for dynamically assembled WHERE clauses.
enum Param {
    Text(String),
    Int(i64),
}

fn to_internal(e: sqlx::Error) -> ServiceError {
    ServiceError::Internal(e.to_string())
}

fn timestamp_from_row(row: &SqliteRow, column: &str) -> ServiceResult<DateTime<Utc>> {
    let secs: i64 = row.try_get(column).map_err(to_internal)?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        ServiceError::Internal(format!("Invalid timestamp in column {}: {}", column, secs))
    })
}

impl SqlitePlayerRepository {
    pub fn new() -> Self {
        let pool = create_catalog_db_pool();
        Self { pool }
    }

    pub fn with_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn player_from_row(row: &SqliteRow) -> ServiceResult<(PlayerId, Player)> {
        let id: PlayerId = row.try_get("id").map_err(to_internal)?;
        let position_str: String = row.try_get("position").map_err(to_internal)?;
        let position = Position::parse(&position_str).ok_or_else(|| {
            ServiceError::Internal(format!("Unknown position in row {}: {}", id, position_str))
        })?;
        Ok((
            id,
            Player {
                name: row.try_get("name").map_err(to_internal)?,
                team: row.try_get("team").map_err(to_internal)?,
                nationality: row.try_get("nationality").map_err(to_internal)?,
                jersey_number: row.try_get("jersey_number").map_err(to_internal)?,
                age: row.try_get("age").map_err(to_internal)?,
                image_url: row.try_get("image_url").map_err(to_internal)?,
                position,
                rating: row.try_get("rating").map_err(to_internal)?,
                market_value: row.try_get("market_value").map_err(to_internal)?,
                is_active: row.try_get("is_active").map_err(to_internal)?,
                created_at: timestamp_from_row(row, "created_at")?,
                updated_at: timestamp_from_row(row, "updated_at")?,
            },
        ))
    }

    fn list_conditions(
        filter: &ListFilter,
        search: Option<&str>,
        conditions: &mut Vec<String>,
        params: &mut Vec<Param>,
    ) {
        if let Some(team) = &filter.team {
            conditions.push("team = ?".to_string());
            params.push(Param::Text(team.clone()));
        }
        if let Some(nationality) = &filter.nationality {
            conditions.push("nationality = ?".to_string());
            params.push(Param::Text(nationality.clone()));
        }
        if let Some(min_age) = filter.min_age {
            conditions.push("age >= ?".to_string());
            params.push(Param::Int(min_age as i64));
        }
        if let Some(max_age) = filter.max_age {
            conditions.push("age <= ?".to_string());
            params.push(Param::Int(max_age as i64));
        }
        if let Some(min_rating) = filter.min_rating {
            conditions.push("rating >= ?".to_string());
            params.push(Param::Int(min_rating as i64));
        }
        if let Some(position) = filter.position {
            conditions.push("position = ?".to_string());
            params.push(Param::Text(position.as_str().to_string()));
        }
        if let Some(text) = search {
            Self::text_condition(text, conditions, params);
        }
    }

    fn search_conditions(
        filter: &SearchFilter,
        text: Option<&str>,
        conditions: &mut Vec<String>,
        params: &mut Vec<Param>,
    ) {
        if let Some(team) = &filter.team {
            conditions.push("team LIKE ?".to_string());
            params.push(Param::Text(format!("%{}%", team)));
        }
        if let Some(nationality) = &filter.nationality {
            conditions.push("nationality LIKE ?".to_string());
            params.push(Param::Text(format!("%{}%", nationality)));
        }
        if let Some(min_age) = filter.min_age {
            conditions.push("age >= ?".to_string());
            params.push(Param::Int(min_age as i64));
        }
        if let Some(max_age) = filter.max_age {
            conditions.push("age <= ?".to_string());
            params.push(Param::Int(max_age as i64));
        }
        if let Some(min_rating) = filter.min_rating {
            conditions.push("rating >= ?".to_string());
            params.push(Param::Int(min_rating as i64));
        }
        if let Some(position) = filter.position {
            conditions.push("position = ?".to_string());
            params.push(Param::Text(position.as_str().to_string()));
        }
        if let Some(text) = text {
            Self::text_condition(text, conditions, params);
        }
    }

    // SQLite LIKE is case-insensitive for ASCII, which matches the
    // fields covered by the original text index.
    fn text_condition(text: &str, conditions: &mut Vec<String>, params: &mut Vec<Param>) {
        conditions.push("(name LIKE ? OR team LIKE ? OR nationality LIKE ?)".to_string());
        let needle = format!("%{}%", text);
        params.push(Param::Text(needle.clone()));
        params.push(Param::Text(needle.clone()));
        params.push(Param::Text(needle));
    }

    fn where_clause(conditions: &[String]) -> String {
        if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        }
    }

    async fn count_matching(&self, where_clause: &str, params: &[Param]) -> ServiceResult<usize> {
        let count_sql = format!("SELECT COUNT(*) FROM players{}", where_clause);
        let mut query = sqlx::query_scalar::<_, i64>(&count_sql);
        for param in params {
            query = match param {
                Param::Text(s) => query.bind(s.clone()),
                Param::Int(i) => query.bind(*i),
            };
        }
        let total = query.fetch_one(&self.pool).await.map_err(to_internal)?;
        Ok(total as usize)
    }
}

#[async_trait::async_trait]
impl PlayerRepository for SqlitePlayerRepository {
    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>> {
        let row = sqlx::query("SELECT * FROM players WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(to_internal)?;
        match row {
            Some(row) => Ok(Some(Self::player_from_row(&row)?.1)),
            None => Ok(None),
        }
    }

    async fn create_player(&self, player: &Player) -> ServiceResult<PlayerId> {
        let res = sqlx::query(
            "INSERT INTO players (name, team, nationality, jersey_number, age, image_url, \
             position, rating, market_value, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&player.name)
        .bind(&player.team)
        .bind(&player.nationality)
        .bind(player.jersey_number)
        .bind(player.age)
        .bind(&player.image_url)
        .bind(player.position.as_str())
        .bind(player.rating)
        .bind(player.market_value)
        .bind(player.is_active)
        .bind(player.created_at.timestamp())
        .bind(player.updated_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(to_internal)?;
        Ok(res.last_insert_rowid())
    }

    async fn update_player(&self, id: PlayerId, player: &Player) -> ServiceResult<()> {
        sqlx::query(
            "UPDATE players SET name = ?, team = ?, nationality = ?, jersey_number = ?, \
             age = ?, image_url = ?, position = ?, rating = ?, market_value = ?, \
             is_active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&player.name)
        .bind(&player.team)
        .bind(&player.nationality)
        .bind(player.jersey_number)
        .bind(player.age)
        .bind(&player.image_url)
        .bind(player.position.as_str())
        .bind(player.rating)
        .bind(player.market_value)
        .bind(player.is_active)
        .bind(player.updated_at.timestamp())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(to_internal)?;
        Ok(())
    }

    async fn delete_player(&self, id: PlayerId) -> ServiceResult<bool> {
        let res = sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(to_internal)?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_by_team_and_number(
        &self,
        team: &str,
        jersey_number: u32,
        exclude: Option<PlayerId>,
    ) -> ServiceResult<Option<PlayerId>> {
        let mut sql = "SELECT id FROM players WHERE team = ? AND jersey_number = ?".to_string();
        if exclude.is_some() {
            sql.push_str(" AND id != ?");
        }
        let mut query = sqlx::query_scalar::<_, PlayerId>(&sql)
            .bind(team)
            .bind(jersey_number);
        if let Some(exclude) = exclude {
            query = query.bind(exclude);
        }
        query.fetch_optional(&self.pool).await.map_err(to_internal)
    }

    async fn query_players(
        &self,
        player_query: &PlayerQuery,
    ) -> ServiceResult<(Vec<(PlayerId, Player)>, usize)> {
        let mut conditions = Vec::new();
        let mut params = Vec::new();
        Self::list_conditions(
            &player_query.filter,
            player_query.search.as_deref(),
            &mut conditions,
            &mut params,
        );
        let where_clause = Self::where_clause(&conditions);

        let order = match player_query.sort_order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let sql = format!(
            "SELECT * FROM players{} ORDER BY {} {}, name ASC LIMIT ? OFFSET ?",
            where_clause,
            player_query.sort_by.column(),
            order
        );

        let mut query = sqlx::query(&sql);
        for param in &params {
            query = match param {
                Param::Text(s) => query.bind(s.clone()),
                Param::Int(i) => query.bind(*i),
            };
        }
        // Saturate instead of wrapping negative; SQLite reads a negative
        // LIMIT as "no limit".
        query = query
            .bind(i64::try_from(player_query.limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(player_query.offset()).unwrap_or(i64::MAX));

        let rows = query.fetch_all(&self.pool).await.map_err(to_internal)?;
        let items = rows
            .iter()
            .map(Self::player_from_row)
            .collect::<ServiceResult<Vec<_>>>()?;

        let total = self.count_matching(&where_clause, &params).await?;
        Ok((items, total))
    }

    async fn search_players(
        &self,
        text: Option<&str>,
        filter: &SearchFilter,
    ) -> ServiceResult<Vec<(PlayerId, Player)>> {
        let mut conditions = Vec::new();
        let mut params = Vec::new();
        Self::search_conditions(filter, text, &mut conditions, &mut params);
        let sql = format!(
            "SELECT * FROM players{} ORDER BY rating DESC, name ASC",
            Self::where_clause(&conditions)
        );

        let mut query = sqlx::query(&sql);
        for param in &params {
            query = match param {
                Param::Text(s) => query.bind(s.clone()),
                Param::Int(i) => query.bind(*i),
            };
        }
        let rows = query.fetch_all(&self.pool).await.map_err(to_internal)?;
        rows.iter()
            .map(Self::player_from_row)
            .collect::<ServiceResult<Vec<_>>>()
    }

    async fn count_players(&self) -> ServiceResult<usize> {
        self.count_matching("", &[]).await
    }

    async fn insert_players(&self, players: &[Player]) -> ServiceResult<Vec<(PlayerId, Player)>> {
        let mut created = Vec::with_capacity(players.len());
        for player in players {
            let id = self.create_player(player).await?;
            created.push((id, player.clone()));
        }
        Ok(created)
    }

    async fn collect_stats(&self) -> ServiceResult<CatalogStats> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, AVG(age) AS average_age, AVG(rating) AS average_rating, \
             MIN(age) AS min_age, MAX(age) AS max_age, MIN(rating) AS min_rating, \
             MAX(rating) AS max_rating FROM players",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(to_internal)?;

        let total: i64 = row.try_get("total").map_err(to_internal)?;
        let general = if total == 0 {
            None
        } else {
            Some(GeneralStats {
                total_players: total as u64,
                average_age: row.try_get("average_age").map_err(to_internal)?,
                average_rating: row.try_get("average_rating").map_err(to_internal)?,
                min_age: row.try_get("min_age").map_err(to_internal)?,
                max_age: row.try_get("max_age").map_err(to_internal)?,
                min_rating: row.try_get("min_rating").map_err(to_internal)?,
                max_rating: row.try_get("max_rating").map_err(to_internal)?,
            })
        };

        let team_rows = sqlx::query(
            "SELECT team, COUNT(*) AS count, AVG(rating) AS average_rating FROM players \
             GROUP BY team ORDER BY count DESC, team ASC LIMIT 10",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(to_internal)?;
        let top_teams = team_rows
            .iter()
            .map(|row| {
                Ok(TeamStats {
                    team: row.try_get("team").map_err(to_internal)?,
                    count: row.try_get::<i64, _>("count").map_err(to_internal)? as u64,
                    average_rating: row.try_get("average_rating").map_err(to_internal)?,
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        let nationality_rows = sqlx::query(
            "SELECT nationality, COUNT(*) AS count FROM players \
             GROUP BY nationality ORDER BY count DESC, nationality ASC LIMIT 10",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(to_internal)?;
        let top_nationalities = nationality_rows
            .iter()
            .map(|row| {
                Ok(NationalityStats {
                    nationality: row.try_get("nationality").map_err(to_internal)?,
                    count: row.try_get::<i64, _>("count").map_err(to_internal)? as u64,
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(CatalogStats {
            general,
            top_teams,
            top_nationalities,
        })
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;
    use squad_server_domain::player::{SortBy, SortOrder};

    use super::*;

    async fn memory_repo() -> SqlitePlayerRepository {
        // A fresh in-memory database per connection, so keep the pool at one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory pool");
        crate::init_schema(&pool)
            .await
            .expect("Failed to create schema");
        SqlitePlayerRepository::with_pool(pool)
    }

    fn player(name: &str, team: &str, nationality: &str, jersey_number: u32, rating: u32) -> Player {
        Player {
            name: name.to_string(),
            team: team.to_string(),
            nationality: nationality.to_string(),
            jersey_number,
            age: 25,
            image_url: "https://example.com/photo.jpg".to_string(),
            position: Position::Forward,
            rating,
            market_value: 1_000_000,
            is_active: true,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            updated_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    async fn seeded_repo() -> SqlitePlayerRepository {
        let repo = memory_repo().await;
        repo.insert_players(&[
            player("Alice Striker", "Alpha FC", "Spain", 9, 91),
            player("Bob Keeper", "Alpha FC", "France", 1, 84),
            player("Carol Wing", "Beta United", "Spain", 7, 88),
            player("Dave Back", "Beta United", "Italy", 4, 79),
            player("Erin Mid", "Gamma City", "France", 8, 85),
        ])
        .await
        .unwrap();
        repo
    }

    fn default_query() -> PlayerQuery {
        PlayerQuery {
            filter: ListFilter::default(),
            search: None,
            sort_by: SortBy::Rating,
            sort_order: SortOrder::Descending,
            page: 1,
            limit: 10,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_roundtrip() {
        let repo = memory_repo().await;
        let p = player("Alice Striker", "Alpha FC", "Spain", 9, 91);
        let id = repo.create_player(&p).await.unwrap();
        let fetched = repo.get_player_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched, p);
    }

    #[tokio::test]
    async fn test_get_missing_player() {
        let repo = memory_repo().await;
        assert!(repo.get_player_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_player() {
        let repo = memory_repo().await;
        let mut p = player("Alice Striker", "Alpha FC", "Spain", 9, 91);
        let id = repo.create_player(&p).await.unwrap();

        p.rating = 93;
        p.team = "Beta United".to_string();
        p.updated_at = DateTime::from_timestamp(1_700_000_100, 0).unwrap();
        repo.update_player(id, &p).await.unwrap();

        let fetched = repo.get_player_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.rating, 93);
        assert_eq!(fetched.team, "Beta United");
        assert_eq!(fetched.updated_at, p.updated_at);
        // created_at is not touched by updates
        assert_eq!(fetched.created_at, p.created_at);
    }

    #[tokio::test]
    async fn test_delete_player() {
        let repo = memory_repo().await;
        let id = repo
            .create_player(&player("Alice Striker", "Alpha FC", "Spain", 9, 91))
            .await
            .unwrap();
        assert!(repo.delete_player(id).await.unwrap());
        assert!(!repo.delete_player(id).await.unwrap());
        assert!(repo.get_player_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_team_and_number() {
        let repo = seeded_repo().await;
        let found = repo
            .find_by_team_and_number("Alpha FC", 9, None)
            .await
            .unwrap();
        assert!(found.is_some());

        // Excluding the matching row hides it, as the update path needs.
        let excluded = repo
            .find_by_team_and_number("Alpha FC", 9, found)
            .await
            .unwrap();
        assert!(excluded.is_none());

        assert!(
            repo.find_by_team_and_number("Alpha FC", 99, None)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.find_by_team_and_number("Gamma City", 9, None)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_query_filters() {
        let repo = seeded_repo().await;

        let mut query = default_query();
        query.filter.team = Some("Alpha FC".to_string());
        let (items, total) = repo.query_players(&query).await.unwrap();
        assert_eq!(total, 2);
        assert!(items.iter().all(|(_, p)| p.team == "Alpha FC"));

        let mut query = default_query();
        query.filter.nationality = Some("Spain".to_string());
        query.filter.min_rating = Some(90);
        let (items, total) = repo.query_players(&query).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].1.name, "Alice Striker");
    }

    #[tokio::test]
    async fn test_query_sorting_and_pagination() {
        let repo = seeded_repo().await;

        let mut query = default_query();
        query.limit = 2;
        query.page = 2;
        let (items, total) = repo.query_players(&query).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(items.len(), 2);
        // rating desc over all five: 91, 88, 85, 84, 79 -> page 2 is 85, 84
        assert_eq!(items[0].1.rating, 85);
        assert_eq!(items[1].1.rating, 84);

        let mut query = default_query();
        query.sort_by = SortBy::Name;
        query.sort_order = SortOrder::Ascending;
        let (items, _) = repo.query_players(&query).await.unwrap();
        assert_eq!(items[0].1.name, "Alice Striker");
        assert_eq!(items[4].1.name, "Erin Mid");
    }

    #[tokio::test]
    async fn test_query_text_search() {
        let repo = seeded_repo().await;

        let mut query = default_query();
        query.search = Some("beta".to_string());
        let (items, total) = repo.query_players(&query).await.unwrap();
        assert_eq!(total, 2);
        assert!(items.iter().all(|(_, p)| p.team == "Beta United"));

        let mut query = default_query();
        query.search = Some("striker".to_string());
        let (_, total) = repo.query_players(&query).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_search_players() {
        let repo = seeded_repo().await;

        let filter = SearchFilter {
            nationality: Some("fra".to_string()),
            ..Default::default()
        };
        let items = repo.search_players(None, &filter).await.unwrap();
        assert_eq!(items.len(), 2);
        // rating desc: Erin Mid (85) before Bob Keeper (84)
        assert_eq!(items[0].1.name, "Erin Mid");
        assert_eq!(items[1].1.name, "Bob Keeper");

        let filter = SearchFilter {
            min_age: Some(26),
            ..Default::default()
        };
        let items = repo.search_players(None, &filter).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_collect_stats() {
        let repo = seeded_repo().await;
        let stats = repo.collect_stats().await.unwrap();

        let general = stats.general.unwrap();
        assert_eq!(general.total_players, 5);
        assert_eq!(general.min_age, 25);
        assert_eq!(general.max_age, 25);
        assert_eq!(general.min_rating, 79);
        assert_eq!(general.max_rating, 91);
        assert!((general.average_rating - 85.4).abs() < 1e-9);

        assert_eq!(stats.top_teams.len(), 3);
        assert_eq!(stats.top_teams[0].count, 2);
        assert_eq!(stats.top_nationalities[0].count, 2);
    }

    #[tokio::test]
    async fn test_collect_stats_empty() {
        let repo = memory_repo().await;
        let stats = repo.collect_stats().await.unwrap();
        assert!(stats.general.is_none());
        assert!(stats.top_teams.is_empty());
        assert!(stats.top_nationalities.is_empty());
    }

    #[tokio::test]
    async fn test_count_players() {
        let repo = seeded_repo().await;
        assert_eq!(repo.count_players().await.unwrap(), 5);
    }
}
