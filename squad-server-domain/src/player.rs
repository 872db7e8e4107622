use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{ServiceError, ServiceResult, seed, stats::CatalogStats};

pub type PlayerId = i64;

pub const DEFAULT_RATING: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    #[default]
    Forward,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Midfielder => "Midfielder",
            Position::Forward => "Forward",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Goalkeeper" => Some(Position::Goalkeeper),
            "Defender" => Some(Position::Defender),
            "Midfielder" => Some(Position::Midfielder),
            "Forward" => Some(Position::Forward),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub name: String,
    pub team: String,
    pub nationality: String,
    pub jersey_number: u32,
    pub age: u32,
    pub image_url: String,
    pub position: Position,
    pub rating: u32,
    pub market_value: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_rating() -> u32 {
    DEFAULT_RATING
}

fn default_is_active() -> bool {
    true
}

/// Payload for creating a player. Optional fields fall back to the
/// catalog defaults during deserialization.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDraft {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "team must be between 1 and 100 characters"))]
    pub team: String,
    #[validate(length(
        min = 1,
        max = 50,
        message = "nationality must be between 1 and 50 characters"
    ))]
    pub nationality: String,
    #[validate(range(min = 1, max = 99, message = "jersey number must be between 1 and 99"))]
    pub jersey_number: u32,
    #[validate(range(min = 16, max = 50, message = "age must be between 16 and 50"))]
    pub age: u32,
    #[validate(custom(function = crate::util::validate_image_url))]
    pub image_url: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default = "default_rating")]
    #[validate(range(min = 1, max = 100, message = "rating must be between 1 and 100"))]
    pub rating: u32,
    #[serde(default)]
    #[validate(range(min = 0, message = "market value cannot be negative"))]
    pub market_value: i64,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

impl PlayerDraft {
    pub fn trimmed(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.team = self.team.trim().to_string();
        self.nationality = self.nationality.trim().to_string();
        self.image_url = self.image_url.trim().to_string();
        self
    }

    pub fn validate_fields(&self) -> ServiceResult<()> {
        self.validate()
            .map_err(|errors| ServiceError::Validation(collect_messages(errors)))
    }

    pub fn into_player(self, now: DateTime<Utc>) -> Player {
        Player {
            name: self.name,
            team: self.team,
            nationality: self.nationality,
            jersey_number: self.jersey_number,
            age: self.age,
            image_url: self.image_url,
            position: self.position,
            rating: self.rating,
            market_value: self.market_value,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn from_player(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            team: player.team.clone(),
            nationality: player.nationality.clone(),
            jersey_number: player.jersey_number,
            age: player.age,
            image_url: player.image_url.clone(),
            position: player.position,
            rating: player.rating,
            market_value: player.market_value,
            is_active: player.is_active,
        }
    }
}

fn collect_messages(errors: validator::ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors.iter() {
            match &error.message {
                Some(msg) => messages.push(msg.to_string()),
                None => messages.push(format!("{} is invalid", field)),
            }
        }
    }
    messages.sort();
    messages
}

/// Partial update; absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub name: Option<String>,
    pub team: Option<String>,
    pub nationality: Option<String>,
    pub jersey_number: Option<u32>,
    pub age: Option<u32>,
    pub image_url: Option<String>,
    pub position: Option<Position>,
    pub rating: Option<u32>,
    pub market_value: Option<i64>,
    pub is_active: Option<bool>,
}

impl PlayerUpdate {
    fn apply(&self, player: &mut Player) {
        if let Some(name) = &self.name {
            player.name = name.trim().to_string();
        }
        if let Some(team) = &self.team {
            player.team = team.trim().to_string();
        }
        if let Some(nationality) = &self.nationality {
            player.nationality = nationality.trim().to_string();
        }
        if let Some(jersey_number) = self.jersey_number {
            player.jersey_number = jersey_number;
        }
        if let Some(age) = self.age {
            player.age = age;
        }
        if let Some(image_url) = &self.image_url {
            player.image_url = image_url.trim().to_string();
        }
        if let Some(position) = self.position {
            player.position = position;
        }
        if let Some(rating) = self.rating {
            player.rating = rating;
        }
        if let Some(market_value) = self.market_value {
            player.market_value = market_value;
        }
        if let Some(is_active) = self.is_active {
            player.is_active = is_active;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Name,
    Team,
    Nationality,
    JerseyNumber,
    Age,
    Rating,
    MarketValue,
    CreatedAt,
}

impl SortBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(SortBy::Name),
            "team" => Some(SortBy::Team),
            "nationality" => Some(SortBy::Nationality),
            "jerseyNumber" => Some(SortBy::JerseyNumber),
            "age" => Some(SortBy::Age),
            "rating" => Some(SortBy::Rating),
            "marketValue" => Some(SortBy::MarketValue),
            "createdAt" => Some(SortBy::CreatedAt),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortBy::Name => "name",
            SortBy::Team => "team",
            SortBy::Nationality => "nationality",
            SortBy::JerseyNumber => "jersey_number",
            SortBy::Age => "age",
            SortBy::Rating => "rating",
            SortBy::MarketValue => "market_value",
            SortBy::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Filters for the paginated listing; team and nationality match exactly.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub team: Option<String>,
    pub nationality: Option<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub min_rating: Option<u32>,
    pub position: Option<Position>,
}

#[derive(Debug, Clone)]
pub struct PlayerQuery {
    pub filter: ListFilter,
    pub search: Option<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub page: usize,
    pub limit: usize,
}

impl PlayerQuery {
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Filters for the advanced search; team and nationality are
/// case-insensitive substring matches.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub team: Option<String>,
    pub nationality: Option<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub min_rating: Option<u32>,
    pub position: Option<Position>,
}

pub struct PlayerPage {
    pub items: Vec<(PlayerId, Player)>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

pub type ArcPlayerRepository = Arc<Box<dyn PlayerRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerRepository {
    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>>;
    async fn create_player(&self, player: &Player) -> ServiceResult<PlayerId>;
    async fn update_player(&self, id: PlayerId, player: &Player) -> ServiceResult<()>;
    async fn delete_player(&self, id: PlayerId) -> ServiceResult<bool>;
    async fn find_by_team_and_number(
        &self,
        team: &str,
        jersey_number: u32,
        exclude: Option<PlayerId>,
    ) -> ServiceResult<Option<PlayerId>>;
    async fn query_players(
        &self,
        query: &PlayerQuery,
    ) -> ServiceResult<(Vec<(PlayerId, Player)>, usize)>;
    async fn search_players(
        &self,
        text: Option<&str>,
        filter: &SearchFilter,
    ) -> ServiceResult<Vec<(PlayerId, Player)>>;
    async fn count_players(&self) -> ServiceResult<usize>;
    async fn insert_players(&self, players: &[Player]) -> ServiceResult<Vec<(PlayerId, Player)>>;
    async fn collect_stats(&self) -> ServiceResult<CatalogStats>;
}

pub type ArcPlayerService = Arc<Box<dyn PlayerService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerService {
    async fn get_player(&self, id: PlayerId) -> ServiceResult<(PlayerId, Player)>;
    async fn create_player(&self, draft: PlayerDraft) -> ServiceResult<(PlayerId, Player)>;
    async fn update_player(
        &self,
        id: PlayerId,
        update: PlayerUpdate,
    ) -> ServiceResult<(PlayerId, Player)>;
    async fn delete_player(&self, id: PlayerId) -> ServiceResult<()>;
    async fn list_players(&self, query: PlayerQuery) -> ServiceResult<PlayerPage>;
    async fn search_players(
        &self,
        text: Option<String>,
        filter: SearchFilter,
    ) -> ServiceResult<Vec<(PlayerId, Player)>>;
    async fn catalog_stats(&self) -> ServiceResult<CatalogStats>;
    async fn seed_players(&self) -> ServiceResult<Vec<(PlayerId, Player)>>;
}

pub struct PlayerServiceImpl {
    player_repository: ArcPlayerRepository,
}

impl PlayerServiceImpl {
    pub fn new(player_repository: ArcPlayerRepository) -> Self {
        Self { player_repository }
    }

    /// Pre-write existence check for the per-team jersey number. Not
    /// atomic with the following insert/update, so two concurrent writes
    /// can still both pass.
    async fn check_jersey_number(
        &self,
        team: &str,
        jersey_number: u32,
        exclude: Option<PlayerId>,
    ) -> ServiceResult<()> {
        if self
            .player_repository
            .find_by_team_and_number(team, jersey_number, exclude)
            .await?
            .is_some()
        {
            return Err(ServiceError::Validation(vec![format!(
                "Jersey number {} is already taken in team {}",
                jersey_number, team
            )]));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlayerService for PlayerServiceImpl {
    async fn get_player(&self, id: PlayerId) -> ServiceResult<(PlayerId, Player)> {
        match self.player_repository.get_player_by_id(id).await? {
            Some(player) => Ok((id, player)),
            None => ServiceError::not_found("Player not found"),
        }
    }

    async fn create_player(&self, draft: PlayerDraft) -> ServiceResult<(PlayerId, Player)> {
        let draft = draft.trimmed();
        draft.validate_fields()?;
        self.check_jersey_number(&draft.team, draft.jersey_number, None)
            .await?;

        let player = draft.into_player(Utc::now());
        let id = self.player_repository.create_player(&player).await?;
        info!("Created player {} with id {}", player.name, id);
        Ok((id, player))
    }

    async fn update_player(
        &self,
        id: PlayerId,
        update: PlayerUpdate,
    ) -> ServiceResult<(PlayerId, Player)> {
        let Some(mut player) = self.player_repository.get_player_by_id(id).await? else {
            return ServiceError::not_found("Player not found");
        };

        let jersey_changed = update.team.is_some() || update.jersey_number.is_some();
        update.apply(&mut player);
        PlayerDraft::from_player(&player).validate_fields()?;
        if jersey_changed {
            self.check_jersey_number(&player.team, player.jersey_number, Some(id))
                .await?;
        }

        player.updated_at = Utc::now();
        self.player_repository.update_player(id, &player).await?;
        info!("Updated player {} with id {}", player.name, id);
        Ok((id, player))
    }

    async fn delete_player(&self, id: PlayerId) -> ServiceResult<()> {
        if !self.player_repository.delete_player(id).await? {
            return ServiceError::not_found("Player not found");
        }
        info!("Deleted player with id {}", id);
        Ok(())
    }

    async fn list_players(&self, query: PlayerQuery) -> ServiceResult<PlayerPage> {
        let (items, total) = self.player_repository.query_players(&query).await?;
        Ok(PlayerPage {
            items,
            total,
            page: query.page,
            limit: query.limit,
        })
    }

    async fn search_players(
        &self,
        text: Option<String>,
        filter: SearchFilter,
    ) -> ServiceResult<Vec<(PlayerId, Player)>> {
        self.player_repository
            .search_players(text.as_deref(), &filter)
            .await
    }

    async fn catalog_stats(&self) -> ServiceResult<CatalogStats> {
        self.player_repository.collect_stats().await
    }

    async fn seed_players(&self) -> ServiceResult<Vec<(PlayerId, Player)>> {
        let existing = self.player_repository.count_players().await?;
        if existing > 0 {
            return ServiceError::bad_request("Database already contains players");
        }
        let now = Utc::now();
        let players: Vec<Player> = seed::sample_players()
            .into_iter()
            .map(|draft| draft.into_player(now))
            .collect();
        let created = self.player_repository.insert_players(&players).await?;
        info!("Seeded {} players", created.len());
        Ok(created)
    }
}

#[derive(Default)]
pub struct MockPlayerRepository {
    players: std::sync::Mutex<Vec<(PlayerId, Player)>>,
    next_id: std::sync::atomic::AtomicI64,
}

impl MockPlayerRepository {
    pub fn new() -> Self {
        Self {
            players: std::sync::Mutex::new(Vec::new()),
            next_id: std::sync::atomic::AtomicI64::new(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(PlayerId, Player)>> {
        self.players.lock().expect("Failed to lock mock players")
    }

    fn take_id(&self) -> PlayerId {
        self.next_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PlayerRepository for MockPlayerRepository {
    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>> {
        Ok(self
            .lock()
            .iter()
            .find(|(pid, _)| *pid == id)
            .map(|(_, p)| p.clone()))
    }

    async fn create_player(&self, player: &Player) -> ServiceResult<PlayerId> {
        let id = self.take_id();
        self.lock().push((id, player.clone()));
        Ok(id)
    }

    async fn update_player(&self, id: PlayerId, player: &Player) -> ServiceResult<()> {
        for entry in self.lock().iter_mut() {
            if entry.0 == id {
                entry.1 = player.clone();
                return Ok(());
            }
        }
        ServiceError::internal("Player not found in mock repository")
    }

    async fn delete_player(&self, id: PlayerId) -> ServiceResult<bool> {
        let mut players = self.lock();
        let len_before = players.len();
        players.retain(|(pid, _)| *pid != id);
        Ok(players.len() < len_before)
    }

    async fn find_by_team_and_number(
        &self,
        team: &str,
        jersey_number: u32,
        exclude: Option<PlayerId>,
    ) -> ServiceResult<Option<PlayerId>> {
        Ok(self
            .lock()
            .iter()
            .find(|(pid, p)| {
                p.team == team && p.jersey_number == jersey_number && Some(*pid) != exclude
            })
            .map(|(pid, _)| *pid))
    }

    async fn query_players(
        &self,
        query: &PlayerQuery,
    ) -> ServiceResult<(Vec<(PlayerId, Player)>, usize)> {
        let filter = &query.filter;
        let mut matches: Vec<(PlayerId, Player)> = self
            .lock()
            .iter()
            .filter(|(_, p)| {
                filter.team.as_ref().is_none_or(|t| &p.team == t)
                    && filter.nationality.as_ref().is_none_or(|n| &p.nationality == n)
                    && filter.min_age.is_none_or(|a| p.age >= a)
                    && filter.max_age.is_none_or(|a| p.age <= a)
                    && filter.min_rating.is_none_or(|r| p.rating >= r)
                    && filter.position.is_none_or(|pos| p.position == pos)
                    && query.search.as_ref().is_none_or(|s| {
                        let needle = s.to_lowercase();
                        p.name.to_lowercase().contains(&needle)
                            || p.team.to_lowercase().contains(&needle)
                            || p.nationality.to_lowercase().contains(&needle)
                    })
            })
            .cloned()
            .collect();
        matches.sort_by(|(_, a), (_, b)| {
            let ordering = match query.sort_by {
                SortBy::Name => a.name.cmp(&b.name),
                SortBy::Team => a.team.cmp(&b.team),
                SortBy::Nationality => a.nationality.cmp(&b.nationality),
                SortBy::JerseyNumber => a.jersey_number.cmp(&b.jersey_number),
                SortBy::Age => a.age.cmp(&b.age),
                SortBy::Rating => a.rating.cmp(&b.rating),
                SortBy::MarketValue => a.market_value.cmp(&b.market_value),
                SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            match query.sort_order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
        let total = matches.len();
        let items = matches
            .into_iter()
            .skip(query.offset())
            .take(query.limit)
            .collect();
        Ok((items, total))
    }

    async fn search_players(
        &self,
        text: Option<&str>,
        filter: &SearchFilter,
    ) -> ServiceResult<Vec<(PlayerId, Player)>> {
        let mut matches: Vec<(PlayerId, Player)> = self
            .lock()
            .iter()
            .filter(|(_, p)| {
                filter
                    .team
                    .as_ref()
                    .is_none_or(|t| p.team.to_lowercase().contains(&t.to_lowercase()))
                    && filter.nationality.as_ref().is_none_or(|n| {
                        p.nationality.to_lowercase().contains(&n.to_lowercase())
                    })
                    && filter.min_age.is_none_or(|a| p.age >= a)
                    && filter.max_age.is_none_or(|a| p.age <= a)
                    && filter.min_rating.is_none_or(|r| p.rating >= r)
                    && filter.position.is_none_or(|pos| p.position == pos)
                    && text.is_none_or(|s| {
                        let needle = s.to_lowercase();
                        p.name.to_lowercase().contains(&needle)
                            || p.team.to_lowercase().contains(&needle)
                            || p.nationality.to_lowercase().contains(&needle)
                    })
            })
            .cloned()
            .collect();
        matches.sort_by(|(_, a), (_, b)| b.rating.cmp(&a.rating).then(a.name.cmp(&b.name)));
        Ok(matches)
    }

    async fn count_players(&self) -> ServiceResult<usize> {
        Ok(self.lock().len())
    }

    async fn insert_players(&self, players: &[Player]) -> ServiceResult<Vec<(PlayerId, Player)>> {
        let mut created = Vec::with_capacity(players.len());
        for player in players {
            let id = self.take_id();
            self.lock().push((id, player.clone()));
            created.push((id, player.clone()));
        }
        Ok(created)
    }

    async fn collect_stats(&self) -> ServiceResult<CatalogStats> {
        Ok(CatalogStats {
            general: None,
            top_teams: Vec::new(),
            top_nationalities: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_service() -> PlayerServiceImpl {
        PlayerServiceImpl::new(Arc::new(Box::new(MockPlayerRepository::new())))
    }

    fn draft(name: &str, team: &str, jersey_number: u32) -> PlayerDraft {
        PlayerDraft {
            name: name.to_string(),
            team: team.to_string(),
            nationality: "Spain".to_string(),
            jersey_number,
            age: 25,
            image_url: "https://example.com/photo.jpg".to_string(),
            position: Position::Forward,
            rating: DEFAULT_RATING,
            market_value: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_query_offset_saturates() {
        let query = PlayerQuery {
            filter: ListFilter::default(),
            search: None,
            sort_by: SortBy::Rating,
            sort_order: SortOrder::Descending,
            page: 3,
            limit: usize::MAX / 2 + 1,
        };
        assert_eq!(query.offset(), usize::MAX);

        let query = PlayerQuery { page: 3, limit: 10, ..query };
        assert_eq!(query.offset(), 20);
    }

    #[tokio::test]
    async fn test_create_player() {
        let service = make_service();
        let (id, player) = service
            .create_player(draft("Test Player", "Test FC", 7))
            .await
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(player.name, "Test Player");
        assert_eq!(player.rating, DEFAULT_RATING);
        assert!(player.is_active);
        assert_eq!(player.created_at, player.updated_at);
    }

    #[tokio::test]
    async fn test_create_player_trims_whitespace() {
        let service = make_service();
        let mut d = draft("  Test Player  ", " Test FC ", 7);
        d.nationality = " Spain ".to_string();
        let (_, player) = service.create_player(d).await.unwrap();
        assert_eq!(player.name, "Test Player");
        assert_eq!(player.team, "Test FC");
        assert_eq!(player.nationality, "Spain");
    }

    #[tokio::test]
    async fn test_create_player_rejects_invalid_fields() {
        let service = make_service();

        let mut d = draft("Test Player", "Test FC", 7);
        d.age = 15;
        let err = service.create_player(d).await.unwrap_err();
        let ServiceError::Validation(messages) = err else {
            panic!("expected validation error");
        };
        assert!(messages.iter().any(|m| m.contains("age")));

        let mut d = draft("Test Player", "Test FC", 7);
        d.jersey_number = 100;
        assert!(matches!(
            service.create_player(d).await,
            Err(ServiceError::Validation(_))
        ));

        let mut d = draft("Test Player", "Test FC", 7);
        d.image_url = "not-a-url".to_string();
        assert!(matches!(
            service.create_player(d).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_jersey_number_unique_within_team() {
        let service = make_service();
        service
            .create_player(draft("Player One", "Test FC", 10))
            .await
            .unwrap();

        let err = service
            .create_player(draft("Player Two", "Test FC", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // Same number in a different team is fine.
        service
            .create_player(draft("Player Three", "Other FC", 10))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_player() {
        let service = make_service();
        let (id, created) = service
            .create_player(draft("Test Player", "Test FC", 7))
            .await
            .unwrap();

        let update = PlayerUpdate {
            rating: Some(93),
            team: Some("New FC".to_string()),
            ..Default::default()
        };
        let (_, updated) = service.update_player(id, update).await.unwrap();
        assert_eq!(updated.rating, 93);
        assert_eq!(updated.team, "New FC");
        assert_eq!(updated.name, created.name);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_player_not_found() {
        let service = make_service();
        let err = service
            .update_player(42, PlayerUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_player_jersey_conflict() {
        let service = make_service();
        service
            .create_player(draft("Player One", "Test FC", 10))
            .await
            .unwrap();
        let (id, _) = service
            .create_player(draft("Player Two", "Test FC", 11))
            .await
            .unwrap();

        let update = PlayerUpdate {
            jersey_number: Some(10),
            ..Default::default()
        };
        let err = service.update_player(id, update).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // Keeping the own number is not a conflict.
        let update = PlayerUpdate {
            jersey_number: Some(11),
            ..Default::default()
        };
        service.update_player(id, update).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_player_revalidates() {
        let service = make_service();
        let (id, _) = service
            .create_player(draft("Test Player", "Test FC", 7))
            .await
            .unwrap();

        let update = PlayerUpdate {
            rating: Some(101),
            ..Default::default()
        };
        assert!(matches!(
            service.update_player(id, update).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_player() {
        let service = make_service();
        let (id, _) = service
            .create_player(draft("Test Player", "Test FC", 7))
            .await
            .unwrap();
        service.delete_player(id).await.unwrap();
        assert!(matches!(
            service.get_player(id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_player(id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_seed_players() {
        let service = make_service();
        let created = service.seed_players().await.unwrap();
        assert_eq!(created.len(), seed::sample_players().len());

        let err = service.seed_players().await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_list_players_pagination() {
        let service = make_service();
        for i in 1..=5 {
            let mut d = draft(&format!("Player {}", i), "Test FC", i);
            d.rating = 80 + i;
            service.create_player(d).await.unwrap();
        }

        let query = PlayerQuery {
            filter: ListFilter::default(),
            search: None,
            sort_by: SortBy::Rating,
            sort_order: SortOrder::Descending,
            page: 2,
            limit: 2,
        };
        let page = service.list_players(query).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].1.rating, 83);
        assert_eq!(page.items[1].1.rating, 82);
    }
}
