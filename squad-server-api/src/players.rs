use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use squad_server_domain::{
    ServiceError,
    player::{
        ListFilter, Player, PlayerDraft, PlayerId, PlayerQuery, PlayerUpdate, Position,
        SearchFilter, SortBy, SortOrder,
    },
};

use crate::{ApiError, AppState};

const REQUIRED_FIELDS: [&str; 6] =
    ["name", "team", "nationality", "jerseyNumber", "age", "imageUrl"];

const MAX_PAGE_SIZE: usize = 100;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPlayer {
    id: PlayerId,
    name: String,
    team: String,
    nationality: String,
    jersey_number: u32,
    age: u32,
    image_url: String,
    position: Position,
    rating: u32,
    market_value: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl JsonPlayer {
    fn from_player(id: PlayerId, player: Player) -> Self {
        Self {
            id,
            name: player.name,
            team: player.team,
            nationality: player.nationality,
            jersey_number: player.jersey_number,
            age: player.age,
            image_url: player.image_url,
            position: player.position,
            rating: player.rating,
            market_value: player.market_value,
            is_active: player.is_active,
            created_at: player.created_at,
            updated_at: player.updated_at,
        }
    }
}

fn to_json_players(items: Vec<(PlayerId, Player)>) -> Vec<JsonPlayer> {
    items
        .into_iter()
        .map(|(id, player)| JsonPlayer::from_player(id, player))
        .collect()
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    page: Option<usize>,
    limit: Option<usize>,
    search: Option<String>,
    team: Option<String>,
    nationality: Option<String>,
    min_age: Option<u32>,
    max_age: Option<u32>,
    min_rating: Option<u32>,
    position: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

fn build_query(params: ListParams) -> Result<PlayerQuery, ServiceError> {
    let position = params
        .position
        .as_deref()
        .map(|s| {
            Position::parse(s.trim())
                .ok_or_else(|| ServiceError::BadRequest("Invalid position filter".to_string()))
        })
        .transpose()?;

    let sort_by = params
        .sort_by
        .as_deref()
        .and_then(|s| {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            Some(
                SortBy::parse(s)
                    .ok_or_else(|| ServiceError::BadRequest("Invalid sort field".to_string())),
            )
        })
        .transpose()?
        .unwrap_or(SortBy::Rating);

    let sort_order = params
        .sort_order
        .as_deref()
        .and_then(|s| match s.trim().to_lowercase().as_str() {
            "asc" => Some(Ok(SortOrder::Ascending)),
            "desc" => Some(Ok(SortOrder::Descending)),
            "" => None,
            _ => Some(Err(ServiceError::BadRequest(
                "Invalid sort order".to_string(),
            ))),
        })
        .transpose()?
        .unwrap_or(SortOrder::Descending);

    Ok(PlayerQuery {
        filter: ListFilter {
            team: params.team,
            nationality: params.nationality,
            min_age: params.min_age,
            max_age: params.max_age,
            min_rating: params.min_rating,
            position,
        },
        search: params.search,
        sort_by,
        sort_order,
        page: params.page.filter(|&p| p > 0).unwrap_or(1),
        limit: params
            .limit
            .filter(|&l| l > 0)
            .unwrap_or(10)
            .min(MAX_PAGE_SIZE),
    })
}

#[derive(Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PaginationInfo {
    current_page: usize,
    total_pages: usize,
    total_players: usize,
    has_next: bool,
    has_prev: bool,
}

fn pagination_info(total: usize, page: usize, limit: usize, returned: usize) -> PaginationInfo {
    let seen = page
        .saturating_sub(1)
        .saturating_mul(limit)
        .saturating_add(returned);
    PaginationInfo {
        current_page: page,
        total_pages: total.div_ceil(limit),
        total_players: total,
        has_next: seen < total,
        has_prev: page > 1,
    }
}

pub async fn get_all(
    State(app_state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = build_query(params)?;
    let page = app_state.players.list_players(query).await?;
    let pagination = pagination_info(page.total, page.page, page.limit, page.items.len());
    Ok(Json(json!({
        "success": true,
        "data": to_json_players(page.items),
        "pagination": pagination,
    })))
}

#[derive(serde::Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    filters: Option<String>,
}

#[derive(Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFilterParams {
    team: Option<String>,
    nationality: Option<String>,
    min_age: Option<u32>,
    max_age: Option<u32>,
    min_rating: Option<u32>,
    position: Option<Position>,
}

fn parse_search_filter(raw: Option<&str>) -> Result<SearchFilter, ServiceError> {
    let params: SearchFilterParams = match raw {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| ServiceError::BadRequest(format!("Invalid filters: {}", e)))?,
        None => SearchFilterParams::default(),
    };
    Ok(SearchFilter {
        team: params.team,
        nationality: params.nationality,
        min_age: params.min_age,
        max_age: params.max_age,
        min_rating: params.min_rating,
        position: params.position,
    })
}

pub async fn search(
    State(app_state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filter = parse_search_filter(params.filters.as_deref())?;

    let items = app_state.players.search_players(params.q, filter).await?;
    let data = to_json_players(items);
    Ok(Json(json!({
        "success": true,
        "count": data.len(),
        "data": data,
    })))
}

pub async fn stats(
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let stats = app_state.players.catalog_stats().await?;
    let general = match stats.general {
        Some(general) => json!(general),
        None => json!({}),
    };
    Ok(Json(json!({
        "success": true,
        "data": {
            "general": general,
            "topTeams": stats.top_teams,
            "topNationalities": stats.top_nationalities,
        },
    })))
}

fn parse_id(raw: &str) -> Result<PlayerId, ServiceError> {
    raw.parse()
        .map_err(|e| ServiceError::BadRequest(format!("Invalid player ID: {}", e)))
}

pub async fn get_by_id(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (id, player) = app_state.players.get_player(parse_id(&id)?).await?;
    Ok(Json(json!({
        "success": true,
        "data": JsonPlayer::from_player(id, player),
    })))
}

fn missing_fields(body: &serde_json::Value) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .filter(|field| body.get(**field).is_none_or(|v| v.is_null()))
        .copied()
        .collect()
}

pub async fn create(
    State(app_state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ApiError> {
    let missing = missing_fields(&body);
    if !missing.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "Missing required fields",
                "missingFields": missing,
            })),
        )
            .into_response());
    }

    let draft: PlayerDraft = serde_json::from_value(body)
        .map_err(|e| ServiceError::BadRequest(format!("Invalid player payload: {}", e)))?;
    let (id, player) = app_state.players.create_player(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Player created successfully",
            "data": JsonPlayer::from_player(id, player),
        })),
    )
        .into_response())
}

pub async fn update(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(update): Json<PlayerUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (id, player) = app_state
        .players
        .update_player(parse_id(&id)?, update)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Player updated successfully",
        "data": JsonPlayer::from_player(id, player),
    })))
}

pub async fn delete(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    app_state.players.delete_player(parse_id(&id)?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Player deleted successfully",
    })))
}

pub async fn seed(State(app_state): State<AppState>) -> Result<Response, ApiError> {
    let created = app_state.players.seed_players().await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": format!("{} players created successfully", created.len()),
            "data": to_json_players(created),
        })),
    )
        .into_response())
}
