use serde::Serialize;

/// Aggregated numbers over the whole catalog. `general` is `None` when the
/// catalog is empty, since averages are meaningless without rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStats {
    pub general: Option<GeneralStats>,
    pub top_teams: Vec<TeamStats>,
    pub top_nationalities: Vec<NationalityStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStats {
    pub total_players: u64,
    pub average_age: f64,
    pub average_rating: f64,
    pub min_age: u32,
    pub max_age: u32,
    pub min_rating: u32,
    pub max_rating: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub team: String,
    pub count: u64,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalityStats {
    pub nationality: String,
    pub count: u64,
}
