use crate::player::{PlayerDraft, Position};

fn sample(
    name: &str,
    team: &str,
    nationality: &str,
    jersey_number: u32,
    age: u32,
    image_url: &str,
    rating: u32,
    market_value: i64,
) -> PlayerDraft {
    PlayerDraft {
        name: name.to_string(),
        team: team.to_string(),
        nationality: nationality.to_string(),
        jersey_number,
        age,
        image_url: image_url.to_string(),
        position: Position::Forward,
        rating,
        market_value,
        is_active: true,
    }
}

/// Demo catalog content for `POST /api/players/seed`.
pub fn sample_players() -> Vec<PlayerDraft> {
    vec![
        sample(
            "Lionel Messi",
            "Inter Miami",
            "Argentina",
            10,
            36,
            "https://img.a.transfermarkt.technology/portrait/big/28003-1671435885.jpg",
            95,
            50_000_000,
        ),
        sample(
            "Kylian Mbappé",
            "Real Madrid",
            "France",
            7,
            24,
            "https://img.a.transfermarkt.technology/portrait/big/342229-1682683695.jpg",
            92,
            180_000_000,
        ),
        sample(
            "Erling Haaland",
            "Manchester City",
            "Norway",
            9,
            23,
            "https://img.a.transfermarkt.technology/portrait/big/418560-1709108116.png",
            91,
            150_000_000,
        ),
        sample(
            "Sadio Mané",
            "Bayern Munich",
            "Senegal",
            10,
            32,
            "https://img.a.transfermarkt.technology/portrait/big/200512-1678272160.jpg",
            88,
            30_000_000,
        ),
        sample(
            "Robert Lewandowski",
            "Barcelona",
            "Poland",
            9,
            34,
            "https://img.a.transfermarkt.technology/portrait/big/38253-1701118759.jpg",
            89,
            25_000_000,
        ),
    ]
}
