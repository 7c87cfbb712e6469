use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::figure::Rgb;
use crate::fotmob_fetch::{MatchPayload, Starter};

pub const RATING_STAT_KEY: &str = "FotMob rating";
pub const UNKNOWN_PLAYER: &str = "Unknown Player";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rating {
    Value(f64),
    NoRating,
}

impl Rating {
    pub fn from_value(value: &Value) -> Rating {
        match value {
            Value::Number(n) => n.as_f64().map(Rating::Value).unwrap_or(Rating::NoRating),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Rating::Value)
                .unwrap_or(Rating::NoRating),
            _ => Rating::NoRating,
        }
    }

    pub fn tier(&self) -> RatingTier {
        RatingTier::for_rating(self)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Value(v) => write!(f, "{v:.1}"),
            Rating::NoRating => f.write_str("No Rating"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRating {
    pub name: String,
    pub rating: Rating,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamRatings {
    pub home: Vec<PlayerRating>,
    pub away: Vec<PlayerRating>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatingTier {
    Exceptional,
    Good,
    Average,
    Poor,
    Unrated,
}

impl RatingTier {
    pub const ALL: [RatingTier; 5] = [
        RatingTier::Exceptional,
        RatingTier::Good,
        RatingTier::Average,
        RatingTier::Poor,
        RatingTier::Unrated,
    ];

    pub fn for_value(value: f64) -> RatingTier {
        if !value.is_finite() {
            RatingTier::Unrated
        } else if value >= 9.0 {
            RatingTier::Exceptional
        } else if value >= 7.0 {
            RatingTier::Good
        } else if value >= 6.0 {
            RatingTier::Average
        } else {
            RatingTier::Poor
        }
    }

    pub fn for_rating(rating: &Rating) -> RatingTier {
        match rating {
            Rating::Value(v) => RatingTier::for_value(*v),
            Rating::NoRating => RatingTier::Unrated,
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            RatingTier::Exceptional => Rgb(0x8A, 0x2B, 0xE2),
            RatingTier::Good => Rgb(0x00, 0xFF, 0x00),
            RatingTier::Average => Rgb(0xFF, 0xA5, 0x00),
            RatingTier::Poor => Rgb(0xFF, 0x00, 0x00),
            RatingTier::Unrated => Rgb(0x00, 0x00, 0x00),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RatingTier::Exceptional => "exceptional",
            RatingTier::Good => "good",
            RatingTier::Average => "average",
            RatingTier::Poor => "poor",
            RatingTier::Unrated => "unrated",
        }
    }
}

/// Tier for a rating as displayed text; anything not numeric is unrated.
pub fn color_for(text: &str) -> RatingTier {
    text.trim()
        .parse::<f64>()
        .map(RatingTier::for_value)
        .unwrap_or(RatingTier::Unrated)
}

#[derive(Debug, Default, Deserialize)]
struct PlayerStatsEntry {
    #[serde(default)]
    stats: Option<Vec<Value>>,
}

pub fn extract_ratings(payload: &MatchPayload) -> TeamRatings {
    let player_stats = payload.player_stats().and_then(Value::as_object);
    TeamRatings {
        home: side_ratings(&payload.home_starters(), player_stats),
        away: side_ratings(&payload.away_starters(), player_stats),
    }
}

fn side_ratings(
    starters: &[Starter],
    player_stats: Option<&Map<String, Value>>,
) -> Vec<PlayerRating> {
    starters
        .iter()
        .map(|player| {
            let name = player
                .name
                .clone()
                .unwrap_or_else(|| UNKNOWN_PLAYER.to_string());
            let rating = player
                .id
                .as_deref()
                .map(|id| lookup_rating(player_stats, id))
                .unwrap_or(Rating::NoRating);
            PlayerRating { name, rating }
        })
        .collect()
}

/// `playerStats[id].stats[*].stats["FotMob rating"].stat.value`, first match wins.
pub fn lookup_rating(player_stats: Option<&Map<String, Value>>, player_id: &str) -> Rating {
    let Some(entry) = player_stats.and_then(|stats| stats.get(player_id)) else {
        return Rating::NoRating;
    };
    let Ok(entry) = PlayerStatsEntry::deserialize(entry) else {
        return Rating::NoRating;
    };
    for category in entry.stats.unwrap_or_default() {
        let Some(item) = category
            .get("stats")
            .and_then(Value::as_object)
            .and_then(|stats| stats.get(RATING_STAT_KEY))
        else {
            continue;
        };
        return item
            .get("stat")
            .and_then(|stat| stat.get("value"))
            .map(Rating::from_value)
            .unwrap_or(Rating::NoRating);
    }
    Rating::NoRating
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(RatingTier::for_value(9.5), RatingTier::Exceptional);
        assert_eq!(RatingTier::for_value(9.0), RatingTier::Exceptional);
        assert_eq!(RatingTier::for_value(7.0), RatingTier::Good);
        assert_eq!(RatingTier::for_value(6.999), RatingTier::Average);
        assert_eq!(RatingTier::for_value(6.0), RatingTier::Average);
        assert_eq!(RatingTier::for_value(5.9), RatingTier::Poor);
        assert_eq!(RatingTier::for_value(f64::INFINITY), RatingTier::Unrated);
    }

    #[test]
    fn tier_colours_are_distinct() {
        let mut colors: Vec<u32> = RatingTier::ALL.iter().map(|t| t.color().as_u32()).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), RatingTier::ALL.len());
    }

    #[test]
    fn rating_value_accepts_numbers_and_numeric_text() {
        assert_eq!(Rating::from_value(&json!(7.4)), Rating::Value(7.4));
        assert_eq!(Rating::from_value(&json!("8.1")), Rating::Value(8.1));
        assert_eq!(Rating::from_value(&json!("-")), Rating::NoRating);
        assert_eq!(Rating::from_value(&json!(null)), Rating::NoRating);
        assert_eq!(Rating::NoRating.to_string(), "No Rating");
    }

    #[test]
    fn ratings_display_with_one_decimal() {
        assert_eq!(Rating::Value(7.0).to_string(), "7.0");
        assert_eq!(Rating::Value(8.26).to_string(), "8.3");
        assert_eq!(Rating::Value(6.9).to_string(), "6.9");
    }

    #[test]
    fn lookup_skips_categories_without_the_rating() {
        let stats = json!({
            "10": {"stats": [
                {"stats": {"Minutes played": {"stat": {"value": 90}}}},
                {"stats": {"FotMob rating": {"stat": {"value": 7.8}}}}
            ]},
            "11": {"stats": [{"stats": {"FotMob rating": {"stat": {}}}}]},
            "12": {"stats": "unexpected"},
            "13": {}
        });
        let map = stats.as_object();
        assert_eq!(lookup_rating(map, "10"), Rating::Value(7.8));
        assert_eq!(lookup_rating(map, "11"), Rating::NoRating);
        assert_eq!(lookup_rating(map, "12"), Rating::NoRating);
        assert_eq!(lookup_rating(map, "13"), Rating::NoRating);
        assert_eq!(lookup_rating(None, "10"), Rating::NoRating);
    }
}
