use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::FeedConfig;
use crate::http_client::fetch_text;
use crate::state::{Fixture, MatchDetail, Shot, ShotEvent, TeamRef};

pub fn fetch_fixtures(config: &FeedConfig) -> Result<Vec<Fixture>> {
    let url = config.fixtures_url();
    let body = fetch_text(config, &url).context("fixtures request failed")?;
    parse_fixtures_json(&body)
}

pub fn fetch_match_payload(config: &FeedConfig, match_id: &str) -> Result<MatchPayload> {
    let url = config.match_details_url(match_id);
    let body = fetch_text(config, &url)
        .with_context(|| format!("matchDetails request failed for {match_id}"))?;
    parse_match_payload_json(&body)
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Fixture>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let data: FixturesResponse = serde_json::from_str(trimmed).context("invalid fixtures json")?;
    Ok(build_fixtures(data))
}

pub fn parse_match_payload_json(raw: &str) -> Result<MatchPayload> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(MatchPayload::default());
    }
    serde_json::from_str(trimmed).context("invalid matchDetails json")
}

/// Ordered `"{home} vs {away}"` -> match id choices. A repeated label keeps its
/// first position but takes the id of its last occurrence.
pub fn fixture_choices(fixtures: &[Fixture]) -> Vec<(String, String)> {
    let mut choices: Vec<(String, String)> = Vec::new();
    for fixture in fixtures {
        let label = fixture.label();
        if let Some(existing) = choices.iter_mut().find(|(l, _)| *l == label) {
            existing.1 = fixture.id.clone();
        } else {
            choices.push((label, fixture.id.clone()));
        }
    }
    choices
}

#[derive(Debug, Deserialize)]
struct FixturesResponse {
    #[serde(default, deserialize_with = "lenient_seq")]
    leagues: Vec<FixtureLeague>,
}

#[derive(Debug, Default, Deserialize)]
struct FixtureLeague {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    matches: Vec<FixtureMatch>,
}

#[derive(Debug, Default, Deserialize)]
struct FixtureMatch {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    home: Option<FixtureTeam>,
    #[serde(default, deserialize_with = "lenient")]
    away: Option<FixtureTeam>,
}

#[derive(Debug, Default, Deserialize)]
struct FixtureTeam {
    #[serde(rename = "longName", default, deserialize_with = "lenient")]
    long_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

impl FixtureTeam {
    fn display_name(self) -> Option<String> {
        self.long_name
            .or(self.name)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
    }
}

fn build_fixtures(data: FixturesResponse) -> Vec<Fixture> {
    let mut fixtures = Vec::new();
    for league in data.leagues {
        let league_name = league.name.unwrap_or_default();
        for fixture in league.matches {
            let Some(id) = fixture.id.as_ref().and_then(value_to_id) else {
                continue;
            };
            let Some(home) = fixture.home.and_then(FixtureTeam::display_name) else {
                continue;
            };
            let Some(away) = fixture.away.and_then(FixtureTeam::display_name) else {
                continue;
            };
            fixtures.push(Fixture {
                id,
                league_name: league_name.clone(),
                home_team_name: home,
                away_team_name: away,
            });
        }
    }
    fixtures
}

/// The subset of a `matchDetails` response this crate reads. Every level is
/// optional and every field is decoded leniently: a value of the wrong type
/// reads as absent, so absence is resolved by the consumers, never by the parser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub header: Option<PayloadHeader>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<PayloadContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadHeader {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub teams: Vec<PayloadTeam>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<PayloadStatus>,
    /// `Some` whenever the key is present, including an explicit `null`.
    #[serde(default, deserialize_with = "present")]
    pub events: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadTeam {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadStatus {
    #[serde(rename = "scoreStr", default, deserialize_with = "lenient")]
    pub score_str: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub reason: Option<PayloadReason>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadReason {
    #[serde(default, deserialize_with = "lenient")]
    pub long: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadContent {
    #[serde(default, deserialize_with = "lenient")]
    pub shotmap: Option<PayloadShotmap>,
    /// Lineups and player stats vary too much between feeds to type; both are
    /// walked per entry.
    #[serde(default)]
    pub lineup: Option<Value>,
    #[serde(rename = "playerStats", default)]
    pub player_stats: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadShotmap {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub shots: Vec<PayloadShot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadShot {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub y: Option<f64>,
    #[serde(rename = "teamId", default, deserialize_with = "lenient_u64")]
    pub team_id: Option<u64>,
    #[serde(rename = "eventType", default, deserialize_with = "lenient")]
    pub event_type: Option<String>,
    #[serde(rename = "expectedGoals", default, deserialize_with = "lenient_f64")]
    pub expected_goals: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Starter {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl Starter {
    fn from_value(value: &Value) -> Starter {
        let name = pick_string(value, &["name", "playerName", "fullName"])
            .or_else(|| {
                value
                    .get("name")
                    .and_then(|n| pick_string(n, &["fullName", "lastName"]))
            })
            .or_else(|| {
                value
                    .get("player")
                    .and_then(|p| pick_string(p, &["name", "fullName"]))
            });
        Starter {
            id: value.get("id").and_then(value_to_id),
            name,
        }
    }
}

impl MatchPayload {
    /// `None` when the payload lacks a header, the header `events` key, or two named teams.
    pub fn to_match_detail(&self) -> Option<MatchDetail> {
        let header = self.header.as_ref()?;
        header.events.as_ref()?;
        let home = team_ref(header.teams.first()?)?;
        let away = team_ref(header.teams.get(1)?)?;

        let status = header.status.as_ref();
        let score = status.and_then(|s| s.score_str.clone());
        let status_reason = status
            .and_then(|s| s.reason.as_ref())
            .and_then(|r| r.long.clone());

        let shots = self
            .content
            .as_ref()
            .and_then(|c| c.shotmap.as_ref())
            .map(|m| m.shots.iter().filter_map(to_shot).collect())
            .unwrap_or_default();

        Some(MatchDetail {
            home,
            away,
            score,
            status_reason,
            shots,
        })
    }

    pub fn lineup(&self) -> Option<&Value> {
        self.content.as_ref().and_then(|c| c.lineup.as_ref())
    }

    pub fn home_starters(&self) -> Vec<Starter> {
        self.starters("homeTeam")
    }

    pub fn away_starters(&self) -> Vec<Starter> {
        self.starters("awayTeam")
    }

    fn starters(&self, side: &str) -> Vec<Starter> {
        self.lineup()
            .and_then(|lineup| lineup.get(side))
            .and_then(|team| team.get("starters"))
            .and_then(Value::as_array)
            .map(|starters| starters.iter().map(Starter::from_value).collect())
            .unwrap_or_default()
    }

    pub fn player_stats(&self) -> Option<&Value> {
        self.content.as_ref().and_then(|c| c.player_stats.as_ref())
    }
}

fn team_ref(team: &PayloadTeam) -> Option<TeamRef> {
    let name = team.name.as_deref()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(TeamRef {
        id: team.id,
        name: name.to_string(),
    })
}

fn to_shot(raw: &PayloadShot) -> Option<Shot> {
    Some(Shot {
        x: raw.x?,
        y: raw.y?,
        event: ShotEvent::from_raw(raw.event_type.as_deref()),
        expected_goals: raw.expected_goals,
        team_id: raw.team_id,
    })
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Non-arrays read as empty; an entry of the wrong shape keeps its slot as `T::default()`.
fn lenient_seq<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| T::deserialize(item).unwrap_or_default())
        .collect())
}

fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
