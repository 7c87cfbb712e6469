use std::collections::{HashMap, VecDeque};

use crate::ratings::TeamRatings;
use crate::shotmap::ShotMapRender;

pub const DEFAULT_EXPECTED_GOALS: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub id: String,
    pub league_name: String,
    pub home_team_name: String,
    pub away_team_name: String,
}

impl Fixture {
    pub fn label(&self) -> String {
        format!("{} vs {}", self.home_team_name, self.away_team_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    pub id: Option<u64>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShotEvent {
    Goal,
    OwnGoal,
    Other(String),
}

impl ShotEvent {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Goal") => ShotEvent::Goal,
            Some("Own Goal") => ShotEvent::OwnGoal,
            other => ShotEvent::Other(other.unwrap_or_default().to_string()),
        }
    }

    pub fn is_goal(&self) -> bool {
        matches!(self, ShotEvent::Goal | ShotEvent::OwnGoal)
    }
}

/// A shot with `x`/`y` as percentages of pitch length/width.
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    pub x: f64,
    pub y: f64,
    pub event: ShotEvent,
    pub expected_goals: Option<f64>,
    pub team_id: Option<u64>,
}

impl Shot {
    /// xG used for sizing; absent, zero, negative and non-finite values fall back to 0.1.
    pub fn effective_xg(&self) -> f64 {
        match self.expected_goals {
            Some(xg) if xg.is_finite() && xg > 0.0 => xg,
            _ => DEFAULT_EXPECTED_GOALS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchDetail {
    pub home: TeamRef,
    pub away: TeamRef,
    pub score: Option<String>,
    pub status_reason: Option<String>,
    pub shots: Vec<Shot>,
}

impl MatchDetail {
    /// Falls back only when the field is absent; an empty string is shown as-is.
    pub fn score_label(&self) -> &str {
        self.score.as_deref().unwrap_or("Not Started")
    }

    pub fn status_label(&self) -> &str {
        self.status_reason.as_deref().unwrap_or("N/A")
    }
}

#[derive(Debug, Clone)]
pub struct MatchView {
    pub shot_map: ShotMapRender,
    pub ratings: TeamRatings,
}

#[derive(Debug, Clone)]
pub enum MatchLoad {
    Loading,
    Ready(Box<MatchView>),
    /// The payload was fetched but lacked the structure needed to draw anything.
    NoData,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Fixtures,
    Match { match_id: String },
}

#[derive(Debug)]
pub enum Delta {
    SetFixtures(Vec<Fixture>),
    FixturesFailed(String),
    SetMatch { id: String, load: MatchLoad },
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchFixtures,
    FetchMatch { match_id: String },
}

pub struct AppState {
    pub screen: Screen,
    pub fixtures: Vec<Fixture>,
    pub fixtures_loading: bool,
    pub fixtures_error: Option<String>,
    pub selected: usize,
    pub views: HashMap<String, MatchLoad>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Fixtures,
            fixtures: Vec::new(),
            fixtures_loading: true,
            fixtures_error: None,
            selected: 0,
            views: HashMap::new(),
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    /// Fixture choices in display order, deduplicated by label.
    pub fn choices(&self) -> Vec<(String, String)> {
        crate::fotmob_fetch::fixture_choices(&self.fixtures)
    }

    pub fn selected_match_id(&self) -> Option<String> {
        self.choices()
            .into_iter()
            .nth(self.selected)
            .map(|(_, id)| id)
    }

    pub fn select_next(&mut self) {
        let total = self.choices().len();
        if total == 0 {
            self.selected = 0;
        } else {
            self.selected = (self.selected + 1).min(total - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn current_match_id(&self) -> Option<&str> {
        match &self.screen {
            Screen::Match { match_id } => Some(match_id.as_str()),
            Screen::Fixtures => None,
        }
    }

    pub fn current_load(&self) -> Option<&MatchLoad> {
        self.current_match_id().and_then(|id| self.views.get(id))
    }

    pub fn fixture_label(&self, match_id: &str) -> Option<String> {
        self.fixtures
            .iter()
            .rev()
            .find(|f| f.id == match_id)
            .map(Fixture::label)
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetFixtures(fixtures) => {
            let previous = state.selected_match_id();
            state.fixtures = fixtures;
            state.fixtures_loading = false;
            state.fixtures_error = None;
            let choices = state.choices();
            state.selected = previous
                .and_then(|id| choices.iter().position(|(_, cid)| *cid == id))
                .unwrap_or(0);
        }
        Delta::FixturesFailed(message) => {
            state.fixtures_loading = false;
            state.fixtures_error = Some(message);
        }
        Delta::SetMatch { id, load } => {
            // Keep a ready view on screen while a refetch is in flight.
            if matches!(load, MatchLoad::Loading)
                && matches!(state.views.get(&id), Some(MatchLoad::Ready(_)))
            {
                return;
            }
            state.views.insert(id, load);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
