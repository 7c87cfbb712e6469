use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::Result;
use chrono::Local;

use crate::config::{FeedConfig, FeedSource};
use crate::fotmob_fetch::{self, MatchPayload};
use crate::pitch::PitchDims;
use crate::ratings::extract_ratings;
use crate::shotmap::render_match;
use crate::state::{Delta, Fixture, MatchLoad, MatchView, ProviderCommand};

const DEMO_FIXTURES: &str = include_str!("../data/demo_fixtures.json");
const DEMO_MATCH: &str = include_str!("../data/demo_match.json");

pub trait MatchSource {
    fn fixtures(&self) -> Result<Vec<Fixture>>;
    fn match_payload(&self, match_id: &str) -> Result<MatchPayload>;
}

pub struct FotmobSource {
    config: FeedConfig,
}

impl FotmobSource {
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }
}

impl MatchSource for FotmobSource {
    fn fixtures(&self) -> Result<Vec<Fixture>> {
        fotmob_fetch::fetch_fixtures(&self.config)
    }

    fn match_payload(&self, match_id: &str) -> Result<MatchPayload> {
        fotmob_fetch::fetch_match_payload(&self.config, match_id)
    }
}

/// Bundled sample data; every match id resolves to the same demo match.
pub struct DemoSource;

impl MatchSource for DemoSource {
    fn fixtures(&self) -> Result<Vec<Fixture>> {
        fotmob_fetch::parse_fixtures_json(DEMO_FIXTURES)
    }

    fn match_payload(&self, _match_id: &str) -> Result<MatchPayload> {
        fotmob_fetch::parse_match_payload_json(DEMO_MATCH)
    }
}

pub fn source_for(config: &FeedConfig) -> Box<dyn MatchSource + Send> {
    match config.source {
        FeedSource::Fotmob => Box::new(FotmobSource::new(config.clone())),
        FeedSource::Demo => Box::new(DemoSource),
    }
}

/// One worker, one command at a time: each fetch completes before the next starts.
pub fn spawn_provider(config: FeedConfig, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let source = source_for(&config);
        let _ = tx.send(log_line(
            "INFO",
            &format!(
                "Feed source: {}",
                match config.source {
                    FeedSource::Fotmob => config.base_url.as_str(),
                    FeedSource::Demo => "demo",
                }
            ),
        ));
        while let Ok(cmd) = cmd_rx.recv() {
            handle_command(source.as_ref(), cmd, &tx);
        }
    });
}

pub fn handle_command(source: &dyn MatchSource, cmd: ProviderCommand, tx: &Sender<Delta>) {
    match cmd {
        ProviderCommand::FetchFixtures => match source.fixtures() {
            Ok(fixtures) => {
                let _ = tx.send(log_line(
                    "INFO",
                    &format!("Loaded {} fixtures", fixtures.len()),
                ));
                let _ = tx.send(Delta::SetFixtures(fixtures));
            }
            Err(err) => {
                let _ = tx.send(log_line("WARN", &format!("Fixtures error: {err:#}")));
                let _ = tx.send(Delta::FixturesFailed(format!(
                    "failed to load fixtures: {err}"
                )));
            }
        },
        ProviderCommand::FetchMatch { match_id } => {
            let _ = tx.send(Delta::SetMatch {
                id: match_id.clone(),
                load: MatchLoad::Loading,
            });
            let load = load_match(source, &match_id);
            let msg = match &load {
                MatchLoad::Ready(view) => log_line(
                    "INFO",
                    &format!(
                        "Match {match_id}: {} shots, {}+{} rated starters",
                        view.shot_map.figure.markers().count(),
                        view.ratings.home.len(),
                        view.ratings.away.len()
                    ),
                ),
                MatchLoad::NoData => {
                    log_line("INFO", &format!("Match {match_id}: nothing to display"))
                }
                MatchLoad::Failed(reason) => {
                    log_line("WARN", &format!("Match {match_id}: {reason}"))
                }
                MatchLoad::Loading => log_line("INFO", &format!("Match {match_id}: loading")),
            };
            let _ = tx.send(msg);
            let _ = tx.send(Delta::SetMatch {
                id: match_id,
                load,
            });
        }
    }
}

/// Fetches one payload and derives both the shot map and the ratings from it.
pub fn load_match(source: &dyn MatchSource, match_id: &str) -> MatchLoad {
    let payload = match source.match_payload(match_id) {
        Ok(payload) => payload,
        Err(err) => return MatchLoad::Failed(format!("failed to load match data: {err:#}")),
    };
    let Some(shot_map) = render_match(&payload, PitchDims::default()) else {
        return MatchLoad::NoData;
    };
    let ratings = extract_ratings(&payload);
    MatchLoad::Ready(Box::new(MatchView { shot_map, ratings }))
}

fn log_line(level: &str, msg: &str) -> Delta {
    Delta::Log(format!("{} [{level}] {msg}", Local::now().format("%H:%M:%S")))
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use anyhow::anyhow;

    use super::*;

    struct BrokenSource;

    impl MatchSource for BrokenSource {
        fn fixtures(&self) -> Result<Vec<Fixture>> {
            Err(anyhow!("connection refused"))
        }

        fn match_payload(&self, _match_id: &str) -> Result<MatchPayload> {
            Err(anyhow!("connection refused"))
        }
    }

    struct EmptySource;

    impl MatchSource for EmptySource {
        fn fixtures(&self) -> Result<Vec<Fixture>> {
            Ok(Vec::new())
        }

        fn match_payload(&self, _match_id: &str) -> Result<MatchPayload> {
            fotmob_fetch::parse_match_payload_json(r#"{"content":{}}"#)
        }
    }

    struct RawSource(&'static str);

    impl MatchSource for RawSource {
        fn fixtures(&self) -> Result<Vec<Fixture>> {
            Ok(Vec::new())
        }

        fn match_payload(&self, _match_id: &str) -> Result<MatchPayload> {
            fotmob_fetch::parse_match_payload_json(self.0)
        }
    }

    #[test]
    fn odd_lineup_and_string_team_id_still_render() {
        let source = RawSource(
            r#"{"header":{"events":{},"teams":[{"id":1,"name":"A"},{"id":2,"name":"B"}]},
            "content":{"shotmap":{"shots":[{"x":50,"y":50,"teamId":"1","eventType":"Goal"}]},
            "lineup":{"homeTeam":{"starters":[{"id":9,"name":{"fullName":"X"}}]}}}}"#,
        );
        let MatchLoad::Ready(view) = load_match(&source, "1") else {
            panic!("match should render");
        };
        let marker = view
            .shot_map
            .figure
            .markers()
            .next()
            .expect("one marker");
        assert_eq!(marker.color, crate::shotmap::HOME_COLOR);
        assert_eq!(view.ratings.home.len(), 1);
        assert_eq!(view.ratings.home[0].name, "X");
        assert_eq!(view.ratings.home[0].rating, crate::ratings::Rating::NoRating);
    }

    #[test]
    fn demo_match_is_ready() {
        let MatchLoad::Ready(view) = load_match(&DemoSource, "900001") else {
            panic!("demo match should render");
        };
        assert_eq!(view.shot_map.home_name, "Liverpool");
        assert_eq!(view.shot_map.figure.markers().count(), 7);
        assert_eq!(view.ratings.home.len(), 4);
        assert_eq!(view.ratings.away.len(), 3);
    }

    #[test]
    fn transport_failure_is_reported_not_raised() {
        let load = load_match(&BrokenSource, "1");
        let MatchLoad::Failed(reason) = load else {
            panic!("expected failure");
        };
        assert!(reason.starts_with("failed to load match data"));
    }

    #[test]
    fn missing_header_is_no_data() {
        assert!(matches!(load_match(&EmptySource, "1"), MatchLoad::NoData));
    }

    #[test]
    fn fetch_match_sends_loading_then_result() {
        let (tx, rx) = mpsc::channel();
        handle_command(
            &DemoSource,
            ProviderCommand::FetchMatch {
                match_id: "900002".to_string(),
            },
            &tx,
        );
        drop(tx);
        let deltas: Vec<Delta> = rx.into_iter().collect();
        assert!(matches!(
            deltas.first(),
            Some(Delta::SetMatch {
                load: MatchLoad::Loading,
                ..
            })
        ));
        assert!(matches!(
            deltas.last(),
            Some(Delta::SetMatch {
                load: MatchLoad::Ready(_),
                ..
            })
        ));
    }

    #[test]
    fn fixtures_failure_surfaces_message() {
        let (tx, rx) = mpsc::channel();
        handle_command(&BrokenSource, ProviderCommand::FetchFixtures, &tx);
        drop(tx);
        let failed = rx
            .into_iter()
            .any(|d| matches!(d, Delta::FixturesFailed(ref msg) if msg.contains("connection refused")));
        assert!(failed);
    }
}
