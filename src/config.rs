use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.fotmob.com/api/data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    Fotmob,
    Demo,
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub source: FeedSource,
    pub base_url: String,
    pub fixtures_date: Option<String>,
    pub retries: u32,
    pub timeout: Duration,
    pub export_dir: PathBuf,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source: FeedSource::Fotmob,
            base_url: DEFAULT_BASE_URL.to_string(),
            fixtures_date: None,
            retries: 2,
            timeout: Duration::from_secs(10),
            export_dir: PathBuf::from("."),
        }
    }
}

impl FeedConfig {
    /// Loads `.env.local` / `.env` first, then reads the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let source = match opt_env("FEED_SOURCE")
            .map(|val| val.trim().to_lowercase())
            .as_deref()
        {
            Some("demo") => FeedSource::Demo,
            _ => FeedSource::Fotmob,
        };
        let base_url = opt_env("FOTMOB_BASE_URL")
            .map(|val| val.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let retries = env::var("FETCH_RETRIES")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(2)
            .clamp(0, 5);
        let timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(10)
            .clamp(2, 60);
        let export_dir = opt_env("EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            source,
            base_url,
            fixtures_date: opt_env("FIXTURES_DATE").map(|val| normalize_fotmob_date(&val)),
            retries,
            timeout: Duration::from_secs(timeout_secs),
            export_dir,
        }
    }

    pub fn fixtures_url(&self) -> String {
        match self.fixtures_date.as_deref() {
            Some(date) => format!("{}/matches?date={date}", self.base_url),
            None => format!("{}/matches", self.base_url),
        }
    }

    pub fn match_details_url(&self, match_id: &str) -> String {
        format!("{}/matchDetails?matchId={}", self.base_url, match_id.trim())
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}

/// FotMob wants `YYYYMMDD`; accepts `YYYY-MM-DD` and similar.
pub fn normalize_fotmob_date(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 8 {
        digits
    } else {
        raw.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{FeedConfig, normalize_fotmob_date};

    #[test]
    fn fotmob_date_is_compacted() {
        assert_eq!(normalize_fotmob_date("2026-06-11"), "20260611");
        assert_eq!(normalize_fotmob_date(" 20260611 "), "20260611");
        assert_eq!(normalize_fotmob_date("tomorrow"), "tomorrow");
    }

    #[test]
    fn urls_include_date_and_match_id() {
        let mut config = FeedConfig::default();
        assert_eq!(
            config.fixtures_url(),
            "https://www.fotmob.com/api/data/matches"
        );
        config.fixtures_date = Some("20260611".to_string());
        assert_eq!(
            config.fixtures_url(),
            "https://www.fotmob.com/api/data/matches?date=20260611"
        );
        assert_eq!(
            config.match_details_url(" 4506263 "),
            "https://www.fotmob.com/api/data/matchDetails?matchId=4506263"
        );
    }
}
