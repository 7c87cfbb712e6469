use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use rand::Rng;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};

use crate::config::FeedConfig;

const RETRY_BASE_MS: u64 = 300;
const RETRY_JITTER_MS: u64 = 120;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")
    })
}

enum Attempt {
    Retry(anyhow::Error),
    Fatal(anyhow::Error),
}

/// GETs `url` and returns the body. Transport errors and 5xx are retried
/// `config.retries` times with jittered exponential backoff.
pub fn fetch_text(config: &FeedConfig, url: &str) -> Result<String> {
    let client = http_client(config.timeout)?;
    let mut attempt = 0u32;
    loop {
        match fetch_once(client, url) {
            Ok(body) => return Ok(body),
            Err(Attempt::Fatal(err)) => return Err(err),
            Err(Attempt::Retry(err)) => {
                if attempt >= config.retries {
                    return Err(err.context(format!("giving up after {} attempts", attempt + 1)));
                }
                thread::sleep(backoff_delay(attempt));
                attempt += 1;
            }
        }
    }
}

fn fetch_once(client: &Client, url: &str) -> std::result::Result<String, Attempt> {
    let resp = client
        .get(url)
        .header(USER_AGENT, "Mozilla/5.0")
        .header(ACCEPT, "application/json")
        .send()
        .context("request failed")
        .map_err(Attempt::Retry)?;
    let status = resp.status();
    // Consuming the body releases the connection back to the pool on every path.
    let body = resp
        .text()
        .context("failed reading body")
        .map_err(Attempt::Retry)?;

    if status.is_success() {
        Ok(body)
    } else if status.is_server_error() {
        Err(Attempt::Retry(anyhow!("http {}: {}", status, body)))
    } else {
        Err(Attempt::Fatal(anyhow!("http {}: {}", status, body)))
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let base = RETRY_BASE_MS.saturating_mul(1u64 << attempt.min(6));
    let jitter = rand::thread_rng().gen_range(0..=RETRY_JITTER_MS);
    Duration::from_millis(base + jitter)
}

#[cfg(test)]
mod tests {
    use super::backoff_delay;

    #[test]
    fn backoff_grows_with_attempts() {
        let first = backoff_delay(0).as_millis();
        let third = backoff_delay(2).as_millis();
        assert!((300..=420).contains(&first));
        assert!((1200..=1320).contains(&third));
    }
}
