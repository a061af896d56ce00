//! Push notification gateway client.
//!
//! Delivery is best-effort: the matcher fires sends and only counts failures.
//! Without a configured gateway the client degrades to a logging no-op so the
//! rest of the system behaves identically in development.

use anyhow::Result;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::constants::{PUSH_RATE_LIMIT_PER_MINUTE, PUSH_RATE_LIMIT_WINDOW_SECONDS};
use crate::models::{RideContext, RideMatch, RideWithOwner};

// Rate limiting structure
#[derive(Debug)]
struct RateLimiter {
    requests: HashMap<String, Vec<Instant>>,
    max_requests_per_window: u32,
}

impl RateLimiter {
    fn new(max_requests_per_window: u32) -> Self {
        Self {
            requests: HashMap::new(),
            max_requests_per_window,
        }
    }

    fn can_make_request(&mut self, key: &str) -> bool {
        let now = Instant::now();
        let window_ago = now - Duration::from_secs(PUSH_RATE_LIMIT_WINDOW_SECONDS);

        let requests = self.requests.entry(key.to_string()).or_default();

        // Remove old requests
        requests.retain(|&time| time > window_ago);

        if requests.len() < self.max_requests_per_window as usize {
            requests.push(now);
            true
        } else {
            false
        }
    }
}

// Global rate limiter instance, keyed per recipient
static PUSH_RATE_LIMITER: Lazy<Arc<Mutex<RateLimiter>>> =
    Lazy::new(|| Arc::new(Mutex::new(RateLimiter::new(PUSH_RATE_LIMIT_PER_MINUTE))));

#[derive(Debug, Serialize)]
struct PushMessage {
    to: String,
    title: String,
    body: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    data: Vec<PushTicket>,
}

#[derive(Debug, Deserialize)]
struct PushTicket {
    status: String,
    #[allow(dead_code)]
    id: Option<String>,
    #[allow(dead_code)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PushService {
    client: Client,
    gateway_url: Option<String>,
    access_token: Option<String>,
}

impl PushService {
    pub fn new(gateway_url: Option<String>, access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            gateway_url,
            access_token,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.gateway_url.is_some()
    }

    /// Send one push notification to a user. Fails on gateway errors and when
    /// the recipient is over the send rate; callers treat failures as
    /// non-fatal.
    pub async fn send_push(
        &self,
        user_id: Uuid,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()> {
        if !PUSH_RATE_LIMITER
            .lock()
            .await
            .can_make_request(&user_id.to_string())
        {
            anyhow::bail!("push rate limit exceeded for user {}", user_id);
        }

        let Some(gateway_url) = &self.gateway_url else {
            info!(
                "📭 Push gateway not configured, skipping notification to {}: {}",
                user_id, title
            );
            return Ok(());
        };

        let message = PushMessage {
            to: user_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data,
        };

        let mut request = self.client.post(gateway_url).json(&message);

        if let Some(token) = &self.access_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            anyhow::bail!("push gateway error {}: {}", status, body);
        }

        let push_response: PushResponse = response.json().await?;

        for ticket in &push_response.data {
            if ticket.status == "error" {
                anyhow::bail!("push ticket error: {:?}", ticket);
            }
        }

        Ok(())
    }

    /// Notify both owners about a freshly created match. Sends run jointly and
    /// are never fatal; returns the number of failed sends.
    pub async fn notify_match_pair(
        &self,
        source: &RideContext,
        candidate: &RideWithOwner,
        ride_match: &RideMatch,
    ) -> usize {
        let score_pct = (ride_match.score * 100.0).round() as i64;
        let data = serde_json::json!({
            "match_id": ride_match.id,
            "source_ride_id": ride_match.source_ride_id,
            "target_ride_id": ride_match.target_ride_id,
            "score": ride_match.score,
            "expires_at": ride_match.expires_at,
        });

        let title = "New ride match found!";
        let to_candidate = format!(
            "{} from {} is heading your way too ({}% match)",
            source.owner.name, source.building.name, score_pct
        );
        let to_source = format!(
            "{} is departing around the same time ({}% match)",
            candidate.owner.name, score_pct
        );

        let (candidate_send, source_send) = tokio::join!(
            self.send_push(candidate.owner.id, title, &to_candidate, data.clone()),
            self.send_push(source.owner.id, title, &to_source, data),
        );

        let mut failures = 0;
        if let Err(e) = candidate_send {
            warn!("⚠️ Push to {} failed: {}", candidate.owner.id, e);
            failures += 1;
        }
        if let Err(e) = source_send {
            warn!("⚠️ Push to {} failed: {}", source.owner.id, e);
            failures += 1;
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_service_reports_itself() {
        let service = PushService::new(None, None);
        assert!(!service.is_configured());

        let configured = PushService::new(Some("https://push.example.com/send".to_string()), None);
        assert!(configured.is_configured());
    }

    #[tokio::test]
    async fn unconfigured_send_is_a_no_op() {
        let service = PushService::new(None, None);
        let result = service
            .send_push(
                Uuid::new_v4(),
                "New ride match found!",
                "Test body",
                serde_json::json!({}),
            )
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn rate_limiter_cuts_off_at_the_window_maximum() {
        let mut limiter = RateLimiter::new(3);
        assert!(limiter.can_make_request("user-a"));
        assert!(limiter.can_make_request("user-a"));
        assert!(limiter.can_make_request("user-a"));
        assert!(!limiter.can_make_request("user-a"));
        // Other keys are unaffected
        assert!(limiter.can_make_request("user-b"));
    }
}
