//! Login throttling
//!
//! Two sliding windows guard `POST /api/auth/login`:
//! - failed attempts per username (5 per 15 minutes)
//! - requests per client IP (10 per minute)

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::net::IpAddr;
use tokio::sync::RwLock;

/// A sliding window allowing at most `max_hits` within `window`
#[derive(Debug, Clone, Copy)]
pub struct RateWindow {
    pub max_hits: usize,
    pub window: Duration,
}

impl RateWindow {
    /// Failed logins per username
    pub fn username() -> Self {
        Self {
            max_hits: 5,
            window: Duration::minutes(15),
        }
    }

    /// Login requests per client IP
    pub fn ip() -> Self {
        Self {
            max_hits: 10,
            window: Duration::minutes(1),
        }
    }
}

struct HitLog<K> {
    limit: RateWindow,
    hits: RwLock<HashMap<K, Vec<DateTime<Utc>>>>,
}

impl<K: Eq + Hash> HitLog<K> {
    fn new(limit: RateWindow) -> Self {
        Self {
            limit,
            hits: RwLock::new(HashMap::new()),
        }
    }

    async fn is_limited(&self, key: K, now: DateTime<Utc>) -> bool {
        let cutoff = now - self.limit.window;
        let mut hits = self.hits.write().await;
        match hits.get_mut(&key) {
            Some(times) => {
                times.retain(|t| *t > cutoff);
                times.len() >= self.limit.max_hits
            }
            None => false,
        }
    }

    async fn record(&self, key: K, now: DateTime<Utc>) {
        self.hits.write().await.entry(key).or_default().push(now);
    }

    async fn clear(&self, key: &K) {
        self.hits.write().await.remove(key);
    }

    async fn prune(&self, now: DateTime<Utc>) {
        let cutoff = now - self.limit.window;
        self.hits.write().await.retain(|_, times| {
            times.retain(|t| *t > cutoff);
            !times.is_empty()
        });
    }
}

/// Login rate limiter shared by the auth handlers
pub struct LoginRateLimiter {
    usernames: HitLog<String>,
    ips: HitLog<IpAddr>,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::with_windows(RateWindow::username(), RateWindow::ip())
    }

    pub fn with_windows(username: RateWindow, ip: RateWindow) -> Self {
        Self {
            usernames: HitLog::new(username),
            ips: HitLog::new(ip),
        }
    }

    /// Whether the username has used up its failed attempts
    pub async fn is_username_limited(&self, username: &str) -> bool {
        self.usernames
            .is_limited(username.to_lowercase(), Utc::now())
            .await
    }

    pub async fn record_failed_attempt(&self, username: &str) {
        self.usernames.record(username.to_lowercase(), Utc::now()).await;
    }

    /// Forget failures after a successful login
    pub async fn clear_username_attempts(&self, username: &str) {
        self.usernames.clear(&username.to_lowercase()).await;
    }

    pub async fn is_ip_limited(&self, ip: IpAddr) -> bool {
        self.ips.is_limited(ip, Utc::now()).await
    }

    pub async fn record_ip_request(&self, ip: IpAddr) {
        self.ips.record(ip, Utc::now()).await;
    }

    /// Drop expired entries; run periodically
    pub async fn cleanup(&self) {
        let now = Utc::now();
        self.usernames.prune(now).await;
        self.ips.prune(now).await;
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_username_limit_after_five_failures() {
        let limiter = LoginRateLimiter::new();

        for _ in 0..4 {
            limiter.record_failed_attempt("admin").await;
            assert!(!limiter.is_username_limited("admin").await);
        }
        limiter.record_failed_attempt("admin").await;
        assert!(limiter.is_username_limited("admin").await);

        limiter.clear_username_attempts("admin").await;
        assert!(!limiter.is_username_limited("admin").await);
    }

    #[tokio::test]
    async fn test_username_is_case_insensitive() {
        let limiter = LoginRateLimiter::new();
        for name in ["Admin", "ADMIN", "admin", "aDmin", "admiN"] {
            limiter.record_failed_attempt(name).await;
        }
        assert!(limiter.is_username_limited("admin").await);
    }

    #[tokio::test]
    async fn test_ip_limit() {
        let limiter = LoginRateLimiter::new();
        let ip: IpAddr = "10.0.0.7".parse().unwrap();
        for _ in 0..9 {
            limiter.record_ip_request(ip).await;
        }
        assert!(!limiter.is_ip_limited(ip).await);
        limiter.record_ip_request(ip).await;
        assert!(limiter.is_ip_limited(ip).await);

        let other: IpAddr = "10.0.0.8".parse().unwrap();
        assert!(!limiter.is_ip_limited(other).await);
    }

    #[tokio::test]
    async fn test_expired_hits_are_ignored_and_pruned() {
        let limiter = LoginRateLimiter::with_windows(
            RateWindow {
                max_hits: 1,
                window: Duration::milliseconds(20),
            },
            RateWindow::ip(),
        );
        limiter.record_failed_attempt("admin").await;
        assert!(limiter.is_username_limited("admin").await);

        tokio::time::sleep(std::time::Duration::from_millis(40)).await;
        limiter.cleanup().await;
        assert!(!limiter.is_username_limited("admin").await);
        assert!(limiter.usernames.hits.read().await.is_empty());
    }
}
