//! Fixed-window request counting keyed by client address.
//!
//! Windows are aligned to multiples of the window length, so every request
//! for the same client and route class inside one window shares a single
//! counter. Each [`RateLimitPreset`] counts separately, and ad hoc policies
//! passed to [`RateLimiter::check`] have their own namespace. Entries
//! are dropped by [`RateLimiter::sweep`], which a background task runs on an
//! interval independent of traffic.

use axum::http::HeaderMap;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::RateLimitSettings;

/// Key used when a request carries no identifying forwarding header. All
/// such clients share one counter.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Maximum requests allowed per fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window_ms: u64,
}

impl RateLimitPolicy {
    pub const fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }
}

/// Route classes with their own limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitPreset {
    /// Credential-accepting routes, stricter.
    Auth,
    /// General API routes.
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after_secs: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Counter namespace: one per preset, plus one for ad hoc policies.
type Bucket = Option<RateLimitPreset>;

#[derive(Debug)]
struct Entry {
    count: u32,
    reset_time: u64,
}

/// Process-local limiter. Construct once and share through `Arc`.
pub struct RateLimiter {
    entries: Mutex<HashMap<(Bucket, String, u64), Entry>>,
    clock: Arc<dyn Clock>,
    settings: RateLimitSettings,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: RateLimitSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            settings,
        }
    }

    pub fn policy(&self, preset: RateLimitPreset) -> RateLimitPolicy {
        match preset {
            RateLimitPreset::Auth => self.settings.auth,
            RateLimitPreset::Api => self.settings.api,
        }
    }

    /// Returns `true` when the request fits in the current window.
    pub fn allow(&self, client_key: &str, max_requests: u32, window_ms: u64) -> bool {
        self.check(client_key, RateLimitPolicy::new(max_requests, window_ms))
            .is_allowed()
    }

    /// Counts one request against the preset's own counter for `client_key`.
    pub fn check_preset(&self, client_key: &str, preset: RateLimitPreset) -> RateDecision {
        self.hit(Some(preset), client_key, self.policy(preset))
    }

    /// Counts one request against `client_key`. A rejected request does not
    /// consume a slot.
    pub fn check(&self, client_key: &str, policy: RateLimitPolicy) -> RateDecision {
        self.hit(None, client_key, policy)
    }

    fn hit(&self, bucket: Bucket, client_key: &str, policy: RateLimitPolicy) -> RateDecision {
        let window_ms = policy.window_ms.max(1);
        let now = self.clock.now_millis();
        let window_start = (now / window_ms) * window_ms;
        let reset_time = window_start + window_ms;

        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        let entry = entries
            .entry((bucket, client_key.to_string(), window_start))
            .or_insert(Entry {
                count: 0,
                reset_time,
            });

        if entry.count >= policy.max_requests {
            let remaining_ms = entry.reset_time.saturating_sub(now);
            return RateDecision::Limited {
                retry_after_secs: remaining_ms.div_ceil(1000).max(1),
            };
        }

        entry.count += 1;
        RateDecision::Allowed {
            remaining: policy.max_requests - entry.count,
        }
    }

    /// Removes entries whose window has ended. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.reset_time > now);
        before - entries.len()
    }

    pub fn tracked_windows(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// Runs [`sweep`](Self::sweep) every `every` until the limiter is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let limiter: Weak<RateLimiter> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(limiter) = limiter.upgrade() else {
                    break;
                };
                let removed = limiter.sweep();
                if removed > 0 {
                    debug!("Rate limiter sweep removed {} expired windows", removed);
                }
            }
        })
    }
}

/// Derives the rate-limit key for a request: first `x-forwarded-for` entry,
/// then `x-real-ip`, then `x-vercel-forwarded-for`, else [`UNKNOWN_CLIENT`].
pub fn client_key(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(ip) = header("x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return ip.to_string();
    }

    if let Some(ip) = header("x-real-ip") {
        return ip.to_string();
    }

    if let Some(ip) = header("x-vercel-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return ip.to_string();
    }

    UNKNOWN_CLIENT.to_string()
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Clock the test moves by hand.
    pub struct ManualClock(AtomicU64);

    impl ManualClock {
        pub fn at(millis: u64) -> Arc<Self> {
            Arc::new(Self(AtomicU64::new(millis)))
        }

        pub fn advance(&self, millis: u64) {
            self.0.fetch_add(millis, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn limiter(clock: Arc<ManualClock>) -> RateLimiter {
        RateLimiter::with_clock(RateLimitSettings::default(), clock)
    }

    #[test]
    fn test_fourth_request_in_window_is_rejected() {
        let clock = ManualClock::at(1_000_000);
        let rl = limiter(clock.clone());

        for _ in 0..3 {
            assert!(rl.allow("1.2.3.4", 3, 60_000));
        }
        assert!(!rl.allow("1.2.3.4", 3, 60_000));
        assert!(!rl.allow("1.2.3.4", 3, 60_000));

        clock.advance(60_000);
        assert!(rl.allow("1.2.3.4", 3, 60_000));
    }

    #[test]
    fn test_rejection_reports_time_until_window_end() {
        let clock = ManualClock::at(120_000);
        let rl = limiter(clock.clone());
        let policy = RateLimitPolicy::new(1, 60_000);

        assert_eq!(rl.check("a", policy), RateDecision::Allowed { remaining: 0 });
        clock.advance(15_500);
        assert_eq!(
            rl.check("a", policy),
            RateDecision::Limited {
                retry_after_secs: 45
            }
        );
    }

    #[test]
    fn test_windows_are_aligned_not_sliding() {
        // 59s into a window: the next request a second later lands in a new one.
        let clock = ManualClock::at(59_000);
        let rl = limiter(clock.clone());

        assert!(rl.allow("a", 1, 60_000));
        assert!(!rl.allow("a", 1, 60_000));
        clock.advance(1_000);
        assert!(rl.allow("a", 1, 60_000));
    }

    #[test]
    fn test_different_clients_have_independent_counters() {
        let rl = limiter(ManualClock::at(0));
        assert!(rl.allow("1.1.1.1", 1, 60_000));
        assert!(rl.allow("2.2.2.2", 1, 60_000));
        assert!(!rl.allow("1.1.1.1", 1, 60_000));
    }

    #[test]
    fn test_sweep_removes_only_expired_windows() {
        let clock = ManualClock::at(0);
        let rl = limiter(clock.clone());

        rl.allow("old", 5, 1_000);
        clock.advance(1_500);
        rl.allow("fresh", 5, 1_000);
        assert_eq!(rl.tracked_windows(), 2);

        assert_eq!(rl.sweep(), 1);
        assert_eq!(rl.tracked_windows(), 1);
    }

    #[test]
    fn test_presets_use_configured_policies() {
        let rl = limiter(ManualClock::at(0));
        let auth = rl.policy(RateLimitPreset::Auth);
        for _ in 0..auth.max_requests {
            assert!(rl.check_preset("c", RateLimitPreset::Auth).is_allowed());
        }
        assert!(!rl.check_preset("c", RateLimitPreset::Auth).is_allowed());
    }

    #[test]
    fn test_presets_count_separately() {
        let rl = limiter(ManualClock::at(0));
        let auth = rl.policy(RateLimitPreset::Auth);
        for _ in 0..auth.max_requests * 2 {
            rl.check_preset("c", RateLimitPreset::Api);
        }
        assert_eq!(
            rl.check_preset("c", RateLimitPreset::Auth),
            RateDecision::Allowed {
                remaining: auth.max_requests - 1
            }
        );
        assert!(rl.allow("c", 1, auth.window_ms));
    }

    #[test]
    fn test_zero_budget_rejects_first_request() {
        let rl = limiter(ManualClock::at(0));
        assert!(!rl.allow("c", 0, 60_000));
        assert!(matches!(
            rl.check("c", RateLimitPolicy::new(0, 60_000)),
            RateDecision::Limited { .. }
        ));
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let rl = limiter(ManualClock::at(0));
        let policy = RateLimitPolicy::new(1_000, 60_000);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        assert!(rl.check("shared", policy).is_allowed());
                    }
                });
            }
        });

        assert_eq!(
            rl.check("shared", policy),
            RateDecision::Allowed { remaining: 199 }
        );
    }

    #[tokio::test]
    async fn test_sweeper_stops_when_limiter_dropped() {
        let rl = Arc::new(limiter(ManualClock::at(0)));
        let handle = rl.spawn_sweeper(Duration::from_millis(5));
        drop(rl);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper should exit")
            .unwrap();
    }

    #[test]
    fn test_client_key_header_precedence() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers), UNKNOWN_CLIENT);

        headers.insert("x-vercel-forwarded-for", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(client_key(&headers), "9.9.9.9");

        headers.insert("x-real-ip", HeaderValue::from_static("5.5.5.5"));
        assert_eq!(client_key(&headers), "5.5.5.5");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 1.2.3.4 , 10.0.0.1"),
        );
        assert_eq!(client_key(&headers), "1.2.3.4");
    }

    #[test]
    fn test_client_key_ignores_empty_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        headers.insert("x-real-ip", HeaderValue::from_static("7.7.7.7"));
        assert_eq!(client_key(&headers), "7.7.7.7");
    }
}
