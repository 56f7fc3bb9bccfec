// ============================
// contacts-backend-lib/src/middleware/rate_limit.rs
// ============================
//! Per-client fixed-window admission control.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::{mapref::entry::Entry, DashMap};
use metrics::counter;
use tokio::task::JoinHandle;

use crate::config::RateLimitSettings;
use crate::{error::AppError, AppState};

/// Default upper bound on tracked clients
const DEFAULT_MAX_CLIENTS: usize = 10_000;

/// Client key used when the remote address is unavailable
const UNKNOWN_CLIENT: &str = "unknown";

/// Window record for one client
#[derive(Debug, Clone, Copy)]
pub struct RateWindow {
    pub window_start: Instant,
    pub request_count: u32,
}

/// Fixed-window rate limiter keyed by client id.
///
/// Allows up to `max_requests` per `window`; a burst straddling a window
/// boundary can see up to twice that. The table holds at most `max_clients`
/// windows.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, RateWindow>,
    max_requests: u32,
    window: Duration,
    max_clients: usize,
}

impl RateLimiter {
    /// Create a rate limiter with the default client capacity
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self::with_capacity(window, max_requests, DEFAULT_MAX_CLIENTS)
    }

    pub fn with_capacity(window: Duration, max_requests: u32, max_clients: usize) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
            max_clients: max_clients.max(1),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::with_capacity(settings.window(), settings.max_requests, settings.max_clients)
    }

    /// Check and count a request from `client_id` arriving now
    pub fn is_allowed(&self, client_id: &str) -> bool {
        self.is_allowed_at(client_id, Instant::now())
    }

    /// Check and count a request from `client_id` arriving at `now`.
    ///
    /// The read-modify-write runs under the entry's shard lock, so concurrent
    /// requests from one client cannot undercount. A newly tracked client is
    /// inserted first and the table trimmed back to `max_clients` afterwards.
    pub fn is_allowed_at(&self, client_id: &str, now: Instant) -> bool {
        let (allowed, inserted) = match self.windows.entry(client_id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(RateWindow {
                    window_start: now,
                    request_count: 1,
                });
                (true, true)
            },
            Entry::Occupied(mut slot) => {
                let window = slot.get_mut();
                if now.saturating_duration_since(window.window_start) > self.window {
                    *window = RateWindow {
                        window_start: now,
                        request_count: 1,
                    };
                    (true, false)
                } else if window.request_count < self.max_requests {
                    window.request_count += 1;
                    (true, false)
                } else {
                    (false, false)
                }
            },
        };

        if inserted && self.windows.len() > self.max_clients {
            self.make_room(client_id, now);
        }
        allowed
    }

    /// Drop windows that have fully elapsed; returns how many were removed
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.window_start) <= self.window);
        before.saturating_sub(self.windows.len())
    }

    /// Number of tracked clients
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Current window of a client, if tracked
    pub fn window_of(&self, client_id: &str) -> Option<RateWindow> {
        self.windows.get(client_id).map(|w| *w)
    }

    /// Sweep stale windows, then evict the oldest ones other than `keep`
    /// until the table is back within `max_clients`
    fn make_room(&self, keep: &str, now: Instant) {
        let swept = self.sweep(now);
        if swept > 0 {
            counter!(crate::metrics::RATELIMIT_EVICTED).increment(swept as u64);
        }

        while self.windows.len() > self.max_clients {
            let oldest = self
                .windows
                .iter()
                .filter(|w| w.key() != keep)
                .min_by_key(|w| w.window_start)
                .map(|w| w.key().clone());
            let Some(key) = oldest else {
                break;
            };
            if self.windows.remove(&key).is_some() {
                counter!(crate::metrics::RATELIMIT_EVICTED).increment(1);
                tracing::debug!(client = %key, "evicted oldest rate window");
            }
        }
    }

    /// Spawn the periodic sweep of stale windows
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                let tick = ticker.tick().await;
                let removed = self.sweep(tick.into_std());
                if removed > 0 {
                    counter!(crate::metrics::RATELIMIT_EVICTED).increment(removed as u64);
                    tracing::debug!(removed, remaining = self.len(), "swept stale rate windows");
                }
            }
        })
    }
}

/// Rate limiter middleware, keyed on the remote address
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_id = client_id(&request);

    if !state.rate_limiter.is_allowed(&client_id) {
        counter!(crate::metrics::RATELIMIT_DENIED).increment(1);
        tracing::debug!(client = %client_id, "request rate limited");
        return Err(AppError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

fn client_id(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| UNKNOWN_CLIENT.to_string(), |ci| ci.0.ip().to_string())
}
