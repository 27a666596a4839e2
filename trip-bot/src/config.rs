//! Process configuration.
//!
//! Everything has a usable default; the environment overrides it.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

use crate::cache::CacheConfig;
use crate::channel::WebhookConfig;
use crate::dispatch::DispatchConfig;
use crate::provider::ProviderConfig;
use crate::session::SessionConfig;

/// Moscow time, in which all schedules are shown.
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 3 * 3600;

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl ServerConfig {
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }
}

/// Where schedules come from.
#[derive(Debug, Clone)]
pub enum ScheduleSource {
    /// The HTTP schedule provider.
    Remote(ProviderConfig),
    /// Generated hourly timetable.
    Mock,
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub schedule: ScheduleSource,
    pub cache: CacheConfig,
    pub sessions: SessionConfig,
    pub dispatch: DispatchConfig,
    /// Number of reminder pollers.
    pub pollers: usize,
    /// Deliver through a webhook; log deliveries when unset.
    pub webhook: Option<WebhookConfig>,
    /// Offset for local days and displayed times.
    pub utc_offset: FixedOffset,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            schedule: ScheduleSource::Mock,
            cache: CacheConfig::default(),
            sessions: SessionConfig::default(),
            dispatch: DispatchConfig::default(),
            pollers: 1,
            webhook: None,
            utc_offset: moscow(),
        }
    }
}

fn moscow() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS).unwrap_or(Utc.fix())
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from any key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = get("BIND_ADDR") {
            match addr.parse() {
                Ok(addr) => config.server = config.server.with_bind_addr(addr),
                Err(e) => tracing::warn!(%addr, error = %e, "ignoring invalid BIND_ADDR"),
            }
        }

        let mock = get("SCHEDULE_MOCK")
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        config.schedule = if mock {
            ScheduleSource::Mock
        } else {
            let api_key = get("SCHEDULE_API_KEY").unwrap_or_else(|| {
                tracing::warn!("SCHEDULE_API_KEY not set; schedule searches will fail");
                String::new()
            });
            let mut provider = ProviderConfig::new(api_key);
            if let Some(url) = get("SCHEDULE_BASE_URL") {
                provider = provider.with_base_url(url);
            }
            ScheduleSource::Remote(provider)
        };

        config.webhook = get("DELIVERY_WEBHOOK_URL")
            .filter(|url| !url.trim().is_empty())
            .map(WebhookConfig::new);

        if let Some(raw) = get("DISPATCH_POLLERS") {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => config.pollers = n,
                _ => tracing::warn!(value = %raw, "ignoring invalid DISPATCH_POLLERS"),
            }
        }

        if let Some(raw) = get("DISPATCH_INTERVAL_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    config.dispatch = config.dispatch.with_interval(Duration::from_secs(secs))
                }
                _ => tracing::warn!(value = %raw, "ignoring invalid DISPATCH_INTERVAL_SECS"),
            }
        }

        config
    }
}
