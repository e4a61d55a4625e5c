use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub user_cache_sweep_secs: u64,
    pub unread_fallback_concurrency: usize,
}

/// 环境变量读取，测试中可替换
struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        (self.lookup)(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(name))
    }

    fn optional<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match (self.lookup)(name) {
            Some(value) if !value.trim().is_empty() => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value }),
            _ => Ok(default),
        }
    }

    /// 速率窗口支持 "60s" 写法，必须大于 0
    fn window_secs(&self, name: &'static str, default: u64) -> Result<u64, ConfigError> {
        let Some(value) = (self.lookup)(name).filter(|v| !v.trim().is_empty()) else {
            return Ok(default);
        };

        match value.trim().trim_end_matches('s').parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::Invalid { name, value }),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        Ok(Config {
            database_url: vars.required("DATABASE_URL")?,
            database_max_connections: vars.optional("DATABASE_MAX_CONNECTIONS", 10)?,
            redis_url: vars.required("REDIS_URL")?,
            jwt_secret: vars.required("JWT_SECRET")?,
            jwt_audience: (vars.lookup)("JWT_AUDIENCE").filter(|a| !a.is_empty()),
            rate_limit_window_secs: vars.window_secs("RATE_LIMIT_WINDOW", 60)?,
            rate_limit_requests: vars.optional("RATE_LIMIT_REQUESTS", 100)?,
            server_host: vars.optional("SERVER_HOST", "0.0.0.0".to_string())?,
            server_port: vars.optional("SERVER_PORT", 3000)?,
            api_base_uri: vars.optional("API_BASE_URI", "/api".to_string())?,
            user_cache_sweep_secs: vars.optional("USER_CACHE_SWEEP_SECS", 0)?,
            unread_fallback_concurrency: vars
                .optional("UNREAD_FALLBACK_CONCURRENCY", 4usize)?
                .max(1),
        })
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// 为 0 时不启动后台清理
    pub fn user_cache_sweep_interval(&self) -> Option<Duration> {
        (self.user_cache_sweep_secs > 0).then(|| Duration::from_secs(self.user_cache_sweep_secs))
    }
}
