/*
 * Responsibility
 * - 環境変数 (.env) から設定を読み込む (AUTH_ADDR, HEALTH_ADDR, JWT_SECRET, TLS パスなど)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// PEM files for the mTLS listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
    /// CA bundle used to verify client certificates.
    pub ca: PathBuf,
}

#[derive(Clone)]
pub struct Config {
    // gRPC (check) listener
    pub addr: SocketAddr,
    // plain HTTP health listener, None disables it
    pub health_addr: Option<SocketAddr>,
    pub app_env: AppEnv,

    // HS256 secret shared with the token issuer
    pub jwt_secret: String,
    pub token_leeway_seconds: u64,
    // None disables the cookie fallback
    pub token_cookie_name: Option<String>,

    // None only when TLS_DISABLED=true outside production
    pub tls: Option<TlsPaths>,

    pub error_report_buffer: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the secret
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("health_addr", &self.health_addr)
            .field("app_env", &self.app_env)
            .field("token_leeway_seconds", &self.token_leeway_seconds)
            .field("token_cookie_name", &self.token_cookie_name)
            .field("tls", &self.tls)
            .field("error_report_buffer", &self.error_report_buffer)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = SocketAddr::from_str(
            &lookup("AUTH_ADDR").unwrap_or_else(|| "0.0.0.0:9443".to_string()),
        )
        .map_err(|_| ConfigError::Invalid("AUTH_ADDR"))?;

        let health_addr = match lookup("HEALTH_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .trim()
        {
            "" => None,
            addr => Some(
                SocketAddr::from_str(addr).map_err(|_| ConfigError::Invalid("HEALTH_ADDR"))?,
            ),
        };

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let token_leeway_seconds = match lookup("TOKEN_LEEWAY_SECONDS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("TOKEN_LEEWAY_SECONDS"))?,
            None => 0,
        };

        let token_cookie_name = lookup("TOKEN_COOKIE_NAME")
            .unwrap_or_else(|| "access_token".to_string())
            .trim()
            .to_string();
        let token_cookie_name = (!token_cookie_name.is_empty()).then_some(token_cookie_name);

        let tls_disabled = matches!(
            lookup("TLS_DISABLED")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "1" | "true" | "yes"
        );
        let tls = if tls_disabled {
            if app_env.is_production() {
                return Err(ConfigError::Invalid("TLS_DISABLED"));
            }
            None
        } else {
            Some(TlsPaths {
                cert: lookup("TLS_CERT_PATH")
                    .unwrap_or_else(|| "/tls/tls.crt".to_string())
                    .into(),
                key: lookup("TLS_KEY_PATH")
                    .unwrap_or_else(|| "/tls/tls.key".to_string())
                    .into(),
                ca: lookup("TLS_CA_PATH")
                    .unwrap_or_else(|| "/tls/ca.crt".to_string())
                    .into(),
            })
        };

        let error_report_buffer = lookup("ERROR_REPORT_BUFFER")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1024);

        Ok(Self {
            addr,
            health_addr,
            app_env,
            jwt_secret,
            token_leeway_seconds,
            token_cookie_name,
            tls,
            error_report_buffer,
        })
    }
}
