use anyhow::{Context, Result, anyhow};

use crate::domain::tag::TagAssignmentPolicy;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:8000,http://127.0.0.1:8000";

/// Credentials of the admin account created on startup when it is missing.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
    pub tag_assignment: TagAssignmentPolicy,
    pub admin: Option<AdminBootstrap>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url =
            get_required(&lookup, "DATABASE_URL").context("DATABASE_URL is required")?;
        let jwt_secret = get_required(&lookup, "JWT_SECRET").context("JWT_SECRET is required")?;
        let jwt_ttl_seconds: i64 = lookup("JWT_TTL_SECONDS")
            .unwrap_or_else(|| "3600".to_string())
            .parse()
            .context("Failed to parse JWT_TTL_SECONDS, expecting integer")?;

        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let database_max_connections =
            parse_positive(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;
        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            lookup("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        );
        let log_level = lookup("LOG_LEVEL")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());
        let http_request_body_limit_bytes =
            parse_positive(&lookup, "HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024usize)?;
        let http_concurrency_limit = parse_positive(&lookup, "HTTP_CONCURRENCY_LIMIT", 256usize)?;
        let http_request_timeout_secs =
            parse_positive(&lookup, "HTTP_REQUEST_TIMEOUT_SECS", 10u64)?;
        let tag_assignment = match lookup("TAG_ASSIGNMENT") {
            Some(raw) => raw
                .parse::<TagAssignmentPolicy>()
                .map_err(|err| anyhow!("Failed to parse TAG_ASSIGNMENT: {err}"))?,
            None => TagAssignmentPolicy::default(),
        };
        let admin = parse_admin(&lookup)?;

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            jwt_ttl_seconds,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
            tag_assignment,
            admin,
        })
    }
}

fn get_required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    let value = lookup(key).ok_or_else(|| anyhow!("{key} is not set"))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + PartialEq + Default + ToString,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse::<T>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == T::default() {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

/// All three `ADMIN_*` variables or none of them.
fn parse_admin(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<AdminBootstrap>> {
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    match (
        non_empty("ADMIN_EMAIL"),
        non_empty("ADMIN_USERNAME"),
        non_empty("ADMIN_PASSWORD"),
    ) {
        (Some(email), Some(username), Some(password)) => Ok(Some(AdminBootstrap {
            email: email.trim().to_string(),
            username: username.trim().to_string(),
            password,
        })),
        (None, None, None) => Ok(None),
        _ => Err(anyhow!(
            "ADMIN_EMAIL, ADMIN_USERNAME and ADMIN_PASSWORD must be set together"
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::Settings;
    use crate::domain::tag::TagAssignmentPolicy;

    fn settings_from(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    const BASE: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/multiblog"),
        ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
    ];

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let settings = settings_from(&BASE).expect("settings must load");

        assert_eq!(settings.jwt_ttl_seconds, 3600);
        assert_eq!(settings.http_addr, "0.0.0.0:8080");
        assert_eq!(settings.database_max_connections, 10);
        assert_eq!(settings.http_request_body_limit_bytes, 1024 * 1024);
        assert_eq!(settings.http_concurrency_limit, 256);
        assert_eq!(settings.http_request_timeout_secs, 10);
        assert_eq!(settings.tag_assignment, TagAssignmentPolicy::BestEffort);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.cors_origins.len(), 2);
        assert!(settings.admin.is_none());
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let err = settings_from(&[
            ("DATABASE_URL", "postgres://localhost/multiblog"),
            ("JWT_SECRET", "too-short"),
        ])
        .expect_err("short secret must fail");
        assert!(err.to_string().contains("32"));
    }

    #[test]
    fn missing_database_url_is_rejected() {
        assert!(settings_from(&[("JWT_SECRET", "0123456789abcdef0123456789abcdef")]).is_err());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("HTTP_CONCURRENCY_LIMIT", "0"));
        assert!(settings_from(&pairs).is_err());
    }

    #[test]
    fn tag_assignment_and_cors_are_parsed() {
        let mut pairs = BASE.to_vec();
        pairs.push(("TAG_ASSIGNMENT", "strict"));
        pairs.push(("CORS_ORIGINS", " https://a.example , ,https://b.example"));
        let settings = settings_from(&pairs).expect("settings must load");

        assert_eq!(settings.tag_assignment, TagAssignmentPolicy::Strict);
        assert_eq!(
            settings.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn partial_admin_bootstrap_is_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("ADMIN_EMAIL", "admin@example.com"));
        assert!(settings_from(&pairs).is_err());

        pairs.push(("ADMIN_USERNAME", "admin"));
        pairs.push(("ADMIN_PASSWORD", "admin-password"));
        let admin = settings_from(&pairs)
            .expect("settings must load")
            .admin
            .expect("admin must be configured");
        assert_eq!(admin.username, "admin");
    }
}
