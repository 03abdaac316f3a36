use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use platform_authn::AuthConfig;

pub const DEFAULT_COMPANY_NAME: &str = "Acme HR";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 480;
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub company_name: String,
    pub auth: AuthConfig,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let company_name =
            std::env::var("COMPANY_NAME").unwrap_or_else(|_| DEFAULT_COMPANY_NAME.into());

        let secret = env_required("JWT_SECRET_BASE64")?;
        let secret_bytes = decode_secret(&secret)?;
        let token_ttl_minutes = match std::env::var("TOKEN_TTL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or_else(|| anyhow!("TOKEN_TTL_MINUTES must be a positive integer"))?,
            Err(_) => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        Ok(Self {
            company_name,
            auth: AuthConfig::new(secret_bytes, token_ttl_minutes),
            cors_allowed_origins,
        })
    }
}

fn decode_secret(encoded: &str) -> Result<Vec<u8>> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .context("invalid JWT_SECRET_BASE64")?;
    if bytes.len() < MIN_SECRET_BYTES {
        return Err(anyhow!(
            "JWT_SECRET_BASE64 must decode to at least {MIN_SECRET_BYTES} bytes"
        ));
    }
    Ok(bytes)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn env_required(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("missing env {}", key))
}
