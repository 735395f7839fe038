use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt, str::FromStr};

/// Default request body cap (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub admin_username: String,
    pub admin_password: String,
    pub bcrypt_cost: u32,
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Minimal file storage HTTP service")]
pub struct Args {
    /// Host to bind to (overrides FILE_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides FILE_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where files are stored (overrides FILE_STORE_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Admin username (overrides FILE_STORE_ADMIN_USERNAME)
    #[arg(long)]
    pub admin_username: Option<String>,

    /// Admin password (overrides FILE_STORE_ADMIN_PASSWORD)
    #[arg(long)]
    pub admin_password: Option<String>,

    /// bcrypt cost used to hash the admin password (overrides FILE_STORE_BCRYPT_COST)
    #[arg(long)]
    pub bcrypt_cost: Option<u32>,

    /// Maximum request body size in bytes (overrides FILE_STORE_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::resolve(Args::parse(), |key| env::var(key))
    }

    /// Merge parsed CLI args over values read through `lookup`.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let string_or = |key: &str, default: &str| -> Result<String> {
            match lookup(key) {
                Ok(value) => Ok(value),
                Err(env::VarError::NotPresent) => Ok(default.to_string()),
                Err(err) => Err(err).with_context(|| format!("reading {}", key)),
            }
        };

        let env_host = string_or("FILE_STORE_HOST", "0.0.0.0")?;
        let env_storage = string_or("FILE_STORE_STORAGE_DIR", "./data/files")?;
        let env_username = string_or("FILE_STORE_ADMIN_USERNAME", "admin")?;
        let env_password = string_or("FILE_STORE_ADMIN_PASSWORD", "")?;
        let env_port = parse_or(&lookup, "FILE_STORE_PORT", 8080u16)?;
        let env_cost = parse_or(&lookup, "FILE_STORE_BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        let env_max_upload =
            parse_or(&lookup, "FILE_STORE_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            admin_username: args.admin_username.unwrap_or(env_username),
            admin_password: args.admin_password.unwrap_or(env_password),
            bcrypt_cost: args.bcrypt_cost.unwrap_or(env_cost),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
        };

        if cfg.admin_username.is_empty() {
            bail!("admin username must not be empty (set FILE_STORE_ADMIN_USERNAME)");
        }
        if cfg.admin_password.is_empty() {
            bail!("admin password is required (set FILE_STORE_ADMIN_PASSWORD)");
        }

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

// Hand-written so the admin password never reaches the logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("storage_dir", &self.storage_dir)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}
