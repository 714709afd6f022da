use clap::{Parser, Subcommand, ValueEnum};
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use soilcast_core::{find_config_file, load_config, ConfigSource, DEFAULT_SITE_PORT};
use std::{env, time::Duration};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

use crate::{geocode::NOMINATIM_BASE_URL, hosts::AllowedHosts, power::POWER_BASE_URL};

pub const DEFAULT_USER_AGENT: &str = "soilcast/1.0 (NASA POWER soil moisture explorer)";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LaunchError {
    #[error("production mode needs a port: set --port, SOILCAST_PORT or PORT")]
    MissingPort,
    #[error("'{0}' is not a valid port")]
    InvalidPort(String),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the web server (default)
    Serve,
    /// Copy static assets into the static root with hashed and gzipped copies
    CollectStatic {
        /// Empty the static root first
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "soilcast - NASA POWER soil moisture explorer and forecaster"
)]
pub struct Cli {
    #[command(subcommand)]
    #[serde(skip)]
    pub command: Option<Command>,

    /// Path to config file (TOML format)
    /// Searched in order: this flag, $SOILCAST_CONFIG, ./site.toml,
    /// $XDG_CONFIG_HOME/soilcast/site.toml, /etc/soilcast/site.toml
    #[arg(short, long, global = true)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "SOILCAST_LEVEL", global = true)]
    pub level: Option<String>,

    /// development or production
    #[arg(short, long, env = "SOILCAST_MODE", global = true)]
    pub mode: Option<Mode>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(long, env = "SOILCAST_HOST")]
    #[serde(alias = "domain")]
    pub host: Option<String>,

    /// Port to listen on; falls back to $PORT
    #[arg(short, long, env = "SOILCAST_PORT")]
    pub port: Option<String>,

    /// Public URL of the site
    #[arg(short, long, env = "SOILCAST_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// Directory static files are served from
    #[arg(short, long, env = "SOILCAST_STATIC_DIR", global = true)]
    pub static_dir: Option<String>,

    /// Directory `collect-static` writes to
    #[arg(long, env = "SOILCAST_STATIC_ROOT", global = true)]
    pub static_root: Option<String>,

    /// Directory for the lookup history database
    #[arg(short, long, env = "SOILCAST_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Runtime worker threads
    #[arg(short, long, env = "SOILCAST_WORKERS")]
    pub workers: Option<usize>,

    /// Seconds before a request is abandoned
    #[arg(short = 't', long, env = "SOILCAST_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Comma separated host names to answer to, `*` for any
    #[arg(short, long, env = "SOILCAST_ALLOWED_HOSTS")]
    pub allowed_hosts: Option<String>,

    /// Nominatim base URL
    #[arg(long, env = "SOILCAST_NOMINATIM_URL")]
    pub nominatim_url: Option<String>,

    /// NASA POWER daily point endpoint
    #[arg(long, env = "SOILCAST_POWER_URL")]
    pub power_url: Option<String>,

    /// User agent sent to upstream services
    #[arg(short, long, env = "SOILCAST_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or_default()
    }

    pub fn host(&self) -> String {
        self.host.clone().unwrap_or_else(|| match self.mode() {
            Mode::Development => "127.0.0.1".to_string(),
            Mode::Production => "0.0.0.0".to_string(),
        })
    }

    /// Configured port, then the platform's `PORT`
    pub fn port(&self) -> Result<u16, LaunchError> {
        let platform = env::var("PORT").ok();
        resolve_port(self.mode(), self.port.as_deref(), platform.as_deref())
    }

    pub fn remote_url(&self, port: u16) -> String {
        self.remote_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host(), port))
    }

    pub fn static_dir(&self) -> String {
        self.static_dir
            .clone()
            .unwrap_or_else(|| "./static".to_string())
    }

    pub fn static_root(&self) -> String {
        self.static_root
            .clone()
            .unwrap_or_else(|| "./staticfiles".to_string())
    }

    /// Production serves what `collect-static` gathered
    pub fn served_static_dir(&self) -> String {
        match (self.mode(), &self.static_dir) {
            (Mode::Production, None) => self.static_root(),
            _ => self.static_dir(),
        }
    }

    pub fn data_dir(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| "./data".to_string())
    }

    pub fn workers(&self) -> usize {
        self.workers
            .filter(|w| *w > 0)
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(2, |n| n.get()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn allowed_hosts(&self) -> AllowedHosts {
        self.allowed_hosts
            .as_deref()
            .map(AllowedHosts::parse)
            .unwrap_or_default()
    }

    pub fn nominatim_url(&self) -> String {
        self.nominatim_url
            .clone()
            .unwrap_or_else(|| NOMINATIM_BASE_URL.to_string())
    }

    pub fn power_url(&self) -> String {
        self.power_url
            .clone()
            .unwrap_or_else(|| POWER_BASE_URL.to_string())
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    /// Values set here win; anything left unset comes from `file`.
    pub fn or(self, file: Cli) -> Cli {
        Cli {
            command: self.command,
            config: self.config,
            level: self.level.or(file.level),
            mode: self.mode.or(file.mode),
            host: self.host.or(file.host),
            port: self.port.or(file.port),
            remote_url: self.remote_url.or(file.remote_url),
            static_dir: self.static_dir.or(file.static_dir),
            static_root: self.static_root.or(file.static_root),
            data_dir: self.data_dir.or(file.data_dir),
            workers: self.workers.or(file.workers),
            request_timeout: self.request_timeout.or(file.request_timeout),
            allowed_hosts: self.allowed_hosts.or(file.allowed_hosts),
            nominatim_url: self.nominatim_url.or(file.nominatim_url),
            power_url: self.power_url.or(file.power_url),
            user_agent: self.user_agent.or(file.user_agent),
        }
    }
}

/// Development falls back to the default port; production has no fallback.
pub fn resolve_port(
    mode: Mode,
    configured: Option<&str>,
    platform: Option<&str>,
) -> Result<u16, LaunchError> {
    let raw = configured
        .or(platform)
        .map(str::trim)
        .filter(|p| !p.is_empty());
    match (raw, mode) {
        (Some(raw), _) => raw
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| LaunchError::InvalidPort(raw.to_string())),
        (None, Mode::Development) => Ok(DEFAULT_SITE_PORT),
        (None, Mode::Production) => Err(LaunchError::MissingPort),
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("SOILCAST_CONFIG", "site.toml")
    };

    let file_config: Cli = match load_config(&source) {
        Ok(config) => config,
        Err(e) => {
            // the logger isn't up yet
            eprintln!("ignoring config file: {}", e);
            Cli::default()
        }
    };

    // env vars are handled by clap
    cli_args.or(file_config)
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                OffsetDateTime::now_utc()
                    .format(&Iso8601::DEFAULT)
                    .unwrap_or_default(),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
