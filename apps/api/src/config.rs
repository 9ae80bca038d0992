use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Origin allowed by CORS (the form frontend).
    pub frontend_url: String,
    /// LaTeX engine executable, resolved through PATH.
    pub latex_engine: String,
    /// Extra arguments placed before the standard engine flags.
    pub latex_args: Vec<String>,
    /// Appended to PATH for the engine subprocess (TeX Live installs outside the default PATH).
    pub latex_extra_path: Option<PathBuf>,
    /// 1 or 2. The second pass resolves cross-references written by the first.
    pub latex_passes: u8,
    pub compile_timeout: Duration,
    /// Parent of all per-job scratch directories.
    pub scratch_dir: PathBuf,
    pub sweep_interval: Duration,
    /// Must outlive the longest possible compilation.
    pub sweep_max_age: Duration,
    /// Engine for the Deedy style, which needs XeTeX fonts.
    pub deedy_latex_engine: String,
    /// `deedy-resume-openfont.cls`. Unset disables the Deedy endpoint.
    pub deedy_class_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            latex_engine: "pdflatex".to_string(),
            latex_args: Vec::new(),
            latex_extra_path: Some(PathBuf::from("/usr/local/texlive/bin/x86_64-linux")),
            latex_passes: 2,
            compile_timeout: Duration::from_secs(30),
            scratch_dir: std::env::temp_dir().join("latex-temp"),
            sweep_interval: Duration::from_secs(3600),
            sweep_max_age: Duration::from_secs(3600),
            deedy_latex_engine: "xelatex".to_string(),
            deedy_class_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, starting from the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let latex_passes = parse_or(&lookup, "LATEX_PASSES", defaults.latex_passes)?;
        if !(1..=2).contains(&latex_passes) {
            bail!("LATEX_PASSES must be 1 or 2, got {latex_passes}");
        }

        let latex_extra_path = match lookup("LATEX_EXTRA_PATH") {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(PathBuf::from(value.trim())),
            None => defaults.latex_extra_path,
        };

        let config = Config {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            frontend_url: lookup("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            latex_engine: lookup("LATEX_ENGINE").unwrap_or(defaults.latex_engine),
            latex_args: lookup("LATEX_ARGS")
                .map(|args| args.split_whitespace().map(str::to_string).collect())
                .unwrap_or(defaults.latex_args),
            latex_extra_path,
            latex_passes,
            compile_timeout: Duration::from_secs(parse_or(
                &lookup,
                "COMPILE_TIMEOUT_SECS",
                defaults.compile_timeout.as_secs(),
            )?),
            scratch_dir: lookup("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            sweep_interval: Duration::from_secs(parse_or(
                &lookup,
                "SWEEP_INTERVAL_SECS",
                defaults.sweep_interval.as_secs(),
            )?),
            sweep_max_age: Duration::from_secs(parse_or(
                &lookup,
                "SWEEP_MAX_AGE_SECS",
                defaults.sweep_max_age.as_secs(),
            )?),
            deedy_latex_engine: lookup("DEEDY_LATEX_ENGINE")
                .unwrap_or(defaults.deedy_latex_engine),
            deedy_class_path: lookup("DEEDY_CLASS_PATH")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
        };

        if config.compile_timeout.is_zero() {
            bail!("COMPILE_TIMEOUT_SECS must be greater than zero");
        }
        if config.sweep_interval.is_zero() {
            bail!("SWEEP_INTERVAL_SECS must be greater than zero");
        }
        // A live job may run every pass to the timeout before its directory is released.
        let longest_job = config.compile_timeout * u32::from(config.latex_passes);
        if config.sweep_max_age.is_zero() || config.sweep_max_age <= longest_job {
            bail!(
                "SWEEP_MAX_AGE_SECS must exceed COMPILE_TIMEOUT_SECS x LATEX_PASSES ({}s), got {}s",
                longest_job.as_secs(),
                config.sweep_max_age.as_secs()
            );
        }
        Ok(config)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
