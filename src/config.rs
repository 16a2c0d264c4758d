use crate::review::DEFAULT_PUT_ATTEMPTS;
use crate::schedule::DEFAULT_MASTERY_THRESHOLD;
use crate::schedule::DEFAULT_MAX_LEVEL;
use crate::schedule::Scheduler;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub max_level: u8,
    pub mastery_threshold: u8,
    pub jitter: bool,
    pub put_attempts: u32,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("srs.db"),
            max_level: DEFAULT_MAX_LEVEL,
            mastery_threshold: DEFAULT_MASTERY_THRESHOLD,
            jitter: true,
            put_attempts: DEFAULT_PUT_ATTEMPTS,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by the `SRS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Like [`Config::from_env`], reading variables through `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = var("SRS_DB") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = parse_var(&var, "SRS_MAX_LEVEL")? {
            config.max_level = level;
        }
        if let Some(threshold) = parse_var(&var, "SRS_MASTERY_THRESHOLD")? {
            config.mastery_threshold = threshold;
        }
        if let Some(jitter) = var("SRS_JITTER") {
            config.jitter = parse_flag(&jitter).context("invalid SRS_JITTER")?;
        }
        if let Some(attempts) = parse_var(&var, "SRS_PUT_ATTEMPTS")? {
            config.put_attempts = attempts;
        }
        if let Some(level) = var("SRS_LOG") {
            config.log_level = level;
        }

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_level == 0 {
            bail!("max mastery level must be at least 1");
        }
        if self.mastery_threshold > self.max_level {
            bail!(
                "mastery threshold {} is above the max level {}",
                self.mastery_threshold,
                self.max_level
            );
        }
        if self.put_attempts == 0 {
            bail!("put attempts must be at least 1");
        }

        Ok(())
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.max_level, self.mastery_threshold)
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .with_context(|| format!("invalid {name}: '{value}'"))
        })
        .transpose()
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("expected true or false, given '{value}'"),
    }
}
