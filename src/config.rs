use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::calendar::Event;
use crate::recovery::DEFAULT_RECOVERY_FILE;
use crate::render::DEFAULT_SCROLL_RATE;
use crate::widget::stage::CountdownUnit;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. All fields optional so YAML and CLI layers
/// merge cleanly; accessors supply the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>, // e.g., "info" | "debug"
    /// Seconds between widget updates.
    pub update_interval_secs: Option<u64>,
    /// Countdown state file. The default lives in /var/tmp and is fine for
    /// a single-user device; override it anywhere multi-user.
    pub recovery_file: Option<PathBuf>,
    /// Stage countdown unit: "seconds" or "sleeps".
    pub units: Option<CountdownUnit>,
    pub display: Option<DisplayConfig>,
    pub stage: Option<StageConfig>,
    /// The diary. Defaults to Christmas and New Year's Day.
    pub events: Option<Vec<EventConfig>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scroll_rate: Option<u32>, // pixels per second
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StageConfig {
    /// Maximum carriage position in steps; travel is 0..=travel.
    pub travel: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    pub name: String,
    pub month: u32,
    pub day: u32,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "sleepcounter", about = "Sleeps-to-go countdown indicators")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub update_interval_secs: Option<u64>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub recovery_file: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub units: Option<CliUnits>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub scroll_rate: Option<u32>,
    #[arg(long)]
    pub stage_travel: Option<i64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliUnits {
    Seconds,
    Sleeps,
}

impl From<CliUnits> for CountdownUnit {
    fn from(units: CliUnits) -> Self {
        match units {
            CliUnits::Seconds => CountdownUnit::Seconds,
            CliUnits::Sleeps => CountdownUnit::Sleeps,
        }
    }
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();

    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, &cli);

    // 4) Validate
    validate(&cfg)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/sleepcounter/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/sleepcounter/config.yaml");
        if p.exists() {
            return Some(p);
        }
        let p = home.join(".config/sleepcounter.yaml");
        if p.exists() {
            return Some(p);
        }
    }
    // project local
    for candidate in &["sleepcounter.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() {
            return Some(p);
        }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() {
        dst.log_level = src.log_level;
    }
    if src.update_interval_secs.is_some() {
        dst.update_interval_secs = src.update_interval_secs;
    }
    if src.recovery_file.is_some() {
        dst.recovery_file = src.recovery_file;
    }
    if src.units.is_some() {
        dst.units = src.units;
    }
    if src.events.is_some() {
        dst.events = src.events;
    }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.stage, src.stage) {
        (None, Some(c)) => dst.stage = Some(c),
        (Some(d), Some(s)) => {
            if s.travel.is_some() {
                d.travel = s.travel;
            }
        }
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some() {
        dst.width = src.width;
    }
    if src.height.is_some() {
        dst.height = src.height;
    }
    if src.scroll_rate.is_some() {
        dst.scroll_rate = src.scroll_rate;
    }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() {
        cfg.log_level = cli.log_level.clone();
    }
    if cli.update_interval_secs.is_some() {
        cfg.update_interval_secs = cli.update_interval_secs;
    }
    if cli.recovery_file.is_some() {
        cfg.recovery_file = cli.recovery_file.clone();
    }
    if let Some(units) = cli.units {
        cfg.units = Some(units.into());
    }
    let any_display =
        cli.display_width.is_some() || cli.display_height.is_some() || cli.scroll_rate.is_some();
    if any_display && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.display_width.is_some() {
            display.width = cli.display_width;
        }
        if cli.display_height.is_some() {
            display.height = cli.display_height;
        }
        if cli.scroll_rate.is_some() {
            display.scroll_rate = cli.scroll_rate;
        }
    }
    if cli.stage_travel.is_some() {
        if cfg.stage.is_none() {
            cfg.stage = Some(StageConfig::default());
        }
        if let Some(stage) = cfg.stage.as_mut() {
            stage.travel = cli.stage_travel;
        }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if display.width == Some(0) || display.height == Some(0) {
            return Err(ConfigError::Validation(
                "display width/height must be > 0".into(),
            ));
        }
        if display.scroll_rate == Some(0) {
            return Err(ConfigError::Validation(
                "display scroll_rate must be > 0".into(),
            ));
        }
    }
    if let Some(stage) = cfg.stage.as_ref() {
        if stage.travel.is_some_and(|t| t <= 0) {
            return Err(ConfigError::Validation("stage travel must be > 0".into()));
        }
    }
    if cfg.update_interval_secs == Some(0) {
        return Err(ConfigError::Validation(
            "update_interval_secs must be > 0".into(),
        ));
    }
    if let Some(events) = cfg.events.as_ref() {
        for event in events {
            if !(1..=12).contains(&event.month) || !(1..=31).contains(&event.day) {
                return Err(ConfigError::Validation(format!(
                    "event {} has an impossible date {}-{}",
                    event.name, event.month, event.day
                )));
            }
        }
    }
    Ok(())
}

impl Config {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs.unwrap_or(60))
    }

    pub fn recovery_path(&self) -> PathBuf {
        self.recovery_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RECOVERY_FILE))
    }

    pub fn units(&self) -> CountdownUnit {
        self.units.unwrap_or(CountdownUnit::Sleeps)
    }

    pub fn panel_width(&self) -> u32 {
        self.display.as_ref().and_then(|d| d.width).unwrap_or(32)
    }

    pub fn panel_height(&self) -> u32 {
        self.display.as_ref().and_then(|d| d.height).unwrap_or(8)
    }

    pub fn scroll_rate(&self) -> u32 {
        self.display
            .as_ref()
            .and_then(|d| d.scroll_rate)
            .unwrap_or(DEFAULT_SCROLL_RATE)
    }

    pub fn stage_travel(&self) -> i64 {
        self.stage.as_ref().and_then(|s| s.travel).unwrap_or(4400)
    }

    pub fn diary_events(&self) -> Vec<Event> {
        match self.events.as_ref() {
            Some(events) => events
                .iter()
                .map(|e| Event::new(&e.name, e.month, e.day))
                .collect(),
            None => vec![
                Event::new("Christmas", 12, 25),
                Event::new("New Year's Day", 1, 1),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let cfg = Config::default();
        assert_eq!(cfg.update_interval(), Duration::from_secs(60));
        assert_eq!(cfg.panel_width(), 32);
        assert_eq!(cfg.panel_height(), 8);
        assert_eq!(cfg.scroll_rate(), DEFAULT_SCROLL_RATE);
        assert_eq!(cfg.stage_travel(), 4400);
        assert_eq!(cfg.units(), CountdownUnit::Sleeps);
        assert_eq!(cfg.diary_events().len(), 2);
    }

    #[test]
    fn yaml_round_trip() {
        let yaml = r#"
log_level: debug
update_interval_secs: 30
units: seconds
display:
  width: 64
  scroll_rate: 20
stage:
  travel: 1000
events:
  - name: Bonfire Night
    month: 11
    day: 5
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.units(), CountdownUnit::Seconds);
        assert_eq!(cfg.panel_width(), 64);
        assert_eq!(cfg.panel_height(), 8); // untouched default
        assert_eq!(cfg.scroll_rate(), 20);
        assert_eq!(cfg.stage_travel(), 1000);
        assert_eq!(cfg.diary_events()[0].name, "Bonfire Night");
    }

    #[test]
    fn merge_prefers_the_overlay() {
        let mut base: Config = serde_yaml::from_str("update_interval_secs: 30").unwrap();
        let overlay: Config =
            serde_yaml::from_str("update_interval_secs: 5\nlog_level: debug").unwrap();
        merge(&mut base, overlay);
        assert_eq!(base.update_interval_secs, Some(5));
        assert_eq!(base.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn impossible_event_dates_fail_validation() {
        let cfg: Config =
            serde_yaml::from_str("events:\n  - name: bad\n    month: 13\n    day: 1").unwrap();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn zero_geometry_fails_validation() {
        let cfg: Config = serde_yaml::from_str("display:\n  width: 0\n  height: 8").unwrap();
        assert!(validate(&cfg).is_err());
    }
}
