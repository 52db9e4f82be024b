/*
 *  config.rs
 *
 *  levelmeter - meters, meters, meters
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, command line
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::display::color_proxy::Pal16;
use crate::meter::colour::ColourRole;
use crate::meter::error::MeterError;
use crate::meter::flags::MeterFlags;

pub const DEFAULT_WIDTH: u32 = 128;
pub const DEFAULT_HEIGHT: u32 = 64;
pub const DEFAULT_CHANNELS: usize = 2;
pub const DEFAULT_FRAMES: u32 = 90;
const MAX_DIMENSION: u32 = 4096;
const MAX_CHANNELS: usize = 64;
const MAX_REFRESH_HZ: u32 = 1000;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Meter error: {0}")]
    Meter(#[from] MeterError),
}

/// Surface the meter renders onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColourDepth {
    /// 1-bit, BinaryColor
    #[default]
    Mono,
    /// 4-bit grayscale
    Gray4,
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub meter: Option<MeterConfig>,
    pub source: Option<SourceConfig>,
    pub demo: Option<DemoConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MeterConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// flag names, e.g. [has_border, horizontal]
    pub flags: Option<Vec<String>>,
    pub refresh_rate_hz: Option<u32>,
    pub colour_depth: Option<ColourDepth>,
    /// per-role palette overrides
    pub colours: Option<HashMap<ColourRole, Pal16>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceConfig {
    pub channels: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DemoConfig {
    /// frames to render before exiting
    pub frames: Option<u32>,
    /// snapshot path (PBM or PGM by colour depth)
    pub output: Option<PathBuf>,
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn meter_size(&self) -> (u32, u32) {
        let m = self.meter.as_ref();
        (
            m.and_then(|m| m.width).unwrap_or(DEFAULT_WIDTH),
            m.and_then(|m| m.height).unwrap_or(DEFAULT_HEIGHT),
        )
    }

    /// Parsed flag set, [`MeterFlags::default`] when none are configured
    pub fn meter_flags(&self) -> Result<MeterFlags, MeterError> {
        match self.meter.as_ref().and_then(|m| m.flags.as_ref()) {
            Some(names) => MeterFlags::from_names(names),
            None => Ok(MeterFlags::default()),
        }
    }

    pub fn refresh_rate_hz(&self) -> u32 {
        self.meter
            .as_ref()
            .and_then(|m| m.refresh_rate_hz)
            .unwrap_or(crate::meter::DEFAULT_REFRESH_RATE_HZ)
    }

    pub fn colour_depth(&self) -> ColourDepth {
        self.meter.as_ref().and_then(|m| m.colour_depth).unwrap_or_default()
    }

    pub fn colours(&self) -> HashMap<ColourRole, Pal16> {
        self.meter
            .as_ref()
            .and_then(|m| m.colours.clone())
            .unwrap_or_default()
    }

    pub fn channels(&self) -> usize {
        self.source
            .as_ref()
            .and_then(|s| s.channels)
            .unwrap_or(DEFAULT_CHANNELS)
    }

    pub fn frames(&self) -> u32 {
        self.demo.as_ref().and_then(|d| d.frames).unwrap_or(DEFAULT_FRAMES)
    }

    pub fn output(&self) -> Option<&Path> {
        self.demo.as_ref().and_then(|d| d.output.as_deref())
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "levelmeter", about = "Level meter demo renderer", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    /// comma separated flag names (has_border,horizontal,...)
    #[arg(long, value_delimiter = ',')]
    pub flags: Option<Vec<String>>,
    #[arg(long)]
    pub refresh_rate_hz: Option<u32>,
    #[arg(long, value_enum)]
    pub colour_depth: Option<ColourDepth>,
    #[arg(long)]
    pub channels: Option<usize>,
    #[arg(long)]
    pub frames: Option<u32>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_from(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Resolve the YAML file (explicit `--config` or search), then layer.
pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
    let file = match cli.config.as_ref() {
        Some(p) if !p.exists() => {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        Some(p) => Some(p.clone()),
        None => find_config_file(),
    };
    load_layers(cli, file.as_deref())
}

/// Layer defaults, the optional YAML `file` and `cli`, then validate.
pub fn load_layers(cli: &Cli, file: Option<&Path>) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file
    if let Some(p) = file {
        let y = read_yaml(p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/levelmeter/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/levelmeter/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/levelmeter.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["levelmeter.yaml", "config/levelmeter.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
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
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    match (&mut dst.meter, src.meter) {
        (None, Some(c)) => dst.meter = Some(c),
        (Some(d), Some(s)) => merge_meter(d, s),
        _ => {}
    }
    match (&mut dst.source, src.source) {
        (None, Some(c)) => dst.source = Some(c),
        (Some(d), Some(s)) => {
            if s.channels.is_some() { d.channels = s.channels; }
        }
        _ => {}
    }
    match (&mut dst.demo, src.demo) {
        (None, Some(c)) => dst.demo = Some(c),
        (Some(d), Some(s)) => {
            if s.frames.is_some() { d.frames = s.frames; }
            if s.output.is_some() { d.output = s.output; }
        }
        _ => {}
    }
}

fn merge_meter(dst: &mut MeterConfig, src: MeterConfig) {
    if src.width.is_some()           { dst.width = src.width; }
    if src.height.is_some()          { dst.height = src.height; }
    if src.flags.is_some()           { dst.flags = src.flags; }
    if src.refresh_rate_hz.is_some() { dst.refresh_rate_hz = src.refresh_rate_hz; }
    if src.colour_depth.is_some()    { dst.colour_depth = src.colour_depth; }
    if let Some(colours) = src.colours {
        dst.colours.get_or_insert_with(HashMap::new).extend(colours);
    }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }

    let any_meter = cli.width.is_some()
        || cli.height.is_some()
        || cli.flags.is_some()
        || cli.refresh_rate_hz.is_some()
        || cli.colour_depth.is_some();
    if any_meter {
        let meter = cfg.meter.get_or_insert_with(MeterConfig::default);
        if cli.width.is_some()           { meter.width = cli.width; }
        if cli.height.is_some()          { meter.height = cli.height; }
        if cli.flags.is_some()           { meter.flags = cli.flags.clone(); }
        if cli.refresh_rate_hz.is_some() { meter.refresh_rate_hz = cli.refresh_rate_hz; }
        if cli.colour_depth.is_some()    { meter.colour_depth = cli.colour_depth; }
    }

    if cli.channels.is_some() {
        cfg.source.get_or_insert_with(SourceConfig::default).channels = cli.channels;
    }

    if cli.frames.is_some() || cli.output.is_some() {
        let demo = cfg.demo.get_or_insert_with(DemoConfig::default);
        if cli.frames.is_some() { demo.frames = cli.frames; }
        if cli.output.is_some() { demo.output = cli.output.clone(); }
    }
}

/// Ranges and names that would only fail later at runtime.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let (w, h) = cfg.meter_size();
    if w == 0 || h == 0 {
        return Err(ConfigError::Validation("meter width/height must be > 0".into()));
    }
    if w > MAX_DIMENSION || h > MAX_DIMENSION {
        return Err(ConfigError::Validation(format!(
            "meter width/height must be <= {MAX_DIMENSION}"
        )));
    }
    if cfg.refresh_rate_hz() > MAX_REFRESH_HZ {
        return Err(ConfigError::Validation(format!(
            "meter refresh_rate_hz must be <= {MAX_REFRESH_HZ} (0 = stopped)"
        )));
    }
    cfg.meter_flags()?;
    let channels = cfg.channels();
    if channels > MAX_CHANNELS {
        return Err(ConfigError::Validation(format!(
            "source channels must be 0..={MAX_CHANNELS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["levelmeter"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn temp_yaml(name: &str, body: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!("levelmeter-{}-{}.yaml", name, std::process::id()));
        fs::write(&p, body).unwrap();
        p
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.meter_size(), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert_eq!(cfg.meter_flags().unwrap(), MeterFlags::HAS_BORDER);
        assert_eq!(cfg.refresh_rate_hz(), 30);
        assert_eq!(cfg.colour_depth(), ColourDepth::Mono);
        assert_eq!(cfg.channels(), DEFAULT_CHANNELS);
        assert!(cfg.output().is_none());
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn test_yaml_then_cli() {
        let path = temp_yaml(
            "layer",
            "log_level: debug\n\
             meter:\n  width: 200\n  height: 40\n  flags: [horizontal, has_border]\n  colour_depth: gray4\n  colours:\n    gradient_low: green\n\
             source:\n  channels: 6\n",
        );
        let p = path.to_string_lossy().to_string();
        let cfg = load_from(&cli(&["--config", &p, "--height", "50", "--refresh-rate-hz", "0"])).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.meter_size(), (200, 50));
        assert_eq!(cfg.meter_flags().unwrap(), MeterFlags::HORIZONTAL | MeterFlags::HAS_BORDER);
        assert_eq!(cfg.refresh_rate_hz(), 0);
        assert_eq!(cfg.colour_depth(), ColourDepth::Gray4);
        assert_eq!(cfg.colours().get(&ColourRole::GradientLow), Some(&Pal16::Green));
        assert_eq!(cfg.channels(), 6);
    }

    #[test]
    fn test_cli_flags_list() {
        let cfg = load_layers(&cli(&["--flags", "vintage,minimal", "--channels", "1"]), None).unwrap();
        assert_eq!(cfg.meter_flags().unwrap(), MeterFlags::VINTAGE | MeterFlags::MINIMAL);
        assert_eq!(cfg.channels(), 1);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            load_layers(&cli(&["--width", "0"]), None),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            load_layers(&cli(&["--flags", "sparkly"]), None),
            Err(ConfigError::Meter(MeterError::UnknownFlag(_)))
        ));
        assert!(matches!(
            load_from(&cli(&["--config", "/nonexistent/levelmeter.yaml"])),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_merge_colours_extend() {
        let mut dst = MeterConfig {
            colours: Some(HashMap::from([(ColourRole::Text, Pal16::Gray)])),
            ..Default::default()
        };
        let src = MeterConfig {
            colours: Some(HashMap::from([(ColourRole::Ticks, Pal16::White)])),
            ..Default::default()
        };
        merge_meter(&mut dst, src);
        let colours = dst.colours.unwrap();
        assert_eq!(colours.len(), 2);
    }
}
