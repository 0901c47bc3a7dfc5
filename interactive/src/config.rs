use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::args::Args;

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
    #[serde(rename = "start")]
    pub start_demo: Option<String>,
    pub resources: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
            title: "glsandbox".into(),
            vsync: true,
            start_demo: None,
            resources: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/res")),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::InputError)?;

        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        json5::from_str(text).map_err(ConfigError::FormatError)
    }

    /// Reads the file named by `args`, if any, and lets the arguments win.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let config = match &args.config {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };

        config.merge(args).validate()
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyWindow(self.width, self.height));
        }

        Ok(self)
    }

    fn merge(mut self, args: &Args) -> Self {
        if let Some(width) = args.width {
            self.width = width;
        }
        if let Some(height) = args.height {
            self.height = height;
        }
        if let Some(start) = &args.start {
            self.start_demo = Some(start.clone());
        }
        if let Some(res) = &args.res {
            self.resources = res.clone();
        }

        self
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    InputError(std::io::Error),
    #[error("Invalid config file: {0}")]
    FormatError(json5::Error),
    #[error("Window size {0}x{1} is empty")]
    EmptyWindow(u32, u32),
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"{
                // comments are allowed
                width: 1280,
                start: "Clear Color",
            }"#,
        )
        .unwrap();

        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 540);
        assert_eq!(config.start_demo.as_deref(), Some("Clear Color"));
        assert!(config.vsync);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::parse("{ widht: 3 }"),
            Err(ConfigError::FormatError(_))
        ));
    }

    #[test]
    fn arguments_override_file() {
        let args = Args::parse_from(["glsandbox", "--height", "720", "--start", "Textured Quads"]);

        let config = Config::parse("{ height: 100, title: 'x' }")
            .unwrap()
            .merge(&args);

        assert_eq!(config.height, 720);
        assert_eq!(config.title, "x");
        assert_eq!(config.start_demo.as_deref(), Some("Textured Quads"));
    }

    #[test]
    fn empty_window_is_invalid() {
        let config = Config {
            width: 0,
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyWindow(0, 540))
        ));
    }

    #[test]
    fn missing_file() {
        let args = Args::parse_from(["glsandbox", "--config", "/nonexistent/glsandbox.json5"]);

        assert!(matches!(
            Config::from_args(&args),
            Err(ConfigError::InputError(_))
        ));
    }
}
