use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::error::InspectError;

#[derive(Parser)]
#[command(name = "bag-inspect", about = "Inspect ROS bag 2.0 files through the rosbag_v2 storage")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "BAG_INSPECT_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print bag metadata as JSON
    Info(BagArgs),
    /// List readable topics with their host types
    Topics(BagArgs),
    /// Print transcoded messages, one JSON object per line
    Dump(DumpArgs),
}

#[derive(Args, Clone, Debug)]
pub struct BagArgs {
    /// Bag file to open
    pub bag: String,
}

#[derive(Args, Clone, Debug)]
pub struct DumpArgs {
    /// Bag file to open
    pub bag: String,
    /// Only dump these topics (repeatable)
    #[arg(long = "topic")]
    pub topics: Vec<String>,
    /// Stop after this many messages
    #[arg(long)]
    pub limit: Option<usize>,
    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

// ---- TOML Config ----

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InspectConfig {
    /// Storage identifier to open bags with.
    #[serde(default = "default_storage")]
    pub storage: String,
    /// Dump allow list; empty means every topic.
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub pretty: bool,
}

fn default_storage() -> String {
    bag_v2_plugins::IDENTIFIER.to_string()
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            topics: Vec::new(),
            limit: None,
            pretty: false,
        }
    }
}

impl InspectConfig {
    /// Defaults when no file is given.
    pub fn load(path: Option<&str>) -> Result<Self, InspectError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .map_err(|e| InspectError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        let config = Self::parse(&content)
            .map_err(|e| InspectError::Config { context: "parse", detail: format!("'{path}': {e}") })?;
        tracing::debug!(config = %path, storage = %config.storage, "loaded config");
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Dump options after merging CLI flags over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpSettings {
    pub topics: Vec<String>,
    pub limit: Option<usize>,
    pub pretty: bool,
}

impl DumpSettings {
    pub fn resolve(args: &DumpArgs, config: &InspectConfig) -> Self {
        Self {
            topics: if args.topics.is_empty() { config.topics.clone() } else { args.topics.clone() },
            limit: args.limit.or(config.limit),
            pretty: args.pretty || config.pretty,
        }
    }

    pub fn wants(&self, topic: &str) -> bool {
        self.topics.is_empty() || self.topics.iter().any(|t| t == topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(InspectConfig::parse("").unwrap(), InspectConfig::default());
        assert_eq!(InspectConfig::default().storage, "rosbag_v2");
    }

    #[test]
    fn parses_all_keys() {
        let config = InspectConfig::parse(
            r#"
            storage = "rosbag_v2"
            topics = ["/chatter", "/odom"]
            limit = 10
            pretty = true
            "#,
        )
        .unwrap();
        assert_eq!(config.topics, vec!["/chatter", "/odom"]);
        assert_eq!(config.limit, Some(10));
        assert!(config.pretty);
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(InspectConfig::parse("limt = 3").is_err());
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = InspectConfig::load(Some("/no/such/bag-inspect.toml")).unwrap_err();
        assert!(matches!(err, InspectError::Config { context: "read", .. }));
    }

    #[test]
    fn cli_flags_override_file() {
        let cli = Cli::try_parse_from([
            "bag-inspect", "dump", "run.bag", "--topic", "/a", "--topic", "/b", "--limit", "2",
        ])
        .unwrap();
        let Commands::Dump(args) = cli.command else {
            panic!("expected dump");
        };
        let config = InspectConfig {
            topics: vec!["/c".into()],
            limit: Some(50),
            pretty: true,
            ..InspectConfig::default()
        };

        let settings = DumpSettings::resolve(&args, &config);
        assert_eq!(settings.topics, vec!["/a", "/b"]);
        assert_eq!(settings.limit, Some(2));
        assert!(settings.pretty);
        assert!(settings.wants("/b"));
        assert!(!settings.wants("/c"));
    }

    #[test]
    fn file_applies_when_flags_absent() {
        let cli = Cli::try_parse_from(["bag-inspect", "--config", "x.toml", "dump", "run.bag"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("x.toml"));
        let Commands::Dump(args) = cli.command else {
            panic!("expected dump");
        };
        let config = InspectConfig { limit: Some(5), ..InspectConfig::default() };
        let settings = DumpSettings::resolve(&args, &config);
        assert_eq!(settings.limit, Some(5));
        assert!(settings.wants("/anything"));
    }
}
