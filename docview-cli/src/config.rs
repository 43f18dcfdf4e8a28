use anyhow::{Context, Result};
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use docview_core::content::{ContentStore, FsStore, HttpStore};
use docview_core::{DocRequest, DocSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DocviewConfig {
    /// Options only the command line tool uses
    #[serde(default)]
    pub cli: CliConfig,
    /// Viewer configuration (from docview-core)
    #[serde(flatten)]
    pub core: docview_core::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// Document set requests are made against
    pub docset: String,
    /// Navigation tree JSON
    pub nav: Option<String>,
    /// Theme directory overriding the built-in templates
    pub theme: Option<String>,
    /// Configuration file path
    pub config: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            docset: DocSet::Public.to_string(),
            nav: None,
            theme: None,
            config: "./docview.toml".to_string(),
        }
    }
}

impl DocviewConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (DOCVIEW_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = arg(args, "config")
            .cloned()
            .unwrap_or_else(|| CliConfig::default().config);

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(ConfigBuilder::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::new(&config_file, FileFormat::Toml));
        } else if arg(args, "config").is_some() {
            anyhow::bail!("configuration file {config_file} does not exist");
        }

        // 3. Add environment variables with DOCVIEW_ prefix
        builder = builder.add_source(
            Environment::with_prefix("DOCVIEW")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority)
        let mut cli_overrides = HashMap::new();

        let flags = [
            ("config", "cli.config"),
            ("type", "cli.docset"),
            ("nav", "cli.nav"),
            ("theme", "cli.theme"),
            ("root", "content.root"),
            ("base-url", "content.base_url"),
        ];
        for (flag, key) in flags {
            if let Some(value) = arg(args, flag) {
                cli_overrides.insert(key.to_string(), value.clone());
            }
        }

        if !cli_overrides.is_empty() {
            builder = builder.add_source(ConfigBuilder::try_from(&cli_overrides)?);
        }

        // Build and deserialize
        let config = builder.build()?;
        let docview_config: DocviewConfig = config
            .try_deserialize()
            .with_context(|| format!("invalid configuration (file: {config_file})"))?;

        Ok(docview_config)
    }

    pub fn docset(&self) -> Result<DocSet> {
        self.cli.docset.parse::<DocSet>().map_err(anyhow::Error::msg)
    }

    /// Request for `path` in the configured document set.
    pub fn request(&self, path: &str) -> Result<DocRequest> {
        Ok(DocRequest::new(self.docset()?, path))
    }

    /// The content store the configuration points at: a static host when
    /// `base_url` is set, otherwise the local root.
    pub fn store(&self) -> Result<Box<dyn ContentStore>> {
        let content = &self.core.content;
        if let Some(base_url) = &content.base_url {
            let timeout = Duration::from_secs(content.timeout_secs);
            return Ok(Box::new(HttpStore::new(base_url, timeout)));
        }

        let root = content
            .root
            .as_deref()
            .context("no content root or base URL configured")?;
        Ok(Box::new(FsStore::new(root)))
    }
}

// Flags may be missing from a subcommand entirely.
fn arg<'a>(args: &'a ArgMatches, id: &str) -> Option<&'a String> {
    args.try_get_one::<String>(id).unwrap_or(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    fn command() -> Command {
        Command::new("test")
            .arg(Arg::new("type").long("type").value_name("SET"))
            .arg(Arg::new("root").long("root").value_name("DIR"))
            .arg(Arg::new("base-url").long("base-url").value_name("URL"))
            .arg(Arg::new("config").long("config").value_name("FILE"))
    }

    #[test]
    fn test_default_config() {
        let config = DocviewConfig::default();
        assert_eq!(config.cli.docset, "public");
        assert_eq!(config.cli.config, "./docview.toml");
        assert_eq!(config.core.content.prefix, "docs");
        assert_eq!(config.core.scroll.jump_offset, 100.0);
    }

    #[test]
    fn test_cli_args_override() {
        let matches = command()
            .try_get_matches_from(vec!["test", "--type", "internal", "--root", "/srv/site"])
            .unwrap();

        let config = DocviewConfig::load(&matches).unwrap();
        assert_eq!(config.docset().unwrap(), DocSet::Internal);
        assert_eq!(config.core.content.root.as_deref(), Some("/srv/site"));
        // Should still have defaults for non-overridden values
        assert_eq!(config.core.content.prefix, "docs");
        assert_eq!(config.core.site.title, "Docs");
    }

    #[test]
    fn test_config_file_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docview.toml");
        std::fs::write(
            &path,
            "[site]\ntitle = \"Handbook\"\n\n[content]\nprefix = \"content\"\n",
        )
        .unwrap();

        let matches = command()
            .try_get_matches_from(vec!["test", "--config", path.to_str().unwrap()])
            .unwrap();
        let config = DocviewConfig::load(&matches).unwrap();
        assert_eq!(config.core.site.title, "Handbook");
        assert_eq!(config.core.content.prefix, "content");
        assert_eq!(config.core.content.extension.as_deref(), Some("md"));
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let matches = command()
            .try_get_matches_from(vec!["test", "--config", "/no/such/docview.toml"])
            .unwrap();
        assert!(DocviewConfig::load(&matches).is_err());
    }

    #[test]
    fn test_invalid_docset() {
        let matches = command()
            .try_get_matches_from(vec!["test", "--type", "private"])
            .unwrap();
        let config = DocviewConfig::load(&matches).unwrap();
        assert!(config.request("a").is_err());
    }
}
