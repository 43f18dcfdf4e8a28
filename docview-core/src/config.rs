use serde::{Deserialize, Serialize};

use crate::postprocess::{DEFAULT_DARK_THEME, DEFAULT_LIGHT_THEME};

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub content: ContentConfig,
    pub render: RenderConfig,
    pub scroll: ScrollConfig,
    pub log: LogConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub version: Option<String>,
    /// Link offered on the error page to get back home.
    pub home: String,
    /// A document known to exist, offered on the error page.
    pub default_document: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Docs".into(),
            version: None,
            home: "/".into(),
            default_document: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    /// First segment of every document locator (`/<prefix>/<docset>/...`).
    pub prefix: String,
    /// Extension appended to extension-less request paths.
    pub extension: Option<String>,
    /// Directory that holds `<prefix>/...` on disk.
    pub root: Option<String>,
    /// Static host serving `<prefix>/...`; takes precedence over `root`.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            prefix: "docs".into(),
            extension: Some("md".into()),
            root: Some("./public".into()),
            base_url: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub light_theme: String,
    pub dark_theme: String,
    /// Selector under which the dark theme applies.
    pub dark_scope: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            light_theme: DEFAULT_LIGHT_THEME.into(),
            dark_theme: DEFAULT_DARK_THEME.into(),
            dark_scope: ".dark".into(),
        }
    }
}

/// Trigger band and jump offset of the scroll-spy.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
    /// Share of the viewport height ignored at the top.
    pub top_margin: f64,
    /// Share of the viewport height ignored at the bottom.
    pub bottom_margin: f64,
    /// Pixels kept between the viewport top and a heading after a jump.
    pub jump_offset: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            top_margin: 0.20,
            bottom_margin: 0.35,
            jump_offset: 100.0,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `docview_core=debug`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.content.prefix, "docs");
        assert_eq!(config.scroll.jump_offset, 100.0);
        assert_eq!(config.scroll.top_margin, 0.20);
        assert_eq!(config.scroll.bottom_margin, 0.35);
        assert_eq!(config.render.dark_scope, ".dark");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            "[site]\ntitle = \"InBot Docs\"\n\n[scroll]\njump_offset = 80.0\n",
        )
        .unwrap();
        assert_eq!(config.site.title, "InBot Docs");
        assert_eq!(config.site.home, "/");
        assert_eq!(config.scroll.jump_offset, 80.0);
        assert_eq!(config.scroll.top_margin, 0.20);
        assert_eq!(config.content.extension.as_deref(), Some("md"));
    }
}
