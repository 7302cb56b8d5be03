use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parsing(toml::de::Error),
    Metadata(serde_json::Error),
    PluginOptions(String, toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parsing(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::Metadata(e) => write!(f, "Metadata parse error: {}", e),
            ConfigError::PluginOptions(name, e) => {
                write!(f, "Invalid options for plugin '{}': {}", name, e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parsing(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::Metadata(value)
    }
}

/// The site manifest (`ember.toml`): where the metadata JSON lives and which
/// plugins run, in order. Read once at the start of a build.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub metadata: PathBuf,
    pub plugins: Vec<PluginSpec>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            metadata: PathBuf::from("./site-meta-data.json"),
            plugins: Vec::new(),
        }
    }
}

/// A plugin entry: either a bare name, or a name with an options table.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum PluginSpec {
    Name(String),
    Configured {
        resolve: String,
        #[serde(default)]
        options: toml::Table,
    },
}

impl PluginSpec {
    pub fn name(&self) -> &str {
        match self {
            PluginSpec::Name(name) => name,
            PluginSpec::Configured { resolve, .. } => resolve,
        }
    }
}

impl SiteConfig {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: SiteConfig = toml::from_str(&data)?;

        Ok(config)
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    /// Deserialize the options table of the first plugin with the given name.
    /// A bare-name entry yields the options type's defaults. Unknown option
    /// keys are rejected here, before any build work happens.
    pub fn plugin_options<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        for plugin in &self.plugins {
            match plugin {
                PluginSpec::Name(n) if n == name => return Ok(Some(T::default())),
                PluginSpec::Configured { resolve, options } if resolve == name => {
                    let value = toml::Value::Table(options.clone());
                    let parsed = value
                        .try_into()
                        .map_err(|e| ConfigError::PluginOptions(name.to_string(), e))?;
                    return Ok(Some(parsed));
                }
                _ => {}
            }
        }

        Ok(None)
    }

    /// All filesystem sources declared in the manifest. The same plugin can
    /// appear multiple times, once per content root.
    pub fn sources(&self) -> Result<Vec<SourceOptions>, ConfigError> {
        let mut sources = Vec::new();
        for plugin in &self.plugins {
            if let PluginSpec::Configured { resolve, options } = plugin {
                if resolve == "source-filesystem" {
                    let value = toml::Value::Table(options.clone());
                    let parsed: SourceOptions = value
                        .try_into()
                        .map_err(|e| ConfigError::PluginOptions(resolve.clone(), e))?;
                    sources.push(parsed);
                }
            }
        }

        Ok(sources)
    }

    pub fn source(&self, name: &str) -> Result<Option<SourceOptions>, ConfigError> {
        Ok(self.sources()?.into_iter().find(|s| s.name == name))
    }
}

/// Site metadata, sourced from a static JSON file and exposed read-only to
/// every page. `home.description` is trusted HTML authored by the site owner.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SiteMetadata {
    pub title: String,
    pub description: String,
    #[serde(default, rename = "siteUrl")]
    pub site_url: Option<String>,
    #[serde(default)]
    pub home: HomeMetadata,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct HomeMetadata {
    pub title: String,
    pub description: String,
}

impl SiteMetadata {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let metadata: SiteMetadata = serde_json::from_str(&data)?;

        Ok(metadata)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SourceOptions {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownOptions {
    pub highlight: HighlightOptions,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightOptions {
    pub class_prefix: String,
    pub show_line_numbers: bool,
    pub no_inline_highlight: bool,
    pub theme: String,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            class_prefix: "language-".to_string(),
            show_line_numbers: false,
            no_inline_highlight: false,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsOptions {
    pub tracking_id: Option<String>,
    pub head: bool,
    pub anonymize: bool,
    pub respect_dnt: bool,
    pub exclude: Vec<String>,
    pub sample_rate: u32,
    pub site_speed_sample_rate: u32,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            tracking_id: None,
            head: false,
            anonymize: false,
            respect_dnt: false,
            exclude: Vec::new(),
            sample_rate: 100,
            site_speed_sample_rate: 1,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestOptions {
    pub name: String,
    pub short_name: String,
    pub start_url: String,
    pub background_color: String,
    pub theme_color: String,
    pub display: String,
    pub icon: Option<PathBuf>,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            short_name: String::new(),
            start_url: "/".to_string(),
            background_color: "#ffffff".to_string(),
            theme_color: "#ffffff".to_string(),
            display: "standalone".to_string(),
            icon: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapOptions {
    pub exclude: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct CommentsOptions {
    pub shortname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
        metadata = "./site-meta-data.json"

        [[plugins]]
        resolve = "source-filesystem"
        [plugins.options]
        name = "markdown-pages"
        path = "_data"

        [[plugins]]
        resolve = "source-filesystem"
        [plugins.options]
        name = "images"
        path = "static/assets"

        [[plugins]]
        resolve = "analytics"
        [plugins.options]
        tracking_id = "UA-000000000-1"
        head = true
        anonymize = true
        respect_dnt = true
        exclude = ["/preview/**"]
        sample_rate = 100
        site_speed_sample_rate = 10

        [[plugins]]
        resolve = "sitemap"
        [plugins.options]
        exclude = ["/preview/**"]

        [[plugins]]
        resolve = "offline"
    "#;

    #[test]
    fn manifest_parses_ordered_plugins() {
        let config: SiteConfig = toml::from_str(MANIFEST).unwrap();
        let names: Vec<&str> = config.plugins.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec![
                "source-filesystem",
                "source-filesystem",
                "analytics",
                "sitemap",
                "offline"
            ]
        );
    }

    #[test]
    fn bare_names_parse_in_inline_arrays() {
        let config: SiteConfig =
            toml::from_str(r#"plugins = ["offline", { resolve = "sitemap" }]"#).unwrap();
        assert!(config.has_plugin("offline"));
        assert!(config.has_plugin("sitemap"));
        assert!(matches!(config.plugins[0], PluginSpec::Name(_)));
    }

    #[test]
    fn typed_options_extraction() {
        let config: SiteConfig = toml::from_str(MANIFEST).unwrap();

        let analytics: AnalyticsOptions = config.plugin_options("analytics").unwrap().unwrap();
        assert_eq!(analytics.tracking_id.as_deref(), Some("UA-000000000-1"));
        assert!(analytics.head);
        assert!(analytics.anonymize);
        assert_eq!(analytics.site_speed_sample_rate, 10);
        assert_eq!(analytics.exclude, vec!["/preview/**"]);

        let sitemap: SitemapOptions = config.plugin_options("sitemap").unwrap().unwrap();
        assert_eq!(sitemap.exclude, vec!["/preview/**"]);

        // Bare entry resolves to the options type's defaults.
        let markdown: Option<MarkdownOptions> = config.plugin_options("transform-markdown").unwrap();
        assert!(markdown.is_none());
    }

    #[test]
    fn named_sources() {
        let config: SiteConfig = toml::from_str(MANIFEST).unwrap();
        let posts = config.source("markdown-pages").unwrap().unwrap();
        assert_eq!(posts.path, PathBuf::from("_data"));
        let images = config.source("images").unwrap().unwrap();
        assert_eq!(images.path, PathBuf::from("static/assets"));
        assert!(config.source("videos").unwrap().is_none());
    }

    #[test]
    fn unknown_option_keys_are_rejected() {
        let config: SiteConfig = toml::from_str(
            r#"
            [[plugins]]
            resolve = "sitemap"
            [plugins.options]
            exclud = ["/oops"]
            "#,
        )
        .unwrap();

        let result: Result<Option<SitemapOptions>, _> = config.plugin_options("sitemap");
        assert!(matches!(result, Err(ConfigError::PluginOptions(_, _))));
    }

    #[test]
    fn metadata_from_json() {
        let metadata: SiteMetadata = serde_json::from_str(
            r#"{
                "title": "T",
                "description": "D",
                "siteUrl": "https://example.com",
                "home": { "title": "Hello", "description": "<em>hi</em>" }
            }"#,
        )
        .unwrap();
        assert_eq!(metadata.title, "T");
        assert_eq!(metadata.site_url.as_deref(), Some("https://example.com"));
        assert_eq!(metadata.home.description, "<em>hi</em>");
    }
}
