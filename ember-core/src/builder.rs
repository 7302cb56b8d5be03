use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::analytics;
use crate::comments;
use crate::components::{contact, hero, socials};
use crate::config::{
    AnalyticsOptions, CommentsOptions, ConfigError, ManifestOptions, MarkdownOptions, SiteConfig,
    SiteMetadata, SitemapOptions,
};
use crate::graph::{ContentGraph, Post};
use crate::images::{ImageAsset, ImageError, ImageProcessor};
use crate::markdown::{self, MarkdownError};
use crate::offline;
use crate::renderer::{RenderContext, Renderer, TemplateError};
use crate::scanner::{ScanError, SourceScanner};
use crate::sitemap;
use crate::webmanifest;

#[derive(Debug)]
pub enum BuildError {
    MissingSourceDir,
    Config(ConfigError),
    Scan(ScanError),
    Markdown(MarkdownError),
    Image(ImageError),
    Template(TemplateError),
    Io(std::io::Error),
}

impl From<ConfigError> for BuildError {
    fn from(err: ConfigError) -> Self {
        BuildError::Config(err)
    }
}

impl From<ScanError> for BuildError {
    fn from(err: ScanError) -> Self {
        BuildError::Scan(err)
    }
}

impl From<MarkdownError> for BuildError {
    fn from(err: MarkdownError) -> Self {
        BuildError::Markdown(err)
    }
}

impl From<ImageError> for BuildError {
    fn from(err: ImageError) -> Self {
        BuildError::Image(err)
    }
}

impl From<TemplateError> for BuildError {
    fn from(err: TemplateError) -> Self {
        BuildError::Template(err)
    }
}

impl From<std::io::Error> for BuildError {
    fn from(err: std::io::Error) -> Self {
        BuildError::Io(err)
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::MissingSourceDir => write!(f, "Source directory not specified"),
            BuildError::Config(e) => write!(f, "Config error: {}", e),
            BuildError::Scan(e) => write!(f, "Scan error: {}", e),
            BuildError::Markdown(e) => write!(f, "Markdown error: {}", e),
            BuildError::Image(e) => write!(f, "Image error: {}", e),
            BuildError::Template(e) => write!(f, "Template error: {}", e),
            BuildError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {}

#[derive(Debug)]
pub enum RenderError {
    Template(TemplateError),
    Image(ImageError),
    Serialization(serde_json::Error),
    Io(std::io::Error),
}

impl From<TemplateError> for RenderError {
    fn from(err: TemplateError) -> Self {
        RenderError::Template(err)
    }
}

impl From<ImageError> for RenderError {
    fn from(err: ImageError) -> Self {
        RenderError::Image(err)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Serialization(err)
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err)
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Template(e) => write!(f, "Template error: {}", e),
            RenderError::Image(e) => write!(f, "Image error: {}", e),
            RenderError::Serialization(e) => write!(f, "Serialization error: {}", e),
            RenderError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for RenderError {}

#[derive(Debug, Serialize)]
pub struct NavItem {
    pub text: String,
    pub link: String,
}

pub struct SiteBuilder {
    source_dir: Option<PathBuf>,
    output_dir: PathBuf,
    theme_dir: PathBuf,
    config: SiteConfig,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            source_dir: None,
            output_dir: PathBuf::from("./out"),
            theme_dir: PathBuf::from("./theme"),
            config: SiteConfig::default(),
        }
    }

    // Required configuration
    pub fn source_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_dir = Some(path.as_ref().to_path_buf());
        self
    }

    // Optional paths
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn theme_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.theme_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn site_config(mut self, config: SiteConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the manifest, source all content into the graph and load the
    /// theme. Everything that can be rejected is rejected here, before a
    /// single page renders.
    pub fn build(self) -> Result<Site, BuildError> {
        let source_dir = self.source_dir.ok_or(BuildError::MissingSourceDir)?;
        let config = self.config;

        let metadata_path = if config.metadata.is_absolute() {
            config.metadata.clone()
        } else {
            source_dir.join(&config.metadata)
        };
        let metadata = SiteMetadata::read(&metadata_path)?;

        // Typed plugin options; malformed tables fail the build up front
        let markdown_options: MarkdownOptions = config
            .plugin_options("transform-markdown")?
            .unwrap_or_default();
        let analytics_options: Option<AnalyticsOptions> = config.plugin_options("analytics")?;
        let manifest_options: Option<ManifestOptions> = config.plugin_options("manifest")?;
        let sitemap_options: Option<SitemapOptions> = config.plugin_options("sitemap")?;
        let comments_options: Option<CommentsOptions> = config.plugin_options("comments")?;
        let offline = config.has_plugin("offline");

        let mut posts = Vec::new();
        if let Some(source) = config.source("markdown-pages")? {
            let scanner = SourceScanner::new(source_dir.join(&source.path));
            for file in scanner.markdown_files()? {
                let doc = markdown::parse_document(&file.path, &markdown_options.highlight)?;
                posts.push(Post::from_document(&file.name, doc));
            }
        }

        let mut images = Vec::new();
        if let Some(source) = config.source("images")? {
            let scanner = SourceScanner::new(source_dir.join(&source.path));
            for file in scanner.image_files()? {
                images.push(ImageAsset::read(file.name, file.path)?);
            }
        }

        let processor = ImageProcessor::new(self.output_dir.join("assets"), "/assets");
        let graph = ContentGraph::new(metadata, posts, images, processor);

        let mut renderer = Renderer::new(&self.theme_dir)?;
        renderer.set_global_context("site", graph.site_metadata());
        let navigation = vec![
            NavItem {
                text: "Home".to_string(),
                link: "/".to_string(),
            },
            NavItem {
                text: "Contact".to_string(),
                link: "/contact/".to_string(),
            },
        ];
        renderer.set_global_context("navigation", &navigation);

        Ok(Site {
            graph,
            renderer,
            source_dir,
            output_dir: self.output_dir,
            theme_dir: self.theme_dir,
            analytics: analytics_options,
            manifest: manifest_options,
            sitemap: sitemap_options,
            comments: comments_options,
            offline,
        })
    }
}

pub struct Site {
    graph: ContentGraph,
    renderer: Renderer,
    source_dir: PathBuf,
    output_dir: PathBuf,
    theme_dir: PathBuf,
    analytics: Option<AnalyticsOptions>,
    manifest: Option<ManifestOptions>,
    sitemap: Option<SitemapOptions>,
    comments: Option<CommentsOptions>,
    offline: bool,
}

impl Site {
    pub fn graph(&self) -> &ContentGraph {
        &self.graph
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Every page URL the site will emit, in sitemap order.
    pub fn page_urls(&self) -> Vec<String> {
        let mut urls = vec!["/".to_string()];
        for post in self.graph.posts() {
            urls.push(post.url.clone());
        }
        urls.push("/contact/".to_string());

        urls
    }

    pub fn render_all(&self) -> Result<(), RenderError> {
        std::fs::create_dir_all(&self.output_dir)?;

        let page_urls = self.page_urls();
        let site = self.graph.site_metadata().clone();

        // Index: hero, socials, post listing
        let hero_data = hero::HeroData::resolve(&self.graph)?;
        let mut context = RenderContext::new();
        context.add_to_context("page_title", &site.title);
        context.add_to_context("meta_description", &site.description);
        context.add_to_context("hero", &hero::render(&hero_data));
        context.add_to_context("socials", &socials::render());
        context.add_to_context("posts", &self.graph.posts());
        self.write_page("index.html", "/", context)?;

        // One page per post
        for post in self.graph.posts() {
            let mut context = RenderContext::new();
            context.add_to_context("page_title", &format!("{} — {}", post.title, site.title));
            context.add_to_context(
                "meta_description",
                post.description.as_ref().unwrap_or(&post.excerpt),
            );
            context.add_to_context("post", post);
            context.add_to_context("content", &post.body_html);

            let comments_html = match &self.comments {
                Some(options) => comments::embed(options, &self.absolute_url(&post.url), &post.slug),
                None => String::new(),
            };
            context.add_to_context("comments", &comments_html);

            self.write_page("post.html", &post.url, context)?;
        }

        // Contact
        let contact_data = contact::ContactData::resolve(&self.graph);
        let mut context = RenderContext::new();
        context.add_to_context("page_title", &contact::document_title(&contact_data));
        context.add_to_context("meta_description", &contact::meta_description(&contact_data));
        context.add_to_context("contact", &contact::render());
        self.write_page("contact.html", "/contact/", context)?;

        // Output plugins
        if let Some(options) = &self.sitemap {
            let xml = sitemap::generate(site.site_url.as_deref(), &page_urls, options);
            std::fs::write(self.output_dir.join("sitemap.xml"), xml)?;
        }

        if let Some(options) = &self.manifest {
            let icons = match &options.icon {
                Some(icon) => {
                    webmanifest::build_icons(&self.source_dir.join(icon), &self.output_dir)?
                }
                None => Vec::new(),
            };
            let json = webmanifest::generate(options, &icons)?;
            std::fs::write(self.output_dir.join("manifest.webmanifest"), json)?;
        }

        if self.offline {
            let js = offline::service_worker(&page_urls);
            std::fs::write(self.output_dir.join("sw.js"), js)?;
        }

        // Theme assets ship as-is
        let static_dir = self.theme_dir.join("static");
        if static_dir.exists() {
            copy_dir(&static_dir, &self.output_dir)?;
        }

        Ok(())
    }

    fn write_page(
        &self,
        template: &str,
        url: &str,
        mut context: RenderContext,
    ) -> Result<(), RenderError> {
        let (head_extra, body_scripts) = self.page_chrome(url);
        context.add_to_context("head_extra", &head_extra);
        context.add_to_context("body_scripts", &body_scripts);

        let html = self.renderer.render(template, &context)?;

        let out_path = self.output_dir.join(out_path_for(url));
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(out_path, html)?;

        Ok(())
    }

    // Per-page head and end-of-body injections from the output plugins
    fn page_chrome(&self, url: &str) -> (String, String) {
        let mut head = String::new();
        let mut body = String::new();

        if let Some(options) = &self.manifest {
            head.push_str(&webmanifest::head_links(options));
        }

        if let Some(options) = &self.analytics {
            if analytics::applies_to(options, url) {
                if let Some(snippet) = analytics::snippet(options) {
                    if options.head {
                        head.push_str(&snippet);
                    } else {
                        body.push_str(&snippet);
                    }
                }
            }
        }

        if self.offline {
            body.push_str(&offline::register_snippet());
        }

        (head, body)
    }

    fn absolute_url(&self, url: &str) -> String {
        match &self.graph.site_metadata().site_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), url),
            None => url.to_string(),
        }
    }
}

fn out_path_for(url: &str) -> PathBuf {
    let trimmed = url.trim_matches('/');
    if trimmed.is_empty() {
        PathBuf::from("index.html")
    } else {
        PathBuf::from(trimmed).join("index.html")
    }
}

fn copy_dir(from: &Path, to: &Path) -> Result<(), std::io::Error> {
    for entry in WalkDir::new(from).into_iter().filter_map(|e| e.ok()) {
        if entry.path().is_file() {
            let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
            let dest = to.join(relative);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), dest)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_a_source_dir() {
        let result = SiteBuilder::new().build();
        assert!(matches!(result, Err(BuildError::MissingSourceDir)));
    }

    #[test]
    fn page_urls_map_to_nested_index_files() {
        assert_eq!(out_path_for("/"), PathBuf::from("index.html"));
        assert_eq!(
            out_path_for("/contact/"),
            PathBuf::from("contact/index.html")
        );
        assert_eq!(
            out_path_for("/blog/first-post/"),
            PathBuf::from("blog/first-post/index.html")
        );
    }
}
