pub mod analytics;
pub mod builder;
pub mod comments;
pub mod components;
pub mod config;
pub mod graph;
pub mod images;
pub mod markdown;
pub mod offline;
pub mod pattern;
pub mod renderer;
pub mod scanner;
pub mod sitemap;
pub mod webmanifest;

// Re-export main types
pub use builder::{BuildError, NavItem, RenderError, Site, SiteBuilder};
pub use config::{SiteConfig, SiteMetadata};
pub use graph::{ContentGraph, Post};
pub use scanner::SourceScanner;
