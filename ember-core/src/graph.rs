use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::SiteMetadata;
use crate::images::{FixedImage, FluidImage, ImageAsset, ImageError, ImageProcessor};
use crate::markdown::{self, Document};

/// A published post, derived from one markdown file.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub title: String,
    pub date: NaiveDate,
    pub date_display: String,
    pub description: Option<String>,
    pub excerpt: String,
    pub slug: String,
    pub url: String,
    pub body_html: String,
}

impl Post {
    pub fn from_document(source_name: &str, doc: Document) -> Self {
        let stem = Path::new(source_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| source_name.to_string());
        let slug = markdown::slugify(&stem);

        Self {
            title: doc.front.title,
            date: doc.front.date,
            date_display: doc.front.date.format("%B %-d, %Y").to_string(),
            description: doc.front.description,
            excerpt: doc.excerpt,
            url: format!("/blog/{}/", slug),
            slug,
            body_html: doc.body_html,
        }
    }
}

/// The build-time content model: site metadata, every post and every image
/// asset, resolved once before any page renders. Read-only afterwards.
pub struct ContentGraph {
    metadata: SiteMetadata,
    posts: Vec<Post>,
    images: HashMap<String, ImageAsset>,
    processor: ImageProcessor,
}

impl ContentGraph {
    pub fn new(
        metadata: SiteMetadata,
        mut posts: Vec<Post>,
        images: Vec<ImageAsset>,
        processor: ImageProcessor,
    ) -> Self {
        // Newest first, title as tiebreaker so ordering is stable
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title)));

        Self {
            metadata,
            posts,
            images: images.into_iter().map(|a| (a.name.clone(), a)).collect(),
            processor,
        }
    }

    pub fn site_metadata(&self) -> &SiteMetadata {
        &self.metadata
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn image(&self, name: &str) -> Option<&ImageAsset> {
        self.images.get(name)
    }

    /// Fluid rendition of a named image asset. An asset that was never
    /// sourced resolves to `None`; a sourced asset that fails to process is
    /// an error.
    pub fn fluid(
        &self,
        name: &str,
        max_width: u32,
        quality: u8,
    ) -> Result<Option<FluidImage>, ImageError> {
        match self.images.get(name) {
            Some(asset) => Ok(Some(self.processor.fluid(asset, max_width, quality)?)),
            None => Ok(None),
        }
    }

    pub fn fixed(
        &self,
        name: &str,
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Option<FixedImage>, ImageError> {
        match self.images.get(name) {
            Some(asset) => Ok(Some(self.processor.fixed(asset, width, height, quality)?)),
            None => Ok(None),
        }
    }
}
