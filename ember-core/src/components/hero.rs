use serde::Serialize;

use crate::graph::ContentGraph;
use crate::images::{FluidImage, ImageError};

/// The image asset the hero asks the content graph for.
pub const PROFILE_IMAGE: &str = "profile.jpeg";

const FLUID_MAX_WIDTH: u32 = 400;
const FLUID_QUALITY: u8 = 100;

/// Data requirement of the hero header: the home copy from site metadata
/// plus the fluid rendition of the profile image.
#[derive(Debug, Clone, Serialize)]
pub struct HeroData {
    pub headline: String,
    pub intro_html: String,
    pub image: Option<FluidImage>,
}

impl HeroData {
    pub fn resolve(graph: &ContentGraph) -> Result<Self, ImageError> {
        let home = &graph.site_metadata().home;

        Ok(Self {
            headline: home.title.clone(),
            intro_html: home.description.clone(),
            image: graph.fluid(PROFILE_IMAGE, FLUID_MAX_WIDTH, FLUID_QUALITY)?,
        })
    }
}

pub fn render(data: &HeroData) -> String {
    let mut html = String::new();

    html.push_str("<div class=\"hero-header\">\n<div class=\"desc\">\n");
    html.push_str(&format!(
        "<div class=\"headline\">{}</div>\n",
        html_escape::encode_text(&data.headline)
    ));
    // The intro is trusted HTML authored in the site metadata, injected as-is.
    html.push_str(&format!(
        "<div class=\"primary-content\">{}</div>\n",
        data.intro_html
    ));
    html.push_str("<a href=\"/contact/\" class=\"button -primary\">Get in touch &rarr;</a>\n</div>\n");

    if let Some(image) = &data.image {
        html.push_str(&format!(
            "<div class=\"avatar\">\n<img src=\"{}\" srcset=\"{}\" sizes=\"{}\" alt=\"profile\" />\n</div>\n",
            html_escape::encode_quoted_attribute(&image.src),
            html_escape::encode_quoted_attribute(&image.srcset),
            html_escape::encode_quoted_attribute(&image.sizes),
        ));
    }

    html.push_str("</div>\n");

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(image: Option<FluidImage>) -> HeroData {
        HeroData {
            headline: "Hey, I'm Surya".to_string(),
            intro_html: "I write about <strong>systems</strong>.".to_string(),
            image,
        }
    }

    #[test]
    fn renders_headline_and_intro_verbatim() {
        let html = render(&data(None));
        assert!(html.contains("Hey, I'm Surya"));
        // Trusted HTML passes through without escaping
        assert!(html.contains("I write about <strong>systems</strong>."));
        assert!(html.contains("<a href=\"/contact/\""));
    }

    #[test]
    fn headline_text_is_escaped() {
        let mut d = data(None);
        d.headline = "Tips & tricks <3".to_string();
        let html = render(&d);
        assert!(html.contains("Tips &amp; tricks"));
    }

    #[test]
    fn image_render_is_skipped_when_unresolved() {
        let html = render(&data(None));
        assert!(!html.contains("<img"));
        assert!(!html.contains("avatar"));
    }

    #[test]
    fn resolved_image_renders_responsive_markup() {
        let image = FluidImage {
            src: "/assets/profile-400w.jpeg".to_string(),
            srcset: "/assets/profile-200w.jpeg 200w, /assets/profile-400w.jpeg 400w".to_string(),
            sizes: "(max-width: 400px) 100vw, 400px".to_string(),
            aspect_ratio: 1.0,
        };
        let html = render(&data(Some(image)));
        assert!(html.contains("srcset=\"/assets/profile-200w.jpeg 200w"));
        assert!(html.contains("sizes=\"(max-width: 400px) 100vw, 400px\""));
    }
}
