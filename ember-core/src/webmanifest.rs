use std::path::Path;

use image::imageops::FilterType;
use serde::Serialize;

use crate::config::ManifestOptions;
use crate::images::ImageError;

/// The icon ladder installable-app surfaces expect.
pub const ICON_SIZES: [u32; 8] = [48, 72, 96, 144, 192, 256, 384, 512];

#[derive(Debug, Clone, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime: String,
}

/// Resize the configured icon to every ladder size under `icons/`.
pub fn build_icons(icon_path: &Path, out_dir: &Path) -> Result<Vec<ManifestIcon>, ImageError> {
    let source =
        image::open(icon_path).map_err(|e| ImageError::Image(icon_path.to_path_buf(), e))?;
    let icons_dir = out_dir.join("icons");
    std::fs::create_dir_all(&icons_dir).map_err(|e| ImageError::Io(icons_dir.clone(), e))?;

    let mut icons = Vec::new();
    for size in ICON_SIZES {
        let file_name = format!("icon-{0}x{0}.png", size);
        let out_path = icons_dir.join(&file_name);
        source
            .resize_exact(size, size, FilterType::Lanczos3)
            .save(&out_path)
            .map_err(|e| ImageError::Image(out_path.clone(), e))?;

        icons.push(ManifestIcon {
            src: format!("/icons/{}", file_name),
            sizes: format!("{0}x{0}", size),
            mime: "image/png".to_string(),
        });
    }

    Ok(icons)
}

pub fn generate(
    options: &ManifestOptions,
    icons: &[ManifestIcon],
) -> Result<String, serde_json::Error> {
    #[derive(Serialize)]
    struct Manifest<'a> {
        name: &'a str,
        short_name: &'a str,
        start_url: &'a str,
        background_color: &'a str,
        theme_color: &'a str,
        display: &'a str,
        icons: &'a [ManifestIcon],
    }

    serde_json::to_string_pretty(&Manifest {
        name: &options.name,
        short_name: &options.short_name,
        start_url: &options.start_url,
        background_color: &options.background_color,
        theme_color: &options.theme_color,
        display: &options.display,
        icons,
    })
}

pub fn head_links(options: &ManifestOptions) -> String {
    format!(
        "<link rel=\"manifest\" href=\"/manifest.webmanifest\" />\n<meta name=\"theme-color\" content=\"{}\" />\n",
        html_escape::encode_quoted_attribute(&options.theme_color)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ManifestOptions {
        ManifestOptions {
            name: "ZigZagRainbow".to_string(),
            short_name: "ZZR".to_string(),
            theme_color: "#1e35cd".to_string(),
            ..ManifestOptions::default()
        }
    }

    #[test]
    fn manifest_json_shape() {
        let json = generate(&options(), &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "ZigZagRainbow");
        assert_eq!(value["short_name"], "ZZR");
        assert_eq!(value["start_url"], "/");
        assert_eq!(value["display"], "standalone");
    }

    #[test]
    fn icons_are_resized_to_the_full_ladder() {
        let dir = tempfile::tempdir().unwrap();
        let icon_path = dir.path().join("blogicon.png");
        image::RgbaImage::from_pixel(600, 600, image::Rgba([30, 53, 205, 255]))
            .save(&icon_path)
            .unwrap();

        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let icons = build_icons(&icon_path, &out).unwrap();

        assert_eq!(icons.len(), ICON_SIZES.len());
        assert!(out.join("icons/icon-192x192.png").exists());
        let (w, h) = image::image_dimensions(out.join("icons/icon-48x48.png")).unwrap();
        assert_eq!((w, h), (48, 48));
        assert_eq!(icons[0].sizes, "48x48");
    }

    #[test]
    fn head_links_advertise_manifest_and_theme_color() {
        let html = head_links(&options());
        assert!(html.contains("rel=\"manifest\""));
        assert!(html.contains("content=\"#1e35cd\""));
    }
}
