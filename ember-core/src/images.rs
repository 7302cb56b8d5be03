use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use serde::Serialize;

#[derive(Debug)]
pub enum ImageError {
    Io(PathBuf, std::io::Error),
    Image(PathBuf, image::ImageError),
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::Io(p, e) => write!(f, "IO error for {}: {}", p.display(), e),
            ImageError::Image(p, e) => write!(f, "Image error for {}: {}", p.display(), e),
        }
    }
}

impl std::error::Error for ImageError {}

/// A source image discovered under the images filesystem source. Pixel data
/// stays on disk until a derivative is requested.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub name: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ImageAsset {
    pub fn read(name: String, path: PathBuf) -> Result<Self, ImageError> {
        let (width, height) =
            image::image_dimensions(&path).map_err(|e| ImageError::Image(path.clone(), e))?;

        Ok(Self {
            name,
            path,
            width,
            height,
        })
    }
}

/// Responsive rendition: a srcset spanning a range of widths plus the sizes
/// hint, for images that fill their container.
#[derive(Debug, Clone, Serialize)]
pub struct FluidImage {
    pub src: String,
    pub srcset: String,
    pub sizes: String,
    pub aspect_ratio: f64,
}

/// Density-based rendition at an exact layout size.
#[derive(Debug, Clone, Serialize)]
pub struct FixedImage {
    pub src: String,
    pub srcset: String,
    pub width: u32,
    pub height: u32,
}

/// Writes resized derivatives of source images into the output tree and
/// hands back the URLs to reference them with.
pub struct ImageProcessor {
    out_dir: PathBuf,
    url_prefix: String,
}

impl ImageProcessor {
    pub fn new<P: AsRef<Path>>(out_dir: P, url_prefix: &str) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn fluid(
        &self,
        asset: &ImageAsset,
        max_width: u32,
        quality: u8,
    ) -> Result<FluidImage, ImageError> {
        let source =
            image::open(&asset.path).map_err(|e| ImageError::Image(asset.path.clone(), e))?;

        let base_width = max_width.min(asset.width);
        let mut widths: Vec<u32> = [
            max_width / 4,
            max_width / 2,
            max_width,
            max_width * 3 / 2,
            max_width * 2,
        ]
        .into_iter()
        .map(|w| w.min(asset.width))
        .filter(|w| *w > 0)
        .collect();
        widths.sort_unstable();
        widths.dedup();

        let aspect_ratio = asset.width as f64 / asset.height as f64;
        let mut entries = Vec::new();
        let mut src = String::new();
        for width in widths {
            let url = self.write_derivative(asset, &source, width, aspect_ratio, quality)?;
            if width == base_width {
                src = url.clone();
            }
            entries.push(format!("{} {}w", url, width));
        }

        Ok(FluidImage {
            src,
            srcset: entries.join(", "),
            sizes: format!("(max-width: {0}px) 100vw, {0}px", max_width),
            aspect_ratio,
        })
    }

    pub fn fixed(
        &self,
        asset: &ImageAsset,
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<FixedImage, ImageError> {
        let source =
            image::open(&asset.path).map_err(|e| ImageError::Image(asset.path.clone(), e))?;

        let aspect_ratio = width as f64 / height as f64;
        let mut entries = Vec::new();
        let mut src = String::new();
        for (density, label) in [(1.0, "1x"), (1.5, "1.5x"), (2.0, "2x")] {
            let scaled = ((width as f64) * density).round() as u32;
            if scaled > asset.width {
                continue;
            }
            let url = self.write_derivative(asset, &source, scaled, aspect_ratio, quality)?;
            if density == 1.0 {
                src = url.clone();
            }
            entries.push(format!("{} {}", url, label));
        }

        Ok(FixedImage {
            src,
            srcset: entries.join(", "),
            width,
            height,
        })
    }

    fn write_derivative(
        &self,
        asset: &ImageAsset,
        source: &image::DynamicImage,
        width: u32,
        aspect_ratio: f64,
        quality: u8,
    ) -> Result<String, ImageError> {
        let height = ((width as f64 / aspect_ratio).round() as u32).max(1);
        let resized = source.resize_exact(width, height, FilterType::Lanczos3);

        let stem = Path::new(&asset.name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| asset.name.clone());
        let ext = asset
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "jpg".to_string());
        let file_name = format!("{}-{}w.{}", stem, width, ext);

        std::fs::create_dir_all(&self.out_dir)
            .map_err(|e| ImageError::Io(self.out_dir.clone(), e))?;
        let out_path = self.out_dir.join(&file_name);

        match ext.as_str() {
            "jpg" | "jpeg" => {
                let file = std::fs::File::create(&out_path)
                    .map_err(|e| ImageError::Io(out_path.clone(), e))?;
                let mut writer = BufWriter::new(file);
                let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
                resized
                    .to_rgb8()
                    .write_with_encoder(encoder)
                    .map_err(|e| ImageError::Image(out_path.clone(), e))?;
            }
            _ => {
                resized
                    .save(&out_path)
                    .map_err(|e| ImageError::Image(out_path.clone(), e))?;
            }
        }

        Ok(format!("{}/{}", self.url_prefix, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_asset(dir: &Path, width: u32, height: u32) -> ImageAsset {
        let path = dir.join("profile.jpeg");
        image::RgbImage::from_pixel(width, height, image::Rgb([120, 40, 200]))
            .save(&path)
            .unwrap();
        ImageAsset::read("profile.jpeg".to_string(), path).unwrap()
    }

    #[test]
    fn fluid_writes_width_ladder() {
        let dir = tempfile::tempdir().unwrap();
        let asset = test_asset(dir.path(), 200, 100);
        let processor = ImageProcessor::new(dir.path().join("out"), "/assets");

        let fluid = processor.fluid(&asset, 80, 90).unwrap();
        assert_eq!(fluid.src, "/assets/profile-80w.jpeg");
        assert!(fluid.srcset.contains("/assets/profile-20w.jpeg 20w"));
        assert!(fluid.srcset.contains("/assets/profile-160w.jpeg 160w"));
        assert_eq!(fluid.sizes, "(max-width: 80px) 100vw, 80px");
        assert!((fluid.aspect_ratio - 2.0).abs() < 1e-9);
        assert!(dir.path().join("out/profile-40w.jpeg").exists());
    }

    #[test]
    fn fluid_never_upscales_past_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let asset = test_asset(dir.path(), 100, 100);
        let processor = ImageProcessor::new(dir.path().join("out"), "/assets");

        let fluid = processor.fluid(&asset, 400, 90).unwrap();
        assert_eq!(fluid.src, "/assets/profile-100w.jpeg");
        assert!(!fluid.srcset.contains("400w"));
    }

    #[test]
    fn fixed_builds_density_srcset() {
        let dir = tempfile::tempdir().unwrap();
        let asset = test_asset(dir.path(), 200, 100);
        let processor = ImageProcessor::new(dir.path().join("out"), "/assets");

        let fixed = processor.fixed(&asset, 50, 25, 90).unwrap();
        assert_eq!(fixed.width, 50);
        assert_eq!(fixed.src, "/assets/profile-50w.jpeg");
        assert!(fixed.srcset.contains("1.5x"));
        assert!(fixed.srcset.contains("/assets/profile-100w.jpeg 2x"));
    }
}
