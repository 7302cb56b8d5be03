use crate::config::SitemapOptions;
use crate::pattern;

/// Build `sitemap.xml` for the given page URLs, honoring the exclude list.
/// Locations are absolute when the site metadata carries a site URL.
pub fn generate(site_url: Option<&str>, urls: &[String], options: &SitemapOptions) -> String {
    let base = site_url.map(|u| u.trim_end_matches('/')).unwrap_or("");

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for url in urls {
        if pattern::matches_any(&options.exclude, url) {
            continue;
        }
        xml.push_str(&format!(
            "  <url>\n    <loc>{}{}</loc>\n  </url>\n",
            base,
            html_escape::encode_text(url)
        ));
    }
    xml.push_str("</urlset>\n");

    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> Vec<String> {
        vec![
            "/".to_string(),
            "/contact/".to_string(),
            "/preview/draft/".to_string(),
        ]
    }

    #[test]
    fn lists_pages_with_absolute_locations() {
        let xml = generate(
            Some("https://example.com/"),
            &urls(),
            &SitemapOptions::default(),
        );
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/contact/</loc>"));
    }

    #[test]
    fn excluded_paths_are_left_out() {
        let options = SitemapOptions {
            exclude: vec!["/preview/**".to_string()],
        };
        let xml = generate(Some("https://example.com"), &urls(), &options);
        assert!(!xml.contains("/preview/draft/"));
        assert!(xml.contains("/contact/"));
    }

    #[test]
    fn relative_locations_without_site_url() {
        let xml = generate(None, &urls(), &SitemapOptions::default());
        assert!(xml.contains("<loc>/contact/</loc>"));
    }
}
