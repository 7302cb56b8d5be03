/// Outbound profile links. Fixed markup, no data dependency.
const LINKS: [(&str, &str); 3] = [
    ("https://twitter.com/SurKM9", "fa fa-twitter"),
    ("https://www.instagram.com/surkm9/", "fa fa-instagram"),
    ("mailto:hello@zigzagrainbow.dev", "fa fa-envelope"),
];

pub fn render() -> String {
    let mut html = String::from("<div class=\"icon-container\">\n");
    for (href, icon) in LINKS {
        html.push_str(&format!(
            "<div class=\"icon-rs\">\n<a href=\"{}\"><i class=\"{}\"></i></a>\n</div>\n",
            href, icon
        ));
    }
    html.push_str("</div>\n");

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_renders_exactly_three_links() {
        let html = render();
        assert_eq!(html.matches("<a href=").count(), 3);
    }

    #[test]
    fn every_link_leaves_the_site() {
        let html = render();
        for (href, _) in LINKS {
            assert!(html.contains(href));
            assert!(href.starts_with("https://") || href.starts_with("mailto:"));
        }
    }
}
