use crate::config::CommentsOptions;

/// Discussion embed for a post page. The thread is keyed by the page URL and
/// the post slug so it survives URL changes.
pub fn embed(options: &CommentsOptions, page_url: &str, identifier: &str) -> String {
    format!(
        "<div id=\"disqus_thread\"></div>\n<script>\nvar disqus_config = function () {{\n  this.page.url = '{url}';\n  this.page.identifier = '{id}';\n}};\n(function () {{\n  var d = document, s = d.createElement('script');\n  s.src = 'https://{shortname}.disqus.com/embed.js';\n  s.setAttribute('data-timestamp', +new Date());\n  (d.head || d.body).appendChild(s);\n}})();\n</script>\n",
        url = page_url,
        id = identifier,
        shortname = options.shortname
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_points_at_the_configured_shortname() {
        let options = CommentsOptions {
            shortname: "zigzagrainbow".to_string(),
        };
        let html = embed(&options, "https://example.com/blog/hello/", "hello");
        assert!(html.contains("https://zigzagrainbow.disqus.com/embed.js"));
        assert!(html.contains("this.page.url = 'https://example.com/blog/hello/'"));
        assert!(html.contains("this.page.identifier = 'hello'"));
        assert!(html.contains("disqus_thread"));
    }
}
