//! Path pattern matching for plugin `exclude` lists. Two forms are
//! understood: an exact page path, and a prefix followed by `/**` matching
//! the whole subtree.

pub fn matches(pattern: &str, path: &str) -> bool {
    let path = normalize(path);

    if let Some(prefix) = pattern.strip_suffix("/**") {
        let prefix = normalize(prefix);
        return path == prefix || path.starts_with(&format!("{}/", prefix));
    }

    path == normalize(pattern)
}

pub fn matches_any(patterns: &[String], path: &str) -> bool {
    patterns.iter().any(|p| matches(p, path))
}

// Compare without a trailing slash so "/preview/" and "/preview" agree.
fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_paths() {
        assert!(matches("/contact", "/contact/"));
        assert!(matches("/contact/", "/contact"));
        assert!(!matches("/contact", "/contact/form"));
    }

    #[test]
    fn subtree_wildcards() {
        assert!(matches("/preview/**", "/preview/draft-post/"));
        assert!(matches("/preview/**", "/preview/"));
        assert!(matches("/preview/**", "/preview/a/b/c"));
        assert!(!matches("/preview/**", "/previews/other"));
        assert!(!matches("/preview/**", "/blog/preview"));
    }

    #[test]
    fn any_of() {
        let patterns = vec!["/preview/**".to_string(), "/drafts".to_string()];
        assert!(matches_any(&patterns, "/preview/x/"));
        assert!(matches_any(&patterns, "/drafts/"));
        assert!(!matches_any(&patterns, "/blog/post/"));
    }
}
