use crate::config::AnalyticsOptions;
use crate::pattern;

const LOADER: &str = "(function(i,s,o,g,r,a,m){i['GoogleAnalyticsObject']=r;i[r]=i[r]||function(){(i[r].q=i[r].q||[]).push(arguments)},i[r].l=1*new Date();a=s.createElement(o),m=s.getElementsByTagName(o)[0];a.async=1;a.src=g;m.parentNode.insertBefore(a,m)})(window,document,'script','https://www.google-analytics.com/analytics.js','ga');";

/// Pages matching an exclude pattern get no tracking snippet at all, so no
/// pageview hit can ever fire from them.
pub fn applies_to(options: &AnalyticsOptions, page_url: &str) -> bool {
    !pattern::matches_any(&options.exclude, page_url)
}

/// The tracking snippet, or `None` when no tracking id is configured.
pub fn snippet(options: &AnalyticsOptions) -> Option<String> {
    let tracking_id = options.tracking_id.as_deref()?;

    let mut calls = format!(
        "ga('create', '{}', 'auto', {{sampleRate: {}, siteSpeedSampleRate: {}}});\n",
        tracking_id, options.sample_rate, options.site_speed_sample_rate
    );
    if options.anonymize {
        calls.push_str("ga('set', 'anonymizeIp', true);\n");
    }
    calls.push_str("ga('send', 'pageview');\n");

    let body = if options.respect_dnt {
        format!(
            "if (!(navigator.doNotTrack == '1' || window.doNotTrack == '1')) {{\n{}\n{}}}\n",
            LOADER, calls
        )
    } else {
        format!("{}\n{}", LOADER, calls)
    };

    Some(format!("<script>\n{}</script>\n", body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> AnalyticsOptions {
        AnalyticsOptions {
            tracking_id: Some("UA-000000000-1".to_string()),
            head: true,
            anonymize: true,
            respect_dnt: true,
            exclude: vec!["/preview/**".to_string()],
            sample_rate: 100,
            site_speed_sample_rate: 10,
        }
    }

    #[test]
    fn no_tracking_id_means_no_snippet() {
        assert!(snippet(&AnalyticsOptions::default()).is_none());
    }

    #[test]
    fn snippet_carries_the_configured_knobs() {
        let html = snippet(&options()).unwrap();
        assert!(html.contains("UA-000000000-1"));
        assert!(html.contains("anonymizeIp"));
        assert!(html.contains("doNotTrack"));
        assert!(html.contains("sampleRate: 100"));
        assert!(html.contains("siteSpeedSampleRate: 10"));
    }

    #[test]
    fn dnt_guard_is_opt_in() {
        let mut opts = options();
        opts.respect_dnt = false;
        let html = snippet(&opts).unwrap();
        assert!(!html.contains("doNotTrack"));
    }

    #[test]
    fn excluded_pages_are_skipped() {
        let opts = options();
        assert!(applies_to(&opts, "/blog/some-post/"));
        assert!(!applies_to(&opts, "/preview/draft/"));
    }
}
