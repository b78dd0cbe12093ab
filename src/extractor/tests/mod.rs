use std::fs;

use crate::config::Config;
use crate::extractor::UrlExtractor;

fn extractor() -> UrlExtractor {
    UrlExtractor::from_config(&Config::new(["test"]))
}

#[test]
fn test_dedup_and_blocked_domain() {
    let html = r#"<div data-x="http://a/x.jpg"></div> http://a/x.jpg <img src=http://gstatic.com/y.png>"#;

    let candidates = extractor().extract(html);

    assert_eq!(candidates, vec!["http://a/x.jpg"]);
}

#[test]
fn test_no_matches_is_empty() {
    assert!(extractor().extract("<html><body>nothing here</body></html>").is_empty());
    assert!(extractor().extract("").is_empty());
}

#[test]
fn test_quoted_matches_come_first() {
    let html = r#"bare http://one.example/1.png then "http://two.example/2.jpg""#;

    let candidates = extractor().extract(html);

    assert_eq!(
        candidates,
        vec!["http://two.example/2.jpg", "http://one.example/1.png"]
    );
}

#[test]
fn test_lazy_match_stops_at_first_extension() {
    let html = "see http://a.example/x.jpg.png and http://b.example/y.jpeg";

    let candidates = extractor().extract(html);

    assert_eq!(
        candidates,
        vec!["http://a.example/x.jpg", "http://b.example/y.jpeg"]
    );
}

#[test]
fn test_unsupported_extensions_ignored() {
    let html = r#""http://a.example/x.gif" "http://a.example/y.webp" "http://a.example/z.JPG""#;
    assert!(extractor().extract(html).is_empty());
}

#[test]
fn test_extract_search_results_page() {
    let html = fs::read_to_string("src/extractor/tests/fixtures/search_results.html")
        .expect("Failed to read test fixture");

    let candidates = extractor().extract(&html);

    assert_eq!(
        candidates,
        vec![
            "https://cdn.pets.example/cats/tabby.jpg",
            "https://photos.example.kr/2021/05/portrait.jpeg",
            "https://blog.example.com/wp-content/uploads/kitten.png",
            "https://static.example.org/banner.png",
        ]
    );
}

#[test]
fn test_custom_blocklist() {
    let extractor = UrlExtractor::new(["example.org"]);
    let html = r#""http://a.example.org/x.jpg" "http://b.example.net/y.jpg""#;

    assert_eq!(extractor.extract(html), vec!["http://b.example.net/y.jpg"]);
}

#[test]
fn test_blocklist_from_config_replaces_defaults() {
    let config = Config::new(["test"]).with_blocked_domains(["example.org"]);
    let html = r#""http://a.example.org/x.jpg" "http://www.google.com/logo.png""#;

    assert_eq!(
        UrlExtractor::from_config(&config).extract(html),
        vec!["http://www.google.com/logo.png"]
    );
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><title>Broken<body><p \"http://a.example/x.png <div>\"";

    let candidates = extractor().extract(html);

    assert_eq!(candidates, vec!["http://a.example/x.png"]);
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let _ = extractor().extract(&html);
        }

        #[test]
        fn test_candidates_are_unique_and_absolute(
            parts in proptest::collection::vec("(\"?https?://[a-z]{1,8}\\.(com|org)/[a-z]{0,6}\\.(jpg|png)\"? ?)|([a-z <>]{0,10})", 0..20)
        ) {
            let html = parts.concat();
            let candidates = extractor().extract(&html);
            let mut seen = std::collections::HashSet::new();
            for c in &candidates {
                prop_assert!(c.as_str().starts_with("http"));
                prop_assert!(seen.insert(c.as_str().to_string()));
            }
        }
    }
}
