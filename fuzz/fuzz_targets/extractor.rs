#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use reqwest::StatusCode;
use url::Url;

use gleaner::extractor::UrlExtractor;
use gleaner::fetcher::pipeline::process_search_response;

fuzz_target!(|data: &[u8]| {
    let page = process_search_response(
        Url::parse("https://www.google.com/search?q=fuzz").unwrap(),
        StatusCode::OK,
        Bytes::copy_from_slice(data),
        "text/html",
    );

    let extractor = UrlExtractor::new(["gstatic.com", "google.com"]);
    for url in extractor.extract(&page.body_utf8) {
        assert!(url.as_str().starts_with("http"));
    }
});
