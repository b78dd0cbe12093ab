use url::Url;

/// Returns the reason a raw match is not a usable candidate, if any.
pub fn rejection<'a>(raw: &str, blocked_domains: &'a [String]) -> Option<Rejection<'a>> {
    if !raw.starts_with("http") {
        return Some(Rejection::NotHttp);
    }

    let Ok(url) = Url::parse(raw) else {
        return Some(Rejection::Unparseable);
    };
    let Some(host) = url.host_str() else {
        return Some(Rejection::Unparseable);
    };

    blocked_domains
        .iter()
        .find(|domain| host.contains(domain.as_str()))
        .map(|domain| Rejection::BlockedDomain(domain.as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection<'a> {
    NotHttp,
    Unparseable,
    BlockedDomain(&'a str),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked() -> Vec<String> {
        vec!["gstatic.com".to_string(), "google.com".to_string()]
    }

    #[test]
    fn test_accept_content_host() {
        assert_eq!(rejection("https://img.example.org/a.jpg", &blocked()), None);
    }

    #[test]
    fn test_reject_search_engine_hosts() {
        let blocked = blocked();
        assert_eq!(
            rejection("https://encrypted-tbn0.gstatic.com/images.jpg", &blocked),
            Some(Rejection::BlockedDomain("gstatic.com"))
        );
        assert_eq!(
            rejection("https://www.google.com/logos/doodle.png", &blocked),
            Some(Rejection::BlockedDomain("google.com"))
        );
    }

    #[test]
    fn test_blocked_name_in_path_is_fine() {
        assert_eq!(
            rejection("https://cdn.example/google.com/logo.png", &blocked()),
            None
        );
    }

    #[test]
    fn test_reject_non_http() {
        assert_eq!(rejection("ftp://a/x.jpg", &blocked()), Some(Rejection::NotHttp));
        assert_eq!(rejection("http://", &blocked()), Some(Rejection::Unparseable));
    }
}
