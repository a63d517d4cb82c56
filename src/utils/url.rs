// src/utils/url.rs

//! URL identifier derivation.

/// Derive the stable blob-namespace token for a monitored URL.
///
/// Takes the last non-empty path segment; a URL that fails to parse falls
/// back to plain string splitting, and `"unknown"` is the final fallback.
/// Test runs get a `-test` suffix so they never touch production state.
///
/// # Examples
/// ```
/// use schedule_notify::utils::url::url_identifier;
///
/// assert_eq!(
///     url_identifier("https://www.example.net/team12u", false),
///     "team12u"
/// );
/// assert_eq!(
///     url_identifier("https://www.example.net/team12u/", true),
///     "team12u-test"
/// );
/// ```
pub fn url_identifier(url_str: &str, is_test: bool) -> String {
    let identifier = match url::Url::parse(url_str) {
        Ok(parsed) => last_non_empty_segment(parsed.path()),
        Err(_) => last_non_empty_segment(url_str.trim_end_matches('/')),
    };

    if is_test {
        format!("{identifier}-test")
    } else {
        identifier
    }
}

fn last_non_empty_segment(path: &str) -> String {
    path.split('/')
        .rev()
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_path_segment() {
        assert_eq!(
            url_identifier("https://www.example.net/teams/team12u", false),
            "team12u"
        );
    }

    #[test]
    fn test_trailing_slash_ignored() {
        assert_eq!(
            url_identifier("https://www.example.net/team12u/", false),
            url_identifier("https://www.example.net/team12u", false)
        );
    }

    #[test]
    fn test_unparseable_url_falls_back_to_splitting() {
        assert_eq!(url_identifier("not a url/team12u", false), "team12u");
    }

    #[test]
    fn test_bare_domain_is_unknown() {
        assert_eq!(url_identifier("https://www.example.net", false), "unknown");
        assert_eq!(url_identifier("https://www.example.net/", false), "unknown");
    }

    #[test]
    fn test_test_suffix_appended_once() {
        assert_eq!(
            url_identifier("https://www.example.net/team12u", true),
            "team12u-test"
        );
    }

    #[test]
    fn test_pure_function() {
        let url = "https://www.example.net/team12u";
        assert_eq!(url_identifier(url, false), url_identifier(url, false));
    }
}
