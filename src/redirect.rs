use serde::Deserialize;
use url::Url;

/// Query parameters carrying a post-login destination.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RedirectQuery {
    pub redirect: Option<String>,
}

/// Picks where to send the user after login.
///
/// Relative targets are used verbatim. Absolute `http(s)://` targets are only
/// honoured when their host is on the configured allow-list; everything else
/// (external URLs, protocol-relative `//host`, other schemes) falls back to
/// the default path.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    default_path: String,
    allowed_hosts: Vec<String>,
}

impl RedirectResolver {
    #[must_use]
    pub fn new(default_path: impl Into<String>) -> Self {
        Self {
            default_path: default_path.into(),
            allowed_hosts: Vec::new(),
        }
    }

    /// Allow absolute redirects to these hosts (exact, case-insensitive match).
    #[must_use]
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts
            .into_iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn default_path(&self) -> &str {
        &self.default_path
    }

    #[must_use]
    pub fn resolve(&self, redirect: Option<&str>) -> String {
        match redirect {
            Some(target) if self.is_acceptable(target) => target.to_string(),
            Some(target) => {
                tracing::warn!(target = ?target, "Rejected redirect target");
                self.default_path.clone()
            }
            None => self.default_path.clone(),
        }
    }

    #[must_use]
    pub fn resolve_query(&self, query: &RedirectQuery) -> String {
        self.resolve(query.redirect.as_deref())
    }

    fn is_acceptable(&self, target: &str) -> bool {
        // Browsers drop tab and newline while parsing, so `/\t/host` becomes `//host`.
        if target.trim().is_empty() || target.chars().any(char::is_control) {
            return false;
        }
        if is_external_url(target) {
            return self.is_allowed_external(target);
        }
        !is_protocol_relative(target) && !has_scheme(target)
    }

    fn is_allowed_external(&self, target: &str) -> bool {
        if self.allowed_hosts.is_empty() {
            return false;
        }
        let Ok(url) = Url::parse(target) else {
            return false;
        };
        url.host_str()
            .is_some_and(|host| self.allowed_hosts.iter().any(|h| h == &host.to_ascii_lowercase()))
    }
}

/// `true` for `http://…` / `https://…` (any case).
#[must_use]
pub fn is_external_url(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn is_protocol_relative(value: &str) -> bool {
    let v = value.trim_start();
    v.starts_with("//") || v.starts_with("/\\") || v.starts_with('\\')
}

fn has_scheme(value: &str) -> bool {
    let v = value.trim_start();
    let Some(colon) = v.find(':') else {
        return false;
    };
    let head = &v[..colon];
    !head.is_empty()
        && head.starts_with(|c: char| c.is_ascii_alphabetic())
        && head
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> RedirectResolver {
        RedirectResolver::new("/summary")
    }

    #[test]
    fn test_relative_path_used_verbatim() {
        assert_eq!(resolver().resolve(Some("/details")), "/details");
        assert_eq!(
            resolver().resolve(Some("/details?month=2024-05")),
            "/details?month=2024-05"
        );
    }

    #[test]
    fn test_missing_or_blank_uses_default() {
        assert_eq!(resolver().resolve(None), "/summary");
        assert_eq!(resolver().resolve(Some("")), "/summary");
        assert_eq!(resolver().resolve(Some("   ")), "/summary");
    }

    #[test]
    fn test_external_url_blocked() {
        for target in [
            "https://evil.example",
            "http://evil.example/path",
            "HTTPS://EVIL.EXAMPLE",
            "//evil.example",
            "/\\evil.example",
            "javascript:alert(1)",
        ] {
            assert_eq!(resolver().resolve(Some(target)), "/summary", "{target}");
        }
    }

    #[test]
    fn test_control_characters_rejected() {
        let resolver = resolver().with_allowed_hosts(vec!["reports.example.com".into()]);
        for target in [
            "/\t/evil.example",
            "/\n/evil.example",
            "/\r\n/evil.example",
            "/a\r\nX-Injected: 1",
            "/details\0",
            "https://reports.example.com/\tmay",
        ] {
            assert_eq!(resolver.resolve(Some(target)), "/summary", "{target:?}");
        }
    }

    #[test]
    fn test_allow_list_widens_external_targets() {
        let resolver = resolver().with_allowed_hosts(vec!["Reports.Example.com".into()]);
        assert_eq!(
            resolver.resolve(Some("https://reports.example.com/monthly")),
            "https://reports.example.com/monthly"
        );
        assert_eq!(
            resolver.resolve(Some("https://reports.example.com.evil.example/")),
            "/summary"
        );
        assert_eq!(resolver.resolve(Some("https://evil.example")), "/summary");
    }

    #[test]
    fn test_is_external_url() {
        assert!(is_external_url("https://a.b"));
        assert!(is_external_url("Http://a.b"));
        assert!(!is_external_url("/https://a.b"));
        assert!(!is_external_url("summary"));
    }

    #[test]
    fn test_resolve_query() {
        let query = RedirectQuery {
            redirect: Some("/memo".into()),
        };
        assert_eq!(resolver().resolve_query(&query), "/memo");
        assert_eq!(resolver().resolve_query(&RedirectQuery::default()), "/summary");
    }
}
