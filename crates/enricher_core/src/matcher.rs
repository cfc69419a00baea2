use url::{Host, Url};

/// Recognizes trigger links of the shape
/// `http(s)://[www.]<domain>/<resource_segment>/<digits>[/anything]`.
///
/// Scheme, host and resource segment compare case-insensitively. A query or
/// fragment after the identifier is accepted. The path is checked as typed,
/// before any dot-segment or slash normalization, and surrounding whitespace
/// is a mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptancePattern {
    domain: String,
    resource_segment: String,
}

impl Default for AcceptancePattern {
    fn default() -> Self {
        Self::new("myfigurecollection.net", "item")
    }
}

impl AcceptancePattern {
    pub fn new(domain: impl Into<String>, resource_segment: impl Into<String>) -> Self {
        Self {
            domain: domain.into().trim().trim_matches('.').to_ascii_lowercase(),
            resource_segment: resource_segment.into().trim().trim_matches('/').to_string(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn resource_segment(&self) -> &str {
        &self.resource_segment
    }

    /// Returns true when `value` is an acceptable trigger link. Never fails;
    /// anything unparsable is simply not a match.
    pub fn matches(&self, value: &str) -> bool {
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return false;
        }
        let Ok(parsed) = Url::parse(value) else {
            return false;
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }
        if !parsed.username().is_empty() || parsed.password().is_some() || parsed.port().is_some()
        {
            return false;
        }
        if !self.host_matches(&parsed) {
            return false;
        }
        raw_path(value).is_some_and(|path| self.path_matches(path))
    }

    fn host_matches(&self, parsed: &Url) -> bool {
        let Some(Host::Domain(host)) = parsed.host() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        host == self.domain || host.strip_prefix("www.") == Some(self.domain.as_str())
    }

    fn path_matches(&self, path: &str) -> bool {
        let Some(path) = path.strip_prefix('/') else {
            return false;
        };
        let mut segments = path.splitn(3, '/');
        let Some(resource) = segments.next() else {
            return false;
        };
        if !resource.eq_ignore_ascii_case(&self.resource_segment) {
            return false;
        }
        match segments.next() {
            Some(id) => !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()),
            None => false,
        }
    }
}

/// The path exactly as written: after the authority, before `?` or `#`.
fn raw_path(value: &str) -> Option<&str> {
    let (_, rest) = value.split_once("://")?;
    let path = &rest[rest.find(['/', '?', '#'])?..];
    let end = path.find(['?', '#']).unwrap_or(path.len());
    Some(&path[..end])
}
