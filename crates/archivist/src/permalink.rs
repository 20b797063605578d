use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use url::Url;

/// An absolute URL on the site.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize)]
#[serde(transparent)]
pub struct Permalink(Url);

impl Permalink {
    /// Returns the permalink for a directory-style page, which always ends in
    /// a `/`.
    pub fn from_path(base_url: &Url, path: &str) -> Result<Self, url::ParseError> {
        let suffix = if path.ends_with('/') || path.is_empty() {
            ""
        } else {
            "/"
        };

        Self::from_url(base_url, &format!("{path}{suffix}"))
    }

    /// Returns the permalink for `url` exactly as given, relative to the site
    /// root.
    pub fn from_url(base_url: &Url, url: &str) -> Result<Self, url::ParseError> {
        let base_url = base_url.as_str().trim_end_matches('/');
        let path = url.trim_start_matches('/');

        Ok(Self(Url::from_str(&format!("{base_url}/{path}"))?))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }
}

impl fmt::Display for Permalink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strips a trailing `index.html` so the URL names its directory.
///
/// `/2024/01/hello/index.html` becomes `/2024/01/hello/`; any other URL is
/// returned as is.
pub fn pretty_url(url: &str) -> String {
    match url.strip_suffix("/index.html") {
        Some(dir) => format!("{dir}/"),
        None => url.to_string(),
    }
}
