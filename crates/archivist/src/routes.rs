use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::config::{
    DEFAULT_AUTHOR_DIR, DEFAULT_CATEGORY_DIR, DEFAULT_MONTHLY_ARCHIVE_DIR, DEFAULT_RSS_DIR,
    DEFAULT_SITEMAP_DIR, DEFAULT_TAG_DIR,
};
use crate::content::{category_lineage, YearMonth};
use crate::permalink::Permalink;
use crate::site::SiteContext;

/// A page the resolver knows how to place.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Route<'a> {
    /// An author's archive, by author ID.
    Author(&'a str),
    /// A category's archive, by category path.
    Category(&'a str),
    Tag(&'a str),
    Archive(YearMonth),
    /// A feed, by name. The site-wide feed has an empty name.
    Rss(&'a str),
    /// A sitemap file, by name, without its extension.
    Sitemap(&'a str),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DataKind {
    Author,
    Category,
    Tag,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::Author => write!(f, "author"),
            DataKind::Category => write!(f, "category"),
            DataKind::Tag => write!(f, "tag"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no {kind} '{key}' found in the site data")]
    MissingData { kind: DataKind, key: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();

fn whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX
        .get_or_init(|| Regex::new(r"\s+").expect("failed to compile regex for whitespace"))
}

/// Turns a taxonomy key into a URL segment: lower-cased, with every run of
/// whitespace replaced by a `-`.
pub fn sanitize_key(key: &str) -> String {
    whitespace_regex()
        .replace_all(&key.to_lowercase(), "-")
        .into_owned()
}

/// Returns the groups of distinct keys that sanitize to the same URL segment.
///
/// Pages for the keys in a group share a directory, so the last one rendered
/// replaces the others.
pub fn colliding_keys<'k>(keys: impl IntoIterator<Item = &'k str>) -> Vec<Vec<&'k str>> {
    let mut keys = keys.into_iter().collect::<Vec<_>>();
    keys.sort_unstable();
    keys.dedup();

    let mut by_segment: IndexMap<String, Vec<&str>> = IndexMap::new();
    for key in keys {
        by_segment.entry(sanitize_key(key)).or_default().push(key);
    }

    by_segment
        .into_values()
        .filter(|keys| keys.len() > 1)
        .collect()
}

/// Joins two path parts with exactly one `/` between them.
pub fn join_path(dir: &str, segment: &str) -> String {
    if segment.is_empty() {
        return dir.to_string();
    }

    format!(
        "{}/{}",
        dir.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}

/// Maps taxonomy keys to the root-relative paths of their pages.
pub struct UrlResolver<'a> {
    site: &'a SiteContext,
    categories: HashSet<&'a str>,
    tags: HashSet<&'a str>,
}

impl<'a> UrlResolver<'a> {
    pub fn new(site: &'a SiteContext) -> Self {
        let categories: HashSet<&str> = site
            .posts
            .iter()
            .flat_map(|post| post.categories.iter())
            .flat_map(|category| category_lineage(category))
            .collect();
        let tags: HashSet<&str> = site
            .posts
            .iter()
            .flat_map(|post| post.tags.iter().map(String::as_str))
            .collect();

        for (kind, keys) in [(DataKind::Category, &categories), (DataKind::Tag, &tags)] {
            for keys in colliding_keys(keys.iter().copied()) {
                warn!(%kind, ?keys, "keys share a page, only the last one rendered is kept");
            }
        }

        Self {
            site,
            categories,
            tags,
        }
    }

    fn dir(&self, key: &str, default: &str) -> String {
        self.site.config.get_or(key, default)
    }

    /// Returns the root-relative path of the page for `route`.
    pub fn resolve(&self, route: Route) -> Result<String, ResolveError> {
        let path = match route {
            Route::Author(id) => {
                let author =
                    self.site
                        .author_data(id)
                        .ok_or_else(|| ResolveError::MissingData {
                            kind: DataKind::Author,
                            key: id.to_string(),
                        })?;

                join_path(
                    &self.dir("author_dir", DEFAULT_AUTHOR_DIR),
                    &sanitize_key(&author.slug),
                )
            }
            Route::Category(category) => {
                let category = category.trim_matches('/');
                if !self.categories.contains(category) {
                    return Err(ResolveError::MissingData {
                        kind: DataKind::Category,
                        key: category.to_string(),
                    });
                }

                join_path(
                    &self.dir("category_dir", DEFAULT_CATEGORY_DIR),
                    &sanitize_key(category),
                )
            }
            Route::Tag(tag) => {
                if !self.tags.contains(tag) {
                    return Err(ResolveError::MissingData {
                        kind: DataKind::Tag,
                        key: tag.to_string(),
                    });
                }

                join_path(&self.dir("tag_dir", DEFAULT_TAG_DIR), &sanitize_key(tag))
            }
            Route::Archive(month) => self
                .dir("monthly_archive_dir", DEFAULT_MONTHLY_ARCHIVE_DIR)
                .replace("%Y", &format!("{:04}", month.year()))
                .replace("%m", &format!("{:02}", month.month())),
            Route::Rss(name) => {
                join_path(&self.dir("rss_dir", DEFAULT_RSS_DIR), &sanitize_key(name))
            }
            Route::Sitemap(name) => join_path(
                &self.dir("sitemap_dir", DEFAULT_SITEMAP_DIR),
                &format!("{name}.xml"),
            ),
        };

        Ok(path)
    }

    /// Returns the absolute URL of the page for `route`.
    ///
    /// Directory-style routes end in a `/`; sitemap files do not.
    pub fn permalink(&self, route: Route) -> Result<Permalink, ResolveError> {
        let path = self.resolve(route)?;
        let base_url = &self.site.config.base_url;

        let permalink = match route {
            Route::Sitemap(_) => Permalink::from_url(base_url, &path)?,
            _ => Permalink::from_path(base_url, &path)?,
        };

        Ok(permalink)
    }
}
