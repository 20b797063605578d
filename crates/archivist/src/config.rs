use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_AUTHOR_DIR: &str = "/author";
pub const DEFAULT_CATEGORY_DIR: &str = "/category";
pub const DEFAULT_TAG_DIR: &str = "/tag";
pub const DEFAULT_MONTHLY_ARCHIVE_DIR: &str = "/%Y/%m";
pub const DEFAULT_RSS_DIR: &str = "/feed";
pub const DEFAULT_SITEMAP_DIR: &str = "/sitemap";

pub const DEFAULT_AUTHOR_TITLE_PREFIX: &str = "Author: ";
pub const DEFAULT_CATEGORY_TITLE_PREFIX: &str = "Category: ";
pub const DEFAULT_TAG_TITLE_PREFIX: &str = "Tagged: ";
pub const DEFAULT_MONTHLY_ARCHIVE_TITLE_PREFIX: &str = "Monthly Archive:&nbsp;";

// Layouts each page generator renders with, unless overridden.
pub const DEFAULT_AUTHOR_PAGE_LAYOUT: &str = "author_index";
pub const DEFAULT_CATEGORY_PAGE_LAYOUT: &str = "category_index";
pub const DEFAULT_MONTHLY_ARCHIVE_PAGE_LAYOUT: &str = "monthly_archive";
pub const DEFAULT_TAG_PAGE_LAYOUT: &str = "tag_index";
pub const DEFAULT_RSS_PAGE_LAYOUT: &str = "rss";
pub const DEFAULT_SITEMAP_PAGE_LAYOUT: &str = "sitemap";
pub const DEFAULT_SITEMAP_INDEX_PAGE_LAYOUT: &str = "sitemap_index";

#[derive(Error, Debug)]
pub enum LoadConfigError {
    #[error("invalid site configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// The site-wide settings the taxonomy generators read.
///
/// Every directory, title prefix and layout name is optional and falls back
/// to the theme's default.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// The absolute URL the site is served from.
    #[serde(alias = "url")]
    pub base_url: Url,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub copyright: Option<String>,

    pub author_dir: Option<String>,
    pub category_dir: Option<String>,
    pub tag_dir: Option<String>,
    pub monthly_archive_dir: Option<String>,
    pub rss_dir: Option<String>,
    pub sitemap_dir: Option<String>,

    /// The maximum number of items in a feed. Unlimited when unset.
    pub rss_item_limit: Option<usize>,

    pub author_title_prefix: Option<String>,
    pub category_title_prefix: Option<String>,
    pub tag_title_prefix: Option<String>,
    pub monthly_archive_title_prefix: Option<String>,

    pub author_page_layout: Option<String>,
    pub category_page_layout: Option<String>,
    pub monthly_archive_page_layout: Option<String>,
    pub tag_page_layout: Option<String>,
    pub rss_page_layout: Option<String>,
    pub sitemap_page_layout: Option<String>,
    pub sitemap_index_page_layout: Option<String>,
}

impl SiteConfig {
    /// Returns a configuration with every setting at its default.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            title: None,
            description: None,
            author: None,
            copyright: None,
            author_dir: None,
            category_dir: None,
            tag_dir: None,
            monthly_archive_dir: None,
            rss_dir: None,
            sitemap_dir: None,
            rss_item_limit: None,
            author_title_prefix: None,
            category_title_prefix: None,
            tag_title_prefix: None,
            monthly_archive_title_prefix: None,
            author_page_layout: None,
            category_page_layout: None,
            monthly_archive_page_layout: None,
            tag_page_layout: None,
            rss_page_layout: None,
            sitemap_page_layout: None,
            sitemap_index_page_layout: None,
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, LoadConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Looks up a setting by its configuration key.
    ///
    /// Defaults are not applied here: an unset key yields `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "url" | "base_url" => return Some(self.base_url.to_string()),
            "rss_item_limit" => return self.rss_item_limit.map(|limit| limit.to_string()),
            "title" => &self.title,
            "description" => &self.description,
            "author" => &self.author,
            "copyright" => &self.copyright,
            "author_dir" => &self.author_dir,
            "category_dir" => &self.category_dir,
            "tag_dir" => &self.tag_dir,
            "monthly_archive_dir" => &self.monthly_archive_dir,
            "rss_dir" => &self.rss_dir,
            "sitemap_dir" => &self.sitemap_dir,
            "author_title_prefix" => &self.author_title_prefix,
            "category_title_prefix" => &self.category_title_prefix,
            "tag_title_prefix" => &self.tag_title_prefix,
            "monthly_archive_title_prefix" => &self.monthly_archive_title_prefix,
            "author_page_layout" => &self.author_page_layout,
            "category_page_layout" => &self.category_page_layout,
            "monthly_archive_page_layout" => &self.monthly_archive_page_layout,
            "tag_page_layout" => &self.tag_page_layout,
            "rss_page_layout" => &self.rss_page_layout,
            "sitemap_page_layout" => &self.sitemap_page_layout,
            "sitemap_index_page_layout" => &self.sitemap_index_page_layout,
            _ => return None,
        };

        value.clone()
    }

    /// Returns the value for `key`, or `default` when it is unset.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_from_toml_str() {
        let config = SiteConfig::from_toml_str(indoc! {r#"
            url = "https://blog.example.com"
            title = "Example"
            tag_dir = "/tags"
            rss_item_limit = 10
        "#})
        .unwrap();

        assert_eq!(config.base_url.as_str(), "https://blog.example.com/");
        assert_eq!(config.get("title"), Some("Example".to_string()));
        assert_eq!(config.get("tag_dir"), Some("/tags".to_string()));
        assert_eq!(config.get("rss_item_limit"), Some("10".to_string()));
        assert_eq!(config.get("category_dir"), None);
        assert_eq!(config.get("no_such_key"), None);
    }

    #[test]
    fn test_get_or_falls_back_to_default() {
        let config = SiteConfig::new("https://example.com".parse().unwrap());

        assert_eq!(config.get_or("rss_dir", DEFAULT_RSS_DIR), "/feed");
        assert_eq!(
            config.get_or("monthly_archive_dir", DEFAULT_MONTHLY_ARCHIVE_DIR),
            "/%Y/%m"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = SiteConfig::from_toml_str(r#"url = "not a url""#);

        assert!(matches!(result, Err(LoadConfigError::Toml(_))));
    }
}
