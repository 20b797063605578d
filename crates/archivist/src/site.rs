use std::collections::HashSet;

use derive_more::{Deref, DerefMut};
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{
    LoadConfigError, SiteConfig, DEFAULT_AUTHOR_PAGE_LAYOUT, DEFAULT_CATEGORY_PAGE_LAYOUT,
    DEFAULT_MONTHLY_ARCHIVE_PAGE_LAYOUT, DEFAULT_RSS_PAGE_LAYOUT,
    DEFAULT_SITEMAP_INDEX_PAGE_LAYOUT, DEFAULT_SITEMAP_PAGE_LAYOUT, DEFAULT_TAG_PAGE_LAYOUT,
};
use crate::content::{group_by, sort_newest_first, Post};
use crate::feed::feed_pages;
use crate::pages::{author_pages, category_pages, monthly_archive_pages, tag_pages};
use crate::render::{PageRenderer, VirtualPage};
use crate::routes::{ResolveError, UrlResolver};
use crate::sitemap::sitemap_pages;

/// What the site knows about an author, keyed by the author ID posts use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorData {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// The names of the layouts the host can render.
#[derive(Debug, Default, Clone, Deref, DerefMut, Deserialize)]
#[serde(transparent)]
pub struct Layouts(HashSet<String>);

impl<S: Into<String>> FromIterator<S> for Layouts {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Where the taxonomy generators get their posts from.
pub trait PostSource {
    /// Returns every post, in the host's order.
    fn all_posts(&self) -> &[Post];

    /// Returns the posts filed directly under each category path.
    fn categories(&self) -> IndexMap<&str, Vec<&Post>> {
        group_by(self.all_posts(), |post| {
            post.categories.iter().map(String::as_str)
        })
    }

    /// Returns the posts carrying each tag, newest first.
    fn tags(&self) -> IndexMap<&str, Vec<&Post>> {
        let mut tags = group_by(self.all_posts(), |post| post.unique_tags());
        for posts in tags.values_mut() {
            sort_newest_first(posts);
        }

        tags
    }

    /// Returns the posts written by each author, newest first. Posts without
    /// an author are left out.
    fn authors_posts(&self) -> IndexMap<&str, Vec<&Post>> {
        let mut authors = group_by(self.all_posts(), |post| post.author.as_deref());
        for posts in authors.values_mut() {
            sort_newest_first(posts);
        }

        authors
    }
}

/// Everything a build needs to know about the site.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteContext {
    #[serde(rename = "site")]
    pub config: SiteConfig,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub authors: IndexMap<String, AuthorData>,
    #[serde(default)]
    pub layouts: Layouts,
}

impl SiteContext {
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config,
            posts: Vec::new(),
            authors: IndexMap::new(),
            layouts: Layouts::default(),
        }
    }

    /// Reads a site from TOML: the configuration under `[site]`, plus
    /// optional `layouts`, `[authors.<id>]` tables and `[[posts]]`.
    pub fn from_toml_str(text: &str) -> Result<Self, LoadConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn with_posts(mut self, posts: impl IntoIterator<Item = Post>) -> Self {
        self.posts.extend(posts);
        self
    }

    pub fn with_author(mut self, id: impl Into<String>, author: AuthorData) -> Self {
        self.authors.insert(id.into(), author);
        self
    }

    pub fn with_layouts<S: Into<String>>(mut self, layouts: impl IntoIterator<Item = S>) -> Self {
        self.layouts.extend(layouts.into_iter().map(Into::into));
        self
    }

    pub fn author_data(&self, author: &str) -> Option<&AuthorData> {
        self.authors.get(author)
    }

    pub fn has_layout(&self, layout: &str) -> bool {
        self.layouts.contains(layout)
    }
}

impl PostSource for SiteContext {
    fn all_posts(&self) -> &[Post] {
        &self.posts
    }
}

/// The page generators a build runs, in the order it runs them.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Generator {
    Authors,
    Categories,
    MonthlyArchives,
    Tags,
    Feeds,
    Sitemaps,
}

impl Generator {
    pub const ALL: [Generator; 6] = [
        Generator::Authors,
        Generator::Categories,
        Generator::MonthlyArchives,
        Generator::Tags,
        Generator::Feeds,
        Generator::Sitemaps,
    ];

    /// Returns the layouts that must exist for this generator to run.
    pub fn required_layouts(&self, config: &SiteConfig) -> Vec<String> {
        let layout = |key: &str, default: &str| config.get_or(key, default);

        match self {
            Generator::Authors => vec![layout("author_page_layout", DEFAULT_AUTHOR_PAGE_LAYOUT)],
            Generator::Categories => {
                vec![layout("category_page_layout", DEFAULT_CATEGORY_PAGE_LAYOUT)]
            }
            Generator::MonthlyArchives => vec![layout(
                "monthly_archive_page_layout",
                DEFAULT_MONTHLY_ARCHIVE_PAGE_LAYOUT,
            )],
            Generator::Tags => vec![layout("tag_page_layout", DEFAULT_TAG_PAGE_LAYOUT)],
            Generator::Feeds => vec![layout("rss_page_layout", DEFAULT_RSS_PAGE_LAYOUT)],
            Generator::Sitemaps => vec![
                layout("sitemap_page_layout", DEFAULT_SITEMAP_PAGE_LAYOUT),
                layout(
                    "sitemap_index_page_layout",
                    DEFAULT_SITEMAP_INDEX_PAGE_LAYOUT,
                ),
            ],
        }
    }

    fn generate(
        &self,
        site: &SiteContext,
        resolver: &UrlResolver,
    ) -> Result<Vec<VirtualPage>, GeneratePagesError> {
        let pages = match self {
            Generator::Authors => author_pages(site, resolver)?,
            Generator::Categories => category_pages(site, resolver)?,
            Generator::MonthlyArchives => monthly_archive_pages(site, resolver)?,
            Generator::Tags => tag_pages(site, resolver)?,
            Generator::Feeds => feed_pages(site, resolver)?,
            Generator::Sitemaps => sitemap_pages(site, resolver)?,
        };

        Ok(pages)
    }
}

#[derive(Error, Debug)]
pub enum GeneratePagesError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to render XML")]
    Xml(#[from] std::fmt::Error),
}

/// What a build produced.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// The number of pages each generator that ran handed to the renderer.
    pub generated: IndexMap<Generator, usize>,
    /// Generators skipped because one of their layouts is missing.
    pub skipped: Vec<Generator>,
}

#[derive(Error, Debug)]
pub enum BuildSiteError {
    #[error("failed to generate {generator:?} pages")]
    Generate {
        generator: Generator,
        #[source]
        source: GeneratePagesError,
    },

    #[error("failed to render '{path}': {message}")]
    Render { path: String, message: String },
}

/// Generates every taxonomy page for `site` and hands each to `renderer`.
///
/// Generators whose layouts are missing are skipped. The first error stops
/// the build; pages already rendered stay rendered.
pub fn build_site(
    site: &SiteContext,
    renderer: &impl PageRenderer,
) -> Result<BuildReport, BuildSiteError> {
    let resolver = UrlResolver::new(site);
    let mut report = BuildReport::default();

    for generator in Generator::ALL {
        let missing_layout = generator
            .required_layouts(&site.config)
            .into_iter()
            .find(|layout| !site.has_layout(layout));

        if let Some(layout) = missing_layout {
            info!(?generator, %layout, "layout not found, skipping generator");
            report.skipped.push(generator);
            continue;
        }

        let pages = generator
            .generate(site, &resolver)
            .map_err(|source| BuildSiteError::Generate { generator, source })?;

        for page in &pages {
            renderer
                .render_page(page)
                .map_err(|err| BuildSiteError::Render {
                    path: page.output_path(),
                    message: err.to_string(),
                })?;
        }

        debug!(?generator, pages = pages.len(), "generated pages");
        report.generated.insert(generator, pages.len());
    }

    info!(
        pages = report.generated.values().sum::<usize>(),
        skipped = report.skipped.len(),
        "built taxonomy pages"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, RwLock};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::content::fixtures::*;
    use crate::render::InMemoryRenderer;

    const ALL_LAYOUTS: [&str; 7] = [
        "author_index",
        "category_index",
        "monthly_archive",
        "tag_index",
        "rss",
        "sitemap",
        "sitemap_index",
    ];

    fn make_site() -> SiteContext {
        SiteContext::new(SiteConfig::new("https://blog.example.com".parse().unwrap()))
            .with_author(
                "jane",
                AuthorData {
                    name: "Jane Doe".to_string(),
                    slug: "Jane Doe".to_string(),
                    email: None,
                },
            )
            .with_posts([
                with_author(
                    with_tags(
                        with_categories(make_post("one", "2024-01-15"), &["dev/ruby"]),
                        &["ruby"],
                    ),
                    "jane",
                ),
                with_author(
                    with_tags(make_post("two", "2024-02-01"), &["ruby", "Ruby On Rails"]),
                    "jane",
                ),
            ])
    }

    #[test]
    fn test_tags_are_newest_first() {
        let site = make_site();

        let tags = site.tags();

        assert_eq!(tags.keys().copied().collect::<Vec<_>>(), vec!["ruby", "Ruby On Rails"]);
        assert_eq!(
            tags["ruby"].iter().map(|post| post.id.0.as_str()).collect::<Vec<_>>(),
            vec!["two", "one"]
        );
    }

    #[test]
    fn test_author_posts_skip_anonymous_posts() {
        let site = make_site().with_posts([make_post("anonymous", "2024-03-01")]);

        let authors = site.authors_posts();

        assert_eq!(authors.keys().copied().collect::<Vec<_>>(), vec!["jane"]);
        assert_eq!(authors["jane"].len(), 2);
    }

    #[test]
    fn test_build_site_without_layouts_skips_everything() {
        let site = make_site();
        let storage = Arc::new(RwLock::new(HashMap::new()));

        let report = build_site(&site, &InMemoryRenderer::new(storage.clone())).unwrap();

        assert_eq!(report.skipped, Generator::ALL.to_vec());
        assert!(report.generated.is_empty());
        assert!(storage.read().unwrap().is_empty());
    }

    #[test]
    fn test_build_site() {
        let site = make_site().with_layouts(ALL_LAYOUTS);
        let storage = Arc::new(RwLock::new(HashMap::new()));

        let report = build_site(&site, &InMemoryRenderer::new(storage.clone())).unwrap();

        assert!(report.skipped.is_empty());
        assert_eq!(
            report.generated.into_iter().collect::<HashMap<_, _>>(),
            HashMap::from_iter([
                (Generator::Authors, 1),
                (Generator::Categories, 2),
                (Generator::MonthlyArchives, 2),
                (Generator::Tags, 2),
                (Generator::Feeds, 2),
                (Generator::Sitemaps, 5),
            ])
        );

        let storage = storage.read().unwrap();
        for path in [
            "/author/jane-doe/index.html",
            "/category/dev/index.html",
            "/category/dev/ruby/index.html",
            "/2024/01/index.html",
            "/2024/02/index.html",
            "/tag/ruby/index.html",
            "/tag/ruby-on-rails/index.html",
            "/feed/index.html",
            "/feed/jane-doe/index.html",
            "/sitemap/authors.xml",
            "/sitemap/categories.xml",
            "/sitemap/posts.xml",
            "/sitemap/tags.xml",
            "/sitemap/index.xml",
        ] {
            assert!(storage.contains_key(path), "missing {path}");
        }
        assert_eq!(storage.len(), 14);
    }

    #[test]
    fn test_build_site_skips_only_generators_missing_layouts() {
        let site = make_site().with_layouts(["tag_index", "sitemap"]);
        let storage = Arc::new(RwLock::new(HashMap::new()));

        let report = build_site(&site, &InMemoryRenderer::new(storage)).unwrap();

        assert_eq!(
            report.generated.keys().copied().collect::<Vec<_>>(),
            vec![Generator::Tags]
        );
        assert_eq!(
            report.skipped,
            vec![
                Generator::Authors,
                Generator::Categories,
                Generator::MonthlyArchives,
                Generator::Feeds,
                Generator::Sitemaps,
            ]
        );
    }

    #[test]
    fn test_build_site_fails_on_unknown_author() {
        let site = make_site()
            .with_posts([with_author(make_post("ghost", "2024-01-01"), "nobody")])
            .with_layouts(ALL_LAYOUTS);
        let storage = Arc::new(RwLock::new(HashMap::new()));

        let result = build_site(&site, &InMemoryRenderer::new(storage));

        assert!(matches!(
            result,
            Err(BuildSiteError::Generate {
                generator: Generator::Authors,
                source: GeneratePagesError::Resolve(ResolveError::MissingData { .. }),
            })
        ));
    }
}
