use serde::Serialize;
use serde_json::json;
use tracing::trace;

use crate::config::{
    DEFAULT_SITEMAP_DIR, DEFAULT_SITEMAP_INDEX_PAGE_LAYOUT, DEFAULT_SITEMAP_PAGE_LAYOUT,
};
use crate::content::{hierarchify_categories, Post};
use crate::date::{format_w3c, Timestamp};
use crate::permalink::{pretty_url, Permalink};
use crate::render::VirtualPage;
use crate::routes::{ResolveError, Route, UrlResolver};
use crate::site::{GeneratePagesError, PostSource, SiteContext};
use crate::xml::{render_document, XmlElement};

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// The priority every taxonomy page gets.
pub const DEFAULT_PRIORITY: f64 = 0.7;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct SitemapEntry {
    pub location: Permalink,
    pub last_modified: Option<Timestamp>,
    pub change_frequency: Option<ChangeFrequency>,
    pub priority: Option<f64>,
}

impl SitemapEntry {
    /// Returns an entry for a taxonomy page.
    pub fn page(location: Permalink, last_modified: Timestamp) -> Self {
        Self {
            location,
            last_modified: Some(last_modified),
            change_frequency: Some(ChangeFrequency::Monthly),
            priority: Some(DEFAULT_PRIORITY),
        }
    }

    /// Returns an entry for a sitemap listed in the sitemap index.
    pub fn sitemap(location: Permalink, last_modified: Option<Timestamp>) -> Self {
        Self {
            location,
            last_modified,
            change_frequency: None,
            priority: None,
        }
    }
}

/// The taxonomies that get their own sitemap.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Taxonomy {
    Authors,
    Categories,
    Posts,
    Tags,
}

/// The sitemap entries of one taxonomy.
#[derive(Debug, PartialEq, Clone)]
pub struct TaxonomySitemap {
    pub taxonomy: Taxonomy,
    pub entries: Vec<SitemapEntry>,
    /// The latest of the buckets' earliest post dates. `None` when the
    /// taxonomy has no posts.
    pub last_modified: Option<Timestamp>,
}

impl Taxonomy {
    pub const ALL: [Taxonomy; 4] = [
        Taxonomy::Authors,
        Taxonomy::Categories,
        Taxonomy::Posts,
        Taxonomy::Tags,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Taxonomy::Authors => "authors",
            Taxonomy::Categories => "categories",
            Taxonomy::Posts => "posts",
            Taxonomy::Tags => "tags",
        }
    }

    /// Returns each of the taxonomy's pages along with the posts it lists.
    fn buckets<'a>(
        &self,
        site: &'a SiteContext,
        resolver: &UrlResolver,
    ) -> Result<Vec<(Permalink, Vec<&'a Post>)>, ResolveError> {
        match self {
            Taxonomy::Authors => site
                .authors_posts()
                .into_iter()
                .map(|(author, posts)| Ok((resolver.permalink(Route::Author(author))?, posts)))
                .collect(),
            Taxonomy::Categories => hierarchify_categories(&site.categories())
                .into_iter()
                .map(|(category, posts)| {
                    Ok((resolver.permalink(Route::Category(&category))?, posts))
                })
                .collect(),
            Taxonomy::Posts => site
                .all_posts()
                .iter()
                .map(|post| {
                    let location =
                        Permalink::from_url(&site.config.base_url, &pretty_url(&post.url))?;

                    Ok((location, vec![post]))
                })
                .collect(),
            Taxonomy::Tags => site
                .tags()
                .into_iter()
                .map(|(tag, posts)| Ok((resolver.permalink(Route::Tag(tag))?, posts)))
                .collect(),
        }
    }

    pub fn sitemap(
        &self,
        site: &SiteContext,
        resolver: &UrlResolver,
    ) -> Result<TaxonomySitemap, ResolveError> {
        let mut entries = Vec::new();
        let mut last_modified = None;

        for (location, posts) in self.buckets(site, resolver)? {
            let Some((first_modified, bucket_last_modified)) = first_and_last_modified(&posts)
            else {
                trace!(taxonomy = self.name(), %location, "skipping empty bucket");
                continue;
            };

            entries.push(SitemapEntry::page(location, bucket_last_modified));
            last_modified = last_modified.max(Some(first_modified));
        }

        Ok(TaxonomySitemap {
            taxonomy: *self,
            entries,
            last_modified,
        })
    }
}

/// Returns the earliest and the latest post date, or `None` for no posts.
pub fn first_and_last_modified(posts: &[&Post]) -> Option<(Timestamp, Timestamp)> {
    let first = posts.iter().map(|post| post.date).min()?;
    let last = posts.iter().map(|post| post.date).max()?;

    Some((first, last))
}

fn lastmod(entry: &SitemapEntry) -> Option<XmlElement> {
    entry
        .last_modified
        .as_ref()
        .map(|last_modified| XmlElement::new("lastmod").child(format_w3c(last_modified)))
}

pub fn sitemap_template(entries: &[SitemapEntry]) -> XmlElement {
    XmlElement::new("urlset")
        .attr("xmlns", SITEMAP_NAMESPACE)
        .children(entries.iter().map(|entry| {
            let change_frequency = entry
                .change_frequency
                .map(|frequency| XmlElement::new("changefreq").child(frequency.as_str()));
            let priority = entry
                .priority
                .map(|priority| XmlElement::new("priority").child(format!("{priority:.1}")));

            XmlElement::new("url")
                .child(XmlElement::new("loc").child(entry.location.as_str()))
                .children(lastmod(entry))
                .children(change_frequency)
                .children(priority)
        }))
}

pub fn sitemap_index_template(entries: &[SitemapEntry]) -> XmlElement {
    XmlElement::new("sitemapindex")
        .attr("xmlns", SITEMAP_NAMESPACE)
        .children(entries.iter().map(|entry| {
            XmlElement::new("sitemap")
                .child(XmlElement::new("loc").child(entry.location.as_str()))
                .children(lastmod(entry))
        }))
}

/// Returns one sitemap page per taxonomy, followed by the sitemap index
/// linking them.
pub fn sitemap_pages(
    site: &SiteContext,
    resolver: &UrlResolver,
) -> Result<Vec<VirtualPage>, GeneratePagesError> {
    let dir = site.config.get_or("sitemap_dir", DEFAULT_SITEMAP_DIR);
    let layout = site
        .config
        .get_or("sitemap_page_layout", DEFAULT_SITEMAP_PAGE_LAYOUT);
    let index_layout = site.config.get_or(
        "sitemap_index_page_layout",
        DEFAULT_SITEMAP_INDEX_PAGE_LAYOUT,
    );

    let mut pages = Vec::with_capacity(Taxonomy::ALL.len() + 1);
    let mut index_entries = Vec::with_capacity(Taxonomy::ALL.len());

    for taxonomy in Taxonomy::ALL {
        let sitemap = taxonomy.sitemap(site, resolver)?;

        index_entries.push(SitemapEntry::sitemap(
            resolver.permalink(Route::Sitemap(taxonomy.name()))?,
            sitemap.last_modified,
        ));

        let content = render_document(&sitemap_template(&sitemap.entries))?;
        pages.push(VirtualPage {
            dir: dir.clone(),
            name: format!("{}.xml", taxonomy.name()),
            layout: layout.clone(),
            data: json!({
                "entries": sitemap.entries,
                "content": content,
            }),
        });
    }

    let content = render_document(&sitemap_index_template(&index_entries))?;
    pages.push(VirtualPage {
        dir,
        name: "index.xml".to_string(),
        layout: index_layout,
        data: json!({
            "sitemap_index_entries": index_entries,
            "content": content,
        }),
    });

    Ok(pages)
}
