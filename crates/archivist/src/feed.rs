use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;
use url::Url;

use crate::config::{SiteConfig, DEFAULT_RSS_PAGE_LAYOUT};
use crate::content::{sort_newest_first, Post};
use crate::date::{format_rfc2822, Timestamp};
use crate::permalink::{pretty_url, Permalink};
use crate::render::VirtualPage;
use crate::routes::{DataKind, ResolveError, Route, UrlResolver};
use crate::site::{GeneratePagesError, PostSource, SiteContext};
use crate::xml::{render_document, text_element, XmlElement};

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

static HTML_TAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn html_tag_regex() -> &'static Regex {
    HTML_TAG_REGEX.get_or_init(|| {
        Regex::new(r"</?[^>]+?>").expect("failed to compile regex for HTML tags")
    })
}

/// Removes every HTML tag from `html`, keeping the text between them.
pub fn strip_html(html: &str) -> String {
    html_tag_regex().replace_all(html, "").into_owned()
}

#[derive(Debug, PartialEq, Clone)]
pub struct FeedItem {
    pub title: String,
    pub url: Permalink,
    /// The post's rendered HTML.
    pub content: String,
    /// The post's excerpt as plain text.
    pub description: String,
    pub published_at: Timestamp,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Feed {
    /// The date of the newest item. `None` for an empty feed.
    pub updated: Option<Timestamp>,
    pub items: Vec<FeedItem>,
}

/// Picks the newest posts for a feed, at most `item_limit` of them, and
/// turns each into a [`FeedItem`] with `render` supplying its content.
pub fn select_feed_items<'a, F>(
    posts: impl IntoIterator<Item = &'a Post>,
    item_limit: Option<usize>,
    base_url: &Url,
    mut render: F,
) -> Result<Feed, url::ParseError>
where
    F: FnMut(&Post) -> String,
{
    let mut posts = posts.into_iter().collect::<Vec<_>>();
    sort_newest_first(&mut posts);

    let items = posts
        .into_iter()
        .take(item_limit.unwrap_or(usize::MAX))
        .map(|post| {
            Ok(FeedItem {
                title: post.title.clone(),
                url: Permalink::from_path(base_url, &pretty_url(&post.url))?,
                content: render(post),
                description: strip_html(&post.excerpt),
                published_at: post.date,
            })
        })
        .collect::<Result<Vec<_>, url::ParseError>>()?;

    Ok(Feed {
        updated: items.first().map(|item| item.published_at),
        items,
    })
}

fn cdata_element(tag: &str, text: &str) -> XmlElement {
    XmlElement::new(tag).cdata(text)
}

pub fn rss_template(config: &SiteConfig, feed: &Feed) -> XmlElement {
    let channel = XmlElement::new("channel")
        .child(cdata_element("title", config.title.as_deref().unwrap_or_default()))
        .child(XmlElement::new("link").child(config.base_url.as_str()))
        .child(cdata_element(
            "description",
            config.description.as_deref().unwrap_or_default(),
        ))
        .children(
            config
                .author
                .as_deref()
                .map(|author| cdata_element("managingEditor", author)),
        )
        .children(
            config
                .copyright
                .as_deref()
                .map(|copyright| cdata_element("copyright", copyright)),
        )
        .children(text_element(
            "lastBuildDate",
            feed.updated.as_ref().map(format_rfc2822),
        ))
        .children(feed.items.iter().map(|item| {
            XmlElement::new("item")
                .child(cdata_element("title", &item.title))
                .child(XmlElement::new("link").child(item.url.as_str()))
                .child(XmlElement::new("guid").child(item.url.as_str()))
                .child(cdata_element("description", &item.description))
                .child(cdata_element("content:encoded", &item.content))
                .child(XmlElement::new("pubDate").child(format_rfc2822(&item.published_at)))
        }));

    XmlElement::new("rss")
        .attr("version", "2.0")
        .attr("xmlns:content", CONTENT_NAMESPACE)
        .child(channel)
}

fn feed_page<'a>(
    site: &SiteContext,
    resolver: &UrlResolver,
    name: &str,
    posts: impl IntoIterator<Item = &'a Post>,
) -> Result<VirtualPage, GeneratePagesError> {
    let feed = select_feed_items(
        posts,
        site.config.rss_item_limit,
        &site.config.base_url,
        |post| post.content.clone(),
    )
    .map_err(ResolveError::from)?;
    let content = render_document(&rss_template(&site.config, &feed))?;

    Ok(VirtualPage {
        dir: resolver.resolve(Route::Rss(name))?,
        name: "index.html".to_string(),
        layout: site.config.get_or("rss_page_layout", DEFAULT_RSS_PAGE_LAYOUT),
        data: json!({
            "regenerate": true,
            "content": content,
        }),
    })
}

/// Returns the site-wide feed followed by one feed per author.
pub fn feed_pages(
    site: &SiteContext,
    resolver: &UrlResolver,
) -> Result<Vec<VirtualPage>, GeneratePagesError> {
    let mut pages = vec![feed_page(site, resolver, "", site.all_posts())?];

    for (author, posts) in site.authors_posts() {
        let author_data = site
            .author_data(author)
            .ok_or_else(|| ResolveError::MissingData {
                kind: DataKind::Author,
                key: author.to_string(),
            })?;

        pages.push(feed_page(site, resolver, &author_data.slug, posts)?);
    }

    Ok(pages)
}
