//! Archive pages for each author, category, month and tag.

use serde_json::json;

use crate::config::{
    DEFAULT_AUTHOR_PAGE_LAYOUT, DEFAULT_AUTHOR_TITLE_PREFIX, DEFAULT_CATEGORY_PAGE_LAYOUT,
    DEFAULT_CATEGORY_TITLE_PREFIX, DEFAULT_MONTHLY_ARCHIVE_PAGE_LAYOUT,
    DEFAULT_MONTHLY_ARCHIVE_TITLE_PREFIX, DEFAULT_TAG_PAGE_LAYOUT, DEFAULT_TAG_TITLE_PREFIX,
};
use crate::content::{
    hierarchify_categories, posts_by_year_and_month, weighted_tags_for_posts, Post, PostSummary,
};
use crate::render::VirtualPage;
use crate::routes::{ResolveError, Route, UrlResolver};
use crate::site::{PostSource, SiteContext};

const USER_ICON: &str = r#"<i class="fa fa-user"></i>"#;
const FOLDER_ICON: &str = r#"<i class="fa fa-folder-open"></i>"#;
const CALENDAR_ICON: &str = r#"<i class="fa fa-calendar"></i>"#;
const TAG_ICON: &str = r#"<i class="fa fa-tags"></i>"#;

const INDEX_PAGE_NAME: &str = "index.html";

fn header_title(icon: &str, prefix: &str, name: &str) -> String {
    format!("{icon}{prefix}<span>{name}</span>")
}

fn summaries<'a>(
    resolver: &UrlResolver,
    posts: &[&'a Post],
) -> Result<Vec<PostSummary<'a>>, ResolveError> {
    posts
        .iter()
        .map(|&post| PostSummary::new(post, resolver))
        .collect()
}

pub fn author_pages(
    site: &SiteContext,
    resolver: &UrlResolver,
) -> Result<Vec<VirtualPage>, ResolveError> {
    let layout = site
        .config
        .get_or("author_page_layout", DEFAULT_AUTHOR_PAGE_LAYOUT);
    let prefix = site
        .config
        .get_or("author_title_prefix", DEFAULT_AUTHOR_TITLE_PREFIX);

    site.authors_posts()
        .into_iter()
        .map(|(author, posts)| {
            let dir = resolver.resolve(Route::Author(author))?;
            let name = site
                .author_data(author)
                .map(|data| data.name.as_str())
                .unwrap_or(author);

            Ok(VirtualPage {
                dir,
                name: INDEX_PAGE_NAME.to_string(),
                layout: layout.clone(),
                data: json!({
                    "header_title": header_title(USER_ICON, &prefix, name),
                    "title": format!("{name} Archives"),
                    "author": author,
                    "posts": summaries(resolver, &posts)?,
                }),
            })
        })
        .collect()
}

/// Returns one page per category, ancestors included, each listing every
/// post filed under the category or below it.
pub fn category_pages(
    site: &SiteContext,
    resolver: &UrlResolver,
) -> Result<Vec<VirtualPage>, ResolveError> {
    let layout = site
        .config
        .get_or("category_page_layout", DEFAULT_CATEGORY_PAGE_LAYOUT);
    let prefix = site
        .config
        .get_or("category_title_prefix", DEFAULT_CATEGORY_TITLE_PREFIX);

    hierarchify_categories(&site.categories())
        .into_iter()
        .map(|(category, posts)| {
            let dir = resolver.resolve(Route::Category(&category))?;
            let name = category.rsplit('/').next().unwrap_or(&category);

            Ok(VirtualPage {
                dir,
                name: INDEX_PAGE_NAME.to_string(),
                layout: layout.clone(),
                data: json!({
                    "header_title": header_title(FOLDER_ICON, &prefix, name),
                    "title": format!("{name} Archives"),
                    "category": category,
                    "posts": summaries(resolver, &posts)?,
                }),
            })
        })
        .collect()
}

pub fn monthly_archive_pages(
    site: &SiteContext,
    resolver: &UrlResolver,
) -> Result<Vec<VirtualPage>, ResolveError> {
    let layout = site.config.get_or(
        "monthly_archive_page_layout",
        DEFAULT_MONTHLY_ARCHIVE_PAGE_LAYOUT,
    );
    let prefix = site.config.get_or(
        "monthly_archive_title_prefix",
        DEFAULT_MONTHLY_ARCHIVE_TITLE_PREFIX,
    );

    posts_by_year_and_month(site.all_posts())
        .into_iter()
        .map(|(month, posts)| {
            let dir = resolver.resolve(Route::Archive(month))?;
            let month_year = month.long_name();

            Ok(VirtualPage {
                dir,
                name: INDEX_PAGE_NAME.to_string(),
                layout: layout.clone(),
                data: json!({
                    "header_title": header_title(CALENDAR_ICON, &prefix, &month_year),
                    "title": format!("{month_year} Archives"),
                    "month": month.to_string(),
                    "posts": summaries(resolver, &posts)?,
                }),
            })
        })
        .collect()
}

pub fn tag_pages(
    site: &SiteContext,
    resolver: &UrlResolver,
) -> Result<Vec<VirtualPage>, ResolveError> {
    let layout = site.config.get_or("tag_page_layout", DEFAULT_TAG_PAGE_LAYOUT);
    let prefix = site
        .config
        .get_or("tag_title_prefix", DEFAULT_TAG_TITLE_PREFIX);
    let weighted_tags = weighted_tags_for_posts(site.all_posts());

    site.tags()
        .into_iter()
        .map(|(tag, posts)| {
            let dir = resolver.resolve(Route::Tag(tag))?;

            Ok(VirtualPage {
                dir,
                name: INDEX_PAGE_NAME.to_string(),
                layout: layout.clone(),
                data: json!({
                    "header_title": header_title(TAG_ICON, &prefix, tag),
                    "title": format!("{tag} Archives"),
                    "tag": tag,
                    "posts": summaries(resolver, &posts)?,
                    "weighted_tags": weighted_tags,
                }),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::SiteConfig;
    use crate::content::fixtures::*;
    use crate::site::AuthorData;

    fn make_site() -> SiteContext {
        SiteContext::new(SiteConfig::new("https://blog.example.com".parse().unwrap()))
            .with_author(
                "jdoe",
                AuthorData {
                    name: "Jane Doe".to_string(),
                    slug: "jane".to_string(),
                    email: None,
                },
            )
            .with_posts([
                with_author(
                    with_categories(make_post("older", "2024-01-15"), &["dev/ruby"]),
                    "jdoe",
                ),
                with_tags(
                    with_categories(make_post("newer", "2024-01-20"), &["dev"]),
                    &["Ruby On Rails"],
                ),
            ])
    }

    fn post_ids(page: &VirtualPage) -> Vec<&str> {
        page.data["posts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|post| post["id"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_author_pages() {
        let site = make_site();
        let resolver = UrlResolver::new(&site);

        let pages = author_pages(&site, &resolver).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].dir, "/author/jane");
        assert_eq!(pages[0].layout, "author_index");
        assert_eq!(
            pages[0].data["header_title"],
            r#"<i class="fa fa-user"></i>Author: <span>Jane Doe</span>"#
        );
        assert_eq!(pages[0].data["title"], "Jane Doe Archives");
        assert_eq!(post_ids(&pages[0]), vec!["older"]);
    }

    #[test]
    fn test_category_pages() {
        let site = make_site();
        let resolver = UrlResolver::new(&site);

        let pages = category_pages(&site, &resolver).unwrap();

        assert_eq!(
            pages.iter().map(|page| page.dir.as_str()).collect::<Vec<_>>(),
            vec!["/category/dev", "/category/dev/ruby"]
        );
        assert_eq!(post_ids(&pages[0]), vec!["newer", "older"]);
        assert_eq!(
            pages[0].data["posts"][1]["categories"],
            json!([
                {
                    "name": "dev",
                    "category": "dev",
                    "url": "https://blog.example.com/category/dev/",
                },
                {
                    "name": "ruby",
                    "category": "dev/ruby",
                    "url": "https://blog.example.com/category/dev/ruby/",
                },
            ])
        );
        assert_eq!(pages[1].data["title"], "ruby Archives");
        assert_eq!(
            pages[1].data["header_title"],
            r#"<i class="fa fa-folder-open"></i>Category: <span>ruby</span>"#
        );
    }

    #[test]
    fn test_monthly_archive_pages() {
        let mut site = make_site();
        site.config.monthly_archive_title_prefix = Some("Archive: ".to_string());
        let resolver = UrlResolver::new(&site);

        let pages = monthly_archive_pages(&site, &resolver).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].dir, "/2024/01");
        assert_eq!(pages[0].data["title"], "January 2024 Archives");
        assert_eq!(
            pages[0].data["header_title"],
            r#"<i class="fa fa-calendar"></i>Archive: <span>January 2024</span>"#
        );
        assert_eq!(post_ids(&pages[0]), vec!["older", "newer"]);
    }

    #[test]
    fn test_tag_pages() {
        let mut site = make_site();
        site.config.tag_page_layout = Some("topic".to_string());
        let resolver = UrlResolver::new(&site);

        let pages = tag_pages(&site, &resolver).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].dir, "/tag/ruby-on-rails");
        assert_eq!(pages[0].name, "index.html");
        assert_eq!(pages[0].layout, "topic");
        assert_eq!(pages[0].data["tag"], "Ruby On Rails");
        assert_eq!(
            pages[0].data["header_title"],
            r#"<i class="fa fa-tags"></i>Tagged: <span>Ruby On Rails</span>"#
        );
        assert_eq!(
            pages[0].data["weighted_tags"],
            json!([{ "tag": "Ruby On Rails", "weight": 90.0 }])
        );
    }
}
