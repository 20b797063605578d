#![doc = include_str!("../README.md")]

pub mod config;
pub mod content;
pub mod date;
pub mod feed;
pub mod pages;
pub mod permalink;
pub mod render;
pub mod routes;
mod site;
pub mod sitemap;
pub mod xml;

pub use site::*;

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, RwLock};

    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::render::InMemoryRenderer;
    use super::*;

    #[test]
    fn test_kitchen_sink() {
        let site = SiteContext::from_toml_str(indoc! {r#"
            layouts = ["author_index", "category_index", "tag_index", "rss"]

            [site]
            url = "https://blog.example.com"
            title = "Example"
            rss_item_limit = 1

            [authors.jdoe]
            name = "Jane Doe"
            slug = "jane"

            [[posts]]
            id = "_posts/2024-01-15-ruby.md"
            date = 2024-01-15
            title = "Ruby"
            url = "/2024/01/15/ruby/"
            author = "jdoe"
            categories = ["dev/ruby"]
            tags = ["ruby", "Ruby On Rails"]

            [[posts]]
            id = "_posts/2024-01-20-dev.md"
            date = "2024-01-20T08:00:00+01:00"
            title = "Dev"
            url = "/2024/01/20/dev/"
            categories = ["dev"]
        "#})
        .unwrap();
        let storage = Arc::new(RwLock::new(HashMap::new()));

        let report = build_site(&site, &InMemoryRenderer::new(storage.clone())).unwrap();

        assert_eq!(
            report.skipped,
            vec![Generator::MonthlyArchives, Generator::Sitemaps]
        );

        let storage = storage.read().unwrap();
        let mut paths = storage.keys().map(String::as_str).collect::<Vec<_>>();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                "/author/jane/index.html",
                "/category/dev/index.html",
                "/category/dev/ruby/index.html",
                "/feed/index.html",
                "/feed/jane/index.html",
                "/tag/ruby-on-rails/index.html",
                "/tag/ruby/index.html",
            ]
        );

        let dev = &storage["/category/dev/index.html"];
        assert_eq!(dev.data["title"], "dev Archives");
        assert_eq!(dev.data["posts"][0]["title"], "Dev");
        assert_eq!(dev.data["posts"][1]["title"], "Ruby");

        let feed = storage["/feed/index.html"].content().unwrap();
        assert!(feed.contains("https://blog.example.com/2024/01/20/dev/"));
        assert!(!feed.contains("https://blog.example.com/2024/01/15/ruby/"));
    }
}
