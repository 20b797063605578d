use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::{flat_categories, CategoryLink};
use crate::date::{from_toml_datetime, Timestamp};
use crate::routes::{ResolveError, UrlResolver};

/// Identifies a post. Two posts with the same ID are the same post.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A post as read from the host's collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(deserialize_with = "from_toml_datetime")]
    pub date: Timestamp,
    pub title: String,
    /// The root-relative URL the host publishes the post at.
    pub url: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub excerpt: String,
    /// The rendered HTML body.
    #[serde(default)]
    pub content: String,
}

impl PartialEq for Post {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Post {}

impl Post {
    /// Returns the post's tags, without duplicates, in the order they were
    /// first listed.
    pub fn unique_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            if !tags.contains(&tag.as_str()) {
                tags.push(tag);
            }
        }

        tags
    }
}

/// The subset of a [`Post`] a listing page needs.
#[derive(Debug, PartialEq, Serialize)]
pub struct PostSummary<'a> {
    pub id: &'a PostId,
    pub title: &'a str,
    pub url: &'a str,
    pub date: String,
    pub excerpt: &'a str,
    /// The post's categories and their ancestors, linked to their archives.
    pub categories: Vec<CategoryLink>,
}

impl<'a> PostSummary<'a> {
    pub fn new(post: &'a Post, resolver: &UrlResolver) -> Result<Self, ResolveError> {
        Ok(Self {
            id: &post.id,
            title: &post.title,
            url: &post.url,
            date: crate::date::format_w3c(&post.date),
            excerpt: &post.excerpt,
            categories: flat_categories(&post.categories, resolver)?,
        })
    }
}

/// Sorts posts newest first. Posts sharing a date keep their relative order.
pub fn sort_newest_first(posts: &mut [&Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::date::parse_date;

    pub fn make_post(id: &str, date: &str) -> Post {
        Post {
            id: PostId(id.to_string()),
            date: parse_date(date).unwrap(),
            title: id.to_string(),
            url: format!("/{id}/"),
            author: None,
            categories: Vec::new(),
            tags: Vec::new(),
            excerpt: String::new(),
            content: String::new(),
        }
    }

    pub fn with_categories(mut post: Post, categories: &[&str]) -> Post {
        post.categories = categories.iter().map(|c| c.to_string()).collect();
        post
    }

    pub fn with_tags(mut post: Post, tags: &[&str]) -> Post {
        post.tags = tags.iter().map(|t| t.to_string()).collect();
        post
    }

    pub fn with_author(mut post: Post, author: &str) -> Post {
        post.author = Some(author.to_string());
        post
    }
}
