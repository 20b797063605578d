use std::collections::HashSet;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::content::{sort_newest_first, Post};
use crate::permalink::Permalink;
use crate::routes::{ResolveError, Route, UrlResolver};

static WORD_START_REGEX: OnceLock<Regex> = OnceLock::new();

fn word_start_regex() -> &'static Regex {
    WORD_START_REGEX.get_or_init(|| {
        Regex::new(r"(?:^|[ -])[a-z]").expect("failed to compile regex for word starts")
    })
}

/// Upper-cases every lowercase letter that starts a word. A word starts at the
/// beginning of the string or right after a space or a hyphen.
pub fn titleize(text: &str) -> String {
    word_start_regex()
        .replace_all(text, |captures: &Captures| captures[0].to_uppercase())
        .into_owned()
}

/// Returns the display name of a category: its last path segment, titleized.
pub fn category_short_name(category: &str) -> String {
    let segment = category.rsplit('/').next().unwrap_or(category);

    titleize(segment)
}

/// Returns `category` followed by each of its ancestors, nearest first.
///
/// `"dev/ruby/internals"` yields `"dev/ruby/internals"`, `"dev/ruby"` and
/// `"dev"`.
pub fn category_lineage(category: &str) -> impl Iterator<Item = &str> {
    let mut next = Some(category.trim_matches('/')).filter(|path| !path.is_empty());

    std::iter::from_fn(move || {
        let current = next?;
        next = current.rsplit_once('/').map(|(parent, _)| parent);
        Some(current)
    })
}

/// Aggregates posts filed under leaf categories into every ancestor category.
///
/// Each resulting bucket holds every post filed under the category or any of
/// its descendants, once, newest first. Buckets are ordered by display name,
/// ignoring case, with the raw path breaking ties.
pub fn hierarchify_categories<'a, K>(
    categories: &IndexMap<K, Vec<&'a Post>>,
) -> IndexMap<String, Vec<&'a Post>>
where
    K: AsRef<str>,
{
    let mut buckets: IndexMap<String, Vec<&'a Post>> = IndexMap::new();

    for (leaf, posts) in categories {
        for category in category_lineage(leaf.as_ref()) {
            buckets
                .entry(category.to_string())
                .or_default()
                .extend(posts.iter().copied());
        }
    }

    for posts in buckets.values_mut() {
        let mut seen = HashSet::new();
        posts.retain(|post| seen.insert(post.id.clone()));
        sort_newest_first(posts);
    }

    buckets.sort_by(|a, _, b, _| {
        let a_name = category_short_name(a).to_lowercase();
        let b_name = category_short_name(b).to_lowercase();

        a_name.cmp(&b_name).then_with(|| a.cmp(b))
    });

    buckets
}

/// A link to one category in a post's category breadcrumb.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct CategoryLink {
    pub name: String,
    pub category: String,
    pub url: Permalink,
}

/// Flattens a post's categories, ancestors included, into links sorted by
/// their last path segment. When two paths end in the same segment, the one
/// reached from the earlier-listed category wins.
pub fn flat_categories<S: AsRef<str>>(
    categories: &[S],
    resolver: &UrlResolver,
) -> Result<Vec<CategoryLink>, ResolveError> {
    let mut by_name: IndexMap<String, String> = IndexMap::new();
    let mut visited = HashSet::new();

    for category in categories.iter().rev() {
        for path in category_lineage(category.as_ref()) {
            if !visited.insert(path.to_string()) {
                break;
            }

            let name = path.rsplit('/').next().unwrap_or(path).to_string();
            by_name.insert(name, path.to_string());
        }
    }

    by_name.sort_keys();

    by_name
        .into_iter()
        .map(|(name, category)| {
            Ok(CategoryLink {
                url: resolver.permalink(Route::Category(&category))?,
                name,
                category,
            })
        })
        .collect()
}
