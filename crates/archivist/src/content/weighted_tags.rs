use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::content::Post;

pub const MINIMUM_WEIGHT: f64 = 90.0;
pub const MAXIMUM_WEIGHT: f64 = 400.0;

/// A tag and its weight in a tag cloud.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct WeightedTag {
    pub tag: String,
    pub weight: f64,
}

/// Weighs every tag used by `posts` by how often it is used, scaled into
/// [`MINIMUM_WEIGHT`]..=[`MAXIMUM_WEIGHT`].
///
/// The result is shuffled, but the same tags always come out in the same
/// order so rebuilding a site does not reshuffle its tag cloud.
pub fn weighted_tags_for_posts(posts: &[Post]) -> Vec<WeightedTag> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for post in posts {
        for tag in post.unique_tags() {
            *counts.entry(tag).or_default() += 1;
        }
    }

    if counts.is_empty() {
        return Vec::new();
    }

    let (min, max) = counts
        .values()
        .fold((usize::MAX, usize::MIN), |(min, max), &count| {
            (min.min(count), max.max(count))
        });

    let mut weighted = counts
        .into_iter()
        .map(|(tag, count)| WeightedTag {
            tag: tag.to_string(),
            weight: scale(count, min, max),
        })
        .collect::<Vec<_>>();

    weighted.sort_by_cached_key(|weighted| hex::encode(Sha256::digest(weighted.tag.as_bytes())));

    weighted
}

/// Dividing counts by their average before scaling cancels out, so scaling the
/// raw counts gives the same weights.
fn scale(count: usize, min: usize, max: usize) -> f64 {
    if min == max {
        return MINIMUM_WEIGHT;
    }

    let position = (count - min) as f64 / (max - min) as f64;

    position * (MAXIMUM_WEIGHT - MINIMUM_WEIGHT) + MINIMUM_WEIGHT
}
