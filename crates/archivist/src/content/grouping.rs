use std::hash::Hash;

use indexmap::IndexMap;

/// Groups `items` by the keys `keys_for` returns for each one.
///
/// An item may land in any number of groups. Groups appear in the order their
/// key was first seen, and items keep their input order within a group.
pub fn group_by<'a, T, K, I, F>(items: &'a [T], mut keys_for: F) -> IndexMap<K, Vec<&'a T>>
where
    K: Hash + Eq,
    I: IntoIterator<Item = K>,
    F: FnMut(&'a T) -> I,
{
    let mut groups: IndexMap<K, Vec<&'a T>> = IndexMap::new();

    for item in items {
        for key in keys_for(item) {
            groups.entry(key).or_default().push(item);
        }
    }

    groups
}
