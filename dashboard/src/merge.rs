//! Reconciling and filtering post lists.
//!
//! Two services can return the same post. Identity is the post link when
//! there is one, otherwise the author plus the first 100 characters of text.

use finder_core::{Post, SearchQuery};
use std::collections::HashSet;

const DEDUP_TEXT_PREFIX: usize = 100;

pub fn dedup_key(post: &Post) -> String {
    match post.post_link.as_deref().map(str::trim) {
        Some(link) if !link.is_empty() => link.to_string(),
        _ => {
            let prefix: String = post.text.chars().take(DEDUP_TEXT_PREFIX).collect();
            format!("{}|{}", post.author, prefix)
        }
    }
}

/// Union of two lists. The first occurrence of each identity wins, so posts
/// from `primary` take precedence over equal posts from `secondary`.
pub fn merge_posts(primary: Vec<Post>, secondary: Vec<Post>) -> Vec<Post> {
    let mut seen = HashSet::with_capacity(primary.len() + secondary.len());
    primary
        .into_iter()
        .chain(secondary)
        .filter(|post| seen.insert(dedup_key(post)))
        .collect()
}

/// `needle` must already be lowercase.
pub fn matches_term(post: &Post, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    contains(post.text.as_str())
        || contains(post.author.as_str())
        || post.product_info.as_ref().is_some_and(|info| {
            info.beer_brands.iter().any(|b| contains(b.as_str()))
                || info.locations.iter().any(|l| contains(l.as_str()))
        })
}

pub fn matches_category(post: &Post, category: Option<&str>) -> bool {
    match category {
        None => true,
        Some(category) => post
            .keywords
            .iter()
            .any(|k| k.category.eq_ignore_ascii_case(category)),
    }
}

/// Posts passing both the text and the category filter, in dataset order.
pub fn filter_posts(dataset: &[Post], query: &SearchQuery) -> Vec<Post> {
    let needle = query.term.to_lowercase();
    dataset
        .iter()
        .filter(|post| matches_term(post, &needle))
        .filter(|post| matches_category(post, query.category.as_deref()))
        .cloned()
        .collect()
}
