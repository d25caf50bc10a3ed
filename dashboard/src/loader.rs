use crate::merge::filter_posts;
use finder_core::{FeedResponse, Post, SearchQuery};

/// Flattens grouped posts into one list, stamping each post with its group's
/// name and scrape time. A scrape time already present on a post is kept.
pub fn flatten_groups(response: FeedResponse) -> Vec<Post> {
    let FeedResponse {
        groups, scraped_at, ..
    } = response;

    let mut posts = Vec::with_capacity(groups.iter().map(|g| g.posts.len()).sum());
    for group in groups {
        let group_time = group
            .scraped_at
            .or(group.last_updated)
            .or_else(|| scraped_at.clone());

        for mut post in group.posts {
            if post.group_scraped_at.is_none() {
                post.group_scraped_at = group_time.clone();
            }
            if post.group_name.is_none() && !group.group_name.is_empty() {
                post.group_name = Some(group.group_name.clone());
            }
            posts.push(post);
        }
    }
    posts
}

/// Newest first by effective timestamp. The sort is stable, so equal
/// timestamps keep their relative order.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by_key(|post| std::cmp::Reverse(post.effective_timestamp()));
}

pub fn assign_display_ids(posts: &mut [Post]) {
    for (index, post) in posts.iter_mut().enumerate() {
        post.id = index + 1;
    }
}

/// Builds the displayed list: filter, sort, number.
pub fn materialize(dataset: &[Post], query: &SearchQuery) -> Vec<Post> {
    let mut visible = filter_posts(dataset, query);
    sort_newest_first(&mut visible);
    assign_display_ids(&mut visible);
    visible
}

/// Flattened, sorted and numbered posts of a freshly fetched response.
pub fn load_dataset(response: FeedResponse) -> Vec<Post> {
    let mut posts = flatten_groups(response);
    sort_newest_first(&mut posts);
    assign_display_ids(&mut posts);
    posts
}
