use finder_core::Post;
use serde::Serialize;

const COMPLETENESS_SIGNALS: u32 = 5;

/// Share of the five lead-quality signals (contact, price, brand, location,
/// image) present on a post, as a rounded percentage.
pub fn completeness_score(post: &Post) -> u8 {
    let present = [
        post.has_contact(),
        post.has_price(),
        post.has_brand(),
        post.has_location(),
        post.has_image(),
    ]
    .into_iter()
    .filter(|signal| *signal)
    .count() as u32;

    ((present * 100) as f64 / COMPLETENESS_SIGNALS as f64).round() as u8
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub with_contact: usize,
    pub with_price: usize,
    pub with_location: usize,
    pub avg_completeness: u8,
    pub total_reactions: u64,
    pub total_comments: u64,
}

impl DashboardStats {
    pub fn compute(posts: &[Post]) -> Self {
        if posts.is_empty() {
            return Self::default();
        }

        let completeness_sum: u64 = posts
            .iter()
            .map(|p| u64::from(completeness_score(p)))
            .sum();

        Self {
            total: posts.len(),
            with_contact: posts.iter().filter(|p| p.has_contact()).count(),
            with_price: posts.iter().filter(|p| p.has_price()).count(),
            with_location: posts.iter().filter(|p| p.has_location()).count(),
            avg_completeness: (completeness_sum as f64 / posts.len() as f64).round() as u8,
            total_reactions: posts.iter().map(Post::reactions).sum(),
            total_comments: posts.iter().map(Post::comments).sum(),
        }
    }
}
