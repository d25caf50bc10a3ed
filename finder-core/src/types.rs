use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A scrape or post time as the services send it: either epoch milliseconds
/// or a date string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Fractional(f64),
    Text(String),
}

impl Timestamp {
    /// Milliseconds since the Unix epoch, or `None` if the value cannot be read
    /// as a date.
    pub fn to_millis(&self) -> Option<i64> {
        match self {
            Timestamp::Millis(ms) => Some(*ms),
            Timestamp::Fractional(ms) if ms.is_finite() => Some(*ms as i64),
            Timestamp::Fractional(_) => None,
            Timestamp::Text(text) => parse_timestamp_text(text.trim()),
        }
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Timestamp::Text(value.to_string())
    }
}

fn parse_timestamp_text(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive).timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&midnight).timestamp_millis());
    }
    text.parse::<i64>().ok()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, deserialize_with = "null_default")]
    pub has_contact: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    #[serde(default, deserialize_with = "null_default")]
    pub prices: Vec<Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub beer_brands: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub locations: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordTag {
    #[serde(default, deserialize_with = "null_default")]
    pub keyword: String,
    #[serde(default, deserialize_with = "null_default")]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    #[serde(default, deserialize_with = "lenient_count")]
    pub reactions: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comments: u64,
}

/// One scraped group post.
///
/// `id` is a display key: it is the 1-based position of the post in the list
/// it was last materialized into, and changes whenever that list is rebuilt.
/// Fields the client does not model are kept in `extra` so exports round-trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default, deserialize_with = "display_id")]
    pub id: usize,
    #[serde(default, deserialize_with = "null_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_default")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_profile_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_timestamp: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_scraped_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_info: Option<ProductInfo>,
    #[serde(
        default,
        deserialize_with = "null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub keywords: Vec<KeywordTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<Engagement>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    /// Group scrape time, then post time, then raw post time; epoch 0 when none
    /// of them is a readable date.
    pub fn effective_timestamp(&self) -> i64 {
        [&self.group_scraped_at, &self.timestamp, &self.raw_timestamp]
            .into_iter()
            .flatten()
            .next()
            .and_then(Timestamp::to_millis)
            .unwrap_or(0)
    }

    pub fn has_contact(&self) -> bool {
        self.contact.as_ref().is_some_and(|c| c.has_contact)
    }

    pub fn has_price(&self) -> bool {
        self.product_info
            .as_ref()
            .is_some_and(|p| !p.prices.is_empty())
    }

    pub fn has_brand(&self) -> bool {
        self.product_info
            .as_ref()
            .is_some_and(|p| !p.beer_brands.is_empty())
    }

    pub fn has_location(&self) -> bool {
        self.product_info
            .as_ref()
            .is_some_and(|p| !p.locations.is_empty())
    }

    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    pub fn reactions(&self) -> u64 {
        self.engagement.as_ref().map_or(0, |e| e.reactions)
    }

    pub fn comments(&self) -> u64 {
        self.engagement.as_ref().map_or(0, |e| e.comments)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, deserialize_with = "null_default")]
    pub group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<Timestamp>,
    #[serde(default, deserialize_with = "null_default")]
    pub posts: Vec<Post>,
}

/// Response root shared by the posts, per-query and search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
}

impl FeedResponse {
    pub fn post_count(&self) -> usize {
        self.groups.iter().map(|g| g.posts.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub category: Option<String>,
}

impl SearchQuery {
    pub fn new(term: &str, category: Option<&str>) -> Self {
        Self {
            term: term.trim().to_string(),
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }
}

// Incoming posts may carry their own `id` of any type; it is replaced on
// materialization, so anything that is not a small number reads as 0.
fn display_id<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0))
}

// Scraped records often carry `null` where a value is simply absent.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().replace(',', "").parse().unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(
            Timestamp::from("2024-01-01").to_millis(),
            Some(1_704_067_200_000)
        );
        assert_eq!(
            Timestamp::from("2024-01-01T00:00:00Z").to_millis(),
            Some(1_704_067_200_000)
        );
        assert_eq!(
            Timestamp::from("2024-01-01T07:00:00+07:00").to_millis(),
            Some(1_704_067_200_000)
        );
        assert_eq!(
            Timestamp::from("2024-01-01T00:00:00.000").to_millis(),
            Some(1_704_067_200_000)
        );
        assert_eq!(
            Timestamp::from("2024-01-01 00:00:01").to_millis(),
            Some(1_704_067_201_000)
        );
        assert_eq!(Timestamp::Millis(42).to_millis(), Some(42));
        assert_eq!(Timestamp::from("yesterday").to_millis(), None);
        assert_eq!(Timestamp::from("").to_millis(), None);
    }

    #[test]
    fn test_effective_timestamp_precedence() {
        let mut post = Post {
            timestamp: Some(Timestamp::from("2024-01-02")),
            raw_timestamp: Some(Timestamp::from("2024-01-03")),
            ..Default::default()
        };
        assert_eq!(post.effective_timestamp(), 1_704_153_600_000);

        post.group_scraped_at = Some(Timestamp::from("2024-01-01"));
        assert_eq!(post.effective_timestamp(), 1_704_067_200_000);

        // The first present value decides, even when it is unreadable.
        post.group_scraped_at = Some(Timestamp::from("not a date"));
        assert_eq!(post.effective_timestamp(), 0);

        assert_eq!(Post::default().effective_timestamp(), 0);
    }

    #[test]
    fn test_post_deserialization() {
        let json = r#"{
            "id": "fb_123",
            "author": "Somchai",
            "text": "Leo and Chang for sale",
            "postLink": "https://facebook.com/groups/1/posts/2",
            "imageUrl": "https://cdn.example/img.jpg",
            "rawTimestamp": 1704067200000,
            "contact": { "hasContact": true, "phones": ["0812345678"] },
            "productInfo": { "prices": [450, "500 baht"], "beerBrands": ["Leo"], "locations": [] },
            "keywords": [{ "keyword": "leo", "category": "brand" }],
            "engagement": { "reactions": "1,204", "comments": 7 },
            "shares": 3
        }"#;

        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, 0);
        assert_eq!(post.author, "Somchai");
        assert!(post.has_contact());
        assert!(post.has_price());
        assert!(post.has_brand());
        assert!(!post.has_location());
        assert!(post.has_image());
        assert_eq!(post.reactions(), 1204);
        assert_eq!(post.comments(), 7);
        assert_eq!(post.effective_timestamp(), 1_704_067_200_000);
        assert_eq!(post.extra.get("shares"), Some(&Value::from(3)));
        assert_eq!(
            post.contact.as_ref().unwrap().extra.get("phones"),
            Some(&serde_json::json!(["0812345678"]))
        );

        let round_trip = serde_json::to_value(&post).unwrap();
        assert_eq!(round_trip["shares"], 3);
        assert_eq!(round_trip["postLink"], "https://facebook.com/groups/1/posts/2");
        assert_eq!(round_trip["id"], 0);
    }

    #[test]
    fn test_feed_response_defaults() {
        let response: FeedResponse = serde_json::from_str("{}").unwrap();
        assert!(response.groups.is_empty());
        assert_eq!(response.post_count(), 0);

        let response: FeedResponse = serde_json::from_str(
            r#"{"groups":[{"groupName":"Beer Thailand","lastUpdated":"2024-01-02","posts":[{"author":"a"},{"author":"b"}]}]}"#,
        )
        .unwrap();
        assert_eq!(response.post_count(), 2);
        assert_eq!(
            response.groups[0].last_updated,
            Some(Timestamp::from("2024-01-02"))
        );
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let json = r#"{
            "groups": [
                { "groupName": "ok", "posts": [{ "author": "a", "text": "leo" }] },
                {
                    "groupName": null,
                    "scrapedAt": null,
                    "posts": [
                        {
                            "id": null,
                            "author": null,
                            "text": null,
                            "postLink": null,
                            "contact": { "hasContact": null },
                            "productInfo": { "prices": null, "beerBrands": null, "locations": null },
                            "keywords": null,
                            "engagement": { "reactions": null, "comments": null }
                        },
                        { "author": "b", "keywords": [{ "keyword": null, "category": null }] }
                    ]
                },
                { "groupName": "empty", "posts": null }
            ]
        }"#;

        let response: FeedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.groups.len(), 3);
        assert_eq!(response.post_count(), 3);

        let group = &response.groups[1];
        assert_eq!(group.group_name, "");
        assert_eq!(group.scraped_at, None);

        let post = &group.posts[0];
        assert_eq!(post.author, "");
        assert_eq!(post.text, "");
        assert_eq!(post.post_link, None);
        assert!(post.keywords.is_empty());
        assert!(!post.has_contact());
        assert!(!post.has_price());
        assert!(!post.has_brand());
        assert!(!post.has_location());
        assert_eq!(post.reactions(), 0);

        assert_eq!(group.posts[1].keywords[0], KeywordTag::default());
        assert!(response.groups[2].posts.is_empty());
    }

    #[test]
    fn test_search_query_normalization() {
        let query = SearchQuery::new("  leo  ", Some("  "));
        assert_eq!(query.term, "leo");
        assert_eq!(query.category, None);
        assert!(!query.is_empty());
        assert!(SearchQuery::new("   ", None).is_empty());
    }
}
