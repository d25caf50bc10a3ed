//! Plain-text rendering of dashboard state.

use crate::app::{App, LoadState};
use crate::stats::{completeness_score, DashboardStats};
use finder_core::Post;

pub const LOADING_TEXT: &str = "กำลังโหลดข้อมูล...";
pub const EMPTY_RESULT_TEXT: &str = "ไม่พบผลลัพธ์";
const EMPTY_RESULT_HINT: &str = "ลองปรับคำค้นหาหรือหมวดหมู่ใหม่";
const RULE: &str = "────────────────────────────────────────";

pub fn render(app: &App) -> String {
    match app.load_state() {
        LoadState::Loading => format!("{LOADING_TEXT}\n"),
        LoadState::Failed { message } => render_error(message),
        LoadState::Ready => render_results(app),
    }
}

pub fn render_error(message: &str) -> String {
    format!("⚠ {message}\n")
}

fn render_results(app: &App) -> String {
    let mut out = String::new();
    out.push_str("Distributor Finder\n");
    out.push_str(&render_stats(&app.stats()));

    let query = app.query();
    if !query.term.is_empty() {
        out.push_str(&format!("ค้นหา: \"{}\"", query.term));
        if let Some(category) = &query.category {
            out.push_str(&format!(" [{category}]"));
        }
        out.push('\n');
    } else if let Some(category) = &query.category {
        out.push_str(&format!("หมวดหมู่: {category}\n"));
    }
    if app.is_search_in_flight() {
        out.push_str("กำลังค้นหาเพิ่มเติม...\n");
    }
    out.push_str(RULE);
    out.push('\n');

    let visible = app.visible();
    if visible.is_empty() {
        out.push_str(&format!("{EMPTY_RESULT_TEXT}\n{EMPTY_RESULT_HINT}\n"));
        return out;
    }

    for post in visible {
        out.push_str(&render_card(post));
        out.push_str(RULE);
        out.push('\n');
    }
    out
}

pub fn render_stats(stats: &DashboardStats) -> String {
    format!(
        "ทั้งหมด {} | มีช่องทางติดต่อ {} | มีราคา {} | มีพื้นที่ {} | ความครบถ้วนเฉลี่ย {}%\n",
        stats.total,
        stats.with_contact,
        stats.with_price,
        stats.with_location,
        stats.avg_completeness
    )
}

pub fn render_engagement(post: &Post) -> String {
    format!("👍 {} · 💬 {}", post.reactions(), post.comments())
}

pub fn render_card(post: &Post) -> String {
    let mut out = format!("#{} {}", post.id, display_author(post));
    if let Some(group) = &post.group_name {
        out.push_str(&format!(" ({group})"));
    }
    out.push('\n');

    if let Some(profile) = non_empty(&post.author_profile_link) {
        out.push_str(&format!("  profile: {profile}\n"));
    }
    if let Some(link) = non_empty(&post.post_link) {
        out.push_str(&format!("  link: {link}\n"));
    }
    if !post.text.is_empty() {
        for line in post.text.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }
    if let Some(image) = non_empty(&post.image_url) {
        out.push_str(&format!("  image: {image}\n"));
    }
    if let Some(info) = &post.product_info {
        if !info.beer_brands.is_empty() {
            out.push_str(&format!("  brands: {}\n", info.beer_brands.join(", ")));
        }
        if !info.locations.is_empty() {
            out.push_str(&format!("  locations: {}\n", info.locations.join(", ")));
        }
    }
    out.push_str(&format!(
        "  {} · completeness {}%\n",
        render_engagement(post),
        completeness_score(post)
    ));
    out
}

fn display_author(post: &Post) -> &str {
    if post.author.trim().is_empty() {
        "ไม่ระบุชื่อ"
    } else {
        &post.author
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
