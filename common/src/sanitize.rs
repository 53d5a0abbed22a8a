//! Sanitization applied to a creation payload before it is persisted.
//!
//! [`sanitize`] is pure: it borrows the caller's payload and returns a new
//! [`NewEvent`] with markup stripped from free text, a derived slug, and
//! identity/timestamps filled in when absent.

use chrono::{DateTime, SubsecRound, Utc};
use scraper::Html;
use uuid::Uuid;

use crate::models::{CreateEventData, NewEvent};

/// Maximum length of a derived slug
pub const MAX_SLUG_LEN: usize = 100;

/// Sanitize a payload using the current wall-clock time for absent timestamps.
pub fn sanitize(raw: &CreateEventData) -> NewEvent {
    sanitize_at(raw, Utc::now())
}

/// Sanitize a payload with an explicit clock reading.
///
/// `now` is truncated to microseconds, the precision Postgres keeps for
/// `timestamptz`, so the returned value equals what the store will hold.
pub fn sanitize_at(raw: &CreateEventData, now: DateTime<Utc>) -> NewEvent {
    let id = raw.id.unwrap_or_else(Uuid::new_v4);
    let title_text = markup_text(&raw.title);
    let description = strip_markup(&raw.description);
    let tags = raw.tags.iter().map(|tag| strip_markup(tag)).collect();

    let slug = slugify(raw.slug.as_deref().unwrap_or(&title_text));
    let slug = if slug.is_empty() { id.to_string() } else { slug };

    let created_at = raw.created_at.unwrap_or_else(|| now.trunc_subsecs(6));
    let updated_at = raw.updated_at.unwrap_or(created_at);

    NewEvent {
        id,
        location: raw.location,
        address: raw.address.clone(),
        locale: raw.locale.clone(),
        title: escape_text(&title_text),
        description,
        slug,
        tags,
        publisher_id: raw.publisher_id,
        created_at,
        updated_at,
    }
}

/// Remove every tag, keeping only text content.
///
/// Entities are decoded while parsing and `&`, `<`, `>` are escaped again
/// on the way out, so the result never contains markup and a second pass
/// returns it unchanged. Script and style bodies are dropped.
pub fn strip_markup(input: &str) -> String {
    escape_text(&markup_text(input))
}

/// Decoded text content of an HTML fragment
fn markup_text(input: &str) -> String {
    if !input.contains(['<', '>', '&']) {
        return input.to_string();
    }
    let fragment = Html::parse_fragment(input);
    fragment
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(|p| p.value().as_element().map(|e| e.name()));
            match parent {
                Some("script" | "style") => None,
                _ => Some(&**text),
            }
        })
        .collect()
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Derive a URL-safe slug: ASCII transliteration, lowercase alphanumerics,
/// single `-` separators, at most [`MAX_SLUG_LEN`] characters.
pub fn slugify(input: &str) -> String {
    let ascii = deunicode::deunicode(input);
    let mut slug = String::with_capacity(ascii.len());
    let mut last_was_dash = false;

    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if !slug.is_empty() && !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}
