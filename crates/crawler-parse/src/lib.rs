//! Pure parsing utilities: HTML cleaning, permissive date parsing, and
//! CSS-selector extraction.
//!
//! Grounded on `riptide-extraction::html_parser` (scraper-based HTML
//! traversal) and on the original `Parser` class's exact failure-handling
//! semantics: `clean_text` falls back to the raw input on any parse failure
//! rather than propagating an error, and `parse_date` returns `None` rather
//! than failing on an empty or unparseable string.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::{Html, Selector};

/// Parse HTML, drop `<script>`/`<style>` subtrees, and return the body text
/// with whitespace collapsed. Never fails: malformed HTML yields whatever
/// scraper's lenient parser can salvage, and any other failure mode falls
/// back to returning the original input untouched.
pub fn clean_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(noise_selector) = Selector::parse("script, style") else {
        return html.to_string();
    };
    let Ok(body_selector) = Selector::parse("body") else {
        return html.to_string();
    };

    let noisy_text_nodes: std::collections::HashSet<_> = document
        .select(&noise_selector)
        .flat_map(|el| el.text().collect::<Vec<_>>())
        .collect();

    let root = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    let text = root
        .text()
        .filter(|t| !noisy_text_nodes.contains(t))
        .collect::<Vec<_>>()
        .join(" ");

    collapse_whitespace(&text)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Attempt permissive date parsing across a handful of common feed/article
/// formats. Returns `None` on an empty string or total parse failure.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0)?, Utc));
    }

    None
}

/// First CSS match, trimmed; `None` if there's no match or the trimmed text
/// is empty. XPath is accepted for interface parity with the original but is
/// not evaluated — no XPath engine is part of this implementation's
/// dependency stack, so a CSS selector must be supplied to extract anything.
pub fn extract_text(html: &str, css_selector: Option<&str>, _xpath: Option<&str>) -> Option<String> {
    let css_selector = css_selector?;
    let document = Html::parse_document(html);
    let selector = Selector::parse(css_selector).ok()?;
    let text = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// All CSS matches, trimmed, filtered to non-empty.
pub fn extract_all_text(html: &str, css_selector: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(css_selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
