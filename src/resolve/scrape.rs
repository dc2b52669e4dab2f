//! Substring scraping helpers.
//!
//! Login pages are frequently malformed, so values are located with plain
//! left-to-right substring search instead of a full HTML/JSON parse. Every lookup
//! is first-match; a missing token yields `None`, never an error.

use std::sync::LazyLock;

use scraper::{Html, Selector};

static HOLDER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("input").unwrap_or_else(|e| {
        panic!("Failed to parse CSS selector 'input': {e}. This is a programming error.")
    })
});

/// Returns the value of the first `key="…"` token.
///
/// The value runs up to the next double quote; a token without a closing quote
/// counts as absent.
pub fn attribute_value<'a>(haystack: &'a str, key: &str) -> Option<&'a str> {
    let token = format!("{key}=\"");
    let index = haystack.find(&token)?;
    log::trace!("Found index: {} for key {}", index, key);
    let offset = index + token.len();
    let end = haystack[offset..].find('"')?;
    Some(&haystack[offset..offset + end])
}

/// Returns the `value="…"` attribute of the element containing `"param_key"`.
///
/// The quoted key is located first; the value attribute only belongs to the same
/// element if it starts before the next `>` after the key. Otherwise the
/// parameter is treated as absent.
pub fn element_value<'a>(haystack: &'a str, param_key: &str) -> Option<&'a str> {
    let index = haystack.find(&format!("\"{param_key}\""))?;
    let element_end = index + haystack[index..].find('>')?;
    const VALUE_KEY: &str = "value=\"";
    let value_start = index + haystack[index..].find(VALUE_KEY)?;
    if value_start >= element_end {
        return None;
    }
    let offset = value_start + VALUE_KEY.len();
    let end = haystack[offset..].find('"')?;
    Some(&haystack[offset..offset + end])
}

/// Decodes the hex entities identity providers use to escape URLs in attributes.
pub fn decode_url_entities(url: &str) -> String {
    url.replace("&#x3a;", ":").replace("&#x2f;", "/")
}

/// Decodes every HTML character reference in an attribute value.
///
/// The value is re-embedded in an attribute and handed to the HTML parser, which
/// applies the full named and numeric entity tables.
pub fn unescape_html(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    let fragment = Html::parse_fragment(&format!("<input value=\"{value}\">"));
    fragment
        .select(&HOLDER_SELECTOR)
        .next()
        .and_then(|element| element.value().attr("value"))
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}
