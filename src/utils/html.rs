//! HTML utility functions.
//!
//! - `escape()`, `escape_attr()` - HTML entity escaping
//! - `minify()` - conservative whitespace/comment stripping for bundled pages

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape HTML attribute values.
///
/// Identical to `escape()` but semantically indicates attribute context.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape(s)
}

// =============================================================================
// Minification
// =============================================================================

/// Elements whose whitespace is significant; documents containing them are
/// left untouched apart from comment removal.
const WHITESPACE_ELEMENTS: [&str; 2] = ["<pre", "<textarea"];

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Keeps conditional comments (`<!--[if IE]>`) intact
    RE.get_or_init(|| Regex::new(r"(?s)<!--[^\[].*?-->").unwrap())
}

fn between_tags_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r">\s+<").unwrap())
}

/// Check if tag is a block-level or document-structure element.
///
/// Whitespace next to these never renders, so it can be dropped; between
/// two inline elements it is a visible space.
#[inline]
fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "!doctype"
            | "address"
            | "article"
            | "aside"
            | "base"
            | "blockquote"
            | "body"
            | "canvas"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "head"
            | "header"
            | "hgroup"
            | "hr"
            | "html"
            | "li"
            | "link"
            | "main"
            | "meta"
            | "nav"
            | "noscript"
            | "ol"
            | "p"
            | "script"
            | "section"
            | "style"
            | "table"
            | "tbody"
            | "td"
            | "tfoot"
            | "th"
            | "thead"
            | "title"
            | "tr"
            | "ul"
            | "video"
    )
}

/// Lowercase name of the tag whose text starts right after `<`.
fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('/')
        .split(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Minify an HTML document.
///
/// Strips comments. Whitespace between tags is dropped next to block-level
/// elements and collapsed to one space between inline ones. Whitespace
/// inside text runs is preserved.
pub fn minify(source: &str) -> String {
    let stripped = comment_re().replace_all(source, "");
    let lower = stripped.to_ascii_lowercase();
    let text = stripped.trim();
    if WHITESPACE_ELEMENTS.iter().any(|tag| lower.contains(tag)) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for gap in between_tags_re().find_iter(text) {
        let before = &text[..gap.start()];
        let prev = before.rfind('<').map_or("", |i| &before[i + 1..]);
        let next = &text[gap.end()..];

        out.push_str(&text[last..=gap.start()]);
        if !is_block_element(&tag_name(prev)) && !is_block_element(&tag_name(next)) {
            out.push(' ');
        }
        // Resume at the `<` that ended the gap
        last = gap.end() - 1;
    }
    out.push_str(&text[last..]);
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain() {
        assert_eq!(escape("hello world"), "hello world");
    }

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(escape("<script>"), "&lt;script&gt;");
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(escape("it's"), "it&#39;s");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("normal"), "normal");
        assert_eq!(escape_attr("a\"b&c"), "a&quot;b&amp;c");
    }

    #[test]
    fn test_minify_collapses_between_tags() {
        let html = "<html>\n  <body>\n    <!-- nav -->\n    <p>Hello  world</p>\n  </body>\n</html>\n";
        assert_eq!(minify(html), "<html><body><p>Hello  world</p></body></html>");
    }

    #[test]
    fn test_minify_keeps_space_between_inline_elements() {
        assert_eq!(
            minify("<p>Hello <b>big</b> <i>world</i></p>"),
            "<p>Hello <b>big</b> <i>world</i></p>"
        );
        assert_eq!(
            minify("<div>\n  <a href=\"/\">home</a>\n  <a href=\"/x\">x</a>\n</div>"),
            "<div><a href=\"/\">home</a> <a href=\"/x\">x</a></div>"
        );
    }

    #[test]
    fn test_minify_keeps_pre_whitespace() {
        let html = "<body>\n<pre>\n  a\n   b\n</pre>\n</body>";
        assert_eq!(minify(html), html);
    }

    #[test]
    fn test_minify_keeps_conditional_comments() {
        let html = "<!--[if IE]><p>old</p><![endif]-->";
        assert_eq!(minify(html), html);
    }
}
