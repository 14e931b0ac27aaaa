//! Local script and stylesheet references inside a page.
//!
//! Only `<script src>` and `<link rel="stylesheet" href>` are considered.
//! Remote URLs (`https:`, `//cdn`, `data:`) and fragment links are left alone.

use regex::{Captures, Regex};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Script { module: bool },
    Stylesheet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub kind: RefKind,
    /// The attribute value as written.
    pub url: String,
}

impl AssetRef {
    /// URL without query string or fragment.
    pub fn path(&self) -> &str {
        self.url
            .split(['?', '#'])
            .next()
            .unwrap_or(&self.url)
    }
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(script|link)\b[^>]*>").unwrap())
}

fn attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\s([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+)"#).unwrap()
    })
}

fn scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").unwrap())
}

/// Whether a reference points at a file the bundler should pick up.
pub fn is_local_url(url: &str) -> bool {
    !url.is_empty() && !url.starts_with('#') && !url.starts_with("//") && !scheme_re().is_match(url)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}

/// Locate the reference inside a single tag: kind plus the byte range of
/// the attribute value (quotes included).
fn find_ref(tag_name: &str, tag: &str) -> Option<(RefKind, std::ops::Range<usize>, String)> {
    let mut target = None;
    let mut is_module = false;
    let mut is_stylesheet = false;

    let wanted = if tag_name.eq_ignore_ascii_case("script") {
        "src"
    } else {
        "href"
    };

    for caps in attr_re().captures_iter(tag) {
        let name = &caps[1];
        let value = caps.get(2)?;
        let raw = unquote(value.as_str());

        if name.eq_ignore_ascii_case(wanted) {
            target = Some((value.range(), raw.to_string()));
        } else if name.eq_ignore_ascii_case("type") {
            is_module = raw.trim().eq_ignore_ascii_case("module");
        } else if name.eq_ignore_ascii_case("rel") {
            is_stylesheet = raw
                .split_ascii_whitespace()
                .any(|r| r.eq_ignore_ascii_case("stylesheet"));
        }
    }

    let (range, url) = target?;
    let kind = if wanted == "src" {
        RefKind::Script { module: is_module }
    } else if is_stylesheet {
        RefKind::Stylesheet
    } else {
        return None;
    };
    is_local_url(&url).then_some((kind, range, url))
}

/// All local references in document order.
#[cfg(test)]
pub fn collect_refs(html: &str) -> Vec<AssetRef> {
    tag_re()
        .captures_iter(html)
        .filter_map(|caps| find_ref(&caps[1], &caps[0]))
        .map(|(kind, _, url)| AssetRef { kind, url })
        .collect()
}

/// Replace each local reference with whatever `rewrite` returns.
///
/// `None` leaves the tag untouched.
pub fn rewrite_refs<F>(html: &str, mut rewrite: F) -> String
where
    F: FnMut(&AssetRef) -> Option<String>,
{
    tag_re()
        .replace_all(html, |caps: &Captures| {
            let tag = &caps[0];
            let Some((kind, range, url)) = find_ref(&caps[1], tag) else {
                return tag.to_string();
            };
            match rewrite(&AssetRef { kind, url }) {
                Some(new_url) => format!("{}\"{}\"{}", &tag[..range.start], new_url, &tag[range.end..]),
                None => tag.to_string(),
            }
        })
        .into_owned()
}
