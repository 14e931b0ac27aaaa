//! Generated index of discovered pages.

use crate::discovery::Discovery;
use crate::utils::html::{escape, escape_attr};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped in a relative link; `/` is kept as separator.
const LINK: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub fn render(discovery: &Discovery) -> String {
    let mut items = String::new();
    for entry in &discovery.entries {
        let href = utf8_percent_encode(&entry.relative_path, LINK).to_string();
        items.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>",
            escape_attr(&href),
            escape(&entry.relative_path)
        ));
    }

    let list = if items.is_empty() {
        "<p>No pages found.</p>".to_string()
    } else {
        format!("<ul>{items}</ul>")
    };

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Pages</title></head>\
         <body><h1>Pages</h1>{list}<p><a href=\"/__routes\">Route table</a></p></body></html>"
    )
}
