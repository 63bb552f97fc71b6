//! Minimal HTML helpers shared by the storefront pages and the dashboard.

use std::fmt::Write;

/// Escape text for safe inclusion in element content or quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap a body fragment in a complete document. `head_extra` is inserted
/// verbatim and must already be trusted markup.
pub fn page(title: &str, head_extra: &str, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 512);
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n{}\n<style>\
         body{{font-family:sans-serif;margin:2rem;color:#222}}\
         table{{border-collapse:collapse}}\
         th,td{{padding:.3rem .8rem;border-bottom:1px solid #ddd;text-align:right}}\
         th:first-child,td:first-child{{text-align:left}}\
         .empty{{color:#888;font-style:italic}}\
         </style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        head_extra,
        body
    );
    out
}
