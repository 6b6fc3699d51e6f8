// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Small HTML helpers used by button, modal and print rendering.

/// Escapes text for use in HTML content and attribute values.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Renders ` name="value"` with the value escaped.
pub fn attr(name: &str, value: &str) -> String {
    format!(" {}=\"{}\"", name, escape(value))
}

/// Renders ` name` when `enabled` is set.
pub fn bool_attr(name: &str, enabled: bool) -> String {
    if enabled {
        format!(" {}", name)
    } else {
        String::new()
    }
}

/// Builds a complete minimal HTML document.
///
/// Used for isolated print frames: doctype, charset, title, optional CSS and
/// the given body markup.
pub fn document(title: &str, css: Option<&str>, body: &str) -> String {
    let style = match css {
        Some(css) if !css.trim().is_empty() => format!("    <style>{}</style>\n", css),
        _ => String::new(),
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n    <title>{}</title>\n{}</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        style,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_attr() {
        assert_eq!(attr("data-x", "a\"b"), " data-x=\"a&quot;b\"");
        assert_eq!(bool_attr("required", true), " required");
        assert_eq!(bool_attr("required", false), "");
    }

    #[test]
    fn test_document() {
        let doc = document("Invoice <1>", Some("body { margin: 0 }"), "<p>Hi</p>");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<meta charset=\"UTF-8\">"));
        assert!(doc.contains("<title>Invoice &lt;1&gt;</title>"));
        assert!(doc.contains("<style>body { margin: 0 }</style>"));
        assert!(doc.contains("<p>Hi</p>"));

        let plain = document("T", None, "");
        assert!(!plain.contains("<style>"));
    }
}
