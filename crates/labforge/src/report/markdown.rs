//! Markdown export derived from the HTML rendering.
//!
//! This is a lossy, best-effort transform: headings and paragraph text
//! survive, tables flatten to plain cell text, and inline images are dropped
//! (their captions remain). Markdown output is a convenience export, not a
//! canonical format.

use once_cell::sync::Lazy;
use regex::Regex;

static HEAD_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<head>.*?</head>").expect("static pattern"));
static H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"<h1[^>]*>(.*?)</h1>").expect("static pattern"));
static H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"<h2[^>]*>(.*?)</h2>").expect("static pattern"));
static TABLE_CELL_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</t[hd]>").expect("static pattern"));
static TABLE_ROW_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"</tr>").expect("static pattern"));
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br\s*/?>").expect("static pattern"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("static pattern"));
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("static pattern"));

/// Convert a rendered HTML report to Markdown.
pub fn from_html(html: &str) -> String {
    let md = HEAD_BLOCK.replace_all(html, "");
    let md = H1.replace_all(&md, "# $1\n");
    let md = H2.replace_all(&md, "\n## $1\n");
    let md = TABLE_CELL_END.replace_all(&md, " | ");
    let md = TABLE_ROW_END.replace_all(&md, "\n");
    let md = LINE_BREAK.replace_all(&md, "\n");
    let md = ANY_TAG.replace_all(&md, "");
    let md = md.replace("&nbsp;", " ");

    let md = unescape_entities(&md);

    // Trim trailing whitespace per line, then collapse blank runs.
    let md: String = md
        .lines()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    let md = EXCESS_NEWLINES.replace_all(&md, "\n\n");

    md.trim().to_string()
}

/// Reverse the entity escaping applied by the HTML renderer.
fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_convert() {
        let html = "<head><style>th { color: red; }</style></head>\
                    <h1>Report</h1><section><h2>1. Objective</h2><p>Text</p></section>";
        let md = from_html(html);
        assert!(md.contains("# Report"));
        assert!(md.contains("## 1. Objective"));
        assert!(md.contains("Text"));
        // CSS from the head block must not leak into the export.
        assert!(!md.contains("color: red"));
    }

    #[test]
    fn test_tables_flatten_to_cells() {
        let html = "<table><thead><tr><th>Column</th><th>Mean</th></tr></thead>\
                    <tbody><tr><td>voltage</td><td>3.0000</td></tr></tbody></table>";
        let md = from_html(html);
        assert!(md.contains("Column | Mean"));
        assert!(md.contains("voltage | 3.0000"));
    }

    #[test]
    fn test_images_drop_but_captions_remain() {
        let html = "<figure><img src=\"data:image/png;base64,AAAA\" alt=\"c\" />\
                    <figcaption>current vs voltage</figcaption></figure>";
        let md = from_html(html);
        assert!(!md.contains("base64"));
        assert!(md.contains("current vs voltage"));
    }

    #[test]
    fn test_entities_unescape() {
        let md = from_html("<p>Please provide content for &quot;7. Conclusion&quot;.</p>");
        assert!(md.contains("\"7. Conclusion\""));
    }
}
