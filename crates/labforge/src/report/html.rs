//! Self-contained HTML report rendering.

use super::resolver::{ResolvedSection, SectionBody};
use super::ReportMeta;

/// Escape user-supplied text for safe HTML embedding.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the full HTML document.
///
/// Charts are embedded inline as base64 data URIs, so the artifact has no
/// external file dependencies.
pub fn render(meta: &ReportMeta, sections: &[ResolvedSection]) -> String {
    let mut sections_html = String::new();
    for section in sections {
        sections_html.push_str(&render_section(section));
    }

    let author = if meta.author.is_empty() {
        "Anonymous"
    } else {
        &meta.author
    };
    let group = if meta.group.is_empty() {
        "Unassigned"
    } else {
        &meta.group
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Lab Report</title>
    <style>
        body {{
            font-family: 'Helvetica Neue', Arial, sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            line-height: 1.6;
            color: #333;
        }}
        h1 {{
            text-align: center;
            color: #2c3e50;
            border-bottom: 3px solid #3498db;
            padding-bottom: 10px;
        }}
        .meta {{
            text-align: center;
            color: #666;
            margin-bottom: 30px;
        }}
        section {{ margin: 30px 0; }}
        h2 {{
            color: #2980b9;
            border-left: 4px solid #3498db;
            padding-left: 10px;
        }}
        figure {{
            text-align: center;
            margin: 20px 0;
            background: #f8f9fa;
            padding: 15px;
            border-radius: 8px;
        }}
        img {{ max-width: 100%; height: auto; }}
        figcaption {{
            color: #666;
            font-size: 0.9em;
            margin-top: 10px;
        }}
        table {{
            width: 100%;
            border-collapse: collapse;
            margin: 15px 0;
        }}
        th, td {{
            border: 1px solid #ddd;
            padding: 10px;
            text-align: center;
        }}
        th {{ background: #3498db; color: white; }}
        .stats {{
            background: #ecf0f1;
            padding: 15px;
            border-radius: 8px;
            margin: 10px 0;
        }}
        .placeholder {{ color: #999; }}
    </style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <div class="meta">
            <p><strong>Author</strong>: {author} |
               <strong>Group</strong>: {group} |
               <strong>Date</strong>: {date}</p>
            <p><em>Template: {template}</em></p>
        </div>
    </header>

    <main>
{sections}
    </main>

    <footer>
        <hr>
        <p style="text-align: center; color: #999;">
            Generated: {generated_at}
        </p>
    </footer>
</body>
</html>
"#,
        title = escape(&meta.title),
        author = escape(author),
        group = escape(group),
        date = escape(&meta.date),
        template = escape(&meta.template_display_name),
        sections = sections_html,
        generated_at = escape(&meta.generated_at),
    )
}

fn render_section(section: &ResolvedSection) -> String {
    let mut inner = String::new();

    for chart in &section.charts {
        inner.push_str(&format!(
            r#"            <figure>
                <img src="{src}" alt="{alt}" />
                <figcaption>{caption}</figcaption>
            </figure>
"#,
            src = chart.data_uri,
            alt = escape(&chart.title),
            caption = escape(&chart.title),
        ));
    }

    inner.push_str(&render_body(&section.body));

    format!(
        r#"        <section id="{name}">
            <h2>{title}</h2>
{inner}        </section>
"#,
        name = escape(&section.name),
        title = escape(&section.title),
        inner = inner,
    )
}

fn render_body(body: &SectionBody) -> String {
    match body {
        SectionBody::Text(text) => {
            format!("            <p>{}</p>\n", escape(text).replace('\n', "<br>"))
        }
        SectionBody::Placeholder(text) => format!(
            "            <p class=\"placeholder\"><em>{}</em></p>\n",
            escape(text)
        ),
        SectionBody::StatsTable(table) => {
            let mut html = String::new();
            html.push_str(&format!(
                "            <p>Shape: {}</p>\n",
                escape(&table.shape_line)
            ));

            html.push_str("            <table><thead><tr>");
            for header in &table.headers {
                html.push_str(&format!("<th>{}</th>", escape(header)));
            }
            html.push_str("</tr></thead><tbody>\n");
            for row in &table.rows {
                html.push_str("            <tr>");
                for cell in row {
                    html.push_str(&format!("<td>{}</td>", escape(cell)));
                }
                html.push_str("</tr>\n");
            }
            html.push_str("            </tbody></table>\n");

            if !table.summary_lines.is_empty() {
                html.push_str("            <div class=\"stats\"><strong>Summary:</strong>");
                for line in &table.summary_lines {
                    html.push_str(&format!("<br>{}", escape(line)));
                }
                html.push_str("</div>\n");
            }
            html
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::resolver::ContentSource;

    fn meta() -> ReportMeta {
        ReportMeta {
            title: "Ohm's Law".to_string(),
            author: "Ada".to_string(),
            group: "Group 3".to_string(),
            date: "2026-02-09".to_string(),
            template_display_name: "Physics Lab Report".to_string(),
            generated_at: "2026-02-09 10:00:00".to_string(),
        }
    }

    fn text_section(name: &str, title: &str, text: &str) -> ResolvedSection {
        ResolvedSection {
            name: name.to_string(),
            title: title.to_string(),
            required: true,
            charts: vec![],
            body: SectionBody::Text(text.to_string()),
            source: ContentSource::Caller,
        }
    }

    #[test]
    fn test_sections_render_in_order() {
        let sections = vec![
            text_section("alpha", "1. Alpha", "a"),
            text_section("beta", "2. Beta", "b"),
        ];
        let html = render(&meta(), &sections);
        let alpha = html.find("1. Alpha").unwrap();
        let beta = html.find("2. Beta").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut m = meta();
        m.title = "<script>alert(1)</script>".to_string();
        let html = render(&m, &[]);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_placeholder_is_rendered_not_dropped() {
        let section = ResolvedSection {
            name: "conclusion".to_string(),
            title: "7. Conclusion".to_string(),
            required: true,
            charts: vec![],
            body: SectionBody::Placeholder("Please provide content for \"7. Conclusion\".".into()),
            source: ContentSource::Placeholder,
        };
        let html = render(&meta(), &[section]);
        assert!(html.contains("Please provide content for"));
    }
}
