//! Section content resolution.
//!
//! Turns a template plus every available content source into an ordered,
//! format-agnostic section list. All renderers consume the same resolved
//! structure, which is what guarantees cross-format parity: same sections,
//! same order, same text, same chart placement.

use indexmap::IndexMap;

use crate::chart::ChartArtifact;
use crate::error::{LabForgeError, Result};
use crate::stats::DataSummary;
use crate::template::ReportTemplate;

/// Where a section's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    Statistics,
    Caller,
    Ai,
    Placeholder,
}

/// Statistics rendered as a format-agnostic table.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsTable {
    /// E.g. "5 rows × 2 columns".
    pub shape_line: String,
    pub headers: Vec<String>,
    /// One row per numeric column.
    pub rows: Vec<Vec<String>>,
    /// Per-column one-line summaries rendered under the table.
    pub summary_lines: Vec<String>,
}

/// Body of a resolved section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    StatsTable(StatsTable),
    Text(String),
    Placeholder(String),
}

impl SectionBody {
    /// The textual content, for formats and tests that only care about text.
    pub fn text(&self) -> &str {
        match self {
            SectionBody::Text(t) | SectionBody::Placeholder(t) => t,
            SectionBody::StatsTable(_) => "",
        }
    }
}

/// A section with bound content, ready for any renderer.
#[derive(Debug, Clone)]
pub struct ResolvedSection {
    pub name: String,
    pub title: String,
    pub required: bool,
    /// Charts bound to this section, in binding order. Rendered before the body.
    pub charts: Vec<ChartArtifact>,
    pub body: SectionBody,
    pub source: ContentSource,
}

/// Resolve content for every section of a template, in template order.
///
/// Priority per section: designated statistics section, then caller-supplied
/// text, then AI text (when enabled), then a placeholder naming the section.
/// Caller content or chart bindings that reference a section the template
/// does not define fail with a diagnosable error instead of being dropped.
pub fn resolve(
    template: &ReportTemplate,
    summary: Option<&DataSummary>,
    charts: &[ChartArtifact],
    caller_content: &IndexMap<String, String>,
    ai_content: &IndexMap<String, String>,
    ai_enabled: bool,
) -> Result<Vec<ResolvedSection>> {
    for key in caller_content.keys() {
        if template.section(key).is_none() {
            return Err(LabForgeError::Render(format!(
                "Content bound to unknown section '{}' (template '{}')",
                key, template.name
            )));
        }
    }
    for chart in charts {
        if template.section(&chart.section).is_none() {
            return Err(LabForgeError::Render(format!(
                "Chart bound to unknown section '{}' (template '{}')",
                chart.section, template.name
            )));
        }
    }

    let mut resolved = Vec::with_capacity(template.sections.len());

    for section in &template.sections {
        let (body, source) = if section.name == template.data_section && summary.is_some() {
            (
                SectionBody::StatsTable(stats_table(summary.expect("checked above"))),
                ContentSource::Statistics,
            )
        } else if let Some(text) = caller_content.get(&section.name) {
            (SectionBody::Text(text.clone()), ContentSource::Caller)
        } else if ai_enabled
            && ai_content
                .get(&section.name)
                .is_some_and(|t| !t.trim().is_empty())
        {
            (
                SectionBody::Text(ai_content[&section.name].clone()),
                ContentSource::Ai,
            )
        } else {
            (
                SectionBody::Placeholder(format!(
                    "Please provide content for \"{}\".",
                    section.title
                )),
                ContentSource::Placeholder,
            )
        };

        let section_charts: Vec<ChartArtifact> = charts
            .iter()
            .filter(|c| c.section == section.name)
            .cloned()
            .collect();

        resolved.push(ResolvedSection {
            name: section.name.clone(),
            title: section.title.clone(),
            required: section.required,
            charts: section_charts,
            body,
            source,
        });
    }

    Ok(resolved)
}

fn stats_table(summary: &DataSummary) -> StatsTable {
    let shape_line = format!(
        "{} rows × {} columns",
        summary.shape.rows, summary.shape.columns
    );

    let headers = vec![
        "Column".to_string(),
        "Mean".to_string(),
        "Std Dev".to_string(),
        "CV (%)".to_string(),
    ];

    let mut rows = Vec::new();
    let mut summary_lines = Vec::new();

    for (name, stats) in &summary.statistics {
        let cv = match stats.cv {
            Some(cv) => format!("{:.2}", cv),
            None => "N/A".to_string(),
        };
        rows.push(vec![
            name.clone(),
            format!("{:.4}", stats.mean),
            format!("{:.4}", stats.std),
            cv,
        ]);
        summary_lines.push(format!(
            "{}: mean={:.4}, std={:.4}, range=[{}, {}]",
            name, stats.mean, stats.std, stats.min, stats.max
        ));
    }

    StatsTable {
        shape_line,
        headers,
        rows,
        summary_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Dataset;
    use crate::stats::summarize;
    use crate::template::TemplateRegistry;

    fn summary() -> DataSummary {
        let ds = Dataset::new(
            vec!["voltage".into(), "current".into()],
            vec![
                vec!["1".into(), "0.5".into()],
                vec!["2".into(), "1.0".into()],
                vec!["3".into(), "1.5".into()],
                vec!["4".into(), "2.0".into()],
                vec!["5".into(), "2.5".into()],
            ],
        )
        .unwrap();
        summarize(&ds)
    }

    #[test]
    fn test_sections_resolve_in_template_order() {
        let registry = TemplateRegistry::new();
        let template = registry.get("physics_basic");
        let resolved = resolve(
            template,
            Some(&summary()),
            &[],
            &IndexMap::new(),
            &IndexMap::new(),
            false,
        )
        .unwrap();

        let names: Vec<&str> = resolved.iter().map(|s| s.name.as_str()).collect();
        let expected: Vec<&str> = template.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_data_section_gets_statistics() {
        let registry = TemplateRegistry::new();
        let template = registry.get("physics_basic");
        let resolved = resolve(
            template,
            Some(&summary()),
            &[],
            &IndexMap::new(),
            &IndexMap::new(),
            false,
        )
        .unwrap();

        let data = resolved
            .iter()
            .find(|s| s.name == "data_processing")
            .unwrap();
        assert_eq!(data.source, ContentSource::Statistics);
        match &data.body {
            SectionBody::StatsTable(table) => {
                assert_eq!(table.rows.len(), 2);
                assert_eq!(table.shape_line, "5 rows × 2 columns");
                assert!(table.summary_lines[0].contains("range=[1, 5]"));
            }
            other => panic!("expected stats table, got {:?}", other),
        }
    }

    #[test]
    fn test_caller_content_wins_over_ai() {
        let registry = TemplateRegistry::new();
        let template = registry.get("physics_basic");

        let mut caller = IndexMap::new();
        caller.insert("conclusion".to_string(), "Ohm's law holds.".to_string());
        let mut ai = IndexMap::new();
        ai.insert("conclusion".to_string(), "AI conclusion".to_string());

        let resolved = resolve(template, Some(&summary()), &[], &caller, &ai, true).unwrap();
        let conclusion = resolved.iter().find(|s| s.name == "conclusion").unwrap();
        assert_eq!(conclusion.source, ContentSource::Caller);
        assert_eq!(conclusion.body.text(), "Ohm's law holds.");
    }

    #[test]
    fn test_unbound_section_gets_placeholder_naming_it() {
        let registry = TemplateRegistry::new();
        let template = registry.get("physics_basic");
        let resolved = resolve(
            template,
            Some(&summary()),
            &[],
            &IndexMap::new(),
            &IndexMap::new(),
            false,
        )
        .unwrap();

        let conclusion = resolved.iter().find(|s| s.name == "conclusion").unwrap();
        assert_eq!(conclusion.source, ContentSource::Placeholder);
        assert!(conclusion.body.text().contains("Conclusion and Discussion"));
    }

    #[test]
    fn test_unknown_caller_section_fails() {
        let registry = TemplateRegistry::new();
        let template = registry.get("physics_basic");

        let mut caller = IndexMap::new();
        caller.insert("no_such_section".to_string(), "text".to_string());

        let err = resolve(
            template,
            Some(&summary()),
            &[],
            &caller,
            &IndexMap::new(),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no_such_section"));
    }

    #[test]
    fn test_ai_content_used_when_enabled() {
        let registry = TemplateRegistry::new();
        let template = registry.get("physics_basic");

        let mut ai = IndexMap::new();
        ai.insert("conclusion".to_string(), "AI conclusion".to_string());

        let resolved = resolve(
            template,
            Some(&summary()),
            &[],
            &IndexMap::new(),
            &ai,
            true,
        )
        .unwrap();
        let conclusion = resolved.iter().find(|s| s.name == "conclusion").unwrap();
        assert_eq!(conclusion.source, ContentSource::Ai);

        // Disabled AI falls back to the placeholder.
        let resolved = resolve(
            template,
            Some(&summary()),
            &[],
            &IndexMap::new(),
            &ai,
            false,
        )
        .unwrap();
        let conclusion = resolved.iter().find(|s| s.name == "conclusion").unwrap();
        assert_eq!(conclusion.source, ContentSource::Placeholder);
    }
}
