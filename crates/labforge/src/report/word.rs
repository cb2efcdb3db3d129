//! Word (.docx) report rendering via docx-rs.

use std::fs::File;
use std::path::Path;

use docx_rs::{
    AlignmentType, Docx, Paragraph, Pic, Run, Table, TableCell, TableRow,
};

use super::resolver::{ResolvedSection, SectionBody};
use super::ReportMeta;
use crate::error::{LabForgeError, Result};

/// EMU per pixel at 96 dpi.
const EMU_PER_PX: u32 = 9525;

/// Inline chart width in pixels.
const CHART_WIDTH_PX: u32 = 560;

/// Build the docx document for a report.
pub fn build(meta: &ReportMeta, sections: &[ResolvedSection]) -> Result<Docx> {
    let mut docx = Docx::new();

    // Title
    docx = docx.add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_text(meta.title.as_str()).size(36).bold())
            .align(AlignmentType::Center),
    );

    // Meta line
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
    docx = docx.add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_text(format!(
                "Author: {}    Group: {}    Date: {}",
                author, group, meta.date
            )))
            .align(AlignmentType::Center),
    );

    for section in sections {
        docx = docx.add_paragraph(
            Paragraph::new().add_run(Run::new().add_text(section.title.as_str()).size(28).bold()),
        );

        for chart in &section.charts {
            docx = add_chart(docx, &chart.png)?;
            docx = docx.add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(chart.title.as_str()).size(18))
                    .align(AlignmentType::Center),
            );
        }

        docx = match &section.body {
            SectionBody::Text(text) | SectionBody::Placeholder(text) => {
                docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(text.as_str())))
            }
            SectionBody::StatsTable(table) => {
                let mut d = docx.add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text(format!("Shape: {}", table.shape_line))),
                );

                let mut rows = vec![table_row(&table.headers, true)];
                for row in &table.rows {
                    rows.push(table_row(row, false));
                }
                d = d.add_table(Table::new(rows));

                for line in &table.summary_lines {
                    d = d.add_paragraph(
                        Paragraph::new().add_run(Run::new().add_text(line.as_str()).size(18)),
                    );
                }
                d
            }
        };
    }

    Ok(docx)
}

/// Render and save the document.
pub fn render_to_file(meta: &ReportMeta, sections: &[ResolvedSection], path: &Path) -> Result<()> {
    let docx = build(meta, sections)?;

    let file = File::create(path).map_err(|e| LabForgeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    docx.build()
        .pack(file)
        .map_err(|e| LabForgeError::Render(format!("Failed to write docx: {}", e)))?;

    Ok(())
}

fn table_row(cells: &[String], bold: bool) -> TableRow {
    TableRow::new(
        cells
            .iter()
            .map(|text| {
                let run = if bold {
                    Run::new().add_text(text.as_str()).bold()
                } else {
                    Run::new().add_text(text.as_str())
                };
                TableCell::new().add_paragraph(Paragraph::new().add_run(run))
            })
            .collect(),
    )
}

/// Embed a chart PNG at a fixed width, preserving aspect ratio.
fn add_chart(docx: Docx, png: &[u8]) -> Result<Docx> {
    let img = image::load_from_memory(png)
        .map_err(|e| LabForgeError::Render(format!("Failed to decode chart image: {}", e)))?;

    let height_px = (img.height() as f64 * (CHART_WIDTH_PX as f64 / img.width() as f64)) as u32;
    let pic = Pic::new(png).size(CHART_WIDTH_PX * EMU_PER_PX, height_px * EMU_PER_PX);

    Ok(docx.add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_image(pic))
            .align(AlignmentType::Center),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::resolver::{ContentSource, StatsTable};

    fn meta() -> ReportMeta {
        ReportMeta {
            title: "Ohm's Law".to_string(),
            author: String::new(),
            group: String::new(),
            date: "2026-02-09".to_string(),
            template_display_name: "Physics Lab Report".to_string(),
            generated_at: "2026-02-09 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_build_with_stats_table() {
        let sections = vec![ResolvedSection {
            name: "data_processing".to_string(),
            title: "5. Data Processing".to_string(),
            required: true,
            charts: vec![],
            body: SectionBody::StatsTable(StatsTable {
                shape_line: "5 rows × 2 columns".to_string(),
                headers: vec![
                    "Column".into(),
                    "Mean".into(),
                    "Std Dev".into(),
                    "CV (%)".into(),
                ],
                rows: vec![vec![
                    "voltage".into(),
                    "3.0000".into(),
                    "1.5811".into(),
                    "52.70".into(),
                ]],
                summary_lines: vec!["voltage: mean=3.0000, std=1.5811, range=[1, 5]".into()],
            }),
            source: ContentSource::Statistics,
        }];

        // Building must succeed; format-level checks happen in integration tests.
        assert!(build(&meta(), &sections).is_ok());
    }
}
