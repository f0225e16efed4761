//! Console table and CSV rendering of matched papers

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use pharmalit_pubmed::Paper;

use crate::config::OutputConfig;

pub const HEADERS: [&str; 6] = [
    "PubMed ID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

const LIST_SEPARATOR: &str = "; ";

/// Cut `s` to at most `max` characters, ending in "..." when shortened
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let head: String = s.chars().take(keep).collect();
    format!("{}...", head.trim_end())
}

/// First item plus "(+N more)"
pub fn format_list(items: &[String], max: usize) -> String {
    match items {
        [] => String::new(),
        [only] => truncate(only, max),
        [first, rest @ ..] => format!("{} (+{} more)", truncate(first, max), rest.len()),
    }
}

pub fn render_table(papers: &[Paper], layout: &OutputConfig) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(HEADERS.iter().map(|h| Cell::new(h).fg(Color::Cyan)));

    for paper in papers {
        table.add_row(vec![
            paper.pubmed_id.clone(),
            truncate(&paper.title, layout.title_width),
            paper.publication_date.clone(),
            format_list(&paper.non_academic_authors, layout.cell_width),
            format_list(&paper.company_affiliations, layout.cell_width),
            truncate(&paper.corresponding_email, layout.cell_width),
        ]);
    }
    table
}

fn csv_record(paper: &Paper) -> [String; 6] {
    [
        paper.pubmed_id.clone(),
        paper.title.clone(),
        paper.publication_date.clone(),
        paper.non_academic_authors.join(LIST_SEPARATOR),
        paper.company_affiliations.join(LIST_SEPARATOR),
        paper.corresponding_email.clone(),
    ]
}

/// Write all papers as CSV with a header row, overwriting `path`
pub fn write_csv(papers: &[Paper], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(HEADERS)?;
    for paper in papers {
        writer.write_record(csv_record(paper))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::debug!("Wrote {} rows to {}", papers.len(), path.display());
    Ok(())
}
