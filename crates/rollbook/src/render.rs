//! Text rendering of records, forms and stats for the terminal.

use std::fmt::Write as _;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::form::{FormController, FormErrors, FormMode};
use crate::record::StudentRecord;
use crate::store::RecordStats;

const HEADERS: [&str; 5] = ["ID", "Name", "Age", "Grade", "Status"];

/// Render `records` in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn records(records: &[&StudentRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Plain => Ok(plain(records)),
        OutputFormat::Table => Ok(table(records)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
    }
}

/// One line per record.
#[must_use]
pub fn plain(records: &[&StudentRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "{}", line(record));
    }
    out
}

/// A single record on one line.
#[must_use]
pub fn line(record: &StudentRecord) -> String {
    format!(
        "#{} {} (age {}, grade {}, {})",
        record.id,
        record.name,
        record.age,
        record.grade,
        record.status_label()
    )
}

/// Aligned table with a header row. Shows a placeholder when empty.
#[must_use]
pub fn table(records: &[&StudentRecord]) -> String {
    if records.is_empty() {
        return "No students found.\n".to_string();
    }

    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.id.to_string(),
                r.name.clone(),
                r.age.to_string(),
                r.grade.to_string(),
                r.status_label().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", padded.join("  ").trim_end());
}

/// Field-scoped validation messages, one per line.
#[must_use]
pub fn form_errors(errors: &FormErrors) -> String {
    let mut out = String::new();
    if let Some(msg) = &errors.name {
        let _ = writeln!(out, "  name: {msg}");
    }
    if let Some(msg) = &errors.age {
        let _ = writeln!(out, "  age: {msg}");
    }
    out
}

/// The current draft, mode and any errors.
#[must_use]
pub fn form(form: &FormController) -> String {
    let draft = form.draft();
    let mut out = String::new();
    match form.mode() {
        FormMode::Create => out.push_str("New student\n"),
        FormMode::Edit { id } => {
            let _ = writeln!(out, "Editing student #{id}");
        }
    }
    let _ = writeln!(out, "  name:   {}", draft.name);
    let _ = writeln!(out, "  age:    {}", draft.age);
    let _ = writeln!(out, "  grade:  {}", draft.grade);
    let _ = writeln!(out, "  status: {}", draft.status_label());
    out.push_str(&form_errors(form.errors()));
    let _ = writeln!(
        out,
        "[{}{}]",
        form.submit_label(),
        if form.can_submit() { "" } else { " - incomplete" }
    );
    out
}

/// Human-readable stats block.
#[must_use]
pub fn stats(stats: &RecordStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Students:  {}", stats.total);
    let _ = writeln!(out, "Active:    {}", stats.active);
    let _ = writeln!(out, "Inactive:  {}", stats.inactive);
    let grades: Vec<String> = stats
        .by_grade
        .iter()
        .map(|g| format!("{}={}", g.grade, g.count))
        .collect();
    let _ = writeln!(out, "Grades:    {}", grades.join(" "));
    match stats.last_saved {
        Some(at) => {
            let _ = writeln!(out, "Saved:     {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        None => out.push_str("Saved:     never\n"),
    }
    out
}

/// Location and size of the database file.
#[must_use]
pub fn database(path: &Path, size_bytes: u64) -> String {
    format!("Database:  {} ({} bytes)\n", path.display(), size_bytes)
}
