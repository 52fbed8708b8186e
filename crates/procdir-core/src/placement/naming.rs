use chrono::{NaiveDate, NaiveDateTime};

use crate::model::ProcessRecord;

const FORBIDDEN: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Strip characters that are not valid in Windows file names, then trim.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !FORBIDDEN.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Split `name` into stem and extension (with its dot). Dotfiles have no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// `report.pdf` -> `report_20240315_142501.pdf`. Second-level resolution.
pub fn timestamped_name(name: &str, now: NaiveDateTime) -> String {
    let (stem, ext) = split_extension(name);
    format!("{}_{}{}", stem, now.format("%Y%m%d_%H%M%S"), ext)
}

/// `YYYY-MM-DD` becomes `DD-MM-YYYY`; anything else is kept as typed.
pub fn format_due_date(date: &str) -> String {
    let date = date.trim();
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%d-%m-%Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Standard name for an expense document filed under a process:
/// `<client> - ER<number> - <expense> - <reference> - <due date><ext>`.
pub fn expense_file_name(
    record: &ProcessRecord,
    expense_name: &str,
    due_date: &str,
    original_name: &str,
) -> String {
    let (_, ext) = split_extension(original_name);
    sanitize_file_name(&format!(
        "{} - ER{} - {} - {} - {}{}",
        record.client,
        record.number,
        expense_name.trim(),
        record.reference,
        format_due_date(due_date),
        ext
    ))
}
