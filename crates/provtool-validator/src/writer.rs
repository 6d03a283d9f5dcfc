//! Rendering a validation report to the two formats the `validator` CLI
//! surface accepts (§6.3): `.csv` and `.html`.

use std::path::Path;

use provtool_core::ProvtoolError;

use crate::report::ReportEntry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Html,
}

impl ReportFormat {
    /// Infer the format from a report path's extension. Fails (the CLI
    /// exits 2, per §6.3) for anything else.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Some(ReportFormat::Csv),
            Some("html") => Some(ReportFormat::Html),
            _ => None,
        }
    }
}

fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn escape_html(field: &str) -> String {
    field
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_csv(entries: &[ReportEntry]) -> String {
    let mut out = String::from("entity,data,name,valid,used_by,activity,start_time,end_time,used\n");
    for e in entries {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            escape_csv(&e.entity),
            escape_csv(&e.data),
            escape_csv(&e.name),
            e.valid,
            escape_csv(&e.used_by.join(";")),
            escape_csv(&e.activity),
            escape_csv(&e.start_time),
            escape_csv(e.end_time.as_deref().unwrap_or("")),
            escape_csv(&e.used.join(";")),
        ));
    }
    out
}

pub fn render_html(entries: &[ReportEntry]) -> String {
    let mut rows = String::new();
    for e in entries {
        rows.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            if e.valid { "valid" } else { "invalid" },
            escape_html(&e.entity),
            escape_html(&e.name),
            escape_html(&e.data),
            e.valid,
            escape_html(&e.activity),
            escape_html(&e.start_time),
            escape_html(e.end_time.as_deref().unwrap_or("")),
            escape_html(&e.used_by.join(", ")),
        ));
    }
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Provenance validation report</title>\n\
         <style>.invalid{{background:#fdd}}.valid{{background:#dfd}}</style></head><body>\n\
         <table border=\"1\"><thead><tr><th>entity</th><th>name</th><th>data</th><th>valid</th>\
         <th>activity</th><th>start_time</th><th>end_time</th><th>used_by</th></tr></thead>\n\
         <tbody>\n{rows}</tbody></table>\n</body></html>\n"
    )
}

pub fn write_report(entries: &[ReportEntry], path: &Path) -> Result<(), ProvtoolError> {
    let format = ReportFormat::from_path(path)
        .ok_or_else(|| ProvtoolError::Other(format!("report file must end in .html or .csv: {}", path.display())))?;
    let body = match format {
        ReportFormat::Csv => render_csv(entries),
        ReportFormat::Html => render_html(entries),
    };
    std::fs::write(path, body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ReportEntry> {
        vec![ReportEntry {
            entity: "abc".into(),
            data: "def".into(),
            name: "a.txt".into(),
            valid: true,
            used_by: vec!["xyz".into()],
            activity: "import".into(),
            start_time: "2026-01-01T00:00:00+0000".into(),
            end_time: None,
            used: vec![],
        }]
    }

    #[test]
    fn csv_has_header_and_one_row() {
        let csv = render_csv(&sample());
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains("abc"));
    }

    #[test]
    fn html_marks_valid_rows() {
        let html = render_html(&sample());
        assert!(html.contains("class=\"valid\""));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(ReportFormat::from_path(Path::new("report.txt")).is_none());
    }
}
