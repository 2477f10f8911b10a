//! Downloadable renditions of a session.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::ClassifiedRecord;
use crate::{Error, Result};

pub const CSV_HEADERS: [&str; 7] = [
    "ID",
    "Text",
    "Sentiment",
    "Confidence",
    "Language",
    "Insight",
    "Timestamp",
];

pub const REPORT_TITLE: &str = "SENTIMENT COMPASS INTELLIGENCE REPORT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Report,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Report => "text/markdown; charset=utf-8",
        }
    }

    /// Download name stamped with the export time in epoch milliseconds.
    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        let millis = at.timestamp_millis();
        match self {
            ExportFormat::Json => format!("sentiment_compass_audit_{}.json", millis),
            ExportFormat::Csv => format!("sentiment_compass_audit_{}.csv", millis),
            ExportFormat::Report => format!("sentiment_compass_report_{}.md", millis),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "report" | "md" => Ok(ExportFormat::Report),
            other => Err(Error::Validation(format!("Unknown export format: {}", other))),
        }
    }
}

/// A rendered export ready to be served as a download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Render `records` in `format`.
pub fn render(format: ExportFormat, records: &[ClassifiedRecord], at: DateTime<Utc>) -> Result<ExportFile> {
    let body = match format {
        ExportFormat::Json => to_json(records)?,
        ExportFormat::Csv => to_csv(records),
        ExportFormat::Report => to_report(records, at),
    };

    Ok(ExportFile {
        file_name: format.file_name(at),
        content_type: format.content_type(),
        body,
    })
}

pub fn to_json(records: &[ClassifiedRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn to_csv(records: &[ClassifiedRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for r in records {
        let language = if r.classification.code_switched {
            "Multilingual"
        } else {
            "Primary"
        };
        let row = [
            r.id.to_string(),
            quote(&r.text),
            r.sentiment().to_string(),
            r.confidence().to_string(),
            language.to_string(),
            quote(&r.classification.business_insight),
            r.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let kept: String = text.chars().take(limit - 3).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

fn table_cell(text: &str) -> String {
    text.replace('\n', " ").replace('|', "\\|")
}

/// Markdown report with a per-record summary table.
pub fn to_report(records: &[ClassifiedRecord], at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", REPORT_TITLE));
    out.push_str(&format!("Audit Date: {}\n\n", at.format("%Y-%m-%d")));
    out.push_str(&format!("Total Signals Decoded: {}\n\n", records.len()));
    out.push_str("| Sentiment | Text | Confidence | Insight |\n");
    out.push_str("|---|---|---|---|\n");

    for r in records {
        out.push_str(&format!(
            "| {} | {} | {:.0}% | {} |\n",
            r.sentiment(),
            table_cell(&truncate(&r.text, 50)),
            r.confidence() * 100.0,
            table_cell(&truncate(&r.classification.business_insight, 60)),
        ));
    }

    out
}
