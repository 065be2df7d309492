use crate::domain::{LcaError, LcaResult};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$}",
        width = width,
        precision = precision
    )
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

/// Pretty JSON with a trailing newline.
pub fn render_json_report<T: Serialize + ?Sized>(value: &T) -> LcaResult<String> {
    serde_json::to_string_pretty(value)
        .map(|rendered| normalize_text_artifact(&rendered))
        .map_err(|source| {
            LcaError::internal(
                "SYS.REPORT_SERIALIZE",
                format!("failed to serialize report: {source}"),
            )
        })
}

pub fn write_json_report<T: Serialize + ?Sized>(path: &Path, value: &T) -> LcaResult<()> {
    let rendered = render_json_report(value)?;
    fs::write(path, rendered).map_err(|source| {
        LcaError::io_system(
            "IO.REPORT_WRITE",
            format!("failed to write report '{}': {}", path.display(), source),
        )
    })
}
