use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::model::ModUnit;
use crate::validate::ValidationIssue;

/// Parse a JSON array of units as stored by the editor.
pub fn units_from_str(text: &str) -> Result<Vec<ModUnit>> {
    Ok(serde_json::from_str(text)?)
}

pub fn load_units(path: &Path) -> Result<Vec<ModUnit>> {
    let data = fs::read_to_string(path)?;
    let units = units_from_str(&data)?;
    tracing::debug!(path = %path.display(), units = units.len(), "units loaded");
    Ok(units)
}

pub fn report_json(issues: &[ValidationIssue]) -> Result<String> {
    Ok(serde_json::to_string_pretty(issues)?)
}

pub fn write_report(path: &Path, issues: &[ValidationIssue]) -> Result<()> {
    fs::write(path, report_json(issues)?)?;
    Ok(())
}
