//! Build diagnostics report.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::diagnostics::BuildDiagnostics;
use crate::error::Result;

/// Write `diagnostics` as pretty-printed JSON
pub fn save_report(diagnostics: &BuildDiagnostics, path: &Path) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, diagnostics).map_err(std::io::Error::from)?;
    log::info!("[Report] Wrote {}", path.display());
    Ok(())
}
