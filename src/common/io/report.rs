use std::{fmt::Write, path::Path};

use anyhow::Result;

use crate::{
    common::{ensure_dir_exists, write_file},
    diagnostics::{Diagnostic, Diagnostics},
};

/// Markdown list of diagnostics under a title.
pub(crate) fn to_markdown<'a>(title: &str, entries: impl Iterator<Item = &'a Diagnostic>) -> String {
    let mut out = format!("# {title}\n\n");
    for entry in entries {
        let _ = writeln!(out, "- {entry}");
    }
    out
}

/// Write `errors.md` and `warnings.md` into `dir`.
pub fn write_reports(dir: &Path, diagnostics: &Diagnostics) -> Result<()> {
    ensure_dir_exists(dir)?;
    write_file(&dir.join("errors.md"), to_markdown("Errors", diagnostics.errors()).as_bytes())?;
    write_file(&dir.join("warnings.md"), to_markdown("Warnings", diagnostics.warnings()).as_bytes())
}
