use std::path::PathBuf;

use habitrack_core::{export_all, Config};

use super::{open_tracker, print_json, CliResult};

pub fn run(dir: Option<PathBuf>, habits: Vec<i64>) -> CliResult {
    let dir = match dir.or_else(|| Config::load_or_default().export.directory) {
        Some(dir) => dir,
        None => return Err("no export directory given and export.directory is not set".into()),
    };
    let tracker = open_tracker()?;
    let selected = (!habits.is_empty()).then_some(habits.as_slice());
    let report = export_all(&tracker, &dir, selected)?;
    eprintln!("Exported {} files to {}", report.files.len(), dir.display());
    print_json(&report)
}
