//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use liftoff_ops::{CloneReport, DownloadReport, FileReport, OperationResult};
use std::io;
use std::time::Duration;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            let json = result.to_json().map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            OperationResult::Downloads(report) => render_downloads(report),
            OperationResult::Clones(clones) => render_clones(clones),
            OperationResult::Apply { downloads, clones } => {
                render_downloads(downloads);
                render_clones(clones);
            }
            OperationResult::Fetched(file) => render_files(std::slice::from_ref(file)),
        }
        Ok(())
    }
}

fn render_downloads(report: &DownloadReport) {
    if report.files.is_empty() {
        println!("No downloads configured.");
        return;
    }
    render_files(&report.files);
    println!(
        "{} file(s), {} bytes in {:.1}s",
        report.files.len(),
        report.total_bytes,
        Duration::from_millis(report.duration_ms).as_secs_f64()
    );
}

fn render_files(files: &[FileReport]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("File").add_attribute(Attribute::Bold),
        Cell::new("Size").add_attribute(Attribute::Bold),
        Cell::new("SHA-256").add_attribute(Attribute::Bold),
        Cell::new("Verified").add_attribute(Attribute::Bold),
    ]);

    for file in files {
        table.add_row(vec![
            Cell::new(file.path.display()),
            Cell::new(file.size),
            Cell::new(&file.sha256[..16.min(file.sha256.len())]),
            Cell::new(if file.verified { "yes" } else { "no" }),
        ]);
    }

    println!("{table}");
}

fn render_clones(clones: &[CloneReport]) {
    if clones.is_empty() {
        println!("No repositories configured.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Repository").add_attribute(Attribute::Bold),
        Cell::new("Path").add_attribute(Attribute::Bold),
        Cell::new("Note").add_attribute(Attribute::Bold),
    ]);

    for clone in clones {
        let note = clone
            .redirected_from
            .as_ref()
            .map(|original| format!("redirected from {}", original.display()))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&clone.url),
            Cell::new(clone.path.display()),
            Cell::new(note),
        ]);
    }

    println!("{table}");
}
