use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use humansize::{format_size, BINARY};

use crate::models::RunSummary;

/// Failures listed without `--verbose`.
const FAILURE_PREVIEW: usize = 10;

/// Render a colored terminal report.
pub fn render(summary: &RunSummary, verbose: bool, quiet: bool) -> Result<()> {
    if quiet {
        println!(
            "Artifacts: {}  Updated: {}  Unmatched: {}  Failed: {}",
            summary.artifacts,
            summary.updated.to_string().green(),
            summary.unmatched.to_string().yellow(),
            summary.failed.to_string().red(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "jar-sizer".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Scanned: {}\n", summary.root.display());

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(
        " │  {:<48} │",
        format!("Artifacts found    : {}", summary.artifacts)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Updated         : {:>6}", "✓".green(), summary.updated)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Unmatched       : {:>6}", "⚠".yellow(), summary.unmatched)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Failed          : {:>6}", "✗".red(), summary.failed)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    render_tally(summary);
    println!();

    if !summary.failures.is_empty() {
        println!(" {} Artifacts that could not be recorded:\n", "[ERROR]".red().bold());
        render_failures(summary, verbose);
        println!();
    }

    if summary.walk_errors > 0 {
        println!(
            " {} {} directories or entries could not be read (see log)\n",
            "[WARN]".yellow().bold(),
            summary.walk_errors
        );
    }

    Ok(())
}

fn render_tally(summary: &RunSummary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Count").add_attribute(Attribute::Bold),
        ]);

    let rows: [(&str, String, Color); 9] = [
        ("Files seen", summary.files_seen.to_string(), Color::Reset),
        ("Skipped (other files)", summary.skipped.to_string(), Color::DarkGrey),
        ("Malformed paths", summary.malformed.to_string(), Color::Yellow),
        ("Artifacts", summary.artifacts.to_string(), Color::Reset),
        ("Updated", summary.updated.to_string(), Color::Green),
        ("Unmatched", summary.unmatched.to_string(), Color::Yellow),
        ("Failed", summary.failed.to_string(), Color::Red),
        ("Bytes recorded", format_size(summary.total_bytes, BINARY), Color::Reset),
        (
            "Elapsed",
            format!("{:.1}s", summary.elapsed.as_secs_f64()),
            Color::Reset,
        ),
    ];

    for (label, value, color) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(value).fg(color).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);
}

fn render_failures(summary: &RunSummary, verbose: bool) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Path").add_attribute(Attribute::Bold),
            Cell::new("Error").add_attribute(Attribute::Bold),
        ]);

    let shown = if verbose {
        summary.failures.len()
    } else {
        summary.failures.len().min(FAILURE_PREVIEW)
    };

    for failure in &summary.failures[..shown] {
        table.add_row(vec![
            Cell::new(failure.path.display()),
            Cell::new(&failure.error).fg(Color::Red),
        ]);
    }

    println!("{}", table);

    let hidden = (summary.failures.len() - shown) as u64 + summary.failures_truncated;
    if hidden > 0 {
        println!(" … and {} more", hidden);
    }
}
