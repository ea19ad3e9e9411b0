use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rowmatch_cli::pipeline::MatchRun;
use rowmatch_model::{ResultTable, ScoringFailure, redact_value};
use rowmatch_report::{OutputFormat, format_value};

pub fn print_summary(run: &MatchRun, preview: usize) {
    println!("Source: {} ({} rows)", run.source_name, run.source_rows);
    println!(
        "Destination: {} ({} rows)",
        run.destination_name, run.destination_rows
    );
    if let Some((path, format)) = &run.written {
        println!("Output: {} ({})", display_path(path), format_label(*format));
    }
    print_stats_table(run);
    print_preview(&run.table, preview);
    print_skipped(&run.outcome.skipped);
    if run.outcome.cancelled {
        eprintln!("Run cancelled; results are partial.");
    }
}

fn print_stats_table(run: &MatchRun) {
    let stats = &run.outcome.stats;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sources"),
        header_cell("Targets"),
        header_cell("Pairs scored"),
        header_cell("Pairs pruned"),
        header_cell("Records"),
        header_cell("Matched"),
        header_cell("Skipped"),
        header_cell("Elapsed"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(format!("{}/{}", stats.sources_processed, stats.sources_total)),
        Cell::new(stats.targets_total),
        Cell::new(stats.pairs_scored),
        dim_cell(stats.pairs_pruned),
        Cell::new(run.outcome.records.len()).add_attribute(Attribute::Bold),
        Cell::new(run.outcome.matched_sources()),
        count_cell(run.outcome.skipped_count(), Color::Yellow),
        dim_cell(format!("{:.2?}", run.elapsed)),
    ]);
    println!("{table}");
}

fn print_preview(result: &ResultTable, preview: usize) {
    if result.is_empty() {
        println!("No matches found.");
        return;
    }
    if preview == 0 {
        return;
    }
    let mut table = Table::new();
    table.set_header(result.columns.iter().map(|name| header_cell(name)));
    apply_table_style(&mut table);
    if let Some(last) = result.columns.len().checked_sub(1) {
        align_column(&mut table, last, CellAlignment::Right);
    }
    for row in result.rows.iter().take(preview) {
        table.add_row(
            result
                .ordered_values(row)
                .map(|value| Cell::new(format_value(value))),
        );
    }
    println!("{table}");
    if result.len() > preview {
        println!("... {} more rows", result.len() - preview);
    }
}

fn print_skipped(skipped: &[ScoringFailure]) {
    if let Some(table) = skipped_table(skipped) {
        println!();
        println!("Skipped pairs (scored as 0):");
        println!("{table}");
    }
}

/// Skipped pairs with their values redacted unless data logging is on.
fn skipped_table(skipped: &[ScoringFailure]) -> Option<Table> {
    if skipped.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source row"),
        header_cell("Target row"),
        header_cell("Query"),
        header_cell("Candidate"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for failure in skipped {
        table.add_row(vec![
            Cell::new(failure.source_index),
            Cell::new(failure.target_index),
            Cell::new(redact_value(&failure.query)),
            Cell::new(redact_value(&failure.candidate)),
            Cell::new(failure.reason.to_string()).fg(Color::Yellow),
        ]);
    }
    Some(table)
}

fn format_label(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Csv => "csv",
        OutputFormat::Json => "json",
    }
}

/// Prints a path relative to the working directory when possible.
fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
