use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use gridx_cli::commands::{ExportOutcome, ImportOutcome, TableSummary};
use gridx_model::Value;

pub fn print_export(outcome: &ExportOutcome) {
    if let Some(summary) = &outcome.summary {
        println!("{summary}");
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Bucket"),
        header_cell("Key"),
        header_cell("Rows"),
        header_cell("Bytes"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    table.add_row(vec![
        table_cell(&outcome.table),
        Cell::new(&outcome.report.bucket),
        Cell::new(&outcome.report.key),
        Cell::new(outcome.report.rows),
        Cell::new(outcome.report.bytes),
    ]);
    println!("{table}");
}

pub fn print_import(outcome: &ImportOutcome, limit: Option<usize>) {
    if let Some(summary) = &outcome.summary {
        println!("{summary}");
    }
    let records = &outcome.records;
    let mut table = Table::new();
    table.set_header(
        records
            .columns()
            .iter()
            .map(|column| header_cell(&format!("{} ({})", column.name, column.column_type))),
    );
    apply_table_style(&mut table);

    let shown = limit.unwrap_or(records.len()).min(records.len());
    for record in &records.records()[..shown] {
        table.add_row(record.values().iter().map(value_cell));
    }
    println!("{table}");
    if shown < records.len() {
        println!("{} of {} rows shown", shown, records.len());
    } else {
        println!("{} rows", records.len());
    }
}

pub fn print_summaries(summaries: &[TableSummary]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Type"),
        header_cell("Export"),
        header_cell("Import"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for summary in summaries {
        let type_cell = match &summary.message_type {
            Ok(message_type) => Cell::new(message_type),
            Err(message) => Cell::new(message).fg(Color::Red),
        };
        table.add_row(vec![
            table_cell(&summary.table),
            type_cell,
            optional_cell(summary.export.as_deref()),
            optional_cell(summary.import.as_deref()),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
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
        .set_width(165);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn table_cell(name: &str) -> Cell {
    Cell::new(name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn value_cell(value: &Value) -> Cell {
    match value {
        Value::Null => dim_cell("null"),
        Value::Number(_) => Cell::new(value.as_invariant_text()).set_alignment(CellAlignment::Right),
        _ => Cell::new(value.as_invariant_text()),
    }
}

fn optional_cell(text: Option<&str>) -> Cell {
    match text {
        Some(text) => Cell::new(text),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
