use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crudkit_cli::report::{InspectReport, ValidationReport};

pub fn print_inspect(report: &InspectReport) {
    println!("Domain: {}", report.domain);
    println!("Scope: {}", report.scope);
    println!(
        "Permitted: {}",
        if report.permitted { "yes" } else { "no" }
    );

    let mut fields = Table::new();
    fields.set_header(vec![
        header_cell("Section"),
        header_cell("Field"),
        header_cell("Component"),
        header_cell("Type"),
        header_cell("Width"),
        header_cell("State"),
        header_cell("Rules"),
    ]);
    apply_table_style(&mut fields);
    align_column(&mut fields, 4, CellAlignment::Right);
    for section in &report.sections {
        let label = section.group.as_deref().unwrap_or("-");
        for field in &section.fields {
            let state = match (field.hidden, field.disabled) {
                (true, _) => dim_cell("hidden"),
                (false, true) => dim_cell("disabled"),
                (false, false) => Cell::new("editable"),
            };
            fields.add_row(vec![
                group_cell(label, section.group.is_some()),
                Cell::new(&field.name).add_attribute(Attribute::Bold),
                Cell::new(&field.component),
                Cell::new(field.data_type.as_str()),
                Cell::new(field.width),
                state,
                list_cell(&field.rules),
            ]);
        }
    }
    println!("{fields}");

    let mut columns = Table::new();
    columns.set_header(vec![
        header_cell("Column"),
        header_cell("Visible"),
        header_cell("Order"),
        header_cell("Sortable"),
        header_cell("Filterable"),
    ]);
    apply_table_style(&mut columns);
    align_column(&mut columns, 2, CellAlignment::Right);
    for column in &report.columns {
        columns.add_row(vec![
            Cell::new(&column.name),
            flag_cell(column.visible),
            Cell::new(column.order),
            flag_cell(column.sortable),
            flag_cell(column.filterable),
        ]);
    }
    println!("{columns}");

    if report.actions.is_empty() {
        println!("No visible actions.");
        return;
    }
    let mut actions = Table::new();
    actions.set_header(vec![
        header_cell("Action"),
        header_cell("Surface"),
        header_cell("Variant"),
        header_cell("Order"),
    ]);
    apply_table_style(&mut actions);
    align_column(&mut actions, 3, CellAlignment::Right);
    for action in &report.actions {
        actions.add_row(vec![
            Cell::new(&action.name),
            Cell::new(format!("{:?}", action.surface).to_lowercase()),
            Cell::new(format!("{:?}", action.variant).to_lowercase()),
            Cell::new(action.order),
        ]);
    }
    println!("{actions}");
}

pub fn print_validation(report: &ValidationReport) {
    println!("Domain: {}", report.domain);
    println!("Scope: {}", report.scope);
    if report.valid {
        println!("Record is valid");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Errors")]);
    apply_table_style(&mut table);
    for (field, messages) in &report.errors {
        table.add_row(vec![
            Cell::new(field).add_attribute(Attribute::Bold),
            Cell::new(messages.join("\n")).fg(Color::Red),
        ]);
    }
    println!("{table}");
    println!("{} field(s) failed validation", report.errors.len());
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn group_cell(label: &str, grouped: bool) -> Cell {
    if grouped {
        Cell::new(label).fg(Color::Magenta)
    } else {
        dim_cell(label)
    }
}

fn flag_cell(value: bool) -> Cell {
    if value {
        Cell::new("yes").fg(Color::Green)
    } else {
        dim_cell("no")
    }
}

fn list_cell(values: &[String]) -> Cell {
    if values.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(values.join(", "))
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
