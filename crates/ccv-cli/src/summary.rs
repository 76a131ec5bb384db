use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width};

use ccv_cli::IngestReport;
use ccv_model::SchemaDefinition;

pub fn print_sections(schema: &SchemaDefinition, all: bool) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Section"),
        header_cell("Identifier"),
        header_cell("Fields"),
        header_cell("Required"),
        header_cell("Repeatable"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);

    let mut stack: Vec<_> = schema.roots().collect();
    stack.reverse();
    while let Some(section) = stack.pop() {
        let mut children: Vec<_> = schema.children(section).collect();
        children.reverse();
        stack.extend(children);

        let path = schema.label_path(&section.id);
        if !section.has_fields() {
            if all {
                table.add_row(vec![
                    dim_cell(path),
                    dim_cell(&section.id),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                ]);
            }
            continue;
        }
        let required: Vec<&str> = section.required_fields().map(|f| f.label.as_str()).collect();
        let section_cell = if schema.is_dependent(&section.id) {
            Cell::new(format!("  -> {path}")).fg(Color::DarkGrey)
        } else {
            Cell::new(path).fg(Color::Blue).add_attribute(Attribute::Bold)
        };
        table.add_row(vec![
            section_cell,
            Cell::new(&section.id),
            Cell::new(section.fields.len()),
            if required.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(required.join(", "))
            },
            if section.repeatable {
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                dim_cell("-")
            },
        ]);
    }
    println!("Schema version {} ({})", schema.version(), schema.language());
    println!("{table}");
}

pub fn print_ingest_summary(report: &IngestReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Section"),
        header_cell("Added"),
        header_cell("Rejected"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for file in &report.files {
        let name = file.path.display().to_string();
        if file.sections.is_empty() {
            table.add_row(vec![Cell::new(&name), dim_cell("(no records)"), dim_cell(0), dim_cell(0)]);
        }
        for section in &file.sections {
            table.add_row(vec![
                Cell::new(&name),
                Cell::new(&section.section),
                count_cell(section.added, Color::Green),
                count_cell(section.rejected.len(), Color::Red),
            ]);
        }
    }
    table.add_row(vec![
        Cell::new("TOTAL").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(format!("{} file(s)", report.files.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        count_cell(report.added(), Color::Green).add_attribute(Attribute::Bold),
        count_cell(report.rejected(), Color::Red).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_rejections(report);
}

fn print_rejections(report: &IngestReport) {
    if !report.has_rejections() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Section"),
        header_cell("Record"),
        header_cell("Field"),
        header_cell("Problem"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for file in &report.files {
        for section in &file.sections {
            for rejected in &section.rejected {
                for error in &rejected.errors {
                    table.add_row(vec![
                        Cell::new(file.path.display()),
                        Cell::new(&error.section),
                        Cell::new(rejected.instance),
                        Cell::new(&error.field),
                        Cell::new(error.kind.code()).fg(Color::Red),
                        Cell::new(&error.message),
                    ]);
                }
            }
        }
    }
    println!();
    println!("Rejected records:");
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ColumnConstraint::LowerBoundary(Width::Fixed(34)),
        ColumnConstraint::LowerBoundary(Width::Fixed(6)),
        ColumnConstraint::UpperBoundary(Width::Percentage(30)),
        ColumnConstraint::LowerBoundary(Width::Fixed(10)),
    ]);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Percentage(40)),
        ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ColumnConstraint::LowerBoundary(Width::Fixed(7)),
        ColumnConstraint::LowerBoundary(Width::Fixed(10)),
    ]);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(180);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Percentage(20)),
        ColumnConstraint::UpperBoundary(Width::Percentage(25)),
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),
        ColumnConstraint::UpperBoundary(Width::Fixed(24)),
        ColumnConstraint::UpperBoundary(Width::Fixed(20)),
        ColumnConstraint::UpperBoundary(Width::Percentage(40)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
