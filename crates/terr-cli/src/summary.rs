//! Terminal tables.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use terr_coverage::{CoverageMatrix, CoverageRow, MissingTerritories};
use terr_map::ResolutionSummary;
use terr_model::{CanonicalRegistry, Level, MatchMethod, ResolutionResult};
use terr_standards::DoctorReport;

pub fn results_table(results: &[ResolutionResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Input"),
        header_cell("Method"),
        header_cell("Level"),
        header_cell("Canonical"),
        header_cell("Region"),
        header_cell("Macro"),
        header_cell("Confidence"),
        header_cell("Candidates"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 6, CellAlignment::Right);
    for result in results {
        let candidates = if result.candidates.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(
                result
                    .candidates
                    .iter()
                    .map(|c| format!("{} ({:.2})", c.name, c.score))
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        };
        table.add_row(vec![
            Cell::new(&result.input_text),
            method_cell(result.method),
            optional_cell(result.matched_level.map(|l| l.to_string())),
            optional_cell(result.canonical_name.as_ref().map(ToString::to_string))
                .add_attribute(Attribute::Bold),
            optional_cell(result.region.as_ref().map(ToString::to_string)),
            optional_cell(result.macro_region.as_ref().map(ToString::to_string)),
            confidence_cell(result),
            candidates,
        ]);
    }
    table
}

pub fn resolution_summary_table(summary: &ResolutionSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Method"), header_cell("Labels")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for method in MatchMethod::ALL {
        let count = summary.count(method);
        if count > 0 {
            table.add_row(vec![method_cell(method), Cell::new(count)]);
        }
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.total).add_attribute(Attribute::Bold),
    ]);
    if let Some(mean) = summary.mean_fuzzy_confidence {
        table.add_row(vec![
            dim_cell("mean fuzzy confidence"),
            dim_cell(format!("{mean:.3}")),
        ]);
    }
    table
}

pub fn coverage_table(rows: &[CoverageRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Variable"),
        header_cell("Year"),
        header_cell("Present"),
        header_cell("Expected"),
        header_cell("Missing"),
        header_cell("Coverage"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for row in rows {
        let missing = if row.missing_count > 0 {
            Cell::new(row.missing_count).fg(Color::Red)
        } else {
            dim_cell(row.missing_count)
        };
        table.add_row(vec![
            Cell::new(&row.variable),
            Cell::new(row.year),
            Cell::new(row.present_count),
            Cell::new(row.expected_count),
            missing,
            coverage_cell(row.coverage),
        ]);
    }
    table
}

pub fn missing_table(missing: &MissingTerritories) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell(&format!(
        "Missing {} for {} {}",
        missing.level, missing.variable, missing.year
    ))]);
    apply_table_style(&mut table);
    if missing.missing.is_empty() {
        table.add_row(vec![dim_cell("none")]);
    }
    for territory in &missing.missing {
        table.add_row(vec![Cell::new(territory)]);
    }
    table
}

/// Variables down, years across, each cell colored by coverage.
pub fn heatmap_table(matrix: &CoverageMatrix) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("Variable")];
    header.extend(matrix.years.iter().map(|year| header_cell(&year.to_string())));
    table.set_header(header);
    apply_summary_table_style(&mut table);
    for index in 1..=matrix.years.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (variable, cells) in matrix.variables.iter().zip(&matrix.cells) {
        let mut row = vec![Cell::new(variable).add_attribute(Attribute::Bold)];
        row.extend(cells.iter().map(|cell| coverage_cell(*cell)));
        table.add_row(row);
    }
    table
}

pub fn registry_table(registry: &CanonicalRegistry, level: Option<Level>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Level"),
        header_cell("Name"),
        header_cell("Code"),
        header_cell("Parent"),
    ]);
    apply_table_style(&mut table);
    let wanted = |l: Level| level.is_none_or(|wanted| wanted == l);

    if wanted(Level::Macro) {
        for record in registry.macros() {
            table.add_row(vec![
                dim_cell(Level::Macro),
                Cell::new(&record.name),
                optional_cell(record.code.clone()),
                dim_cell("-"),
            ]);
        }
    }
    if wanted(Level::Region) {
        for record in registry.regions() {
            table.add_row(vec![
                dim_cell(Level::Region),
                Cell::new(&record.name),
                optional_cell(record.code.clone()),
                Cell::new(&record.macro_region),
            ]);
        }
    }
    if wanted(Level::Province) {
        for record in registry.provinces() {
            let name = if record.metropolitan {
                Cell::new(format!("{} (CM)", record.name))
            } else {
                Cell::new(&record.name)
            };
            table.add_row(vec![
                dim_cell(Level::Province),
                name,
                optional_cell(record.sigla.clone()),
                Cell::new(&record.region),
            ]);
        }
    }
    table
}

pub fn doctor_table(report: &DoctorReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Check"), header_cell("Value")]);
    apply_summary_table_style(&mut table);
    let counts = &report.counts;
    let rows: Vec<(&str, String)> = vec![
        ("source", report.source.clone()),
        ("snapshot", report.pins.snapshot.clone()),
        ("files verified", counts.files.to_string()),
        ("macro-regions", counts.macro_regions.to_string()),
        ("regions", counts.regions.to_string()),
        ("provinces", counts.provinces.to_string()),
        ("metropolitan cities", counts.metropolitan_cities.to_string()),
        ("aliases", counts.aliases.to_string()),
        ("ambiguous aliases", report.ambiguous_aliases.join(", ")),
    ];
    for (check, value) in rows {
        table.add_row(vec![Cell::new(check), Cell::new(value)]);
    }
    table
}

fn method_cell(method: MatchMethod) -> Cell {
    let cell = Cell::new(method);
    match method {
        MatchMethod::Exact | MatchMethod::Alias | MatchMethod::Normalized => cell.fg(Color::Green),
        MatchMethod::Fuzzy => cell.fg(Color::Yellow),
        MatchMethod::AmbiguousAlias | MatchMethod::AmbiguousFuzzy => {
            cell.fg(Color::Magenta).add_attribute(Attribute::Bold)
        }
        MatchMethod::Unresolved => cell.fg(Color::Red).add_attribute(Attribute::Bold),
    }
}

fn confidence_cell(result: &ResolutionResult) -> Cell {
    if result.is_resolved() {
        Cell::new(format!("{:.3}", result.confidence))
    } else {
        dim_cell("-")
    }
}

fn coverage_cell(coverage: Option<f64>) -> Cell {
    match coverage {
        Some(value) => {
            let color = if value >= 1.0 {
                Color::Green
            } else if value >= 0.9 {
                Color::Yellow
            } else {
                Color::Red
            };
            Cell::new(format!("{:.0}%", value * 100.0)).fg(color)
        }
        None => dim_cell("-"),
    }
}

fn optional_cell(value: Option<String>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
