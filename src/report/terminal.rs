use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{FoodId, ItemFailure, NutrientRecord, NutrientTable, Stage};

/// Everything the terminal report shows.
pub struct Summary<'a> {
    /// Food names as given on the command line / input file.
    pub foods: &'a [String],
    /// Names that resolved, paired with their identifier.
    pub resolved: &'a [(String, FoodId)],
    pub table: &'a NutrientTable,
    pub failures: &'a [ItemFailure],
    pub normalized: bool,
}

/// Render a colored terminal report.
pub fn render(summary: &Summary<'_>, verbose: bool, quiet: bool) -> Result<()> {
    let requested = summary.foods.len();
    let resolved = summary.resolved.len();
    let extracted = summary.table.len();
    let failed = summary.failures.len();

    if quiet {
        println!(
            "Requested: {}  Resolved: {}  Extracted: {}  Failed: {}",
            requested,
            resolved.to_string().green(),
            extracted.to_string().green(),
            failed.to_string().red(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}\n",
        "fdc-nutrients".bold(),
        env!("CARGO_PKG_VERSION")
    );

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Foods requested    : {:>4}", requested));
    println!(
        " │  {:<48} │",
        format!("{}  Resolved        : {:>4}", "✓".green(), resolved)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Extracted       : {:>4}", "✓".green(), extracted)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Failed          : {:>4}", "✗".red(), failed)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if verbose && resolved > 0 {
        println!(" {} Resolved identifiers:\n", "[MATCH]".cyan().bold());
        render_matches(summary.resolved);
        println!();
    }

    if extracted > 0 {
        let heading = if summary.normalized {
            "Nutrients per kcal:"
        } else {
            "Nutrients as reported:"
        };
        println!(" {} {}\n", "[DATA]".green().bold(), heading);
        render_nutrients(summary.table, summary.normalized);
        println!();
    }

    if failed > 0 {
        println!(" {} Foods that could not be processed:\n", "[ERROR]".red().bold());
        render_failures(summary.failures);
        println!();
    }

    Ok(())
}

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|l| Cell::new(l).add_attribute(Attribute::Bold))
        .collect()
}

fn render_matches(resolved: &[(String, FoodId)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["Food", "fdcID"]));

    for (name, id) in resolved {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(id.to_string()).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);
}

fn render_nutrients(data: &NutrientTable, normalized: bool) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&NutrientRecord::COLUMNS));

    for row in &data.rows {
        let mut cells: Vec<Cell> = row
            .amounts()
            .iter()
            .map(|v| Cell::new(format_amount(*v, normalized)).set_alignment(CellAlignment::Right))
            .collect();

        // Zero energy means the per-kcal columns carry no information.
        if row.energy == 0.0 {
            if let Some(energy) = cells.pop() {
                cells.push(energy.fg(Color::DarkGrey));
            }
        }

        cells.push(Cell::new(row.fdc_id).set_alignment(CellAlignment::Right));
        table.add_row(cells);
    }

    println!("{}", table);
}

fn render_failures(failures: &[ItemFailure]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["#", "Item", "Stage", "Error"]));

    for failure in failures {
        let stage_color = match failure.stage {
            Stage::Resolve => Color::Yellow,
            Stage::Extract => Color::Red,
        };

        table.add_row(vec![
            Cell::new(failure.index + 1).set_alignment(CellAlignment::Right),
            Cell::new(&failure.item),
            Cell::new(failure.stage.to_string()).fg(stage_color),
            Cell::new(&failure.error),
        ]);
    }

    println!("{}", table);
}

fn format_amount(value: f64, normalized: bool) -> String {
    if normalized {
        format!("{:.4}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_precision() {
        assert_eq!(format_amount(0.123456, true), "0.1235");
        assert_eq!(format_amount(165.0, false), "165.00");
    }
}
