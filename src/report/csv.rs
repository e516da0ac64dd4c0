use std::io::Write;

use anyhow::Result;

use crate::models::{NutrientRecord, NutrientTable};

/// Write the table as comma-separated text.
pub fn render<W: Write>(table: &NutrientTable, out: &mut W) -> Result<()> {
    writeln!(out, "{}", NutrientRecord::COLUMNS.join(","))?;

    for row in &table.rows {
        let mut fields: Vec<String> = row.amounts().iter().map(|v| v.to_string()).collect();
        fields.push(row.fdc_id.to_string());
        writeln!(out, "{}", fields.join(","))?;
    }

    Ok(())
}
