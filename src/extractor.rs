//! Nutrient extraction from FDC detail records.

use futures::future::join_all;
use indicatif::ProgressBar;
use serde_json::Value;

use crate::error::{MissingField, PipelineError};
use crate::fdc::FoodDataSource;
use crate::models::{FoodId, ItemFailure, NutrientRecord, NutrientTable, Stage};

/// Columns a recognized nutrient code feeds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nutrient {
    TransFat,
    TransFatPoly,
    TransFatMono,
    SatFat,
    Cholesterol,
    Sodium,
    Carbs,
    Fiber,
    Sugars,
    Protein,
    VitA,
    VitC,
    Calcium,
    Iron,
    Energy,
}

/// FDC nutrient ids recognized by the extractor.
pub const NUTRIENT_CODES: [(u32, Nutrient); 15] = [
    (1257, Nutrient::TransFat),
    (1293, Nutrient::TransFatPoly),
    (1292, Nutrient::TransFatMono),
    (1258, Nutrient::SatFat),
    (1253, Nutrient::Cholesterol),
    (1093, Nutrient::Sodium),
    (1005, Nutrient::Carbs),
    (1079, Nutrient::Fiber),
    (2000, Nutrient::Sugars),
    (1003, Nutrient::Protein),
    (1104, Nutrient::VitA),
    (1162, Nutrient::VitC),
    (1087, Nutrient::Calcium),
    (1089, Nutrient::Iron),
    (1008, Nutrient::Energy),
];

impl Nutrient {
    pub fn from_code(code: u32) -> Option<Self> {
        NUTRIENT_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, n)| *n)
    }
}

/// Rows that were extracted plus the identifiers that could not be.
#[derive(Debug, Default)]
pub struct Extraction {
    pub table: NutrientTable,
    pub failures: Vec<ItemFailure>,
}

/// Fetch and extract every identifier.
///
/// Successful rows keep input order. A failing identifier is reported in
/// `failures`, indexed by its position in `ids`, and does not stop the others.
pub async fn extract<S: FoodDataSource>(
    source: &S,
    ids: &[FoodId],
    batch_size: usize,
    progress: Option<&ProgressBar>,
) -> Extraction {
    let mut rows = Vec::with_capacity(ids.len());
    let mut failures = Vec::new();
    let mut index = 0;

    for batch in ids.chunks(batch_size.max(1)) {
        let futures: Vec<_> = batch
            .iter()
            .map(|&id| async move { extract_one(source, id).await })
            .collect();

        for (id, result) in batch.iter().zip(join_all(futures).await) {
            match result {
                Ok(row) => rows.push(row),
                Err(e) => {
                    tracing::warn!(fdc_id = %id, error = %e, "extraction failed");
                    failures.push(ItemFailure {
                        index,
                        item: id.to_string(),
                        stage: Stage::Extract,
                        error: e.to_string(),
                    });
                }
            }
            if let Some(pb) = progress {
                pb.inc(1);
            }
            index += 1;
        }
    }

    Extraction {
        table: NutrientTable::new(rows),
        failures,
    }
}

/// Fetch one record and turn it into a row.
pub async fn extract_one<S: FoodDataSource>(
    source: &S,
    id: FoodId,
) -> Result<NutrientRecord, PipelineError> {
    let response = source.food(id).await?;
    parse_record(id, &response)
}

/// Build a row from a detail response.
///
/// The `foodNutrients` list must exist. Entries that lack a usable
/// `nutrient.id` or `amount` are skipped; unrecognized codes are ignored and
/// absent nutrients stay at zero.
pub fn parse_record(id: FoodId, response: &Value) -> Result<NutrientRecord, PipelineError> {
    let entries = response
        .get("foodNutrients")
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::Fetch {
            id,
            reason: "record has no 'foodNutrients' list".to_string(),
        })?;

    let mut record = NutrientRecord::empty(id);
    let mut trans_poly = 0.0;
    let mut trans_mono = 0.0;

    for (idx, entry) in entries.iter().enumerate() {
        let (code, amount) = match read_entry(entry) {
            Ok(pair) => pair,
            Err(field) => {
                tracing::debug!(fdc_id = %id, index = idx, %field, "skipping nutrient entry with missing field");
                continue;
            }
        };

        let Some(nutrient) = Nutrient::from_code(code) else {
            continue;
        };

        let slot = match nutrient {
            Nutrient::TransFat => &mut record.trans_fat,
            Nutrient::TransFatPoly => &mut trans_poly,
            Nutrient::TransFatMono => &mut trans_mono,
            Nutrient::SatFat => &mut record.sat_fat,
            Nutrient::Cholesterol => &mut record.cholesterol,
            Nutrient::Sodium => &mut record.sodium,
            Nutrient::Carbs => &mut record.carbs,
            Nutrient::Fiber => &mut record.fiber,
            Nutrient::Sugars => &mut record.sugars,
            Nutrient::Protein => &mut record.protein,
            Nutrient::VitA => &mut record.vit_a,
            Nutrient::VitC => &mut record.vit_c,
            Nutrient::Calcium => &mut record.calcium,
            Nutrient::Iron => &mut record.iron,
            Nutrient::Energy => &mut record.energy,
        };
        *slot = amount;
    }

    record.trans_fat += trans_poly + trans_mono;
    Ok(record)
}

fn read_entry(entry: &Value) -> Result<(u32, f64), MissingField> {
    let code = entry
        .get("nutrient")
        .and_then(|n| n.get("id"))
        .and_then(Value::as_u64)
        .and_then(|c| u32::try_from(c).ok())
        .ok_or(MissingField::NutrientId)?;
    let amount = entry
        .get("amount")
        .and_then(Value::as_f64)
        .ok_or(MissingField::Amount)?;
    Ok((code, amount))
}
