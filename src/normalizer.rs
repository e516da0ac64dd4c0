use crate::models::{NutrientRecord, NutrientTable};

/// Rescale nutrient amounts to a per-kcal basis.
///
/// Protein, fiber, trans fat, saturated fat, sugars, calcium, vitamin C and
/// sodium are divided by the row's energy. Energy, cholesterol, carbs,
/// vitamin A and iron are left as they are.
///
/// A row with zero (or non-finite) energy has nothing to scale against: its
/// scaled columns are set to `0.0` rather than inf/NaN.
pub fn normalize(table: NutrientTable) -> NutrientTable {
    NutrientTable::new(table.rows.into_iter().map(normalize_record).collect())
}

fn normalize_record(mut rec: NutrientRecord) -> NutrientRecord {
    let scalable = rec.energy != 0.0 && rec.energy.is_finite();
    let energy = rec.energy;
    let per_kcal = |amount: f64| if scalable { amount / energy } else { 0.0 };

    let protein = per_kcal(rec.protein);
    let fiber = per_kcal(rec.fiber);
    let trans_fat = per_kcal(rec.trans_fat);
    let sat_fat = per_kcal(rec.sat_fat);
    let sugars = per_kcal(rec.sugars);
    let calcium = per_kcal(rec.calcium);
    let vit_c = per_kcal(rec.vit_c);
    let sodium = per_kcal(rec.sodium);

    if !scalable {
        tracing::debug!(fdc_id = rec.fdc_id, energy = rec.energy, "unusable energy, per-kcal columns set to 0");
    }

    rec.protein = protein;
    rec.fiber = fiber;
    rec.trans_fat = trans_fat;
    rec.sat_fat = sat_fat;
    rec.sugars = sugars;
    rec.calcium = calcium;
    rec.vit_c = vit_c;
    rec.sodium = sodium;
    rec
}
