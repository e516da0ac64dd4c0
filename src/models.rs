use serde::{Deserialize, Serialize};

/// A free-text food name plus the search mode it should be resolved in.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodQuery {
    pub name: String,
    pub branded: bool,
}

impl FoodQuery {
    pub fn new(name: impl Into<String>, branded: bool) -> Self {
        Self {
            name: name.into(),
            branded,
        }
    }
}

/// FoodData Central identifier of a single food record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodId(pub u64);

impl std::fmt::Display for FoodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a search response. Only lives while a query is being resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCandidate {
    pub description: Option<String>,
    pub brand_owner: Option<String>,
    pub fdc_id: Option<FoodId>,
}

/// One row of extracted nutrient amounts.
///
/// Field order matches the output column order; `fdc_id` is serialized as `fdcID`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientRecord {
    pub trans_fat: f64,
    pub sat_fat: f64,
    pub cholesterol: f64,
    pub sodium: f64,
    pub carbs: f64,
    pub fiber: f64,
    pub sugars: f64,
    pub protein: f64,
    pub vit_a: f64,
    pub vit_c: f64,
    pub calcium: f64,
    pub iron: f64,
    pub energy: f64,
    #[serde(rename = "fdcID")]
    pub fdc_id: u64,
}

impl NutrientRecord {
    pub const COLUMNS: [&'static str; 14] = [
        "trans_fat",
        "sat_fat",
        "cholesterol",
        "sodium",
        "carbs",
        "fiber",
        "sugars",
        "protein",
        "vit_a",
        "vit_c",
        "calcium",
        "iron",
        "energy",
        "fdcID",
    ];

    pub fn empty(id: FoodId) -> Self {
        Self {
            fdc_id: id.0,
            ..Self::default()
        }
    }

    pub fn id(&self) -> FoodId {
        FoodId(self.fdc_id)
    }

    /// The thirteen nutrient amounts in column order.
    pub fn amounts(&self) -> [f64; 13] {
        [
            self.trans_fat,
            self.sat_fat,
            self.cholesterol,
            self.sodium,
            self.carbs,
            self.fiber,
            self.sugars,
            self.protein,
            self.vit_a,
            self.vit_c,
            self.calcium,
            self.iron,
            self.energy,
        ]
    }
}

/// Ordered rows handed from the extractor to the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutrientTable {
    pub rows: Vec<NutrientRecord>,
}

impl NutrientTable {
    pub fn new(rows: Vec<NutrientRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> Vec<FoodId> {
        self.rows.iter().map(NutrientRecord::id).collect()
    }
}

/// Pipeline stage an item failed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Resolve,
    Extract,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Resolve => write!(f, "resolve"),
            Stage::Extract => write!(f, "extract"),
        }
    }
}

/// An input item that dropped out of the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    /// Position of the food in the requested list, whichever stage failed.
    pub index: usize,
    /// Food name (resolve) or FDC id (extract).
    pub item: String,
    pub stage: Stage,
    pub error: String,
}
