//! Food name → FDC identifier resolution.

use futures::future::join_all;
use indicatif::ProgressBar;
use serde_json::Value;

use crate::error::{MissingField, PipelineError};
use crate::fdc::FoodDataSource;
use crate::matching::Matcher;
use crate::models::{FoodId, FoodQuery, SearchCandidate};

/// Resolve every name to its best-matching identifier.
///
/// Returns one result per input name, in input order. Requests are issued
/// `batch_size` at a time; a failure only affects its own slot.
pub async fn resolve<S: FoodDataSource>(
    source: &S,
    matcher: &Matcher,
    names: &[String],
    branded: bool,
    batch_size: usize,
    progress: Option<&ProgressBar>,
) -> Vec<Result<FoodId, PipelineError>> {
    let mut results = Vec::with_capacity(names.len());

    for batch in names.chunks(batch_size.max(1)) {
        let futures: Vec<_> = batch
            .iter()
            .map(|name| {
                let query = FoodQuery::new(name.as_str(), branded);
                async move { resolve_query(source, matcher, &query).await }
            })
            .collect();

        for result in join_all(futures).await {
            if let Some(pb) = progress {
                pb.inc(1);
            }
            results.push(result);
        }
    }

    results
}

/// Resolve a single query: search, score every candidate, keep the best.
pub async fn resolve_query<S: FoodDataSource>(
    source: &S,
    matcher: &Matcher,
    query: &FoodQuery,
) -> Result<FoodId, PipelineError> {
    let response = source.search(&query.name, query.branded).await?;
    let candidates = parse_candidates(&query.name, &response)?;
    let best = select_best(matcher, query, &candidates).ok_or_else(|| PipelineError::NoMatch {
        query: query.name.clone(),
    })?;

    tracing::debug!(
        query = %query.name,
        fdc_id = %best.0,
        score = best.1,
        candidates = candidates.len(),
        "resolved"
    );
    Ok(best.0)
}

/// Pull the `foods` list out of a search response.
///
/// The list itself must be present; individual entries are kept even when
/// fields are missing so that scoring can skip them one by one.
pub fn parse_candidates(query: &str, response: &Value) -> Result<Vec<SearchCandidate>, PipelineError> {
    let foods = response
        .get("foods")
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::Resolution {
            query: query.to_string(),
            reason: "response has no 'foods' list".to_string(),
        })?;

    Ok(foods.iter().map(parse_candidate).collect())
}

fn parse_candidate(food: &Value) -> SearchCandidate {
    let text = |key: &str| food.get(key).and_then(Value::as_str).map(str::to_string);

    SearchCandidate {
        description: text("description"),
        brand_owner: text("brandOwner"),
        fdc_id: food.get("fdcId").and_then(parse_fdc_id),
    }
}

/// FDC ids arrive as numbers, occasionally as numeric strings.
fn parse_fdc_id(value: &Value) -> Option<FoodId> {
    match value {
        Value::Number(n) => n.as_u64().map(FoodId),
        Value::String(s) => s.trim().parse().ok().map(FoodId),
        _ => None,
    }
}

impl SearchCandidate {
    /// The text the query is scored against in the given mode.
    pub fn comparison_text(&self, branded: bool) -> Result<String, MissingField> {
        let description = self
            .description
            .as_deref()
            .ok_or(MissingField::Description)?;

        if !branded {
            return Ok(description.to_string());
        }

        let owner = self.brand_owner.as_deref().ok_or(MissingField::BrandOwner)?;
        Ok(format!("{} {}", owner, description))
    }
}

/// Best candidate and its score, or `None` when no candidate was usable.
///
/// Ties keep the earliest candidate.
pub fn select_best(
    matcher: &Matcher,
    query: &FoodQuery,
    candidates: &[SearchCandidate],
) -> Option<(FoodId, u8)> {
    let scores = candidates.iter().enumerate().map(|(idx, candidate)| {
        let usable = candidate
            .comparison_text(query.branded)
            .and_then(|text| candidate.fdc_id.ok_or(MissingField::FdcId).map(|_| text));

        match usable {
            Ok(text) => Some(matcher.token_set_ratio(&query.name, &text)),
            Err(field) => {
                tracing::debug!(query = %query.name, index = idx, %field, "skipping candidate with missing field");
                None
            }
        }
    });

    let (idx, score) = best_index(scores)?;
    candidates[idx].fdc_id.map(|id| (id, score))
}

/// Index and value of the highest score; `None` entries are skipped and ties
/// keep the first.
fn best_index(scores: impl Iterator<Item = Option<u8>>) -> Option<(usize, u8)> {
    let mut best: Option<(usize, u8)> = None;
    for (idx, score) in scores.enumerate() {
        let Some(score) = score else { continue };
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    struct StubSource {
        searches: HashMap<String, Value>,
    }

    #[async_trait]
    impl FoodDataSource for StubSource {
        async fn search(&self, query: &str, _branded: bool) -> Result<Value, PipelineError> {
            self.searches
                .get(query)
                .cloned()
                .ok_or_else(|| PipelineError::Resolution {
                    query: query.to_string(),
                    reason: "HTTP 500".to_string(),
                })
        }

        async fn food(&self, id: FoodId) -> Result<Value, PipelineError> {
            Err(PipelineError::Fetch {
                id,
                reason: "not stubbed".to_string(),
            })
        }
    }

    fn matcher() -> Matcher {
        Matcher::new().unwrap()
    }

    fn candidate(desc: Option<&str>, owner: Option<&str>, id: u64) -> SearchCandidate {
        SearchCandidate {
            description: desc.map(str::to_string),
            brand_owner: owner.map(str::to_string),
            fdc_id: Some(FoodId(id)),
        }
    }

    #[test]
    fn test_best_index_picks_highest_regardless_of_position() {
        assert_eq!(best_index([Some(80), Some(95)].into_iter()), Some((1, 95)));
        assert_eq!(best_index([Some(95), Some(80)].into_iter()), Some((0, 95)));
    }

    #[test]
    fn test_best_index_tie_keeps_first() {
        assert_eq!(best_index([Some(90), Some(90)].into_iter()), Some((0, 90)));
        assert_eq!(best_index([None, Some(90), Some(90)].into_iter()), Some((1, 90)));
    }

    #[test]
    fn test_best_index_zero_score_still_counts() {
        assert_eq!(best_index([None, Some(0)].into_iter()), Some((1, 0)));
        assert_eq!(best_index([None, None].into_iter()), None);
        assert_eq!(best_index(std::iter::empty()), None);
    }

    #[test]
    fn test_comparison_text_modes() {
        let c = candidate(Some("GUMMI BEARS"), Some("Albanese"), 1);
        assert_eq!(c.comparison_text(false).unwrap(), "GUMMI BEARS");
        assert_eq!(c.comparison_text(true).unwrap(), "Albanese GUMMI BEARS");

        let generic = candidate(Some("Bananas, raw"), None, 2);
        assert_eq!(generic.comparison_text(true), Err(MissingField::BrandOwner));
        assert_eq!(
            candidate(None, Some("Acme"), 3).comparison_text(false),
            Err(MissingField::Description)
        );
    }

    #[test]
    fn test_select_best_prefers_better_match() {
        let query = FoodQuery::new("peanut butter cups", false);
        let candidates = vec![
            candidate(Some("Sparkling water"), None, 10),
            candidate(Some("Peanut butter cups"), None, 20),
            candidate(Some("Peanut butter cookies"), None, 30),
        ];
        let (id, score) = select_best(&matcher(), &query, &candidates).unwrap();
        assert_eq!(id, FoodId(20));
        assert_eq!(score, 100);
    }

    #[test]
    fn test_select_best_equal_scores_keep_first() {
        let query = FoodQuery::new("gummi bears", false);
        let candidates = vec![
            candidate(Some("Gummi bears"), None, 1),
            candidate(Some("GUMMI BEARS"), None, 2),
        ];
        assert_eq!(select_best(&matcher(), &query, &candidates).unwrap().0, FoodId(1));
    }

    #[test]
    fn test_select_best_skips_missing_brand_owner() {
        let query = FoodQuery::new("albanese gummi bears", true);
        let candidates = vec![
            candidate(Some("Gummi bears"), None, 1),
            candidate(Some("GUMMI BEARS"), Some("Albanese Confectionery Group Inc"), 2),
        ];
        assert_eq!(select_best(&matcher(), &query, &candidates).unwrap().0, FoodId(2));
    }

    #[test]
    fn test_select_best_skips_missing_id() {
        let query = FoodQuery::new("gummi bears", false);
        let candidates = vec![
            SearchCandidate {
                description: Some("Gummi bears".to_string()),
                brand_owner: None,
                fdc_id: None,
            },
            candidate(Some("Gummi worms"), None, 7),
        ];
        assert_eq!(select_best(&matcher(), &query, &candidates).unwrap().0, FoodId(7));
    }

    #[test]
    fn test_select_best_no_usable_candidate() {
        let query = FoodQuery::new("gummi bears", true);
        let candidates = vec![candidate(Some("Gummi bears"), None, 1)];
        assert!(select_best(&matcher(), &query, &candidates).is_none());
    }

    #[test]
    fn test_parse_candidates_requires_foods_list() {
        assert!(matches!(
            parse_candidates("x", &json!({ "totalHits": 0 })),
            Err(PipelineError::Resolution { .. })
        ));
        assert!(matches!(
            parse_candidates("x", &json!({ "foods": "nope" })),
            Err(PipelineError::Resolution { .. })
        ));
        assert!(parse_candidates("x", &json!({ "foods": [] })).unwrap().is_empty());
    }

    #[test]
    fn test_parse_candidates_reads_fields() {
        let response = json!({
            "foods": [
                { "fdcId": 2345, "description": "TRAIL MIX", "brandOwner": "Wild Roots" },
                { "fdcId": "678", "description": "Trail mix" },
                { "description": 5 }
            ]
        });
        let parsed = parse_candidates("trail mix", &response).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].fdc_id, Some(FoodId(2345)));
        assert_eq!(parsed[0].brand_owner.as_deref(), Some("Wild Roots"));
        assert_eq!(parsed[1].fdc_id, Some(FoodId(678)));
        assert_eq!(parsed[1].brand_owner, None);
        assert_eq!(parsed[2].description, None);
        assert_eq!(parsed[2].fdc_id, None);
    }

    fn stub() -> StubSource {
        let mut searches = HashMap::new();
        searches.insert(
            "albanese gummi bears".to_string(),
            json!({ "foods": [
                { "fdcId": 1, "description": "GUMMI WORMS", "brandOwner": "Albanese Confectionery Group Inc" },
                { "fdcId": 2, "description": "Candies, gummi bears" },
                { "fdcId": 3, "description": "GUMMI BEARS", "brandOwner": "Albanese Confectionery Group Inc" }
            ]}),
        );
        searches.insert(
            "wild roots omega powerhouse trail mix".to_string(),
            json!({ "foods": [
                { "fdcId": 11, "description": "OMEGA POWERHOUSE TRAIL MIX", "brandOwner": "Wild Roots" },
                { "fdcId": 12, "description": "TRAIL MIX", "brandOwner": "Other Co" }
            ]}),
        );
        searches.insert(
            "bananas".to_string(),
            json!({ "foods": [ { "fdcId": 21, "description": "Bananas, raw" } ] }),
        );
        searches.insert("garbage".to_string(), json!(["not", "an", "object"]));
        StubSource { searches }
    }

    #[tokio::test]
    async fn test_resolve_preserves_order() {
        let names = vec![
            "wild roots omega powerhouse trail mix".to_string(),
            "albanese gummi bears".to_string(),
        ];
        for batch_size in [1, 2, 8] {
            let ids: Vec<FoodId> = resolve(&stub(), &matcher(), &names, true, batch_size, None)
                .await
                .into_iter()
                .map(Result::unwrap)
                .collect();
            assert_eq!(ids, vec![FoodId(11), FoodId(3)]);
        }
    }

    #[tokio::test]
    async fn test_resolve_isolates_failures() {
        let names = vec![
            "albanese gummi bears".to_string(),
            "bananas".to_string(),
            "garbage".to_string(),
            "unknown food".to_string(),
        ];
        let results = resolve(&stub(), &matcher(), &names, true, 2, None).await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap(), &FoodId(3));
        // generic food has no brandOwner, so branded mode finds nothing usable
        assert!(matches!(results[1], Err(PipelineError::NoMatch { .. })));
        assert!(matches!(results[2], Err(PipelineError::Resolution { .. })));
        assert!(matches!(results[3], Err(PipelineError::Resolution { .. })));
    }

    #[tokio::test]
    async fn test_resolve_generic_mode() {
        let names = vec!["bananas".to_string()];
        let results = resolve(&stub(), &matcher(), &names, false, 4, None).await;
        assert_eq!(results[0].as_ref().unwrap(), &FoodId(21));
    }
}
