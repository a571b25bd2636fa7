//! Query planning.
//!
//! Deterministic: three market-overview queries (worded differently when a
//! product is named), two audience queries when an audience is given, then
//! five market-intelligence queries. Cut to the configured maximum.

use crate::types::AnalysisRequest;

/// Plan the ordered search queries for a request.
pub fn plan_queries(request: &AnalysisRequest, max_queries: usize) -> Vec<String> {
    let segment = request.segment();
    let mut queries = Vec::with_capacity(10);

    match request.product() {
        Some(product) => queries.extend([
            format!("{segment} {product} market size statistics 2024"),
            format!("{segment} {product} competitive analysis opportunities"),
            format!("{segment} {product} trends future growth"),
        ]),
        None => queries.extend([
            format!("{segment} market size statistics 2024 growth"),
            format!("{segment} competitive analysis leading companies"),
            format!("{segment} trends investment opportunities"),
        ]),
    }

    if let Some(audience) = request.audience() {
        queries.extend([
            format!("{audience} consumer behavior {segment} research"),
            format!("{audience} demographic profile data"),
        ]);
    }

    queries.extend([
        format!("{segment} startups venture capital investment"),
        format!("{segment} regulation legal changes impact"),
        format!("{segment} technology innovation disruption"),
        format!("{segment} company success case studies"),
        format!("{segment} main challenges market solutions"),
    ]);

    queries.truncate(max_queries);
    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plans_overview_and_intel_without_audience() {
        let queries = plan_queries(&AnalysisRequest::new("fitness apps"), 12);

        assert_eq!(queries.len(), 8);
        assert_eq!(queries[0], "fitness apps market size statistics 2024 growth");
        assert_eq!(queries[3], "fitness apps startups venture capital investment");
        assert_eq!(queries[7], "fitness apps main challenges market solutions");
    }

    #[test]
    fn product_changes_overview_queries() {
        let request = AnalysisRequest::new("fitness apps").with_product("yoga coaching");
        let queries = plan_queries(&request, 12);

        assert_eq!(queries.len(), 8);
        assert!(queries[..3].iter().all(|q| q.contains("yoga coaching")));
        assert!(!queries[3].contains("yoga coaching"));
    }

    #[test]
    fn audience_adds_two_queries_after_overview() {
        let request = AnalysisRequest::new("fitness apps").with_audience("new mothers");
        let queries = plan_queries(&request, 12);

        assert_eq!(queries.len(), 10);
        assert_eq!(queries[3], "new mothers consumer behavior fitness apps research");
        assert_eq!(queries[4], "new mothers demographic profile data");
    }

    #[test]
    fn truncation_preserves_priority_order() {
        let request = AnalysisRequest::new("fitness apps").with_audience("new mothers");
        let full = plan_queries(&request, 12);
        let cut = plan_queries(&request, 4);

        assert_eq!(cut.len(), 4);
        assert_eq!(cut[..], full[..4]);
    }

    #[test]
    fn planning_is_deterministic() {
        let request = AnalysisRequest::new("  pet food  ").with_product("raw diets");
        assert_eq!(plan_queries(&request, 12), plan_queries(&request, 12));
        assert!(plan_queries(&request, 12)[0].starts_with("pet food raw diets"));
    }
}
