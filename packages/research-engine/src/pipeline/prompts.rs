//! Prompt construction.
//!
//! Pure functions from (request, corpus) to a bounded prompt string. The
//! literal template is versioned and hashed so every report records exactly
//! which instructions produced it.

use std::fmt::Write as _;
use std::sync::LazyLock;

use extraction::text::excerpt;
use sha2::{Digest, Sha256};

use crate::types::{AnalysisRequest, PipelineConfig, ResearchCorpus};

/// Version of [`ANALYSIS_TEMPLATE`]. Bump on any wording change.
pub const PROMPT_VERSION: &str = "market-analysis/2024-06";

/// Shown for request fields the caller left out.
const NOT_SPECIFIED: &str = "not specified";

/// The analysis prompt. `{{request}}`, `{{research}}` and `{{schema}}` are
/// substituted by [`build_analysis_prompt`].
pub const ANALYSIS_TEMPLATE: &str = r#"# MARKET ANALYSIS

You are a senior market research director. Build a detailed, evidence-based
market analysis from the project data and the web research below.

## PROJECT DATA
{{request}}

## WEB RESEARCH
{{research}}

## INSTRUCTIONS

Return ONE valid JSON object and nothing else: no explanations, no markdown.
Start with { and end with }.

Use ONLY facts supported by the research above. Never invent, simulate or
pad information. If the research does not support a section, return that
section as an empty value instead of filling it.

The object must have exactly these top-level sections:

{{schema}}

"exclusive_insights" must hold 25-35 specific, non-obvious insights, each
traceable to the research.
"#;

/// Shape of the expected JSON object.
pub const ANALYSIS_SCHEMA: &str = r#"{
  "customer_avatar": {
    "persona_name": "Representative name for the core customer",
    "demographic_profile": {"age": "", "gender": "", "income": "", "education": "", "location": "", "occupation": ""},
    "psychographic_profile": {"personality": "", "values": "", "interests": "", "lifestyle": "", "buying_behavior": "", "influencers": "", "deep_fears": "", "aspirations": ""},
    "pain_points": ["12-15 specific pains documented in the research"],
    "desires": ["12-15 specific desires documented in the research"],
    "objections": ["10-12 specific objections"],
    "emotional_journey": {"awareness": "", "consideration": "", "decision": "", "post_purchase": ""},
    "language": {"pain_phrases": [], "desire_phrases": [], "metaphors": [], "niche_vocabulary": [], "tone": ""}
  },
  "positioning": {
    "market_position": "", "value_proposition": "", "differentiators": [], "core_message": "",
    "tone_of_voice": "", "niche": "", "blue_ocean_strategy": "", "price_anchoring": ""
  },
  "competitive_analysis": [
    {"name": "", "swot": {"strengths": [], "weaknesses": [], "opportunities": [], "threats": []},
     "marketing_strategy": "", "positioning": "", "vulnerabilities": [], "estimated_market_share": ""}
  ],
  "keyword_strategy": {
    "primary_keywords": [], "secondary_keywords": [], "long_tail": [],
    "search_intent": {"informational": [], "navigational": [], "transactional": []},
    "content_strategy": "", "seasonality": "", "seo_opportunities": ""
  },
  "performance_metrics": {
    "kpis": [{"metric": "", "target": "", "frequency": "", "owner": ""}],
    "financial_projections": {
      "conservative": {"monthly_revenue": "", "monthly_customers": "", "average_ticket": "", "profit_margin": ""},
      "realistic": {"monthly_revenue": "", "monthly_customers": "", "average_ticket": "", "profit_margin": ""},
      "optimistic": {"monthly_revenue": "", "monthly_customers": "", "average_ticket": "", "profit_margin": ""}
    },
    "expected_roi": "", "payback_period": "", "lifetime_value": ""
  },
  "sales_funnel": {
    "top_of_funnel": {"goal": "", "strategies": [], "content": [], "metrics": [], "investment": ""},
    "middle_of_funnel": {"goal": "", "strategies": [], "content": [], "metrics": [], "investment": ""},
    "bottom_of_funnel": {"goal": "", "strategies": [], "content": [], "metrics": [], "investment": ""}
  },
  "action_plan": {
    "days_1_30": {"focus": "", "activities": [], "investment": "", "deliverables": [], "metrics": []},
    "days_31_60": {"focus": "", "activities": [], "investment": "", "deliverables": [], "metrics": []},
    "days_61_90": {"focus": "", "activities": [], "investment": "", "deliverables": [], "metrics": []}
  },
  "exclusive_insights": ["insight grounded in the research"]
}"#;

static TEMPLATE_SHA256: LazyLock<String> = LazyLock::new(|| {
    let mut hasher = Sha256::new();
    hasher.update(ANALYSIS_TEMPLATE.as_bytes());
    hasher.update(ANALYSIS_SCHEMA.as_bytes());
    hex::encode(hasher.finalize())
});

/// SHA-256 of the template and schema, hex-encoded.
pub fn template_sha256() -> &'static str {
    &TEMPLATE_SHA256
}

fn text_field(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_SPECIFIED)
}

fn money_field(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_SPECIFIED.to_string(), |v| format!("{:.2}", v))
}

/// The request as a bullet list.
pub fn render_request(request: &AnalysisRequest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "- **Segment**: {}", request.segment());
    let _ = writeln!(out, "- **Product/Service**: {}", text_field(request.product()));
    let _ = writeln!(out, "- **Target audience**: {}", text_field(request.audience()));
    let _ = writeln!(out, "- **Price**: {}", money_field(request.price));
    let _ = writeln!(out, "- **Revenue goal**: {}", money_field(request.revenue_goal));
    let _ = writeln!(out, "- **Marketing budget**: {}", money_field(request.marketing_budget));
    let _ = writeln!(out, "- **Launch timeline**: {}", text_field(request.timeline()));
    let _ = writeln!(out, "- **Competitors**: {}", text_field(request.competitors()));
    let _ = write!(out, "- **Additional notes**: {}", text_field(request.notes()));
    out
}

/// Top sources with excerpts plus aggregate statistics, cut to the context
/// ceiling.
pub fn render_research_context(corpus: &ResearchCorpus, config: &PipelineConfig) -> String {
    let mut out = String::from("Real web research collected for this analysis:\n\n");

    for (i, source) in corpus.top(config.prompt_top_sources).iter().enumerate() {
        let _ = writeln!(out, "--- SOURCE {}: {} ---", i + 1, source.title);
        let _ = writeln!(out, "URL: {}", source.url);
        let _ = writeln!(out, "Relevance: {:.2}", source.relevance_score);
        let _ = writeln!(out, "Content: {}\n", excerpt(&source.content, config.excerpt_chars));
    }

    let _ = writeln!(out, "=== RESEARCH STATISTICS ===");
    let _ = writeln!(out, "Queries executed: {}", corpus.queries.len());
    let _ = writeln!(out, "Search results found: {}", corpus.total_results);
    let _ = writeln!(out, "Unique pages analyzed: {}", corpus.unique_sources());
    let _ = writeln!(out, "Characters extracted: {}", corpus.total_char_count);

    excerpt(&out, config.max_context_chars).to_string()
}

/// The full analysis prompt.
pub fn build_analysis_prompt(
    request: &AnalysisRequest,
    corpus: &ResearchCorpus,
    config: &PipelineConfig,
) -> String {
    ANALYSIS_TEMPLATE
        .replace("{{request}}", &render_request(request))
        .replace("{{research}}", &render_research_context(corpus, config))
        .replace("{{schema}}", ANALYSIS_SCHEMA)
}
