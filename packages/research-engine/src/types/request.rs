//! The caller's analysis request.

use serde::{Deserialize, Serialize};

use crate::error::{FailureKind, PipelineResult};
use crate::pipeline::gate::ensure;

/// Minimum length of the market segment after trimming.
pub const MIN_SEGMENT_CHARS: usize = 3;

/// Business/market description supplied by the caller.
///
/// Immutable once the pipeline starts. Optional text fields that are empty or
/// whitespace count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Market segment, e.g. "fitness apps". Required.
    pub segment: String,

    #[serde(default)]
    pub product: Option<String>,

    /// Target audience description.
    #[serde(default)]
    pub audience: Option<String>,

    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default)]
    pub revenue_goal: Option<f64>,

    #[serde(default)]
    pub marketing_budget: Option<f64>,

    /// Launch timeline, free text.
    #[serde(default)]
    pub timeline: Option<String>,

    #[serde(default)]
    pub competitors: Option<String>,

    /// Anything else the caller wants the analyst to know.
    #[serde(default)]
    pub notes: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AnalysisRequest {
    /// Create a request for a segment.
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            ..Default::default()
        }
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_revenue_goal(mut self, goal: f64) -> Self {
        self.revenue_goal = Some(goal);
        self
    }

    pub fn with_marketing_budget(mut self, budget: f64) -> Self {
        self.marketing_budget = Some(budget);
        self
    }

    pub fn with_timeline(mut self, timeline: impl Into<String>) -> Self {
        self.timeline = Some(timeline.into());
        self
    }

    pub fn with_competitors(mut self, competitors: impl Into<String>) -> Self {
        self.competitors = Some(competitors.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Trimmed segment.
    pub fn segment(&self) -> &str {
        self.segment.trim()
    }

    pub fn product(&self) -> Option<&str> {
        present(&self.product)
    }

    pub fn audience(&self) -> Option<&str> {
        present(&self.audience)
    }

    pub fn timeline(&self) -> Option<&str> {
        present(&self.timeline)
    }

    pub fn competitors(&self) -> Option<&str> {
        present(&self.competitors)
    }

    pub fn notes(&self) -> Option<&str> {
        present(&self.notes)
    }

    /// Reject requests the pipeline cannot research.
    pub fn validate(&self) -> PipelineResult<()> {
        let segment_chars = self.segment().chars().count();
        ensure(
            segment_chars >= MIN_SEGMENT_CHARS,
            FailureKind::InputInvalid,
            format!(
                "segment must have at least {} characters, got {}",
                MIN_SEGMENT_CHARS, segment_chars
            ),
        )?;

        for (field, value) in [
            ("price", self.price),
            ("revenue_goal", self.revenue_goal),
            ("marketing_budget", self.marketing_budget),
        ] {
            if let Some(v) = value {
                ensure(
                    v.is_finite() && v >= 0.0,
                    FailureKind::InputInvalid,
                    format!("{} must be a non-negative number, got {}", field, v),
                )?;
            }
        }
        Ok(())
    }
}
