//! # Sales ROI Model
//!
//! A library for turning pasted sales KPI documents (tables, bullet summaries,
//! prose) into a bounded sales-organization model, and for deriving revenue,
//! ROI and pipeline metrics from it, with and without a sales-enablement
//! platform.
//!
//! ## Core Concepts
//!
//! - **KPI Record**: six drivers (win rate, deal size, annual opportunities,
//!   reps, cycle, cost per rep) plus a scenario name, always inside fixed bounds
//! - **Extraction**: ordered pattern tables per field; the first valid match wins
//!   and unrecognized fields stay unset
//! - **Metrics**: pure arithmetic over a record (pipeline value, revenue, ROI,
//!   revenue per rep, pipeline velocity, win-rate sensitivity)
//! - **Impact**: fixed uplift assumptions applied to the baseline, compared
//!   side by side and never displayed as worse than the baseline
//!
//! ## Example
//!
//! ```rust,ignore
//! use sales_roi_model::*;
//!
//! let mut session = KpiSession::new();
//! let applied = session.apply_results_from_text(
//!     "| **Win Rate** | 28% |\n| **Number of Sales Reps** | 120 |",
//! );
//! println!("Applied: {}", applied_labels(&applied).join(", "));
//!
//! let metrics = session.metrics();
//! let impact = session.impact(&ImpactComparator::default());
//! println!("ROI {:.1}% -> {:.1}%", metrics.roi_percent, impact.with_product.roi_percent);
//! ```

pub mod document;
pub mod error;
pub mod extractor;
pub mod impact;
pub mod metrics;
pub mod schema;
pub mod session;
pub mod utils;

pub use document::{render_document, DocumentShape};
pub use error::{Result, RoiModelError};
pub use extractor::{extract, extract_company_name, extract_value, pattern_table};
pub use impact::*;
pub use metrics::*;
pub use schema::*;
pub use session::{applied_labels, KpiSession};
pub use utils::*;

use log::{debug, info};
use serde::Serialize;

/// Everything the dashboard and impact views show for one paste.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelReport {
    /// Fields recognized in the pasted text.
    pub extracted: PartialKpiRecord,
    /// The baseline after merging the recognized fields.
    pub record: KpiRecord,
    pub metrics: Metrics,
    pub sensitivity: Vec<SensitivityPoint>,
    pub impact: ImpactComparison,
}

pub struct RoiModelProcessor;

impl RoiModelProcessor {
    /// Paste -> extract -> merge -> derive baseline and with-platform metrics.
    pub fn process(
        base: &KpiRecord,
        text: &str,
        comparator: &ImpactComparator,
    ) -> ModelReport {
        let extracted = extract(text);
        let record = base.merged(&extracted);

        info!(
            "Processing ROI model for scenario: {}",
            record.company_name()
        );
        debug!(
            "Recognized fields: {}",
            applied_labels(&extracted).join(", ")
        );

        ModelReport {
            metrics: derive(&record),
            sensitivity: sensitivity(&record),
            impact: comparator.compare(&record),
            extracted,
            record,
        }
    }

    pub fn process_to_json(
        base: &KpiRecord,
        text: &str,
        comparator: &ImpactComparator,
    ) -> Result<String> {
        let report = Self::process(base, text, comparator);
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

pub fn process_pasted_document(base: &KpiRecord, text: &str) -> ModelReport {
    RoiModelProcessor::process(base, text, &ImpactComparator::default())
}
