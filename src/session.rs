use log::{debug, info};
use std::path::Path;

use crate::error::Result;
use crate::extractor::extract;
use crate::impact::{ImpactComparator, ImpactComparison};
use crate::metrics::{derive, sensitivity, Metrics, SensitivityPoint};
use crate::schema::{KpiField, KpiRecord, PartialKpiRecord};

/// Owned state shared by the dashboard and impact views.
///
/// Views read through [`KpiSession::record`] and change state only through
/// the update methods, each of which keeps the record inside its bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiSession {
    record: KpiRecord,
}

impl KpiSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: KpiRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &KpiRecord {
        &self.record
    }

    /// Extracts whatever the pasted text mentions and merges it onto the
    /// current record. Blank text is ignored. Returns what was recognized.
    pub fn apply_results_from_text(&mut self, text: &str) -> PartialKpiRecord {
        if text.trim().is_empty() {
            debug!("Ignoring blank paste");
            return PartialKpiRecord::default();
        }

        let partial = extract(text);
        if !partial.is_empty() {
            self.merge(&partial);
        }
        partial
    }

    pub fn apply_results_from_file(&mut self, path: impl AsRef<Path>) -> Result<PartialKpiRecord> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(self.apply_results_from_text(&text))
    }

    pub fn merge(&mut self, partial: &PartialKpiRecord) -> Vec<KpiField> {
        let applied = self.record.merge(partial);
        info!("Applied {}", applied_labels(partial).join(", "));
        applied
    }

    pub fn set_numeric(&mut self, field: KpiField, value: f64) -> Result<()> {
        self.record.set_numeric(field, value)
    }

    pub fn set_company_name(&mut self, name: impl Into<String>) {
        self.record.set_company_name(name);
    }

    pub fn reset(&mut self) {
        self.record = KpiRecord::default();
    }

    pub fn metrics(&self) -> Metrics {
        derive(&self.record)
    }

    pub fn sensitivity(&self) -> Vec<SensitivityPoint> {
        sensitivity(&self.record)
    }

    pub fn impact(&self, comparator: &ImpactComparator) -> ImpactComparison {
        comparator.compare(&self.record)
    }
}

/// Display labels of the recognized fields, for the "Applied: ..." notice.
pub fn applied_labels(partial: &PartialKpiRecord) -> Vec<&'static str> {
    partial.fields().into_iter().map(KpiField::label).collect()
}
