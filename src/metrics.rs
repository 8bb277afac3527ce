use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::KpiRecord;
use crate::utils::{format_compact, format_currency, format_percent};

/// Win-rate offsets, in percentage points, plotted by the sensitivity chart.
pub const SENSITIVITY_DELTAS: [f64; 4] = [-5.0, 0.0, 5.0, 10.0];

const DAYS_PER_MONTH: f64 = 30.0;

/// The numeric inputs of the financial model.
///
/// Built from a bounded [`KpiRecord`] or by the impact comparator, never from
/// raw numbers, so `reps` and `cycle` stay strictly positive and every
/// formula below is total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Drivers {
    win_rate: f64,
    deal_size: f64,
    opptys: f64,
    reps: f64,
    cycle: f64,
    cost_per_rep: f64,
}

impl Drivers {
    pub(crate) fn with_uplift(&self, win_rate: f64, cycle: f64, opptys: f64) -> Self {
        Self {
            win_rate,
            cycle,
            opptys,
            ..*self
        }
    }

    pub fn win_rate(&self) -> f64 {
        self.win_rate
    }

    pub fn deal_size(&self) -> f64 {
        self.deal_size
    }

    pub fn opptys(&self) -> f64 {
        self.opptys
    }

    pub fn reps(&self) -> f64 {
        self.reps
    }

    pub fn cycle(&self) -> f64 {
        self.cycle
    }

    pub fn cost_per_rep(&self) -> f64 {
        self.cost_per_rep
    }
}

impl From<&KpiRecord> for Drivers {
    fn from(record: &KpiRecord) -> Self {
        Self {
            win_rate: record.win_rate(),
            deal_size: record.deal_size(),
            opptys: record.opptys() as f64,
            reps: record.reps() as f64,
            cycle: record.cycle() as f64,
            cost_per_rep: record.cost_per_rep(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_pipeline_value: f64,
    pub projected_revenue: f64,
    pub total_cost: f64,
    pub net_profit: f64,
    /// Net profit over total rep cost, in percent.
    pub roi_percent: f64,
    pub revenue_per_rep: f64,
    pub deals_per_rep: f64,
    pub pipeline_velocity_per_month: f64,
}

impl Metrics {
    /// Same metrics with an extra annual cost charged against net profit.
    /// ROI keeps rep cost as its denominator.
    pub fn net_of(&self, extra_annual_cost: f64) -> Self {
        let net_profit = self.net_profit - extra_annual_cost;
        Self {
            net_profit,
            roi_percent: (net_profit / self.total_cost) * 100.0,
            ..*self
        }
    }

    /// The four headline dashboard cards.
    pub fn summary_cards(&self, drivers: &Drivers) -> Vec<SummaryCard> {
        vec![
            SummaryCard {
                title: "Projected Revenue",
                value: format_currency(self.projected_revenue),
                trend: "From pipeline × win rate".to_string(),
            },
            SummaryCard {
                title: "Est. ROI",
                value: format_percent(self.roi_percent),
                trend: "Based on Rep Cost".to_string(),
            },
            SummaryCard {
                title: "Revenue Per Rep",
                value: format_currency(self.revenue_per_rep),
                trend: format!("{:.1} Deals/Rep", self.deals_per_rep),
            },
            SummaryCard {
                title: "Pipeline Velocity",
                value: format!("${} / mo", format_compact(self.pipeline_velocity_per_month)),
                trend: format!("{} Days Avg Cycle", drivers.cycle()),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub title: &'static str,
    pub value: String,
    pub trend: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityPoint {
    /// Chart label, e.g. `"37%"`.
    pub name: String,
    pub win_rate: f64,
    pub revenue: f64,
    pub is_current: bool,
}

pub fn derive(record: &KpiRecord) -> Metrics {
    derive_drivers(&Drivers::from(record))
}

pub fn derive_drivers(drivers: &Drivers) -> Metrics {
    let total_pipeline_value = drivers.opptys * drivers.deal_size;
    let projected_revenue = total_pipeline_value * (drivers.win_rate / 100.0);
    let total_cost = drivers.reps * drivers.cost_per_rep;
    let net_profit = projected_revenue - total_cost;

    Metrics {
        total_pipeline_value,
        projected_revenue,
        total_cost,
        net_profit,
        roi_percent: (net_profit / total_cost) * 100.0,
        revenue_per_rep: projected_revenue / drivers.reps,
        deals_per_rep: (drivers.opptys * (drivers.win_rate / 100.0)) / drivers.reps,
        pipeline_velocity_per_month: total_pipeline_value / (drivers.cycle / DAYS_PER_MONTH),
    }
}

/// Revenue at the current win rate and at each offset in
/// [`SENSITIVITY_DELTAS`], each clamped to 0..=100.
pub fn sensitivity(record: &KpiRecord) -> Vec<SensitivityPoint> {
    let drivers = Drivers::from(record);
    SENSITIVITY_DELTAS
        .iter()
        .map(|delta| {
            let win_rate = (drivers.win_rate + delta).clamp(0.0, 100.0);
            SensitivityPoint {
                name: format!("{}%", win_rate),
                win_rate,
                revenue: drivers.opptys * drivers.deal_size * (win_rate / 100.0),
                is_current: *delta == 0.0,
            }
        })
        .collect()
}
