//! Before/after comparison for adopting a sales-enablement platform.
//!
//! The displayed "with platform" value of every comparison row is floored (or,
//! for cycle time, capped) at the baseline, so the comparison never shows the
//! platform doing worse than the status quo. This is a presentation rule: the
//! faithfully computed values stay available in [`ComparisonRow::computed`]
//! and in [`ImpactComparison::with_product`].

use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::metrics::{derive_drivers, Drivers, Metrics, SummaryCard};
use crate::schema::KpiRecord;
use crate::utils::format_currency;

/// The improved cycle never drops below this many days.
pub const MIN_IMPROVED_CYCLE_DAYS: u32 = 30;

/// Assumed effect of the platform, aligned with published B2B enablement
/// outcomes (win rate +3 to 6 pts, cycle -10 to 20%, pipeline visibility +5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpliftAssumptions {
    #[schemars(description = "Win-rate lift in percentage points")]
    pub win_rate_lift_points: f64,

    #[schemars(description = "Days removed from the average sales cycle")]
    pub cycle_reduction_days: u32,

    #[schemars(description = "Fractional lift in qualified opportunities, e.g. 0.05 for +5%")]
    pub pipeline_visibility_lift: f64,
}

impl Default for UpliftAssumptions {
    fn default() -> Self {
        Self {
            win_rate_lift_points: 5.0,
            cycle_reduction_days: 22,
            pipeline_visibility_lift: 0.05,
        }
    }
}

impl UpliftAssumptions {
    /// The hypothetical drivers after adoption. Reps, deal size and rep cost
    /// are unchanged.
    pub fn apply(&self, baseline: &KpiRecord) -> Drivers {
        let win_rate = (baseline.win_rate() + self.win_rate_lift_points).min(100.0);
        let cycle = baseline
            .cycle()
            .saturating_sub(self.cycle_reduction_days)
            .max(MIN_IMPROVED_CYCLE_DAYS);
        let opptys = (baseline.opptys() as f64 * (1.0 + self.pipeline_visibility_lift)).round();

        Drivers::from(baseline).with_uplift(win_rate, cycle as f64, opptys)
    }
}

/// Per-seat annual list pricing, bounded by a floor and a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformPricing {
    pub per_rep_annual: f64,
    pub min_annual: f64,
    pub max_annual: f64,
}

impl Default for PlatformPricing {
    fn default() -> Self {
        Self {
            per_rep_annual: 320.0,
            min_annual: 95_000.0,
            max_annual: 750_000.0,
        }
    }
}

impl PlatformPricing {
    pub fn annual_cost(&self, reps: u32) -> f64 {
        (reps as f64 * self.per_rep_annual)
            .max(self.min_annual)
            .min(self.max_annual)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub name: &'static str,
    pub unit: &'static str,
    pub direction: Direction,
    pub baseline: f64,
    /// Value the model actually produced for the with-platform scenario.
    pub computed: f64,
    /// `computed`, never worse than `baseline`.
    pub displayed: f64,
}

impl ComparisonRow {
    fn new(
        name: &'static str,
        unit: &'static str,
        direction: Direction,
        baseline: f64,
        computed: f64,
    ) -> Self {
        let displayed = match direction {
            Direction::HigherIsBetter => baseline.max(computed),
            Direction::LowerIsBetter => baseline.min(computed),
        };
        Self {
            name,
            unit,
            direction,
            baseline,
            computed,
            displayed,
        }
    }

    /// Whether the display rule overrode the computed value.
    pub fn is_floored(&self) -> bool {
        self.displayed != self.computed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactComparison {
    pub baseline_drivers: Drivers,
    pub with_product_drivers: Drivers,
    pub baseline: Metrics,
    /// Net of the platform cost.
    pub with_product: Metrics,
    pub platform_annual_cost: f64,
    /// Win rate, cycle and ROI.
    pub kpi_rows: Vec<ComparisonRow>,
    /// Projected revenue, net profit and revenue per rep.
    pub financial_rows: Vec<ComparisonRow>,
    pub revenue_lift: f64,
    pub roi_lift: f64,
    pub cycle_improvement_days: f64,
    /// Nominal cycle reduction as a whole percentage of the baseline cycle.
    pub cycle_reduction_percent: f64,
}

impl ImpactComparison {
    pub fn row(&self, name: &str) -> Option<&ComparisonRow> {
        self.kpi_rows
            .iter()
            .chain(self.financial_rows.iter())
            .find(|row| row.name == name)
    }

    /// The four impact headline cards.
    pub fn summary_cards(&self) -> Vec<SummaryCard> {
        vec![
            SummaryCard {
                title: "Revenue lift",
                value: format_currency(self.revenue_lift),
                trend: "With platform vs. baseline".to_string(),
            },
            SummaryCard {
                title: "ROI improvement",
                value: format!("+{:.1}%", self.roi_lift),
                trend: "Net of platform investment".to_string(),
            },
            SummaryCard {
                title: "Cycle reduction",
                value: format!("−{} days", self.cycle_improvement_days),
                trend: "Avg. sales cycle".to_string(),
            },
            SummaryCard {
                title: "Win rate",
                value: format!(
                    "{}% → {}%",
                    self.baseline_drivers.win_rate(),
                    self.with_product_drivers.win_rate()
                ),
                trend: "Baseline → with platform".to_string(),
            },
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpactComparator {
    #[serde(default)]
    pub uplift: UpliftAssumptions,
    #[serde(default)]
    pub pricing: PlatformPricing,
}

impl ImpactComparator {
    pub fn new(uplift: UpliftAssumptions, pricing: PlatformPricing) -> Self {
        Self { uplift, pricing }
    }

    pub fn compare(&self, baseline: &KpiRecord) -> ImpactComparison {
        let baseline_drivers = Drivers::from(baseline);
        let with_product_drivers = self.uplift.apply(baseline);
        let platform_annual_cost = self.pricing.annual_cost(baseline.reps());

        let base = derive_drivers(&baseline_drivers);
        let improved = derive_drivers(&with_product_drivers).net_of(platform_annual_cost);

        debug!(
            "Impact for {}: revenue {} -> {}, ROI {:.1}% -> {:.1}%, platform cost {}",
            baseline.company_name(),
            base.projected_revenue,
            improved.projected_revenue,
            base.roi_percent,
            improved.roi_percent,
            platform_annual_cost
        );

        let kpi_rows = vec![
            ComparisonRow::new(
                "Win Rate",
                "%",
                Direction::HigherIsBetter,
                baseline_drivers.win_rate(),
                with_product_drivers.win_rate(),
            ),
            ComparisonRow::new(
                "Avg Cycle (Days)",
                "",
                Direction::LowerIsBetter,
                baseline_drivers.cycle(),
                with_product_drivers.cycle(),
            ),
            ComparisonRow::new(
                "ROI",
                "%",
                Direction::HigherIsBetter,
                base.roi_percent,
                improved.roi_percent,
            ),
        ];

        let financial_rows = vec![
            ComparisonRow::new(
                "Projected Revenue",
                "$",
                Direction::HigherIsBetter,
                base.projected_revenue,
                improved.projected_revenue,
            ),
            ComparisonRow::new(
                "Net Profit",
                "$",
                Direction::HigherIsBetter,
                base.net_profit,
                improved.net_profit,
            ),
            ComparisonRow::new(
                "Revenue per Rep",
                "$",
                Direction::HigherIsBetter,
                base.revenue_per_rep,
                improved.revenue_per_rep,
            ),
        ];

        ImpactComparison {
            revenue_lift: (improved.projected_revenue - base.projected_revenue).max(0.0),
            roi_lift: (improved.roi_percent - base.roi_percent).max(0.0),
            cycle_improvement_days: (baseline_drivers.cycle() - with_product_drivers.cycle())
                .max(0.0),
            cycle_reduction_percent: (self.uplift.cycle_reduction_days as f64
                / baseline_drivers.cycle()
                * 100.0)
                .round(),
            baseline_drivers,
            with_product_drivers,
            baseline: base,
            with_product: improved,
            platform_annual_cost,
            kpi_rows,
            financial_rows,
        }
    }
}
