use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RoiModelError};
use crate::utils::truncate_chars;

pub const MAX_COMPANY_NAME_CHARS: usize = 80;

pub const WIN_RATE_BOUNDS: FieldBounds = FieldBounds::new(1.0, 100.0);
pub const DEAL_SIZE_BOUNDS: FieldBounds = FieldBounds::new(1_000.0, 50_000_000.0);
pub const OPPTYS_BOUNDS: FieldBounds = FieldBounds::new(100.0, 10_000_000.0);
pub const REPS_BOUNDS: FieldBounds = FieldBounds::new(1.0, 100_000.0);
pub const CYCLE_BOUNDS: FieldBounds = FieldBounds::new(7.0, 730.0);
pub const COST_PER_REP_BOUNDS: FieldBounds = FieldBounds::new(50_000.0, 500_000.0);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum KpiField {
    #[schemars(description = "Company or scenario name shown on the dashboard")]
    CompanyName,

    #[schemars(description = "Share of qualified opportunities that close won, in percent")]
    WinRate,

    #[schemars(description = "Average selling price (ASP) per closed deal, in USD")]
    DealSize,

    #[schemars(description = "Qualified pipeline opportunities per year")]
    Opptys,

    #[schemars(description = "Quota-carrying sales headcount")]
    Reps,

    #[schemars(description = "Average days from opportunity creation to closed won")]
    Cycle,

    #[schemars(description = "Fully loaded annual cost of one rep, in USD")]
    CostPerRep,
}

impl KpiField {
    pub const ALL: [KpiField; 7] = [
        KpiField::CompanyName,
        KpiField::WinRate,
        KpiField::DealSize,
        KpiField::Opptys,
        KpiField::Reps,
        KpiField::Cycle,
        KpiField::CostPerRep,
    ];

    /// The six drivers of the financial model, in the order they are edited.
    pub const NUMERIC: [KpiField; 6] = [
        KpiField::WinRate,
        KpiField::DealSize,
        KpiField::Opptys,
        KpiField::Reps,
        KpiField::Cycle,
        KpiField::CostPerRep,
    ];

    pub fn key(self) -> &'static str {
        match self {
            KpiField::CompanyName => "companyName",
            KpiField::WinRate => "winRate",
            KpiField::DealSize => "dealSize",
            KpiField::Opptys => "opptys",
            KpiField::Reps => "reps",
            KpiField::Cycle => "cycle",
            KpiField::CostPerRep => "costPerRep",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KpiField::CompanyName => "Company",
            KpiField::WinRate => "Win rate",
            KpiField::DealSize => "Avg deal size (ASP)",
            KpiField::Opptys => "Annual piped opptys",
            KpiField::Reps => "Sales reps",
            KpiField::Cycle => "Sales cycle",
            KpiField::CostPerRep => "Cost per rep",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            KpiField::CompanyName => "Scenario being modeled.",
            KpiField::WinRate => "Percentage of qualified opportunities that close won.",
            KpiField::DealSize => "Average contract value per closed deal.",
            KpiField::Opptys => "Total qualified opportunities in the pipeline per year.",
            KpiField::Reps => "Quota-carrying account executives and sales roles.",
            KpiField::Cycle => "Average days from opportunity creation to closed won.",
            KpiField::CostPerRep => "Fully loaded annual cost (OTE, benefits, ramp) of one rep.",
        }
    }

    /// Hard bounds every stored value is clamped to. `None` for the name.
    pub fn bounds(self) -> Option<FieldBounds> {
        match self {
            KpiField::CompanyName => None,
            KpiField::WinRate => Some(WIN_RATE_BOUNDS),
            KpiField::DealSize => Some(DEAL_SIZE_BOUNDS),
            KpiField::Opptys => Some(OPPTYS_BOUNDS),
            KpiField::Reps => Some(REPS_BOUNDS),
            KpiField::Cycle => Some(CYCLE_BOUNDS),
            KpiField::CostPerRep => Some(COST_PER_REP_BOUNDS),
        }
    }

    /// Range offered by the interactive slider for this field.
    ///
    /// Narrower than [`KpiField::bounds`]: a pasted document may still carry
    /// values outside the slider range, and those are kept as long as they
    /// respect the hard bounds.
    pub fn input_range(self) -> Option<InputRange> {
        match self {
            KpiField::CompanyName => None,
            KpiField::WinRate => Some(InputRange::new(10.0, 60.0, 1.0)),
            KpiField::DealSize => Some(InputRange::new(50_000.0, 5_000_000.0, 10_000.0)),
            KpiField::Opptys => Some(InputRange::new(1_000.0, 500_000.0, 500.0)),
            KpiField::Reps => Some(InputRange::new(50.0, 10_000.0, 50.0)),
            KpiField::Cycle => Some(InputRange::new(30.0, 365.0, 5.0)),
            KpiField::CostPerRep => Some(InputRange::new(
                COST_PER_REP_BOUNDS.min,
                COST_PER_REP_BOUNDS.max,
                5_000.0,
            )),
        }
    }

    /// Whether stored values of this field are whole numbers.
    pub fn is_integer(self) -> bool {
        matches!(self, KpiField::Opptys | KpiField::Reps | KpiField::Cycle)
    }
}

impl fmt::Display for KpiField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
}

impl FieldBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Rounds half away from zero, then clamps.
    pub fn clamp_rounded(&self, value: f64) -> f64 {
        self.clamp(value.round())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InputRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl InputRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Position of `value` along the slider track, in percent.
    pub fn fill_percent(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)) * 100.0
    }
}

/// Unvalidated wire form of a [`KpiRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiRecordValues {
    #[schemars(description = "Company or scenario name, at most 80 characters")]
    pub company_name: String,

    #[schemars(description = "Win rate in percent. Range: 1 to 100.")]
    pub win_rate: f64,

    #[schemars(description = "Average deal size in USD. Range: 1,000 to 50,000,000.")]
    pub deal_size: f64,

    #[schemars(description = "Annual piped opportunities. Range: 100 to 10,000,000.")]
    pub opptys: u64,

    #[schemars(description = "Number of quota-carrying sales reps. Range: 1 to 100,000.")]
    pub reps: u32,

    #[schemars(description = "Average sales cycle in days. Range: 7 to 730.")]
    pub cycle: u32,

    #[schemars(
        description = "Fully loaded annual cost per rep in USD (OTE, benefits, ramp). Range: 50,000 to 500,000."
    )]
    pub cost_per_rep: f64,
}

/// The current sales-organization scenario.
///
/// Fields are private so a record can only be obtained through
/// [`KpiRecord::new`] (rejects out-of-range input), [`KpiRecord::clamped`]
/// or the clamping setters. Every observable value therefore respects
/// [`KpiField::bounds`], which keeps `reps` and `cycle` away from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KpiRecordValues", into = "KpiRecordValues")]
pub struct KpiRecord {
    company_name: String,
    win_rate: f64,
    deal_size: f64,
    opptys: u64,
    reps: u32,
    cycle: u32,
    cost_per_rep: f64,
}

impl Default for KpiRecord {
    /// Enterprise B2B defaults: strategic sales with a fully loaded rep cost.
    fn default() -> Self {
        Self {
            company_name: "Enterprise scenario".to_string(),
            win_rate: 32.0,
            deal_size: 350_000.0,
            opptys: 15_000,
            reps: 500,
            cycle: 165,
            cost_per_rep: 185_000.0,
        }
    }
}

impl KpiRecord {
    pub fn new(values: KpiRecordValues) -> Result<Self> {
        let name_len = values.company_name.chars().count();
        if name_len > MAX_COMPANY_NAME_CHARS {
            return Err(RoiModelError::NameTooLong(name_len));
        }

        check_bounds(KpiField::WinRate, values.win_rate)?;
        check_bounds(KpiField::DealSize, values.deal_size)?;
        check_bounds(KpiField::Opptys, values.opptys as f64)?;
        check_bounds(KpiField::Reps, values.reps as f64)?;
        check_bounds(KpiField::Cycle, values.cycle as f64)?;
        check_bounds(KpiField::CostPerRep, values.cost_per_rep)?;

        Ok(Self {
            company_name: values.company_name,
            win_rate: values.win_rate,
            deal_size: values.deal_size,
            opptys: values.opptys,
            reps: values.reps,
            cycle: values.cycle,
            cost_per_rep: values.cost_per_rep,
        })
    }

    /// Builds a record, pulling every out-of-range value onto its nearest bound
    /// and truncating the name.
    pub fn clamped(values: KpiRecordValues) -> Self {
        let mut record = Self::default();
        record.set_company_name(values.company_name);
        record.set_win_rate(values.win_rate);
        record.set_deal_size(values.deal_size);
        record.set_opptys(values.opptys);
        record.set_reps(values.reps);
        record.set_cycle(values.cycle);
        record.set_cost_per_rep(values.cost_per_rep);
        record
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn win_rate(&self) -> f64 {
        self.win_rate
    }

    pub fn deal_size(&self) -> f64 {
        self.deal_size
    }

    pub fn opptys(&self) -> u64 {
        self.opptys
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn cost_per_rep(&self) -> f64 {
        self.cost_per_rep
    }

    pub fn numeric(&self, field: KpiField) -> Option<f64> {
        match field {
            KpiField::CompanyName => None,
            KpiField::WinRate => Some(self.win_rate),
            KpiField::DealSize => Some(self.deal_size),
            KpiField::Opptys => Some(self.opptys as f64),
            KpiField::Reps => Some(self.reps as f64),
            KpiField::Cycle => Some(self.cycle as f64),
            KpiField::CostPerRep => Some(self.cost_per_rep),
        }
    }

    pub fn set_company_name(&mut self, name: impl Into<String>) {
        self.company_name = truncate_chars(&name.into(), MAX_COMPANY_NAME_CHARS);
    }

    pub fn set_win_rate(&mut self, value: f64) {
        self.win_rate = WIN_RATE_BOUNDS.clamp(value);
    }

    pub fn set_deal_size(&mut self, value: f64) {
        self.deal_size = DEAL_SIZE_BOUNDS.clamp(value);
    }

    pub fn set_opptys(&mut self, value: u64) {
        self.opptys = OPPTYS_BOUNDS.clamp(value as f64) as u64;
    }

    pub fn set_reps(&mut self, value: u32) {
        self.reps = REPS_BOUNDS.clamp(value as f64) as u32;
    }

    pub fn set_cycle(&mut self, value: u32) {
        self.cycle = CYCLE_BOUNDS.clamp(value as f64) as u32;
    }

    pub fn set_cost_per_rep(&mut self, value: f64) {
        self.cost_per_rep = COST_PER_REP_BOUNDS.clamp(value);
    }

    /// Slider entry point: sets any numeric field, rounding whole-number
    /// fields and clamping to the field bounds.
    pub fn set_numeric(&mut self, field: KpiField, value: f64) -> Result<()> {
        let bounds = field.bounds().ok_or(RoiModelError::NotNumeric(field))?;
        let value = if field.is_integer() {
            bounds.clamp_rounded(value)
        } else {
            bounds.clamp(value)
        };

        match field {
            KpiField::CompanyName => return Err(RoiModelError::NotNumeric(field)),
            KpiField::WinRate => self.win_rate = value,
            KpiField::DealSize => self.deal_size = value,
            KpiField::Opptys => self.opptys = value as u64,
            KpiField::Reps => self.reps = value as u32,
            KpiField::Cycle => self.cycle = value as u32,
            KpiField::CostPerRep => self.cost_per_rep = value,
        }
        Ok(())
    }

    /// Overwrites the fields present in `partial`, leaving all others untouched.
    /// Returns the fields that were applied.
    pub fn merge(&mut self, partial: &PartialKpiRecord) -> Vec<KpiField> {
        if let Some(name) = &partial.company_name {
            self.set_company_name(name.clone());
        }
        if let Some(v) = partial.win_rate {
            self.set_win_rate(v);
        }
        if let Some(v) = partial.deal_size {
            self.set_deal_size(v);
        }
        if let Some(v) = partial.opptys {
            self.set_opptys(v);
        }
        if let Some(v) = partial.reps {
            self.set_reps(v);
        }
        if let Some(v) = partial.cycle {
            self.set_cycle(v);
        }
        if let Some(v) = partial.cost_per_rep {
            self.set_cost_per_rep(v);
        }
        partial.fields()
    }

    pub fn merged(&self, partial: &PartialKpiRecord) -> Self {
        let mut record = self.clone();
        record.merge(partial);
        record
    }

    pub fn values(&self) -> KpiRecordValues {
        KpiRecordValues::from(self.clone())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(KpiRecordValues)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

fn check_bounds(field: KpiField, value: f64) -> Result<()> {
    match field.bounds() {
        Some(bounds) if !bounds.contains(value) => Err(RoiModelError::OutOfBounds {
            field,
            value,
            min: bounds.min,
            max: bounds.max,
        }),
        _ => Ok(()),
    }
}

impl TryFrom<KpiRecordValues> for KpiRecord {
    type Error = RoiModelError;

    fn try_from(values: KpiRecordValues) -> Result<Self> {
        Self::new(values)
    }
}

impl From<KpiRecord> for KpiRecordValues {
    fn from(record: KpiRecord) -> Self {
        Self {
            company_name: record.company_name,
            win_rate: record.win_rate,
            deal_size: record.deal_size,
            opptys: record.opptys,
            reps: record.reps,
            cycle: record.cycle,
            cost_per_rep: record.cost_per_rep,
        }
    }
}

/// The fields recognized in one pasted document. Absent fields are `None`,
/// never a zero or a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartialKpiRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opptys: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_rep: Option<f64>,
}

impl PartialKpiRecord {
    pub fn contains(&self, field: KpiField) -> bool {
        match field {
            KpiField::CompanyName => self.company_name.is_some(),
            KpiField::WinRate => self.win_rate.is_some(),
            KpiField::DealSize => self.deal_size.is_some(),
            KpiField::Opptys => self.opptys.is_some(),
            KpiField::Reps => self.reps.is_some(),
            KpiField::Cycle => self.cycle.is_some(),
            KpiField::CostPerRep => self.cost_per_rep.is_some(),
        }
    }

    /// Recognized fields in [`KpiField::ALL`] order.
    pub fn fields(&self) -> Vec<KpiField> {
        KpiField::ALL
            .into_iter()
            .filter(|field| self.contains(*field))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn numeric(&self, field: KpiField) -> Option<f64> {
        match field {
            KpiField::CompanyName => None,
            KpiField::WinRate => self.win_rate,
            KpiField::DealSize => self.deal_size,
            KpiField::Opptys => self.opptys.map(|v| v as f64),
            KpiField::Reps => self.reps.map(|v| v as f64),
            KpiField::Cycle => self.cycle.map(|v| v as f64),
            KpiField::CostPerRep => self.cost_per_rep,
        }
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(PartialKpiRecord))
    }
}
