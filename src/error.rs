use thiserror::Error;

use crate::schema::KpiField;

#[derive(Error, Debug)]
pub enum RoiModelError {
    #[error("{field} value {value} is outside the allowed range [{min}, {max}]")]
    OutOfBounds {
        field: KpiField,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Company name is {0} characters long: must be at most 80")]
    NameTooLong(usize),

    #[error("Field {0} does not hold a numeric value")]
    NotNumeric(KpiField),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RoiModelError>;
