pub mod enums;
pub mod patient;
pub mod premium;
pub mod validation;

pub use enums::*;
pub use patient::{CreatePatientRequest, Patient, PatientDraft, PatientEntry, PatientUpdate};
pub use premium::{PredictionDraft, PredictionInput};
pub use validation::{Field, FieldViolation, ValidationError};
