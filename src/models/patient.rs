//! Patient record schema.
//!
//! `PatientDraft` is the raw, all-optional payload shape used for create
//! bodies, partial updates, and stored file entries. `Patient` can only be
//! obtained by validating a draft; its derived `bmi`/`verdict` are computed
//! from height and weight on every access and cannot be set.

use serde::{Deserialize, Serialize, Serializer};

use super::enums::{Gender, SortField, Verdict};
use super::validation::{Field, ValidationError, Violations};

/// Exclusive bounds for `age`.
pub const AGE_LOWER: i64 = 0;
pub const AGE_UPPER: i64 = 120;

const UNDERWEIGHT_BELOW: f64 = 18.5;
const OBESE_FROM: f64 = 30.0;

/// Body mass index, unrounded. Callers guarantee `height > 0`.
pub fn body_mass_index(weight_kg: f64, height_m: f64) -> f64 {
    weight_kg / (height_m * height_m)
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Drop a height/weight pair whose BMI overflows to infinity, recording a
/// `height` violation. Each value on its own has already been checked.
pub fn finite_bmi_inputs(
    v: &mut Violations,
    height: Option<f64>,
    weight: Option<f64>,
) -> (Option<f64>, Option<f64>) {
    match (height, weight) {
        (Some(h), Some(w)) if !round2(body_mass_index(w, h)).is_finite() => {
            v.push("height", format!("too small for a weight of {w}: bmi is not a finite number"));
            (None, None)
        }
        pair => pair,
    }
}

/// Weight verdict for an already-rounded BMI.
pub fn verdict_for(bmi: f64) -> Verdict {
    if bmi < UNDERWEIGHT_BELOW {
        Verdict::Underweight
    } else if bmi < OBESE_FROM {
        Verdict::Normal
    } else {
        Verdict::Obese
    }
}

// ═══════════════════════════════════════════════════════════
// Raw payloads
// ═══════════════════════════════════════════════════════════

/// Unvalidated patient fields. Unknown keys (including stored
/// `bmi`/`verdict`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PatientDraft {
    pub name: Field<String>,
    pub city: Field<String>,
    pub age: Field<i64>,
    pub gender: Field<String>,
    pub height: Field<f64>,
    pub weight: Field<f64>,
}

/// Partial update body: only supplied keys overwrite stored ones. An
/// explicit `null` is supplied, and fails re-validation.
pub type PatientUpdate = PatientDraft;

impl PatientDraft {
    /// Overlay every key present in `update` onto `self`.
    pub fn merged_with(self, update: PatientUpdate) -> PatientDraft {
        PatientDraft {
            name: update.name.or(self.name),
            city: update.city.or(self.city),
            age: update.age.or(self.age),
            gender: update.gender.or(self.gender),
            height: update.height.or(self.height),
            weight: update.weight.or(self.weight),
        }
    }

    /// Validate into a `Patient`, recording violations into `v` so callers
    /// can combine them with their own (e.g. the `id` on create).
    fn check(self, v: &mut Violations) -> Option<Patient> {
        let name = v.non_blank("name", self.name);
        let city = v.non_blank("city", self.city);
        let age = v.between("age", self.age, AGE_LOWER, AGE_UPPER);
        let gender = v.parse_enum::<Gender>("gender", self.gender, Gender::ALL);
        let height = v.positive("height", self.height);
        let weight = v.positive("weight", self.weight);
        let (height, weight) = finite_bmi_inputs(v, height, weight);

        Some(Patient {
            name: name?,
            city: city?,
            age: u8::try_from(age?).ok()?,
            gender: gender?,
            height: height?,
            weight: weight?,
        })
    }
}

impl From<&Patient> for PatientDraft {
    fn from(p: &Patient) -> Self {
        PatientDraft {
            name: p.name.clone().into(),
            city: p.city.clone().into(),
            age: i64::from(p.age).into(),
            gender: p.gender.as_str().to_string().into(),
            height: p.height.into(),
            weight: p.weight.into(),
        }
    }
}

/// `POST /create` body: a full record plus its client-supplied id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatePatientRequest {
    pub id: Field<String>,
    #[serde(flatten)]
    pub fields: PatientDraft,
}

impl CreatePatientRequest {
    /// Validate id and fields together, reporting every violation.
    pub fn validate(self) -> Result<(String, Patient), ValidationError> {
        let mut v = Violations::new();
        let id = v.non_blank("id", self.id).map(|id| id.trim().to_string());
        let patient = self.fields.check(&mut v);
        v.finish()?;
        match (id, patient) {
            (Some(id), Some(patient)) => Ok((id, patient)),
            // Unreachable when `finish` succeeded; every `None` recorded a violation.
            _ => Err(ValidationError { violations: Vec::new() }),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Validated record
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "PatientDraft")]
pub struct Patient {
    name: String,
    city: String,
    age: u8,
    gender: Gender,
    height: f64,
    weight: f64,
}

impl TryFrom<PatientDraft> for Patient {
    type Error = ValidationError;

    fn try_from(draft: PatientDraft) -> Result<Self, Self::Error> {
        let mut v = Violations::new();
        let patient = draft.check(&mut v);
        v.finish()?;
        patient.ok_or(ValidationError { violations: Vec::new() })
    }
}

impl Patient {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Height in meters.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Weight in kilograms.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// `weight / height²`, rounded to two decimals.
    pub fn bmi(&self) -> f64 {
        round2(body_mass_index(self.weight, self.height))
    }

    pub fn verdict(&self) -> Verdict {
        verdict_for(self.bmi())
    }

    /// Apply a partial update and re-validate the merged record.
    pub fn updated(&self, update: PatientUpdate) -> Result<Patient, ValidationError> {
        Patient::try_from(PatientDraft::from(self).merged_with(update))
    }

    pub fn sort_key(&self, field: SortField) -> f64 {
        match field {
            SortField::Height => self.height,
            SortField::Weight => self.weight,
            SortField::Bmi => self.bmi(),
        }
    }
}

/// Serialized form: inputs followed by freshly computed derived fields.
#[derive(Serialize)]
struct PatientView<'a> {
    name: &'a str,
    city: &'a str,
    age: u8,
    gender: Gender,
    height: f64,
    weight: f64,
    bmi: f64,
    verdict: Verdict,
}

impl Serialize for Patient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PatientView {
            name: &self.name,
            city: &self.city,
            age: self.age,
            gender: self.gender,
            height: self.height,
            weight: self.weight,
            bmi: self.bmi(),
            verdict: self.verdict(),
        }
        .serialize(serializer)
    }
}

/// A record together with its store key, as returned by lookups and sorts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientEntry {
    pub id: String,
    #[serde(flatten)]
    pub patient: Patient,
}
