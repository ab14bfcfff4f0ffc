//! Insurance premium prediction input.
//!
//! Ephemeral: never persisted. Validation normalizes `city` before any tier
//! lookup so `" delhi "` and `"DELHI"` both resolve to tier 1.

use serde::Deserialize;

use super::enums::{AgeGroup, LifestyleRisk};
use super::patient::{body_mass_index, finite_bmi_inputs};
use super::validation::{Field, ValidationError, Violations};

pub const TIER_1_CITIES: &[&str] = &["Delhi", "Mumbai", "Bangalore", "Hyderabad", "Chennai"];

pub const TIER_2_CITIES: &[&str] = &[
    "Pune",
    "Kolkata",
    "Ahmedabad",
    "Surat",
    "Visakhapatnam",
    "Jaipur",
    "Lucknow",
    "Indore",
    "Patna",
    "Coimbatore",
];

/// Trim, then title-case every word: the first cased letter after a
/// non-letter is upper-cased, every other letter lower-cased.
pub fn normalize_city(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_is_letter = false;
    for ch in raw.trim().chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

/// Tier of an already-normalized city name.
pub fn city_tier(city: &str) -> u8 {
    if TIER_1_CITIES.contains(&city) {
        1
    } else if TIER_2_CITIES.contains(&city) {
        2
    } else {
        3
    }
}

pub fn age_group(age: u8) -> AgeGroup {
    match age {
        0..=24 => AgeGroup::Young,
        25..=44 => AgeGroup::Adult,
        45..=64 => AgeGroup::MiddleAged,
        _ => AgeGroup::Senior,
    }
}

pub fn lifestyle_risk(smoker: bool, bmi: f64) -> LifestyleRisk {
    if smoker && bmi > 30.0 {
        LifestyleRisk::High
    } else if smoker || bmi > 25.0 {
        LifestyleRisk::Medium
    } else {
        LifestyleRisk::Low
    }
}

/// `POST /predict` body before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PredictionDraft {
    pub age: Field<i64>,
    pub weight: Field<f64>,
    pub height: Field<f64>,
    pub incoming_lpa: Field<i64>,
    pub city: Field<String>,
    pub occupation: Field<String>,
    /// Omitted or `null` means non-smoker.
    pub smoker: Field<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInput {
    age: u8,
    weight: f64,
    height: f64,
    incoming_lpa: u32,
    city: String,
    occupation: String,
    smoker: bool,
}

impl TryFrom<PredictionDraft> for PredictionInput {
    type Error = ValidationError;

    fn try_from(draft: PredictionDraft) -> Result<Self, Self::Error> {
        let mut v = Violations::new();
        let age = v.between("age", draft.age, 0, 120);
        let weight = v.positive("weight", draft.weight);
        let height = v.positive("height", draft.height);
        let (height, weight) = finite_bmi_inputs(&mut v, height, weight);
        let incoming_lpa = match v.required("incoming_lpa", draft.incoming_lpa) {
            Some(lpa) if lpa <= 0 => {
                v.push("incoming_lpa", "must be greater than 0");
                None
            }
            Some(lpa) if lpa > i64::from(u32::MAX) => {
                v.push("incoming_lpa", format!("must be at most {}", u32::MAX));
                None
            }
            other => other,
        };
        let city = v.non_blank("city", draft.city).map(|c| normalize_city(&c));
        let occupation = v
            .non_blank("occupation", draft.occupation)
            .map(|o| o.trim().to_string());
        let smoker = v.optional("smoker", draft.smoker).unwrap_or(false);
        v.finish()?;

        match (age, weight, height, incoming_lpa, city, occupation) {
            (Some(age), Some(weight), Some(height), Some(lpa), Some(city), Some(occupation)) => {
                Ok(PredictionInput {
                    age: age as u8,
                    weight,
                    height,
                    incoming_lpa: lpa as u32,
                    city,
                    occupation,
                    smoker,
                })
            }
            _ => Err(ValidationError { violations: Vec::new() }),
        }
    }
}

impl PredictionInput {
    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn incoming_lpa(&self) -> u32 {
        self.incoming_lpa
    }

    /// Normalized city name.
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn occupation(&self) -> &str {
        &self.occupation
    }

    pub fn smoker(&self) -> bool {
        self.smoker
    }

    /// Unrounded; the model was fitted on raw ratios.
    pub fn bmi(&self) -> f64 {
        body_mass_index(self.weight, self.height)
    }

    pub fn age_group(&self) -> AgeGroup {
        age_group(self.age)
    }

    pub fn city_tier(&self) -> u8 {
        city_tier(&self.city)
    }

    pub fn lifestyle_risk(&self) -> LifestyleRisk {
        lifestyle_risk(self.smoker, self.bmi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: serde_json::Value) -> Result<PredictionInput, ValidationError> {
        let draft: PredictionDraft = serde_json::from_value(value).unwrap();
        PredictionInput::try_from(draft)
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "age": 30, "weight": 65.0, "height": 1.7, "incoming_lpa": 12,
            "city": " delhi ", "occupation": "private_job"
        })
    }

    #[test]
    fn city_is_trimmed_and_title_cased() {
        assert_eq!(normalize_city(" delhi "), "Delhi");
        assert_eq!(normalize_city("NEW DELHI"), "New Delhi");
        assert_eq!(normalize_city("navi-mumbai"), "Navi-Mumbai");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [" delhi ", "sAN fRANCISCO", "o'hare", "  ", "visakhapatnam", "東京"] {
            let once = normalize_city(raw);
            assert_eq!(normalize_city(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn tiers_follow_fixed_lists() {
        assert_eq!(city_tier("Mumbai"), 1);
        assert_eq!(city_tier("Jaipur"), 2);
        assert_eq!(city_tier("Guwahati"), 3);
        assert_eq!(city_tier("mumbai"), 3, "tier lookup expects normalized input");
    }

    #[test]
    fn padded_lowercase_city_lands_in_tier_one() {
        let input = input(valid_body()).unwrap();
        assert_eq!(input.city(), "Delhi");
        assert_eq!(input.city_tier(), 1);
    }

    #[test]
    fn age_group_boundaries() {
        assert_eq!(age_group(24), AgeGroup::Young);
        assert_eq!(age_group(25), AgeGroup::Adult);
        assert_eq!(age_group(44), AgeGroup::Adult);
        assert_eq!(age_group(45), AgeGroup::MiddleAged);
        assert_eq!(age_group(64), AgeGroup::MiddleAged);
        assert_eq!(age_group(65), AgeGroup::Senior);
    }

    #[test]
    fn lifestyle_risk_rules() {
        assert_eq!(lifestyle_risk(true, 31.0), LifestyleRisk::High);
        assert_eq!(lifestyle_risk(true, 22.0), LifestyleRisk::Medium);
        assert_eq!(lifestyle_risk(false, 26.0), LifestyleRisk::Medium);
        assert_eq!(lifestyle_risk(false, 25.0), LifestyleRisk::Low);
    }

    #[test]
    fn smoker_defaults_to_false() {
        let input = input(valid_body()).unwrap();
        assert!(!input.smoker());
        assert_eq!(input.lifestyle_risk(), LifestyleRisk::Low);
    }

    #[test]
    fn smoker_flag_is_honoured() {
        let mut body = valid_body();
        body["smoker"] = json!(true);
        body["weight"] = json!(95.0);
        let input = input(body).unwrap();
        assert_eq!(input.lifestyle_risk(), LifestyleRisk::High);
    }

    #[test]
    fn reports_all_violations() {
        let err = input(json!({"age": 130, "height": 0, "incoming_lpa": -5, "city": " "}))
            .unwrap_err();
        for field in ["age", "weight", "height", "incoming_lpa", "city", "occupation"] {
            assert!(err.has_field(field), "missing violation for {field}");
        }
    }

    #[test]
    fn overflowing_bmi_is_a_height_violation() {
        let mut body = valid_body();
        body["height"] = json!(1e-200);
        let err = input(body).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.has_field("height"));
    }

    #[test]
    fn oversized_income_has_its_own_message() {
        let mut body = valid_body();
        body["incoming_lpa"] = json!(u64::from(u32::MAX) + 1);
        let err = input(body).unwrap_err();
        assert_eq!(err.violations[0].message, "must be at most 4294967295");

        let mut body = valid_body();
        body["incoming_lpa"] = json!(0);
        let err = input(body).unwrap_err();
        assert_eq!(err.violations[0].message, "must be greater than 0");
    }

    #[test]
    fn mistyped_and_null_fields_join_the_violation_list() {
        let mut body = valid_body();
        body["age"] = json!("thirty");
        body["smoker"] = json!("yes");
        body["occupation"] = json!(null);
        let err = input(body).unwrap_err();
        let fields: Vec<_> = err.violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["age", "occupation", "smoker"]);
    }
}
