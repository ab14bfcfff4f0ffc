use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The wire form (serde, query strings, stored JSON) is always `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Accepted wire values, in declaration order.
            pub const ALL: &'static [&'static str] = &[$($s),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
});

str_enum!(Verdict {
    Underweight => "Underweight",
    Normal => "Normal",
    Obese => "Obese",
});

str_enum!(AgeGroup {
    Young => "young",
    Adult => "adult",
    MiddleAged => "middle-aged",
    Senior => "senior",
});

str_enum!(LifestyleRisk {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

str_enum!(SortField {
    Height => "height",
    Weight => "weight",
    Bmi => "bmi",
});

str_enum!(SortOrder {
    Asc => "asc",
    Desc => "desc",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn gender_round_trip() {
        for s in Gender::ALL {
            assert_eq!(Gender::from_str(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!(Gender::from_str("Male").is_err());
        assert!(SortOrder::from_str("ASC").is_err());
    }

    #[test]
    fn invalid_value_names_the_enum() {
        let err = SortField::from_str("age").unwrap_err();
        assert_eq!(err.kind, "SortField");
        assert_eq!(err.to_string(), "Invalid SortField value: age");
    }

    #[test]
    fn serializes_as_wire_string() {
        assert_eq!(serde_json::to_value(AgeGroup::MiddleAged).unwrap(), "middle-aged");
        assert_eq!(serde_json::to_value(Verdict::Obese).unwrap(), "Obese");
    }

    #[test]
    fn sort_field_lists_all_values() {
        assert_eq!(SortField::ALL, &["height", "weight", "bmi"]);
    }
}
