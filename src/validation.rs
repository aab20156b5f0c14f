// Validation utilities module
// Custom validator functions and loose boolean input handling

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidationError;

/// Validates that a price is positive (for required f64 fields)
pub fn validate_positive_price(price: f64) -> Result<(), ValidationError> {
    if price <= 0.0 || price.is_nan() {
        Err(ValidationError::new("price_must_be_positive"))
    } else {
        Ok(())
    }
}

/// Validates that a name is not empty or whitespace only
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("must_not_be_blank"))
    } else {
        Ok(())
    }
}

/// Interprets a loosely typed boolean string
///
/// `"true"`, `"1"`, `"yes"`, `"y"` and `"t"` are true (trimmed, any case);
/// every other string is false.
pub fn coerce_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "t"
    )
}

/// Boolean accepted from JSON booleans, numbers or strings
///
/// Integers are true when non-zero and strings follow [`coerce_flag`].
/// Floating-point numbers are always false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Flag(pub bool);

impl From<Flag> for bool {
    fn from(flag: Flag) -> Self {
        flag.0
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Flag(value)
    }
}

struct FlagVisitor;

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = Flag;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a boolean, a number or a string")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Flag, E> {
        Ok(Flag(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Flag, E> {
        Ok(Flag(value != 0))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Flag, E> {
        Ok(Flag(value != 0))
    }

    fn visit_f64<E: de::Error>(self, _value: f64) -> Result<Flag, E> {
        Ok(Flag(false))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Flag, E> {
        Ok(Flag(coerce_flag(value)))
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }
}
