//! Tolerant scalar decoders.
//!
//! The upstream API is loose about scalar encodings: identifiers arrive as numbers
//! or strings, and amounts sometimes arrive as strings with thousand separators
//! (`"999.793.000"`, `"1,234,567"`). These types normalize both shapes into one
//! canonical value and reject anything else with a descriptive error.

use std::fmt;
use std::ops::Deref;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// A string that may be encoded upstream as a JSON string or a JSON integer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FlexString(pub String);

impl FlexString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for FlexString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlexString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlexString {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for FlexString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<&str> for FlexString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for FlexString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FlexString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FlexStringVisitor).map(FlexString)
    }
}

struct FlexStringVisitor;

impl<'de> Visitor<'de> for FlexStringVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or an integer number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        integral_f64(v).map(|n| n.to_string())
    }
}

/// A whole-unit currency amount that may be a JSON number, a plain numeric string,
/// or a string punctuated with `.` / `,` thousand separators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BalanceAmount(pub i64);

impl BalanceAmount {
    pub fn value(self) -> i64 {
        self.0
    }
}

impl Deref for BalanceAmount {
    type Target = i64;

    fn deref(&self) -> &i64 {
        &self.0
    }
}

impl fmt::Display for BalanceAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BalanceAmount {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Serialize for BalanceAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for BalanceAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        flexible_i64(deserializer).map(BalanceAmount)
    }
}

/// `deserialize_with` helper sharing the [`BalanceAmount`] rules for plain `i64` fields.
pub fn flexible_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    deserializer.deserialize_any(AmountVisitor)
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer amount as a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::custom(format!("amount {} overflows i64", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        integral_f64(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        parse_punctuated_amount(v).map_err(E::custom)
    }
}

/// Strips every `.` and `,` and parses the remainder as a base-10 integer.
pub fn parse_punctuated_amount(raw: &str) -> Result<i64, String> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != ',')
        .collect();
    digits
        .parse::<i64>()
        .map_err(|e| format!("invalid amount string '{}': {}", raw, e))
}

/// Decodes `null` the same as a missing key: the type's default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn integral_f64<E: de::Error>(v: f64) -> Result<i64, E> {
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        Ok(v as i64)
    } else {
        Err(E::custom(format!("expected an integer number, got {}", v)))
    }
}
