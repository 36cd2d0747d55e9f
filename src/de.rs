//! Boundary helpers for the upstream JSON, which mixes `null`s into
//! otherwise-numeric fields and ships decimals as strings (`"form": "3.4"`).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a number, a numeric string, or null/garbage (→ 0.0).
pub fn f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&v).unwrap_or(0.0))
}

/// Like [`f64_lenient`] but keeps "no data" as `None`.
pub fn opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&v))
}

/// `null` becomes `T::default()` instead of a type error.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
        _ => None,
    }
}
