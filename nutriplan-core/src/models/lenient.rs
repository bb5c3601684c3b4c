//! Forgiving deserializers for meal payloads.
//!
//! Meals arrive from the recommendation service and from older cached
//! snapshots with inconsistent typing: numbers as strings, ids as integers,
//! nulls where arrays are expected. None of that should make a plan unreadable.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdLike {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Non-negative number; null, garbage and negatives become 0.
pub(crate) fn non_negative_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberLike>::deserialize(deserializer)?;
    let n = match value {
        Some(NumberLike::Number(n)) => n,
        Some(NumberLike::Text(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        None => 0.0,
    };
    Ok(if n.is_finite() && n > 0.0 { n } else { 0.0 })
}

pub(crate) fn non_negative_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = non_negative_f64(deserializer)?;
    Ok(n.round().min(u32::MAX as f64) as u32)
}

/// Servings are at least one.
pub(crate) fn servings<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_negative_u32(deserializer)?.max(1))
}

pub(crate) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IdLike::deserialize(deserializer)? {
        IdLike::Text(s) => s,
        IdLike::Int(n) => n.to_string(),
        IdLike::Float(n) => n.to_string(),
    })
}

/// RFC 3339 timestamp, or one without an offset read as UTC. Anything else
/// becomes `None`.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| v.as_str()).and_then(parse_timestamp))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| s.parse::<NaiveDateTime>().ok().map(|t| t.and_utc()))
}

/// Treats an explicit null like a missing field.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn default_servings() -> u32 {
    1
}
