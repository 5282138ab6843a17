//! Lenient field decoders for payloads assembled from Redis strings.
use serde::{Deserialize, Deserializer};

use crate::ids::Winner;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Float(f64),
    Text(String),
}

/// Accepts `7`, `7.0` or `"7"`; anything unparsable decodes as zero.
pub(crate) fn number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n,
        NumberOrString::Float(f) if f.is_finite() && f >= 0.0 => f as u64,
        NumberOrString::Float(_) => 0,
        NumberOrString::Text(s) => s.trim().parse().unwrap_or(0),
    })
}

/// Like [`number_or_string`] but keeps absence and garbage distinct from zero.
pub(crate) fn optional_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Number(n)) => Some(n),
            Some(NumberOrString::Float(f)) if f.is_finite() && f >= 0.0 => Some(f as u64),
            Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
            _ => None,
        },
    )
}

/// Winner labels outside the known set (e.g. "undecided") decode as `None`.
pub(crate) fn lenient_winner<'de, D>(deserializer: D) -> Result<Option<Winner>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|label| {
        serde_json::from_value(serde_json::Value::String(label)).ok()
    }))
}
