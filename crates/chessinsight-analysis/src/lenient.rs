//! Field deserializers that turn unusable values into absent ones
//!
//! Used with `#[serde(deserialize_with = "...")]` on archive records and row
//! tables, so that one bad cell or field never rejects its whole record.
//! Both JSON values and CSV cells go through the same paths: numbers may
//! arrive as numbers or as text, and anything of the wrong shape becomes
//! `None` (or the field's default).

use std::str::FromStr;

use serde::{Deserialize, Deserializer, de::IgnoredAny};

#[derive(Deserialize)]
#[serde(untagged)]
enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Fallible<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

#[expect(clippy::cast_possible_truncation)]
fn integral(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e18).then_some(value as i64)
}

/// Integers, integral floats (`1500.0`) and numeric text; anything else is `None`.
pub(crate) fn integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let n = match value {
        Some(Value::Integer(n)) => Some(n),
        Some(Value::Float(f)) => integral(f),
        Some(Value::Text(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        Some(Value::Other(_)) | None => None,
    };
    Ok(n.and_then(|n| T::try_from(n).ok()))
}

/// Finite numbers, as numbers or text.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let f = match value {
        Some(Value::Integer(n)) => Some(n as f64),
        Some(Value::Float(f)) => Some(f),
        Some(Value::Text(s)) => s.trim().parse().ok(),
        Some(Value::Other(_)) | None => None,
    };
    Ok(f.filter(|f: &f64| f.is_finite()))
}

/// Strings only; numbers, objects and the like are `None`.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Text(s)) => Some(s),
        _ => None,
    })
}

/// Text parsed with [`FromStr`]; empty or unparseable text is `None`.
pub(crate) fn parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Ok(text(deserializer)?.and_then(|s| s.trim().parse().ok()))
}

/// A value of `T`, or `None` when the input does not have `T`'s shape.
pub(crate) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value = Option::<Fallible<T>>::deserialize(deserializer)?;
    Ok(match value {
        Some(Fallible::Valid(value)) => Some(value),
        Some(Fallible::Invalid(_)) | None => None,
    })
}

/// Like [`optional`], falling back to `T::default()`.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(optional(deserializer)?.unwrap_or_default())
}
