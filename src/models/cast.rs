//! Loose casts applied to request bodies before anything is stored.
//!
//! Text fields take strings as given and render numbers or booleans as text.
//! Integer fields take numbers, booleans and numeric strings. Anything else
//! fails, and the caller reports it as a server error.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde_json::Value;
use serde_with::DeserializeAs;

use crate::error::{AppError, AppResult};

/// Cast to `String`
pub struct TextCast;

/// Cast to `i64`
pub struct NumberCast;

impl<'de> DeserializeAs<'de, String> for TextCast {
    fn deserialize_as<D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TextVisitor;

        impl<'de> Visitor<'de> for TextVisitor {
            type Value = String;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
                Ok(v.to_owned())
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
                Ok(v)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
                Ok(v.to_string())
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
                Ok(v.to_string())
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
                Ok(v.to_string())
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
                Ok(v.to_string())
            }
        }

        deserializer.deserialize_any(TextVisitor)
    }
}

fn integral<E: de::Error>(v: f64) -> Result<i64, E> {
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        Ok(v as i64)
    } else {
        Err(E::custom(format!("{v} is not an integer")))
    }
}

impl<'de> DeserializeAs<'de, i64> for NumberCast {
    fn deserialize_as<D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NumberVisitor;

        impl<'de> Visitor<'de> for NumberVisitor {
            type Value = i64;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an integer or a numeric string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<i64, E> {
                Ok(i64::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
                Ok(v)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
                i64::try_from(v).map_err(|_| E::custom(format!("{v} is out of range")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
                integral(v)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    return Err(E::custom("empty string"));
                }
                match trimmed.parse::<i64>() {
                    Ok(n) => Ok(n),
                    Err(_) => trimmed
                        .parse::<f64>()
                        .map_err(|_| E::custom(format!("{v:?} is not a number")))
                        .and_then(integral),
                }
            }
        }

        deserializer.deserialize_any(NumberVisitor)
    }
}

/// Cast an already-parsed JSON value; failures are server errors
pub fn cast<C, T>(field: &str, value: Value) -> AppResult<T>
where
    C: for<'de> DeserializeAs<'de, T>,
{
    C::deserialize_as(value)
        .map_err(|e| AppError::Internal(format!("Cast failed for {field}: {e}")))
}
