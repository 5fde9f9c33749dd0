//! JSON codec for the value model.
//!
//! The tree itself is derived with serde. This module holds the pieces serde
//! cannot derive: integers wider than 64 bits (encoded as decimal strings)
//! and non-finite floats (encoded as `"NaN"`, `"Infinity"`, `"-Infinity"`).
//!
//! Integers decode from decimal strings of any width or from JSON integer
//! literals that fit 64 bits. A wider literal is parsed as a float by the JSON
//! reader and is rejected rather than rounded.

use std::fmt;

use num_bigint::{BigInt, BigUint};
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

use crate::Value;

/// Error from encoding or decoding the wire format.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed value JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode one value from its JSON wire form.
pub fn decode(bytes: &[u8]) -> Result<Value, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode one value to its JSON wire form.
pub fn encode(value: &Value) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

/// Visitor accepting an integer either as a 64-bit JSON number or a decimal string.
struct WideIntVisitor;

impl Visitor<'_> for WideIntVisitor {
    type Value = BigInt;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 64-bit integer or a decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<BigInt, E> {
        Err(E::invalid_type(de::Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<BigInt, E> {
        v.trim()
            .parse::<BigInt>()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

/// `#[serde(with)]` helpers for `BigInt`.
pub(crate) mod signed {
    use super::*;

    pub(crate) fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        deserializer.deserialize_any(WideIntVisitor)
    }
}

/// `#[serde(with)]` helpers for `BigUint`.
pub(crate) mod unsigned {
    use super::*;

    pub(crate) fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BigUint, D::Error> {
        let wide = deserializer.deserialize_any(WideIntVisitor)?;
        wide.to_biguint().ok_or_else(|| {
            de::Error::custom(format_args!("negative value {wide} for an unsigned integer"))
        })
    }
}

/// `#[serde(with)]` helpers for `f64` that survive NaN and infinities.
pub(crate) mod float {
    use super::*;

    const NAN: &str = "NaN";
    const INFINITY: &str = "Infinity";
    const NEG_INFINITY: &str = "-Infinity";

    pub(crate) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str(NAN)
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { INFINITY } else { NEG_INFINITY })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    struct FloatVisitor;

    impl Visitor<'_> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or one of \"NaN\", \"Infinity\", \"-Infinity\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        #[allow(clippy::cast_precision_loss, reason = "JSON integers standing in for floats")]
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        #[allow(clippy::cast_precision_loss, reason = "JSON integers standing in for floats")]
        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                NAN => Ok(f64::NAN),
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(FloatVisitor)
    }
}
