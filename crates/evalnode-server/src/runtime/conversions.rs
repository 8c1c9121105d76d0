//! JavaScript Value -> JSON Conversion
//!
//! Evaluation results leave the interpreter as `serde_json::Value` so that the
//! rest of the worker never sees Boa types.
//!
//! # Type Mapping
//!
//! | JavaScript Type | JSON Type |
//! |-----------------|-----------|
//! | undefined, null | null |
//! | Boolean | boolean |
//! | Number (integral) | integer |
//! | Number (fractional) | float |
//! | NaN, ±Infinity | string (`"NaN"`, `"Infinity"`, `"-Infinity"`) |
//! | String | string |
//! | BigInt, Function | string (the value's display form) |
//! | Array | array |
//! | Object | object |
//! | Symbol | null |
//!
//! # Limitations
//!
//! - Symbol keys in objects are skipped
//! - Nesting deeper than [`MAX_DEPTH`] is reported as a fault, which also
//!   catches self-referencing objects

use boa_engine::{object::builtins::JsArray, property::PropertyKey, value::JsValue, Context};
use serde_json::Value as JsonValue;

use crate::runtime::Fault;

/// Maximum nesting of arrays and objects in a converted result
pub const MAX_DEPTH: usize = 64;

/// Convert a Boa `JsValue` to a `serde_json::Value`.
///
/// # Errors
///
/// Returns a [`Fault`] if a property getter throws, a string is not valid
/// UTF-16, or the value nests deeper than [`MAX_DEPTH`].
pub fn js_value_to_json(value: JsValue, ctx: &mut Context) -> Result<JsonValue, Fault> {
    convert(value, ctx, 0)
}

fn convert(value: JsValue, ctx: &mut Context, depth: usize) -> Result<JsonValue, Fault> {
    if value.is_undefined() || value.is_null() {
        return Ok(JsonValue::Null);
    }

    if let Some(b) = value.as_boolean() {
        return Ok(JsonValue::Bool(b));
    }

    if let Some(i) = value.as_i32() {
        return Ok(JsonValue::Number(i.into()));
    }

    if let Some(n) = value.as_number() {
        return Ok(number_to_json(n));
    }

    if let Some(s) = value.as_string() {
        return s
            .to_std_string()
            .map(JsonValue::String)
            .map_err(|e| Fault::new(format!("String conversion error: {:?}", e)));
    }

    if value.is_bigint() || value.is_callable() {
        return Ok(JsonValue::String(value.display().to_string()));
    }

    if value.is_object() {
        if depth >= MAX_DEPTH {
            return Err(Fault::new(format!(
                "result nests deeper than {} levels (is it self-referencing?)",
                MAX_DEPTH
            )));
        }

        let obj = value
            .as_object()
            .ok_or_else(|| Fault::new("Value is object but couldn't get object reference"))?;

        if obj.is_array() {
            let array = JsArray::from_object(obj.clone())
                .map_err(|e| Fault::new(format!("Object is not a valid array: {}", e)))?;

            let length: usize = array
                .length(ctx)
                .map_err(|e| Fault::new(format!("Failed to get array length: {}", e)))?
                .try_into()
                .map_err(|_| Fault::new("Array length overflow"))?;

            let mut result = Vec::with_capacity(length);
            for i in 0..length {
                let elem = array
                    .get(i, ctx)
                    .map_err(|e| Fault::new(format!("Failed to get array element {}: {}", i, e)))?;
                result.push(convert(elem, ctx, depth + 1)?);
            }
            return Ok(JsonValue::Array(result));
        }

        let keys = obj
            .own_property_keys(ctx)
            .map_err(|e| Fault::new(format!("Failed to get object keys: {}", e)))?;

        let mut result = serde_json::Map::new();
        for key in keys {
            let key_str = match &key {
                PropertyKey::String(s) => s
                    .to_std_string()
                    .map_err(|e| Fault::new(format!("String conversion error: {:?}", e))),
                PropertyKey::Index(i) => Ok(i.get().to_string()),
                PropertyKey::Symbol(_) => continue,
            }?;

            let prop_value = obj
                .get(key.clone(), ctx)
                .map_err(|e| Fault::new(format!("Failed to get property '{}': {}", key_str, e)))?;
            result.insert(key_str, convert(prop_value, ctx, depth + 1)?);
        }

        return Ok(JsonValue::Object(result));
    }

    // symbols
    Ok(JsonValue::Null)
}

fn number_to_json(n: f64) -> JsonValue {
    if n.is_nan() {
        return JsonValue::String("NaN".into());
    }
    if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        return JsonValue::String(text.into());
    }
    // Integral doubles render the way JavaScript prints them: `4`, not `4.0`.
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return JsonValue::Number((n as i64).into());
    }
    serde_json::Number::from_f64(n)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}
