//! Court-export import: JSON in one of three shapes to typed [`CaseRecord`]s.
//!
//! Accepted shapes:
//! - object of objects (`{"0": {...}, "1": {...}}`)
//! - array of objects
//! - array of strings, each a JSON-encoded object

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::dates::parse_day_first;
use crate::error::{CoreError, Result};
use crate::record::CaseRecord;

/// Parse an export file into records. Nothing is returned on failure.
pub fn parse_cases(bytes: &[u8]) -> Result<Vec<CaseRecord>> {
    let data: Value = serde_json::from_slice(bytes)?;
    let objects = into_objects(data)?;
    let records: Vec<CaseRecord> = objects.iter().map(record_from_object).collect();
    info!(count = records.len(), "parsed case export");
    Ok(records)
}

fn into_objects(data: Value) -> Result<Vec<Map<String, Value>>> {
    match data {
        Value::Object(map) => {
            if map.values().all(Value::is_object) {
                Ok(map
                    .into_iter()
                    .filter_map(|(_, v)| match v {
                        Value::Object(o) => Some(o),
                        _ => None,
                    })
                    .collect())
            } else {
                Err(CoreError::UnrecognizedShape("object values must all be objects"))
            }
        }
        Value::Array(items) => {
            if items.iter().all(Value::is_object) {
                Ok(items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Object(o) => Some(o),
                        _ => None,
                    })
                    .collect())
            } else if items.iter().all(Value::is_string) {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|s| -> Result<Map<String, Value>> {
                        match serde_json::from_str::<Value>(s)? {
                            Value::Object(o) => Ok(o),
                            _ => Err(CoreError::UnrecognizedShape(
                                "encoded array entries must be objects",
                            )),
                        }
                    })
                    .collect()
            } else {
                Err(CoreError::UnrecognizedShape(
                    "array entries must be all objects or all strings",
                ))
            }
        }
        _ => Err(CoreError::UnrecognizedShape(
            "expected an object or an array at the top level",
        )),
    }
}

/// Coerce a JSON value to optional text. Empty strings and non-scalars are missing.
fn text_value(v: Option<&Value>) -> Option<String> {
    let s = match v? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn record_from_object(obj: &Map<String, Value>) -> CaseRecord {
    let t = |key: &str| text_value(obj.get(key));
    let date = |key: &str| {
        let raw = t(key)?;
        let parsed = parse_day_first(&raw);
        if parsed.is_none() {
            debug!(field = key, value = %raw, "unparseable date treated as missing");
        }
        parsed
    };
    CaseRecord {
        cino: t("cino"),
        type_name: t("type_name"),
        case_no: t("case_no"),
        reg_no: t("reg_no"),
        reg_year: t("reg_year"),
        petparty_name: t("petparty_name"),
        resparty_name: t("resparty_name"),
        date_last_list: date("date_last_list"),
        date_next_list: date("date_next_list"),
        purpose_name: t("purpose_name"),
        disp_name: t("disp_name"),
        establishment_name: t("establishment_name"),
        court_no_desg_name: t("court_no_desg_name"),
    }
}
