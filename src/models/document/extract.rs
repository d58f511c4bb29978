use chrono::FixedOffset;
use serde_json::Value;

use super::normalize::normalize_end_date;
use super::types::{FieldMap, NewDocument};

fn required_str(payload: &Value, pointer: &str, label: &str, errors: &mut Vec<String>) -> String {
    match payload.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => {
            errors.push(format!("{label} is required"));
            String::new()
        }
        Some(_) => {
            errors.push(format!("{label} must be a string"));
            String::new()
        }
    }
}

fn required_id(payload: &Value, errors: &mut Vec<String>) -> i64 {
    match payload.get("document_id") {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(id) => id,
            None => {
                errors.push("document_id must be an integer".to_string());
                0
            }
        },
        None | Some(Value::Null) => {
            errors.push("document_id is required".to_string());
            0
        }
        Some(_) => {
            errors.push("document_id must be an integer".to_string());
            0
        }
    }
}

/// Amount accepts integers, integral floats and numeric strings; absent means 0.
fn amount(payload: &Value, pointer: &str, errors: &mut Vec<String>) -> i64 {
    let invalid = |errors: &mut Vec<String>| {
        errors.push(format!("{pointer} must be an integer amount"));
        0
    };
    match payload.pointer(pointer) {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_i64() {
                v
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
                    _ => invalid(errors),
                }
            }
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0
            } else {
                trimmed.replace(',', "").parse::<i64>().unwrap_or_else(|_| invalid(errors))
            }
        }
        Some(_) => invalid(errors),
    }
}

/// Validate a submitted payload and flatten it into a row.
///
/// Every problem is reported, not just the first. `end_date` is normalized to
/// `zone` on the way through.
pub fn extract_submission(
    payload: &Value,
    fields: &FieldMap,
    zone: FixedOffset,
) -> Result<NewDocument, Vec<String>> {
    if !payload.is_object() {
        return Err(vec!["Payload must be a JSON object".to_string()]);
    }

    let mut errors = vec![];

    let document_id = required_id(payload, &mut errors);
    let document_number = required_str(payload, "/document_number", "document_number", &mut errors);
    let document_title = required_str(payload, "/document_title", "document_title", &mut errors);
    let request_user = required_str(payload, "/request_user/name", "request_user.name", &mut errors);
    let request_group = required_str(payload, "/request_group/name", "request_group.name", &mut errors);
    let request_factory =
        required_str(payload, &fields.request_factory, &fields.request_factory, &mut errors);
    let amount = amount(payload, &fields.amount, &mut errors);
    let flow_status = required_str(payload, "/flow_status", "flow_status", &mut errors);
    let raw_end_date = required_str(payload, "/end_date", "end_date", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewDocument {
        document_id,
        document_number,
        document_title,
        request_user,
        request_group,
        request_factory,
        amount,
        flow_status,
        end_date: normalize_end_date(&raw_end_date, zone),
        json_data: payload.clone(),
    })
}
