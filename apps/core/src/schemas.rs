//! JSON document schemas, one per intent.
//!
//! Each schema is a static table of field rules. Validation walks the table,
//! collects every violation, and on success produces the normalized document:
//! declared fields only, in declaration order, absent optionals as `null`,
//! numeric strings and integral floats coerced to the declared number type.

use crate::models::{FieldError, Intent};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSchema {
    pub invoice_id: String,
    pub date: String,
    pub total_amount: f64,
    pub line_items: Vec<LineItem>,
    pub discount: Option<f64>,
    pub tax: Option<f64>,
    pub shipping_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfqSchema {
    pub rfq_id: String,
    pub requester: String,
    pub items: Vec<LineItem>,
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintSchema {
    pub complaint_id: String,
    pub customer: String,
    pub issue: String,
    pub severity: Option<String>,
}

/// Fallback for intents without a dedicated schema: any payload is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericJsonSchema {
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Str,
    Float,
    Int,
    LineItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    /// Key must be present with a non-null value.
    Required,
    /// Key must be present; `null` is allowed.
    RequiredNullable,
    /// Key may be absent or `null`.
    Optional,
}

struct FieldRule {
    name: &'static str,
    kind: FieldKind,
    presence: Presence,
}

const fn rule(name: &'static str, kind: FieldKind, presence: Presence) -> FieldRule {
    FieldRule {
        name,
        kind,
        presence,
    }
}

const LINE_ITEM_RULES: &[FieldRule] = &[
    rule("description", FieldKind::Str, Presence::Required),
    rule("quantity", FieldKind::Int, Presence::Required),
    rule("unit_price", FieldKind::Float, Presence::Required),
];

const INVOICE_RULES: &[FieldRule] = &[
    rule("invoice_id", FieldKind::Str, Presence::Required),
    rule("date", FieldKind::Str, Presence::Required),
    rule("total_amount", FieldKind::Float, Presence::Required),
    rule("line_items", FieldKind::LineItems, Presence::Required),
    rule("discount", FieldKind::Float, Presence::Optional),
    rule("tax", FieldKind::Float, Presence::Optional),
    rule("shipping_address", FieldKind::Str, Presence::Optional),
];

const RFQ_RULES: &[FieldRule] = &[
    rule("rfq_id", FieldKind::Str, Presence::Required),
    rule("requester", FieldKind::Str, Presence::Required),
    rule("items", FieldKind::LineItems, Presence::Required),
    rule("deadline", FieldKind::Str, Presence::RequiredNullable),
];

const COMPLAINT_RULES: &[FieldRule] = &[
    rule("complaint_id", FieldKind::Str, Presence::Required),
    rule("customer", FieldKind::Str, Presence::Required),
    rule("issue", FieldKind::Str, Presence::Required),
    rule("severity", FieldKind::Str, Presence::RequiredNullable),
];

/// Schema selected for a document's intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentSchema {
    Invoice,
    Rfq,
    Complaint,
    Generic,
}

impl IntentSchema {
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::Invoice => IntentSchema::Invoice,
            Intent::Rfq => IntentSchema::Rfq,
            Intent::Complaint => IntentSchema::Complaint,
            Intent::Regulation | Intent::GeneralEnquiry => IntentSchema::Generic,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IntentSchema::Invoice => "InvoiceSchema",
            IntentSchema::Rfq => "RFQSchema",
            IntentSchema::Complaint => "ComplaintSchema",
            IntentSchema::Generic => "GenericJSONSchema",
        }
    }

    fn rules(&self) -> &'static [FieldRule] {
        match self {
            IntentSchema::Invoice => INVOICE_RULES,
            IntentSchema::Rfq => RFQ_RULES,
            IntentSchema::Complaint => COMPLAINT_RULES,
            IntentSchema::Generic => &[],
        }
    }

    /// Validates `payload`, returning the normalized document or every violation found.
    pub fn validate(&self, payload: &Value) -> Result<Value, Vec<FieldError>> {
        if *self == IntentSchema::Generic {
            return to_model::<GenericJsonSchema>(Value::Object(Map::from_iter([(
                "payload".to_string(),
                payload.clone(),
            )])));
        }

        let mut errors = Vec::new();
        let normalized = check_object(payload, self.rules(), "", &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        match self {
            IntentSchema::Invoice => to_model::<InvoiceSchema>(normalized),
            IntentSchema::Rfq => to_model::<RfqSchema>(normalized),
            IntentSchema::Complaint => to_model::<ComplaintSchema>(normalized),
            IntentSchema::Generic => Ok(normalized),
        }
    }
}

/// Round-trips the normalized value through the typed model.
fn to_model<T>(value: Value) -> Result<Value, Vec<FieldError>>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    serde_json::from_value::<T>(value)
        .and_then(|model| serde_json::to_value(model))
        .map_err(|e| vec![field_error("", e.to_string(), "model_error")])
}

fn field_error(field: &str, message: impl Into<String>, kind: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.into(),
        kind: kind.to_string(),
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn check_object(
    value: &Value,
    rules: &[FieldRule],
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Value {
    let Some(object) = value.as_object() else {
        errors.push(field_error(
            path,
            "Input should be a valid object",
            "model_type",
        ));
        return Value::Null;
    };

    let mut normalized = Map::new();
    for rule in rules {
        let field_path = join_path(path, rule.name);
        match (object.get(rule.name), rule.presence) {
            (None, Presence::Optional) | (Some(Value::Null), Presence::Optional) => {
                normalized.insert(rule.name.to_string(), Value::Null);
            }
            (Some(Value::Null), Presence::RequiredNullable) => {
                normalized.insert(rule.name.to_string(), Value::Null);
            }
            (None, _) => errors.push(field_error(&field_path, "Field required", "missing")),
            (Some(raw), _) => {
                if let Some(value) = coerce(raw, rule.kind, &field_path, errors) {
                    normalized.insert(rule.name.to_string(), value);
                }
            }
        }
    }
    Value::Object(normalized)
}

fn coerce(raw: &Value, kind: FieldKind, path: &str, errors: &mut Vec<FieldError>) -> Option<Value> {
    match kind {
        FieldKind::Str => match raw {
            Value::String(_) => Some(raw.clone()),
            _ => {
                errors.push(field_error(path, "Input should be a valid string", "string_type"));
                None
            }
        },
        FieldKind::Float => match coerce_float(raw) {
            Ok(number) => Some(Value::Number(number)),
            Err((message, kind)) => {
                errors.push(field_error(path, message, kind));
                None
            }
        },
        FieldKind::Int => match coerce_int(raw) {
            Ok(number) => Some(Value::Number(number.into())),
            Err((message, kind)) => {
                errors.push(field_error(path, message, kind));
                None
            }
        },
        FieldKind::LineItems => {
            let Some(items) = raw.as_array() else {
                errors.push(field_error(path, "Input should be a valid list", "list_type"));
                return None;
            };
            let before = errors.len();
            let normalized: Vec<Value> = items
                .iter()
                .enumerate()
                .map(|(i, item)| check_object(item, LINE_ITEM_RULES, &join_path(path, &i.to_string()), errors))
                .collect();
            (errors.len() == before).then_some(Value::Array(normalized))
        }
    }
}

type CoerceError = (&'static str, &'static str);

fn coerce_float(raw: &Value) -> Result<Number, CoerceError> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => return Err(("Input should be a valid number", "float_type")),
    };
    parsed
        .and_then(Number::from_f64)
        .ok_or(("Input should be a valid number, unable to parse string as a number", "float_parsing"))
}

fn coerce_int(raw: &Value) -> Result<i64, CoerceError> {
    match raw {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                    Some(f) if f.fract() != 0.0 => Err((
                        "Input should be a valid integer, got a number with a fractional part",
                        "int_from_float",
                    )),
                    _ => Err(("Input should be a valid integer", "int_type")),
                }
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            (
                "Input should be a valid integer, unable to parse string as an integer",
                "int_parsing",
            )
        }),
        _ => Err(("Input should be a valid integer", "int_type")),
    }
}
