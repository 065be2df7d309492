use crate::domain::{LcaError, LcaResult};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Element record as stored by upstream tools. Every field is optional and
/// unexpected shapes read as absent instead of failing the record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawElement {
    #[serde(rename = "_id", deserialize_with = "lenient_id")]
    pub storage_id: Option<String>,
    #[serde(deserialize_with = "lenient_id")]
    pub global_id: Option<String>,
    #[serde(deserialize_with = "lenient_id")]
    pub guid: Option<String>,
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub type_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub element_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub ifc_class: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub ebkp: Option<String>,
    #[serde(deserialize_with = "lenient_classification")]
    pub classification: Option<RawClassification>,
    #[serde(deserialize_with = "lenient_object")]
    pub properties: Map<String, Value>,
    #[serde(deserialize_with = "lenient_quantity")]
    pub quantity: Option<f64>,
    #[serde(deserialize_with = "lenient_materials")]
    pub materials: Vec<RawMaterial>,
}

impl RawElement {
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawClassification {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub system: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawMaterial {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub volume: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub unit: Option<String>,
}

/// Reads one batch of raw element records.
///
/// A record that is not a JSON object is logged and replaced by an empty
/// record so the batch keeps its length and indices.
pub fn parse_element_batch(batch: Value) -> LcaResult<Vec<RawElement>> {
    let Value::Array(items) = batch else {
        return Err(LcaError::input_validation(
            "INPUT.BATCH_NOT_ARRAY",
            format!("element batch must be a JSON array, found {}", value_kind(&batch)),
        ));
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let kind = value_kind(&item);
            serde_json::from_value(item).unwrap_or_else(|error| {
                tracing::warn!(index, kind, %error, "unreadable element record replaced by empty record");
                RawElement::default()
            })
        })
        .collect())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(text_of(&Value::deserialize(deserializer)?))
}

/// Accepts plain strings, numbers and `{"$oid": "..."}` wrappers.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Object(object) => object.get("$oid").and_then(text_of),
        other => text_of(other),
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(number_of(&Value::deserialize(deserializer)?))
}

/// Edited quantity: a number or an object carrying a `value` field.
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Object(object) => object.get("value").and_then(number_of),
        other => number_of(other),
    })
}

fn lenient_object<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Map<String, Value>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(object) => object,
        _ => Map::new(),
    })
}

fn lenient_classification<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<RawClassification>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

fn lenient_materials<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<RawMaterial>, D::Error> {
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}
