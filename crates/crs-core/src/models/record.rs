use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The identifier fields a server record may carry. Document stores send
/// `_id`, some serializers add `id` as well, and either may be numeric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordId {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl RecordId {
    /// `_id` when present, else `id`, rendered as a string.
    pub fn get(&self) -> Option<String> {
        [&self.mongo_id, &self.id]
            .into_iter()
            .flatten()
            .find_map(|value| match value {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }
}

/// A reference the server may send either populated or as a bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(String),
    Embedded(T),
}

impl<T> Ref<T> {
    pub fn embedded(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Embedded(inner) => Some(inner),
        }
    }
}

impl<T: Record> Ref<T> {
    pub fn id(&self) -> Option<String> {
        match self {
            Ref::Id(id) => Some(id.clone()).filter(|id| !id.is_empty()),
            Ref::Embedded(inner) => inner.id(),
        }
    }
}

/// Accept a string or a number where the server is inconsistent.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Common view over decoded records, used for listing them generically.
pub trait Record {
    fn id(&self) -> Option<String>;
    fn label(&self) -> String;
}
