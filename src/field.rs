use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Semantic type of a Quickbase table column, as reported by the API.
///
/// The API encodes types as free-form strings (`"text"`, `"numeric"`,
/// `"numeric currency"`, `"date"`, `"date time"`, ...); anything outside the
/// set this crate reshapes is carried through unchanged in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Numeric,
    NumericCurrency,
    Date,
    DateTime,
    Other(String),
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => FieldType::Text,
            "numeric" => FieldType::Numeric,
            "numeric currency" => FieldType::NumericCurrency,
            "date" => FieldType::Date,
            "date time" => FieldType::DateTime,
            _ => FieldType::Other(s),
        }
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        match t {
            FieldType::Text => "text".to_string(),
            FieldType::Numeric => "numeric".to_string(),
            FieldType::NumericCurrency => "numeric currency".to_string(),
            FieldType::Date => "date".to_string(),
            FieldType::DateTime => "date time".to_string(),
            FieldType::Other(s) => s,
        }
    }
}

/// Declared metadata for one table column: its field id, display label and
/// semantic type. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: i64,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(id: i64, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id,
            label: label.into(),
            field_type,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no field with id {0} in the field catalog")]
    FieldNotFound(i64),

    #[error("duplicate field id {0} in field list")]
    DuplicateFieldId(i64),
}

/// Read-only catalog of the field descriptors that accompany a record query
/// response. Declaration order is preserved; lookups go through an
/// id-to-descriptor index built at load time.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: Vec<FieldDescriptor>,
    by_id: HashMap<i64, usize>,
}

impl FieldCatalog {
    pub fn from_fields(fields: Vec<FieldDescriptor>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            if by_id.insert(field.id, idx).is_some() {
                return Err(CatalogError::DuplicateFieldId(field.id));
            }
        }
        Ok(Self { fields, by_id })
    }

    /// Look up a descriptor by its field id.
    pub fn lookup_by_id(&self, id: i64) -> Result<&FieldDescriptor, CatalogError> {
        self.by_id
            .get(&id)
            .map(|&idx| &self.fields[idx])
            .ok_or(CatalogError::FieldNotFound(id))
    }

    /// Project one property (`"id"`, `"label"` or `"type"`) across all
    /// descriptors in declaration order. An unknown property projects nulls,
    /// mirroring a missing key in the raw API objects.
    pub fn values_for(&self, property: &str) -> Vec<Value> {
        self.fields
            .iter()
            .map(|f| match property {
                "id" => Value::from(f.id),
                "label" => Value::from(f.label.clone()),
                "type" => Value::from(String::from(f.field_type.clone())),
                _ => Value::Null,
            })
            .collect()
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for FieldCatalog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let fields = Vec::<FieldDescriptor>::deserialize(deserializer)?;
        FieldCatalog::from_fields(fields).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_catalog() -> FieldCatalog {
        FieldCatalog::from_fields(vec![
            FieldDescriptor::new(6, "Full Name", FieldType::Text),
            FieldDescriptor::new(7, "Amount", FieldType::Numeric),
            FieldDescriptor::new(8, "Date time", FieldType::DateTime),
        ])
        .unwrap()
    }

    #[test]
    fn test_field_type_from_api_strings() {
        assert_eq!(FieldType::from("text".to_string()), FieldType::Text);
        assert_eq!(
            FieldType::from("numeric currency".to_string()),
            FieldType::NumericCurrency
        );
        assert_eq!(FieldType::from("date time".to_string()), FieldType::DateTime);
        assert_eq!(
            FieldType::from("phone".to_string()),
            FieldType::Other("phone".to_string())
        );
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = sample_catalog();
        let field = catalog.lookup_by_id(7).unwrap();
        assert_eq!(field.label, "Amount");
        assert_eq!(field.field_type, FieldType::Numeric);

        let missing = catalog.lookup_by_id(99);
        assert!(matches!(missing, Err(CatalogError::FieldNotFound(99))));
    }

    #[test]
    fn test_values_for_preserves_order() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.values_for("label"),
            vec![json!("Full Name"), json!("Amount"), json!("Date time")]
        );
        assert_eq!(catalog.values_for("id"), vec![json!(6), json!(7), json!(8)]);
        assert_eq!(
            catalog.values_for("bogus"),
            vec![Value::Null, Value::Null, Value::Null]
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = FieldCatalog::from_fields(vec![
            FieldDescriptor::new(6, "A", FieldType::Text),
            FieldDescriptor::new(6, "B", FieldType::Text),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateFieldId(6))));
    }

    #[test]
    fn test_deserialize_from_api_shape() {
        let catalog: FieldCatalog = serde_json::from_value(json!([
            {"id": 6, "label": "Full Name", "type": "text"},
            {"id": 7, "label": "Amount", "type": "numeric"}
        ]))
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup_by_id(6).unwrap().label, "Full Name");
    }
}
