//! Resource metadata handed to drivers.

use std::collections::BTreeMap;

use crudkit_model::{DataType, Identity, SchemaProvide};
use serde::{Deserialize, Serialize};

/// Storage-relevant facts about one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    pub data_type: DataType,
}

/// What a driver needs to know about a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceMeta {
    pub resource: String,
    pub identity: Identity,
    pub fields: BTreeMap<String, FieldMeta>,
}

impl PersistenceMeta {
    pub fn new(resource: impl Into<String>, identity: impl Into<Identity>) -> Self {
        Self {
            resource: resource.into(),
            identity: identity.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Metadata of the schema's domain: every declared field with its type.
    pub fn from_schema(schema: &SchemaProvide) -> Self {
        Self {
            resource: schema.domain.clone(),
            identity: schema.identity.clone(),
            fields: schema
                .fields
                .iter()
                .map(|field| {
                    (
                        field.name.clone(),
                        FieldMeta {
                            data_type: field.data_type,
                        },
                    )
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.fields.insert(name.into(), FieldMeta { data_type });
        self
    }

    /// Declared type of `name`; undeclared fields are treated as strings.
    pub fn data_type(&self, name: &str) -> DataType {
        self.fields
            .get(name)
            .map_or(DataType::String, |field| field.data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudkit_model::FieldConfig;

    #[test]
    fn derives_from_schema() {
        let schema = SchemaProvide::new("users", ["org", "id"])
            .with_field(FieldConfig::text("org"))
            .with_field(FieldConfig::new("id", "number", DataType::Integer));
        let meta = PersistenceMeta::from_schema(&schema);
        assert_eq!(meta.resource, "users");
        assert_eq!(meta.identity, Identity::from(["org", "id"]));
        assert_eq!(meta.data_type("id"), DataType::Integer);
        assert_eq!(meta.data_type("org"), DataType::String);
        assert_eq!(meta.data_type("missing"), DataType::String);
    }
}
