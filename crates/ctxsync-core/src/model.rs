//! Request and response bodies of the context definition API.
//!
//! Field names follow the API's camelCase JSON. Response types only declare
//! the fields the workflow reads and tolerate everything else.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Static description of the context definition to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDescriptor {
    pub name: String,
    pub description: String,
    pub developer_name: String,
    /// Developer name of the standard context being extended.
    pub base_reference: String,
    /// ISO-8601 timestamp, e.g. `2024-01-01T00:00:00.000Z`.
    pub start_date: String,
}

/// Body returned by the create call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedContext {
    #[serde(default)]
    pub context_definition_id: Option<String>,
}

/// Body returned when fetching a context definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDefinition {
    #[serde(default)]
    pub context_definition_version_list: Vec<ContextDefinitionVersion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDefinitionVersion {
    #[serde(default)]
    pub context_mappings: Vec<ContextMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMapping {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub context_mapping_id: Option<String>,
}

impl ContextDefinition {
    /// First mapping named `name` in the first version entry.
    ///
    /// Later versions and later duplicates are ignored. Returns `None` when
    /// there is no version or no mapping of that name.
    pub fn find_mapping(&self, name: &str) -> Option<&ContextMapping> {
        self.context_definition_version_list
            .first()?
            .context_mappings
            .iter()
            .find(|m| m.name.as_deref() == Some(name))
    }
}

/// Body of the bind call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingUpdate {
    pub context_mappings: Vec<MappingBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingBinding {
    pub context_mapping_id: String,
    pub is_default: bool,
    pub name: String,
}

impl MappingUpdate {
    /// A single-entry update making `mapping_id` the default mapping.
    pub fn default_mapping(mapping_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            context_mappings: vec![MappingBinding {
                context_mapping_id: mapping_id.into(),
                is_default: true,
                name: name.into(),
            }],
        }
    }
}

/// Body of the activate call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    pub is_active: bool,
}

/// Body returned by the pricing sync trigger.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricingSyncResponse {
    /// The `success` flag. JSON `true`, the string `"true"` (any case) and
    /// non-zero numbers count as success. Anything else, including a missing
    /// flag, does not.
    #[serde(default, deserialize_with = "truthy_flag")]
    pub success: bool,
}

fn truthy_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(flag)) => flag,
        Some(Value::String(text)) => text.trim().eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}
