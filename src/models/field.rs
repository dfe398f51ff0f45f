// src/models/field.rs

//! Site column and content type definitions.

use serde::{Deserialize, Serialize};

use super::nullable;

/// Column type of a site field.
///
/// Unknown type names coming from the generator are carried verbatim so the
/// serializer can still emit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Choice,
    DateTime,
    User,
    Number,
    Boolean,
    Lookup,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "Text",
            FieldType::Choice => "Choice",
            FieldType::DateTime => "DateTime",
            FieldType::User => "User",
            FieldType::Number => "Number",
            FieldType::Boolean => "Boolean",
            FieldType::Lookup => "Lookup",
            FieldType::Other(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Text" => FieldType::Text,
            "Choice" => FieldType::Choice,
            "DateTime" => FieldType::DateTime,
            "User" => FieldType::User,
            "Number" => FieldType::Number,
            "Boolean" => FieldType::Boolean,
            "Lookup" => FieldType::Lookup,
            _ => FieldType::Other(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A typed column definition shared by lists and content types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Internal name (unique, case-insensitive, after normalization)
    pub name: String,

    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Allowed values, required iff the field is a Choice
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub choices: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Explicit default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    /// Braced uppercase UUID, assigned during normalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Field {
    /// Create a field with the given name, display name and type.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: Some(display_name.into()),
            field_type: Some(field_type),
            group: None,
            choices: Vec::new(),
            required: None,
            default: None,
            max_length: None,
            id: None,
        }
    }

    /// Builder-style setter for choices.
    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style setter for the column group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Display name, falling back to the internal name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Type name as emitted in markup (`Text` when unset).
    pub fn type_name(&self) -> &str {
        self.field_type.as_ref().map_or("Text", FieldType::as_str)
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.field_type, Some(FieldType::Choice))
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    /// Effective default value: the explicit default, or the first choice
    /// of a Choice field.
    pub fn default_value(&self) -> Option<&str> {
        match (&self.default, self.is_choice()) {
            (Some(value), _) if !value.is_empty() => Some(value),
            (_, true) => self.choices.first().map(String::as_str),
            _ => None,
        }
    }

    /// Identifier coerced to braced form.
    pub fn braced_id(&self) -> Option<String> {
        self.id.as_deref().map(|id| {
            if id.starts_with('{') {
                id.to_string()
            } else {
                format!("{{{id}}}")
            }
        })
    }
}

/// A list's reference to a field: either a site field name or an inline
/// definition that the normalizer folds into the site field registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListField {
    Name(String),
    Inline(Field),
}

impl ListField {
    pub fn name(&self) -> &str {
        match self {
            ListField::Name(name) => name,
            ListField::Inline(field) => &field.name,
        }
    }
}

impl From<&str> for ListField {
    fn from(name: &str) -> Self {
        ListField::Name(name.to_string())
    }
}

/// Parent lineage of a content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentTypeParent {
    Document,
    #[default]
    #[serde(other)]
    Item,
}

impl ContentTypeParent {
    /// Hex prefix of the content type identifier lineage.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ContentTypeParent::Document => "0x0101",
            ContentTypeParent::Item => "0x01",
        }
    }
}

/// Reusable grouping of site fields. Modeled and normalized, never rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default)]
    pub parent: ContentTypeParent,

    /// Site field names
    #[serde(default, deserialize_with = "nullable")]
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_roundtrip_keeps_unknown_names() {
        let parsed: FieldType = serde_json::from_str("\"Currency\"").unwrap();
        assert_eq!(parsed, FieldType::Other("Currency".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"Currency\"");
    }

    #[test]
    fn test_choice_default_is_first_choice() {
        let field = Field::new("Stage", "Stage", FieldType::Choice)
            .with_choices(["Draft", "Review", "Approved"]);
        assert_eq!(field.default_value(), Some("Draft"));
    }

    #[test]
    fn test_explicit_default_wins() {
        let mut field = Field::new("Stage", "Stage", FieldType::Choice)
            .with_choices(["Draft", "Review"]);
        field.default = Some("Review".to_string());
        assert_eq!(field.default_value(), Some("Review"));
    }

    #[test]
    fn test_braced_id() {
        let mut field = Field::new("A", "A", FieldType::Text);
        field.id = Some("ABC".to_string());
        assert_eq!(field.braced_id().as_deref(), Some("{ABC}"));
        field.id = Some("{ABC}".to_string());
        assert_eq!(field.braced_id().as_deref(), Some("{ABC}"));
    }

    #[test]
    fn test_list_field_accepts_names_and_objects() {
        let fields: Vec<ListField> = serde_json::from_str(
            r#"["Owner", {"name": "Budget", "displayName": "Budget", "type": "Number"}]"#,
        )
        .unwrap();
        assert_eq!(fields[0], ListField::Name("Owner".to_string()));
        assert_eq!(fields[1].name(), "Budget");
    }

    #[test]
    fn test_null_choices_deserialize_as_empty() {
        let field: Field =
            serde_json::from_str(r#"{"name": "Notes", "type": "Text", "choices": null}"#).unwrap();
        assert!(field.choices.is_empty());
    }

    #[test]
    fn test_unknown_parent_defaults_to_item() {
        let ct: ContentType =
            serde_json::from_str(r#"{"name": "Record", "parent": "Folder"}"#).unwrap();
        assert_eq!(ct.parent, ContentTypeParent::Item);
        assert_eq!(ct.parent.id_prefix(), "0x01");
    }
}
