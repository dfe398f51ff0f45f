// src/models/site.rs

//! The site configuration record and its list/navigation parts.

use serde::{Deserialize, Serialize};

use super::nullable;
use super::{ContentType, Field, ListField};
use crate::error::Result;

/// Top-level site category driving the base template code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SiteType {
    #[default]
    Team,
    Communication,
    /// Legacy classic team site
    Classic,
    /// Legacy document center
    Document,
    Other(String),
}

impl SiteType {
    /// Base site template code. Unrecognized types use the team template.
    pub fn base_template(&self) -> &'static str {
        match self {
            SiteType::Team | SiteType::Other(_) => "GROUP#0",
            SiteType::Communication => "SITEPAGEPUBLISHING#0",
            SiteType::Classic => "STS#3",
            SiteType::Document => "STS#0",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SiteType::Team => "TeamSite",
            SiteType::Communication => "CommunicationSite",
            SiteType::Classic => "classic",
            SiteType::Document => "document",
            SiteType::Other(label) => label,
        }
    }
}

impl From<String> for SiteType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "teamsite" | "team" => SiteType::Team,
            "communicationsite" | "communication" => SiteType::Communication,
            "classic" => SiteType::Classic,
            "document" => SiteType::Document,
            _ => SiteType::Other(value),
        }
    }
}

impl From<SiteType> for String {
    fn from(value: SiteType) -> Self {
        match value {
            SiteType::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

/// List template type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum ListTemplateType {
    #[default]
    CustomList,
    DocumentLibrary,
    Announcements,
    Contacts,
    Events,
    Tasks,
    PictureLibrary,
    Other(u32),
}

impl ListTemplateType {
    pub fn code(self) -> u32 {
        match self {
            ListTemplateType::CustomList => 100,
            ListTemplateType::DocumentLibrary => 101,
            ListTemplateType::Announcements => 104,
            ListTemplateType::Contacts => 105,
            ListTemplateType::Events => 106,
            ListTemplateType::Tasks => 107,
            ListTemplateType::PictureLibrary => 109,
            ListTemplateType::Other(code) => code,
        }
    }

    /// Whether the template is a library (documents or pictures).
    pub fn is_library(self) -> bool {
        matches!(
            self,
            ListTemplateType::DocumentLibrary | ListTemplateType::PictureLibrary
        )
    }
}

impl From<u32> for ListTemplateType {
    fn from(code: u32) -> Self {
        match code {
            100 => ListTemplateType::CustomList,
            101 => ListTemplateType::DocumentLibrary,
            104 => ListTemplateType::Announcements,
            105 => ListTemplateType::Contacts,
            106 => ListTemplateType::Events,
            107 => ListTemplateType::Tasks,
            109 => ListTemplateType::PictureLibrary,
            other => ListTemplateType::Other(other),
        }
    }
}

impl From<ListTemplateType> for u32 {
    fn from(value: ListTemplateType) -> Self {
        value.code()
    }
}

/// A list or library instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDef {
    pub title: String,

    #[serde(default)]
    pub template_type: ListTemplateType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Only meaningful for document libraries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_versioning: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_content_types: Option<bool>,

    /// Content type names
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub content_types: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_quick_launch: Option<bool>,

    /// Field references; empty means every site field unless references
    /// were declared and later dropped
    #[serde(default, deserialize_with = "nullable")]
    pub fields: Vec<ListField>,

    /// Set by the normalizer when the record declared field references
    #[serde(skip)]
    pub declared_fields: bool,
}

impl ListDef {
    /// Create a list with the given title and template.
    pub fn new(title: impl Into<String>, template_type: ListTemplateType) -> Self {
        Self {
            title: title.into(),
            template_type,
            url: None,
            description: None,
            enable_versioning: None,
            enable_content_types: None,
            content_types: Vec::new(),
            on_quick_launch: None,
            fields: Vec::new(),
            declared_fields: false,
        }
    }

    /// Explicit URL, or one derived from the title.
    pub fn resolved_url(&self) -> String {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.to_string();
        }
        let compact: String = self.title.chars().filter(|c| !c.is_whitespace()).collect();
        if self.template_type.is_library() {
            compact
        } else {
            format!("Lists/{compact}")
        }
    }

    /// Explicit description, or a generic one derived from the title.
    pub fn resolved_description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("List for managing {}", self.title.to_lowercase()))
    }

    pub fn versioning_enabled(&self) -> bool {
        self.enable_versioning.unwrap_or(true)
    }

    /// Whether the list gets every site field: true only when it never
    /// declared any field references.
    pub fn takes_all_site_fields(&self) -> bool {
        self.fields.is_empty() && !self.declared_fields
    }
}

/// A navigation node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub title: String,
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NavItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: None,
        }
    }
}

/// A feature to activate, either a bare identifier or a described entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Feature {
    Id(String),
    Detailed {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<String>,
    },
}

impl Feature {
    pub fn id(&self) -> &str {
        match self {
            Feature::Id(id) => id,
            Feature::Detailed { id, .. } => id,
        }
    }
}

/// The configuration record for one site.
///
/// Produced by the generator or the fallback extractor, normalized once in
/// place, then serialized into a provisioning document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteStructure {
    #[serde(default)]
    pub site_type: SiteType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub site_fields: Vec<Field>,

    #[serde(default, deserialize_with = "nullable")]
    pub content_types: Vec<ContentType>,

    #[serde(default, deserialize_with = "nullable")]
    pub lists: Vec<ListDef>,

    #[serde(default, deserialize_with = "nullable")]
    pub navigation: Vec<NavItem>,

    #[serde(default, deserialize_with = "nullable")]
    pub features: Vec<Feature>,
}

impl SiteStructure {
    /// Parse a record from generator JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render the record as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a site field by its exact name.
    pub fn site_field(&self, name: &str) -> Option<&Field> {
        self.site_fields.iter().find(|f| f.name == name)
    }

    /// Title used for display, with a generic default.
    pub fn title_or_default(&self) -> &str {
        self.site_title.as_deref().unwrap_or("SharePoint Site Template")
    }
}
