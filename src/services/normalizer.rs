// src/services/normalizer.rs

//! Structure normalization.
//!
//! Brings a loosely-shaped [`SiteStructure`] into a consistent state:
//!
//! - site fields are unique by case-insensitive name
//! - fields named after SharePoint built-in columns are renamed `Custom…`
//! - every field carries a braced uppercase UUID
//! - fields declared inline on lists become site fields
//! - list and content type references point at existing site fields
//! - content types carry a lineage-prefixed identifier
//!
//! The registry is filled in two passes (site fields, then list fields) and
//! the first definition of a name always wins. Running the normalizer on an
//! already-normalized record changes nothing.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Field, FieldType, ListField, SiteStructure};

/// Built-in SharePoint column names (lowercase) that custom fields must avoid.
const RESERVED_FIELD_NAMES: &[&str] = &[
    "location",
    "title",
    "description",
    "author",
    "editor",
    "created",
    "modified",
    "id",
    "version",
    "name",
    "url",
    "path",
    "type",
    "size",
    "status",
    "category",
    "comments",
    "tags",
    "keywords",
    "subject",
    "company",
    "manager",
    "department",
    "priority",
    "assignedto",
    "duedate",
    "startdate",
    "percentcomplete",
    "outcome",
    "contenttype",
    "attachments",
    "linkfilename",
    "docicon",
    "edit",
    "folder",
    "order",
    "guid",
    "fileleafref",
    "fileref",
    "filepath",
    "filesizebytes",
    "checkedoutto",
    "owner",
    "workflow",
    "importance",
    "sensitivity",
];

/// Separator between the content type lineage prefix and its suffix.
const CONTENT_TYPE_SEPARATOR: &str = "00";

/// Length of the random hex suffix of a content type identifier.
const CONTENT_TYPE_SUFFIX_LEN: usize = 30;

/// Whether a field name collides with a built-in column.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_FIELD_NAMES.contains(&name.to_lowercase().as_str())
}

/// Final name of a field after the reserved-name rule.
pub fn sanitized_name(name: &str) -> String {
    if is_reserved(name) {
        format!("Custom{name}")
    } else {
        name.to_string()
    }
}

/// Registry key for a (possibly unsanitized) field name.
fn registry_key(name: &str) -> String {
    sanitized_name(name).to_lowercase()
}

/// Generate a braced uppercase UUID field identifier.
pub fn new_field_id() -> String {
    format!("{{{}}}", Uuid::new_v4().to_string().to_uppercase())
}

/// Generate a content type identifier for the given lineage prefix.
pub fn new_content_type_id(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .to_uppercase()
        .chars()
        .take(CONTENT_TYPE_SUFFIX_LEN)
        .collect();
    format!("{prefix}{CONTENT_TYPE_SEPARATOR}{suffix}")
}

/// Central field registry keyed by lowercase final name.
///
/// Values keep first-seen order so the resulting `site_fields` sequence is
/// deterministic.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    index: HashMap<String, usize>,
    fields: Vec<Field>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Canonical entry for a name, applying the reserved-name rule first.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.index
            .get(&registry_key(name))
            .map(|&idx| &self.fields[idx])
    }

    /// Insert a field that has already been sanitized and given an id.
    ///
    /// If the name is already registered, the existing entry wins and only
    /// adopts choices it is missing. Returns the canonical entry.
    fn insert_or_merge(&mut self, field: Field) -> &Field {
        let key = field.name.to_lowercase();
        match self.index.get(&key) {
            Some(&idx) => {
                let existing = &mut self.fields[idx];
                if existing.choices.is_empty() && !field.choices.is_empty() {
                    existing.choices = field.choices;
                }
                &self.fields[idx]
            }
            None => {
                let idx = self.fields.len();
                self.index.insert(key, idx);
                self.fields.push(field);
                &self.fields[idx]
            }
        }
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }
}

/// Normalize a site record in place.
///
/// Fails with [`AppError::Validation`] when a field that must become a
/// registry entry lacks a display name or type, or is a Choice field without
/// choices.
pub fn normalize(site: &mut SiteStructure) -> Result<()> {
    let mut registry = FieldRegistry::new();

    // Pass 1: site-declared fields
    for mut field in std::mem::take(&mut site.site_fields) {
        if registry.get(&field.name).is_some() {
            log::debug!("Merging duplicate site field '{}'", field.name);
            registry.insert_or_merge(sanitize(field));
            continue;
        }
        check_definition(&field)?;
        field = sanitize(field);
        if field.id.is_none() {
            field.id = Some(new_field_id());
        }
        registry.insert_or_merge(field);
    }

    // Pass 2: list-declared fields
    for list in &mut site.lists {
        list.declared_fields |= !list.fields.is_empty();
        let mut resolved = Vec::with_capacity(list.fields.len());
        for entry in std::mem::take(&mut list.fields) {
            match entry {
                ListField::Inline(field) => {
                    resolved.push(ListField::Inline(register_inline(&mut registry, field)?));
                }
                ListField::Name(name) => match registry.get(&name) {
                    Some(canonical) => resolved.push(ListField::Name(canonical.name.clone())),
                    None => log::warn!(
                        "List '{}' references unknown field '{}'; dropping reference",
                        list.title,
                        name
                    ),
                },
            }
        }
        list.fields = resolved;
    }

    // Content type references and identifiers
    for ct in &mut site.content_types {
        let mut resolved = Vec::with_capacity(ct.fields.len());
        for name in std::mem::take(&mut ct.fields) {
            match registry.get(&name) {
                Some(canonical) => resolved.push(canonical.name.clone()),
                None => log::warn!(
                    "Content type '{}' references unknown field '{}'; dropping reference",
                    ct.name,
                    name
                ),
            }
        }
        ct.fields = resolved;

        if ct.id.is_none() {
            ct.id = Some(new_content_type_id(ct.parent.id_prefix()));
        }
    }

    if site.base_template.is_none() {
        site.base_template = Some(site.site_type.base_template().to_string());
    }

    log::debug!("Normalized {} site fields", registry.len());
    site.site_fields = registry.into_fields();
    Ok(())
}

/// Fold an inline list field into the registry and return the list's
/// rewritten entry.
fn register_inline(registry: &mut FieldRegistry, mut field: Field) -> Result<Field> {
    if let Some(canonical) = registry.get(&field.name) {
        let reserved = is_reserved(&field.name);
        field.name = canonical.name.clone();
        field.id = canonical.id.clone();
        if reserved {
            field.display_name = field.display_name.map(|d| format!("Custom {d}"));
        }
        return Ok(field);
    }

    check_definition(&field)?;
    field = sanitize(field);
    if field.id.is_none() {
        field.id = Some(new_field_id());
    }
    registry.insert_or_merge(field.clone());
    Ok(field)
}

/// Apply the reserved-name rule to name and display name.
fn sanitize(mut field: Field) -> Field {
    if is_reserved(&field.name) {
        field.name = format!("Custom{}", field.name);
        let display = field.display_name.take().unwrap_or_default();
        field.display_name = Some(format!("Custom {display}"));
    }
    field
}

fn check_definition(field: &Field) -> Result<()> {
    if field.name.trim().is_empty() {
        return Err(AppError::validation("field has an empty name"));
    }
    if field
        .display_name
        .as_deref()
        .is_none_or(|d| d.trim().is_empty())
    {
        return Err(AppError::validation(format!(
            "field '{}' has no displayName",
            field.name
        )));
    }
    match &field.field_type {
        None => Err(AppError::validation(format!(
            "field '{}' has no type",
            field.name
        ))),
        Some(FieldType::Choice) if field.choices.is_empty() => Err(AppError::validation(format!(
            "choice field '{}' has no choices",
            field.name
        ))),
        Some(_) => Ok(()),
    }
}
