// src/models/mod.rs

//! Domain models for the template generator.
//!
//! This module contains the site configuration record, its field and
//! content type parts, and the application configuration.

mod config;
mod field;
mod site;

use serde::{Deserialize, Deserializer};

// Re-export all public types
pub use config::{Config, GeneratorConfig, LoggingConfig, OutputConfig};
pub use field::{ContentType, ContentTypeParent, Field, FieldType, ListField};
pub use site::{Feature, ListDef, ListTemplateType, NavItem, SiteStructure, SiteType};

/// Deserialize `null` as the type's default value.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
