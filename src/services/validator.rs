// src/services/validator.rs

//! Schema validation of generated provisioning documents.
//!
//! [`XsdValidator`] performs a structural check against the provisioning
//! schema: the document must be well-formed, bind the `pnp` prefix to the
//! schema's target namespace, and use only `pnp:` elements the schema
//! declares. Content models are not evaluated.

use std::collections::HashSet;
use std::path::PathBuf;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{AppError, Result};

const PNP_PREFIX: &[u8] = b"pnp";

/// Result of validating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    /// Human-readable findings, `Line L, Column C: message` where a position
    /// is known
    pub diagnostics: Vec<String>,
    /// Validation could not run (schema missing or unreadable)
    pub skipped: bool,
}

impl ValidationOutcome {
    fn from_diagnostics(diagnostics: Vec<String>) -> Self {
        Self {
            is_valid: diagnostics.is_empty(),
            diagnostics,
            skipped: false,
        }
    }

    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            diagnostics: vec![reason.into()],
            skipped: true,
        }
    }
}

/// Validates a serialized document.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, xml: &str) -> ValidationOutcome;

    /// Schema name shown in reports.
    fn schema_name(&self) -> String;
}

/// Element names and target namespace read from an XSD file.
#[derive(Debug, Clone, Default)]
struct SchemaIndex {
    target_namespace: Option<String>,
    elements: HashSet<String>,
}

impl SchemaIndex {
    fn parse(xsd: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xsd);
        reader.config_mut().trim_text(true);

        let mut index = SchemaIndex::default();
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    match e.local_name().as_ref() {
                        b"schema" => {
                            index.target_namespace = attribute(&e, b"targetNamespace");
                        }
                        b"element" => {
                            if let Some(name) = attribute(&e, b"name") {
                                index.elements.insert(name);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(AppError::validation(format!("unreadable schema: {e}")));
                }
            }
        }

        if index.elements.is_empty() {
            return Err(AppError::validation("schema declares no elements"));
        }
        Ok(index)
    }
}

/// Structural validator backed by an XSD file on disk.
#[derive(Debug, Clone)]
pub struct XsdValidator {
    schema_path: PathBuf,
}

impl XsdValidator {
    pub fn new(schema_path: impl Into<PathBuf>) -> Self {
        Self {
            schema_path: schema_path.into(),
        }
    }

    fn check(&self, schema: &SchemaIndex, xml: &str) -> Vec<String> {
        let mut diagnostics = Vec::new();
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut depth = 0usize;
        let mut seen_root = false;

        loop {
            let event = reader.read_event();
            let end = usize::try_from(reader.buffer_position()).unwrap_or(xml.len());

            match event {
                Ok(Event::Start(e)) => {
                    let offset = tag_start(xml, end);
                    if !seen_root {
                        seen_root = true;
                        check_namespace(&e, schema, xml, offset, &mut diagnostics);
                    }
                    check_declared(&e, schema, xml, offset, &mut diagnostics);
                    depth += 1;
                }
                Ok(Event::Empty(e)) => {
                    let offset = tag_start(xml, end);
                    if !seen_root {
                        seen_root = true;
                        check_namespace(&e, schema, xml, offset, &mut diagnostics);
                    }
                    check_declared(&e, schema, xml, offset, &mut diagnostics);
                }
                Ok(Event::End(_)) => depth = depth.saturating_sub(1),
                Ok(Event::Eof) => {
                    if !seen_root {
                        diagnostics.push(format!(
                            "{}: document has no root element",
                            position(xml, xml.len())
                        ));
                    } else if depth > 0 {
                        diagnostics.push(format!(
                            "{}: premature end of document, {} element(s) left open",
                            position(xml, xml.len()),
                            depth
                        ));
                    }
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    let offset =
                        usize::try_from(reader.error_position()).unwrap_or(xml.len());
                    diagnostics.push(format!("{}: {}", position(xml, offset), e));
                    break;
                }
            }
        }

        diagnostics
    }
}

impl SchemaValidator for XsdValidator {
    fn validate(&self, xml: &str) -> ValidationOutcome {
        let xsd = match std::fs::read_to_string(&self.schema_path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Schema file {} not found", self.schema_path.display());
                return ValidationOutcome::skipped(format!(
                    "XSD schema file not found: {}",
                    self.schema_path.display()
                ));
            }
            Err(e) => {
                return ValidationOutcome::skipped(format!(
                    "XSD schema file could not be read: {}: {}",
                    self.schema_path.display(),
                    e
                ));
            }
        };

        let schema = match SchemaIndex::parse(&xsd) {
            Ok(schema) => schema,
            Err(e) => {
                log::warn!("Schema {} unusable: {}", self.schema_path.display(), e);
                return ValidationOutcome::skipped(format!(
                    "XSD schema could not be loaded: {e}"
                ));
            }
        };

        let outcome = ValidationOutcome::from_diagnostics(self.check(&schema, xml));
        log::debug!(
            "Validated against {}: {} diagnostic(s)",
            self.schema_name(),
            outcome.diagnostics.len()
        );
        outcome
    }

    fn schema_name(&self) -> String {
        self.schema_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.schema_path.display().to_string())
    }
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|value| value.into_owned()))
}

fn check_namespace(
    root: &BytesStart<'_>,
    schema: &SchemaIndex,
    xml: &str,
    offset: usize,
    diagnostics: &mut Vec<String>,
) {
    let Some(expected) = schema.target_namespace.as_deref() else {
        return;
    };
    match attribute(root, b"xmlns:pnp") {
        Some(actual) if actual == expected => {}
        Some(actual) => diagnostics.push(format!(
            "{}: namespace '{}' does not match schema target namespace '{}'",
            position(xml, offset),
            actual,
            expected
        )),
        None => diagnostics.push(format!(
            "{}: root element does not declare the pnp namespace",
            position(xml, offset)
        )),
    }
}

fn check_declared(
    element: &BytesStart<'_>,
    schema: &SchemaIndex,
    xml: &str,
    offset: usize,
    diagnostics: &mut Vec<String>,
) {
    let name = element.name();
    let Some(prefix) = name.prefix() else {
        return;
    };
    if prefix.as_ref() != PNP_PREFIX {
        return;
    }
    let local = String::from_utf8_lossy(name.local_name().as_ref()).into_owned();
    if !schema.elements.contains(&local) {
        diagnostics.push(format!(
            "{}: element 'pnp:{}' is not declared in the schema",
            position(xml, offset),
            local
        ));
    }
}

/// Byte offset of the `<` opening the tag that ends at `end`.
fn tag_start(xml: &str, end: usize) -> usize {
    let end = end.min(xml.len());
    xml.as_bytes()[..end]
        .iter()
        .rposition(|&b| b == b'<')
        .unwrap_or(0)
}

/// One-based `Line L, Column C` for a byte offset.
fn position(xml: &str, offset: usize) -> String {
    let before = &xml.as_bytes()[..offset.min(xml.len())];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |idx| idx + 1);
    format!("Line {}, Column {}", line, before.len() - line_start + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, FieldType, ListDef, ListTemplateType, NavItem, SiteStructure};
    use crate::services::normalizer::normalize;
    use crate::services::serializer::{PNP_NAMESPACE, render_template};
    use tempfile::TempDir;

    const DECLARED: [&str; 15] = [
        "Provisioning",
        "Templates",
        "ProvisioningTemplate",
        "WebSettings",
        "Features",
        "SiteFeatures",
        "Feature",
        "Lists",
        "ListInstance",
        "Fields",
        "Navigation",
        "GlobalNavigation",
        "CurrentNavigation",
        "StructuralNavigation",
        "NavigationNode",
    ];

    fn write_schema(dir: &TempDir, names: &[&str]) -> PathBuf {
        let elements: String = names
            .iter()
            .map(|name| format!("  <xsd:element name=\"{name}\" type=\"xsd:anyType\"/>\n"))
            .collect();
        let xsd = format!(
            "<?xml version=\"1.0\"?>\n<xsd:schema xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" \
             targetNamespace=\"{PNP_NAMESPACE}\">\n{elements}</xsd:schema>\n"
        );
        let path = dir.path().join("ProvisioningSchema-2022-09.xsd");
        std::fs::write(&path, xsd).unwrap();
        path
    }

    fn rendered() -> String {
        let mut site = SiteStructure {
            site_title: Some("Ops".to_string()),
            site_fields: vec![Field::new("Region", "Region", FieldType::Text)],
            lists: vec![ListDef::new("Sites", ListTemplateType::CustomList)],
            navigation: vec![NavItem::new("Home", "{site}")],
            ..SiteStructure::default()
        };
        normalize(&mut site).unwrap();
        render_template(&site).unwrap()
    }

    #[test]
    fn test_generated_document_is_valid() {
        let tmp = TempDir::new().unwrap();
        let validator = XsdValidator::new(write_schema(&tmp, &DECLARED));

        let outcome = validator.validate(&rendered());
        assert!(outcome.is_valid, "{:?}", outcome.diagnostics);
        assert!(!outcome.skipped);
        assert_eq!(validator.schema_name(), "ProvisioningSchema-2022-09.xsd");
    }

    #[test]
    fn test_missing_schema_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let validator = XsdValidator::new(tmp.path().join("missing.xsd"));

        let outcome = validator.validate(&rendered());
        assert!(!outcome.is_valid);
        assert!(outcome.skipped);
        assert!(outcome.diagnostics[0].starts_with("XSD schema file not found: "));
    }

    #[test]
    fn test_undeclared_element_reported_with_position() {
        let tmp = TempDir::new().unwrap();
        let validator = XsdValidator::new(write_schema(&tmp, &["Provisioning"]));

        let xml = format!(
            "<?xml version=\"1.0\"?>\n<pnp:Provisioning xmlns:pnp=\"{PNP_NAMESPACE}\">\n  <pnp:Bogus/>\n</pnp:Provisioning>"
        );
        let outcome = validator.validate(&xml);
        assert!(!outcome.is_valid);
        assert_eq!(
            outcome.diagnostics,
            vec!["Line 3, Column 3: element 'pnp:Bogus' is not declared in the schema"]
        );
    }

    #[test]
    fn test_namespace_mismatch() {
        let tmp = TempDir::new().unwrap();
        let validator = XsdValidator::new(write_schema(&tmp, &DECLARED));

        let xml = "<pnp:Provisioning xmlns:pnp=\"urn:other\"/>";
        let outcome = validator.validate(xml);
        assert!(!outcome.is_valid);
        assert!(outcome.diagnostics[0].starts_with("Line 1, Column 1: namespace 'urn:other'"));
    }

    #[test]
    fn test_malformed_document() {
        let tmp = TempDir::new().unwrap();
        let validator = XsdValidator::new(write_schema(&tmp, &DECLARED));

        let xml = format!(
            "<pnp:Provisioning xmlns:pnp=\"{PNP_NAMESPACE}\">\n<pnp:Templates>\n</pnp:Provisioning>"
        );
        let outcome = validator.validate(&xml);
        assert!(!outcome.is_valid);
        assert!(!outcome.skipped);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].starts_with("Line "));
    }

    #[test]
    fn test_unclosed_document() {
        let tmp = TempDir::new().unwrap();
        let validator = XsdValidator::new(write_schema(&tmp, &DECLARED));

        let xml = format!("<pnp:Provisioning xmlns:pnp=\"{PNP_NAMESPACE}\">\n<pnp:Templates>");
        let outcome = validator.validate(&xml);
        assert!(!outcome.is_valid);
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn test_schema_without_elements_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let validator = XsdValidator::new(write_schema(&tmp, &[]));

        let outcome = validator.validate(&rendered());
        assert!(outcome.skipped);
        assert!(!outcome.is_valid);
    }

    #[test]
    fn test_position() {
        let text = "ab\ncde\nf";
        assert_eq!(position(text, 0), "Line 1, Column 1");
        assert_eq!(position(text, 4), "Line 2, Column 2");
        assert_eq!(position(text, 100), "Line 3, Column 2");
    }
}
