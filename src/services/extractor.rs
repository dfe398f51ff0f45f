// src/services/extractor.rs

//! Fallback extractor.
//!
//! Derives a minimal site record from the description text with pattern
//! matching. Used when no generator is configured or the generator fails.

use regex::Regex;

use crate::models::{Field, FieldType, ListDef, ListField, ListTemplateType, NavItem};
use crate::models::{SiteStructure, SiteType};
use crate::services::generator::{Generated, GenerationSource};
use crate::services::normalizer::new_field_id;
use crate::utils::text::{title_case, truncate_with_ellipsis};

/// Words that switch the site type to a team site.
const TEAM_KEYWORDS: [&str; 3] = ["team", "collaboration", "project"];

/// Maximum description length carried into the record.
const MAX_DESCRIPTION_CHARS: usize = 100;

const DEFAULT_LIBRARY: &str = "Documents";

/// Pattern-matching extractor producing a minimal valid record.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackExtractor;

impl FallbackExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Build a record from free text. Never fails; unmatched patterns fall
    /// back to defaults.
    pub fn extract(&self, description: &str) -> SiteStructure {
        let lower = description.to_lowercase();
        let is_team = TEAM_KEYWORDS.iter().any(|k| lower.contains(k));

        let site_type = if is_team {
            SiteType::Team
        } else {
            SiteType::Communication
        };

        let called = called_name(description);
        let site_title = quoted_title(description, called.as_ref().map(|(_, span)| *span))
            .unwrap_or_else(|| {
                if lower.contains("team") {
                    "Team Collaboration Site".to_string()
                } else if lower.contains("project") {
                    "Project Management Site".to_string()
                } else {
                    "Corporate Portal".to_string()
                }
            });

        let library_name = match called {
            Some((name, _)) => title_case(&name),
            None if lower.contains("library") => library_token(&lower)
                .map(|token| title_case(&token))
                .unwrap_or_else(|| DEFAULT_LIBRARY.to_string()),
            None => DEFAULT_LIBRARY.to_string(),
        };

        log::debug!(
            "Fallback extraction: type={}, title='{}', library='{}'",
            site_type.label(),
            site_title,
            library_name
        );

        let mut status = Field::new("DocumentStatus", "Document Status", FieldType::Choice)
            .with_choices(["Draft", "Review", "Approved"])
            .with_group("Custom Columns");
        status.id = Some(new_field_id());

        let mut library = ListDef::new(library_name.clone(), ListTemplateType::DocumentLibrary);
        library.url = Some(library_name.replace(' ', ""));
        library.enable_versioning = Some(true);
        library.enable_content_types = Some(true);
        library.fields = vec![ListField::Name(status.name.clone())];

        SiteStructure {
            base_template: Some(site_type.base_template().to_string()),
            site_type,
            site_title: Some(site_title),
            description: Some(truncate_with_ellipsis(description, MAX_DESCRIPTION_CHARS)),
            site_fields: vec![status],
            content_types: Vec::new(),
            lists: vec![library],
            navigation: vec![
                NavItem::new("Home", "{site}"),
                NavItem::new("Documents", "{site}/Shared Documents/Forms/AllItems.aspx"),
            ],
            features: Vec::new(),
        }
    }

    /// Extract a record and pair it with its JSON rendering.
    pub fn generate(&self, description: &str) -> Generated {
        let site = self.extract(description);
        let raw = site.to_json_pretty().unwrap_or_default();
        Generated {
            site,
            raw,
            source: GenerationSource::Fallback,
        }
    }
}

/// Library name from a `called "<name>"` phrase, with the byte span of the
/// quoted name.
fn called_name(text: &str) -> Option<(String, (usize, usize))> {
    let pattern = Regex::new(r#"called\s+['"]([^'"]+)['"]"#).ok()?;
    let name = pattern.captures(text)?.get(1)?;
    Some((name.as_str().to_string(), (name.start(), name.end())))
}

/// First quoted substring, title-cased, ignoring the span that names the
/// library.
fn quoted_title(text: &str, skip: Option<(usize, usize)>) -> Option<String> {
    let pattern = Regex::new(r#"['"]([^'"]+)['"]"#).ok()?;
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find(|m| skip != Some((m.start(), m.end())))
        .map(|m| title_case(m.as_str()))
}

/// Token following the word "library" in lowercase text.
fn library_token(lower: &str) -> Option<String> {
    let pattern = Regex::new(r#"library\s+['"]?([^'".\s]+)['"]?"#).ok()?;
    let token = pattern.captures(lower)?.get(1)?;
    Some(token.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_site_with_called_library() {
        let site = FallbackExtractor::new().extract(
            r#"team site for marketing with a document library called "Project Files""#,
        );

        assert_eq!(site.site_type, SiteType::Team);
        let title = site.site_title.as_deref().unwrap();
        assert!(title.contains("Marketing") || title == "Team Collaboration Site");

        let library = &site.lists[0];
        assert_eq!(library.title, "Project Files");
        assert_eq!(library.url.as_deref(), Some("ProjectFiles"));
        assert_eq!(library.template_type, ListTemplateType::DocumentLibrary);
    }

    #[test]
    fn test_defaults_to_communication_portal() {
        let site = FallbackExtractor::new().extract("Company news and announcements");

        assert_eq!(site.site_type, SiteType::Communication);
        assert_eq!(site.base_template.as_deref(), Some("SITEPAGEPUBLISHING#0"));
        assert_eq!(site.site_title.as_deref(), Some("Corporate Portal"));
        assert_eq!(site.lists[0].title, "Documents");
        assert_eq!(site.lists[0].url.as_deref(), Some("Documents"));
    }

    #[test]
    fn test_quoted_title_is_title_cased() {
        let site = FallbackExtractor::new().extract("An intranet called 'hr policies hub'");
        // 'called' without a library still names the library
        assert_eq!(site.lists[0].title, "Hr Policies Hub");

        let site = FallbackExtractor::new().extract("Build the 'global sales' intranet");
        assert_eq!(site.site_title.as_deref(), Some("Global Sales"));
    }

    #[test]
    fn test_project_title_default() {
        let site = FallbackExtractor::new().extract("Site to track project milestones");
        assert_eq!(site.site_type, SiteType::Team);
        assert_eq!(site.site_title.as_deref(), Some("Project Management Site"));
    }

    #[test]
    fn test_library_token_after_keyword() {
        let site = FallbackExtractor::new().extract("Portal with a library contracts.");
        assert_eq!(site.lists[0].title, "Contracts");
        assert_eq!(site.lists[0].url.as_deref(), Some("Contracts"));
    }

    #[test]
    fn test_fixed_field_and_navigation() {
        let site = FallbackExtractor::new().extract("anything");

        assert_eq!(site.site_fields.len(), 1);
        let status = &site.site_fields[0];
        assert_eq!(status.name, "DocumentStatus");
        assert_eq!(status.choices, vec!["Draft", "Review", "Approved"]);
        assert!(status.id.as_deref().unwrap().starts_with('{'));

        let titles: Vec<_> = site.navigation.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Home", "Documents"]);
        assert!(site.content_types.is_empty());
        assert!(site.features.is_empty());
    }

    #[test]
    fn test_long_description_truncated() {
        let text = "word ".repeat(40);
        let site = FallbackExtractor::new().extract(&text);
        let description = site.description.unwrap();
        assert_eq!(description.chars().count(), 103);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn test_generate_reports_json() {
        let generated = FallbackExtractor::new().generate("team wiki");
        assert_eq!(generated.source, GenerationSource::Fallback);
        let parsed = SiteStructure::from_json(&generated.raw).unwrap();
        assert_eq!(parsed, generated.site);
    }
}
