// src/pipeline/generate.rs

//! Structure acquisition with fallback.
//!
//! The configured generator is tried first. Any failure on that path, be it
//! a missing generator, a failed request, an unparseable reply, or a record
//! the normalizer rejects, falls back to the pattern-matching extractor.

use crate::error::Result;
use crate::services::normalizer::normalize;
use crate::services::{FallbackExtractor, Generated, StructureGenerator};

/// Produce a normalized site record for a description.
///
/// Only a failure to normalize the fallback record itself is returned as an
/// error.
pub async fn generate_structure(
    description: &str,
    generator: Option<&dyn StructureGenerator>,
) -> Result<Generated> {
    match generator {
        Some(generator) => match generator.generate(description).await {
            Ok(mut generated) => match normalize(&mut generated.site) {
                Ok(()) => return Ok(generated),
                Err(e) => log::warn!("Generated structure rejected: {}", e),
            },
            Err(e) => log::warn!("Structure generation failed: {}", e),
        },
        None => log::info!("No generator available"),
    }

    log::info!("Using fallback extractor");
    let mut generated = FallbackExtractor::new().generate(description);
    normalize(&mut generated.site)?;
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::SiteStructure;
    use crate::services::GenerationSource;

    /// Generator returning a fixed JSON reply or a fixed error.
    struct FixedGenerator(Option<&'static str>);

    #[async_trait]
    impl StructureGenerator for FixedGenerator {
        async fn generate(&self, _description: &str) -> Result<Generated> {
            let raw = self
                .0
                .ok_or_else(|| AppError::generation("stub", "unavailable"))?;
            Ok(Generated {
                site: SiteStructure::from_json(raw)?,
                raw: raw.to_string(),
                source: GenerationSource::Model("stub".to_string()),
            })
        }
    }

    const DESCRIPTION: &str = "Company news portal";

    #[tokio::test]
    async fn test_without_generator_uses_fallback() {
        let generated = generate_structure(DESCRIPTION, None).await.unwrap();
        assert_eq!(generated.source, GenerationSource::Fallback);
        assert_eq!(generated.site.site_title.as_deref(), Some("Corporate Portal"));
        assert!(generated.site.site_fields[0].id.is_some());
    }

    #[tokio::test]
    async fn test_generator_failure_uses_fallback() {
        let generator = FixedGenerator(None);
        let generated = generate_structure(DESCRIPTION, Some(&generator))
            .await
            .unwrap();
        assert_eq!(generated.source, GenerationSource::Fallback);
    }

    #[tokio::test]
    async fn test_rejected_structure_uses_fallback() {
        let generator = FixedGenerator(Some(
            r#"{"site_fields": [{"name": "Stage", "displayName": "Stage", "type": "Choice"}]}"#,
        ));
        let generated = generate_structure(DESCRIPTION, Some(&generator))
            .await
            .unwrap();
        assert_eq!(generated.source, GenerationSource::Fallback);
    }

    #[tokio::test]
    async fn test_generated_structure_is_normalized() {
        let generator = FixedGenerator(Some(
            r#"{
                "site_type": "CommunicationSite",
                "site_title": "HR Portal",
                "site_fields": [{"name": "Title", "displayName": "Title", "type": "Text"}],
                "lists": [{"title": "Policies", "template_type": 101, "fields": ["title"]}]
            }"#,
        ));
        let generated = generate_structure(DESCRIPTION, Some(&generator))
            .await
            .unwrap();

        assert_eq!(generated.source, GenerationSource::Model("stub".to_string()));
        let site = &generated.site;
        assert_eq!(site.site_fields[0].name, "CustomTitle");
        assert_eq!(site.lists[0].fields[0].name(), "CustomTitle");
        assert_eq!(site.base_template.as_deref(), Some("SITEPAGEPUBLISHING#0"));
    }
}
