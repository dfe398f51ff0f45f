// src/pipeline/run.rs

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::Result;
use crate::models::{Config, SiteStructure};
use crate::services::{
    GenerationSource, SchemaValidator, StructureGenerator, ValidationOutcome, render_template,
};
use crate::storage::{OutputStorage, run_timestamp};
use crate::utils::log;

use super::generate::generate_structure;
use super::report::{ReportInput, build_report, pretty_json_or_raw};

const TOTAL_STEPS: usize = 4;

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub source: GenerationSource,
    pub site: SiteStructure,
    pub template_path: PathBuf,
    pub template_bytes: usize,
    /// Only written when a model answered
    pub raw_output_path: Option<PathBuf>,
    pub report_path: PathBuf,
    pub outcome: ValidationOutcome,
}

/// Run generation, rendering, validation and persistence for one
/// description.
///
/// Generation and validation problems are reported and the run continues;
/// rendering and storage failures abort it.
pub async fn run_pipeline(
    config: &Config,
    description: &str,
    generator: Option<&dyn StructureGenerator>,
    validator: &dyn SchemaValidator,
    storage: &dyn OutputStorage,
) -> Result<RunSummary> {
    log::header("SharePoint PnP Provisioning XML Generator");
    log::info(&format!("Processing: {}", description));

    log::step(1, TOTAL_STEPS, "Generate - Building site structure");
    let generated = generate_structure(description, generator).await?;
    let site = &generated.site;
    log::success(&format!(
        "Generated structure for {}: '{}'",
        site.site_type.label(),
        site.title_or_default()
    ));
    describe_structure(site);

    log::step(2, TOTAL_STEPS, "Render - Converting to PnP XML");
    let xml = render_template(site)?;

    log::step(3, TOTAL_STEPS, "Validate - Checking against provisioning schema");
    let outcome = validator.validate(&xml);
    report_outcome(&outcome, config.logging.max_console_errors);

    log::step(4, TOTAL_STEPS, "Save - Writing template and report");
    let timestamp = run_timestamp(Local::now());

    let raw_output_path = match generated.source {
        GenerationSource::Model(_) => Some(
            storage
                .save_raw_output(&timestamp, &pretty_json_or_raw(&generated.raw))
                .await?,
        ),
        GenerationSource::Fallback => None,
    };

    let template_path = storage.save_template(&timestamp, &xml).await?;
    let schema_name = validator.schema_name();
    let xml_filename = file_name(&template_path);
    let report = build_report(&ReportInput {
        timestamp: &timestamp,
        schema_name: &schema_name,
        xml_filename: &xml_filename,
        outcome: &outcome,
        raw_output: &generated.raw,
    });
    let report_path = storage.save_report(&timestamp, &report).await?;

    let source_label = match &generated.source {
        GenerationSource::Model(model) => model.clone(),
        GenerationSource::Fallback => "fallback extractor".to_string(),
    };
    let status = if outcome.skipped {
        "skipped"
    } else if outcome.is_valid {
        "passed"
    } else {
        "failed"
    };

    let mut items = vec![
        ("Source", source_label),
        ("Template", template_path.display().to_string()),
        ("Size", format!("{} bytes", xml.len())),
        ("Validation", status.to_string()),
        ("Report", report_path.display().to_string()),
    ];
    if let Some(path) = &raw_output_path {
        items.push(("Generator output", path.display().to_string()));
    }
    log::summary("Template generated", &items);

    Ok(RunSummary {
        source: generated.source.clone(),
        template_bytes: xml.len(),
        site: generated.site,
        template_path,
        raw_output_path,
        report_path,
        outcome,
    })
}

fn describe_structure(site: &SiteStructure) {
    if !site.lists.is_empty() {
        let titles: Vec<&str> = site.lists.iter().map(|l| l.title.as_str()).collect();
        log::sub_item(&format!("Lists/Libraries: {}", titles.join(", ")));
    }
    if !site.site_fields.is_empty() {
        let names: Vec<&str> = site.site_fields.iter().map(|f| f.display_name()).collect();
        log::sub_item(&format!("Site Columns: {}", names.join(", ")));
    }
    if !site.navigation.is_empty() {
        let titles: Vec<&str> = site.navigation.iter().map(|n| n.title.as_str()).collect();
        log::sub_item(&format!("Navigation: {}", titles.join(", ")));
    }
}

fn report_outcome(outcome: &ValidationOutcome, max_errors: usize) {
    if outcome.skipped {
        for diagnostic in &outcome.diagnostics {
            log::warn(&format!("Validation skipped: {}", diagnostic));
        }
        return;
    }
    if outcome.is_valid {
        log::success("XML is valid according to PnP Provisioning Schema 2022-09");
        return;
    }

    log::error(&format!(
        "XML validation failed with {} error(s):",
        outcome.diagnostics.len()
    ));
    for (i, diagnostic) in outcome.diagnostics.iter().take(max_errors).enumerate() {
        log::sub_item(&format!("{}. {}", i + 1, diagnostic));
    }
    if outcome.diagnostics.len() > max_errors {
        log::sub_item(&format!(
            "... and {} more errors",
            outcome.diagnostics.len() - max_errors
        ));
    }
    log::warn("Template will still be saved, but may not deploy properly to SharePoint.");
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
