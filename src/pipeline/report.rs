// src/pipeline/report.rs

//! Plain-text run report.

use serde_json::Value;

use crate::services::ValidationOutcome;

const WIDE_RULE: usize = 60;
const NARROW_RULE: usize = 25;

/// Everything a report describes.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub timestamp: &'a str,
    pub schema_name: &'a str,
    /// File name of the saved template
    pub xml_filename: &'a str,
    pub outcome: &'a ValidationOutcome,
    /// Generator output as received
    pub raw_output: &'a str,
}

/// Pretty-print JSON text with two-space indentation, or return it unchanged
/// when it does not parse.
pub fn pretty_json_or_raw(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| text.to_string())
}

/// Render the report text.
pub fn build_report(input: &ReportInput<'_>) -> String {
    let wide = "=".repeat(WIDE_RULE);
    let mut out = String::new();

    out.push_str("SharePoint PnP Provisioning Template - Comprehensive Report\n");
    out.push_str(&format!("{wide}\n\n"));
    out.push_str(&format!("Timestamp: {}\n", input.timestamp));
    out.push_str(&format!("XSD Schema: {}\n", input.schema_name));
    out.push_str(&format!("Generated XML: {}\n\n", input.xml_filename));

    out.push_str("XSD VALIDATION RESULTS\n");
    out.push_str(&format!("{}\n", "-".repeat(NARROW_RULE)));
    let outcome = input.outcome;
    if outcome.skipped {
        out.push_str("⚠️  VALIDATION STATUS: SKIPPED\n");
        for diagnostic in &outcome.diagnostics {
            out.push_str(&format!("  {diagnostic}\n"));
        }
    } else if outcome.is_valid {
        out.push_str("✅ VALIDATION STATUS: PASSED\n");
        out.push_str("The XML template is valid according to the PnP Provisioning Schema.\n");
        out.push_str("✓ Ready for SharePoint deployment\n");
    } else {
        out.push_str("❌ VALIDATION STATUS: FAILED\n");
        out.push_str(&format!(
            "Found {} validation error(s):\n\n",
            outcome.diagnostics.len()
        ));
        for (i, diagnostic) in outcome.diagnostics.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, diagnostic));
        }
        out.push_str("\n⚠️  Template may not deploy properly to SharePoint.\n");
    }

    out.push_str(&format!("\n{wide}\n"));
    out.push_str("LLM GENERATED JSON STRUCTURE\n");
    out.push_str(&format!("{wide}\n"));
    out.push_str(&pretty_json_or_raw(input.raw_output));

    out.push_str(&format!("\n\n{wide}\n"));
    out.push_str("REPORT END\n");
    out.push_str(&format!("{wide}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(outcome: &'a ValidationOutcome, raw: &'a str) -> ReportInput<'a> {
        ReportInput {
            timestamp: "20260116_093000",
            schema_name: "ProvisioningSchema-2022-09.xsd",
            xml_filename: "pnp_template_20260116_093000.xml",
            outcome,
            raw_output: raw,
        }
    }

    #[test]
    fn test_passed_report() {
        let outcome = ValidationOutcome {
            is_valid: true,
            diagnostics: Vec::new(),
            skipped: false,
        };
        let report = build_report(&input(&outcome, r#"{"site_title":"HR"}"#));

        assert!(report.starts_with("SharePoint PnP Provisioning Template - Comprehensive Report\n"));
        assert!(report.contains("Timestamp: 20260116_093000\n"));
        assert!(report.contains("XSD Schema: ProvisioningSchema-2022-09.xsd\n"));
        assert!(report.contains("Generated XML: pnp_template_20260116_093000.xml\n"));
        assert!(report.contains("VALIDATION STATUS: PASSED"));
        assert!(report.contains("{\n  \"site_title\": \"HR\"\n}"));
        assert!(report.ends_with("REPORT END\n============================================================\n"));
    }

    #[test]
    fn test_failed_report_numbers_diagnostics() {
        let outcome = ValidationOutcome {
            is_valid: false,
            diagnostics: vec![
                "Line 3, Column 5: first".to_string(),
                "Line 9, Column 1: second".to_string(),
            ],
            skipped: false,
        };
        let report = build_report(&input(&outcome, "{}"));

        assert!(report.contains("VALIDATION STATUS: FAILED"));
        assert!(report.contains("Found 2 validation error(s):"));
        assert!(report.contains("  1. Line 3, Column 5: first\n"));
        assert!(report.contains("  2. Line 9, Column 1: second\n"));
    }

    #[test]
    fn test_skipped_report() {
        let outcome = ValidationOutcome {
            is_valid: false,
            diagnostics: vec!["XSD schema file not found: x.xsd".to_string()],
            skipped: true,
        };
        let report = build_report(&input(&outcome, "{}"));
        assert!(report.contains("VALIDATION STATUS: SKIPPED"));
        assert!(report.contains("XSD schema file not found: x.xsd"));
        assert!(!report.contains("FAILED"));
    }

    #[test]
    fn test_unparseable_output_kept_verbatim() {
        let outcome = ValidationOutcome::default();
        let report = build_report(&input(&outcome, "not { json"));
        assert!(report.contains("=\nnot { json\n\n="));
    }

    #[test]
    fn test_pretty_json_keeps_key_order() {
        let pretty = pretty_json_or_raw(
            r#"{"site_type":"TeamSite","site_title":"Ops","description":"Ops hub"}"#,
        );
        let type_at = pretty.find("\"site_type\"").unwrap();
        let title_at = pretty.find("\"site_title\"").unwrap();
        let description_at = pretty.find("\"description\"").unwrap();
        assert!(type_at < title_at && title_at < description_at);
    }

    #[test]
    fn test_pretty_json_or_raw() {
        assert_eq!(pretty_json_or_raw("[1,2]"), "[\n  1,\n  2\n]");
        assert_eq!(pretty_json_or_raw("oops"), "oops");
    }
}
