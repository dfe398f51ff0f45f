// src/services/prompt.rs

//! Prompt templates for structure generation.

/// System message sent with every request.
pub const SYSTEM_PROMPT: &str = "You are a SharePoint expert who returns only valid JSON \
structures for PnP Provisioning Templates. Follow the exact schema provided and extract \
precise information from the user's description.";

const SCHEMA_EXAMPLE: &str = r#"{
    "site_type": "TeamSite" or "CommunicationSite",
    "base_template": "GROUP#0" for a modern team site or "SITEPAGEPUBLISHING#0" for a communication site,
    "site_title": "Specific title taken from the description",
    "description": "Short statement of the site's purpose",
    "site_fields": [
        {
            "name": "FieldName",
            "displayName": "Display Name",
            "type": "Text|Choice|DateTime|User|Number|Boolean|Lookup",
            "group": "Custom Columns",
            "choices": ["Option1", "Option2"],
            "required": false
        }
    ],
    "content_types": [
        {
            "name": "Content Type Name",
            "description": "Content type description",
            "group": "Custom Content Types",
            "parent": "Document" or "Item",
            "fields": ["FieldName1", "FieldName2"]
        }
    ],
    "lists": [
        {
            "title": "Exact List/Library Title",
            "template_type": 100,
            "url": "Lists/ListName or LibraryName",
            "description": "Purpose of this list/library",
            "enable_versioning": true,
            "enable_content_types": true,
            "content_types": ["Content Type Name"],
            "on_quick_launch": true,
            "fields": []
        }
    ],
    "navigation": [
        {
            "title": "Navigation Item",
            "url": "{site}/path",
            "description": "Purpose of this navigation item"
        }
    ],
    "features": [
        {
            "id": "feature-guid",
            "name": "Feature Name",
            "scope": "Site" or "Web"
        }
    ]
}"#;

const RULES: &str = r#"Rules:
1. Model site fields first, group them into content types, then attach content types to lists.
2. Prefer reusable site fields shared by several content types.
3. Use names from quotes or "called" phrases exactly as written.
4. Pick a specific site title; avoid generic names such as "Team Site".
5. Document libraries always use template_type 101.
6. Template types: 100 custom list, 101 document library, 104 announcements, 105 contacts, 106 events, 107 tasks, 109 picture library.
7. "choices" is only present on Choice fields.
8. "enable_versioning" only matters for document libraries.
9. Leave list "fields" empty; fields reach lists through content types.
10. Content types for documents inherit from "Document" (0x0101), list items from "Item" (0x01).
11. URLs have no spaces.
12. Return ONLY the JSON object, without commentary.

Examples:
- "document library called 'Project Files'" -> title: "Project Files", url: "ProjectFiles"
- "HR policies site" -> site_title: "HR Policies Portal"
- "team site for marketing" -> site_title: "Marketing Team Site""#;

/// Build the user message for a site description.
pub fn user_prompt(description: &str) -> String {
    format!(
        "Based on the following description, generate a JSON structure for a SharePoint PnP \
provisioning template.\n\nDescription: \"{description}\"\n\nIdentify the site type and purpose, \
exact names, libraries, lists, site columns, content types and navigation.\n\n\
Return ONLY a valid JSON object with this structure:\n\n{SCHEMA_EXAMPLE}\n\n{RULES}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_description() {
        let prompt = user_prompt("Team site for marketing");
        assert!(prompt.contains("Description: \"Team site for marketing\""));
        assert!(prompt.contains("\"site_fields\""));
        assert!(prompt.contains("Return ONLY the JSON object"));
    }
}
