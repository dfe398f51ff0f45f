// src/services/serializer.rs

//! PnP provisioning XML serializer.
//!
//! Renders a normalized [`SiteStructure`] into the 2022-09 provisioning
//! schema dialect. The document is assembled as an element tree first and
//! then written through an indenting writer; the output is always
//! pretty-printed with two spaces, free of blank lines, and starts with a
//! canonical XML declaration.
//!
//! Content types are not rendered: fields are attached directly to lists.

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::{AppError, Result};
use crate::models::{Field, FieldType, ListDef, ListTemplateType, NavItem, SiteStructure};

/// Provisioning schema namespace.
pub const PNP_NAMESPACE: &str = "http://schemas.dev.office.com/PnP/2022/09/ProvisioningSchema";

/// Declaration placed at the top of every document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// URL substituted for navigation placeholders and URLs containing spaces.
pub const SAFE_DEFAULT_URL: &str = "https://example.com";

/// Placeholder the generator sometimes emits instead of a real link.
const EXTERNAL_URL_PLACEHOLDER: &str = "external URL";

const DEFAULT_TEXT_MAX_LENGTH: u32 = 50;

/// Attribute value, either plain text or already escaped markup.
#[derive(Debug, Clone)]
enum AttrValue {
    Text(String),
    Escaped(String),
}

/// Minimal element tree written by [`Element::write`].
#[derive(Debug, Clone)]
struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, AttrValue)>,
    children: Vec<Element>,
    text: Option<String>,
}

impl Element {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    fn attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((key, AttrValue::Text(value.into())));
        self
    }

    fn escaped_attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((key, AttrValue::Escaped(value.into())));
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name);
        for (key, value) in &self.attributes {
            match value {
                AttrValue::Text(text) => start.push_attribute((*key, text.as_str())),
                AttrValue::Escaped(raw) => {
                    start.push_attribute(Attribute::from((key.as_bytes(), raw.as_bytes())))
                }
            }
        }

        if self.children.is_empty() && self.text.is_none() {
            writer
                .write_event(Event::Empty(start))
                .map_err(AppError::serialization)?;
            return Ok(());
        }

        writer
            .write_event(Event::Start(start))
            .map_err(AppError::serialization)?;
        if let Some(text) = &self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(AppError::serialization)?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name)))
            .map_err(AppError::serialization)?;
        Ok(())
    }
}

/// Replace placeholder or whitespace-bearing URLs and escape the result.
///
/// The returned value is already escaped markup.
pub fn sanitize_nav_url(url: &str) -> String {
    let url = if url == EXTERNAL_URL_PLACEHOLDER || url.chars().any(char::is_whitespace) {
        SAFE_DEFAULT_URL
    } else {
        url
    };
    escape(url).into_owned()
}

/// Render a normalized site record as a provisioning document.
pub fn render_template(site: &SiteStructure) -> Result<String> {
    let root = build_document(site);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    root.write(&mut writer)?;
    let body = String::from_utf8(writer.into_inner()).map_err(AppError::serialization)?;

    Ok(finish_document(&body))
}

/// Strip blank lines and any existing declaration, then prepend ours.
fn finish_document(body: &str) -> String {
    let lines: Vec<&str> = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip_while(|line| line.trim_start().starts_with("<?xml"))
        .collect();
    format!("{XML_DECLARATION}\n{}", lines.join("\n"))
}

fn build_document(site: &SiteStructure) -> Element {
    let title = site.title_or_default();

    let mut template = Element::new("pnp:ProvisioningTemplate")
        .attr("ID", "SITE-TEMPLATE")
        .attr("Version", "1")
        .attr("BaseSiteTemplate", site.site_type.base_template())
        .attr("Scope", "RootSite")
        .attr("DisplayName", title)
        .attr(
            "Description",
            site.description
                .as_deref()
                .unwrap_or("SharePoint provisioning template"),
        );

    template.push(web_settings(site));

    if !site.features.is_empty() {
        let site_features = site.features.iter().fold(
            Element::new("pnp:SiteFeatures"),
            |parent, feature| parent.child(Element::new("pnp:Feature").attr("ID", feature.id())),
        );
        template.push(Element::new("pnp:Features").child(site_features));
    }

    if !site.lists.is_empty() {
        let lists = site
            .lists
            .iter()
            .fold(Element::new("pnp:Lists"), |parent, list| {
                parent.child(list_instance(site, list))
            });
        template.push(lists);
    }

    if !site.navigation.is_empty() {
        template.push(navigation(&site.navigation));
    }

    Element::new("pnp:Provisioning")
        .attr("xmlns:pnp", PNP_NAMESPACE)
        .attr("Author", "PnP Template Generator")
        .attr("Generator", "SharePoint PnP CLI Tool")
        .attr("Version", "1.0")
        .attr(
            "Description",
            site.description
                .as_deref()
                .unwrap_or("SharePoint provisioning template"),
        )
        .attr("DisplayName", title)
        .child(
            Element::new("pnp:Templates")
                .attr("ID", "MAIN-TEMPLATES")
                .child(template),
        )
}

fn web_settings(site: &SiteStructure) -> Element {
    Element::new("pnp:WebSettings")
        .attr("RequestAccessEmail", "")
        .attr("NoCrawl", "false")
        .attr("WelcomePage", "SitePages/Home.aspx")
        .attr(
            "Title",
            site.site_title.as_deref().unwrap_or("SharePoint Site"),
        )
        .attr("Description", site.description.as_deref().unwrap_or(""))
        .attr("AlternateCSS", "")
        .attr("CommentsOnSitePagesDisabled", "false")
        .attr("QuickLaunchEnabled", "true")
        .attr("MembersCanShare", "true")
        .attr("ExcludeFromOfflineClient", "false")
        .attr("DisableFlows", "false")
        .attr("DisableAppViews", "false")
}

fn list_instance(site: &SiteStructure, list: &ListDef) -> Element {
    let mut element = Element::new("pnp:ListInstance")
        .attr("Title", list.title.as_str())
        .attr("Description", list.resolved_description())
        .attr("TemplateType", list.template_type.code().to_string())
        .attr("Url", list.resolved_url());

    element = match list.template_type {
        ListTemplateType::DocumentLibrary => element
            .attr("EnableVersioning", bool_attr(list.versioning_enabled()))
            .attr("EnableMinorVersions", "true")
            .attr("EnableModeration", "false")
            .attr("MinorVersionLimit", "10")
            .attr("MaxVersionLimit", "50")
            .attr("DraftVersionVisibility", "1")
            .attr("EnableAttachments", "false")
            .attr("EnableFolderCreation", "true"),
        ListTemplateType::Events => element
            .attr("EnableAttachments", "false")
            .attr("EnableFolderCreation", "false"),
        ListTemplateType::CustomList | ListTemplateType::Contacts => element
            .attr("EnableAttachments", "true")
            .attr("EnableFolderCreation", "false"),
        ListTemplateType::PictureLibrary => element
            .attr("EnableFolderCreation", "true")
            .attr("EnableAttachments", "false"),
        _ => element,
    };

    element = element
        .attr("ContentTypesEnabled", "false")
        .attr("OnQuickLaunch", "true")
        .attr("Hidden", "false")
        .attr("NoCrawl", "false")
        .attr("RemoveExistingContentTypes", "false");

    let fields = resolve_list_fields(site, list);
    if !fields.is_empty() {
        let container = fields
            .into_iter()
            .fold(Element::new("pnp:Fields"), |parent, field| {
                parent.child(field_element(field))
            });
        element.push(container);
    }

    element
}

/// Site fields attached to a list. A list that never declared field
/// references gets every site field.
fn resolve_list_fields<'a>(site: &'a SiteStructure, list: &ListDef) -> Vec<&'a Field> {
    if list.takes_all_site_fields() {
        return site.site_fields.iter().collect();
    }
    list.fields
        .iter()
        .filter_map(|entry| {
            let found = site.site_field(entry.name());
            if found.is_none() {
                log::warn!(
                    "Field '{}' on list '{}' is not a site field; skipping",
                    entry.name(),
                    list.title
                );
            }
            found
        })
        .collect()
}

fn field_element(field: &Field) -> Element {
    let mut element = Element::new("Field")
        .attr("Type", field.type_name())
        .attr("DisplayName", field.display_name())
        .attr("Required", if field.is_required() { "TRUE" } else { "FALSE" })
        .attr("EnforceUniqueValues", "FALSE")
        .attr("Indexed", "FALSE");

    if let Some(id) = field.braced_id() {
        element = element.attr("ID", id);
    }
    element = element
        .attr("StaticName", field.name.as_str())
        .attr("Name", field.name.as_str());

    match field.field_type {
        Some(FieldType::Text) => {
            let max_length = field.max_length.unwrap_or(DEFAULT_TEXT_MAX_LENGTH);
            element = element.attr("MaxLength", max_length.to_string());
            if let Some(default) = field.default.as_deref().filter(|d| !d.is_empty()) {
                element = element.child(Element::new("Default").text(default));
            }
        }
        Some(FieldType::Choice) if !field.choices.is_empty() => {
            element = element
                .attr("Format", "Dropdown")
                .attr("FillInChoice", "FALSE");
            if let Some(default) = field.default_value() {
                element = element.child(Element::new("Default").text(default));
            }
            let choices = field
                .choices
                .iter()
                .fold(Element::new("CHOICES"), |parent, choice| {
                    parent.child(Element::new("CHOICE").text(choice.as_str()))
                });
            element = element.child(choices);
        }
        _ => {}
    }

    element
}

fn navigation(items: &[NavItem]) -> Element {
    let current = items.iter().fold(
        Element::new("pnp:StructuralNavigation").attr("RemoveExistingNodes", "true"),
        |parent, item| {
            parent.child(
                Element::new("pnp:NavigationNode")
                    .attr("Title", item.title.as_str())
                    .escaped_attr("Url", sanitize_nav_url(&item.url)),
            )
        },
    );

    Element::new("pnp:Navigation")
        .attr("AddNewPagesToNavigation", "true")
        .attr("CreateFriendlyUrlsForNewPages", "true")
        .child(
            Element::new("pnp:GlobalNavigation")
                .attr("NavigationType", "Structural")
                .child(
                    Element::new("pnp:StructuralNavigation").attr("RemoveExistingNodes", "true"),
                ),
        )
        .child(
            Element::new("pnp:CurrentNavigation")
                .attr("NavigationType", "StructuralLocal")
                .child(current),
        )
}

fn bool_attr(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
