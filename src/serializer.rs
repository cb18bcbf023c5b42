//! Serialization module for turning a WADL model into output text.
//!
//! [`serialize_wadl`] renders the XML document and runs [`clean_up_xml`] over
//! it. [`serialize_json`] and [`serialize_yaml`] dump the raw model, which is
//! handy when debugging a document that converts into something unexpected.

use crate::resources::ResourceNode;
use crate::wadl::{Application, MethodDefinition, ParameterDescriptor};
use anyhow::{anyhow, Context, Result};
use chrono::Datelike;
use log::debug;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::path::Path;

const WADL_NS: &str = "http://wadl.dev.java.net/2009/02";
const XSDXT_NS: &str = "http://docs.rackspacecloud.com/xsd-ext/v1.0";
const XSD_NS: &str = "http://docs.rackspacecloud.com/xsd/v1.0";
const DOCBOOK_NS: &str = "http://docbook.org/ns/docbook";

/// Start of the banner's first line, expected right after the declaration
const BANNER_PREFIX: &str = "<!-- (C) 2012-";

/// Renders the model as indented WADL, then cleans it up.
pub fn serialize_wadl(app: &Application) -> Result<String> {
    debug!("Serializing {} methods to WADL", app.methods.len());
    let xml = render_xml(app)?;
    Ok(clean_up_xml(&xml))
}

/// Dumps the model as pretty-printed JSON.
pub fn serialize_json(app: &Application) -> Result<String> {
    debug!("Serializing WADL model to JSON");
    serde_json::to_string_pretty(app).context("Failed to serialize WADL model to JSON")
}

/// Dumps the model as YAML.
pub fn serialize_yaml(app: &Application) -> Result<String> {
    debug!("Serializing WADL model to YAML");
    serde_yaml::to_string(app).context("Failed to serialize WADL model to YAML")
}

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 4),
        }
    }

    fn emit(&mut self, event: Event) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| anyhow!("Failed to write XML: {}", e))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for &attr in attrs {
            start.push_attribute(attr);
        }
        self.emit(Event::Start(start))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for &attr in attrs {
            start.push_attribute(attr);
        }
        self.emit(Event::Empty(start))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, content: &str) -> Result<()> {
        self.emit(Event::Text(BytesText::from_escaped(partial_escape(content))))
    }

    fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], content: &str) -> Result<()> {
        self.start(name, attrs)?;
        self.text(content)?;
        self.end(name)
    }

    fn finish(self) -> Result<String> {
        let mut xml = String::from_utf8(self.writer.into_inner()).context("Rendered XML is not UTF-8")?;
        xml.push('\n');
        Ok(xml)
    }
}

/// Renders the model as an indented XML document with a bare declaration.
pub fn render_xml(app: &Application) -> Result<String> {
    let mut out = XmlOut::new();
    out.emit(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    out.start(
        "application",
        &[
            ("xmlns", WADL_NS),
            ("xmlns:xsdxt", XSDXT_NS),
            ("xmlns:wadl", WADL_NS),
            ("xmlns:xsd", XSD_NS),
        ],
    )?;

    if app.resources.is_empty() {
        out.empty("resources", &[("base", app.base.as_str())])?;
    } else {
        out.start("resources", &[("base", app.base.as_str())])?;
        for node in &app.resources.roots {
            render_resource(&mut out, node)?;
        }
        out.end("resources")?;
    }

    for method in &app.methods {
        render_method(&mut out, method)?;
    }

    out.end("application")?;
    out.finish()
}

fn render_resource(out: &mut XmlOut, node: &ResourceNode) -> Result<()> {
    let id = node.id();
    let attrs = [("id", id.as_str()), ("path", node.segment.as_str())];
    if node.methods.is_empty() && node.children.is_empty() {
        return out.empty("resource", &attrs);
    }

    out.start("resource", &attrs)?;
    for method_id in &node.methods {
        let href = format!("#{}", method_id);
        out.empty("method", &[("href", href.as_str())])?;
    }
    for child in &node.children {
        render_resource(out, child)?;
    }
    out.end("resource")
}

fn render_method(out: &mut XmlOut, method: &MethodDefinition) -> Result<()> {
    out.start("method", &[("id", method.id.as_str()), ("name", method.name.as_str())])?;

    let doc_attrs = [
        ("xmlns", DOCBOOK_NS),
        ("xml:lang", "EN"),
        ("title", method.title.as_str()),
    ];
    match method.short_description {
        Some(ref summary) => {
            out.start("wadl:doc", &doc_attrs)?;
            out.text_element("para", &[("role", "shortdesc")], summary)?;
            out.end("wadl:doc")?;
        }
        None => out.empty("wadl:doc", &doc_attrs)?,
    }

    if method.params.is_empty() && method.request_example.is_none() {
        out.empty("request", &[])?;
    } else {
        out.start("request", &[])?;
        for param in &method.params {
            render_param(out, param)?;
        }
        if let Some(ref body) = method.request_example {
            render_representation(out, body)?;
        }
        out.end("request")?;
    }

    match method.response_example {
        Some(ref body) => {
            out.start("response", &[("status", "200")])?;
            render_representation(out, body)?;
            out.end("response")?;
        }
        None => out.empty("response", &[("status", "200")])?,
    }

    out.end("method")
}

fn render_param(out: &mut XmlOut, param: &ParameterDescriptor) -> Result<()> {
    let required = if param.required { "true" } else { "false" };
    out.start(
        "param",
        &[
            ("name", param.name.as_str()),
            ("type", param.param_type.xsd_name()),
            ("required", required),
            ("style", param.style.as_str()),
        ],
    )?;
    out.start("wadl:doc", &[("xml:lang", "EN"), ("xmlns", DOCBOOK_NS)])?;
    out.start("para", &[])?;
    out.text(&param.description)?;

    // "Valid values are <code>a</code>, <code>b</code>, or <code>c</code>."
    let values = param.param_type.valid_values();
    if !values.is_empty() {
        out.text(" Valid values are ")?;
        for (i, value) in values.iter().enumerate() {
            out.text_element("code", &[], value)?;
            let tail = if i + 1 == values.len() {
                "."
            } else if i + 2 == values.len() {
                ", or "
            } else {
                ", "
            };
            out.text(tail)?;
        }
    }

    out.end("para")?;
    out.end("wadl:doc")?;
    out.end("param")
}

fn render_representation(out: &mut XmlOut, body: &str) -> Result<()> {
    out.start("representation", &[("mediaType", "application/json")])?;
    out.start("wadl:doc", &[("xml:lang", "EN")])?;
    out.text_element("xsdxt:code", &[], body)?;
    out.end("wadl:doc")?;
    out.end("representation")
}

fn banner(year: i32) -> String {
    [
        format!("<!-- (C) 2012-{} OpenStack Foundation, All Rights Reserved -->", year),
        "<!--*******************************************************-->".to_string(),
        "<!--         Import Common XML Entities                    -->".to_string(),
        "<!--                                                       -->".to_string(),
        "<!--     You can resolve the entities with xmllint         -->".to_string(),
        "<!--                                                       -->".to_string(),
        "<!--        xmllint -noent os-compute-2.wadl               -->".to_string(),
        "<!--*******************************************************-->".to_string(),
    ]
    .join("\n")
}

/// Cleans up rendered XML using the current year in the banner.
///
/// See [`clean_up_xml_for_year`].
pub fn clean_up_xml(xml: &str) -> String {
    clean_up_xml_for_year(xml, chrono::Local::now().year())
}

/// Post-processes rendered XML:
///
/// 1. adds `encoding="UTF-8"` to the XML declaration when it has none;
/// 2. puts the copyright banner on the lines following the declaration;
/// 3. rewrites `" />"` as `"/>"`.
///
/// Running it on already-clean text changes nothing.
pub fn clean_up_xml_for_year(xml: &str, year: i32) -> String {
    let mut text = xml.to_string();

    if let Some((start, end)) = declaration_span(&text) {
        if !text[start..end].contains("encoding=") {
            text.insert_str(end - 2, " encoding=\"UTF-8\"");
        }
    }

    if let Some((_, end)) = declaration_span(&text) {
        let has_banner = text[end..]
            .trim_start_matches(['\r', '\n'])
            .starts_with(BANNER_PREFIX);
        if !has_banner {
            text.insert_str(end, &format!("\n{}", banner(year)));
        }
    }

    text.replace(" />", "/>")
}

/// Byte range of the first `<?xml ... ?>` declaration, `?>` included
fn declaration_span(text: &str) -> Option<(usize, usize)> {
    let start = text.find("<?xml")?;
    let close = text[start..].find("?>")?;
    Some((start, start + close + 2))
}

/// Writes string content to a file in one step.
///
/// Parent directories are created as needed. The content goes to a temporary
/// sibling first and is renamed over `path`, so readers never see a partial file.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    fs::write(tmp_path, content)
        .with_context(|| format!("Failed to write to file: {}", tmp_path.display()))?;
    fs::rename(tmp_path, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{PathRegistry, ResourceTree};
    use crate::wadl::{ParamType, DEFAULT_BASE_URL};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const BANNER_MARKER: &str = "Import Common XML Entities";

    fn create_test_application() -> Application {
        let mut registry = PathRegistry::new();
        registry.register("/v2/alarms/", "listAlarms");
        registry.register("/v2/alarms/{alarm_id}/", "showAlarm");

        let mut list = MethodDefinition::new("listAlarms".to_string(), "get", "List alarms".to_string());
        list.short_description = Some("Return all alarms.".to_string());
        list.params.push(ParameterDescriptor::new(
            "state".to_string(),
            ParamType::Enumeration(vec!["ok".to_string(), "alarm".to_string(), "unknown".to_string()]),
            "Alarm state.".to_string(),
        ));
        list.response_example = Some("[\n    {\n        \"name\": \"cpu & mem\"\n    }\n]".to_string());

        let show = MethodDefinition::new("showAlarm".to_string(), "get", "Show alarm".to_string());

        Application {
            base: DEFAULT_BASE_URL.to_string(),
            resources: ResourceTree::build(&registry),
            methods: vec![list, show],
        }
    }

    #[test]
    fn test_clean_up_xml_encoding() {
        let cleaned = clean_up_xml_for_year("<?xml version=\"1.0\"?>", 2024);
        let mut lines = cleaned.lines();

        assert_eq!(lines.next(), Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert_eq!(
            lines.next(),
            Some("<!-- (C) 2012-2024 OpenStack Foundation, All Rights Reserved -->")
        );
        assert!(cleaned.contains(BANNER_MARKER));
    }

    #[test]
    fn test_clean_up_xml_self_closing_tags() {
        let bad_xml = "\n<root>\n    <selfclosingtag />\n</root>";
        let good_xml = "\n<root>\n    <selfclosingtag/>\n</root>";

        assert_eq!(clean_up_xml(bad_xml), good_xml);
        assert_eq!(clean_up_xml(good_xml), good_xml);
    }

    #[test]
    fn test_clean_up_xml_is_idempotent() {
        let xml = "<?xml version=\"1.0\"?>\n<application>\n    <request />\n</application>\n";
        let once = clean_up_xml_for_year(xml, 2024);
        let twice = clean_up_xml_for_year(&once, 2024);

        assert_eq!(once, twice);
        assert_eq!(once.matches("encoding=").count(), 1);
        assert_eq!(once.matches(BANNER_MARKER).count(), 1);
        assert!(once.contains("<request/>"));
    }

    #[test]
    fn test_banner_added_when_body_mentions_its_text() {
        let mut app = create_test_application();
        app.methods[0].short_description = Some(format!("See {} for details.", BANNER_MARKER));

        let wadl = serialize_wadl(&app).unwrap();
        let mut lines = wadl.lines();

        assert_eq!(lines.next(), Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(lines.next().unwrap().starts_with(BANNER_PREFIX));
        assert_eq!(wadl.matches(BANNER_PREFIX).count(), 1);
        assert_eq!(clean_up_xml(&wadl), wadl);
    }

    #[test]
    fn test_clean_up_xml_keeps_existing_encoding() {
        let xml = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<a/>";
        let cleaned = clean_up_xml_for_year(xml, 2024);

        assert!(cleaned.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!--"));
        assert!(cleaned.ends_with("-->\n<a/>"));
    }

    #[test]
    fn test_render_xml_structure() {
        let app = create_test_application();
        let xml = render_xml(&app).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\"?>\n<application xmlns=\"http://wadl.dev.java.net/2009/02\""));
        assert!(xml.contains("<resources base=\"http://www.example.com\">"));
        assert!(xml.contains("<resource id=\"alarms\" path=\"alarms\">"));
        assert!(xml.contains("<resource id=\"alarm_id\" path=\"{alarm_id}\">"));
        assert!(xml.contains("<method href=\"#listAlarms\"/>"));
        assert!(xml.contains("<method id=\"listAlarms\" name=\"GET\">"));
        assert!(xml.contains("title=\"List alarms\""));
        assert!(xml.contains("<para role=\"shortdesc\">Return all alarms.</para>"));
        assert!(xml.contains("<param name=\"state\" type=\"xsd:dict\" required=\"false\" style=\"query\">"));
        assert!(xml.contains("<response status=\"200\">"));
        assert!(xml.ends_with("</application>\n"));
    }

    #[test]
    fn test_render_valid_values() {
        let app = create_test_application();
        let xml = render_xml(&app).unwrap();

        assert!(xml.contains(
            "<para>Alarm state. Valid values are <code>ok</code>, <code>alarm</code>, or <code>unknown</code>.</para>"
        ));
    }

    #[test]
    fn test_render_example_escapes_markup_only() {
        let app = create_test_application();
        let xml = render_xml(&app).unwrap();

        assert!(xml.contains("<representation mediaType=\"application/json\">"));
        assert!(xml.contains("\"name\": \"cpu &amp; mem\""));
    }

    #[test]
    fn test_render_method_without_content() {
        let app = create_test_application();
        let xml = render_xml(&app).unwrap();

        assert!(xml.contains("<method id=\"showAlarm\" name=\"GET\">"));
        assert!(xml.contains("title=\"Show alarm\"/>"));
        assert!(xml.contains("<request/>"));
        assert!(xml.contains("<response status=\"200\"/>"));
    }

    #[test]
    fn test_serialize_wadl_applies_cleanup() {
        let app = create_test_application();
        let wadl = serialize_wadl(&app).unwrap();

        assert!(wadl.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- (C) 2012-"));
        assert!(!wadl.contains(" />"));
    }

    #[test]
    fn test_serialize_json_and_yaml() {
        let app = create_test_application();

        let json = serialize_json(&app).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["methods"][0]["id"], "listAlarms");
        assert_eq!(parsed["methods"][0]["params"][0]["param_type"]["kind"], "enumeration");

        let yaml = serialize_yaml(&app).unwrap();
        let back: Application = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, app);
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("v2.wadl");

        write_to_file("content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "content");
        assert!(!temp_dir.path().join("subdir").join("nested").join("v2.wadl.tmp").exists());
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("v2.wadl");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }
}
