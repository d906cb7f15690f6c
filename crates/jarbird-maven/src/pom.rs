//! POM rendering for resolved descriptors.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use jarbird_core::descriptor::{Coordinates, Descriptor, Person};
use jarbird_util::errors::{JarbirdError, JarbirdResult};

const POM_NS: &str = "http://maven.apache.org/POM/4.0.0";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const POM_SCHEMA: &str =
    "http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd";

struct PomWriter {
    writer: Writer<Vec<u8>>,
}

impl PomWriter {
    fn new() -> JarbirdResult<Self> {
        let mut pom = Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        };
        pom.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        pom.event(Event::Start(BytesStart::new("project").with_attributes([
            ("xmlns", POM_NS),
            ("xmlns:xsi", XSI_NS),
            ("xsi:schemaLocation", POM_SCHEMA),
        ])))?;
        pom.text("modelVersion", "4.0.0")?;
        Ok(pom)
    }

    fn event(&mut self, event: Event<'_>) -> JarbirdResult<()> {
        self.writer.write_event(event).map_err(xml_error)
    }

    fn open(&mut self, tag: &str) -> JarbirdResult<()> {
        self.event(Event::Start(BytesStart::new(tag)))
    }

    fn close(&mut self, tag: &str) -> JarbirdResult<()> {
        self.event(Event::End(BytesEnd::new(tag)))
    }

    /// `<tag>value</tag>`, skipped when `value` is empty.
    fn text(&mut self, tag: &str, value: &str) -> JarbirdResult<()> {
        if value.is_empty() {
            return Ok(());
        }
        self.open(tag)?;
        self.event(Event::Text(BytesText::new(value)))?;
        self.close(tag)
    }

    fn coordinates(&mut self, coords: &Coordinates) -> JarbirdResult<()> {
        self.text("groupId", &coords.group)?;
        self.text("artifactId", &coords.artifact_id)?;
        self.text("version", &coords.version)
    }

    fn people(&mut self, list_tag: &str, item_tag: &str, people: &[Person]) -> JarbirdResult<()> {
        if people.is_empty() {
            return Ok(());
        }
        self.open(list_tag)?;
        for person in people {
            self.open(item_tag)?;
            self.text("id", &person.id)?;
            self.text("name", &person.name)?;
            self.text("email", &person.email)?;
            self.text("url", &person.url)?;
            self.text("organization", &person.organization)?;
            self.text("organizationUrl", &person.organization_url)?;
            self.text("timezone", &person.timezone)?;
            self.close(item_tag)?;
        }
        self.close(list_tag)
    }

    fn finish(mut self) -> JarbirdResult<String> {
        self.close("project")?;
        String::from_utf8(self.writer.into_inner()).map_err(xml_error)
    }
}

fn xml_error(e: impl std::fmt::Display) -> JarbirdError {
    JarbirdError::Generic {
        message: format!("Failed to write POM: {e}"),
    }
}

/// Render the POM of a publication published as `coords`.
pub fn render_pom(descriptor: &Descriptor, coords: &Coordinates) -> JarbirdResult<String> {
    let mut pom = PomWriter::new()?;
    pom.coordinates(coords)?;
    pom.text("packaging", &descriptor.packaging)?;
    pom.text("name", &descriptor.name)?;
    pom.text("description", &descriptor.description)?;
    pom.text("url", &descriptor.url)?;
    if let Some(year) = descriptor.inception_year {
        pom.text("inceptionYear", &year.to_string())?;
    }

    if let Some(org) = &descriptor.organization {
        pom.open("organization")?;
        pom.text("name", &org.name)?;
        pom.text("url", &org.url)?;
        pom.close("organization")?;
    }

    if !descriptor.licenses.is_empty() {
        pom.open("licenses")?;
        for license in &descriptor.licenses {
            pom.open("license")?;
            pom.text("name", &license.name)?;
            pom.text("url", &license.url)?;
            pom.text("distribution", &license.dist)?;
            pom.text("comments", &license.comments)?;
            pom.close("license")?;
        }
        pom.close("licenses")?;
    }

    pom.people("developers", "developer", &descriptor.developers)?;
    pom.people("contributors", "contributor", &descriptor.contributors)?;

    if let Some(scm) = &descriptor.scm {
        if !scm.url.is_empty() || !scm.connection.is_empty() {
            pom.open("scm")?;
            pom.text("url", &scm.url)?;
            pom.text("connection", &scm.connection)?;
            pom.text("developerConnection", &scm.developer_connection)?;
            pom.close("scm")?;
        }
        if !scm.issue_url.is_empty() {
            pom.open("issueManagement")?;
            pom.text("system", &scm.issue_type)?;
            pom.text("url", &scm.issue_url)?;
            pom.close("issueManagement")?;
        }
    }

    pom.finish()
}

/// Render the plugin marker POM: a `pom` artifact under the plugin id whose
/// only content is a dependency on the implementation artifact.
///
/// Returns `None` when the descriptor does not describe a plugin.
pub fn render_marker_pom(
    descriptor: &Descriptor,
    main: &Coordinates,
) -> JarbirdResult<Option<String>> {
    let Some(plugin) = descriptor.plugin.as_ref().filter(|p| !p.id.is_empty()) else {
        return Ok(None);
    };
    let marker = plugin.marker_coordinates(main);

    let mut pom = PomWriter::new()?;
    pom.coordinates(&marker)?;
    pom.text("packaging", "pom")?;
    pom.text("name", &plugin.display_name)?;
    pom.text("description", &descriptor.description)?;
    pom.open("dependencies")?;
    pom.open("dependency")?;
    pom.coordinates(main)?;
    pom.close("dependency")?;
    pom.close("dependencies")?;
    pom.finish().map(Some)
}
