//! 3MF (3D Manufacturing Format) encoding.
//!
//! A 3MF file is a ZIP archive (OPC package) containing:
//! - `[Content_Types].xml` - MIME type mappings
//! - `_rels/.rels` - relationship pointing at the model part
//! - `3D/3dmodel.model` - the model XML
//!
//! The model holds one `<basematerials>` group with a material per category
//! present, one `<object>` per exported record and one build `<item>` per
//! object, in emission order. Coordinates are written in millimeters, Z up.

use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::buffer::ExportBuffer;
use super::to_print_space;
use crate::config::Color;
use crate::domain::Category;
use crate::error::ExportError;

/// 3MF core namespace URI
const NAMESPACE_3MF: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

/// Resource id of the material group; objects are numbered after it
const MATERIALS_ID: usize = 1;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/3dmodel.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"#;

/// Display color of a category's material
pub fn material_color(category: Category) -> Color {
    match category {
        Category::Terrain => Color::rgb(0xC8, 0xB8, 0x9A),
        Category::Building => Color::rgb(0xD9, 0xD0, 0xC9),
        Category::Road => Color::rgb(0x9A, 0x9A, 0x9A),
        Category::Bridge => Color::rgb(0x8C, 0x8C, 0x8C),
        Category::Water => Color::rgb(0x7F, 0xB8, 0xE6),
        Category::Vegetation => Color::rgb(0x8F, 0xC9, 0x7A),
        Category::Unclassified => Color::rgb(0xFF, 0x00, 0xFF),
    }
}

/// Package a buffer as a complete 3MF archive
pub fn write_package(
    buffer: &ExportBuffer,
    millimeters_per_unit: f32,
    name: &str,
) -> Result<Vec<u8>, ExportError> {
    let model = model_xml(buffer, millimeters_per_unit, name)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (path, contents) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", RELS_XML.as_bytes()),
        ("3D/3dmodel.model", model.as_bytes()),
    ] {
        zip.start_file(path, options)
            .map_err(|e| ExportError::Archive(format!("failed to create {path}: {e}")))?;
        zip.write_all(contents)?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| ExportError::Archive(format!("failed to finalize archive: {e}")))?;
    Ok(cursor.into_inner())
}

/// Generate the `3D/3dmodel.model` document
pub fn model_xml(
    buffer: &ExportBuffer,
    millimeters_per_unit: f32,
    name: &str,
) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let mut model = BytesStart::new("model");
    model.push_attribute(("xmlns", NAMESPACE_3MF));
    model.push_attribute(("unit", "millimeter"));
    model.push_attribute(("xml:lang", "en-US"));
    writer.write_event(Event::Start(model)).map_err(xml_error)?;

    let mut title = BytesStart::new("metadata");
    title.push_attribute(("name", "Title"));
    writer.write_event(Event::Start(title)).map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(name)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("metadata")))
        .map_err(xml_error)?;

    writer
        .write_event(Event::Start(BytesStart::new("resources")))
        .map_err(xml_error)?;

    // a material group needs at least one base
    let categories = buffer.categories();
    if !categories.is_empty() {
        let mut materials = BytesStart::new("basematerials");
        materials.push_attribute(("id", MATERIALS_ID.to_string().as_str()));
        writer.write_event(Event::Start(materials)).map_err(xml_error)?;
        for category in &categories {
            let mut base = BytesStart::new("base");
            base.push_attribute(("name", category.name()));
            base.push_attribute(("displaycolor", material_color(*category).to_hex().as_str()));
            writer.write_event(Event::Empty(base)).map_err(xml_error)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("basematerials")))
            .map_err(xml_error)?;
    }

    for (i, object) in buffer.objects.iter().enumerate() {
        let pindex = categories
            .iter()
            .position(|c| *c == object.category)
            .unwrap_or(0);

        let mut element = BytesStart::new("object");
        element.push_attribute(("id", object_id(i).to_string().as_str()));
        element.push_attribute(("type", "model"));
        element.push_attribute((
            "name",
            format!("{} {}", object.category.name(), object.record_id).as_str(),
        ));
        element.push_attribute(("pid", MATERIALS_ID.to_string().as_str()));
        element.push_attribute(("pindex", pindex.to_string().as_str()));
        writer.write_event(Event::Start(element)).map_err(xml_error)?;
        writer
            .write_event(Event::Start(BytesStart::new("mesh")))
            .map_err(xml_error)?;

        writer
            .write_event(Event::Start(BytesStart::new("vertices")))
            .map_err(xml_error)?;
        for v in &object.vertices {
            let [x, y, z] = to_print_space(*v, millimeters_per_unit);
            let mut vertex = BytesStart::new("vertex");
            vertex.push_attribute(("x", format!("{x:.6}").as_str()));
            vertex.push_attribute(("y", format!("{y:.6}").as_str()));
            vertex.push_attribute(("z", format!("{z:.6}").as_str()));
            writer.write_event(Event::Empty(vertex)).map_err(xml_error)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("vertices")))
            .map_err(xml_error)?;

        writer
            .write_event(Event::Start(BytesStart::new("triangles")))
            .map_err(xml_error)?;
        for &[v1, v2, v3] in &object.triangles {
            let mut triangle = BytesStart::new("triangle");
            triangle.push_attribute(("v1", v1.to_string().as_str()));
            triangle.push_attribute(("v2", v2.to_string().as_str()));
            triangle.push_attribute(("v3", v3.to_string().as_str()));
            writer.write_event(Event::Empty(triangle)).map_err(xml_error)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("triangles")))
            .map_err(xml_error)?;

        writer
            .write_event(Event::End(BytesEnd::new("mesh")))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("object")))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("resources")))
        .map_err(xml_error)?;

    writer
        .write_event(Event::Start(BytesStart::new("build")))
        .map_err(xml_error)?;
    for i in 0..buffer.objects.len() {
        let mut item = BytesStart::new("item");
        item.push_attribute(("objectid", object_id(i).to_string().as_str()));
        writer.write_event(Event::Empty(item)).map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("build")))
        .map_err(xml_error)?;

    writer
        .write_event(Event::End(BytesEnd::new("model")))
        .map_err(xml_error)?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| ExportError::Xml(format!("invalid UTF-8 in generated XML: {e}")))
}

fn xml_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(e.to_string())
}

fn object_id(index: usize) -> usize {
    MATERIALS_ID + 1 + index
}
