// svg_writer.rs
use crate::error::ConvertError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const EV_NS: &str = "http://www.w3.org/2001/xml-events";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Builds a tiny-profile SVG of `width`x`height` holding one `<image>` that
/// points at `href`. The raster is referenced, not inlined.
pub fn image_wrapper_document(href: &str, width: u32, height: u32) -> Result<Vec<u8>, ConvertError> {
    let width = width.to_string();
    let height = height.to_string();

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let svg = BytesStart::new("svg").with_attributes([
        ("baseProfile", "tiny"),
        ("height", height.as_str()),
        ("version", "1.2"),
        ("width", width.as_str()),
        ("xmlns", SVG_NS),
        ("xmlns:ev", EV_NS),
        ("xmlns:xlink", XLINK_NS),
    ]);
    writer.write_event(Event::Start(svg))?;
    writer.write_event(Event::Empty(BytesStart::new("defs")))?;

    let image = BytesStart::new("image").with_attributes([
        ("height", height.as_str()),
        ("width", width.as_str()),
        ("x", "0"),
        ("y", "0"),
        ("xlink:href", href),
    ]);
    writer.write_event(Event::Empty(image))?;
    writer.write_event(Event::End(BytesEnd::new("svg")))?;

    let mut document = writer.into_inner().into_inner();
    document.push(b'\n');
    Ok(document)
}
