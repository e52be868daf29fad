//! Meta-info XML region (`Info`)
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <MetaInfo>
//!     <Attr id="MediaType" value="VstPreset" type="string" flags="writeProtected"/>
//!     <Parameters>
//!         <Param name="Gain" index="0" value="0.5"/>
//!     </Parameters>
//! </MetaInfo>
//! ```

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use super::params::Parameter;
use crate::error::{CodecError, Result};

const ROOT: &str = "MetaInfo";

/// One `<Attr>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaAttribute {
    pub id: String,
    pub value: String,
    pub kind: String,
    pub flags: String,
}

impl MetaAttribute {
    pub fn string(id: &str, value: &str) -> Self {
        Self {
            id: id.to_string(),
            value: value.to_string(),
            kind: "string".to_string(),
            flags: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetaInfo {
    pub attributes: Vec<MetaAttribute>,
    /// Parameter dump in declaration order
    pub parameters: Vec<Parameter>,
}

impl MetaInfo {
    /// The attributes every written preset carries
    pub fn preset() -> Self {
        let mut media = MetaAttribute::string("MediaType", "VstPreset");
        media.flags = "writeProtected".to_string();
        Self {
            attributes: vec![media],
            parameters: Vec::new(),
        }
    }

    pub fn attribute(&self, id: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.value.as_str())
    }

    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Start(BytesStart::new(ROOT)))
            .map_err(xml_error)?;

        for attr in &self.attributes {
            let mut element = BytesStart::new("Attr").with_attributes([
                ("id", attr.id.as_str()),
                ("value", attr.value.as_str()),
                ("type", attr.kind.as_str()),
            ]);
            if !attr.flags.is_empty() {
                element.push_attribute(("flags", attr.flags.as_str()));
            }
            writer
                .write_event(Event::Empty(element))
                .map_err(xml_error)?;
        }

        if !self.parameters.is_empty() {
            writer
                .write_event(Event::Start(BytesStart::new("Parameters")))
                .map_err(xml_error)?;
            for param in &self.parameters {
                let index = param.index.to_string();
                let value = param.value.to_string();
                let element = BytesStart::new("Param").with_attributes([
                    ("name", param.name.as_str()),
                    ("index", index.as_str()),
                    ("value", value.as_str()),
                ]);
                writer
                    .write_event(Event::Empty(element))
                    .map_err(xml_error)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("Parameters")))
                .map_err(xml_error)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(ROOT)))
            .map_err(xml_error)?;
        Ok(writer.into_inner())
    }

    pub fn from_xml(bytes: &[u8]) -> Result<Self> {
        let len = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        let text = std::str::from_utf8(&bytes[..len]).map_err(xml_error)?;
        let mut reader = Reader::from_str(text);

        let mut info = MetaInfo::default();
        let mut saw_root = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"MetaInfo" => saw_root = true,
                    b"Attr" => info.attributes.push(parse_attribute(&e)?),
                    b"Param" => info.parameters.push(parse_parameter(&e)?),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(xml_error(e)),
            }
        }

        if !saw_root {
            return Err(CodecError::Xml(format!("missing <{ROOT}> element")));
        }
        Ok(info)
    }
}

fn xml_error(error: impl std::fmt::Display) -> CodecError {
    CodecError::Xml(error.to_string())
}

/// Attribute values of `element` as `(key, unescaped value)` pairs
fn attributes(element: &BytesStart<'_>) -> Result<Vec<(Vec<u8>, String)>> {
    let mut out = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        out.push((attr.key.as_ref().to_vec(), value));
    }
    Ok(out)
}

fn parse_attribute(element: &BytesStart<'_>) -> Result<MetaAttribute> {
    let mut attr = MetaAttribute {
        id: String::new(),
        value: String::new(),
        kind: String::new(),
        flags: String::new(),
    };
    for (key, value) in attributes(element)? {
        match key.as_slice() {
            b"id" => attr.id = value,
            b"value" => attr.value = value,
            b"type" => attr.kind = value,
            b"flags" => attr.flags = value,
            _ => {}
        }
    }
    Ok(attr)
}

fn parse_parameter(element: &BytesStart<'_>) -> Result<Parameter> {
    let mut name = String::new();
    let mut index = None;
    let mut value = None;
    for (key, text) in attributes(element)? {
        match key.as_slice() {
            b"name" => name = text,
            b"index" => {
                index = Some(text.trim().parse::<u32>().map_err(|e| {
                    CodecError::Xml(format!("parameter index {text:?}: {e}"))
                })?)
            }
            b"value" => {
                value = Some(text.trim().parse::<f64>().map_err(|e| {
                    CodecError::Xml(format!("parameter value {text:?}: {e}"))
                })?)
            }
            _ => {}
        }
    }

    match (index, value) {
        (Some(index), Some(value)) => Ok(Parameter { name, index, value }),
        _ => Err(CodecError::Xml(format!(
            "parameter {name:?} lacks index or value"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_roundtrip_keeps_order() {
        let mut info = MetaInfo::preset();
        info.attributes
            .push(MetaAttribute::string("PlugInName", "Pro-Q <2> & more"));
        info.parameters = vec![
            Parameter {
                name: "Output Gain".to_string(),
                index: 40,
                value: -3.5,
            },
            Parameter {
                name: "Band 1 Frequency".to_string(),
                index: 2,
                value: 1000.0,
            },
            Parameter {
                name: "Bypass".to_string(),
                index: 0,
                value: 0.0,
            },
        ];

        let xml = info.to_xml().unwrap();
        let text = String::from_utf8(xml.clone()).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(text.contains("flags=\"writeProtected\""));

        let decoded = MetaInfo::from_xml(&xml).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.attribute("PlugInName"), Some("Pro-Q <2> & more"));
    }

    #[test]
    fn test_reads_host_written_attributes() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<MetaInfo>
	<Attr id="MediaType" value="VstPreset" type="string" flags="writeProtected"></Attr>
	<Attr id="PlugInCategory" value="Fx|EQ" type="string"/>
</MetaInfo>"#;
        let info = MetaInfo::from_xml(xml).unwrap();
        assert_eq!(info.attributes.len(), 2);
        assert_eq!(info.attribute("PlugInCategory"), Some("Fx|EQ"));
        assert_eq!(info.attributes[1].flags, "");
        assert!(info.parameters.is_empty());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            MetaInfo::from_xml(b"<Other/>"),
            Err(CodecError::Xml(_))
        ));
        assert!(matches!(
            MetaInfo::from_xml(b"<MetaInfo><Parameters><Param name=\"x\" index=\"a\" value=\"1\"/></Parameters></MetaInfo>"),
            Err(CodecError::Xml(_))
        ));
        assert!(matches!(
            MetaInfo::from_xml(b"<MetaInfo><Attr></MetaInfo>"),
            Err(CodecError::Xml(_))
        ));
    }
}
