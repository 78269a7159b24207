// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP physical file (ISO 10303-21) writer

use std::fmt::Write as _;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::attribute::AttributeValue;
use crate::document::{Entity, FileHeader, IfcDocument};
use crate::error::{Error, Result};

/// Serializes an [`IfcDocument`] as a STEP physical file
pub struct StepWriter<'a> {
    document: &'a IfcDocument,
}

impl<'a> StepWriter<'a> {
    pub fn new(document: &'a IfcDocument) -> Self {
        Self { document }
    }

    /// Render the complete file. The document is validated first.
    pub fn to_step_string(&self) -> Result<String> {
        self.document.validate()?;

        // Rough estimate: ~80 bytes per instance line
        let mut out = String::with_capacity(512 + self.document.len() * 80);
        out.push_str("ISO-10303-21;\n");
        write_header(&mut out, self.document.header());
        out.push_str("DATA;\n");
        for entity in self.document.entities() {
            write_entity(&mut out, entity)?;
        }
        out.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
        Ok(out)
    }

    /// Write the file to any sink
    pub fn write<W: Write>(&self, mut sink: W) -> Result<()> {
        let content = self.to_step_string()?;
        sink.write_all(content.as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    /// Create or truncate `path` and write the file to it. Nothing is
    /// touched on disk if the document fails to render.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_step_string()?;
        let mut sink = BufWriter::new(fs::File::create(path.as_ref())?);
        sink.write_all(content.as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}

fn write_header(out: &mut String, header: &FileHeader) {
    out.push_str("HEADER;\n");
    let _ = writeln!(
        out,
        "FILE_DESCRIPTION({},{});",
        string_list(&header.description),
        quoted(&header.implementation_level)
    );
    let _ = writeln!(
        out,
        "FILE_NAME({},{},{},{},{},{},{});",
        quoted(&header.name),
        quoted(&header.time_stamp),
        string_list(&header.author),
        string_list(&header.organization),
        quoted(&header.preprocessor_version),
        quoted(&header.originating_system),
        quoted(&header.authorization)
    );
    let _ = writeln!(out, "FILE_SCHEMA(({}));", quoted(&header.schema));
    out.push_str("ENDSEC;\n");
}

fn write_entity(out: &mut String, entity: &Entity) -> Result<()> {
    let _ = write!(out, "{}={}(", entity.id, entity.ifc_type.as_str());
    for (i, attr) in entity.attributes.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_value(out, attr)?;
    }
    out.push_str(");\n");
    Ok(())
}

fn write_value(out: &mut String, value: &AttributeValue) -> Result<()> {
    match value {
        AttributeValue::EntityRef(id) => {
            let _ = write!(out, "#{}", id);
        }
        AttributeValue::String(s) => out.push_str(&quoted(s)),
        AttributeValue::Integer(i) => {
            let _ = write!(out, "{}", i);
        }
        AttributeValue::Float(f) => out.push_str(&format_real(*f)?),
        AttributeValue::Enum(e) => {
            let _ = write!(out, ".{}.", e);
        }
        AttributeValue::List(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(')');
        }
        AttributeValue::Null => out.push('$'),
        AttributeValue::Derived => out.push('*'),
    }
    Ok(())
}

/// Format a REAL so it always carries a decimal point: `0.`, `5.`, `0.05`
pub fn format_real(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::NonFiniteReal(value));
    }
    let mut s = value.to_string();
    if !s.contains('.') {
        s.push('.');
    }
    Ok(s)
}

/// Encode a string literal body: quotes and backslashes doubled,
/// non-ASCII characters as `\X2\` UTF-16 runs
pub fn encode_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut wide: Vec<u16> = Vec::new();

    let flush_wide = |out: &mut String, wide: &mut Vec<u16>| {
        if wide.is_empty() {
            return;
        }
        out.push_str("\\X2\\");
        for unit in wide.drain(..) {
            let _ = write!(out, "{:04X}", unit);
        }
        out.push_str("\\X0\\");
    };

    for c in value.chars() {
        if c.is_ascii() && !c.is_ascii_control() {
            flush_wide(&mut out, &mut wide);
            match c {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                _ => out.push(c),
            }
        } else {
            let mut buf = [0u16; 2];
            wide.extend_from_slice(c.encode_utf16(&mut buf));
        }
    }
    flush_wide(&mut out, &mut wide);
    out
}

fn quoted(value: &str) -> String {
    format!("'{}'", encode_string(value))
}

fn string_list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| quoted(v)).collect();
    format!("({})", items.join(","))
}
