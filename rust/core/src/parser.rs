// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP/IFC Parser using nom
//!
//! Zero-copy tokenization and entity scanning, used to read back files
//! produced by [`crate::writer::StepWriter`].

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::schema::IfcType;

/// STEP/IFC Token
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Entity reference: #123
    EntityRef(u32),
    /// String literal as written, without the quotes: 'text'
    String(&'a str),
    /// Integer: 42
    Integer(i64),
    /// Float: 3.14
    Float(f64),
    /// Enum: .AREA., .T.
    Enum(&'a str),
    /// List: (1, 2, 3)
    List(Vec<Token<'a>>),
    /// Null value: $
    Null,
    /// Asterisk (derived value): *
    Derived,
}

/// Parse entity reference: #123
fn entity_ref(input: &str) -> IResult<&str, Token> {
    map(
        preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
        Token::EntityRef,
    )(input)
}

/// Parse string literal: 'text'
/// STEP uses '' to escape a single quote within a string
fn string_literal(input: &str) -> IResult<&str, Token> {
    fn string_content(input: &str) -> IResult<&str, &str> {
        let bytes = input.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                    i += 2;
                    continue;
                }
                return Ok((&input[i..], &input[..i]));
            }
            i += 1;
        }

        // No closing quote found
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )))
    }

    map(
        delimited(char('\''), string_content, char('\'')),
        Token::String,
    )(input)
}

/// Parse integer: 42, -42
fn integer(input: &str) -> IResult<&str, Token> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i64>().map(Token::Integer)
    })(input)
}

/// Parse float: 3.14, -3.14, 1.5E-10, 0., 1.E-05
fn float(input: &str) -> IResult<&str, Token> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            char('.'),
            opt(digit1),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| s.parse::<f64>().map(Token::Float),
    )(input)
}

/// Parse enum: .T., .F., .AREA., .LENGTHUNIT.
fn enum_value(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('.'),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            char('.'),
        ),
        Token::Enum,
    )(input)
}

/// Parse null: $
fn null(input: &str) -> IResult<&str, Token> {
    map(char('$'), |_| Token::Null)(input)
}

/// Parse derived: *
fn derived(input: &str) -> IResult<&str, Token> {
    map(char('*'), |_| Token::Derived)(input)
}

/// Skip whitespace
fn ws(input: &str) -> IResult<&str, ()> {
    map(take_while(|c: char| c.is_whitespace()), |_| ())(input)
}

/// Parse a token with optional surrounding whitespace
fn token(input: &str) -> IResult<&str, Token> {
    delimited(
        ws,
        alt((
            float, // Try float before integer (float includes '.')
            integer,
            entity_ref,
            string_literal,
            enum_value,
            list,
            null,
            derived,
        )),
        ws,
    )(input)
}

/// Parse list: (1, 2, 3) or nested lists
fn list(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('('),
            separated_list0(delimited(ws, char(','), ws), token),
            char(')'),
        ),
        Token::List,
    )(input)
}

/// Parse a complete entity instance
/// Example: #12=IFCCARTESIANPOINT((0.,0.,0.));
pub fn parse_entity(input: &str) -> Result<(u32, IfcType, Vec<Token>)> {
    let result: IResult<&str, (u32, &str, Vec<Token>)> = tuple((
        delimited(
            ws,
            preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
            ws,
        ),
        preceded(
            char('='),
            delimited(
                ws,
                take_while1(|c: char| c.is_alphanumeric() || c == '_'),
                ws,
            ),
        ),
        delimited(
            char('('),
            separated_list0(delimited(ws, char(','), ws), token),
            tuple((char(')'), ws, tag(";"))),
        ),
    ))(input);

    match result {
        Ok((_, (id, type_str, args))) => {
            let ifc_type = IfcType::from_str(type_str)
                .ok_or_else(|| Error::InvalidIfcType(type_str.to_string()))?;
            Ok((id, ifc_type, args))
        }
        Err(e) => {
            let position = match &e {
                nom::Err::Error(inner) | nom::Err::Failure(inner) => {
                    input.len() - inner.input.len()
                }
                nom::Err::Incomplete(_) => input.len(),
            };
            Err(Error::parse(position, format!("Failed to parse entity: {}", e)))
        }
    }
}

/// Decode the STEP string escapes written by the writer:
/// `''` → `'`, `\\` → `\`, and `\X2\hhhh…\X0\` UTF-16 runs.
pub fn unescape_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(['\'', '\\']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("''") {
            out.push('\'');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("\\\\") {
            out.push('\\');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("\\X2\\") {
            match after.find("\\X0\\") {
                Some(end) => {
                    let units: Vec<u16> = after[..end]
                        .as_bytes()
                        .chunks(4)
                        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
                        .filter_map(|hex| u16::from_str_radix(hex, 16).ok())
                        .collect();
                    out.extend(char::decode_utf16(units).map(|c| c.unwrap_or('\u{FFFD}')));
                    rest = &after[end + 4..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        } else {
            // Lone quote or unsupported escape: keep as written
            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Find `keyword` at the start of a line. Header strings cannot hold a raw
/// line break, so a match here is never inside a string literal.
fn find_at_line_start(content: &str, keyword: &str, exact_line: bool) -> Option<usize> {
    let bytes = content.as_bytes();
    memchr::memmem::find_iter(bytes, keyword.as_bytes()).find(|&pos| {
        let at_line_start = pos == 0 || bytes[pos - 1] == b'\n';
        let at_line_end = bytes
            .get(pos + keyword.len())
            .map_or(true, |&b| b == b'\n' || b == b'\r');
        at_line_start && (!exact_line || at_line_end)
    })
}

/// Extract the first schema identifier from the FILE_SCHEMA header entry
pub fn file_schema(content: &str) -> Option<&str> {
    let start = find_at_line_start(content, "FILE_SCHEMA", false)?;
    let after = &content[start..];
    let open = after.find('\'')? + 1;
    let close = after[open..].find('\'')? + open;
    Some(&after[open..close])
}

/// Find the end of an entity instance: the first `;` outside a string literal
fn find_instance_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut in_string = false;
    for (offset, &byte) in bytes[from..].iter().enumerate() {
        match byte {
            b'\'' => in_string = !in_string,
            b';' if !in_string => return Some(from + offset),
            _ => {}
        }
    }
    None
}

/// Entity scanner - walks the DATA section without full parsing
pub struct EntityScanner<'a> {
    content: &'a str,
    data_start: usize,
    position: usize,
}

impl<'a> EntityScanner<'a> {
    /// Create a new scanner. Scanning starts after the `DATA;` line when
    /// present, so header strings are never mistaken for instances.
    pub fn new(content: &'a str) -> Self {
        let data_start = find_at_line_start(content, "DATA;", true)
            .map(|pos| pos + "DATA;".len())
            .unwrap_or(0);
        Self {
            content,
            data_start,
            position: data_start,
        }
    }

    /// Scan for the next entity
    /// Returns (entity_id, type_name, line_start, line_end)
    pub fn next_entity(&mut self) -> Option<(u32, &'a str, usize, usize)> {
        let bytes = self.content.as_bytes();

        loop {
            let remaining = bytes.get(self.position..)?;
            let line_start = self.position + memchr::memchr(b'#', remaining)?;

            let line_end = find_instance_end(bytes, line_start)? + 1;
            self.position = line_end;

            let line = &self.content[line_start..line_end];
            let digits = line[1..]
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(line.len() - 1);
            let Ok(id) = line[1..1 + digits].parse::<u32>() else {
                continue;
            };

            let after_id = line[1 + digits..].trim_start();
            let Some(type_part) = after_id.strip_prefix('=') else {
                continue;
            };
            let type_part = type_part.trim_start();
            let type_len = type_part
                .find(|c: char| c == '(' || c.is_whitespace())
                .unwrap_or(type_part.len());
            let type_offset = line.len() - type_part.len();
            let type_name = &self.content[line_start + type_offset..line_start + type_offset + type_len];

            return Some((id, type_name, line_start, line_end));
        }
    }

    /// Find all entities of a specific type
    pub fn find_by_type(&mut self, target_type: &str) -> Vec<(u32, usize, usize)> {
        let mut results = Vec::new();

        while let Some((id, type_name, start, end)) = self.next_entity() {
            if type_name.eq_ignore_ascii_case(target_type) {
                results.push((id, start, end));
            }
        }

        results
    }

    /// Count entities by type
    pub fn count_by_type(&mut self) -> rustc_hash::FxHashMap<String, usize> {
        let mut counts = rustc_hash::FxHashMap::default();

        while let Some((_, type_name, _, _)) = self.next_entity() {
            *counts.entry(type_name.to_ascii_uppercase()).or_insert(0) += 1;
        }

        counts
    }

    /// Reset scanner to the start of the DATA section
    pub fn reset(&mut self) {
        self.position = self.data_start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ref() {
        assert_eq!(entity_ref("#123"), Ok(("", Token::EntityRef(123))));
        assert_eq!(entity_ref("#0"), Ok(("", Token::EntityRef(0))));
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("'hello'"), Ok(("", Token::String("hello"))));
        assert_eq!(string_literal("'it''s'"), Ok(("", Token::String("it''s"))));
        assert!(string_literal("'unterminated").is_err());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(integer("-42"), Ok(("", Token::Integer(-42))));
        assert_eq!(float("0."), Ok(("", Token::Float(0.0))));
        assert_eq!(float("-2.5"), Ok(("", Token::Float(-2.5))));
        match float("1.E-05") {
            Ok(("", Token::Float(value))) => approx::assert_relative_eq!(value, 1.0e-5),
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn test_enum() {
        assert_eq!(enum_value(".AREA."), Ok(("", Token::Enum("AREA"))));
        assert_eq!(enum_value(".LENGTHUNIT."), Ok(("", Token::Enum("LENGTHUNIT"))));
    }

    #[test]
    fn test_nested_list() {
        let (_, token) = list("((0.,0.,1.),$,*)").unwrap();
        match token {
            Token::List(items) => {
                assert_eq!(items.len(), 3);
                assert_eq!(
                    items[0],
                    Token::List(vec![Token::Float(0.0), Token::Float(0.0), Token::Float(1.0)])
                );
                assert_eq!(items[1], Token::Null);
                assert_eq!(items[2], Token::Derived);
            }
            _ => panic!("Expected List token"),
        }
    }

    #[test]
    fn test_parse_entity() {
        let input = "#7=IFCPIPESEGMENT('PIPEGUID0002',$,'Pipe2',$,$,#30,#41,$,$);";
        let (id, ifc_type, args) = parse_entity(input).unwrap();
        assert_eq!(id, 7);
        assert_eq!(ifc_type, IfcType::IfcPipeSegment);
        assert_eq!(args.len(), 9);
        assert_eq!(args[0], Token::String("PIPEGUID0002"));
        assert_eq!(args[5], Token::EntityRef(30));
    }

    #[test]
    fn test_parse_entity_reports_position() {
        let err = parse_entity("#7=IFCDIRECTION((0.,0.,1.)").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_unescape_string() {
        assert_eq!(unescape_string("Floor 1"), "Floor 1");
        assert_eq!(unescape_string("it''s"), "it's");
        assert_eq!(unescape_string("C:\\\\pipes"), "C:\\pipes");
        assert_eq!(unescape_string("Stra\\X2\\00DF\\X0\\e"), "Straße");
    }

    #[test]
    fn test_file_schema() {
        let content = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\n";
        assert_eq!(file_schema(content), Some("IFC4"));
        assert_eq!(file_schema("DATA;"), None);
    }

    #[test]
    fn test_entity_scanner() {
        let content = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('#1 draft','2026-10-16T09:30:00',(''),(''),'','','');
ENDSEC;
DATA;
#1=IFCPROJECT('PROJGUID0001',$,'A;B',$,$,$,$,$,$);
#2=IFCPIPESEGMENT('PIPEGUID0000',$,'Pipe0',$,$,$,$,$,$);
#3=IFCPIPESEGMENT('PIPEGUID0001',$,'Pipe1',$,$,$,$,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

        let mut scanner = EntityScanner::new(content);

        let (id, type_name, start, end) = scanner.next_entity().unwrap();
        assert_eq!(id, 1);
        assert_eq!(type_name, "IFCPROJECT");
        assert!(content[start..end].ends_with("$,$);"));

        scanner.reset();
        let pipes = scanner.find_by_type("IfcPipeSegment");
        assert_eq!(pipes.iter().map(|p| p.0).collect::<Vec<_>>(), vec![2, 3]);

        scanner.reset();
        let counts = scanner.count_by_type();
        assert_eq!(counts.get("IFCPROJECT"), Some(&1));
        assert_eq!(counts.get("IFCPIPESEGMENT"), Some(&2));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_header_strings_mentioning_data_section() {
        let content = "ISO-10303-21;\nHEADER;\n\
FILE_NAME('x.ifc','',('Team DATA; room #4'),('FILE_SCHEMA(''IFC2X3'')'),'','','');\n\
FILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
#1=IFCPIPESEGMENT('PIPEGUID0000',$,'Pipe0',$,$,$,$,$,$);\n\
ENDSEC;\nEND-ISO-10303-21;\n";

        assert_eq!(file_schema(content), Some("IFC4"));

        let mut scanner = EntityScanner::new(content);
        let (id, type_name, _, _) = scanner.next_entity().unwrap();
        assert_eq!((id, type_name), (1, "IFCPIPESEGMENT"));
        assert!(scanner.next_entity().is_none());
    }
}
