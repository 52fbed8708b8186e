//! Folder-name grammar for process directories.
//!
//! ```text
//! <AreaLetter><ServiceLetter>-<6-digit number>-<2-digit year> - <reference>
//! IA-000123-24 - PO.99
//! ```
//!
//! The grammar is declared once in [`GRAMMAR`]. The decode regex is compiled
//! from it and [`FolderName::encode`] walks it, so both directions share the
//! same field order and separators.
//!
//! Encode only ever writes references in `[A-Za-z0-9 .+-]`. Decode accepts any
//! non-blank reference, since older trees hold names such as `AÇO_1`, and
//! stores it sanitized so comparisons see the same form encode would write.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;

use crate::config::AreaRoots;
use crate::model::{Area, ProcessNumber, ProcessRequest, Reference, Service, Year};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Area,
    Service,
    Number,
    Year,
    Reference,
}

impl Field {
    fn group(self) -> &'static str {
        match self {
            Field::Area => "area",
            Field::Service => "service",
            Field::Number => "number",
            Field::Year => "year",
            Field::Reference => "reference",
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            Field::Area => "[IE]",
            Field::Service => "[ARM]",
            Field::Number => "[0-9]{6}",
            Field::Year => "[0-9]{2}",
            Field::Reference => r".*\S.*",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Segment {
    Literal(&'static str),
    Field(Field),
}

const GRAMMAR: [Segment; 8] = [
    Segment::Field(Field::Area),
    Segment::Field(Field::Service),
    Segment::Literal("-"),
    Segment::Field(Field::Number),
    Segment::Literal("-"),
    Segment::Field(Field::Year),
    Segment::Literal(" - "),
    Segment::Field(Field::Reference),
];

fn grammar_regex() -> String {
    let body: String = GRAMMAR
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => regex::escape(text),
            Segment::Field(field) => format!("(?P<{}>{})", field.group(), field.pattern()),
        })
        .collect();
    format!("^{}$", body)
}

lazy_static! {
    static ref FOLDER_NAME_RE: Regex =
        Regex::new(&grammar_regex()).expect("folder name grammar is a valid regex");
}

/// The identity fields a process encodes in its folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderName {
    pub area: Area,
    pub service: Service,
    pub number: ProcessNumber,
    pub year: Year,
    pub reference: Reference,
}

impl FolderName {
    pub fn new(
        area: Area,
        service: Service,
        number: ProcessNumber,
        year: Year,
        reference: &Reference,
    ) -> Self {
        Self {
            area,
            service,
            number,
            year,
            reference: Reference::sanitize(reference.as_str()),
        }
    }

    pub fn from_request(request: &ProcessRequest) -> Self {
        Self::new(
            request.area,
            request.service,
            request.number.clone(),
            request.year.clone(),
            &request.reference,
        )
    }

    pub fn encode(&self) -> String {
        let mut out = String::new();
        for segment in GRAMMAR {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::Area) => out.push(self.area.letter()),
                Segment::Field(Field::Service) => out.push(self.service.letter()),
                Segment::Field(Field::Number) => out.push_str(self.number.as_str()),
                Segment::Field(Field::Year) => out.push_str(self.year.as_str()),
                Segment::Field(Field::Reference) => out.push_str(self.reference.as_str()),
            }
        }
        out
    }

    /// `None` for any name that does not follow the grammar.
    pub fn decode(dir_name: &str) -> Option<FolderName> {
        let caps = FOLDER_NAME_RE.captures(dir_name)?;
        let letter = |field: Field| caps.name(field.group())?.as_str().chars().next();
        let text = |field: Field| caps.name(field.group()).map(|m| m.as_str());

        Some(FolderName {
            area: Area::from_letter(letter(Field::Area)?)?,
            service: Service::from_letter(letter(Field::Service)?)?,
            number: ProcessNumber::parse(text(Field::Number)?).ok()?,
            year: Year::parse(text(Field::Year)?).ok()?,
            reference: Reference::sanitize(text(Field::Reference)?),
        })
    }
}

/// Absolute location of a process folder: `<areaRoot>/<CLIENT>/<20yy>/<folderName>`.
pub fn process_path(roots: &AreaRoots, client: &str, name: &FolderName) -> PathBuf {
    roots
        .root(name.area)
        .join(client.trim().to_uppercase())
        .join(name.year.full())
        .join(name.encode())
}

/// Folder name and full path for a request.
pub fn encode(roots: &AreaRoots, request: &ProcessRequest) -> (String, PathBuf) {
    let name = FolderName::from_request(request);
    (name.encode(), process_path(roots, &request.client, &name))
}
