use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// Import or export directionality. Selects the root subtree a process lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Area {
    #[serde(rename = "IMPORTAÇÃO")]
    Import,
    #[serde(rename = "EXPORTAÇÃO")]
    Export,
}

impl Area {
    pub const ALL: [Area; 2] = [Area::Import, Area::Export];

    pub fn letter(self) -> char {
        match self {
            Area::Import => 'I',
            Area::Export => 'E',
        }
    }

    pub fn from_letter(letter: char) -> Option<Area> {
        match letter {
            'I' => Some(Area::Import),
            'E' => Some(Area::Export),
            _ => None,
        }
    }

    /// Name of the area root directory, also the user-facing label.
    pub fn display_name(self) -> &'static str {
        match self {
            Area::Import => "IMPORTAÇÃO",
            Area::Export => "EXPORTAÇÃO",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Area {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "IMPORTAÇÃO" | "IMPORTACAO" => Ok(Area::Import),
            "EXPORTAÇÃO" | "EXPORTACAO" => Ok(Area::Export),
            _ => Err(Error::InvalidArea(s.to_string())),
        }
    }
}

/// Transport mode, abbreviated to the first letter of its name in folder names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Service {
    #[serde(rename = "Aéreo")]
    Air,
    #[serde(rename = "Rodoviário")]
    Road,
    #[serde(rename = "Marítimo")]
    Sea,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Air, Service::Road, Service::Sea];

    pub fn letter(self) -> char {
        match self {
            Service::Air => 'A',
            Service::Road => 'R',
            Service::Sea => 'M',
        }
    }

    pub fn from_letter(letter: char) -> Option<Service> {
        Service::ALL.into_iter().find(|s| s.letter() == letter)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Service::Air => "Aéreo",
            Service::Road => "Rodoviário",
            Service::Sea => "Marítimo",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aéreo" | "aereo" => Ok(Service::Air),
            "rodoviário" | "rodoviario" => Ok(Service::Road),
            "marítimo" | "maritimo" => Ok(Service::Sea),
            _ => Err(Error::InvalidService(s.to_string())),
        }
    }
}

/// Six-digit, zero-padded process number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProcessNumber(String);

impl ProcessNumber {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if raw.len() == 6 && raw.chars().all(|c| c.is_ascii_digit()) {
            Ok(ProcessNumber(raw.to_string()))
        } else {
            Err(Error::InvalidNumberFormat(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> u32 {
        // Always six ASCII digits, so this cannot fail.
        self.0.parse().unwrap_or_default()
    }
}

impl fmt::Display for ProcessNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two-digit process year, stored and compared in its short form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Year(String);

impl Year {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if raw.len() == 2 && raw.chars().all(|c| c.is_ascii_digit()) {
            Ok(Year(raw.to_string()))
        } else {
            Err(Error::InvalidYearFormat(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Four-digit form used for the year directory, e.g. `24` -> `2024`.
    pub fn full(&self) -> String {
        format!("20{}", self.0)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-text process tag, restricted to ASCII letters, digits, space, `.`, `-` and `+`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    pub fn is_allowed(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '-' | '+')
    }

    /// Strict parse: rejects any character outside the allowed set.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let offending: Vec<char> = raw.chars().filter(|c| !Self::is_allowed(*c)).collect();
        let trimmed = raw.trim();
        if !offending.is_empty() || trimmed.is_empty() {
            return Err(Error::InvalidReferenceCharacters {
                reference: raw.to_string(),
                offending,
            });
        }
        Ok(Reference(trimmed.to_string()))
    }

    /// Lenient form: drops disallowed characters and trims.
    pub fn sanitize(raw: &str) -> Self {
        let kept: String = raw.chars().filter(|c| Self::is_allowed(*c)).collect();
        Reference(kept.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn eq_ignore_case(&self, other: &Reference) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated candidate process as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub client: String,
    pub area: Area,
    pub service: Service,
    pub number: ProcessNumber,
    pub year: Year,
    pub reference: Reference,
}

impl ProcessRequest {
    /// Parse raw caller input. Every check here runs before the filesystem is touched.
    pub fn parse(
        client: &str,
        area: &str,
        service: &str,
        number: &str,
        year: &str,
        reference: &str,
    ) -> Result<Self, Error> {
        let client = client.trim().to_uppercase();
        if client.is_empty() {
            return Err(Error::MissingField("client"));
        }
        if client.contains(['/', '\\']) || client == "." || client == ".." {
            return Err(Error::InvalidClientName(client));
        }

        Ok(ProcessRequest {
            client,
            area: area.parse()?,
            service: service.parse()?,
            number: ProcessNumber::parse(number)?,
            year: Year::parse(year)?,
            reference: Reference::parse(reference)?,
        })
    }

    /// The record this request describes once its folder lives at `path`.
    pub fn record_at(&self, path: impl Into<PathBuf>) -> ProcessRecord {
        ProcessRecord {
            number: self.number.clone(),
            area: self.area,
            client: self.client.clone(),
            service: self.service,
            year: self.year.clone(),
            reference: self.reference.clone(),
            path: path.into(),
        }
    }
}

/// A process recovered from its folder name and position on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub number: ProcessNumber,
    pub area: Area,
    pub client: String,
    pub service: Service,
    pub year: Year,
    pub reference: Reference,
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_parse_accepts_accented_and_plain() {
        assert_eq!("IMPORTAÇÃO".parse::<Area>().unwrap(), Area::Import);
        assert_eq!("importação".parse::<Area>().unwrap(), Area::Import);
        assert_eq!("Exportacao".parse::<Area>().unwrap(), Area::Export);
        assert!(matches!(
            "TRANSITO".parse::<Area>(),
            Err(Error::InvalidArea(a)) if a == "TRANSITO"
        ));
    }

    #[test]
    fn test_service_letters() {
        assert_eq!("Aéreo".parse::<Service>().unwrap().letter(), 'A');
        assert_eq!("RODOVIÁRIO".parse::<Service>().unwrap().letter(), 'R');
        assert_eq!("maritimo".parse::<Service>().unwrap().letter(), 'M');
        assert_eq!(Service::from_letter('M'), Some(Service::Sea));
        assert_eq!(Service::from_letter('X'), None);
    }

    #[test]
    fn test_number_and_year_formats() {
        assert_eq!(ProcessNumber::parse("000123").unwrap().value(), 123);
        assert!(matches!(ProcessNumber::parse("12345"), Err(Error::InvalidNumberFormat(_))));
        assert!(matches!(ProcessNumber::parse("12a456"), Err(Error::InvalidNumberFormat(_))));
        assert_eq!(Year::parse("24").unwrap().full(), "2024");
        assert!(matches!(Year::parse("2024"), Err(Error::InvalidYearFormat(_))));
    }

    #[test]
    fn test_reference_strict_and_lenient() {
        assert_eq!(Reference::parse(" PO.99 ").unwrap().as_str(), "PO.99");
        match Reference::parse("PO#99/1") {
            Err(Error::InvalidReferenceCharacters { offending, .. }) => {
                assert_eq!(offending, vec!['#', '/'])
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Reference::parse("   ").is_err());
        assert_eq!(Reference::sanitize(" PO#99/1 ").as_str(), "PO991");
    }

    #[test]
    fn test_request_parse_order() {
        // Area is checked before number, so a bad area wins.
        let err = ProcessRequest::parse("acme", "NOWHERE", "Aéreo", "1", "24", "X").unwrap_err();
        assert!(matches!(err, Error::InvalidArea(_)));

        let req = ProcessRequest::parse(" acme ", "IMPORTAÇÃO", "Aéreo", "000123", "24", "PO.99")
            .unwrap();
        assert_eq!(req.client, "ACME");
        assert_eq!(req.number.as_str(), "000123");

        assert!(matches!(
            ProcessRequest::parse("", "IMPORTAÇÃO", "Aéreo", "000123", "24", "PO.99"),
            Err(Error::MissingField("client"))
        ));
        assert!(matches!(
            ProcessRequest::parse("a/b", "IMPORTAÇÃO", "Aéreo", "000123", "24", "PO.99"),
            Err(Error::InvalidClientName(_))
        ));
    }

    #[test]
    fn test_record_at_carries_request_fields() {
        let req = ProcessRequest::parse("acme", "EXPORTAÇÃO", "Marítimo", "000042", "23", "BL 7")
            .unwrap();
        let record = req.record_at("/arq/EXPORTAÇÃO/ACME/2023/EM-000042-23 - BL 7");
        assert_eq!(record.client, "ACME");
        assert_eq!(record.area, Area::Export);
        assert_eq!(record.service, Service::Sea);
        assert_eq!(record.reference.as_str(), "BL 7");
        assert_eq!(
            record.path,
            PathBuf::from("/arq/EXPORTAÇÃO/ACME/2023/EM-000042-23 - BL 7")
        );
    }
}
