use tracing::debug;

use crate::error::Error;
use crate::model::{ProcessRecord, ProcessRequest};
use crate::scanner::ProcessRegistry;

/// Result of checking a candidate against the processes already on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consistency {
    /// No process of this client/area shares the number.
    New,
    /// The candidate is identical to an existing process; reuse its folder.
    Existing(ProcessRecord),
}

/// Check a candidate against every existing process with the same client,
/// area and number.
///
/// Year, service and reference must all agree, and are checked in that order
/// across all matches so a given bad input always yields the same error.
pub fn check_consistency(
    request: &ProcessRequest,
    registry: &ProcessRegistry,
) -> Result<Consistency, Error> {
    let matches = registry.matching(&request.client, request.area, &request.number);
    if matches.is_empty() {
        debug!("Process {} is new for {}", request.number, request.client);
        return Ok(Consistency::New);
    }

    if let Some(existing) = matches.iter().find(|r| r.year != request.year) {
        return Err(Error::YearConflict {
            number: request.number.to_string(),
            existing: existing.year.to_string(),
            requested: request.year.to_string(),
        });
    }

    if let Some(existing) = matches.iter().find(|r| r.service != request.service) {
        return Err(Error::ServiceConflict {
            number: request.number.to_string(),
            existing: existing.service,
            requested: request.service,
        });
    }

    if let Some(existing) = matches
        .iter()
        .find(|r| !r.reference.eq_ignore_case(&request.reference))
    {
        return Err(Error::ReferenceConflict {
            number: request.number.to_string(),
            existing: existing.reference.to_string(),
            requested: request.reference.to_string(),
        });
    }

    let existing = matches[0].clone();
    debug!(
        "Process {} already exists at {}",
        request.number,
        existing.path.display()
    );
    Ok(Consistency::Existing(existing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Area, ProcessNumber, Reference, Service, Year};
    use std::path::PathBuf;

    fn record(client: &str, service: Service, year: &str, reference: &str) -> ProcessRecord {
        ProcessRecord {
            number: ProcessNumber::parse("000123").unwrap(),
            area: Area::Import,
            client: client.to_string(),
            service,
            year: Year::parse(year).unwrap(),
            reference: Reference::parse(reference).unwrap(),
            path: PathBuf::from(format!("/imp/{}/20{}/x", client, year)),
        }
    }

    fn request(service: &str, year: &str, reference: &str) -> ProcessRequest {
        ProcessRequest::parse("acme", "IMPORTAÇÃO", service, "000123", year, reference).unwrap()
    }

    #[test]
    fn test_year_reported_before_service_and_reference() {
        let registry =
            ProcessRegistry::from_records([record("ACME", Service::Air, "24", "PO.99")]);
        let err = check_consistency(&request("Marítimo", "23", "OTHER"), &registry).unwrap_err();
        match err {
            Error::YearConflict { existing, requested, .. } => {
                assert_eq!(existing, "24");
                assert_eq!(requested, "23");
            }
            other => panic!("expected year conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_service_reported_before_reference() {
        let registry =
            ProcessRegistry::from_records([record("ACME", Service::Air, "24", "PO.99")]);
        let err = check_consistency(&request("Rodoviário", "24", "OTHER"), &registry).unwrap_err();
        assert!(matches!(
            err,
            Error::ServiceConflict { existing: Service::Air, requested: Service::Road, .. }
        ));
    }

    #[test]
    fn test_reference_compared_case_insensitively() {
        let registry =
            ProcessRegistry::from_records([record("ACME", Service::Air, "24", "po.99")]);
        let result = check_consistency(&request("Aéreo", "24", "PO.99"), &registry).unwrap();
        assert!(matches!(result, Consistency::Existing(r) if r.reference.as_str() == "po.99"));

        let err = check_consistency(&request("Aéreo", "24", "PO.100"), &registry).unwrap_err();
        assert!(matches!(err, Error::ReferenceConflict { existing, .. } if existing == "po.99"));
    }

    #[test]
    fn test_other_client_or_area_is_new() {
        let registry =
            ProcessRegistry::from_records([record("GLOBEX", Service::Air, "24", "PO.99")]);
        assert_eq!(
            check_consistency(&request("Marítimo", "23", "X"), &registry).unwrap(),
            Consistency::New
        );

        let export =
            ProcessRequest::parse("GLOBEX", "EXPORTAÇÃO", "Marítimo", "000123", "23", "X").unwrap();
        assert_eq!(check_consistency(&export, &registry).unwrap(), Consistency::New);
    }
}
