use std::ops::RangeInclusive;

use crate::model::{Area, ProcessRecord, Service};
use crate::scanner::ProcessRegistry;

/// Search filters. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessFilter {
    pub client: Option<String>,
    pub area: Option<Area>,
    pub service: Option<Service>,
    pub year: Option<String>,
    pub reference_contains: Option<String>,
    pub number_from: Option<u32>,
    pub number_to: Option<u32>,
}

impl ProcessFilter {
    pub fn number_range(&self) -> RangeInclusive<u32> {
        self.number_from.unwrap_or(0)..=self.number_to.unwrap_or(u32::MAX)
    }

    pub fn matches(&self, record: &ProcessRecord) -> bool {
        if !self.number_range().contains(&record.number.value()) {
            return false;
        }
        if let Some(client) = &self.client {
            if record.client.to_uppercase() != client.trim().to_uppercase() {
                return false;
            }
        }
        if self.area.is_some_and(|area| area != record.area) {
            return false;
        }
        if self.service.is_some_and(|service| service != record.service) {
            return false;
        }
        if let Some(year) = &self.year {
            if record.year.as_str() != year.trim() {
                return false;
            }
        }
        if let Some(needle) = &self.reference_contains {
            let needle = needle.trim().to_uppercase();
            if !record.reference.as_str().to_uppercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Records matching `filter`, ordered by process number, then area.
pub fn query_processes(registry: &ProcessRegistry, filter: &ProcessFilter) -> Vec<ProcessRecord> {
    registry
        .records()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}
