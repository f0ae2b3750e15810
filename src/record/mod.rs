//! Trademark records and the label table that feeds them
//!
//! A detail page is a table of label/value cells. Each recognised label maps
//! to exactly one [`RecordField`]; the mapping is an ordered list of
//! `(phrase, field)` pairs matched by substring containment, first match wins.

use serde::Serialize;
use std::fmt;

/// Output fields of a trademark record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordField {
    NameTitle,
    Status,
    ApplicationDate,
    RevelationDate,
    ApplicationNumber,
    CategoryOfRights,
    RegistrationNumber,
    TrademarkType,
}

impl RecordField {
    /// Returns the output key for this field
    pub fn key(&self) -> &'static str {
        match self {
            Self::NameTitle => "nameTitle",
            Self::Status => "status",
            Self::ApplicationDate => "applicationDate",
            Self::RevelationDate => "revelationDate",
            Self::ApplicationNumber => "applicationNumber",
            Self::CategoryOfRights => "categoryOfRights",
            Self::RegistrationNumber => "registrationNumber",
            Self::TrademarkType => "trademarkType",
        }
    }

    /// Returns all fields in output order
    pub fn all() -> [Self; 8] {
        [
            Self::NameTitle,
            Self::Status,
            Self::ApplicationDate,
            Self::RevelationDate,
            Self::ApplicationNumber,
            Self::CategoryOfRights,
            Self::RegistrationNumber,
            Self::TrademarkType,
        ]
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Known label phrases, in match priority order
pub const LABEL_TABLE: &[(&str, RecordField)] = &[
    ("Name/Title", RecordField::NameTitle),
    ("Status", RecordField::Status),
    ("Application date", RecordField::ApplicationDate),
    ("Revelation date", RecordField::RevelationDate),
    ("Application number", RecordField::ApplicationNumber),
    ("Category of rights", RecordField::CategoryOfRights),
    ("Registration number", RecordField::RegistrationNumber),
    ("Trademark type", RecordField::TrademarkType),
];

/// Resolves a (whitespace-collapsed) label text to its field
///
/// Returns the first table entry whose phrase is contained in `label`.
pub fn match_label(label: &str) -> Option<RecordField> {
    LABEL_TABLE
        .iter()
        .find(|(phrase, _)| label.contains(phrase))
        .map(|(_, field)| *field)
}

/// A single extracted trademark record
///
/// Each field has three observable states: `None` (label not found, omitted
/// from the output), `Some(None)` (label found but the value was empty,
/// serialized as `null`) and `Some(Some(value))`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrademarkRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_title: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revelation_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_number: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_of_rights: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trademark_type: Option<Option<String>>,
}

impl TrademarkRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, field: RecordField) -> &Option<Option<String>> {
        match field {
            RecordField::NameTitle => &self.name_title,
            RecordField::Status => &self.status,
            RecordField::ApplicationDate => &self.application_date,
            RecordField::RevelationDate => &self.revelation_date,
            RecordField::ApplicationNumber => &self.application_number,
            RecordField::CategoryOfRights => &self.category_of_rights,
            RecordField::RegistrationNumber => &self.registration_number,
            RecordField::TrademarkType => &self.trademark_type,
        }
    }

    fn slot_mut(&mut self, field: RecordField) -> &mut Option<Option<String>> {
        match field {
            RecordField::NameTitle => &mut self.name_title,
            RecordField::Status => &mut self.status,
            RecordField::ApplicationDate => &mut self.application_date,
            RecordField::RevelationDate => &mut self.revelation_date,
            RecordField::ApplicationNumber => &mut self.application_number,
            RecordField::CategoryOfRights => &mut self.category_of_rights,
            RecordField::RegistrationNumber => &mut self.registration_number,
            RecordField::TrademarkType => &mut self.trademark_type,
        }
    }

    /// Sets a field; an empty value is stored as an explicit null
    ///
    /// A later row with the same field overwrites an earlier one.
    pub fn set(&mut self, field: RecordField, value: &str) {
        let value = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
        *self.slot_mut(field) = Some(value);
    }

    /// Returns `None` when the field was never matched, `Some(None)` when it
    /// was matched with an empty value
    pub fn get(&self, field: RecordField) -> Option<Option<&str>> {
        self.slot(field).as_ref().map(|value| value.as_deref())
    }

    /// Number of fields that carry a non-empty value
    pub fn populated_count(&self) -> usize {
        RecordField::all()
            .iter()
            .filter(|field| matches!(self.get(**field), Some(Some(_))))
            .count()
    }

    /// Returns true if no field carries a value
    pub fn is_empty(&self) -> bool {
        self.populated_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_label_exact() {
        assert_eq!(match_label("Status"), Some(RecordField::Status));
        assert_eq!(match_label("Name/Title"), Some(RecordField::NameTitle));
    }

    #[test]
    fn test_match_label_by_containment() {
        assert_eq!(
            match_label("(210) Application number:"),
            Some(RecordField::ApplicationNumber)
        );
    }

    #[test]
    fn test_match_label_first_entry_wins() {
        // Contains both "Status" and "Application date"; Status comes first in the table
        assert_eq!(
            match_label("Application date Status"),
            Some(RecordField::Status)
        );
    }

    #[test]
    fn test_match_label_unknown() {
        assert_eq!(match_label("Owner"), None);
        assert_eq!(match_label(""), None);
    }

    #[test]
    fn test_set_empty_is_explicit_null() {
        let mut record = TrademarkRecord::new();
        record.set(RecordField::Status, "");
        assert_eq!(record.get(RecordField::Status), Some(None));
        assert_eq!(record.get(RecordField::NameTitle), None);
        assert!(record.is_empty());
    }

    #[test]
    fn test_serialization_omits_absent_and_nulls_empty() {
        let mut record = TrademarkRecord::new();
        record.set(RecordField::NameTitle, "ACME");
        record.set(RecordField::TrademarkType, "");

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"nameTitle":"ACME","trademarkType":null}"#);
    }

    #[test]
    fn test_keys_follow_serde_names() {
        let mut record = TrademarkRecord::new();
        for field in RecordField::all() {
            record.set(field, "x");
        }
        let value = serde_json::to_value(&record).unwrap();
        for field in RecordField::all() {
            assert_eq!(value[field.key()], "x");
        }
    }
}
