//! Data validation rules
//!
//! A validation rule restricts what a cell may hold. For dropdown cells the
//! interesting kinds are "one of range", whose allowed values live in a
//! (possibly cross-sheet) range, and "one of list", whose values are inline.

use crate::cell::CellAddress;
use crate::reference::RangeReference;

/// Condition kind of a validation rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationKind {
    /// Value must come from a cell range (`ONE_OF_RANGE`)
    OneOfRange,
    /// Value must come from an inline list (`ONE_OF_LIST`)
    OneOfList,
    /// Any other condition, keeping the provider's type name
    Other(String),
    /// The provider reported no condition type
    Unknown,
}

impl ValidationKind {
    /// Map a provider condition type name (e.g. `ONE_OF_RANGE`)
    pub fn from_condition_type(name: &str) -> Self {
        match name.trim() {
            "" => ValidationKind::Unknown,
            "ONE_OF_RANGE" => ValidationKind::OneOfRange,
            "ONE_OF_LIST" => ValidationKind::OneOfList,
            other => ValidationKind::Other(other.to_string()),
        }
    }
}

/// A validation rule attached to one cell
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRule {
    /// Cell the rule is attached to
    pub cell: CellAddress,
    /// Condition kind
    pub kind: ValidationKind,
    /// Range string as entered by the sheet author (`=Backend!$AC$2:$AC`)
    pub source: Option<String>,
    /// Parsed form of `source`, when it parses
    pub source_range: Option<RangeReference>,
    /// Inline values of a `ONE_OF_LIST` rule
    pub list_values: Vec<String>,
}

impl ValidationRule {
    /// Build a rule from a provider condition.
    ///
    /// For "one of range" conditions only the first non-empty listed value is
    /// used as the source range; further values are ignored. The source is
    /// parsed with `row_ceiling` closing open-ended ranges.
    pub fn from_condition(
        cell: CellAddress,
        condition_type: &str,
        values: &[String],
        row_ceiling: u32,
    ) -> Self {
        let kind = ValidationKind::from_condition_type(condition_type);
        let mut rule = Self {
            cell,
            kind,
            source: None,
            source_range: None,
            list_values: Vec::new(),
        };

        match rule.kind {
            ValidationKind::OneOfRange => {
                rule.source = values
                    .iter()
                    .map(|v| v.trim())
                    .find(|v| !v.is_empty())
                    .map(str::to_string);
                rule.source_range = rule
                    .source
                    .as_deref()
                    .and_then(|s| RangeReference::parse_with_ceiling(s, row_ceiling).ok());
            }
            ValidationKind::OneOfList => {
                rule.list_values = values
                    .iter()
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {}
        }

        rule
    }

    /// Whether the rule carries a usable range reference
    pub fn has_range(&self) -> bool {
        self.source_range.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_ROW_CEILING;
    use pretty_assertions::assert_eq;

    fn b6() -> CellAddress {
        CellAddress::parse("B6").unwrap()
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ValidationKind::from_condition_type("ONE_OF_RANGE"),
            ValidationKind::OneOfRange
        );
        assert_eq!(
            ValidationKind::from_condition_type("ONE_OF_LIST"),
            ValidationKind::OneOfList
        );
        assert_eq!(
            ValidationKind::from_condition_type("NUMBER_GREATER"),
            ValidationKind::Other("NUMBER_GREATER".into())
        );
        assert_eq!(ValidationKind::from_condition_type(""), ValidationKind::Unknown);
    }

    #[test]
    fn test_one_of_range_uses_first_value() {
        let values = vec![
            "".to_string(),
            "=Backend!$AC$2:$AC".to_string(),
            "=Other!A1:A5".to_string(),
        ];
        let rule = ValidationRule::from_condition(b6(), "ONE_OF_RANGE", &values, DEFAULT_ROW_CEILING);

        assert_eq!(rule.source.as_deref(), Some("=Backend!$AC$2:$AC"));
        let range = rule.source_range.unwrap();
        assert_eq!(range.sheet.as_deref(), Some("Backend"));
        assert_eq!(range.body(), "AC2:AC1000");
    }

    #[test]
    fn test_unparseable_source_keeps_raw_string() {
        let values = vec!["=INDIRECT(B3)".to_string()];
        let rule = ValidationRule::from_condition(b6(), "ONE_OF_RANGE", &values, DEFAULT_ROW_CEILING);
        assert_eq!(rule.source.as_deref(), Some("=INDIRECT(B3)"));
        assert!(!rule.has_range());
    }

    #[test]
    fn test_one_of_list() {
        let values = vec!["Wing".to_string(), " ".to_string(), " Tail ".to_string()];
        let rule = ValidationRule::from_condition(b6(), "ONE_OF_LIST", &values, DEFAULT_ROW_CEILING);
        assert_eq!(rule.list_values, vec!["Wing", "Tail"]);
        assert!(!rule.has_range());
    }
}
