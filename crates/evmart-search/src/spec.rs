use std::collections::BTreeMap;

use serde::Serialize;

use crate::field::{classify, FieldKind, FieldValue};
use crate::SearchError;

/// One condition on a single field.
///
/// Every variant has an unset form that matches everything; see
/// [`Predicate::is_default`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Predicate {
    Range { min: f64, max: f64 },
    Exact(String),
    Contains(String),
    Includes(String),
    Flag(bool),
}

impl Predicate {
    /// Unbounded range (`min <= 0`, `max = +inf`).
    #[must_use]
    pub fn any_range() -> Self {
        Predicate::Range {
            min: 0.0,
            max: f64::INFINITY,
        }
    }

    /// `true` when the predicate is at its unset default and filters nothing.
    #[must_use]
    pub fn is_default(&self) -> bool {
        match self {
            Predicate::Range { min, max } => {
                *min <= 0.0 && max.is_infinite() && max.is_sign_positive()
            }
            Predicate::Exact(v) | Predicate::Contains(v) | Predicate::Includes(v) => {
                v.trim().is_empty()
            }
            Predicate::Flag(_) => false,
        }
    }

    /// Evaluates the predicate against a projected value. A missing value
    /// never satisfies an active predicate.
    #[must_use]
    pub fn matches(&self, value: Option<&FieldValue>) -> bool {
        if self.is_default() {
            return true;
        }
        let Some(value) = value else {
            return false;
        };
        match (self, value) {
            (Predicate::Range { min, max }, FieldValue::Number(n)) => *min <= *n && *n <= *max,
            (Predicate::Exact(want), FieldValue::Text(have)) => eq_ignore_case(have, want),
            (Predicate::Exact(want) | Predicate::Includes(want), FieldValue::List(items)) => {
                items.iter().any(|item| eq_ignore_case(item, want))
            }
            (Predicate::Contains(want), FieldValue::Text(have)) => contains_ignore_case(have, want),
            (Predicate::Contains(want), FieldValue::List(items)) => {
                items.iter().any(|item| contains_ignore_case(item, want))
            }
            // Upstream occasionally sends list fields as one delimited string.
            (Predicate::Includes(want), FieldValue::Text(have)) => have
                .split([',', ';', '/'])
                .any(|item| eq_ignore_case(item, want)),
            (Predicate::Flag(want), FieldValue::Flag(have)) => want == have,
            _ => false,
        }
    }
}

fn eq_ignore_case(have: &str, want: &str) -> bool {
    have.trim().to_lowercase() == want.trim().to_lowercase()
}

fn contains_ignore_case(have: &str, want: &str) -> bool {
    have.to_lowercase().contains(&want.trim().to_lowercase())
}

/// The accumulated search criteria for one search flow.
///
/// Predicates are keyed by field name and combine with AND. The optional
/// keyword is matched as a substring across a record's free-text fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSpec {
    pub predicates: BTreeMap<String, Predicate>,
    pub keyword: Option<String>,
}

impl FilterSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`FilterSpec::set`].
    #[must_use]
    pub fn with(mut self, field: &str, predicate: Predicate) -> Self {
        self.set(field, predicate);
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = Some(keyword.to_owned());
        self
    }

    /// Replaces the predicate on `field`.
    pub fn set(&mut self, field: &str, predicate: Predicate) {
        self.predicates.insert(field.to_owned(), predicate);
    }

    pub fn set_range(&mut self, field: &str, min: f64, max: f64) {
        self.set(field, Predicate::Range { min, max });
    }

    pub fn clear(&mut self, field: &str) {
        self.predicates.remove(field);
    }

    /// Records a raw user selection, choosing the predicate from the field's
    /// classification.
    ///
    /// Numeric fields accept `"n"`, `"min-max"`, `"min-"` or `"-max"`; flag
    /// fields accept `true/false`, `yes/no` or `1/0`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidSelection`] when a numeric or flag
    /// selection cannot be parsed.
    pub fn select(&mut self, field: &str, value: &str) -> Result<(), SearchError> {
        let value = value.trim();
        let predicate = match classify(field) {
            FieldKind::Categorical => Predicate::Exact(value.to_owned()),
            FieldKind::FreeText => Predicate::Contains(value.to_owned()),
            FieldKind::List => Predicate::Includes(value.to_owned()),
            FieldKind::Flag => Predicate::Flag(parse_flag(field, value)?),
            FieldKind::Numeric => {
                let (min, max) = parse_range(field, value)?;
                Predicate::Range { min, max }
            }
        };
        self.set(field, predicate);
        Ok(())
    }

    /// `true` when no predicate is active and no keyword is set.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.keyword.as_deref().map_or(true, |k| k.trim().is_empty())
            && self.predicates.values().all(Predicate::is_default)
    }

    /// The predicates that actually constrain results.
    pub fn active(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.predicates
            .iter()
            .filter(|(_, p)| !p.is_default())
            .map(|(k, p)| (k.as_str(), p))
    }
}

fn invalid(field: &str, reason: String) -> SearchError {
    SearchError::InvalidSelection {
        field: field.to_owned(),
        reason,
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool, SearchError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(invalid(field, format!("expected a yes/no value, got \"{other}\""))),
    }
}

fn parse_range(field: &str, value: &str) -> Result<(f64, f64), SearchError> {
    let parse = |s: &str| -> Result<f64, SearchError> {
        let n = s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .map_err(|e| invalid(field, format!("\"{value}\": {e}")))?;
        if n.is_finite() {
            Ok(n)
        } else {
            Err(invalid(field, format!("\"{value}\": bound must be a finite number")))
        }
    };

    // Catalog values are never negative; a leading dash means "up to".
    match value.split_once('-') {
        None => {
            let n = parse(value)?;
            Ok((n, n))
        }
        Some(("", max)) => Ok((0.0, parse(max)?)),
        Some((min, "")) => Ok((parse(min)?, f64::INFINITY)),
        Some((min, max)) => {
            let (min, max) = (parse(min)?, parse(max)?);
            if min > max {
                return Err(invalid(field, format!("min {min} exceeds max {max}")));
            }
            Ok((min, max))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_predicates_are_default() {
        assert!(Predicate::any_range().is_default());
        assert!(Predicate::Range {
            min: -5.0,
            max: f64::INFINITY
        }
        .is_default());
        assert!(Predicate::Exact("  ".to_owned()).is_default());
        assert!(!Predicate::Range {
            min: 0.0,
            max: 100.0
        }
        .is_default());
        assert!(!Predicate::Flag(false).is_default());
    }

    #[test]
    fn range_is_inclusive() {
        let p = Predicate::Range {
            min: 10.0,
            max: 20.0,
        };
        assert!(p.matches(Some(&FieldValue::Number(10.0))));
        assert!(p.matches(Some(&FieldValue::Number(20.0))));
        assert!(!p.matches(Some(&FieldValue::Number(20.01))));
        assert!(!p.matches(None));
    }

    #[test]
    fn exact_ignores_case() {
        let p = Predicate::Exact("tesla".to_owned());
        assert!(p.matches(Some(&FieldValue::Text("Tesla".to_owned()))));
        assert!(!p.matches(Some(&FieldValue::Text("Tesla Motors".to_owned()))));
    }

    #[test]
    fn contains_matches_substring() {
        let p = Predicate::Contains("phnom".to_owned());
        assert!(p.matches(Some(&FieldValue::Text("Phnom Penh".to_owned()))));
        assert!(!p.matches(Some(&FieldValue::Text("Siem Reap".to_owned()))));
    }

    #[test]
    fn includes_checks_list_membership() {
        let p = Predicate::Includes("ccs2".to_owned());
        let list = FieldValue::List(vec!["Type 2".to_owned(), "CCS2".to_owned()]);
        assert!(p.matches(Some(&list)));
        assert!(p.matches(Some(&FieldValue::Text("Type 2, CCS2".to_owned()))));
        assert!(!p.matches(Some(&FieldValue::List(vec!["CHAdeMO".to_owned()]))));
    }

    #[test]
    fn flag_compares_equality() {
        assert!(Predicate::Flag(true).matches(Some(&FieldValue::Flag(true))));
        assert!(!Predicate::Flag(true).matches(Some(&FieldValue::Flag(false))));
    }

    #[test]
    fn mismatched_value_type_fails() {
        let p = Predicate::Range { min: 1.0, max: 2.0 };
        assert!(!p.matches(Some(&FieldValue::Text("1.5".to_owned()))));
    }

    #[test]
    fn select_uses_field_classification() {
        let mut spec = FilterSpec::new();
        spec.select("brand", "BYD").unwrap();
        spec.select("location", "Phnom").unwrap();
        spec.select("connector_types", "CCS2").unwrap();
        spec.select("availability", "yes").unwrap();
        spec.select("price", "10,000-50,000").unwrap();

        assert_eq!(spec.predicates["brand"], Predicate::Exact("BYD".to_owned()));
        assert_eq!(
            spec.predicates["location"],
            Predicate::Contains("Phnom".to_owned())
        );
        assert_eq!(
            spec.predicates["connector_types"],
            Predicate::Includes("CCS2".to_owned())
        );
        assert_eq!(spec.predicates["availability"], Predicate::Flag(true));
        assert_eq!(
            spec.predicates["price"],
            Predicate::Range {
                min: 10_000.0,
                max: 50_000.0
            }
        );
    }

    #[test]
    fn select_open_ended_ranges() {
        let mut spec = FilterSpec::new();
        spec.select("price", "-300").unwrap();
        assert_eq!(
            spec.predicates["price"],
            Predicate::Range { min: 0.0, max: 300.0 }
        );
        spec.select("rating", "4-").unwrap();
        assert_eq!(
            spec.predicates["rating"],
            Predicate::Range {
                min: 4.0,
                max: f64::INFINITY
            }
        );
        spec.select("year", "2022").unwrap();
        assert_eq!(
            spec.predicates["year"],
            Predicate::Range {
                min: 2022.0,
                max: 2022.0
            }
        );
    }

    #[test]
    fn select_rejects_bad_numbers_and_flags() {
        let mut spec = FilterSpec::new();
        assert!(matches!(
            spec.select("price", "cheap"),
            Err(SearchError::InvalidSelection { ref field, .. }) if field == "price"
        ));
        assert!(spec.select("price", "500-100").is_err());
        assert!(spec.select("featured", "maybe").is_err());
        assert!(spec.predicates.is_empty());
    }

    #[test]
    fn select_rejects_non_finite_bounds() {
        let mut spec = FilterSpec::new();
        for value in ["nan", "inf", "-infinity", "NaN-100", "10-inf"] {
            assert!(
                matches!(
                    spec.select("price", value),
                    Err(SearchError::InvalidSelection { .. })
                ),
                "accepted {value}"
            );
        }
        assert!(spec.predicates.is_empty());
    }

    #[test]
    fn spec_default_detection() {
        let mut spec = FilterSpec::new().with("price", Predicate::any_range());
        assert!(spec.is_default());
        spec.keyword = Some("  ".to_owned());
        assert!(spec.is_default());
        spec.set_range("price", 0.0, 100.0);
        assert!(!spec.is_default());
        assert_eq!(spec.active().count(), 1);
        spec.clear("price");
        assert!(spec.is_default());
    }
}
