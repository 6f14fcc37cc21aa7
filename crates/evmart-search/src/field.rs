use serde::Serialize;

/// How a field is matched when a raw selection arrives for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Inclusive numeric range.
    Numeric,
    /// Case-insensitive exact match.
    Categorical,
    /// Case-insensitive substring match.
    FreeText,
    /// Case-insensitive membership in a list.
    List,
    /// Boolean equality.
    Flag,
}

/// A single projected field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl FieldValue {
    /// Wraps an optional string, treating blank text as absent.
    #[must_use]
    pub fn text(value: Option<&str>) -> Option<Self> {
        value
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| FieldValue::Text(s.to_owned()))
    }

    #[must_use]
    pub fn number(value: Option<f64>) -> Option<Self> {
        value.filter(|n| n.is_finite()).map(FieldValue::Number)
    }

    /// Display forms used for distinct-value listings.
    #[must_use]
    pub fn display_values(&self) -> Vec<String> {
        match self {
            FieldValue::Number(n) => vec![n.to_string()],
            FieldValue::Text(s) => vec![s.clone()],
            FieldValue::List(items) => items.clone(),
            FieldValue::Flag(b) => vec![b.to_string()],
        }
    }
}

/// Field projection used by the filter engine.
///
/// Field names are snake_case and shared across kinds where the meaning
/// matches (`price`, `rating`, `location`, ...). Unknown names return `None`.
pub trait Filterable {
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Free-text fields searched by a keyword query.
    fn keyword_fields(&self) -> &'static [&'static str];
}

/// Classifies a field name for [`crate::FilterSpec::select`].
///
/// Names that are not recognised fall back to free-text matching.
#[must_use]
pub fn classify(field: &str) -> FieldKind {
    match field {
        "id" | "price" | "year" | "rating" | "power" | "review_count" | "weight" => {
            FieldKind::Numeric
        }
        "brand" | "category" | "color" | "condition" | "currency" | "type" | "service"
        | "sku" => FieldKind::Categorical,
        "connector_types" | "compatible_models" => FieldKind::List,
        "availability" | "featured" => FieldKind::Flag,
        _ => FieldKind::FreeText,
    }
}
