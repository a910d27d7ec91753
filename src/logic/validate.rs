//! Declarative field schemas and the coercion of raw form input into typed values.
//!
//! A [`FormSchema`] is a list of [`FieldSpec`]s. Validation walks every field,
//! collects all problems into [`ValidationErrors`] and never touches storage.
//! Keys in the input that the schema does not name are ignored.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FormError;
use crate::model::Id;

/// Raw submission: field name to string, boolean, number, array or null.
pub type RawInput = serde_json::Map<String, Value>;

pub const REQUIRED: &str = "This field is required.";

/// Accepted date input formats, tried in order. `%Y` also takes a two-digit
/// year, so the `%y` form must come first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text { max_length: Option<usize> },
    Email,
    Date,
    Decimal,
    Integer,
    /// Checkbox semantics: never required, empty means `false`.
    Boolean,
    /// Value must equal one of the labels exactly.
    Choice(&'static [&'static str]),
    /// Two-way radio stored as a flag: `Re-Sale` (true) or `Direct Builder` (false).
    ResaleChoice,
    /// Identifiers of existing records, for multi-select fields.
    IdList,
}

impl FieldKind {
    pub fn text(max_length: usize) -> Self {
        FieldKind::Text {
            max_length: Some(max_length),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Coerce `input` against every field. Either all fields clean, or the
    /// complete set of per-field errors is returned.
    pub fn validate(&self, input: &RawInput) -> Result<CleanedData, ValidationErrors> {
        let mut cleaned = CleanedData::default();
        let mut errors = ValidationErrors::default();

        for spec in &self.fields {
            match clean_field(spec, input.get(&spec.name)) {
                Ok(Some(value)) => {
                    cleaned.values.insert(spec.name.clone(), value);
                }
                Ok(None) => {}
                Err(message) => errors.add(&spec.name, message),
            }
        }

        errors.into_result(cleaned)
    }
}

fn clean_field(spec: &FieldSpec, raw: Option<&Value>) -> Result<Option<CleanedValue>, String> {
    if let FieldKind::Boolean = spec.kind {
        return Ok(Some(CleanedValue::Boolean(coerce_bool(raw))));
    }

    let Some(raw) = raw.filter(|v| !is_empty(v)) else {
        return if spec.required {
            Err(REQUIRED.to_string())
        } else {
            Ok(None)
        };
    };

    let value = match &spec.kind {
        FieldKind::Text { max_length } => {
            let text = scalar_text(raw)?;
            if let Some(max) = max_length {
                let len = text.chars().count();
                if len > *max {
                    return Err(format!(
                        "Ensure this value has at most {} characters (it has {}).",
                        max, len
                    ));
                }
            }
            CleanedValue::Text(text)
        }
        FieldKind::Email => {
            let text = scalar_text(raw)?;
            if !looks_like_email(&text) {
                return Err("Enter a valid email address.".to_string());
            }
            CleanedValue::Text(text)
        }
        FieldKind::Date => {
            let text = scalar_text(raw)?;
            let date = DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
                .ok_or_else(|| "Enter a valid date.".to_string())?;
            CleanedValue::Date(date)
        }
        FieldKind::Decimal => {
            let number = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            match number {
                Some(n) if n.is_finite() => CleanedValue::Decimal(n),
                _ => return Err("Enter a number.".to_string()),
            }
        }
        FieldKind::Integer => CleanedValue::Integer(
            coerce_integer(raw).ok_or_else(|| "Enter a whole number.".to_string())?,
        ),
        FieldKind::Boolean => CleanedValue::Boolean(coerce_bool(Some(raw))),
        FieldKind::Choice(labels) => {
            let text = scalar_text(raw)?;
            if !labels.contains(&text.as_str()) {
                return Err(invalid_choice(&text));
            }
            CleanedValue::Text(text)
        }
        FieldKind::ResaleChoice => CleanedValue::Boolean(coerce_resale(raw)?),
        FieldKind::IdList => CleanedValue::Ids(coerce_ids(raw)?),
    };

    Ok(Some(value))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err("Enter a valid value.".to_string()),
    }
}

fn coerce_bool(raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "0" | "off" | "no"
        ),
        Some(_) => true,
    }
}

fn coerce_resale(raw: &Value) -> Result<bool, String> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err(invalid_choice(&n.to_string())),
        },
        Value::String(s) => match s.trim() {
            "true" | "True" | "1" | "Re-Sale" => Ok(true),
            "false" | "False" | "0" | "Direct Builder" => Ok(false),
            other => Err(invalid_choice(other)),
        },
        other => Err(invalid_choice(&other.to_string())),
    }
}

fn coerce_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_ids(raw: &Value) -> Result<Vec<Id>, String> {
    let items: Vec<&Value> = match raw {
        Value::Array(items) => items.iter().collect(),
        Value::Number(_) | Value::String(_) => vec![raw],
        _ => return Err("Enter a list of values.".to_string()),
    };

    items
        .into_iter()
        .map(|item| {
            coerce_integer(item).ok_or_else(|| {
                let shown = scalar_text(item).unwrap_or_else(|_| item.to_string());
                format!("\"{}\" is not a valid value.", shown)
            })
        })
        .collect()
}

fn looks_like_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !text.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

pub fn invalid_choice(value: &str) -> String {
    format!(
        "Select a valid choice. {} is not one of the available choices.",
        value
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CleanedValue {
    Text(String),
    Date(NaiveDate),
    Decimal(f64),
    Integer(i64),
    Boolean(bool),
    Ids(Vec<Id>),
}

/// Typed output of a successful validation. Absent keys are empty optional fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanedData {
    values: BTreeMap<String, CleanedValue>,
}

impl CleanedData {
    pub fn get(&self, name: &str) -> Option<&CleanedValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        match self.values.get(name) {
            Some(CleanedValue::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn require_text(&self, name: &str) -> Result<String, FormError> {
        self.text(name)
            .ok_or_else(|| FormError::MissingField(name.to_string()))
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.values.get(name) {
            Some(CleanedValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn require_date(&self, name: &str) -> Result<NaiveDate, FormError> {
        self.date(name)
            .ok_or_else(|| FormError::MissingField(name.to_string()))
    }

    pub fn decimal(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(CleanedValue::Decimal(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(CleanedValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn require_integer(&self, name: &str) -> Result<i64, FormError> {
        self.integer(name)
            .ok_or_else(|| FormError::MissingField(name.to_string()))
    }

    pub fn boolean(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(CleanedValue::Boolean(true)))
    }

    pub fn ids(&self, name: &str) -> Vec<Id> {
        match self.values.get(name) {
            Some(CleanedValue::Ids(ids)) => ids.clone(),
            _ => Vec::new(),
        }
    }

    /// Parse a choice label into its enum.
    pub fn choice<T: FromStr>(&self, name: &str) -> Result<Option<T>, FormError> {
        self.text(name)
            .map(|label| {
                label.parse::<T>().map_err(|_| FormError::Invalid(
                    ValidationErrors::single(name, invalid_choice(&label)),
                ))
            })
            .transpose()
    }

    pub fn require_choice<T: FromStr>(&self, name: &str) -> Result<T, FormError> {
        self.choice(name)?
            .ok_or_else(|| FormError::MissingField(name.to_string()))
    }
}

/// Per-field error messages, serialized as `{ field: [message, ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> RawInput {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::required("name", FieldKind::text(10)))
            .field(FieldSpec::optional("note", FieldKind::Text { max_length: None }))
            .field(FieldSpec::required("rooms", FieldKind::Choice(&["1", "2", "3+"])))
            .field(FieldSpec::optional("when", FieldKind::Date))
            .field(FieldSpec::optional("cost", FieldKind::Decimal))
            .field(FieldSpec::optional("year", FieldKind::Integer))
            .field(FieldSpec::optional("flag", FieldKind::Boolean))
            .field(FieldSpec::optional("email", FieldKind::Email))
    }

    #[test]
    fn valid_input_is_coerced_and_unknown_keys_ignored() {
        let cleaned = schema()
            .validate(&input(json!({
                "name": "  Jane ",
                "rooms": 2,
                "when": "03/14/2021",
                "cost": "1250000.50",
                "year": "2021",
                "flag": "on",
                "email": "jane@example.com",
                "unexpected": [1, 2, 3]
            })))
            .unwrap();

        assert_eq!(cleaned.text("name").as_deref(), Some("Jane"));
        assert_eq!(cleaned.text("rooms").as_deref(), Some("2"));
        assert_eq!(cleaned.date("when"), NaiveDate::from_ymd_opt(2021, 3, 14));
        assert_eq!(cleaned.decimal("cost"), Some(1_250_000.5));
        assert_eq!(cleaned.integer("year"), Some(2021));
        assert!(cleaned.boolean("flag"));
        assert!(cleaned.get("unexpected").is_none());
    }

    #[test]
    fn optional_blanks_validate_as_absent() {
        let cleaned = schema()
            .validate(&input(json!({
                "name": "Jane",
                "rooms": "3+",
                "note": "   ",
                "when": null,
                "email": ""
            })))
            .unwrap();

        assert!(cleaned.text("note").is_none());
        assert!(cleaned.date("when").is_none());
        assert!(cleaned.text("email").is_none());
        assert!(!cleaned.boolean("flag"));
    }

    #[test]
    fn errors_are_collected_per_field() {
        let errors = schema()
            .validate(&input(json!({
                "name": "far too long a name",
                "rooms": "4",
                "when": "2021-13-40",
                "cost": "lots",
                "year": "20.5",
                "email": "not-an-email"
            })))
            .unwrap_err();

        assert_eq!(
            errors.get("name").unwrap(),
            ["Ensure this value has at most 10 characters (it has 19)."]
        );
        assert_eq!(
            errors.get("rooms").unwrap(),
            ["Select a valid choice. 4 is not one of the available choices."]
        );
        assert_eq!(errors.get("when").unwrap(), ["Enter a valid date."]);
        assert_eq!(errors.get("cost").unwrap(), ["Enter a number."]);
        assert_eq!(errors.get("year").unwrap(), ["Enter a whole number."]);
        assert_eq!(errors.get("email").unwrap(), ["Enter a valid email address."]);
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let errors = schema().validate(&RawInput::new()).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name", "rooms"]);
        assert_eq!(errors.get("name").unwrap(), [REQUIRED]);
    }

    #[test]
    fn resale_choice_accepts_flags_and_labels() {
        let schema = FormSchema::new().field(FieldSpec::optional("is_resale", FieldKind::ResaleChoice));

        for (raw, expected) in [
            (json!(true), true),
            (json!("Re-Sale"), true),
            (json!("False"), false),
            (json!("Direct Builder"), false),
            (json!(1), true),
            (json!(0), false),
            (json!("0"), false),
        ] {
            let cleaned = schema.validate(&input(json!({ "is_resale": raw }))).unwrap();
            assert_eq!(cleaned.boolean("is_resale"), expected);
        }

        assert!(schema
            .validate(&input(json!({ "is_resale": "maybe" })))
            .is_err());
        assert!(schema.validate(&input(json!({ "is_resale": 2 }))).is_err());
    }

    #[test]
    fn two_digit_years_land_in_the_current_century() {
        let schema = FormSchema::new().field(FieldSpec::required("when", FieldKind::Date));

        for (raw, expected) in [
            ("03/14/21", NaiveDate::from_ymd_opt(2021, 3, 14)),
            ("03/14/2021", NaiveDate::from_ymd_opt(2021, 3, 14)),
            ("2021-03-14", NaiveDate::from_ymd_opt(2021, 3, 14)),
        ] {
            let cleaned = schema.validate(&input(json!({ "when": raw }))).unwrap();
            assert_eq!(cleaned.date("when"), expected, "{}", raw);
        }
    }

    #[test]
    fn id_lists_accept_arrays_and_single_values() {
        let schema = FormSchema::new().field(FieldSpec::optional("bank", FieldKind::IdList));

        let cleaned = schema.validate(&input(json!({ "bank": [1, "2"] }))).unwrap();
        assert_eq!(cleaned.ids("bank"), vec![1, 2]);

        let cleaned = schema.validate(&input(json!({ "bank": "7" }))).unwrap();
        assert_eq!(cleaned.ids("bank"), vec![7]);

        let errors = schema
            .validate(&input(json!({ "bank": ["x"] })))
            .unwrap_err();
        assert_eq!(errors.get("bank").unwrap(), ["\"x\" is not a valid value."]);
    }

    #[test]
    fn validation_errors_serialize_as_field_map() {
        let errors = ValidationErrors::single("new_bank", REQUIRED);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({ "new_bank": [REQUIRED] })
        );
    }
}
