//! Create and edit rule sets for comic-book payloads.
//!
//! Bodies are checked field by field in schema order and the first violation
//! is reported. A field counts as supplied when its key is present, whatever
//! its value, so `"price": 0` is validated (and rejected) rather than ignored.

use std::fmt;

use chrono::{Datelike, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use super::models::{ComicPatch, Condition, NewComic};

pub const NAME: &str = "name";
pub const AUTHOR: &str = "author";
pub const YEAR_OF_PUBLICATION: &str = "yearOfPublication";
pub const PRICE: &str = "price";
pub const DISCOUNT: &str = "discount";
pub const NUMBER_OF_PAGES: &str = "numberOfPages";
pub const CONDITION: &str = "condition";
pub const DESCRIPTION: &str = "description";

/// Every key a create or edit body may carry, in schema order.
pub const FIELDS: [&str; 8] = [
    NAME,
    AUTHOR,
    YEAR_OF_PUBLICATION,
    PRICE,
    DISCOUNT,
    NUMBER_OF_PAGES,
    CONDITION,
    DESCRIPTION,
];

pub const MIN_YEAR: i32 = 1000;

/// The constraint a field value broke.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    String,
    NotEmpty,
    Number,
    Integer,
    Positive,
    Min(f64),
    Max(f64),
    OneOf(&'static [&'static str]),
}

impl Rule {
    /// Short machine-readable name used in error details.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::String => "string",
            Rule::NotEmpty => "not_empty",
            Rule::Number => "number",
            Rule::Integer => "integer",
            Rule::Positive => "positive",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::OneOf(_) => "one_of",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::String => f.write_str("must be a string"),
            Rule::NotEmpty => f.write_str("is not allowed to be empty"),
            Rule::Number => f.write_str("must be a number"),
            Rule::Integer => f.write_str("must be an integer"),
            Rule::Positive => f.write_str("must be a positive number"),
            Rule::Min(limit) => write!(f, "must be greater than or equal to {}", limit),
            Rule::Max(limit) => write!(f, "must be less than or equal to {}", limit),
            Rule::OneOf(values) => write!(f, "must be one of [{}]", values.join(", ")),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("request body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("\"value\" must be of type object")]
    NotAnObject,

    #[error("\"{0}\" is required")]
    Required(&'static str),

    #[error("\"{0}\" is not allowed")]
    UnknownField(String),

    #[error("\"{field}\" {rule}")]
    Invalid { field: &'static str, rule: Rule },

    #[error("Please provide at least one field to update")]
    NoFieldsProvided,
}

impl ValidationError {
    fn invalid(field: &'static str, rule: Rule) -> Self {
        ValidationError::Invalid { field, rule }
    }

    /// The offending field, when the error concerns a single one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::Required(field) => Some(field),
            ValidationError::UnknownField(field) => Some(field),
            ValidationError::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Machine-readable name of the broken rule, when there is one.
    pub fn rule(&self) -> Option<&'static str> {
        match self {
            ValidationError::Required(_) => Some("required"),
            ValidationError::UnknownField(_) => Some("unknown"),
            ValidationError::Invalid { rule, .. } => Some(rule.name()),
            _ => None,
        }
    }
}

/// Bounds that depend on when validation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    max_year: i32,
}

impl ValidationRules {
    /// Rules for the current UTC calendar year.
    pub fn current() -> Self {
        Self::with_max_year(Utc::now().year())
    }

    pub fn with_max_year(max_year: i32) -> Self {
        Self { max_year }
    }

    pub fn max_year(&self) -> i32 {
        self.max_year
    }
}

/// Validate a create body. All required fields must be present.
pub fn validate_create(body: &[u8], rules: &ValidationRules) -> Result<NewComic, ValidationError> {
    let object = parse_object(body)?;
    let reader = FieldReader::new(&object);

    let name = reader.text(NAME, false)?.ok_or(ValidationError::Required(NAME))?;
    let author = reader
        .text(AUTHOR, false)?
        .ok_or(ValidationError::Required(AUTHOR))?;
    let year_of_publication = reader
        .year(rules)?
        .ok_or(ValidationError::Required(YEAR_OF_PUBLICATION))?;
    let price = reader.price()?.ok_or(ValidationError::Required(PRICE))?;
    let discount = reader.discount()?.unwrap_or(0.0);
    let number_of_pages = reader
        .pages()?
        .ok_or(ValidationError::Required(NUMBER_OF_PAGES))?;
    let condition = reader
        .condition()?
        .ok_or(ValidationError::Required(CONDITION))?;
    let description = reader.text(DESCRIPTION, true)?.unwrap_or_default();
    reader.reject_unknown()?;

    Ok(NewComic {
        name,
        author,
        year_of_publication,
        price,
        discount,
        number_of_pages,
        condition,
        description,
    })
}

/// Validate an edit body. Fields are individually optional but at least one
/// recognised key must be supplied.
pub fn validate_edit(body: &[u8], rules: &ValidationRules) -> Result<ComicPatch, ValidationError> {
    let object = parse_object(body)?;
    let reader = FieldReader::new(&object);

    let patch = ComicPatch {
        name: reader.text(NAME, false)?,
        author: reader.text(AUTHOR, false)?,
        year_of_publication: reader.year(rules)?,
        price: reader.price()?,
        discount: reader.discount()?,
        number_of_pages: reader.pages()?,
        condition: reader.condition()?,
        description: reader.text(DESCRIPTION, true)?,
    };
    reader.reject_unknown()?;

    if patch.is_empty() {
        return Err(ValidationError::NoFieldsProvided);
    }

    Ok(patch)
}

/// An empty body is read as `{}`.
fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ValidationError::NotAnObject),
        Err(e) => Err(ValidationError::MalformedBody(e.to_string())),
    }
}

struct FieldReader<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self { object }
    }

    fn text(&self, field: &'static str, allow_empty: bool) -> Result<Option<String>, ValidationError> {
        match self.object.get(field) {
            None => Ok(None),
            Some(Value::String(value)) => {
                let trimmed = value.trim();
                if trimmed.is_empty() && !allow_empty {
                    return Err(ValidationError::invalid(field, Rule::NotEmpty));
                }
                Ok(Some(trimmed.to_string()))
            }
            Some(_) => Err(ValidationError::invalid(field, Rule::String)),
        }
    }

    fn number(&self, field: &'static str) -> Result<Option<f64>, ValidationError> {
        match self.object.get(field) {
            None => Ok(None),
            Some(Value::Number(number)) => number
                .as_f64()
                .filter(|value| value.is_finite())
                .map(Some)
                .ok_or(ValidationError::invalid(field, Rule::Number)),
            // Numeric strings are coerced, then held to the same rules.
            Some(Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Some)
                .ok_or(ValidationError::invalid(field, Rule::Number)),
            Some(_) => Err(ValidationError::invalid(field, Rule::Number)),
        }
    }

    fn integer(&self, field: &'static str) -> Result<Option<f64>, ValidationError> {
        match self.number(field)? {
            Some(value) if value.fract() != 0.0 => {
                Err(ValidationError::invalid(field, Rule::Integer))
            }
            other => Ok(other),
        }
    }

    fn year(&self, rules: &ValidationRules) -> Result<Option<i32>, ValidationError> {
        let Some(year) = self.integer(YEAR_OF_PUBLICATION)? else {
            return Ok(None);
        };
        if year < f64::from(MIN_YEAR) {
            return Err(ValidationError::invalid(
                YEAR_OF_PUBLICATION,
                Rule::Min(f64::from(MIN_YEAR)),
            ));
        }
        if year > f64::from(rules.max_year()) {
            return Err(ValidationError::invalid(
                YEAR_OF_PUBLICATION,
                Rule::Max(f64::from(rules.max_year())),
            ));
        }
        // Bounds checked above, the cast is exact.
        Ok(Some(year as i32))
    }

    fn price(&self) -> Result<Option<f64>, ValidationError> {
        match self.number(PRICE)? {
            Some(price) if price <= 0.0 => Err(ValidationError::invalid(PRICE, Rule::Positive)),
            other => Ok(other),
        }
    }

    fn discount(&self) -> Result<Option<f64>, ValidationError> {
        match self.number(DISCOUNT)? {
            Some(discount) if discount < 0.0 => {
                Err(ValidationError::invalid(DISCOUNT, Rule::Min(0.0)))
            }
            other => Ok(other),
        }
    }

    fn pages(&self) -> Result<Option<i64>, ValidationError> {
        match self.integer(NUMBER_OF_PAGES)? {
            None => Ok(None),
            Some(pages) if pages <= 0.0 => {
                Err(ValidationError::invalid(NUMBER_OF_PAGES, Rule::Positive))
            }
            Some(pages) if pages > i64::MAX as f64 => Err(ValidationError::invalid(
                NUMBER_OF_PAGES,
                Rule::Max(i64::MAX as f64),
            )),
            Some(pages) => Ok(Some(pages as i64)),
        }
    }

    fn condition(&self) -> Result<Option<Condition>, ValidationError> {
        match self.object.get(CONDITION) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .and_then(Condition::parse)
                .map(Some)
                .ok_or(ValidationError::invalid(
                    CONDITION,
                    Rule::OneOf(Condition::VALUES),
                )),
        }
    }

    fn reject_unknown(&self) -> Result<(), ValidationError> {
        match self.object.keys().find(|key| !FIELDS.contains(&key.as_str())) {
            Some(key) => Err(ValidationError::UnknownField(key.clone())),
            None => Ok(()),
        }
    }
}
