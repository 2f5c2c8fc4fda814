//! Validation of untrusted movie input.
//!
//! Input is deserialized into [`MovieInput`], where every field is optional
//! and captures values of a wrong JSON type instead of failing the whole
//! document. Numbers may also be given as numeric strings and titles are
//! trimmed. Field rules are then checked with `garde` against an explicit
//! [`ValidationContext`], so the outcome depends only on input and context.
//! Failures are collected per field into [`ValidationErrors`].

use std::{collections::BTreeMap, fmt::Display};

use garde::Validate;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{DeserializeOwned, Error as _},
};
use serde_json::{Number, Value};
use time::{Date, Duration, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    genre::Genre,
    movie::{CreateMovie, Movie},
};

pub const TITLE_PREFIX: &str = "Movie-";
pub const TITLE_MIN_LENGTH: usize = 8;
pub const TITLE_MAX_LENGTH: usize = 100;
pub const DURATION_MIN: i64 = 1;
pub const DURATION_MAX: i64 = 600;
pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 10.0;
/// 30 years of 365 days, leap days are not accounted for
pub const MAX_RELEASE_AGE_DAYS: i64 = 30 * 365;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month padding:none]-[day padding:none]");

pub mod messages {
    pub const NON_FIELD_ERRORS: &str = "non_field_errors";
    pub const NOT_AN_OBJECT: &str = "Invalid data. Expected a dictionary.";

    pub const TITLE_REQUIRED: &str = "The title field is required.";
    pub const TITLE_NOT_STRING: &str = "Not a valid string.";
    pub const TITLE_TOO_SHORT: &str = "The title must have a minimum of 8 characters.";
    pub const TITLE_TOO_LONG: &str = "The title can have a maximum of 100 characters.";
    pub const TITLE_PREFIX_MISSING: &str = "Title must start with \"Movie-\".";
    pub const TITLE_DUPLICATE: &str = "Movie with this title already exists.";

    pub const RELEASE_DATE_REQUIRED: &str = "The release date field is required.";
    pub const RELEASE_DATE_INVALID: &str = "Invalid release date format.";
    pub const RELEASE_DATE_FUTURE: &str = "Release date cannot be in the future.";
    pub const RELEASE_DATE_TOO_OLD: &str = "Release date should be within the last 30 years.";

    pub const GENRE_REQUIRED: &str = "The genre field is required.";
    pub const GENRE_INVALID: &str = "Invalid genre choice.";

    pub const DURATION_REQUIRED: &str = "The duration minutes field is required.";
    pub const DURATION_INVALID: &str = "A valid integer is required.";
    pub const DURATION_TOO_SHORT: &str = "The duration must be at least 1 minute.";
    pub const DURATION_TOO_LONG: &str = "The duration cannot exceed 600 minutes (10 hours).";

    pub const RATING_INVALID: &str = "Invalid rating value.";
    pub const RATING_TOO_LOW: &str = "The rating cannot be lower than 0.0.";
    pub const RATING_TOO_HIGH: &str = "The rating cannot exceed 10.0.";
}

use messages::*;

/// Field value which keeps the raw JSON when it cannot be read as `T`
#[derive(Debug, Clone, PartialEq)]
pub enum Lenient<T> {
    Valid(T),
    Invalid(Value),
}

impl<T> Lenient<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            Lenient::Valid(v) => Some(v),
            Lenient::Invalid(_) => None,
        }
    }

    pub fn into_valid(self) -> Option<T> {
        match self {
            Lenient::Valid(v) => Some(v),
            Lenient::Invalid(_) => None,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match T::deserialize(&value) {
            Ok(v) => Lenient::Valid(v),
            Err(_) => Lenient::Invalid(value),
        })
    }
}

/// Distinguishes explicit `null` from a missing key, use with `#[serde(default)]`
fn explicit<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Whole number from a JSON number or numeric string.
///
/// Integral floats (`1e3`, `"136.0"`) are accepted, values outside of `i64`
/// saturate to its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integer(pub i64);

fn integer_from_number(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        Some(i)
    } else if n.is_u64() {
        Some(i64::MAX)
    } else {
        // float to int casts saturate
        n.as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    }
}

fn integer_from_str(s: &str) -> Option<i64> {
    let s = s.trim();
    let s = match s.split_once('.') {
        Some((whole, fraction)) if fraction.bytes().all(|b| b == b'0') => whole,
        Some(_) => return None,
        None => s,
    };
    let (negative, digits) = match s.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number = match digits.parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    };
    Some(number)
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let number = match &value {
            Value::Number(n) => integer_from_number(n),
            Value::String(s) => integer_from_str(s),
            _ => None,
        };
        number
            .map(Integer)
            .ok_or_else(|| D::Error::custom(format!("not an integer: {value}")))
    }
}

/// Finite float from a JSON number or numeric string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Real(pub f64);

impl<'de> Deserialize<'de> for Real {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let number = match &value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number
            .filter(|f| f.is_finite())
            .map(Real)
            .ok_or_else(|| D::Error::custom(format!("not a number: {value}")))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    /// Evaluation date, release date bounds are relative to it
    pub today: Date,
    /// Missing fields are accepted, used for partial updates
    pub partial: bool,
}

impl ValidationContext {
    pub fn new(today: Date) -> Self {
        Self {
            today,
            partial: false,
        }
    }

    pub fn partial(today: Date) -> Self {
        Self {
            today,
            partial: true,
        }
    }

    pub fn oldest_release_date(&self) -> Option<Date> {
        self.today
            .checked_sub(Duration::days(MAX_RELEASE_AGE_DAYS))
    }
}

type Field<T> = Option<Lenient<T>>;

fn present<T>(value: &Field<T>) -> Option<&T> {
    value.as_ref().and_then(Lenient::valid)
}

fn required<T>(
    message: &'static str,
) -> impl FnOnce(&Option<T>, &ValidationContext) -> garde::Result {
    move |value, ctx| {
        if value.is_none() && !ctx.partial {
            Err(garde::Error::new(message))
        } else {
            Ok(())
        }
    }
}

fn well_typed<T>(
    message: &'static str,
) -> impl FnOnce(&Field<T>, &ValidationContext) -> garde::Result {
    move |value, _ctx| match value {
        Some(Lenient::Invalid(_)) => Err(garde::Error::new(message)),
        _ => Ok(()),
    }
}

fn trimmed_title(value: &Field<String>) -> Option<&str> {
    present(value).map(|t| t.trim())
}

fn title_length(value: &Field<String>, _ctx: &ValidationContext) -> garde::Result {
    match trimmed_title(value).map(|t| t.chars().count()) {
        Some(len) if len < TITLE_MIN_LENGTH => Err(garde::Error::new(TITLE_TOO_SHORT)),
        Some(len) if len > TITLE_MAX_LENGTH => Err(garde::Error::new(TITLE_TOO_LONG)),
        _ => Ok(()),
    }
}

fn title_prefix(value: &Field<String>, _ctx: &ValidationContext) -> garde::Result {
    match trimmed_title(value) {
        Some(title) if !title.starts_with(TITLE_PREFIX) => {
            Err(garde::Error::new(TITLE_PREFIX_MISSING))
        }
        _ => Ok(()),
    }
}

fn parse_date(s: &str) -> Option<Date> {
    Date::parse(s, DATE_FORMAT).ok()
}

fn date_format(value: &Field<String>, _ctx: &ValidationContext) -> garde::Result {
    match value {
        Some(Lenient::Valid(s)) if parse_date(s).is_some() => Ok(()),
        Some(_) => Err(garde::Error::new(RELEASE_DATE_INVALID)),
        None => Ok(()),
    }
}

fn release_date_bounds(value: &Field<String>, ctx: &ValidationContext) -> garde::Result {
    let Some(date) = present(value).and_then(|s| parse_date(s)) else {
        return Ok(());
    };
    if date > ctx.today {
        return Err(garde::Error::new(RELEASE_DATE_FUTURE));
    }
    match ctx.oldest_release_date() {
        Some(oldest) if date < oldest => Err(garde::Error::new(RELEASE_DATE_TOO_OLD)),
        _ => Ok(()),
    }
}

fn duration_range(value: &Field<Integer>, _ctx: &ValidationContext) -> garde::Result {
    match present(value) {
        Some(&Integer(d)) if d < DURATION_MIN => Err(garde::Error::new(DURATION_TOO_SHORT)),
        Some(&Integer(d)) if d > DURATION_MAX => Err(garde::Error::new(DURATION_TOO_LONG)),
        _ => Ok(()),
    }
}

fn rating_range(value: &Field<Option<Real>>, _ctx: &ValidationContext) -> garde::Result {
    match present(value).copied().flatten() {
        Some(Real(r)) if r < RATING_MIN => Err(garde::Error::new(RATING_TOO_LOW)),
        Some(Real(r)) if r > RATING_MAX => Err(garde::Error::new(RATING_TOO_HIGH)),
        _ => Ok(()),
    }
}

/// Raw movie as received from client, unknown fields are ignored.
///
/// `rating` keeps an explicit `null` apart from a missing key, so a partial
/// update can clear it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[garde(context(ValidationContext))]
pub struct MovieInput {
    #[garde(
        custom(required(TITLE_REQUIRED)),
        custom(well_typed(TITLE_NOT_STRING)),
        custom(title_length),
        custom(title_prefix)
    )]
    pub title: Field<String>,

    #[garde(
        custom(required(RELEASE_DATE_REQUIRED)),
        custom(date_format),
        custom(release_date_bounds)
    )]
    pub release_date: Field<String>,

    #[garde(custom(required(GENRE_REQUIRED)), custom(well_typed(GENRE_INVALID)))]
    pub genre: Field<Genre>,

    #[garde(
        custom(required(DURATION_REQUIRED)),
        custom(well_typed(DURATION_INVALID)),
        custom(duration_range)
    )]
    pub duration_minutes: Field<Integer>,

    #[serde(default, deserialize_with = "explicit")]
    #[garde(custom(well_typed(RATING_INVALID)), custom(rating_range))]
    pub rating: Field<Option<Real>>,
}

impl MovieInput {
    /// Reads input from a JSON document, which must be an object
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationErrors> {
        if !value.is_object() {
            return Err(ValidationErrors::single(NON_FIELD_ERRORS, NOT_AN_OBJECT));
        }
        serde_json::from_value(value)
            .map_err(|e| ValidationErrors::single(NON_FIELD_ERRORS, e.to_string()))
    }

    /// Validates complete movie, as needed for create or replace
    pub fn validate_create(self, today: Date) -> Result<CreateMovie, ValidationErrors> {
        self.validate_with(&ValidationContext::new(today))?;
        MoviePatch::from_validated(self).into_create()
    }

    /// Validates only fields present in input
    pub fn validate_partial(self, today: Date) -> Result<MoviePatch, ValidationErrors> {
        self.validate_with(&ValidationContext::partial(today))?;
        Ok(MoviePatch::from_validated(self))
    }
}

/// Validated subset of movie fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub release_date: Option<Date>,
    pub genre: Option<Genre>,
    pub duration_minutes: Option<i64>,
    /// `Some(None)` clears stored rating
    pub rating: Option<Option<f64>>,
}

impl MoviePatch {
    /// Projects input which already passed validation, so no invalid values remain
    fn from_validated(input: MovieInput) -> Self {
        MoviePatch {
            title: trimmed_title(&input.title).map(str::to_string),
            release_date: present(&input.release_date).and_then(|s| parse_date(s)),
            genre: present(&input.genre).copied(),
            duration_minutes: present(&input.duration_minutes).map(|d| d.0),
            rating: input
                .rating
                .and_then(Lenient::into_valid)
                .map(|r| r.map(|Real(r)| r)),
        }
    }

    pub fn into_create(self) -> Result<CreateMovie, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.is_none() {
            errors.add("title", TITLE_REQUIRED);
        }
        if self.release_date.is_none() {
            errors.add("release_date", RELEASE_DATE_REQUIRED);
        }
        if self.genre.is_none() {
            errors.add("genre", GENRE_REQUIRED);
        }
        if self.duration_minutes.is_none() {
            errors.add("duration_minutes", DURATION_REQUIRED);
        }

        match (self.title, self.release_date, self.genre, self.duration_minutes) {
            (Some(title), Some(release_date), Some(genre), Some(duration_minutes)) => {
                Ok(CreateMovie {
                    title,
                    release_date,
                    genre,
                    duration_minutes,
                    rating: self.rating.flatten(),
                })
            }
            _ => Err(errors),
        }
    }

    /// Overlays present fields over an existing record
    pub fn apply(self, existing: Movie) -> CreateMovie {
        CreateMovie {
            title: self.title.unwrap_or(existing.title),
            release_date: self.release_date.unwrap_or(existing.release_date),
            genre: self.genre.unwrap_or(existing.genre),
            duration_minutes: self.duration_minutes.unwrap_or(existing.duration_minutes),
            rating: self.rating.unwrap_or(existing.rating),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &MoviePatch::default()
    }
}

/// Validation failures, messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str, message: &str) -> bool {
        self.get(field)
            .map(|msgs| msgs.iter().any(|m| m == message))
            .unwrap_or(false)
    }

}

impl From<garde::Report> for ValidationErrors {
    fn from(report: garde::Report) -> Self {
        let mut errors = ValidationErrors::new();
        for (path, error) in report.iter() {
            errors.add(path.to_string(), error.message());
        }
        errors
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
