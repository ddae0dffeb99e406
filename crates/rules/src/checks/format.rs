//! Named string formats and date/time parsing.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use super::{CheckResult, Declared, Subject, kind};
use crate::directive::{DataType, StringFormat};

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("built-in format pattern compiles")
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?i)^[A-Z0-9_'%=+!`#~$*?^{}&|\-]+(?:\.[A-Z0-9_'%=+!`#~$*?^{}&|\-]+)*@[A-Z0-9-]+(?:\.[A-Z0-9-]+)+$",
    )
});

// `(?!www)` needs lookahead
static URL: LazyLock<fancy_regex::Regex> = LazyLock::new(|| {
    fancy_regex::Regex::new(
        r"^(https?://(?:www\.|(?!www))[a-zA-Z0-9][a-zA-Z0-9-]+[a-zA-Z0-9]\.[^\s]{2,}|www\.[a-zA-Z0-9][a-zA-Z0-9-]+[a-zA-Z0-9]\.[^\s]{2,}|https?://(?:www\.|(?!www))[a-zA-Z0-9]+\.[^\s]{2,}|www\.[a-zA-Z0-9]+\.[^\s]{2,})$",
    )
    .expect("built-in url pattern compiles")
});

static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"^[a-zA-Z0-9][a-zA-Z0-9_-]{0,61}[a-zA-Z0-9]?\.(?:[a-zA-Z]{1,6}|[a-zA-Z0-9-]{1,30}\.[a-zA-Z]{2,3})$",
    )
});

static NAME: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^[a-zA-Z,.'-]+(?:\s+[a-zA-Z,.'-]+)*$"));

static FULL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^[a-zA-Z]{2,}\s[a-zA-Z]+'?-?[a-zA-Z]{2,}\s?(?:[a-zA-Z]+)?$")
});

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^[A-Za-z0-9][A-Za-z0-9_.]{6,18}[A-Za-z0-9]$"));

// two separators in a row
static USERNAME_RUN: LazyLock<Regex> = LazyLock::new(|| pattern(r"[._]{2}"));

static ALPHA: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[A-Za-z]+$"));

static ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[A-Za-z0-9]+$"));

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^(?:\+[0-9]{1,3}\s?)?(?:\([0-9]+\))?(?:[0-9]+\s?)+(?:[0-9]{1,4})$")
});

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
});

static MONGO_ID: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[0-9a-fA-F]{24}$"));

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(concat!(
        r"^[0-9]{4}",
        r"(?:-?(?:0[1-9]|1[0-2])(?:-?(?:[12][0-9]|0[1-9]|3[01]))?|(?:-?(?:[12][0-9]|0[1-9]|3[01]))?-(?:0[1-9]|1[0-2]))",
        r"(?:[T ][0-9]{2}:[0-5][0-9]:[0-5][0-9](?:\.[0-9]{1,4})?)?",
        r"(?:Z|[+-](?:[01][0-9]|2[0-3])(?::?[0-5][0-9])?)?$",
    ))
});

static DATE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^[0-9]{4}-(?:0[1-9]|1[0-2])-(?:[12][0-9]|0[1-9]|3[01])$"));

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^(?:[01][0-9]|2[0-3]):[0-5][0-9](?::[0-5][0-9])?(?:\.[0-9]{1,4})?$")
});

static IP: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])$",
    )
});

/// Returns `true` when `text` has the given format.
pub(crate) fn matches(format: StringFormat, text: &str) -> bool {
    match format {
        StringFormat::Email => EMAIL.is_match(text),
        // exceeding the backtrack limit counts as a mismatch
        StringFormat::Url => URL.is_match(text).unwrap_or(false),
        StringFormat::Domain => DOMAIN.is_match(text),
        StringFormat::Name => NAME.is_match(text),
        StringFormat::FullName => FULL_NAME.is_match(text),
        StringFormat::Username => USERNAME.is_match(text) && !USERNAME_RUN.is_match(text),
        StringFormat::Alpha => ALPHA.is_match(text),
        StringFormat::Alphanumeric => ALPHANUMERIC.is_match(text),
        StringFormat::Phone => PHONE.is_match(text),
        StringFormat::Uuid => UUID.is_match(text),
        StringFormat::MongoId => MONGO_ID.is_match(text),
        StringFormat::Date => DATE.is_match(text),
        StringFormat::DateOnly => DATE_ONLY.is_match(text),
        StringFormat::Time => TIME.is_match(text),
        StringFormat::Lower => !text.chars().any(char::is_uppercase),
        StringFormat::Upper => !text.chars().any(char::is_lowercase),
        StringFormat::Ip => IP.is_match(text),
    }
}

fn predicate(format: StringFormat) -> &'static str {
    match format {
        StringFormat::Email => "must be a valid email",
        StringFormat::Url => "must be a valid url",
        StringFormat::Domain => "must be a valid domain",
        StringFormat::Name => "must be a valid name",
        StringFormat::FullName => "must be a valid full name",
        StringFormat::Username => "must be a valid username",
        StringFormat::Alpha => "must be a valid alpha",
        StringFormat::Alphanumeric => "must be a valid alphanumeric",
        StringFormat::Phone => "must be a valid phone",
        StringFormat::Uuid => "must be a valid uuid",
        StringFormat::MongoId => "must be a valid mongodb id",
        StringFormat::Date | StringFormat::DateOnly => "must be a valid date",
        StringFormat::Time => "must be a valid time",
        StringFormat::Lower => "must not contains upper case letters",
        StringFormat::Upper => "must not contains lower case letters",
        StringFormat::Ip => "must be a valid ip address",
    }
}

/// Requires a string, then the named format.
pub(crate) fn check(format: StringFormat, subject: Subject<'_>, declared: &Declared) -> CheckResult {
    kind::check(DataType::String, subject, declared)?;
    let Some(text) = subject.value.as_str() else {
        return Ok(());
    };

    if matches(format, text) {
        Ok(())
    } else {
        Err(subject.fail(predicate(format)))
    }
}

/// Parses a date or date-time into milliseconds since the Unix epoch.
///
/// Accepts RFC 3339 (`2024-01-31T10:00:00+05:30`), offset-less date-times
/// with `T` or a space as separator, and plain `YYYY-MM-DD` dates.
/// Offset-less forms are read as UTC.
pub(crate) fn parse_instant(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.timestamp_millis());
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(at.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc().timestamp_millis())
}
