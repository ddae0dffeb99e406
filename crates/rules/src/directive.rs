//! Directive compilation.
//!
//! A rule such as `"string|natural|min:100|field:limit"` is split into
//! tokens and every token is parsed once into a [`Directive`]. Parameters
//! are checked here: numeric arguments are parsed, date bounds resolved and
//! `regex:` payloads compiled, so evaluation never re-reads rule text.
//!
//! # Examples
//!
//! ```
//! use nebula_rules::directive::{Check, DataType, Directive, FieldRules};
//! use nebula_rules::Rule;
//!
//! let rules = FieldRules::compile("age", &Rule::from("number|field:years")).unwrap();
//! assert_eq!(rules.directives[0], Directive::Check(Check::Kind(DataType::Number)));
//! assert_eq!(rules.alias.as_deref(), Some("years"));
//! ```

use std::fmt;

use crate::checks::format::parse_instant;
use crate::error::RuleError;
use crate::rule::Rule;
use crate::value::parse_number;

// ============================================================================
// DIRECTIVE TYPES
// ============================================================================

/// Primitive kinds a value can be asserted to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    BigInt,
    Symbol,
}

impl DataType {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            "bigint" => Self::BigInt,
            "symbol" => Self::Symbol,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::BigInt => "bigint",
            Self::Symbol => "symbol",
        }
    }
}

/// Named string formats; each implies the `string` kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    Email,
    Url,
    Domain,
    Name,
    FullName,
    Username,
    Alpha,
    Alphanumeric,
    Phone,
    Uuid,
    MongoId,
    Date,
    DateOnly,
    Time,
    Lower,
    Upper,
    Ip,
}

impl StringFormat {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "email" => Self::Email,
            "url" => Self::Url,
            "domain" => Self::Domain,
            "name" => Self::Name,
            "fullname" => Self::FullName,
            "username" => Self::Username,
            "alpha" => Self::Alpha,
            "alphanumeric" => Self::Alphanumeric,
            "phone" => Self::Phone,
            "uuid" => Self::Uuid,
            "mongoid" => Self::MongoId,
            "date" => Self::Date,
            "dateonly" => Self::DateOnly,
            "time" => Self::Time,
            "lower" => Self::Lower,
            "upper" => Self::Upper,
            "ip" => Self::Ip,
            _ => return None,
        })
    }
}

/// Number refinements; each implies the `number` kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Int,
    Positive,
    Negative,
    Natural,
    Whole,
}

impl NumberKind {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "int" => Self::Int,
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            "natural" => Self::Natural,
            "whole" => Self::Whole,
            _ => return None,
        })
    }
}

/// Inclusive bound of a `min:`/`max:` directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Numeric bound; compares length or magnitude depending on the value.
    Number { value: f64, text: String },
    /// Date/time bound in milliseconds since the Unix epoch.
    Instant { millis: i64, text: String },
}

impl Bound {
    fn parse(name: &'static str, text: &str) -> Result<Self, RuleError> {
        if let Some(value) = parse_number(text) {
            return Ok(Self::Number {
                value,
                text: text.to_owned(),
            });
        }
        parse_instant(text)
            .map(|millis| Self::Instant {
                millis,
                text: text.to_owned(),
            })
            .ok_or_else(|| RuleError::malformed(name, text, "expected a number or a date"))
    }

    /// The bound as written in the rule.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Number { text, .. } | Self::Instant { text, .. } => text,
        }
    }
}

/// A compiled `regex:/pattern/flags` payload.
#[derive(Clone)]
pub struct Pattern {
    literal: String,
    regex: fancy_regex::Regex,
}

impl Pattern {
    /// Compiles a `/pattern/flags` literal. `i`, `m` and `s` map to inline
    /// flags; `g`, `u`, `y` and `d` do not change a single test and are
    /// ignored.
    pub fn parse(literal: &str) -> Result<Self, RuleError> {
        let malformed = |reason| RuleError::malformed("regex", literal, reason);

        let body = literal
            .strip_prefix('/')
            .ok_or_else(|| malformed("expected /pattern/flags"))?;
        let close = body
            .rfind('/')
            .ok_or_else(|| malformed("missing closing `/`"))?;
        let (pattern, flags) = (&body[..close], &body[close + 1..]);

        let mut inline = String::new();
        for flag in flags.chars() {
            match flag {
                'i' | 'm' | 's' if !inline.contains(flag) => inline.push(flag),
                'i' | 'm' | 's' | 'g' | 'u' | 'y' | 'd' => {}
                _ => return Err(malformed("unsupported flag")),
            }
        }

        let source = if inline.is_empty() {
            pattern.to_owned()
        } else {
            format!("(?{inline}){pattern}")
        };
        let regex = fancy_regex::Regex::new(&source).map_err(|e| RuleError::InvalidRegex {
            pattern: pattern.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            literal: literal.to_owned(),
            regex,
        })
    }

    /// Tests `text` against the pattern.
    pub fn is_match(&self, text: &str) -> Result<bool, RuleError> {
        self.regex
            .is_match(text)
            .map_err(|e| RuleError::InvalidRegex {
                pattern: self.literal.clone(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.literal).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.literal == other.literal
    }
}

/// Parameterized constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Equal(String),
    Size(usize),
    Min(Bound),
    Max(Bound),
    Regex(Pattern),
    DecimalSize(usize),
    DecimalMin(usize),
    DecimalMax(usize),
    Enums(Vec<String>),
}

impl Constraint {
    fn parse(token: &str) -> Option<Result<Self, RuleError>> {
        let (name, arg) = token.split_once(':')?;
        let parsed = match name {
            "equal" => Ok(Self::Equal(arg.to_owned())),
            "size" => count("size", arg).map(Self::Size),
            "min" => Bound::parse("min", arg).map(Self::Min),
            "max" => Bound::parse("max", arg).map(Self::Max),
            "regex" => Pattern::parse(arg).map(Self::Regex),
            "decimalsize" => count("decimalsize", arg).map(Self::DecimalSize),
            "decimalmin" => count("decimalmin", arg).map(Self::DecimalMin),
            "decimalmax" => count("decimalmax", arg).map(Self::DecimalMax),
            "enums" => Ok(Self::Enums(arg.split(',').map(str::to_owned).collect())),
            _ => return None,
        };
        Some(parsed)
    }
}

fn count(name: &'static str, arg: &str) -> Result<usize, RuleError> {
    arg.trim()
        .parse::<usize>()
        .map_err(|_| RuleError::malformed(name, arg, "expected a non-negative integer"))
}

/// A directive that inspects the value.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    Kind(DataType),
    Format(StringFormat),
    Number(NumberKind),
    Constraint(Constraint),
    /// Applies the wrapped directive to every array element.
    ArrayOf(Box<Element>),
}

impl Check {
    fn parse(token: &str) -> Option<Result<Self, RuleError>> {
        if let Some(inner) = token.strip_prefix("arrayof:") {
            return Some(Element::parse(inner).map(|e| Self::ArrayOf(Box::new(e))));
        }
        if let Some(kind) = DataType::parse(token) {
            return Some(Ok(Self::Kind(kind)));
        }
        if let Some(format) = StringFormat::parse(token) {
            return Some(Ok(Self::Format(format)));
        }
        if let Some(kind) = NumberKind::parse(token) {
            return Some(Ok(Self::Number(kind)));
        }
        Constraint::parse(token).map(|c| c.map(Self::Constraint))
    }
}

/// What an `arrayof:` directive may wrap.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Elements may be undefined.
    Optional,
    /// Elements may be null.
    Nullable,
    Check(Check),
    /// Nothing an element can be checked against; only the array itself is
    /// required.
    Ignored(String),
}

impl Element {
    fn parse(token: &str) -> Result<Self, RuleError> {
        match token {
            "optional" => Ok(Self::Optional),
            "nullable" => Ok(Self::Nullable),
            _ => match Check::parse(token) {
                Some(check) => check.map(Self::Check),
                None => Ok(Self::Ignored(token.to_owned())),
            },
        }
    }
}

/// One atomic instruction of a field rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// An undefined value ends evaluation with no errors.
    Optional,
    /// A null value ends evaluation with no errors.
    Nullable,
    /// Display name used in place of the field path.
    Field(String),
    /// Message replacing every generated message of the field.
    Error(String),
    Check(Check),
    /// A token naming no directive, empty ones included. Evaluation passes
    /// over it.
    Ignored(String),
}

impl Directive {
    /// Parses a single token.
    ///
    /// # Errors
    ///
    /// Fails on malformed parameters and patterns that do not compile.
    /// Unknown tokens parse as [`Directive::Ignored`].
    pub fn parse(token: &str) -> Result<Self, RuleError> {
        match token {
            "optional" => return Ok(Self::Optional),
            "nullable" => return Ok(Self::Nullable),
            _ => {}
        }
        if let Some(alias) = token.strip_prefix("field:") {
            return Ok(Self::Field(alias.to_owned()));
        }
        if let Some(message) = token.strip_prefix("error:") {
            return Ok(Self::Error(message.to_owned()));
        }
        match Check::parse(token) {
            Some(check) => check.map(Self::Check),
            None => Ok(Self::Ignored(token.to_owned())),
        }
    }
}

// ============================================================================
// FIELD COMPILATION
// ============================================================================

/// Splits a directive rule into its raw tokens. Object rules have none.
#[must_use]
pub fn tokens(rule: &Rule) -> Vec<&str> {
    match rule {
        Rule::Directives(text) if text.is_empty() => Vec::new(),
        Rule::Directives(text) => text.split('|').collect(),
        Rule::Sequence(list) => list.iter().map(String::as_str).collect(),
        Rule::Nested(_) | Rule::Each(_) => Vec::new(),
    }
}

/// Returns `true` for synthesized element labels such as `tags[0]`.
fn is_element_label(key: &str) -> bool {
    let Some(open) = key.strip_suffix(']').and_then(|rest| rest.rfind('[')) else {
        return false;
    };
    let index = &key[open + 1..key.len() - 1];
    !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())
}

/// Compiled directives of one field plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRules {
    /// Directives in declaration order, metadata included.
    pub directives: Vec<Directive>,
    /// Payload of the first `field:` directive.
    pub alias: Option<String>,
    /// Payload of the first `error:` directive.
    pub message: Option<String>,
}

impl FieldRules {
    /// Compiles the rule attached to `key`.
    ///
    /// The alias is ignored when `key` is an element label like `tags[0]`.
    pub fn compile(key: &str, rule: &Rule) -> Result<Self, RuleError> {
        let directives = tokens(rule)
            .into_iter()
            .map(Directive::parse)
            .collect::<Result<Vec<_>, _>>()?;
        for directive in &directives {
            if let Directive::Ignored(token) = directive {
                tracing::debug!(field = key, token = %token, "ignoring unknown directive");
            }
        }

        let alias = if is_element_label(key) {
            None
        } else {
            directives.iter().find_map(|d| match d {
                Directive::Field(alias) => Some(alias.clone()),
                _ => None,
            })
        };
        let message = directives.iter().find_map(|d| match d {
            Directive::Error(message) => Some(message.clone()),
            _ => None,
        });

        Ok(Self {
            directives,
            alias,
            message,
        })
    }
}

/// One `$atleast`/`$atmost` group: `"mail|phone|size:1|error:..."`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceGroup {
    /// Field paths counted by the group.
    pub fields: Vec<String>,
    /// First `size:` payload, `1` when absent.
    pub threshold: usize,
    /// First `error:` payload.
    pub message: Option<String>,
}

impl PresenceGroup {
    pub fn parse(group: &str) -> Result<Self, RuleError> {
        let mut fields = Vec::new();
        let mut threshold = None;
        let mut message = None;

        for token in group.split('|') {
            if let Some(size) = token.strip_prefix("size:") {
                let size = count("size", size)?;
                threshold.get_or_insert(size);
            } else if let Some(text) = token.strip_prefix("error:") {
                message.get_or_insert_with(|| text.to_owned());
            } else if token.is_empty() {
                return Err(RuleError::MalformedPresenceRule {
                    key: group.to_owned(),
                });
            } else {
                fields.push(token.to_owned());
            }
        }
        if fields.is_empty() {
            return Err(RuleError::MalformedPresenceRule {
                key: group.to_owned(),
            });
        }

        Ok(Self {
            fields,
            threshold: threshold.unwrap_or(1),
            message,
        })
    }
}
