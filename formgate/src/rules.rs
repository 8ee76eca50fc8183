//! Rule evaluators.
//!
//! A field's [`Rules`] are checked as a short-circuit chain in a fixed order:
//!
//! ```text
//! required -> min -> max -> min && max -> email -> integer -> regex -> custom
//! ```
//!
//! A stage only runs if every earlier stage passed, so the outcome names the
//! first failing stage. Every stage sees the sanitized value.
//!
//! # Example
//!
//! ```ignore
//! let rules = Rules::new().required().min(3).max(5);
//!
//! assert_eq!(rules.first_failure(&"ab".into()), Some(RuleKind::Min));
//! assert!(rules.check(&"abcd".into()));
//! ```

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, LazyLock};

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FormError, extract_panic_message};
use crate::value::FieldValue;

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("integer pattern compiles"));

/// Type alias for custom predicate closures.
pub type CustomRule = Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>;

/// One stage of the rule chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Required,
    Min,
    Max,
    /// Combined re-check when both `min` and `max` are set.
    MinMax,
    Email,
    Integer,
    Regex,
    Custom,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::Required => "required",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::MinMax => "min-max",
            RuleKind::Email => "email",
            RuleKind::Integer => "integer",
            RuleKind::Regex => "regex",
            RuleKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// How strictly the email rule checks addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailCheck {
    /// The string form contains an `@`.
    #[default]
    Shallow,
    /// Full address syntax.
    Strict,
}

/// Compiled validation rules for one field.
#[derive(Clone, Default)]
pub struct Rules {
    required: bool,
    min: Option<usize>,
    max: Option<usize>,
    email: Option<EmailCheck>,
    integer: bool,
    regex: Option<Regex>,
    custom: Option<CustomRule>,
}

impl Rules {
    /// Create an empty rule set. Every value passes it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a non-empty value.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Require at least `min` characters. Zero leaves the rule unset.
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    /// Require at most `max` characters. Zero leaves the rule unset.
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Require an `@` in the value.
    pub fn email(mut self) -> Self {
        self.email = Some(EmailCheck::Shallow);
        self
    }

    /// Require a syntactically valid email address.
    pub fn strict_email(mut self) -> Self {
        self.email = Some(EmailCheck::Strict);
        self
    }

    /// Require an optionally negative whole number.
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Require the text to match `pattern`.
    pub fn regex(self, pattern: &str) -> Result<Self, FormError> {
        let re = Regex::new(pattern).map_err(|source| FormError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.pattern(re))
    }

    /// Require the text to match an already compiled pattern.
    pub fn pattern(mut self, re: Regex) -> Self {
        self.regex = Some(re);
        self
    }

    /// Add a custom predicate over the sanitized value.
    pub fn custom<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(f));
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Run the chain and return the first failing stage.
    pub fn first_failure(&self, value: &FieldValue) -> Option<RuleKind> {
        let value = value.sanitized();
        let min = self.min.filter(|&m| m > 0);
        let max = self.max.filter(|&m| m > 0);

        if self.required && !validate_required(value) {
            return Some(RuleKind::Required);
        }

        if let Some(min) = min
            && !validate_min(value, min)
        {
            return Some(RuleKind::Min);
        }

        if let Some(max) = max
            && !validate_max(value, max)
        {
            return Some(RuleKind::Max);
        }

        if let (Some(min), Some(max)) = (min, max)
            && !(validate_min(value, min) && validate_max(value, max))
        {
            return Some(RuleKind::MinMax);
        }

        if let Some(check) = self.email
            && !validate_email(value, check)
        {
            return Some(RuleKind::Email);
        }

        if self.integer && !validate_integer(value) {
            return Some(RuleKind::Integer);
        }

        if let Some(re) = &self.regex
            && !validate_regex(value, re)
        {
            return Some(RuleKind::Regex);
        }

        if let Some(custom) = &self.custom
            && !validate_custom(custom, value)
        {
            return Some(RuleKind::Custom);
        }

        None
    }

    /// Run the chain and report whether every configured stage passed.
    pub fn check(&self, value: &FieldValue) -> bool {
        self.first_failure(value).is_none()
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules")
            .field("required", &self.required)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("email", &self.email)
            .field("integer", &self.integer)
            .field("regex", &self.regex.as_ref().map(Regex::as_str))
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// Declarative rule map, as found in configuration files.
///
/// ```ignore
/// let set: RuleSet = serde_json::from_str(r#"{ "required": true, "min": 3 }"#)?;
/// let rules = set.compile()?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSet {
    pub required: bool,
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub email: bool,
    /// Overrides `email` with a full address check.
    pub strict_email: bool,
    pub integer: bool,
    pub regex: Option<String>,
}

impl RuleSet {
    /// Compile into [`Rules`]. Fails if `regex` is not a valid pattern.
    pub fn compile(&self) -> Result<Rules, FormError> {
        let mut rules = Rules::new();
        rules.required = self.required;
        rules.min = self.min;
        rules.max = self.max;
        rules.integer = self.integer;
        rules.email = if self.strict_email {
            Some(EmailCheck::Strict)
        } else if self.email {
            Some(EmailCheck::Shallow)
        } else {
            None
        };

        match &self.regex {
            Some(pattern) => rules.regex(pattern),
            None => Ok(rules),
        }
    }
}

impl TryFrom<RuleSet> for Rules {
    type Error = FormError;

    fn try_from(set: RuleSet) -> Result<Self, Self::Error> {
        set.compile()
    }
}

/// Non-null; non-blank text; non-empty list; or `true`. Anything else fails.
pub fn validate_required(value: &FieldValue) -> bool {
    match value {
        FieldValue::Null => false,
        FieldValue::Text(s) => !s.trim().is_empty(),
        FieldValue::List(items) => !items.is_empty(),
        FieldValue::Bool(b) => *b,
        FieldValue::Number(_) | FieldValue::Item(_) => false,
    }
}

/// At least `min` units long, measured on the trimmed string form.
///
/// Length is counted in UTF-16 code units, the way browser inputs report
/// `maxlength`, so a character outside the BMP such as an emoji counts as 2.
pub fn validate_min(value: &FieldValue, min: usize) -> bool {
    text_length(value) >= min
}

/// At most `max` units long. See [`validate_min`].
pub fn validate_max(value: &FieldValue, max: usize) -> bool {
    text_length(value) <= max
}

fn text_length(value: &FieldValue) -> usize {
    value.to_text().trim().encode_utf16().count()
}

pub fn validate_email(value: &FieldValue, check: EmailCheck) -> bool {
    let text = value.to_text();
    match check {
        EmailCheck::Shallow => text.contains('@'),
        EmailCheck::Strict => email_address::EmailAddress::is_valid(&text),
    }
}

/// Text of the form `-?[0-9]+`. Only applies to text; other values pass.
pub fn validate_integer(value: &FieldValue) -> bool {
    validate_regex(value, &INTEGER)
}

/// Text matching `re`. Only applies to text; other values pass.
pub fn validate_regex(value: &FieldValue, re: &Regex) -> bool {
    match value.as_text() {
        Some(text) => re.is_match(text),
        None => true,
    }
}

/// Run a custom predicate. A panicking predicate counts as a failure.
pub fn validate_custom(custom: &CustomRule, value: &FieldValue) -> bool {
    match catch_unwind(AssertUnwindSafe(|| custom(value))) {
        Ok(valid) => valid,
        Err(panic) => {
            warn!(
                "Custom rule panicked, treating value as invalid: {}",
                extract_panic_message(&panic)
            );
            false
        }
    }
}
