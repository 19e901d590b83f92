//! Per-variable validators.
//!
//! # Responsibilities
//! - Map a variable name to the greedy sentinel or an acceptance predicate
//! - Provide the builtin predicates available from configuration
//!
//! # Design Decisions
//! - Predicates are trait objects shared via `Arc` so routes stay cheap to clone
//! - A predicate that cannot run returns `Err`, which is not the same as `false`
//! - Variables with no validator accept any token

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::routing::error::ValidatorError;

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());
static ALNUM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());
static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// Names accepted by [`Validator::builtin`].
pub const BUILTIN_VALIDATORS: &[&str] = &["$", "numeric", "alpha", "alnum", "slug"];

/// Acceptance test for a single request-path token.
pub trait Predicate: Send + Sync + fmt::Debug {
    /// Returns `Ok(true)` if `value` is acceptable for `variable`.
    fn check(&self, value: &str, variable: &str) -> Result<bool, ValidatorError>;
}

/// Accepts tokens made only of ASCII digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Numeric;

impl Predicate for Numeric {
    fn check(&self, value: &str, _variable: &str) -> Result<bool, ValidatorError> {
        Ok(!value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// Accepts tokens matching a regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern`, anchoring it to the whole token.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self { regex })
    }

    fn from_regex(regex: &Regex) -> Self {
        Self { regex: regex.clone() }
    }
}

impl Predicate for Pattern {
    fn check(&self, value: &str, _variable: &str) -> Result<bool, ValidatorError> {
        Ok(self.regex.is_match(value))
    }
}

/// Accepts one of a fixed set of tokens.
#[derive(Debug, Clone)]
pub struct OneOf {
    allowed: Vec<String>,
}

impl OneOf {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Predicate for OneOf {
    fn check(&self, value: &str, _variable: &str) -> Result<bool, ValidatorError> {
        Ok(self.allowed.iter().any(|a| a == value))
    }
}

/// Adapts a closure into a [`Predicate`].
pub struct FnPredicate<F> {
    f: F,
}

impl<F> fmt::Debug for FnPredicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate").finish_non_exhaustive()
    }
}

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&str, &str) -> Result<bool, ValidatorError> + Send + Sync,
{
    fn check(&self, value: &str, variable: &str) -> Result<bool, ValidatorError> {
        (self.f)(value, variable)
    }
}

/// How a variable is validated.
#[derive(Debug, Clone)]
pub enum Validator {
    /// The variable captures the rest of the request path, slashes included.
    GreedyToEnd,
    Predicate(Arc<dyn Predicate>),
}

impl Validator {
    pub fn predicate<P: Predicate + 'static>(predicate: P) -> Self {
        Validator::Predicate(Arc::new(predicate))
    }

    /// Wrap a fallible closure `(value, variable) -> Result<bool, _>`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> Result<bool, ValidatorError> + Send + Sync + 'static,
    {
        Validator::predicate(FnPredicate { f })
    }

    /// Resolve one of [`BUILTIN_VALIDATORS`] by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "$" => Some(Validator::GreedyToEnd),
            "numeric" => Some(Validator::predicate(Numeric)),
            "alpha" => Some(Validator::predicate(Pattern::from_regex(&ALPHA_REGEX))),
            "alnum" => Some(Validator::predicate(Pattern::from_regex(&ALNUM_REGEX))),
            "slug" => Some(Validator::predicate(Pattern::from_regex(&SLUG_REGEX))),
            _ => None,
        }
    }

    pub fn is_greedy(&self) -> bool {
        matches!(self, Validator::GreedyToEnd)
    }
}

/// Validators for one route, keyed by variable name.
#[derive(Debug, Clone, Default)]
pub struct Validators {
    map: HashMap<String, Validator>,
}

impl Validators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, variable: impl Into<String>, validator: Validator) -> Self {
        self.insert(variable, validator);
        self
    }

    /// Mark `variable` as capturing the rest of the path.
    pub fn greedy(self, variable: impl Into<String>) -> Self {
        self.with(variable, Validator::GreedyToEnd)
    }

    /// Attach an infallible closure check to `variable`.
    pub fn check<F>(self, variable: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.with(variable, Validator::from_fn(move |value, name| Ok(f(value, name))))
    }

    pub fn insert(&mut self, variable: impl Into<String>, validator: Validator) {
        self.map.insert(variable.into(), validator);
    }

    pub fn get(&self, variable: &str) -> Option<&Validator> {
        self.map.get(variable)
    }

    pub fn is_greedy(&self, variable: &str) -> bool {
        self.get(variable).is_some_and(Validator::is_greedy)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FromIterator<(String, Validator)> for Validators {
    fn from_iter<I: IntoIterator<Item = (String, Validator)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}
