//! Path template compiler.
//!
//! # Grammar
//! - Segments are separated by `/`; empty segments are kept (`a//b` has three).
//! - `:name` (colons trimmed from both ends) declares a variable.
//! - A token containing `(x)` is an optional literal: `page(s)` accepts
//!   `page` and `pages`.
//! - A trailing group starting with a slash, `blog(/:page)`, makes every
//!   segment inside it optional.
//!
//! # Design Decisions
//! - Templates are compiled once at registration and never mutated
//! - Nested or unbalanced parentheses are rejected rather than guessed at
//! - A tail capture must be the last segment

use std::fmt;

use regex::Regex;

use crate::routing::error::TemplateError;

/// A literal token carrying one or more `(...)` optional suffixes.
#[derive(Debug, Clone)]
pub struct OptionalLiteral {
    text: String,
    bare: String,
    pattern: Regex,
}

impl OptionalLiteral {
    fn compile(template: &str, token: &str) -> Result<Self, TemplateError> {
        let mut bare = String::new();
        let mut pattern = String::from("^");
        let mut literal = String::new();
        let mut group: Option<String> = None;

        for c in token.chars() {
            match (c, group.as_mut()) {
                ('(', None) => {
                    pattern.push_str(&regex::escape(&literal));
                    literal.clear();
                    group = Some(String::new());
                }
                (')', Some(inner)) => {
                    pattern.push_str(&format!("(?:{})?", regex::escape(inner)));
                    group = None;
                }
                (_, Some(inner)) => inner.push(c),
                (_, None) => {
                    literal.push(c);
                    bare.push(c);
                }
            }
        }
        pattern.push_str(&regex::escape(&literal));
        pattern.push('$');

        let pattern = Regex::new(&pattern)
            .map_err(|e| TemplateError::invalid(template, format!("optional segment {token:?}: {e}")))?;

        Ok(Self {
            text: token.to_string(),
            bare,
            pattern,
        })
    }

    /// The token as written in the template, markers included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The token with every optional group removed.
    pub fn bare(&self) -> &str {
        &self.bare
    }

    /// Returns true if a request token satisfies this segment.
    pub fn matches(&self, part: &str) -> bool {
        part == self.bare || self.pattern.is_match(part)
    }
}

impl PartialEq for OptionalLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for OptionalLiteral {}

/// One `/`-delimited unit of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(String),
    OptionalLiteral(OptionalLiteral),
    /// A variable that swallows the rest of the request path.
    TailCapture(String),
}

impl Segment {
    /// The variable name bound by this segment, if any.
    pub fn variable(&self) -> Option<&str> {
        match self {
            Segment::Variable(name) | Segment::TailCapture(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => write!(f, "{text}"),
            Segment::Variable(name) => write!(f, ":{name}"),
            Segment::OptionalLiteral(opt) => write!(f, "{}", opt.text()),
            Segment::TailCapture(name) => write!(f, ":{name}*"),
        }
    }
}

/// A compiled route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    original: String,
    segments: Vec<Segment>,
    /// Segments at or past this index came from a trailing optional group.
    required: usize,
}

impl PathTemplate {
    /// Compile a template string.
    pub fn parse(path: &str) -> Result<Self, TemplateError> {
        check_parens(path)?;

        let (head, tail) = split_optional_tail(path)?;

        let mut segments = Vec::new();
        for token in head.split('/') {
            segments.push(classify(path, token)?);
        }
        let required = segments.len();

        if let Some(tail) = tail {
            for token in tail.split('/') {
                segments.push(classify(path, token)?);
            }
        }

        Ok(Self {
            original: path.to_string(),
            segments,
            required,
        })
    }

    /// The template of the fallback route; only the empty path matches it.
    pub fn empty() -> Self {
        Self {
            original: String::new(),
            segments: vec![Segment::Literal(String::new())],
            required: 1,
        }
    }

    /// Promote every variable accepted by `is_greedy` to a tail capture.
    ///
    /// Fails if a tail capture would be followed by further segments.
    pub fn with_tail_captures<F>(mut self, is_greedy: F) -> Result<Self, TemplateError>
    where
        F: Fn(&str) -> bool,
    {
        for segment in self.segments.iter_mut() {
            if let Segment::Variable(name) = segment {
                if is_greedy(name) {
                    *segment = Segment::TailCapture(std::mem::take(name));
                }
            }
        }

        let last = self.segments.len().saturating_sub(1);
        if let Some(pos) = self
            .segments
            .iter()
            .position(|s| matches!(s, Segment::TailCapture(_)))
        {
            if pos != last {
                return Err(TemplateError::invalid(
                    &self.original,
                    format!("tail capture {} must be the last segment", self.segments[pos]),
                ));
            }
        }

        Ok(self)
    }

    /// The template string as registered.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of leading segments a request path must supply.
    pub fn required(&self) -> usize {
        self.required
    }

    /// Returns true if the segment at `index` belongs to the optional tail group.
    pub fn is_optional(&self, index: usize) -> bool {
        index >= self.required
    }

    pub fn has_tail_capture(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::TailCapture(_)))
    }

    /// Names of all declared variables, in template order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::variable)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.variables().any(|v| v == name)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Reject unbalanced and nested groups.
fn check_parens(path: &str) -> Result<(), TemplateError> {
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '(' if depth > 0 => {
                return Err(TemplateError::invalid(path, "nested optional groups are not supported"));
            }
            '(' => depth += 1,
            ')' if depth == 0 => {
                return Err(TemplateError::invalid(path, "unmatched ')'"));
            }
            ')' => depth -= 1,
            _ => {}
        }
    }
    if depth != 0 {
        return Err(TemplateError::invalid(path, "unclosed '('"));
    }
    Ok(())
}

/// Split `head(/tail)` into its required head and optional tail.
fn split_optional_tail(path: &str) -> Result<(&str, Option<&str>), TemplateError> {
    let mut open = None;
    for (i, c) in path.char_indices() {
        match c {
            '(' => open = Some(i),
            '/' => {
                let Some(start) = open else { continue };
                if i != start + 1 {
                    return Err(TemplateError::invalid(
                        path,
                        "an optional literal cannot span segments",
                    ));
                }
                if !path.ends_with(')') || path[start..].find(')') != Some(path.len() - 1 - start) {
                    return Err(TemplateError::invalid(
                        path,
                        "an optional segment group must close the template",
                    ));
                }
                return Ok((&path[..start], Some(&path[start + 2..path.len() - 1])));
            }
            ')' => open = None,
            _ => {}
        }
    }
    Ok((path, None))
}

fn classify(template: &str, token: &str) -> Result<Segment, TemplateError> {
    if token.starts_with(':') {
        if token.contains('(') || token.contains(')') {
            return Err(TemplateError::invalid(
                template,
                format!("variable {token:?} cannot carry optional markers"),
            ));
        }
        let name = token.trim_matches(':');
        if name.is_empty() {
            return Err(TemplateError::invalid(template, "variable without a name"));
        }
        return Ok(Segment::Variable(name.to_string()));
    }

    if token.contains('(') {
        return Ok(Segment::OptionalLiteral(OptionalLiteral::compile(template, token)?));
    }

    Ok(Segment::Literal(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_and_variable_segments() {
        let t = PathTemplate::parse("user/:id").unwrap();
        assert_eq!(
            t.segments(),
            &[Segment::Literal("user".into()), Segment::Variable("id".into())]
        );
        assert_eq!(t.required(), 2);
        assert_eq!(t.variables().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn test_empty_tokens_are_preserved() {
        let t = PathTemplate::parse("a//b").unwrap();
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal("a".into()),
                Segment::Literal("".into()),
                Segment::Literal("b".into()),
            ]
        );
    }

    #[test]
    fn test_variable_colons_trimmed_both_ends() {
        let t = PathTemplate::parse("::slug:").unwrap();
        assert_eq!(t.segments(), &[Segment::Variable("slug".into())]);
    }

    #[test]
    fn test_optional_literal() {
        let t = PathTemplate::parse("page(s)/:n").unwrap();
        let Segment::OptionalLiteral(opt) = &t.segments()[0] else {
            panic!("expected optional literal");
        };
        assert_eq!(opt.bare(), "page");
        assert!(opt.matches("page"));
        assert!(opt.matches("pages"));
        assert!(!opt.matches("pagesx"));
        assert!(!opt.matches("xpage"));
    }

    #[test]
    fn test_optional_literal_escapes_regex_metacharacters() {
        let t = PathTemplate::parse("feed(.xml)").unwrap();
        let Segment::OptionalLiteral(opt) = &t.segments()[0] else {
            panic!("expected optional literal");
        };
        assert!(opt.matches("feed.xml"));
        assert!(!opt.matches("feedaxml"));
    }

    #[test]
    fn test_optional_tail_group() {
        let t = PathTemplate::parse("blog(/:page)").unwrap();
        assert_eq!(
            t.segments(),
            &[Segment::Literal("blog".into()), Segment::Variable("page".into())]
        );
        assert_eq!(t.required(), 1);
        assert!(t.is_optional(1));
        assert!(!t.is_optional(0));
    }

    #[test]
    fn test_tail_capture_promotion() {
        let t = PathTemplate::parse("files/:path")
            .unwrap()
            .with_tail_captures(|name| name == "path")
            .unwrap();
        assert_eq!(t.segments()[1], Segment::TailCapture("path".into()));
        assert!(t.has_tail_capture());
    }

    #[test]
    fn test_tail_capture_must_be_last() {
        let err = PathTemplate::parse("files/:path/raw")
            .unwrap()
            .with_tail_captures(|name| name == "path")
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_rejects_bad_parens() {
        for bad in ["a(b", "a)b", "a((b))", "a(b/c)", "a(/b)/c", "a(/b(c))", ":id(s)", ":", "a/::"] {
            assert!(PathTemplate::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_reparse_is_stable() {
        let a = PathTemplate::parse("archive/:year/page(s)(/:n)").unwrap();
        let b = PathTemplate::parse("archive/:year/page(s)(/:n)").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.segments().len(), 4);
        assert_eq!(a.required(), 3);
    }
}
