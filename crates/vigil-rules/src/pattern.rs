#![forbid(unsafe_code)]

//! Regex literals for the `pattern` constraint.
//!
//! A `pattern` parameter is written as a `/body/flags` literal. A bare
//! pattern without slashes is accepted too and, like the native attribute,
//! must match the whole value.
//!
//! Bodies are compiled with a backtracking engine, so lookaround and
//! backreferences work. Character shorthands keep their literal meaning:
//! `\d`, `\w` and `\b` are ASCII-only, and `.` stops at any line terminator
//! unless `s` is set.
//!
//! | Flag | Effect |
//! |------|--------|
//! | `i` | case-insensitive |
//! | `m` | `^`/`$` match at line boundaries |
//! | `s` | `.` matches newlines |
//! | `y` | match must start at the beginning of the value |
//! | `g`, `u` | accepted, no effect |

use std::fmt;

use fancy_regex::Regex;
use tracing::warn;

const WORD: &str = "A-Za-z0-9_";
const WORD_BOUNDARY: &str =
    "(?:(?<=[A-Za-z0-9_])(?![A-Za-z0-9_])|(?<![A-Za-z0-9_])(?=[A-Za-z0-9_]))";
const NOT_WORD_BOUNDARY: &str =
    "(?:(?<=[A-Za-z0-9_])(?=[A-Za-z0-9_])|(?<![A-Za-z0-9_])(?![A-Za-z0-9_]))";
const ANY_BUT_TERMINATOR: &str = "[^\n\r\u{2028}\u{2029}]";

/// Errors produced while parsing a regex literal.
#[derive(Debug)]
pub enum PatternError {
    /// The literal has an opening slash but no closing one.
    Malformed(String),
    /// A flag outside the supported set.
    UnsupportedFlag(char),
    /// The body is not a valid regular expression.
    Regex(Box<fancy_regex::Error>),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Malformed(literal) => write!(f, "malformed regex literal: {literal}"),
            PatternError::UnsupportedFlag(flag) => write!(f, "unsupported regex flag: {flag}"),
            PatternError::Regex(e) => write!(f, "invalid regex: {e}"),
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatternError::Regex(e) => Some(e.as_ref()),
            PatternError::Malformed(_) | PatternError::UnsupportedFlag(_) => None,
        }
    }
}

impl From<fancy_regex::Error> for PatternError {
    fn from(e: fancy_regex::Error) -> Self {
        PatternError::Regex(Box::new(e))
    }
}

/// A compiled regex literal.
#[derive(Debug)]
pub struct RegexLiteral {
    regex: Regex,
    body: String,
    flags: String,
}

impl RegexLiteral {
    /// Parse `/body/flags`, or a bare pattern anchored to the whole value.
    pub fn parse(literal: &str) -> Result<Self, PatternError> {
        let Some(rest) = literal.strip_prefix('/') else {
            let regex = Regex::new(&format!("^(?:{})$", translate(literal, false)))?;
            return Ok(Self {
                regex,
                body: literal.to_owned(),
                flags: String::new(),
            });
        };
        let close = rest
            .rfind('/')
            .ok_or_else(|| PatternError::Malformed(literal.to_owned()))?;
        let (body, flags) = (&rest[..close], &rest[close + 1..]);

        let mut inline = String::new();
        let mut sticky = false;
        for flag in flags.chars() {
            match flag {
                'i' | 'm' | 's' => {
                    if !inline.contains(flag) {
                        inline.push(flag);
                    }
                }
                'y' => sticky = true,
                'g' | 'u' => {}
                other => return Err(PatternError::UnsupportedFlag(other)),
            }
        }

        let body_source = translate(body, inline.contains('s'));
        let mut source = String::with_capacity(body_source.len() + 12);
        if !inline.is_empty() {
            source.push_str("(?");
            source.push_str(&inline);
            source.push(')');
        }
        if sticky {
            source.push_str("\\A(?:");
            source.push_str(&body_source);
            source.push(')');
        } else {
            source.push_str(&body_source);
        }

        Ok(Self {
            regex: Regex::new(&source)?,
            body: body.to_owned(),
            flags: flags.to_owned(),
        })
    }

    /// A value that exhausts the backtracking limit does not match.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value).unwrap_or_else(|e| {
            warn!(body = %self.body, error = %e, "pattern evaluation aborted");
            false
        })
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn flags(&self) -> &str {
        &self.flags
    }
}

/// Rewrite shorthands whose meaning differs between literal syntax and the
/// engine.
fn translate(body: &str, dot_all: bool) -> String {
    let mut out = String::with_capacity(body.len() + 16);
    let mut chars = body.chars();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => push_escape(&mut out, escaped, in_class),
                None => out.push('\\'),
            },
            '[' if !in_class => {
                in_class = true;
                out.push(c);
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            '.' if !in_class && !dot_all => out.push_str(ANY_BUT_TERMINATOR),
            _ => out.push(c),
        }
    }
    out
}

fn push_escape(out: &mut String, escaped: char, in_class: bool) {
    match (escaped, in_class) {
        ('d', false) => out.push_str("[0-9]"),
        ('D', false) => out.push_str("[^0-9]"),
        ('w', false) => {
            out.push('[');
            out.push_str(WORD);
            out.push(']');
        }
        ('W', false) => {
            out.push_str("[^");
            out.push_str(WORD);
            out.push(']');
        }
        ('b', false) => out.push_str(WORD_BOUNDARY),
        ('B', false) => out.push_str(NOT_WORD_BOUNDARY),
        ('d', true) => out.push_str("0-9"),
        ('w', true) => out.push_str(WORD),
        // Backspace inside a class.
        ('b', true) => out.push('\u{8}'),
        ('/', _) => out.push('/'),
        (other, _) => {
            out.push('\\');
            out.push(other);
        }
    }
}
