// src/recipe/constraint.rs

//! Version constraints for recipe dependencies
//!
//! Supported forms:
//! - Pinned: `1.0.0`, `2.1` (missing components are zero)
//! - Caret/tilde: `^3.27.1`, `~1.2`
//! - Comparator ranges: `>=2.0.14`, `>=1.0 <2.0`, `>=1.0, <2.0`
//! - Bracketed ranges: `[^3.27.1]`, `[>=1.0 <2.0]`
//! - Wildcard: `*`
//!
//! Matching is delegated to `semver::VersionReq`.

use crate::error::{Error, Result};
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A parsed and validated version constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    raw: String,
    req: VersionReq,
    pinned: Option<Version>,
}

impl VersionConstraint {
    /// Parse a constraint declared for `package`
    pub fn parse(package: &str, text: &str) -> Result<Self> {
        let fail = |reason: String| Error::ConstraintError {
            package: package.to_string(),
            constraint: text.to_string(),
            reason,
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(fail("constraint is empty".to_string()));
        }

        let (body, bracketed) = match trimmed.strip_prefix('[') {
            Some(rest) => match rest.strip_suffix(']') {
                Some(inner) => (inner.trim(), true),
                None => return Err(fail("unterminated '[' range".to_string())),
            },
            None if trimmed.ends_with(']') => {
                return Err(fail("unmatched ']' in range".to_string()));
            }
            None => (trimmed, false),
        };

        if body.is_empty() {
            return Err(fail("range is empty".to_string()));
        }

        let tokens: Vec<&str> = body
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();

        // A lone bare version outside brackets is a pin
        if !bracketed && tokens.len() == 1 && starts_with_digit(tokens[0]) {
            let version = parse_pinned(tokens[0]).map_err(fail)?;
            let req = VersionReq::parse(&format!("={}", version))
                .map_err(|e| fail(e.to_string()))?;
            return Ok(Self {
                raw: trimmed.to_string(),
                req,
                pinned: Some(version),
            });
        }

        let mut comparators = Vec::with_capacity(tokens.len());
        for token in &tokens {
            if *token == "*" {
                if tokens.len() > 1 {
                    return Err(fail("'*' cannot be combined with other comparators".to_string()));
                }
                comparators.push("*".to_string());
            } else if starts_with_digit(token) {
                comparators.push(format!("={}", token));
            } else if token.starts_with(['^', '~', '>', '<', '=']) {
                comparators.push((*token).to_string());
            } else {
                return Err(fail(format!("unrecognized comparator '{}'", token)));
            }
        }

        let req = VersionReq::parse(&comparators.join(", ")).map_err(|e| fail(e.to_string()))?;

        Ok(Self {
            raw: trimmed.to_string(),
            req,
            pinned: None,
        })
    }

    /// Whether a concrete version satisfies this constraint
    pub fn matches(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    /// The exact version for pinned constraints
    pub fn pinned(&self) -> Option<&Version> {
        self.pinned.as_ref()
    }

    /// The constraint as written in the recipe
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Normalized form: equal for constraints accepting the same versions,
    /// whatever their spelling (`1.0` and `1.0.0`, `[^3.27.1]` and `^3.27.1`)
    pub fn canonical(&self) -> String {
        match &self.pinned {
            Some(version) => format!("={}", version),
            None => self.req.to_string(),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Parse a pinned version, padding missing minor/patch with zero
fn parse_pinned(s: &str) -> std::result::Result<Version, String> {
    if let Ok(v) = Version::parse(s) {
        return Ok(v);
    }

    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() > 3 {
        return Err(format!("'{}' has more than three components", s));
    }

    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse::<u64>()
            .map_err(|_| format!("'{}' is not a valid version", s))?;
    }

    Ok(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Category a dependency is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    /// Linked into the artifact, needed by consumers
    Host,
    /// Build tool, never linked
    Tool,
    /// Needed only for the package's own test suite
    Test,
}

impl RequirementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementKind::Host => "host",
            RequirementKind::Tool => "tool",
            RequirementKind::Test => "test",
        }
    }
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single declared dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub name: String,
    pub constraint: VersionConstraint,
    pub kind: RequirementKind,
}

impl Requirement {
    pub fn new(name: &str, constraint: &str, kind: RequirementKind) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            constraint: VersionConstraint::parse(name, constraint)?,
            kind,
        })
    }

    /// `name/constraint` reference form
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.constraint)
    }
}
