// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Version gate for extension registration.
//!
//! Extensions may declare which framework versions they work with using the
//! comparator grammar package authors already know:
//!
//! - `= 1.2.3` (or just `1.2.3`) for an exact match
//! - `!=`, `>`, `>=`, `<`, `<=` for ordinary comparisons
//! - `~> 1.2` for a pessimistic range (`>= 1.2, < 2.0`), and
//!   `~> 1.2.3` for `>= 1.2.3, < 1.3.0`
//!
//! Several clauses may be joined with commas; all of them must hold.
//! Versions in a constraint have one to three numeric segments, missing
//! segments count as zero.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::Version;
use thiserror::Error;

/// Version of the running framework, as compiled.
pub const FRAMEWORK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the running framework version as a [`semver::Version`].
pub fn framework_version() -> Version {
    Version::parse(FRAMEWORK_VERSION).unwrap_or_else(|_| Version::new(0, 0, 0))
}

/// A version constraint string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintParseError {
    /// A comma-separated clause was blank, e.g. `">= 1.0,"`.
    #[error("empty clause in version constraint `{constraint}`")]
    EmptyClause { constraint: String },

    /// The comparator prefix is not part of the grammar.
    #[error("unknown operator `{op}` in version constraint `{constraint}`")]
    UnknownOperator { op: String, constraint: String },

    /// The version part is missing, non-numeric or has too many segments.
    #[error("invalid version `{version}` in constraint `{constraint}`")]
    InvalidVersion { version: String, constraint: String },
}

/// Comparator of a single constraint clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Exact,
    NotEqual,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Pessimistic,
}

impl Operator {
    // Longest prefixes first so `>=` is not read as `>`.
    const TOKENS: [(&'static str, Operator); 7] = [
        ("~>", Operator::Pessimistic),
        (">=", Operator::GreaterEq),
        ("<=", Operator::LessEq),
        ("!=", Operator::NotEqual),
        ("=", Operator::Exact),
        (">", Operator::Greater),
        ("<", Operator::Less),
    ];

    fn as_str(self) -> &'static str {
        match self {
            Operator::Exact => "=",
            Operator::NotEqual => "!=",
            Operator::Greater => ">",
            Operator::GreaterEq => ">=",
            Operator::Less => "<",
            Operator::LessEq => "<=",
            Operator::Pessimistic => "~>",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One comparator clause, e.g. `>= 1.2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub op: Operator,
    pub version: Version,
    /// Number of segments written in the constraint (1 to 3).
    pub segments: usize,
}

impl Clause {
    /// Evaluates this clause against `actual`.
    pub fn matches(&self, actual: &Version) -> bool {
        let ord = actual.cmp_precedence(&self.version);
        match self.op {
            Operator::Exact => ord == Ordering::Equal,
            Operator::NotEqual => ord != Ordering::Equal,
            Operator::Greater => ord == Ordering::Greater,
            Operator::GreaterEq => ord != Ordering::Less,
            Operator::Less => ord == Ordering::Less,
            Operator::LessEq => ord != Ordering::Greater,
            Operator::Pessimistic => {
                // The ceiling is checked against the release part, so
                // `2.0.0-beta.1` is outside `~> 1.0`.
                let release = Version::new(actual.major, actual.minor, actual.patch);
                ord != Ordering::Less
                    && release.cmp_precedence(&self.pessimistic_ceiling()) == Ordering::Less
            }
        }
    }

    /// Exclusive upper bound of a `~>` clause.
    fn pessimistic_ceiling(&self) -> Version {
        if self.segments >= 3 {
            Version::new(self.version.major, self.version.minor + 1, 0)
        } else {
            Version::new(self.version.major + 1, 0, 0)
        }
    }
}

/// A parsed, conjunctive version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    source: String,
    clauses: Vec<Clause>,
}

impl VersionConstraint {
    /// Parses a constraint string such as `">= 1.2, < 2.0"`.
    pub fn parse(input: &str) -> Result<Self, ConstraintParseError> {
        let source = input.trim().to_string();
        let mut clauses = Vec::new();
        for raw in source.split(',') {
            clauses.push(parse_clause(raw, &source)?);
        }
        Ok(Self { source, clauses })
    }

    /// Returns true if every clause holds for `actual`.
    pub fn matches(&self, actual: &Version) -> bool {
        self.clauses.iter().all(|c| c.matches(actual))
    }

    /// The clauses of this constraint, in source order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// The constraint as written, trimmed.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for VersionConstraint {
    type Err = ConstraintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Checks a requested constraint against the running version.
///
/// An absent or blank constraint always passes. A malformed one is an error;
/// callers that must not fail (the registry) treat it as a failed check.
pub fn satisfies(constraint: Option<&str>, actual: &Version) -> Result<bool, ConstraintParseError> {
    let Some(constraint) = constraint.filter(|c| !c.trim().is_empty()) else {
        return Ok(true);
    };
    let parsed = VersionConstraint::parse(constraint)?;
    let ok = parsed.matches(actual);
    tracing::trace!(constraint = %parsed, %actual, ok, "version gate evaluated");
    Ok(ok)
}

fn parse_clause(raw: &str, constraint: &str) -> Result<Clause, ConstraintParseError> {
    let clause = raw.trim();
    if clause.is_empty() {
        return Err(ConstraintParseError::EmptyClause {
            constraint: constraint.to_string(),
        });
    }

    let (op, rest) = if clause.starts_with(|c: char| c.is_ascii_digit()) {
        (Operator::Exact, clause)
    } else {
        Operator::TOKENS
            .iter()
            .find_map(|(token, op)| clause.strip_prefix(token).map(|rest| (*op, rest)))
            .ok_or_else(|| ConstraintParseError::UnknownOperator {
                op: clause
                    .chars()
                    .take_while(|c| !c.is_ascii_digit() && !c.is_whitespace())
                    .collect(),
                constraint: constraint.to_string(),
            })?
    };

    let text = rest.trim();
    let invalid = || ConstraintParseError::InvalidVersion {
        version: text.to_string(),
        constraint: constraint.to_string(),
    };

    let parts: Vec<&str> = text.split('.').collect();
    if text.is_empty() || parts.len() > 3 {
        return Err(invalid());
    }
    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        *slot = part.parse().map_err(|_| invalid())?;
    }

    Ok(Clause {
        op,
        version: Version::new(numbers[0], numbers[1], numbers[2]),
        segments: parts.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn absent_or_blank_constraint_always_passes() {
        assert!(satisfies(None, &v("0.0.1")).unwrap());
        assert!(satisfies(Some(""), &v("0.0.1")).unwrap());
        assert!(satisfies(Some("   "), &v("9.9.9")).unwrap());
    }

    #[test]
    fn bare_version_is_exact_match() {
        assert!(satisfies(Some("1.2.3"), &v("1.2.3")).unwrap());
        assert!(!satisfies(Some("1.2.3"), &v("1.2.4")).unwrap());
        // Missing segments are zero, not wildcards.
        assert!(satisfies(Some("= 1.2"), &v("1.2.0")).unwrap());
        assert!(!satisfies(Some("= 1.2"), &v("1.2.5")).unwrap());
    }

    #[test]
    fn greater_or_equal() {
        assert!(satisfies(Some(">= 1.2"), &v("1.2.0")).unwrap());
        assert!(satisfies(Some(">= 1.2"), &v("3.0.0")).unwrap());
        assert!(!satisfies(Some(">= 2.0"), &v("1.5.0")).unwrap());
    }

    #[test]
    fn pessimistic_two_segments_allows_minor_bumps() {
        let c = VersionConstraint::parse("~> 1.0").unwrap();
        assert!(c.matches(&v("1.0.0")));
        assert!(c.matches(&v("1.2.3")));
        assert!(c.matches(&v("1.99.0")));
        assert!(!c.matches(&v("2.0.0")));
        assert!(!c.matches(&v("0.9.9")));
    }

    #[test]
    fn pessimistic_three_segments_stays_within_minor() {
        let c = VersionConstraint::parse("~> 1.2.3").unwrap();
        assert!(c.matches(&v("1.2.3")));
        assert!(c.matches(&v("1.2.10")));
        assert!(!c.matches(&v("1.2.2")));
        assert!(!c.matches(&v("1.3.0")));
    }

    #[test]
    fn pessimistic_single_segment() {
        let c = VersionConstraint::parse("~>2").unwrap();
        assert!(c.matches(&v("2.4.0")));
        assert!(!c.matches(&v("3.0.0")));
    }

    #[test]
    fn clauses_are_conjunctive() {
        let c = VersionConstraint::parse(">= 1.0, < 1.5, != 1.2.0").unwrap();
        assert_eq!(c.clauses().len(), 3);
        assert!(c.matches(&v("1.1.0")));
        assert!(!c.matches(&v("1.2.0")));
        assert!(!c.matches(&v("1.5.0")));
    }

    #[test]
    fn strict_comparisons() {
        assert!(satisfies(Some("> 1.0"), &v("1.0.1")).unwrap());
        assert!(!satisfies(Some("> 1.0"), &v("1.0.0")).unwrap());
        assert!(satisfies(Some("<= 1.0"), &v("1.0.0")).unwrap());
        assert!(!satisfies(Some("< 1.0"), &v("1.0.0")).unwrap());
    }

    #[test]
    fn prerelease_framework_sorts_below_release() {
        assert!(satisfies(Some(">= 1.0"), &v("2.0.0-beta.1")).unwrap());
        assert!(!satisfies(Some(">= 2.0"), &v("2.0.0-beta.1")).unwrap());
    }

    #[test]
    fn pessimistic_ceiling_ignores_prerelease() {
        assert!(!satisfies(Some("~> 1.0"), &v("2.0.0-beta.1")).unwrap());
        assert!(!satisfies(Some("~> 1.2.0"), &v("1.3.0-rc.1")).unwrap());
        assert!(satisfies(Some("~> 1.2.0"), &v("1.2.5-rc.1")).unwrap());
        assert!(satisfies(Some("~> 1.0"), &v("1.9.0-alpha")).unwrap());
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = VersionConstraint::parse("=> 1.0").unwrap_err();
        assert!(matches!(err, ConstraintParseError::InvalidVersion { .. }));

        let err = VersionConstraint::parse("^ 1.0").unwrap_err();
        assert_eq!(
            err,
            ConstraintParseError::UnknownOperator {
                op: "^".to_string(),
                constraint: "^ 1.0".to_string(),
            }
        );
    }

    #[test]
    fn malformed_versions_are_rejected() {
        for bad in [">=", ">= abc", ">= 1..2", ">= 1.2.3.4", "~> 1.x", ">= -1"] {
            assert!(
                VersionConstraint::parse(bad).is_err(),
                "`{bad}` should not parse"
            );
        }
    }

    #[test]
    fn trailing_comma_is_an_empty_clause() {
        let err = VersionConstraint::parse(">= 1.0,").unwrap_err();
        assert!(matches!(err, ConstraintParseError::EmptyClause { .. }));
    }

    #[test]
    fn display_preserves_trimmed_source() {
        let c: VersionConstraint = "  ~> 2.0  ".parse().unwrap();
        assert_eq!(c.to_string(), "~> 2.0");
        assert_eq!(c.as_str(), "~> 2.0");
    }

    #[test]
    fn framework_version_matches_package_version() {
        assert_eq!(framework_version().to_string(), FRAMEWORK_VERSION);
    }

    proptest! {
        #[test]
        fn version_satisfies_its_own_floor(major in 0u64..50, minor in 0u64..50, patch in 0u64..50) {
            let actual = Version::new(major, minor, patch);
            let floor = format!(">= {major}.{minor}.{patch}");
            prop_assert!(satisfies(Some(&floor), &actual).unwrap());
            let exact = format!("{major}.{minor}.{patch}");
            prop_assert!(satisfies(Some(&exact), &actual).unwrap());
        }

        #[test]
        fn pessimistic_three_segment_never_crosses_minor(
            major in 0u64..20, minor in 0u64..20, patch in 0u64..20, bump in 1u64..5,
        ) {
            let c = VersionConstraint::parse(&format!("~> {major}.{minor}.{patch}")).unwrap();
            prop_assert!(c.matches(&Version::new(major, minor, patch + bump)));
            prop_assert!(!c.matches(&Version::new(major, minor + bump, 0)));
        }
    }
}
