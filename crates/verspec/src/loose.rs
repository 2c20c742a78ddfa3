//! Versions that don't follow PEP 440, such as `2.0dog`, `1-1-1` or `a cat is fine too`.
//!
//! Any string is a valid loose version. They are ordered by splitting them into runs of digits
//! and letters, the way setuptools ordered versions before PEP 440 existed, and they are never
//! considered prereleases.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::version_specifier::{ConflictingPrereleasesError, merge_prereleases};
use crate::{LocalSegment, Operator, Prerelease, Version, VersionLike};

/// A version string compared with the pre-PEP 440 rules.
///
/// Two loose versions are equal only if they are spelled the same. Ordering goes through the
/// parsed components, so distinct spellings of the same rank such as `2.0` and `2` are neither
/// equal nor ordered: `partial_cmp` returns `None` for them. Use [`LooseVersion::cmp_loose`] to
/// compare by rank alone.
#[derive(Clone, Debug)]
pub struct LooseVersion {
    version: String,
    components: Vec<Component>,
}

/// A parsed piece of a loose version. Every text component sorts before every number.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Component {
    /// A run of letters or other characters, after renaming `pre`, `preview` and `rc` to `c`,
    /// `dev` to `@` and `-` to `final-`.
    Text(String),
    /// A run of ASCII digits without leading zeros, so that long runs compare without overflow.
    Number(String),
}

impl Component {
    fn is_zero(&self) -> bool {
        matches!(self, Self::Number(digits) if digits == "0")
    }

    fn is_final_marker(&self) -> bool {
        matches!(self, Self::Text(text) if text == "final-")
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(this), Self::Text(other)) => this.cmp(other),
            (Self::Number(this), Self::Number(other)) => {
                this.len().cmp(&other.len()).then_with(|| this.cmp(other))
            }
            (Self::Text(_), Self::Number(_)) => Ordering::Less,
            (Self::Number(_), Self::Text(_)) => Ordering::Greater,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum CharClass {
    Digit,
    Letter,
    Separator,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        match c {
            '0'..='9' => Self::Digit,
            'a'..='z' => Self::Letter,
            '.' | '-' => Self::Separator,
            _ => Self::Other,
        }
    }
}

/// Split a version into its components, ending with the `final` marker.
fn parse_components(version: &str) -> Vec<Component> {
    let lowercase = version.to_lowercase();
    let mut components = Vec::new();
    let mut rest = lowercase.as_str();
    while let Some(first) = rest.chars().next() {
        let class = CharClass::of(first);
        // Separators stand alone, everything else is a run of one class.
        let end = if class == CharClass::Separator {
            first.len_utf8()
        } else {
            rest.find(|c: char| CharClass::of(c) != class)
                .unwrap_or(rest.len())
        };
        let (token, tail) = rest.split_at(end);
        rest = tail;

        let component = match token {
            "." => continue,
            "-" => Component::Text("final-".to_string()),
            "pre" | "preview" | "rc" => Component::Text("c".to_string()),
            "dev" => Component::Text("@".to_string()),
            digits if class == CharClass::Digit => {
                let trimmed = digits.trim_start_matches('0');
                Component::Number(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
            }
            text => Component::Text(text.to_string()),
        };
        push_component(&mut components, component);
    }
    push_component(&mut components, Component::Text("final".to_string()));
    components
}

fn push_component(components: &mut Vec<Component>, component: Component) {
    if let Component::Text(text) = &component {
        // A pre-release tag binds to the release before any `-`
        if text.as_str() < "final" {
            while components.last().is_some_and(Component::is_final_marker) {
                components.pop();
            }
        }
        // `1.0a1` and `1a1` are the same
        while components.last().is_some_and(Component::is_zero) {
            components.pop();
        }
    }
    components.push(component);
}

impl LooseVersion {
    /// Wrap any string as a loose version.
    pub fn new(version: impl Into<String>) -> Self {
        let version = version.into();
        let components = parse_components(&version);
        Self {
            version,
            components,
        }
    }

    /// The version as given.
    pub fn as_str(&self) -> &str {
        &self.version
    }

    /// Compare by rank, ignoring spelling: `2.0` and `2` are `Equal`.
    pub fn cmp_loose(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }

    /// Loose versions have no epoch; always `0`.
    pub fn epoch(&self) -> u64 {
        0
    }

    /// Loose versions have no release segment; always `None`.
    pub fn release(&self) -> Option<&[u64]> {
        None
    }

    /// Loose versions have no pre-release segment; always `None`.
    pub fn pre(&self) -> Option<Prerelease> {
        None
    }

    /// Loose versions have no post-release segment; always `None`.
    pub fn post(&self) -> Option<u64> {
        None
    }

    /// Loose versions have no dev-release segment; always `None`.
    pub fn dev(&self) -> Option<u64> {
        None
    }

    /// Loose versions have no local segment; always `None`.
    pub fn local(&self) -> Option<&[LocalSegment]> {
        None
    }

    /// Loose versions are never prereleases.
    pub fn is_prerelease(&self) -> bool {
        false
    }

    /// Loose versions are never dev releases.
    pub fn is_devrelease(&self) -> bool {
        false
    }

    /// Loose versions are never post releases.
    pub fn is_postrelease(&self) -> bool {
        false
    }

    /// The public version, which is the whole string.
    pub fn public(&self) -> &str {
        &self.version
    }

    /// The base version, which is the whole string.
    pub fn base_version(&self) -> &str {
        &self.version
    }
}

impl Display for LooseVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.version)
    }
}

impl FromStr for LooseVersion {
    type Err = Infallible;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(version))
    }
}

impl From<&str> for LooseVersion {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}

impl From<String> for LooseVersion {
    fn from(version: String) -> Self {
        Self::new(version)
    }
}

impl PartialEq for LooseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for LooseVersion {}

impl Hash for LooseVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.hash(state);
    }
}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.cmp_loose(other) {
            Ordering::Equal if self.version != other.version => None,
            ordering => Some(ordering),
        }
    }
}

impl PartialEq<Version> for LooseVersion {
    fn eq(&self, _other: &Version) -> bool {
        false
    }
}

impl PartialOrd<Version> for LooseVersion {
    fn partial_cmp(&self, _other: &Version) -> Option<Ordering> {
        None
    }
}

impl PartialEq<LooseVersion> for Version {
    fn eq(&self, _other: &LooseVersion) -> bool {
        false
    }
}

impl PartialOrd<LooseVersion> for Version {
    fn partial_cmp(&self, _other: &LooseVersion) -> Option<Ordering> {
        None
    }
}

impl<'de> Deserialize<'de> for LooseVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl Serialize for LooseVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.version)
    }
}

/// A comparison such as `>=1-1-1` against a [`LooseVersion`].
///
/// Only `==`, `!=`, `<`, `<=`, `>` and `>=` exist for loose versions. The prerelease flag is kept
/// for parity with [`VersionSpecifier`](crate::VersionSpecifier), but since loose versions are
/// never prereleases it doesn't change what matches.
#[derive(Clone, Debug)]
pub struct LooseSpecifier {
    operator: Operator,
    version: LooseVersion,
    prereleases: Option<bool>,
}

impl LooseSpecifier {
    /// Combine an operator with a version, failing for operators that need PEP 440 semantics.
    pub fn new(operator: Operator, version: LooseVersion) -> Result<Self, LooseSpecifierParseError> {
        match operator {
            Operator::Equal
            | Operator::NotEqual
            | Operator::LessThan
            | Operator::LessThanEqual
            | Operator::GreaterThan
            | Operator::GreaterThanEqual => Ok(Self {
                operator,
                version,
                prereleases: None,
            }),
            Operator::EqualStar
            | Operator::NotEqualStar
            | Operator::ExactEqual
            | Operator::TildeEqual => Err(LooseSpecifierParseError::InvalidOperator(
                operator.to_string(),
            )),
        }
    }

    /// Set or clear the prerelease flag.
    #[must_use]
    pub fn with_prereleases(mut self, prereleases: Option<bool>) -> Self {
        self.prereleases = prereleases;
        self
    }

    /// The comparison operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The version to compare against.
    pub fn version(&self) -> &LooseVersion {
        &self.version
    }

    /// The explicit prerelease flag, `false` if unset.
    pub fn prereleases(&self) -> bool {
        self.prereleases.unwrap_or(false)
    }

    /// Set or clear the prerelease flag.
    pub fn set_prereleases(&mut self, prereleases: Option<bool>) {
        self.prereleases = prereleases;
    }

    /// Whether the loose version satisfies the comparison.
    pub fn contains(&self, version: &LooseVersion) -> bool {
        let ordering = version.cmp_loose(&self.version);
        match self.operator {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::LessThanEqual => ordering != Ordering::Greater,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::GreaterThanEqual => ordering != Ordering::Less,
            // Rejected by the constructor
            Operator::EqualStar
            | Operator::NotEqualStar
            | Operator::ExactEqual
            | Operator::TildeEqual => false,
        }
    }

    /// Like [`LooseSpecifier::contains`], for anything that reads as a version.
    pub fn matches<V: VersionLike + ?Sized>(&self, version: &V) -> bool {
        self.contains(&version.to_loose_version())
    }

    /// Keep the candidates that satisfy the comparison, in order.
    pub fn filter<V: VersionLike>(&self, candidates: impl IntoIterator<Item = V>) -> Vec<V> {
        candidates
            .into_iter()
            .filter(|candidate| self.matches(candidate))
            .collect()
    }
}

impl FromStr for LooseSpecifier {
    type Err = LooseSpecifierParseError;

    /// Parses a comparison such as `>= 1.0-final` or `<2.0dog`.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut s = unscanny::Scanner::new(spec);
        s.eat_whitespace();
        let operator = match s.eat_while(['=', '!', '~', '<', '>']) {
            "" => return Err(LooseSpecifierParseError::MissingOperator),
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "<" => Operator::LessThan,
            "<=" => Operator::LessThanEqual,
            ">" => Operator::GreaterThan,
            ">=" => Operator::GreaterThanEqual,
            other => return Err(LooseSpecifierParseError::InvalidOperator(other.to_string())),
        };
        s.eat_whitespace();
        let version = s.eat_until(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ')'));
        if version.is_empty() {
            return Err(LooseSpecifierParseError::MissingVersion);
        }
        s.eat_whitespace();
        if !s.done() {
            return Err(LooseSpecifierParseError::InvalidTrailing(
                s.after().to_string(),
            ));
        }
        Self::new(operator, LooseVersion::new(version))
    }
}

impl Display for LooseSpecifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

/// Compares operator and spelling; the prerelease flag is ignored.
impl PartialEq for LooseSpecifier {
    fn eq(&self, other: &Self) -> bool {
        self.operator == other.operator && self.version == other.version
    }
}

impl Eq for LooseSpecifier {}

impl Hash for LooseSpecifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.operator.hash(state);
        self.version.hash(state);
    }
}

impl PartialOrd for LooseSpecifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LooseSpecifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.operator
            .cmp(&other.operator)
            .then_with(|| self.version.as_str().cmp(other.version.as_str()))
    }
}

/// A set of [`LooseSpecifier`]s that must all hold, such as `<3,>1-1-1`.
#[derive(Clone, Debug, Default)]
pub struct LooseSpecifiers {
    specifiers: Vec<LooseSpecifier>,
    prereleases: Option<bool>,
}

impl Deref for LooseSpecifiers {
    type Target = [LooseSpecifier];

    fn deref(&self) -> &Self::Target {
        &self.specifiers
    }
}

impl LooseSpecifiers {
    /// The set without any comparisons, which matches everything.
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_unsorted(specifiers: impl IntoIterator<Item = LooseSpecifier>) -> Self {
        Self {
            specifiers: specifiers.into_iter().sorted().dedup().collect(),
            prereleases: None,
        }
    }

    /// The set's flag, or `Some(true)` if a comparison allows prereleases, else `None`.
    pub fn prereleases(&self) -> Option<bool> {
        self.prereleases.or_else(|| {
            self.specifiers
                .iter()
                .any(LooseSpecifier::prereleases)
                .then_some(true)
        })
    }

    /// Set or clear the set's prerelease flag.
    pub fn set_prereleases(&mut self, prereleases: Option<bool>) {
        self.prereleases = prereleases;
    }

    /// Set or clear the set's prerelease flag.
    #[must_use]
    pub fn with_prereleases(mut self, prereleases: Option<bool>) -> Self {
        self.prereleases = prereleases;
        self
    }

    /// Whether the version satisfies every comparison.
    pub fn contains(&self, version: &LooseVersion) -> bool {
        self.specifiers
            .iter()
            .all(|specifier| specifier.contains(version))
    }

    /// Like [`LooseSpecifiers::contains`], for anything that reads as a version.
    pub fn matches<V: VersionLike + ?Sized>(&self, version: &V) -> bool {
        self.contains(&version.to_loose_version())
    }

    /// Keep the candidates that satisfy every comparison, in order.
    pub fn filter<V: VersionLike>(&self, candidates: impl IntoIterator<Item = V>) -> Vec<V> {
        candidates
            .into_iter()
            .filter(|candidate| self.matches(candidate))
            .collect()
    }

    /// The set requiring both `self` and `other`.
    pub fn intersection(&self, other: &Self) -> Result<Self, ConflictingPrereleasesError> {
        let prereleases = merge_prereleases(self.prereleases, other.prereleases)?;
        let mut combined = Self::from_unsorted(self.iter().chain(other.iter()).cloned());
        combined.prereleases = prereleases;
        Ok(combined)
    }
}

impl FromIterator<LooseSpecifier> for LooseSpecifiers {
    fn from_iter<T: IntoIterator<Item = LooseSpecifier>>(iter: T) -> Self {
        Self::from_unsorted(iter)
    }
}

impl From<LooseSpecifier> for LooseSpecifiers {
    fn from(specifier: LooseSpecifier) -> Self {
        Self::from_unsorted([specifier])
    }
}

impl FromStr for LooseSpecifiers {
    type Err = LooseSpecifierParseError;

    fn from_str(specifiers: &str) -> Result<Self, Self::Err> {
        specifiers
            .split(',')
            .filter(|specifier| !specifier.trim().is_empty())
            .map(LooseSpecifier::from_str)
            .collect()
    }
}

impl Display for LooseSpecifiers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let clauses = self.iter().map(ToString::to_string).sorted().join(",");
        f.write_str(&clauses)
    }
}

/// Compares the comparisons as a set; the prerelease flag is ignored.
impl PartialEq for LooseSpecifiers {
    fn eq(&self, other: &Self) -> bool {
        self.specifiers == other.specifiers
    }
}

impl Eq for LooseSpecifiers {}

impl Hash for LooseSpecifiers {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.specifiers.hash(state);
    }
}

impl PartialEq<LooseSpecifier> for LooseSpecifiers {
    fn eq(&self, other: &LooseSpecifier) -> bool {
        matches!(self.specifiers.as_slice(), [only] if only == other)
    }
}

/// An error when parsing a [`LooseSpecifier`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LooseSpecifierParseError {
    /// The comparison doesn't start with an operator.
    #[error("Unexpected end of version specifier, expected operator")]
    MissingOperator,
    /// The operator isn't one of `==`, `!=`, `<`, `<=`, `>`, `>=`.
    #[error("Operator `{0}` can't be used with loose versions, must be one of == != <= >= < >")]
    InvalidOperator(String),
    /// Nothing follows the operator.
    #[error("Unexpected end of version specifier, expected version")]
    MissingVersion,
    /// There is more text after the version.
    #[error("Trailing `{0}` is not allowed")]
    InvalidTrailing(String),
}
