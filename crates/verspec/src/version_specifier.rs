use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;
use tracing::{debug, warn};

use crate::version::{compare_release, release_starts_with, write_local};
use crate::{Version, VersionLike, VersionParseError, VersionPattern};

/// One of `~=` `==` `!=` `<=` `>=` `<` `>` `===`
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// `== 1.2.3`
    Equal,
    /// `== 1.2.*`
    EqualStar,
    /// `===` (discouraged)
    ///
    /// <https://peps.python.org/pep-0440/#arbitrary-equality>
    ///
    /// "Use of this operator is heavily discouraged and tooling MAY display a warning when it is used"
    ExactEqual,
    /// `!= 1.2.3`
    NotEqual,
    /// `!= 1.2.*`
    NotEqualStar,
    /// `~=`
    TildeEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEqual,
}

impl Operator {
    /// The prefix-matching variant of `==` and `!=`, `None` for every other operator.
    pub fn to_star(self) -> Option<Self> {
        match self {
            Self::Equal => Some(Self::EqualStar),
            Self::NotEqual => Some(Self::NotEqualStar),
            _ => None,
        }
    }

    /// Whether this operator matches by prefix (`==1.2.*`, `!=1.2.*`).
    pub fn is_star(self) -> bool {
        matches!(self, Self::EqualStar | Self::NotEqualStar)
    }

    /// Whether the operator accepts a version with a local segment.
    ///
    /// <https://peps.python.org/pep-0440/#version-specifiers>: "Except where specifically noted
    /// below, local version identifiers MUST NOT be permitted in version specifiers"
    pub fn is_local_compatible(self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual | Self::ExactEqual)
    }

    /// Operators that let a prerelease in the specifier's own version admit prerelease candidates.
    fn implies_prereleases(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::EqualStar
                | Self::ExactEqual
                | Self::TildeEqual
                | Self::LessThanEqual
                | Self::GreaterThanEqual
        )
    }
}

impl FromStr for Operator {
    type Err = OperatorParseError;

    /// Notably, this does not know about star versions, it just assumes the base operator
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let operator = match s {
            "==" => Self::Equal,
            "===" => {
                warn!("Using arbitrary equality (`===`) is discouraged");
                Self::ExactEqual
            }
            "!=" => Self::NotEqual,
            "~=" => Self::TildeEqual,
            "<" => Self::LessThan,
            "<=" => Self::LessThanEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterThanEqual,
            other => {
                return Err(OperatorParseError {
                    got: other.to_string(),
                });
            }
        };
        Ok(operator)
    }
}

impl Display for Operator {
    /// Note the `EqualStar` is also `==`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Equal => "==",
            // Beware, this doesn't print the star
            Self::EqualStar => "==",
            Self::ExactEqual => "===",
            Self::NotEqual => "!=",
            Self::NotEqualStar => "!=",
            Self::TildeEqual => "~=",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
        };

        write!(f, "{operator}")
    }
}

/// An error that occurs when parsing an invalid version specifier operator.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("No such comparison operator '{got}', must be one of ~= == != <= >= < > ===")]
pub struct OperatorParseError {
    pub(crate) got: String,
}

/// The right-hand side of a specifier: a parsed version, or the raw string of `===`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpecifierVersion {
    /// The version of every operator but `===`.
    Version(Version),
    /// The verbatim string compared by `===`.
    Arbitrary(String),
}

impl SpecifierVersion {
    /// The parsed version, `None` for `===`.
    pub fn as_version(&self) -> Option<&Version> {
        match self {
            Self::Version(version) => Some(version),
            Self::Arbitrary(_) => None,
        }
    }
}

impl Display for SpecifierVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Version(version) => version.fmt(f),
            Self::Arbitrary(raw) => f.write_str(raw),
        }
    }
}

/// A version range such such as `>1.2.3`, `<=4!5.6.7-a8.post9.dev0` or `== 4.1.*`. Parse with
/// `VersionSpecifier::from_str`
///
/// ```rust
/// use std::str::FromStr;
/// use verspec::{Version, VersionSpecifier};
///
/// let version = Version::from_str("1.19").unwrap();
/// let version_specifier = VersionSpecifier::from_str("== 1.*").unwrap();
/// assert!(version_specifier.contains(&version));
/// ```
///
/// Prereleases are only matched when they're allowed: by the explicit flag, or implicitly when
/// the specifier itself names a prerelease with `==`, `===`, `~=`, `<=` or `>=`.
#[derive(Clone, Debug)]
pub struct VersionSpecifier {
    /// ~=|==|!=|<=|>=|<|>|===, plus whether the version ended with a star
    pub(crate) operator: Operator,
    /// The whole version part behind the operator
    pub(crate) version: SpecifierVersion,
    /// The explicit prerelease override
    pub(crate) prereleases: Option<bool>,
}

/// <https://github.com/serde-rs/serde/issues/1316#issue-332908452>
impl<'de> Deserialize<'de> for VersionSpecifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

/// <https://github.com/serde-rs/serde/issues/1316#issue-332908452>
impl Serialize for VersionSpecifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl VersionSpecifier {
    /// Build from parts, validating that the operator is allowed with that version. A wildcard
    /// pattern turns `==` and `!=` into their prefix-matching variants.
    pub fn from_pattern(
        operator: Operator,
        version_pattern: VersionPattern,
    ) -> Result<Self, VersionSpecifierBuildError> {
        let star = version_pattern.is_wildcard();
        let version = version_pattern.into_version();

        // Check if there are star versions and if so, switch operator to star version
        let operator = if star {
            match operator.to_star() {
                Some(starop) => starop,
                None => {
                    return Err(BuildErrorKind::OperatorWithStar { operator }.into());
                }
            }
        } else {
            operator
        };

        Self::from_version(operator, version)
    }

    /// Create a new version specifier from an operator and a version.
    ///
    /// With `===`, the version's normalized form becomes the string to compare against.
    pub fn from_version(
        operator: Operator,
        version: Version,
    ) -> Result<Self, VersionSpecifierBuildError> {
        if operator == Operator::ExactEqual {
            return Ok(Self::arbitrary_equal(version.to_string()));
        }

        if version.is_local() && !operator.is_local_compatible() {
            return Err(BuildErrorKind::OperatorLocalCombo { operator, version }.into());
        }

        if operator.is_star() && version.is_dev() {
            return Err(BuildErrorKind::OperatorStarDev { operator }.into());
        }

        if operator == Operator::TildeEqual && version.release().len() < 2 {
            return Err(BuildErrorKind::CompatibleRelease.into());
        }

        Ok(Self {
            operator,
            version: SpecifierVersion::Version(version),
            prereleases: None,
        })
    }

    /// `===<version>`, comparing the candidate's text verbatim.
    pub fn arbitrary_equal(version: impl Into<String>) -> Self {
        Self {
            operator: Operator::ExactEqual,
            version: SpecifierVersion::Arbitrary(version.into()),
            prereleases: None,
        }
    }

    /// Get the operator, e.g. `>=` in `>= 2.0.0`
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Get the version, e.g. `2.0.0` in `<= 2.0.0`
    pub fn version(&self) -> &SpecifierVersion {
        &self.version
    }

    /// Whether prereleases match: the explicit flag if set, otherwise whether the specifier's
    /// own version is a prerelease under an operator that includes it.
    pub fn prereleases(&self) -> bool {
        self.prereleases.unwrap_or_else(|| self.implies_prereleases())
    }

    /// Set or clear the explicit prerelease flag.
    pub fn set_prereleases(&mut self, prereleases: Option<bool>) {
        self.prereleases = prereleases;
    }

    /// Set or clear the explicit prerelease flag.
    #[must_use]
    pub fn with_prereleases(mut self, prereleases: Option<bool>) -> Self {
        self.prereleases = prereleases;
        self
    }

    fn implies_prereleases(&self) -> bool {
        if !self.operator.implies_prereleases() {
            return false;
        }
        match &self.version {
            SpecifierVersion::Version(version) => version.any_prerelease(),
            SpecifierVersion::Arbitrary(raw) => {
                Version::from_str(raw).is_ok_and(|version| version.any_prerelease())
            }
        }
    }

    /// The prerelease policy without a call-site override: `None` unless it was set or implied.
    pub(crate) fn prerelease_policy(&self) -> Option<bool> {
        self.prereleases
            .or_else(|| self.implies_prereleases().then_some(true))
    }

    /// Whether the given version satisfies the specifier, using the specifier's prerelease
    /// policy.
    ///
    /// See:
    /// - <https://peps.python.org/pep-0440/#version-specifiers>
    /// - <https://github.com/pypa/packaging/blob/e184feef1a28a5c574ec41f5c263a3a573861f5a/packaging/specifiers.py#L362-L496>
    pub fn contains(&self, version: &Version) -> bool {
        self.contains_with(version, None)
    }

    /// Like [`VersionSpecifier::contains`], with `prereleases` overriding the specifier's
    /// policy when set.
    pub fn contains_with(&self, version: &Version, prereleases: Option<bool>) -> bool {
        if version.any_prerelease() && !prereleases.unwrap_or_else(|| self.prereleases()) {
            return false;
        }
        self.matches_operator(version, None)
    }

    /// Like [`VersionSpecifier::contains_with`], for anything that reads as a version.
    ///
    /// Text and loose versions are parsed first. `===` compares the text even if it isn't a
    /// valid version; every other operator returns the parse error.
    pub fn matches<V: VersionLike + ?Sized>(
        &self,
        candidate: &V,
        prereleases: Option<bool>,
    ) -> Result<bool, VersionParseError> {
        let text = candidate.version_text();
        match candidate.to_version() {
            Ok(version) => {
                if version.any_prerelease() && !prereleases.unwrap_or_else(|| self.prereleases())
                {
                    return Ok(false);
                }
                Ok(self.matches_operator(&version, Some(text.as_ref())))
            }
            Err(_) if self.operator == Operator::ExactEqual => Ok(self.matches_arbitrary(&text)),
            Err(err) => Err(err),
        }
    }

    /// Keep the candidates that satisfy the specifier, in order.
    ///
    /// Prereleases are dropped unless allowed by `prereleases` or the specifier. If no policy
    /// applies and only prereleases match, the prereleases are returned. Candidates that aren't
    /// valid versions are skipped.
    pub fn filter<V: VersionLike>(
        &self,
        candidates: impl IntoIterator<Item = V>,
        prereleases: Option<bool>,
    ) -> Vec<V> {
        filter_prereleases(
            candidates,
            prereleases.or_else(|| self.prerelease_policy()),
            |candidate| self.matches(candidate, Some(true)),
        )
    }

    /// The operator semantics, ignoring whether prereleases are allowed.
    ///
    /// `text` is the candidate as it was written, for `===`. Parsed versions use their
    /// normalized form.
    pub(crate) fn matches_operator(&self, version: &Version, text: Option<&str>) -> bool {
        let this = match &self.version {
            SpecifierVersion::Version(this) => this,
            SpecifierVersion::Arbitrary(_) => {
                return match text {
                    Some(text) => self.matches_arbitrary(text),
                    None => self.matches_arbitrary(&version.to_string()),
                };
            }
        };

        // "Except where specifically noted below, local version identifiers MUST NOT be permitted
        // in version specifiers, and local version labels MUST be ignored entirely when checking
        // if candidate versions match a given version specifier."
        let other = if this.is_local() {
            version.key()
        } else {
            version.key().without_local()
        };
        let public = version.key().without_local();

        match self.operator {
            Operator::Equal => other == this.key(),
            Operator::NotEqual => other != this.key(),
            Operator::EqualStar => Self::prefix_matches(this, version),
            Operator::NotEqualStar => !Self::prefix_matches(this, version),
            Operator::TildeEqual => {
                // "For a given release identifier V.N, the compatible release clause is
                // approximately equivalent to the pair of comparison clauses: `>= V.N, == V.*`"
                let Some((_, prefix)) = this.release().split_last() else {
                    return false;
                };
                public >= this.key()
                    && this.epoch() == version.epoch()
                    && release_starts_with(version.release(), prefix)
            }
            Operator::LessThanEqual => public <= this.key(),
            Operator::GreaterThanEqual => public >= this.key(),
            Operator::LessThan => {
                // `<3.1` must not match `3.1.dev0`, unless the specifier is a prerelease itself
                let excluded = !this.any_prerelease()
                    && version.any_prerelease()
                    && Self::same_base(this, version);
                public < this.key() && !excluded
            }
            Operator::GreaterThan => {
                // `>3.1` must not match `3.1.post0`, unless the specifier is a post release itself
                let excluded =
                    !this.is_post() && version.is_post() && Self::same_base(this, version);
                public > this.key() && !excluded
            }
            // Stored as `SpecifierVersion::Arbitrary`
            Operator::ExactEqual => false,
        }
    }

    fn matches_arbitrary(&self, text: &str) -> bool {
        matches!(&self.version, SpecifierVersion::Arbitrary(raw) if raw == text)
    }

    /// `==1.2.*`: the candidate's release, zero padded or truncated to the pattern's length,
    /// equals the pattern's release. A pre or post release in the pattern must match exactly.
    fn prefix_matches(pattern: &Version, version: &Version) -> bool {
        if pattern.epoch() != version.epoch() {
            return false;
        }
        if pattern.pre().is_none() && pattern.post().is_none() {
            return release_starts_with(version.release(), pattern.release());
        }
        compare_release(pattern.release(), version.release()) == Ordering::Equal
            && pattern.pre() == version.pre()
            && (pattern.post().is_none() || pattern.post() == version.post())
    }

    /// Same epoch and same release, ignoring trailing zeros.
    fn same_base(this: &Version, other: &Version) -> bool {
        this.epoch() == other.epoch()
            && compare_release(this.release(), other.release()) == Ordering::Equal
    }

    /// For `~=` and the star operators, `2.0` and `2.0.0` mean different things.
    fn release_length_matters(&self) -> bool {
        matches!(
            self.operator,
            Operator::TildeEqual | Operator::EqualStar | Operator::NotEqualStar
        )
    }
}

impl FromStr for VersionSpecifier {
    type Err = VersionSpecifierParseError;

    /// Parses a version such as `>= 1.19`, `== 1.1.*`,`~=1.0+abc.5` or `<=1!2012.2`
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut s = unscanny::Scanner::new(spec);
        s.eat_while(|c: char| c.is_whitespace());
        // operator but we don't know yet if it has a star
        let operator = s.eat_while(['=', '!', '~', '<', '>']);
        if operator.is_empty() {
            return Err(ParseErrorKind::MissingOperator.into());
        }
        let operator = Operator::from_str(operator).map_err(ParseErrorKind::InvalidOperator)?;
        s.eat_while(|c: char| c.is_whitespace());
        let version = s.eat_while(|c: char| !c.is_whitespace());
        if version.is_empty() {
            return Err(ParseErrorKind::MissingVersion.into());
        }
        let version_specifier = if operator == Operator::ExactEqual {
            Self::arbitrary_equal(version)
        } else {
            let vpat = version.parse().map_err(ParseErrorKind::InvalidVersion)?;
            Self::from_pattern(operator, vpat).map_err(ParseErrorKind::InvalidSpecifier)?
        };
        s.eat_while(|c: char| c.is_whitespace());
        if !s.done() {
            return Err(ParseErrorKind::InvalidTrailing(s.after().to_string()).into());
        }
        Ok(version_specifier)
    }
}

impl Display for VersionSpecifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.operator.is_star() {
            return write!(f, "{}{}.*", self.operator, self.version);
        }
        write!(f, "{}{}", self.operator, self.version)
    }
}

/// Compares the operator and the canonical version; the prerelease flag is ignored.
impl PartialEq for VersionSpecifier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionSpecifier {}

impl Hash for VersionSpecifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.operator.hash(state);
        match &self.version {
            SpecifierVersion::Version(version) => {
                version.hash(state);
                if self.release_length_matters() {
                    version.release().hash(state);
                }
            }
            SpecifierVersion::Arbitrary(raw) => raw.hash(state),
        }
    }
}

impl PartialOrd for VersionSpecifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionSpecifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.operator
            .cmp(&other.operator)
            .then_with(|| match (&self.version, &other.version) {
                (SpecifierVersion::Version(this), SpecifierVersion::Version(other)) => {
                    let ordering = this.cmp(other);
                    if self.release_length_matters() {
                        ordering.then_with(|| this.release().cmp(other.release()))
                    } else {
                        ordering
                    }
                }
                (SpecifierVersion::Arbitrary(this), SpecifierVersion::Arbitrary(other)) => {
                    this.cmp(other)
                }
                (SpecifierVersion::Version(_), SpecifierVersion::Arbitrary(_)) => Ordering::Less,
                (SpecifierVersion::Arbitrary(_), SpecifierVersion::Version(_)) => {
                    Ordering::Greater
                }
            })
    }
}

/// Sorted version specifiers, such as `>=2.1,<3`.
///
/// Python requirements can contain multiple version specifier so we need to store them in a list,
/// such as `>1.2,<2.0` being `[">1.2", "<2.0"]`. Duplicates are removed, and two sets are equal
/// if they hold the same specifiers.
///
/// ```rust
/// # use std::str::FromStr;
/// # use verspec::{VersionSpecifiers, Version, Operator};
///
/// let version = Version::from_str("1.19").unwrap();
/// let version_specifiers = VersionSpecifiers::from_str(">=1.16, <2.0").unwrap();
/// assert!(version_specifiers.contains(&version));
/// // VersionSpecifiers derefs into a list of specifiers
/// assert_eq!(version_specifiers.iter().position(|specifier| specifier.operator() == Operator::LessThan), Some(1));
/// ```
#[derive(Clone, Debug, Default)]
pub struct VersionSpecifiers {
    specifiers: Vec<VersionSpecifier>,
    prereleases: Option<bool>,
}

impl Deref for VersionSpecifiers {
    type Target = [VersionSpecifier];

    fn deref(&self) -> &Self::Target {
        &self.specifiers
    }
}

impl VersionSpecifiers {
    /// Matches all versions.
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_unsorted(specifiers: impl IntoIterator<Item = VersionSpecifier>) -> Self {
        Self {
            specifiers: specifiers.into_iter().sorted().dedup().collect(),
            prereleases: None,
        }
    }

    /// The set's prerelease policy: the explicit flag, else `Some(true)` if any specifier allows
    /// prereleases, else `None`, which excludes them.
    pub fn prereleases(&self) -> Option<bool> {
        self.prereleases.or_else(|| {
            self.specifiers
                .iter()
                .any(VersionSpecifier::prereleases)
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

    /// Whether all specifiers match the given version, using the set's prerelease policy.
    pub fn contains(&self, version: &Version) -> bool {
        self.contains_with(version, None)
    }

    /// Like [`VersionSpecifiers::contains`], with `prereleases` overriding the set's policy when
    /// set.
    pub fn contains_with(&self, version: &Version, prereleases: Option<bool>) -> bool {
        self.evaluate(version, None, prereleases)
    }

    /// Like [`VersionSpecifiers::contains_with`], for anything that reads as a version.
    ///
    /// Returns the parse error if the candidate isn't a valid version, unless every specifier
    /// is a `===` comparison.
    pub fn matches<V: VersionLike + ?Sized>(
        &self,
        candidate: &V,
        prereleases: Option<bool>,
    ) -> Result<bool, VersionParseError> {
        let text = candidate.version_text();
        match candidate.to_version() {
            Ok(version) => Ok(self.evaluate(&version, Some(text.as_ref()), prereleases)),
            Err(_)
                if !self.is_empty()
                    && self
                        .iter()
                        .all(|specifier| specifier.operator == Operator::ExactEqual) =>
            {
                Ok(self
                    .iter()
                    .all(|specifier| specifier.matches_arbitrary(&text)))
            }
            Err(err) => Err(err),
        }
    }

    /// Keep the candidates that satisfy all specifiers, in order.
    ///
    /// Prereleases are dropped unless allowed by `prereleases` or the set. If no policy applies
    /// and only prereleases match, the prereleases are returned. Candidates that aren't valid
    /// versions are skipped.
    pub fn filter<V: VersionLike>(
        &self,
        candidates: impl IntoIterator<Item = V>,
        prereleases: Option<bool>,
    ) -> Vec<V> {
        filter_prereleases(
            candidates,
            prereleases.or_else(|| self.prereleases()),
            |candidate| self.matches(candidate, Some(true)),
        )
    }

    /// The set requiring both `self` and `other`.
    ///
    /// The prerelease flags merge: an unset flag takes the other one, and `true` can't be
    /// combined with `false`.
    pub fn intersection(&self, other: &Self) -> Result<Self, ConflictingPrereleasesError> {
        let prereleases = merge_prereleases(self.prereleases, other.prereleases)?;
        let mut combined = Self::from_unsorted(self.iter().chain(other.iter()).cloned());
        combined.prereleases = prereleases;
        Ok(combined)
    }

    fn evaluate(&self, version: &Version, text: Option<&str>, prereleases: Option<bool>) -> bool {
        if version.any_prerelease() && !prereleases.or_else(|| self.prereleases()).unwrap_or(false)
        {
            return false;
        }
        self.iter()
            .all(|specifier| specifier.matches_operator(version, text))
    }
}

impl FromIterator<VersionSpecifier> for VersionSpecifiers {
    fn from_iter<T: IntoIterator<Item = VersionSpecifier>>(iter: T) -> Self {
        Self::from_unsorted(iter)
    }
}

impl FromStr for VersionSpecifiers {
    type Err = VersionSpecifiersParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_version_specifiers(s).map(Self::from_unsorted)
    }
}

impl From<VersionSpecifier> for VersionSpecifiers {
    fn from(specifier: VersionSpecifier) -> Self {
        Self::from_unsorted([specifier])
    }
}

impl Display for VersionSpecifiers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let clauses = self.iter().map(ToString::to_string).sorted().join(",");
        f.write_str(&clauses)
    }
}

/// Compares the specifiers as a set; the prerelease flags are ignored.
impl PartialEq for VersionSpecifiers {
    fn eq(&self, other: &Self) -> bool {
        self.specifiers == other.specifiers
    }
}

impl Eq for VersionSpecifiers {}

impl Hash for VersionSpecifiers {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.specifiers.hash(state);
    }
}

impl PartialEq<VersionSpecifier> for VersionSpecifiers {
    fn eq(&self, other: &VersionSpecifier) -> bool {
        matches!(self.specifiers.as_slice(), [only] if only == other)
    }
}

impl<'de> Deserialize<'de> for VersionSpecifiers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

impl Serialize for VersionSpecifiers {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Combine two prerelease flags, failing if one is `true` and the other `false`.
pub(crate) fn merge_prereleases(
    left: Option<bool>,
    right: Option<bool>,
) -> Result<Option<bool>, ConflictingPrereleasesError> {
    match (left, right) {
        (None, other) | (other, None) => Ok(other),
        (Some(left), Some(right)) if left == right => Ok(Some(left)),
        (Some(_), Some(_)) => Err(ConflictingPrereleasesError),
    }
}

/// Split matching candidates into releases and prereleases and apply the prerelease policy.
///
/// With `Some(true)` prereleases are kept, with `Some(false)` they are dropped. With `None` they
/// are only returned if no release matched.
fn filter_prereleases<V: VersionLike>(
    candidates: impl IntoIterator<Item = V>,
    prereleases: Option<bool>,
    matches: impl Fn(&V) -> Result<bool, VersionParseError>,
) -> Vec<V> {
    let mut accepted = Vec::new();
    let mut hidden = Vec::new();
    for candidate in candidates {
        match matches(&candidate) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                debug!("Skipping `{}`: {err}", candidate.version_text());
                continue;
            }
        }
        let is_prerelease = candidate
            .to_version()
            .is_ok_and(|version| version.any_prerelease());
        match (is_prerelease, prereleases) {
            (false, _) | (true, Some(true)) => accepted.push(candidate),
            (true, None) => hidden.push(candidate),
            (true, Some(false)) => {}
        }
    }
    if accepted.is_empty() && !hidden.is_empty() {
        debug!(
            "Only prereleases match, using {} prerelease candidate(s)",
            hidden.len()
        );
        return hidden;
    }
    accepted
}

/// Intersecting specifier sets where one allows prereleases and the other forbids them.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("Cannot combine specifier sets with conflicting prerelease overrides")]
pub struct ConflictingPrereleasesError;

/// Error with span information (unicode width) inside the parsed line
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct VersionSpecifiersParseError {
    // Clippy complains about this error type being too big (at time of
    // writing, over 150 bytes). That does seem a little big, so we box things.
    inner: Box<VersionSpecifiersParseErrorInner>,
}

#[derive(Debug, Eq, PartialEq, Clone)]
struct VersionSpecifiersParseErrorInner {
    /// The underlying error that occurred.
    err: VersionSpecifierParseError,
    /// The string that failed to parse
    line: String,
    /// The starting byte offset into the original string where the error
    /// occurred.
    start: usize,
    /// The ending byte offset into the original string where the error
    /// occurred.
    end: usize,
}

impl Display for VersionSpecifiersParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use unicode_width::UnicodeWidthStr;

        let VersionSpecifiersParseErrorInner {
            ref err,
            ref line,
            start,
            end,
        } = *self.inner;
        writeln!(f, "Failed to parse version: {err}:")?;
        writeln!(f, "{line}")?;
        let indent = line[..start].width();
        let point = line[start..end].width();
        writeln!(f, "{}{}", " ".repeat(indent), "^".repeat(point))?;
        Ok(())
    }
}

impl VersionSpecifiersParseError {
    /// The string that failed to parse
    pub fn line(&self) -> &str {
        &self.inner.line
    }
}

impl std::error::Error for VersionSpecifiersParseError {}

/// An error that can occur when constructing a version specifier.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error(transparent)]
pub struct VersionSpecifierBuildError {
    // We box to shrink the error type's size. This in turn keeps Result<T, E>
    // smaller and should lead to overall better codegen.
    kind: Box<BuildErrorKind>,
}

/// The specific kind of error that can occur when building a version specifier
/// from an operator and version pair.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
enum BuildErrorKind {
    /// A version with a local segment and an operator that ignores them.
    #[error(
        "Operator {operator} is incompatible with versions containing non-empty local segments (`+{}`)",
        LocalDisplay(.version)
    )]
    OperatorLocalCombo { operator: Operator, version: Version },
    /// A wildcard with an operator other than `==` and `!=`.
    #[error("Operator {operator} cannot be used with a wildcard version specifier")]
    OperatorWithStar { operator: Operator },
    /// A wildcard after a dev release, e.g. `==1.0.dev1.*`.
    #[error("Operator {operator} cannot be used with a wildcard and a dev version")]
    OperatorStarDev { operator: Operator },
    /// `~=` with a single release number.
    #[error("The ~= operator requires at least two segments in the release version")]
    CompatibleRelease,
}

/// Shows the local segments of a version without the `+`.
struct LocalDisplay<'a>(&'a Version);

impl Display for LocalDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_local(f, self.0.local().unwrap_or_default())
    }
}

impl From<BuildErrorKind> for VersionSpecifierBuildError {
    fn from(kind: BuildErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }
}

/// An error that can occur when parsing or constructing a version specifier.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error(transparent)]
pub struct VersionSpecifierParseError {
    // We box to shrink the error type's size. This in turn keeps Result<T, E>
    // smaller and should lead to overall better codegen.
    kind: Box<ParseErrorKind>,
}

/// The specific kind of error that occurs when parsing a single version
/// specifier from a string.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
enum ParseErrorKind {
    #[error(transparent)]
    InvalidOperator(OperatorParseError),
    #[error(transparent)]
    InvalidVersion(VersionParseError),
    #[error(transparent)]
    InvalidSpecifier(VersionSpecifierBuildError),
    #[error("Unexpected end of version specifier, expected operator")]
    MissingOperator,
    #[error("Unexpected end of version specifier, expected version")]
    MissingVersion,
    #[error("Trailing `{0}` is not allowed")]
    InvalidTrailing(String),
}

impl From<ParseErrorKind> for VersionSpecifierParseError {
    fn from(kind: ParseErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }
}

/// Parse a list of specifiers such as `>= 1.0, != 1.3.*, < 2.0`, skipping blank items.
pub(crate) fn parse_version_specifiers(
    spec: &str,
) -> Result<Vec<VersionSpecifier>, VersionSpecifiersParseError> {
    let mut version_ranges = Vec::new();
    let mut start: usize = 0;
    let separator = ",";
    for version_range_spec in spec.split(separator) {
        if !version_range_spec.trim().is_empty() {
            let version_range = VersionSpecifier::from_str(version_range_spec).map_err(|err| {
                VersionSpecifiersParseError {
                    inner: Box::new(VersionSpecifiersParseErrorInner {
                        err,
                        line: spec.to_string(),
                        start,
                        end: start + version_range_spec.len(),
                    }),
                }
            })?;
            version_ranges.push(version_range);
        }
        start += version_range_spec.len();
        start += separator.len();
    }
    Ok(version_ranges)
}
