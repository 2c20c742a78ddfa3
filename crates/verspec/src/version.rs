use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::iter;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::infinity::{Extended, Infinity};

/// The PEP 440 version regex from
/// <https://peps.python.org/pep-0440/#appendix-b-parsing-version-strings-with-regular-expressions>,
/// extended with the trailing `.*` of a prefix match.
const VERSION_RE_INNER: &str = r"
    v?                                                # <https://peps.python.org/pep-0440/#preceding-v-character>
    (?:(?P<epoch>[0-9]+)!)?                           # epoch
    (?P<release>[0-9]+(?:\.[0-9]+)*)                  # release segment
    (?P<pre_field>                                    # pre-release
        [-_\.]?
        (?P<pre_name>alpha|a|beta|b|preview|pre|c|rc)
        [-_\.]?
        (?P<pre>[0-9]+)?
    )?
    (?P<post_field>                                   # post release
        (?:-(?P<post_old>[0-9]+))
        |
        (?:
            [-_\.]?
            (?P<post_l>post|rev|r)
            [-_\.]?
            (?P<post_new>[0-9]+)?
        )
    )?
    (?P<dev_field>                                    # dev release
        [-_\.]?
        (?P<dev_l>dev)
        [-_\.]?
        (?P<dev>[0-9]+)?
    )?
    (?:\+(?P<local>[a-z0-9]+(?:[-_\.][a-z0-9]+)*))?   # local version
    (?P<wildcard>\.\*)?                               # prefix match in a specifier
";

/// Matches a version such as `1.19.a1`, anchored and ignoring surrounding whitespace.
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?xi)^\s*{VERSION_RE_INNER}\s*$")).unwrap());

/// The kind of a pre-release: alpha, beta or release candidate.
///
/// <https://peps.python.org/pep-0440/#pre-releases>
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrereleaseKind {
    /// `a`, also spelled `alpha`
    Alpha,
    /// `b`, also spelled `beta`
    Beta,
    /// `rc`, also spelled `c`, `pre` or `preview`
    Rc,
}

impl PrereleaseKind {
    /// Map any accepted spelling (case-insensitive) to its kind.
    fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "a" | "alpha" => Some(Self::Alpha),
            "b" | "beta" => Some(Self::Beta),
            "c" | "rc" | "pre" | "preview" => Some(Self::Rc),
            _ => None,
        }
    }
}

impl Display for PrereleaseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alpha => f.write_str("a"),
            Self::Beta => f.write_str("b"),
            Self::Rc => f.write_str("rc"),
        }
    }
}

/// A pre-release segment such as `a1` or `rc0`, ordered by kind and then number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Prerelease {
    /// Alpha, beta or release candidate.
    pub kind: PrereleaseKind,
    /// The number after the tag, `0` if it was omitted.
    pub number: u64,
}

impl Display for Prerelease {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind, self.number)
    }
}

/// A part of the [local version identifier](<https://peps.python.org/pep-0440/#local-version-identifiers>).
///
/// > If a segment consists entirely of ASCII digits then that section should be considered an
/// > integer for comparison purposes and if a segment contains any ASCII letters then that segment
/// > is compared lexicographically with case insensitivity. When comparing a numeric and
/// > lexicographic segment, the numeric section always compares as greater than the lexicographic
/// > segment.
///
/// The derived `Ord` of `[LocalSegment]` then also gives the PEP 440 rule that a longer local
/// version sorts after a shorter one it starts with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LocalSegment {
    /// A lowercase segment containing at least one letter.
    String(String),
    /// An all-digit segment.
    Number(u64),
}

impl LocalSegment {
    /// All-digit segments are numbers and must fit in a `u64`, like the rest of the version.
    fn parse(segment: &str) -> Result<Self, VersionParseError> {
        if segment.bytes().all(|byte| byte.is_ascii_digit()) {
            parse_number(segment).map(Self::Number)
        } else {
            Ok(Self::String(segment.to_lowercase()))
        }
    }
}

impl Display for LocalSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(string) => write!(f, "{string}"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl PartialOrd for LocalSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LocalSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(n1), Self::Number(n2)) => n1.cmp(n2),
            (Self::String(s1), Self::String(s2)) => s1.cmp(s2),
            (Self::Number(_), Self::String(_)) => Ordering::Greater,
            (Self::String(_), Self::Number(_)) => Ordering::Less,
        }
    }
}

/// A version number such as `1.2.3` or `4!5.6.7-a8.post9.dev0`.
///
/// Parse with [`Version::from_str`]. Equality, hashing and ordering all go through the PEP 440
/// comparison key, so `1.0 == 1.0.0` while `Display` still prints the release as written.
///
/// Beware that sorting with [`Ord`] is not the same as specifier matching: `1.0+local > 1.0`,
/// but `==1.0` matches `1.0+local`.
#[derive(Clone, Debug)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<Prerelease>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<Vec<LocalSegment>>,
}

impl Version {
    /// A final release such as `3.8` from its major number and the numbers after it, e.g.
    /// `Version::new(3, [8])`.
    pub fn new(major: u64, rest: impl IntoIterator<Item = u64>) -> Self {
        let release = std::iter::once(major).chain(rest).collect();
        Self {
            epoch: 0,
            release,
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    /// Replace the epoch.
    #[must_use]
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    /// Replace the pre-release segment.
    #[must_use]
    pub fn with_pre(mut self, pre: Option<Prerelease>) -> Self {
        self.pre = pre;
        self
    }

    /// Replace the post-release number.
    #[must_use]
    pub fn with_post(mut self, post: Option<u64>) -> Self {
        self.post = post;
        self
    }

    /// Replace the dev-release number.
    #[must_use]
    pub fn with_dev(mut self, dev: Option<u64>) -> Self {
        self.dev = dev;
        self
    }

    /// Replace the local version; an empty list removes it.
    #[must_use]
    pub fn with_local(mut self, local: Vec<LocalSegment>) -> Self {
        self.local = (!local.is_empty()).then_some(local);
        self
    }

    /// The public version, i.e. the version without its local segment.
    ///
    /// "local version labels MUST be ignored entirely when checking if candidate versions match a
    /// given version specifier"
    #[must_use]
    pub fn without_local(&self) -> Self {
        Self {
            local: None,
            ..self.clone()
        }
    }

    /// The base version: only the epoch and the release, e.g. `1!2.0` for `1!2.0rc1.post3+abc`.
    #[must_use]
    pub fn only_release(&self) -> Self {
        Self {
            epoch: self.epoch,
            release: self.release.clone(),
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    /// The versioning epoch, `0` unless given as `N!`.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The release numbers, such as `[1, 2, 3]` for `4!1.2.3-a8.post9.dev1`.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// The pre-release segment, if any.
    pub fn pre(&self) -> Option<Prerelease> {
        self.pre
    }

    /// The post-release number, if any.
    pub fn post(&self) -> Option<u64> {
        self.post
    }

    /// The dev-release number, if any.
    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    /// The local version segments such as `[abc, 5]` for `1.0+abc.5`, if any.
    pub fn local(&self) -> Option<&[LocalSegment]> {
        self.local.as_deref()
    }

    /// The first release number.
    pub fn major(&self) -> u64 {
        self.release[0]
    }

    /// The second release number, `0` if there is none.
    pub fn minor(&self) -> u64 {
        self.release.get(1).copied().unwrap_or(0)
    }

    /// The third release number, `0` if there is none.
    pub fn micro(&self) -> u64 {
        self.release.get(2).copied().unwrap_or(0)
    }

    /// Whether this is an alpha/beta/rc or a dev version.
    pub fn any_prerelease(&self) -> bool {
        self.is_pre() || self.is_dev()
    }

    /// Whether this is an alpha/beta/rc version.
    pub fn is_pre(&self) -> bool {
        self.pre.is_some()
    }

    /// Whether this is a dev version.
    pub fn is_dev(&self) -> bool {
        self.dev.is_some()
    }

    /// Whether this is a post version.
    pub fn is_post(&self) -> bool {
        self.post.is_some()
    }

    /// Whether this is a local version (e.g. `1.2.3+localsuffixesareweird`).
    pub fn is_local(&self) -> bool {
        self.local.is_some()
    }

    /// The same version with trailing zeros dropped from the release, keeping at least one
    /// number.
    fn trim_release(&self) -> Self {
        let end = self
            .release
            .iter()
            .rposition(|number| *number != 0)
            .map_or(1, |position| position + 1);
        Self {
            release: self.release[..end].to_vec(),
            ..self.clone()
        }
    }

    /// The key all comparisons of this version go through.
    pub(crate) fn key(&self) -> ComparisonKey<'_> {
        let pre = match (self.pre, self.post, self.dev) {
            // `1.0.dev0` sorts before `1.0a0`, but `1.0.post0.dev0` after `1.0`
            (None, None, Some(_)) => Extended::NEGATIVE_INFINITY,
            (None, ..) => Extended::INFINITY,
            (Some(pre), ..) => Extended::Finite(pre),
        };
        ComparisonKey {
            epoch: self.epoch,
            release: trailing_zeros_trimmed(&self.release),
            pre,
            post: Extended::or_extreme(self.post, Infinity::Negative),
            dev: Extended::or_extreme(self.dev, Infinity::Positive),
            local: Extended::or_extreme(self.local.as_deref(), Infinity::Negative),
        }
    }
}

/// Shows the normalized version.
impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let mut release = self.release.iter();
        if let Some(first) = release.next() {
            write!(f, "{first}")?;
        }
        for number in release {
            write!(f, ".{number}")?;
        }
        if let Some(pre) = self.pre {
            write!(f, "{pre}")?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{post}")?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{dev}")?;
        }
        if let Some(local) = &self.local {
            f.write_str("+")?;
            write_local(f, local)?;
        }
        Ok(())
    }
}

/// Write local segments joined by `.`.
pub(crate) fn write_local(f: &mut Formatter<'_>, local: &[LocalSegment]) -> std::fmt::Result {
    for (i, segment) in local.iter().enumerate() {
        if i > 0 {
            f.write_str(".")?;
        }
        write!(f, "{segment}")?;
    }
    Ok(())
}

/// The release without trailing zeros, so that `1.0` and `1` compare (and hash) the same.
fn trailing_zeros_trimmed(release: &[u64]) -> &[u64] {
    let end = release
        .iter()
        .rposition(|number| *number != 0)
        .map_or(0, |position| position + 1);
    &release[..end]
}

/// Compare two release segments, e.g. `4.3.1` > `4.2`, `1.1.0` == `1.1` and `1.16` < `1.19`.
pub(crate) fn compare_release(this: &[u64], other: &[u64]) -> Ordering {
    // "When comparing release segments with different numbers of components, the shorter segment
    // is padded out with additional zeros as necessary"
    trailing_zeros_trimmed(this).cmp(trailing_zeros_trimmed(other))
}

/// Whether `candidate`'s release starts with `prefix`, padding the candidate with zeros if it is
/// shorter. Extra candidate numbers are ignored, so `2.0.1` starts with `2.0` and `2` with `2.0`.
pub(crate) fn release_starts_with(candidate: &[u64], prefix: &[u64]) -> bool {
    candidate
        .iter()
        .copied()
        .chain(iter::repeat(0))
        .zip(prefix)
        .all(|(candidate, prefix)| candidate == *prefix)
}

/// The PEP 440 sort key: epoch, release without trailing zeros, then the pre, post, dev and local
/// segments, each with missing values mapped to an extreme.
///
/// That gives `1.0.dev456 < 1.0a1 < 1.0a2.dev456 < 1.0a12 < 1.0b2.post345.dev456 < 1.0b2.post345
/// < 1.0rc1 < 1.0 < 1.0+local < 1.0.post456.dev34 < 1.0.post456`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ComparisonKey<'a> {
    epoch: u64,
    release: &'a [u64],
    pre: Extended<Prerelease>,
    post: Extended<u64>,
    dev: Extended<u64>,
    local: Extended<&'a [LocalSegment]>,
}

impl ComparisonKey<'_> {
    /// The key of the public version, ignoring the local segment.
    #[must_use]
    pub(crate) fn without_local(self) -> Self {
        Self {
            local: Extended::NEGATIVE_INFINITY,
            ..self
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    /// Parses a version such as `1.19`, `1.0a1`,`1.0+abc.5` or `1!2012.2`.
    ///
    /// A trailing `.*` is rejected, see [`VersionPattern`] for specifiers.
    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let pattern = VersionPattern::from_str(version)?;
        if pattern.is_wildcard() {
            return Err(VersionParseError::UnexpectedWildcard(version.to_string()));
        }
        Ok(pattern.into_version())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let version = String::deserialize(deserializer)?;
        Self::from_str(&version).map_err(de::Error::custom)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A version that may end in `.*`, as used on the right-hand side of `==` and `!=`.
///
/// * `1.2.3` is not a wildcard
/// * `1.2.3.*` is a wildcard
/// * `1.2.*.4` and `1.0.dev1.*` are errors
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VersionPattern {
    version: Version,
    wildcard: bool,
}

impl VersionPattern {
    /// A pattern matching exactly `version`.
    pub fn verbatim(version: Version) -> Self {
        Self {
            version,
            wildcard: false,
        }
    }

    /// A pattern matching every version starting with `version`, i.e. `version.*`.
    pub fn wildcard(version: Version) -> Self {
        Self {
            version,
            wildcard: true,
        }
    }

    /// The version, without the `.*`.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Consume the pattern, returning the version without the `.*`.
    pub fn into_version(self) -> Version {
        self.version
    }

    /// Whether the pattern ended in `.*`.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }
}

impl FromStr for VersionPattern {
    type Err = VersionParseError;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        let captures = VERSION_RE
            .captures(pattern)
            .ok_or_else(|| VersionParseError::InvalidVersion(pattern.to_string()))?;
        let pattern = parse_captures(&captures)?;
        if pattern.wildcard {
            if pattern.version.is_dev() {
                return Err(VersionParseError::WildcardWithDev);
            }
            if pattern.version.is_local() {
                return Err(VersionParseError::WildcardWithLocal);
            }
        }
        Ok(pattern)
    }
}

/// Build a version (pattern) from the named groups of [`VERSION_RE`].
fn parse_captures(captures: &Captures) -> Result<VersionPattern, VersionParseError> {
    let number = |name: &str| -> Result<Option<u64>, VersionParseError> {
        captures
            .name(name)
            .map(|field| parse_number(field.as_str()))
            .transpose()
    };

    // "If no explicit epoch is given, the implicit epoch is 0"
    let epoch = number("epoch")?.unwrap_or_default();
    let release = captures
        .name("release")
        .map(|release| release.as_str())
        .unwrap_or_default()
        .split('.')
        .map(parse_number)
        .collect::<Result<Vec<u64>, _>>()?;
    let pre = match captures
        .name("pre_name")
        .and_then(|tag| PrereleaseKind::from_tag(tag.as_str()))
    {
        Some(kind) => Some(Prerelease {
            kind,
            // <https://peps.python.org/pep-0440/#implicit-pre-release-number>
            number: number("pre")?.unwrap_or_default(),
        }),
        None => None,
    };
    let post = if captures.name("post_field").is_some() {
        Some(
            number("post_new")?
                .or(number("post_old")?)
                .unwrap_or_default(),
        )
    } else {
        None
    };
    let dev = if captures.name("dev_field").is_some() {
        // <https://peps.python.org/pep-0440/#implicit-development-release-number>
        Some(number("dev")?.unwrap_or_default())
    } else {
        None
    };
    let local = captures
        .name("local")
        .map(|local| {
            local
                .as_str()
                .split(['-', '_', '.'])
                .map(LocalSegment::parse)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    Ok(VersionPattern {
        version: Version {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        },
        wildcard: captures.name("wildcard").is_some(),
    })
}

fn parse_number(digits: &str) -> Result<u64, VersionParseError> {
    digits
        .parse::<u64>()
        .map_err(|_| VersionParseError::NumberTooBig(digits.to_string()))
}

/// Normalize a version string and drop trailing zeros from its release, e.g. `1.0.0` to `1` and
/// `1.4.0rc1` to `1.4rc1`.
///
/// Strings that aren't valid PEP 440 versions are returned unchanged.
pub fn canonicalize_version(version: &str) -> String {
    match Version::from_str(version) {
        Ok(parsed) => parsed.trim_release().to_string(),
        Err(_) => version.to_string(),
    }
}

/// An error when parsing a version or a version pattern.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    /// The string doesn't follow the version grammar.
    #[error("Version `{0}` doesn't match PEP 440 rules")]
    InvalidVersion(String),
    /// A number in the version doesn't fit in 64 bits.
    #[error("Version number `{0}` is larger than {max}", max = u64::MAX)]
    NumberTooBig(String),
    /// A version ended in `.*` outside of a specifier.
    #[error("A star (`*`) must not be used in a fixed version: `{0}`")]
    UnexpectedWildcard(String),
    /// A version pattern combined `.*` with a dev release.
    #[error("You can't have both a trailing `.*` and a dev version")]
    WildcardWithDev,
    /// A version pattern combined `.*` with a local version.
    #[error("You can't have both a trailing `.*` and a local version")]
    WildcardWithLocal,
}

#[cfg(test)]
mod tests;
