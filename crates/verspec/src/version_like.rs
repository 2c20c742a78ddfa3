use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use tracing::trace;

use crate::{LooseVersion, Version, VersionParseError};

/// Anything a specifier can be matched against: parsed versions of either kind, or plain text.
///
/// Strict specifiers call [`VersionLike::to_version`], which re-parses text and loose versions;
/// loose specifiers call [`VersionLike::to_loose_version`], which always succeeds.
pub trait VersionLike {
    /// The version as text; parsed PEP 440 versions give their normalized form.
    fn version_text(&self) -> Cow<'_, str>;

    /// The PEP 440 version, parsing if necessary.
    fn to_version(&self) -> Result<Cow<'_, Version>, VersionParseError>;

    /// The loose version of the same text.
    fn to_loose_version(&self) -> Cow<'_, LooseVersion>;
}

impl VersionLike for Version {
    fn version_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn to_version(&self) -> Result<Cow<'_, Version>, VersionParseError> {
        Ok(Cow::Borrowed(self))
    }

    fn to_loose_version(&self) -> Cow<'_, LooseVersion> {
        Cow::Owned(LooseVersion::new(self.to_string()))
    }
}

impl VersionLike for LooseVersion {
    fn version_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }

    fn to_version(&self) -> Result<Cow<'_, Version>, VersionParseError> {
        Version::from_str(self.as_str()).map(Cow::Owned)
    }

    fn to_loose_version(&self) -> Cow<'_, LooseVersion> {
        Cow::Borrowed(self)
    }
}

impl VersionLike for str {
    fn version_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }

    fn to_version(&self) -> Result<Cow<'_, Version>, VersionParseError> {
        Version::from_str(self).map(Cow::Owned)
    }

    fn to_loose_version(&self) -> Cow<'_, LooseVersion> {
        Cow::Owned(LooseVersion::new(self))
    }
}

impl VersionLike for String {
    fn version_text(&self) -> Cow<'_, str> {
        self.as_str().version_text()
    }

    fn to_version(&self) -> Result<Cow<'_, Version>, VersionParseError> {
        self.as_str().to_version()
    }

    fn to_loose_version(&self) -> Cow<'_, LooseVersion> {
        self.as_str().to_loose_version()
    }
}

impl VersionLike for AnyVersion {
    fn version_text(&self) -> Cow<'_, str> {
        match self {
            Self::Strict(version) => version.version_text(),
            Self::Loose(version) => version.version_text(),
        }
    }

    fn to_version(&self) -> Result<Cow<'_, Version>, VersionParseError> {
        match self {
            Self::Strict(version) => version.to_version(),
            Self::Loose(version) => version.to_version(),
        }
    }

    fn to_loose_version(&self) -> Cow<'_, LooseVersion> {
        match self {
            Self::Strict(version) => version.to_loose_version(),
            Self::Loose(version) => version.to_loose_version(),
        }
    }
}

impl<T: VersionLike + ?Sized> VersionLike for &T {
    fn version_text(&self) -> Cow<'_, str> {
        (**self).version_text()
    }

    fn to_version(&self) -> Result<Cow<'_, Version>, VersionParseError> {
        (**self).to_version()
    }

    fn to_loose_version(&self) -> Cow<'_, LooseVersion> {
        (**self).to_loose_version()
    }
}

/// A PEP 440 version if the text allows it, otherwise a loose version.
///
/// Versions of different kinds are incomparable: they are never equal and `partial_cmp` returns
/// `None`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnyVersion {
    /// A version following PEP 440.
    Strict(Version),
    /// Anything else.
    Loose(LooseVersion),
}

impl AnyVersion {
    /// Parse as a PEP 440 version, falling back to a loose version.
    pub fn parse(version: &str) -> Self {
        match Version::from_str(version) {
            Ok(version) => Self::Strict(version),
            Err(err) => {
                trace!("Using a loose version for `{version}`: {err}");
                Self::Loose(LooseVersion::new(version))
            }
        }
    }

    /// Whether this is an alpha/beta/rc or dev version; loose versions never are.
    pub fn is_prerelease(&self) -> bool {
        match self {
            Self::Strict(version) => version.any_prerelease(),
            Self::Loose(version) => version.is_prerelease(),
        }
    }
}

impl From<Version> for AnyVersion {
    fn from(version: Version) -> Self {
        Self::Strict(version)
    }
}

impl From<LooseVersion> for AnyVersion {
    fn from(version: LooseVersion) -> Self {
        Self::Loose(version)
    }
}

impl FromStr for AnyVersion {
    type Err = std::convert::Infallible;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(version))
    }
}

impl Display for AnyVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict(version) => version.fmt(f),
            Self::Loose(version) => version.fmt(f),
        }
    }
}

impl PartialOrd for AnyVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Strict(this), Self::Strict(other)) => Some(this.cmp(other)),
            (Self::Loose(this), Self::Loose(other)) => this.partial_cmp(other),
            (Self::Strict(_), Self::Loose(_)) | (Self::Loose(_), Self::Strict(_)) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[traced_test]
    #[test]
    fn parse_falls_back_to_loose() {
        assert_eq!(
            AnyVersion::parse("1.0rc1"),
            AnyVersion::Strict(Version::from_str("1.0rc1").unwrap())
        );
        assert_eq!(
            AnyVersion::parse("2.0dog"),
            AnyVersion::Loose(LooseVersion::new("2.0dog"))
        );
        assert!(logs_contain("Using a loose version for `2.0dog`"));
    }

    #[test]
    fn mixed_kinds_are_incomparable() {
        let strict = AnyVersion::parse("1.0");
        let loose = AnyVersion::parse("1.0-foo bar");
        assert_ne!(strict, loose);
        assert_eq!(strict.partial_cmp(&loose), None);
        assert_eq!(loose.partial_cmp(&strict), None);
        assert!(!(strict < loose) && !(strict > loose));

        assert!(AnyVersion::parse("1.0") < AnyVersion::parse("1.1a1"));
        assert!(AnyVersion::parse("1.0 final") < AnyVersion::parse("1.1 final"));
    }

    #[test]
    fn conversions() {
        let text = "1.0-RC1";
        assert_eq!(text.version_text(), "1.0-RC1");
        assert_eq!(
            *text.to_version().unwrap(),
            Version::from_str("1.0rc1").unwrap()
        );
        assert_eq!(*text.to_loose_version(), LooseVersion::new("1.0-RC1"));

        let version = Version::from_str(text).unwrap();
        assert_eq!(version.version_text(), "1.0rc1");
        assert!(matches!(version.to_version(), Ok(Cow::Borrowed(_))));

        let loose = LooseVersion::new("lolwat");
        assert!(matches!(loose.to_loose_version(), Cow::Borrowed(_)));
        assert_eq!(
            loose.to_version().unwrap_err(),
            VersionParseError::InvalidVersion("lolwat".to_string())
        );

        assert!(AnyVersion::parse("1.0.dev1").is_prerelease());
        assert!(!AnyVersion::parse("1.0.dev1 nightly").is_prerelease());
    }
}
