use std::collections::HashSet;
use std::str::FromStr;

use test_case::test_case;

use super::*;

/// <https://github.com/pypa/packaging/blob/237ff3aa348486cf835a980592af3a59fccd6101/tests/test_version.py#L24-L81>
const VERSIONS_ALL: &[&str] = &[
    // Implicit epoch of 0
    "1.0.dev456",
    "1.0a1",
    "1.0a2.dev456",
    "1.0a12.dev456",
    "1.0a12",
    "1.0b1.dev456",
    "1.0b2",
    "1.0b2.post345.dev456",
    "1.0b2.post345",
    "1.0b2-346",
    "1.0c1.dev456",
    "1.0c1",
    "1.0rc2",
    "1.0c3",
    "1.0",
    "1.0.post456.dev34",
    "1.0.post456",
    "1.1.dev1",
    "1.2+123abc",
    "1.2+123abc456",
    "1.2+abc",
    "1.2+abc123",
    "1.2+abc123def",
    "1.2+1234.abc",
    "1.2+123456",
    "1.2.r32+123456",
    "1.2.rev33+123456",
    // Explicit epoch of 1
    "1!1.0.dev456",
    "1!1.0a1",
    "1!1.0a2.dev456",
    "1!1.0a12.dev456",
    "1!1.0a12",
    "1!1.0b1.dev456",
    "1!1.0b2",
    "1!1.0b2.post345.dev456",
    "1!1.0b2.post345",
    "1!1.0b2-346",
    "1!1.0c1.dev456",
    "1!1.0c1",
    "1!1.0rc2",
    "1!1.0c3",
    "1!1.0",
    "1!1.0.post456.dev34",
    "1!1.0.post456",
    "1!1.1.dev1",
    "1!1.2+123abc",
    "1!1.2+123abc456",
    "1!1.2+abc",
    "1!1.2+abc123",
    "1!1.2+abc123def",
    "1!1.2+1234.abc",
    "1!1.2+123456",
    "1!1.2.r32+123456",
    "1!1.2.rev33+123456",
];

fn parse(version: &str) -> Version {
    Version::from_str(version).unwrap()
}

/// Every pair from the ordered list compares in list order, through the same key for all
/// operators.
#[test]
fn total_order() {
    let versions: Vec<Version> = VERSIONS_ALL.iter().map(|version| parse(version)).collect();
    for (i, a) in versions.iter().enumerate() {
        for (j, b) in versions.iter().enumerate() {
            assert_eq!(a.cmp(b), i.cmp(&j), "{a} vs {b}");
            assert_eq!(a == b, i == j, "{a} == {b}");
        }
    }

    let mut shuffled = versions.clone();
    shuffled.reverse();
    shuffled.sort();
    assert_eq!(shuffled, versions);
}

/// <https://github.com/pypa/packaging/blob/237ff3aa348486cf835a980592af3a59fccd6101/tests/test_version.py#L91-L100>
#[test_case("french toast" ; "nonsense")]
#[test_case("1.0+a+" ; "double plus")]
#[test_case("1.0++" ; "empty local")]
#[test_case("1.0+_foobar" ; "local leading separator")]
#[test_case("1.0+foo&asd" ; "local ampersand")]
#[test_case("1.0+1+1" ; "two locals")]
#[test_case("1.2.*.4" ; "star in the middle")]
#[test_case("" ; "empty")]
fn invalid_versions(version: &str) {
    assert_eq!(
        Version::from_str(version).unwrap_err(),
        VersionParseError::InvalidVersion(version.to_string())
    );
}

#[test]
fn invalid_version_message() {
    insta::assert_snapshot!(
        Version::from_str("blergh").unwrap_err(),
        @"Version `blergh` doesn't match PEP 440 rules"
    );
}

#[test]
fn number_too_big() {
    let err = Version::from_str("1.18446744073709551616").unwrap_err();
    assert_eq!(
        err,
        VersionParseError::NumberTooBig("18446744073709551616".to_string())
    );
    insta::assert_snapshot!(
        err,
        @"Version number `18446744073709551616` is larger than 18446744073709551615"
    );
}

#[test]
fn local_number_too_big() {
    assert_eq!(
        Version::from_str("1.0+18446744073709551616").unwrap_err(),
        VersionParseError::NumberTooBig("18446744073709551616".to_string())
    );
    assert_eq!(
        Version::from_str("1.0+abc.18446744073709551616").unwrap_err(),
        VersionParseError::NumberTooBig("18446744073709551616".to_string())
    );
    // The largest number still parses and outranks letters
    assert!(parse("1.0+18446744073709551615") > parse("1.0+abc"));
    // Mixed segments stay strings, whatever their length
    assert_eq!(
        parse("1.0+18446744073709551616abc").local(),
        Some(&[LocalSegment::String("18446744073709551616abc".to_string())][..])
    );
}

#[test]
fn equality_and_normalization() {
    let versions = [
        // Various development release incarnations
        ("1.0dev", "1.0.dev0"),
        ("1.0.dev", "1.0.dev0"),
        ("1.0dev1", "1.0.dev1"),
        ("1.0-dev", "1.0.dev0"),
        ("1.0-dev1", "1.0.dev1"),
        ("1.0DEV", "1.0.dev0"),
        ("1.0.DEV1", "1.0.dev1"),
        ("1.0_dev_2", "1.0.dev2"),
        // Various alpha incarnations
        ("1.0a", "1.0a0"),
        ("1.0.a", "1.0a0"),
        ("1.0.a1", "1.0a1"),
        ("1.0-a1", "1.0a1"),
        ("1.0alpha", "1.0a0"),
        ("1.0-alpha1", "1.0a1"),
        ("1.0ALPHA", "1.0a0"),
        ("1.0_alpha_1", "1.0a1"),
        // Various beta incarnations
        ("1.0b", "1.0b0"),
        ("1.0.b1", "1.0b1"),
        ("1.0-beta", "1.0b0"),
        ("1.0.BETA1", "1.0b1"),
        // Various release candidate incarnations
        ("1.0c", "1.0rc0"),
        ("1.0.c1", "1.0rc1"),
        ("1.0rc", "1.0rc0"),
        ("1.0-RC1", "1.0rc1"),
        ("1.0pre", "1.0rc0"),
        ("1.0-preview2", "1.0rc2"),
        // Various post release incarnations
        ("1.0post", "1.0.post0"),
        ("1.0.post", "1.0.post0"),
        ("1.0-post1", "1.0.post1"),
        ("1.0POST", "1.0.post0"),
        ("1.0r", "1.0.post0"),
        ("1.0rev", "1.0.post0"),
        ("1.0.r1", "1.0.post1"),
        ("1.0-5", "1.0.post5"),
        ("1.0-r5", "1.0.post5"),
        ("1.0-rev5", "1.0.post5"),
        // Local version case insensitivity and separators
        ("1.0+AbC", "1.0+abc"),
        ("1.0+ubuntu-1", "1.0+ubuntu.1"),
        ("1.0+ubuntu_1", "1.0+ubuntu.1"),
        ("1.0+007", "1.0+7"),
        // Integer normalization
        ("1.01", "1.1"),
        ("1.0a05", "1.0a5"),
        ("1.0c056", "1.0rc56"),
        ("1.0.post000", "1.0.post0"),
        ("1.1.dev09000", "1.1.dev9000"),
        ("00!1.2", "1.2"),
        ("0100!0.0", "100!0.0"),
        // Various other normalizations
        ("v1.0", "1.0"),
        ("V1.0", "1.0"),
        ("   v1.0\t\n", "1.0"),
        ("1.0a1-post2.dev3", "1.0a1.post2.dev3"),
    ];
    for (version_str, normalized_str) in versions {
        let version = parse(version_str);
        assert_eq!(version.to_string(), normalized_str, "{version_str}");
        assert_eq!(version, parse(normalized_str), "{version_str}");
    }
}

/// Parsing the normalized form again gives back the exact same fields.
#[test]
fn normalization_is_idempotent() {
    for version_str in VERSIONS_ALL {
        let version = parse(version_str);
        let reparsed = parse(&version.to_string());
        assert_eq!(reparsed.to_string(), version.to_string());
        assert_eq!(reparsed.epoch(), version.epoch());
        assert_eq!(reparsed.release(), version.release());
        assert_eq!(reparsed.pre(), version.pre());
        assert_eq!(reparsed.post(), version.post());
        assert_eq!(reparsed.dev(), version.dev());
        assert_eq!(reparsed.local(), version.local());
    }
}

#[test]
fn trailing_zeros_are_insignificant() {
    assert_eq!(parse("2.0"), parse("2.0.0"));
    assert_eq!(parse("2"), parse("2.0.0.0"));
    assert_eq!(parse("1!2.0rc1"), parse("1!2rc1"));
    // but they are kept when printing
    assert_eq!(parse("2.0.0").to_string(), "2.0.0");

    let set: HashSet<Version> = ["1.0", "1.0.0", "1", "1.0+abc"]
        .into_iter()
        .map(parse)
        .collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn local_versions_are_distinct() {
    assert_ne!(parse("1.0+abc"), parse("1.0"));
    assert!(parse("1.0+abc") > parse("1.0"));
    assert!(parse("1.0+abc") < parse("1.0.post0"));
    // numbers sort after strings, longer after shorter
    assert!(parse("1.0+abc") < parse("1.0+1"));
    assert!(parse("1.0+abc") < parse("1.0+abc.1"));
    assert!(parse("1.0+2") < parse("1.0+10"));
}

#[test]
fn prerelease_ordering() {
    assert!(parse("1.0a1.dev1") < parse("1.0a1"));
    assert!(parse("1.0a1") < parse("1.0a1.post1"));
    assert!(parse("1.0.dev1") < parse("1.0a0"));
    assert!(parse("1.0rc1") < parse("1.0"));
    assert!(parse("1.0") < parse("1.0.post0.dev0"));
    assert!(parse("1.0.post0.dev0") < parse("1.0.post0"));
    assert!(parse("1!0.1") > parse("2.0"));
}

#[test]
fn accessors() {
    let version = parse("3!1.2rc4.post5.dev6+ubuntu.7");
    assert_eq!(version.epoch(), 3);
    assert_eq!(version.release(), &[1, 2]);
    assert_eq!(
        version.pre(),
        Some(Prerelease {
            kind: PrereleaseKind::Rc,
            number: 4
        })
    );
    assert_eq!(version.post(), Some(5));
    assert_eq!(version.dev(), Some(6));
    assert_eq!(
        version.local(),
        Some(
            [
                LocalSegment::String("ubuntu".to_string()),
                LocalSegment::Number(7)
            ]
            .as_slice()
        )
    );
    assert_eq!((version.major(), version.minor(), version.micro()), (1, 2, 0));
    assert!(version.any_prerelease());
    assert!(version.is_pre());
    assert!(version.is_dev());
    assert!(version.is_post());
    assert!(version.is_local());
    assert_eq!(
        version.without_local().to_string(),
        "3!1.2rc4.post5.dev6"
    );
    assert_eq!(version.only_release().to_string(), "3!1.2");

    let version = parse("1.0.post1");
    assert!(!version.any_prerelease());
    assert!(version.is_post());

    let version = parse("1.0.dev1");
    assert!(version.any_prerelease());
    assert!(!version.is_pre());
}

#[test]
fn builders() {
    let version = Version::new(1, [2, 3])
        .with_epoch(2)
        .with_pre(Some(Prerelease {
            kind: PrereleaseKind::Beta,
            number: 1,
        }))
        .with_post(Some(4))
        .with_dev(Some(0))
        .with_local(vec![LocalSegment::String("cpu".to_string())]);
    assert_eq!(version.to_string(), "2!1.2.3b1.post4.dev0+cpu");
    assert_eq!(version, parse("2!1.2.3b1.post4.dev0+cpu"));
    assert!(!version.clone().with_local(Vec::new()).is_local());
    assert_eq!(version.only_release(), parse("2!1.2.3"));
    assert_eq!(Version::new(7, []).to_string(), "7");
    assert_eq!(Version::new(7, []).minor(), 0);
}

#[test]
fn fixed_version_rejects_star() {
    insta::assert_snapshot!(
        Version::from_str("0.9.1.*").unwrap_err(),
        @"A star (`*`) must not be used in a fixed version: `0.9.1.*`"
    );
}

#[test]
fn version_pattern() {
    assert!(!VersionPattern::from_str("1.2.3").unwrap().is_wildcard());
    assert!(VersionPattern::from_str("1.2.3.*").unwrap().is_wildcard());
    assert!(VersionPattern::from_str("1.0a1.*").unwrap().is_wildcard());
    assert!(VersionPattern::from_str("1.0.post1.*").unwrap().is_wildcard());
    assert_eq!(
        VersionPattern::from_str("1.2.*.4.*").unwrap_err(),
        VersionParseError::InvalidVersion("1.2.*.4.*".to_string())
    );
    assert_eq!(
        VersionPattern::from_str("1.0-dev1.*").unwrap_err(),
        VersionParseError::WildcardWithDev
    );
    assert_eq!(
        VersionPattern::from_str("1.0+lolwat.*").unwrap_err(),
        VersionParseError::WildcardWithLocal
    );
    assert_eq!(
        VersionPattern::from_str("1.0+5.*").unwrap_err(),
        VersionParseError::WildcardWithLocal
    );
}

#[test_case("1.4.0", "1.4" ; "trailing zero")]
#[test_case("1.40.0", "1.40" ; "inner zero kept")]
#[test_case("1.4.0.0.00.000.0000", "1.4" ; "many zeros")]
#[test_case("1.0", "1" ; "major only")]
#[test_case("1.0+abc", "1+abc" ; "local")]
#[test_case("1.0.dev0", "1.dev0" ; "dev")]
#[test_case("1.0.post0", "1.post0" ; "post")]
#[test_case("1.0a0", "1a0" ; "pre")]
#[test_case("1.0rc0", "1rc0" ; "rc")]
#[test_case("100!0.0", "100!0" ; "epoch and zero release")]
#[test_case("1.0.1-test7", "1.0.1-test7" ; "not a version")]
#[test_case("lolwat", "lolwat" ; "nonsense")]
fn canonicalize(version: &str, expected: &str) {
    assert_eq!(canonicalize_version(version), expected);
    assert_eq!(canonicalize_version(expected), expected);
}

#[test]
fn serde() {
    let version: Version = serde_json::from_str(r#""1.0-RC1""#).unwrap();
    assert_eq!(version, parse("1.0rc1"));
    assert_eq!(serde_json::to_string(&version).unwrap(), r#""1.0rc1""#);
    assert!(serde_json::from_str::<Version>(r#""1.0+""#).is_err());
}
