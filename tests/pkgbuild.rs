//! PKGBUILD editing on realistic AUR files

use std::collections::BTreeMap;

use aur_updater::checksum::{ChecksumSet, HashAlgorithm};
use aur_updater::parser::{SourceTarget, VersionRecord};
use aur_updater::pkgbuild::{AssignmentValue, PkgbuildDocument, apply};

const RENAMED: &str = r#"# Maintainer: Someone <someone@example.com>
pkgname=bar-bin
pkgver=1.4.0
pkgrel=3  # bumped for rebuilds
arch=('x86_64')
source=("${pkgname}.sh"
        # upstream tarball, renamed so versions do not collide
        "bar-${pkgver}.tar.gz::https://github.com/foo/bar/releases/download/v1.4.0/bar.tar.gz")
sha256sums=('SKIP'
            'aaaa')

pkgver() {
    cat VERSION
}

package() {
    pkgver=ignored
    install -Dm755 "${pkgname}.sh" "$pkgdir/usr/bin/bar"
}
"#;

fn checksums(target: SourceTarget, sha256: &str) -> BTreeMap<SourceTarget, ChecksumSet> {
    let mut set = ChecksumSet::new();
    set.insert(HashAlgorithm::Sha256, sha256);
    BTreeMap::from([(target, set)])
}

#[test]
fn document_lists_top_level_assignments_only() {
    let document = PkgbuildDocument::parse(RENAMED).unwrap();

    let names: Vec<&str> = document
        .assignments()
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["pkgname", "pkgver", "pkgrel", "arch", "source", "sha256sums"]
    );
    assert_eq!(document.pkgver(), Some("1.4.0"));
    assert_eq!(document.pkgrel(), Some("3"));
    match &document.assignment("source").unwrap().value {
        AssignmentValue::Array(words) => assert_eq!(words.len(), 2),
        other => panic!("expected array, got {other:?}"),
    }
    assert_eq!(document.remote_source_index(SourceTarget::Generic), Some(1));
}

#[test]
fn apply_keeps_rename_prefix_and_aligns_checksum_index() {
    let url = "https://github.com/foo/bar/releases/download/v1.5.0/bar.tar.gz";
    let record = VersionRecord::new("1.5.0", url);

    let patched = apply(
        RENAMED,
        &record,
        &checksums(SourceTarget::Generic, &"cd".repeat(32)),
    )
    .unwrap();

    assert!(patched.contains(&format!("\"bar-${{pkgver}}.tar.gz::{url}\")")));
    assert!(patched.contains(&format!(
        "sha256sums=('SKIP'\n            '{}')",
        "cd".repeat(32)
    )));
    assert!(patched.contains("pkgver=1.5.0\n"));
    assert!(patched.contains("pkgrel=1  # bumped for rebuilds\n"));
    // Function bodies and comments are byte-for-byte intact
    assert!(patched.contains("    pkgver=ignored\n"));
    assert!(patched.contains("        # upstream tarball, renamed so versions do not collide\n"));
    assert!(patched.ends_with("\"$pkgdir/usr/bin/bar\"\n}\n"));
}

#[test]
fn apply_then_reparse_reflects_new_values() {
    let url = "https://github.com/foo/bar/releases/download/v2.0.0/bar.tar.gz";
    let record = VersionRecord::new("2.0.0", url);
    let digest = "ef".repeat(32);

    let patched = apply(RENAMED, &record, &checksums(SourceTarget::Generic, &digest)).unwrap();
    let document = PkgbuildDocument::parse(&patched).unwrap();

    assert_eq!(document.pkgver(), Some("2.0.0"));
    assert_eq!(document.pkgrel(), Some("1"));
    let sums = document.array("sha256sums").unwrap();
    assert_eq!(sums[1].inner, digest);
    let source = &document.array("source").unwrap()[1];
    assert_eq!(source.rename_split().1, url);

    // Applying the same release again changes nothing
    let again = apply(&patched, &record, &checksums(SourceTarget::Generic, &digest)).unwrap();
    assert_eq!(again, patched);
}

const DESKTOP_HEREDOC: &str = r#"pkgname=foo
pkgver=1.0.0
pkgrel=2
source=("https://example.com/foo-1.0.0.tar.gz")
sha256sums=('aaaa')

package() {
    install -Dm755 foo "$pkgdir/usr/bin/foo"
    cat > foo.desktop <<EOF
[Desktop Entry]
Name=Foo
Comment=Foo's desktop client
Exec=foo
EOF
}
"#;

#[test]
fn apply_ignores_key_value_lines_in_function_heredocs() {
    let url = "https://example.com/foo-1.1.0.tar.gz";
    let record = VersionRecord::new("1.1.0", url);

    let patched = apply(
        DESKTOP_HEREDOC,
        &record,
        &checksums(SourceTarget::Generic, "bbbb"),
    )
    .unwrap();

    let expected = DESKTOP_HEREDOC
        .replace("pkgver=1.0.0", "pkgver=1.1.0")
        .replace("pkgrel=2", "pkgrel=1")
        .replace("foo-1.0.0.tar.gz", "foo-1.1.0.tar.gz")
        .replace("sha256sums=('aaaa')", "sha256sums=('bbbb')");
    assert_eq!(patched, expected);
}
