//! Integration tests for the `Archive` handle.
//!
//! Every test runs against all three container formats with real files.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use filepack_core::Archive;
use filepack_core::ArchiveFormat;
use filepack_core::FilePackError;
use filepack_core::MemberType;
use filepack_core::test_utils::TarTestBuilder;
use filepack_core::test_utils::ZipTestBuilder;
use filepack_core::test_utils::write_file;
use std::fs;
use tempfile::TempDir;

const FORMATS: [ArchiveFormat; 3] = [
    ArchiveFormat::Tar,
    ArchiveFormat::Zip,
    ArchiveFormat::SevenZip,
];

fn archive_in(temp: &TempDir, format: ArchiveFormat) -> Archive {
    Archive::new(temp.path().join(format!("test.{}", format.extension()))).unwrap()
}

#[test]
fn test_empty_tar_scenario() {
    let temp = TempDir::new().unwrap();
    let archive = archive_in(&temp, ArchiveFormat::Tar);
    archive.create().unwrap();
    assert!(archive.get_members().unwrap().is_empty());

    let source = write_file(temp.path(), "new_file.txt", b"New File");
    archive.add_member(&source, None).unwrap();

    let members = archive.get_members().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "new_file.txt");

    let out = temp.path().join("out");
    archive.extract_member("new_file.txt", &out).unwrap();
    assert_eq!(fs::read_to_string(out.join("new_file.txt")).unwrap(), "New File");

    archive.remove_member("new_file.txt").unwrap();
    assert!(archive.get_members().unwrap().is_empty());
}

#[test]
fn test_add_lists_base_name_and_size() {
    for format in FORMATS {
        let temp = TempDir::new().unwrap();
        let archive = archive_in(&temp, format);
        let source = write_file(&temp.path().join("nested"), "data.bin", &[7u8; 1234]);

        archive.add_member(&source, None).unwrap();

        let member = archive.get_member("data.bin").unwrap();
        assert_eq!(member.size, 1234, "{format}");
        assert_eq!(member.member_type, MemberType::File, "{format}");
    }
}

#[test]
fn test_add_with_arcname_and_extract_nested() {
    for format in FORMATS {
        let temp = TempDir::new().unwrap();
        let archive = archive_in(&temp, format);
        let source = write_file(temp.path(), "a.txt", b"alpha");

        archive.add_member(&source, Some("docs/2024/a.txt")).unwrap();

        let out = temp.path().join("out");
        archive.extract_all(&out).unwrap();
        assert_eq!(
            fs::read(out.join("docs/2024/a.txt")).unwrap(),
            b"alpha",
            "{format}"
        );
    }
}

#[test]
fn test_remove_keeps_archive_valid() {
    for format in FORMATS {
        let temp = TempDir::new().unwrap();
        let archive = archive_in(&temp, format);
        for (name, content) in [("a.txt", &b"aaa"[..]), ("b.txt", b"bb"), ("c.txt", b"c")] {
            archive
                .add_member(write_file(temp.path(), name, content), None)
                .unwrap();
        }

        archive.remove_member("b.txt").unwrap();

        let names: Vec<_> = archive
            .get_members()
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["a.txt", "c.txt"], "{format}");

        let out = temp.path().join("out");
        archive.extract_all(&out).unwrap();
        assert_eq!(fs::read(out.join("c.txt")).unwrap(), b"c", "{format}");
        assert!(!out.join("b.txt").exists(), "{format}");
    }
}

#[test]
fn test_duplicate_member_rejected() {
    for format in FORMATS {
        let temp = TempDir::new().unwrap();
        let archive = archive_in(&temp, format);
        let source = write_file(temp.path(), "a.txt", b"a");
        archive.add_member(&source, None).unwrap();

        let result = archive.add_member(&source, None);
        assert!(
            matches!(result, Err(FilePackError::MemberExists { .. })),
            "{format}"
        );
        assert_eq!(archive.get_members().unwrap().len(), 1, "{format}");
    }
}

#[test]
fn test_missing_member_errors() {
    for format in FORMATS {
        let temp = TempDir::new().unwrap();
        let archive = archive_in(&temp, format);
        archive
            .add_member(write_file(temp.path(), "a.txt", b"a"), None)
            .unwrap();

        assert!(matches!(
            archive.get_member("b.txt"),
            Err(FilePackError::MemberNotFound { .. })
        ));
        assert!(matches!(
            archive.extract_member("b.txt", temp.path().join("out")),
            Err(FilePackError::MemberNotFound { .. })
        ));
        assert!(matches!(
            archive.remove_member("b.txt"),
            Err(FilePackError::MemberNotFound { .. })
        ));
    }
}

#[test]
fn test_tar_traversal_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("evil.tar");
    fs::write(
        &path,
        TarTestBuilder::new()
            .add_file("good.txt", b"ok")
            .add_file_raw_path("../evil.txt", b"pwned")
            .build(),
    )
    .unwrap();
    let archive = Archive::new(&path).unwrap();
    let target = temp.path().join("target");

    let err = archive.extract_all(&target).unwrap_err();
    assert!(matches!(err, FilePackError::PathTraversal { .. }));
    assert!(err.is_security_violation());
    assert!(!temp.path().join("evil.txt").exists());
    assert!(!target.join("good.txt").exists());

    let err = archive.extract_member("../evil.txt", &target).unwrap_err();
    assert!(matches!(err, FilePackError::PathTraversal { .. }));
    assert!(!temp.path().join("evil.txt").exists());
}

#[test]
fn test_zip_traversal_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("evil.zip");
    fs::write(
        &path,
        ZipTestBuilder::new().add_file("../evil.txt", b"pwned").build(),
    )
    .unwrap();

    let result = Archive::new(&path).unwrap().extract_all(temp.path().join("target"));
    assert!(matches!(result, Err(FilePackError::PathTraversal { .. })));
    assert!(!temp.path().join("evil.txt").exists());
}

#[test]
fn test_links_listed_but_not_extracted() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("links.tar");
    fs::write(
        &path,
        TarTestBuilder::new()
            .add_file("file.txt", b"content")
            .add_symlink("link", "file.txt")
            .add_hardlink("hard", "file.txt")
            .build(),
    )
    .unwrap();
    let archive = Archive::new(&path).unwrap();

    let types: Vec<_> = archive
        .get_members()
        .unwrap()
        .into_iter()
        .map(|m| m.member_type)
        .collect();
    assert_eq!(
        types,
        vec![MemberType::File, MemberType::Symlink, MemberType::Other]
    );

    let out = temp.path().join("out");
    assert!(matches!(
        archive.extract_member("link", &out),
        Err(FilePackError::UnsupportedEntry { .. })
    ));

    archive.extract_all(&out).unwrap();
    assert!(out.join("file.txt").exists());
    assert!(!out.join("link").exists());
    assert!(!out.join("hard").exists());
}

#[test]
fn test_zip_symlink_refused() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("links.zip");
    fs::write(
        &path,
        ZipTestBuilder::new()
            .add_file("file.txt", b"content")
            .add_symlink("link", "file.txt")
            .build(),
    )
    .unwrap();
    let archive = Archive::new(&path).unwrap();

    assert_eq!(
        archive.get_member("link").unwrap().member_type,
        MemberType::Symlink
    );
    assert!(matches!(
        archive.extract_member("link", temp.path().join("out")),
        Err(FilePackError::UnsupportedEntry { .. })
    ));
}

#[test]
fn test_zero_length_archive_is_empty() {
    for format in FORMATS {
        let temp = TempDir::new().unwrap();
        let archive = archive_in(&temp, format);
        fs::write(archive.path(), b"").unwrap();

        assert!(archive.get_members().unwrap().is_empty(), "{format}");

        archive
            .add_member(write_file(temp.path(), "a.txt", b"a"), None)
            .unwrap();
        assert_eq!(archive.get_members().unwrap().len(), 1, "{format}");
    }
}

#[test]
fn test_corrupt_archive_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write_file(temp.path(), "broken.zip", b"this is not a zip file");
    let result = Archive::new(&path).unwrap().get_members();
    assert!(matches!(result, Err(FilePackError::InvalidArchive(_))));
}
