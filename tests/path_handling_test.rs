mod common;

use common::*;
use shupai::error::Error;
use shupai::prelude::*;

#[test]
fn test_missing_input_is_not_found() {
    let temp_dir = setup_test_dir();
    let config = ShupaiConfig::builder()
        .input_path(temp_dir.path().join("missing.epub"))
        .build()
        .unwrap();
    assert!(matches!(config.preflight_check(), Err(Error::NotFound(_))));
}

#[test]
fn test_directory_input_is_rejected() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path().join("folder.epub");
    std::fs::create_dir(&dir).unwrap();
    let config = ShupaiConfig::builder().input_path(dir).build().unwrap();
    assert!(matches!(
        config.preflight_check(),
        Err(Error::InvalidPath(_, _))
    ));
}

#[test]
fn test_non_epub_extension_is_rejected_unless_allowed() {
    let temp_dir = setup_test_dir();
    let input = temp_dir.path().join("book.zip");
    write_fixture_epub(&input);

    let strict = ShupaiConfig::builder()
        .input_path(input.clone())
        .build()
        .unwrap();
    assert!(matches!(strict.preflight_check(), Err(Error::Unsupported(_))));

    let lenient = ShupaiConfig::builder()
        .input_path(input)
        .require_epub_extension(false)
        .build()
        .unwrap();
    let report = lenient.convert().unwrap();
    assert_eq!(
        report.output_path,
        Some(temp_dir.path().join("book_vertical.zip"))
    );
}

#[test]
fn test_uppercase_extension_is_accepted() {
    let temp_dir = setup_test_dir();
    let input = temp_dir.path().join("BOOK.EPUB");
    write_fixture_epub(&input);

    let config = ShupaiConfig::builder().input_path(input).build().unwrap();
    assert!(config.preflight_check().is_ok());
    assert_eq!(
        config.resolved_output_path().unwrap(),
        temp_dir.path().join("BOOK_vertical.EPUB")
    );
}

#[test]
fn test_existing_output_rejected_without_overwrite() {
    let temp_dir = setup_test_dir();
    let input = temp_dir.path().join("book.epub");
    let output = temp_dir.path().join("taken.epub");
    write_fixture_epub(&input);
    std::fs::write(&output, b"keep me").unwrap();

    let config = ShupaiConfig::builder()
        .input_path(input)
        .output_path(output.clone())
        .overwrite(false)
        .build()
        .unwrap();
    assert!(matches!(config.convert(), Err(Error::InvalidPath(_, _))));
    assert_eq!(std::fs::read(&output).unwrap(), b"keep me");
}

#[test]
fn test_output_in_nested_relative_spelling_is_same_path() {
    let temp_dir = setup_test_dir();
    std::fs::create_dir(temp_dir.path().join("sub")).unwrap();
    let input = temp_dir.path().join("book.epub");
    write_fixture_epub(&input);

    let config = ShupaiConfig::builder()
        .input_path(input)
        .output_path(temp_dir.path().join("sub").join("..").join("book.epub"))
        .build()
        .unwrap();
    assert!(matches!(config.preflight_check(), Err(Error::SamePath(_))));
}

#[test]
fn test_empty_paths_fail_to_build() {
    assert!(ShupaiConfig::builder().input_path(PathBuf::new()).build().is_err());
    assert!(
        ShupaiConfig::builder()
            .input_path(PathBuf::from("a.epub"))
            .output_path(PathBuf::new())
            .build()
            .is_err()
    );
}
