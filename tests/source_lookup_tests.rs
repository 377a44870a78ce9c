// tests/source_lookup_tests.rs
//
// Tests for the file reader used to show source lines. These run against
// a small committed directory tree under tests/data/lookup.

use vgtree::source_lookup::FileReader;

#[test]
fn finds_a_file_below_a_prefix() {
    let mut reader = FileReader::new();
    reader.add_prefix("tests/data/lookup");

    let found = reader.find_file("sample.c").expect("sample.c should be found");
    assert!(found.ends_with("nested/inner/sample.c"));
}

#[test]
fn finds_a_file_by_path_suffix() {
    let mut reader = FileReader::new();
    reader.add_prefix("tests/data/lookup");

    let found = reader
        .find_file("inner/sample.c")
        .expect("inner/sample.c should be found");
    assert!(found.ends_with("nested/inner/sample.c"));
}

#[test]
fn reads_the_found_file_as_lines() {
    let mut reader = FileReader::new();
    reader.add_prefix("tests/data/lookup");

    let lines = reader.read_file("sample.c").expect("sample.c should be readable");
    assert_eq!(lines[0], "#include <stdlib.h>");
    assert!(lines.iter().any(|line| line.contains("malloc")));
}

#[test]
fn missing_files_stay_missing() {
    let mut reader = FileReader::new();
    reader.add_prefix("tests/data/lookup");

    assert_eq!(reader.find_file("no_such_file.c"), None);
    // The negative result is cached; asking again gives the same answer.
    assert_eq!(reader.find_file("no_such_file.c"), None);
    assert_eq!(reader.read_file("no_such_file.c"), None);
}

#[test]
fn default_prefix_is_the_current_directory() {
    let mut reader = FileReader::new();
    let found = reader
        .find_file("tests/data/lookup/nested/inner/sample.c")
        .expect("the direct path should be found");
    assert!(found.is_file());
}
