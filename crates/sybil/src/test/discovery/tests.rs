use super::*;
use std::fs::File;
use tempfile::tempdir;

fn rst_sybil() -> Vec<Sybil> {
    vec![Sybil::new(vec![]).pattern("*.rst").unwrap()]
}

#[test]
fn test_discover_empty_dir() {
    let dir = tempdir().unwrap();
    assert!(discover_documents(dir.path(), &rst_sybil()).is_empty());
}

#[test]
fn test_discover_matching_files() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("b.rst")).unwrap();
    File::create(dir.path().join("a.rst")).unwrap();
    File::create(dir.path().join("notes.txt")).unwrap();

    let files = discover_documents(dir.path(), &rst_sybil());
    let names: Vec<_> = files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["a.rst", "b.rst"]);
}

#[test]
fn test_discover_recursive_with_filenames() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("docs");
    fs::create_dir(&sub).unwrap();
    File::create(sub.join("guide.rst")).unwrap();
    File::create(dir.path().join("README.txt")).unwrap();

    let sybils = vec![Sybil::new(vec![])
        .pattern("*.rst")
        .unwrap()
        .filenames(["README.txt"])];
    assert_eq!(discover_documents(dir.path(), &sybils).len(), 2);
}

#[test]
fn test_skip_hidden_and_target() {
    let dir = tempdir().unwrap();
    let hidden = dir.path().join(".hidden");
    let target = dir.path().join("target");
    fs::create_dir(&hidden).unwrap();
    fs::create_dir(&target).unwrap();
    File::create(hidden.join("doc.rst")).unwrap();
    File::create(target.join("doc.rst")).unwrap();
    File::create(dir.path().join("real.rst")).unwrap();

    let files = discover_documents(dir.path(), &rst_sybil());
    assert_eq!(files.len(), 1);
    assert!(files[0].path.ends_with("real.rst"));
}

#[test]
fn test_discover_single_file() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("one.rst");
    let other = dir.path().join("one.txt");
    File::create(&doc).unwrap();
    File::create(&other).unwrap();

    assert_eq!(discover_documents_in(&doc, &rst_sybil()).len(), 1);
    assert!(discover_documents_in(&other, &rst_sybil()).is_empty());
    assert!(discover_documents_in(&dir.path().join("missing.rst"), &rst_sybil()).is_empty());
}

#[test]
fn test_last_accepting_sybil_owns_the_file() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("guide.rst")).unwrap();
    File::create(dir.path().join("notes.txt")).unwrap();
    File::create(dir.path().join("image.png")).unwrap();

    let sybils = vec![
        Sybil::new(vec![]).pattern("*.rst").unwrap(),
        Sybil::new(vec![]).pattern("*.txt").unwrap(),
        Sybil::new(vec![]).filenames(["guide.rst"]),
    ];
    let owners: Vec<_> = discover_documents(dir.path(), &sybils)
        .into_iter()
        .map(|f| (f.path.file_name().unwrap().to_str().unwrap().to_string(), f.sybil))
        .collect();
    assert_eq!(
        owners,
        [("guide.rst".to_string(), 2), ("notes.txt".to_string(), 1)]
    );
}

#[test]
fn test_select_sybil_without_match() {
    let sybils = rst_sybil();
    assert_eq!(select_sybil(&sybils, Path::new("doc.rst")), Some(0));
    assert_eq!(select_sybil(&sybils, Path::new("doc.md")), None);
    assert_eq!(select_sybil(&[], Path::new("doc.rst")), None);
}
