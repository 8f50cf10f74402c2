//! Offline storylet compiler: loads a directory of JSON files into a validated
//! [`StoryletLibrary`], reporting all problems at once rather than failing on
//! the first bad file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::StoryletCompileError;
use crate::library::StoryletLibrary;
use crate::validation::validate_storylets;
use crate::Storylet;

/// Load and validate every `.json` file in `dir` (non-recursive) into a
/// [`StoryletLibrary`].
///
/// Collects every error it finds — parse failures, validation failures,
/// duplicate ids — into a single `Vec` rather than stopping at the first one,
/// so an author sees the whole picture in one pass.
pub fn compile_from_dir<P: AsRef<Path>>(
    dir: P,
) -> Result<StoryletLibrary, Vec<StoryletCompileError>> {
    let dir = dir.as_ref();
    let loaded = load_json_files(dir)?;
    if loaded.is_empty() {
        return Err(vec![StoryletCompileError::NoStorylets {
            dir: dir.to_path_buf(),
        }]);
    }

    let storylets: Vec<Storylet> = loaded.iter().map(|(_, s)| s.clone()).collect();
    let validation_failures = validate_storylets(&storylets);
    if !validation_failures.is_empty() {
        let errors = validation_failures
            .into_iter()
            .map(|(id, errors)| {
                let path = loaded
                    .iter()
                    .find(|(_, s)| s.id == id)
                    .map(|(p, _)| p.clone())
                    .unwrap_or_else(|| PathBuf::from("<unknown>"));
                StoryletCompileError::Validation { id, path, errors }
            })
            .collect();
        return Err(errors);
    }

    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut duplicate_errors = Vec::new();
    for (path, storylet) in &loaded {
        if let Some(first_path) = seen.get(&storylet.id) {
            duplicate_errors.push(StoryletCompileError::DuplicateId {
                id: storylet.id.clone(),
                first_path: first_path.clone(),
                duplicate_path: path.clone(),
            });
        } else {
            seen.insert(storylet.id.clone(), path.clone());
        }
    }
    if !duplicate_errors.is_empty() {
        return Err(duplicate_errors);
    }

    Ok(StoryletLibrary::new(storylets))
}

fn load_json_files(dir: &Path) -> Result<Vec<(PathBuf, Storylet)>, Vec<StoryletCompileError>> {
    let entries = fs::read_dir(dir).map_err(|source| {
        vec![StoryletCompileError::Io {
            path: dir.to_path_buf(),
            source,
        }]
    })?;

    let mut loaded = Vec::new();
    let mut errors = Vec::new();

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(source) => {
                errors.push(StoryletCompileError::Io {
                    path: dir.to_path_buf(),
                    source,
                });
                continue;
            }
        };
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    for path in paths {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Storylet>(&contents) {
                Ok(storylet) => loaded.push((path, storylet)),
                Err(source) => errors.push(StoryletCompileError::JsonParse { path, source }),
            },
            Err(source) => errors.push(StoryletCompileError::Io { path, source }),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_storylet(dir: &Path, filename: &str, json: &str) {
        let mut file = fs::File::create(dir.join(filename)).unwrap();
        file.write_all(json.as_bytes()).unwrap();
    }

    const VALID: &str = r#"{
        "id": "intro.meet",
        "title": "Meeting",
        "weight": 1.0,
        "preconditions": [],
        "effects": []
    }"#;

    #[test]
    fn compiles_valid_directory() {
        let tmp = tempfile::tempdir().unwrap();
        write_storylet(tmp.path(), "a.json", VALID);
        let library = compile_from_dir(tmp.path()).unwrap();
        assert_eq!(library.len(), 1);
        assert!(library.get("intro.meet").is_some());
    }

    #[test]
    fn rejects_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let result = compile_from_dir(tmp.path());
        assert!(matches!(
            result.unwrap_err().as_slice(),
            [StoryletCompileError::NoStorylets { .. }]
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let tmp = tempfile::tempdir().unwrap();
        write_storylet(tmp.path(), "a.json", VALID);
        write_storylet(tmp.path(), "b.json", VALID);
        let result = compile_from_dir(tmp.path());
        assert!(matches!(
            result.unwrap_err().as_slice(),
            [StoryletCompileError::DuplicateId { .. }]
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        let tmp = tempfile::tempdir().unwrap();
        write_storylet(tmp.path(), "a.json", "{not json");
        let result = compile_from_dir(tmp.path());
        assert!(matches!(
            result.unwrap_err().as_slice(),
            [StoryletCompileError::JsonParse { .. }]
        ));
    }
}
