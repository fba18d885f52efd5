//! Dictionary assembler.
//!
//! Turns per-command enrichment results into dictionary entries, then writes
//! the final collection to disk as a single pretty-printed JSON document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use autodict_shared::{AutodictError, CommandName, DictionaryEntry, Result};

use crate::enrichment::Enrichment;

/// Entries ordered by ascending title. Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DictionaryCollection {
    entries: Vec<DictionaryEntry>,
}

impl DictionaryCollection {
    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of [`assemble`].
#[derive(Debug, Clone)]
pub struct AssembleResult {
    /// The emitted entries.
    pub collection: DictionaryCollection,
    /// Commands dropped because no description was found.
    pub excluded: usize,
    /// Commands dropped because processing failed.
    pub failed: usize,
}

/// Metadata for the written dictionary file.
#[derive(Debug, Clone, Serialize)]
pub struct WriteResult {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Build an entry, or `None` when there is no description.
pub fn build_entry(name: &CommandName, enrichment: Enrichment, tags: &[String]) -> Option<DictionaryEntry> {
    let description = enrichment.description?;
    Some(DictionaryEntry {
        title: name.clone(),
        description,
        example: enrichment.example,
        tags: tags.to_vec(),
    })
}

/// Combine enrichment results (already in ascending name order) into a
/// dictionary collection. Failed and undescribed commands are skipped.
#[instrument(skip_all, fields(commands = results.len()))]
pub fn assemble(results: Vec<(CommandName, Result<Enrichment>)>, tags: &[String]) -> AssembleResult {
    let mut entries = Vec::with_capacity(results.len());
    let mut excluded = 0;
    let mut failed = 0;

    for (name, outcome) in results {
        match outcome {
            Ok(enrichment) => match build_entry(&name, enrichment, tags) {
                Some(entry) => entries.push(entry),
                None => {
                    debug!(command = %name, "no description found, skipping");
                    excluded += 1;
                }
            },
            Err(_) => failed += 1,
        }
    }

    info!(emitted = entries.len(), excluded, failed, "dictionary assembled");

    AssembleResult {
        collection: DictionaryCollection { entries },
        excluded,
        failed,
    }
}

/// Write the collection to `path`, replacing any previous file.
///
/// The JSON is written to a temp file next to the target and renamed into
/// place, so readers never observe a half-written dictionary.
#[instrument(skip_all, fields(path = %path.display(), entries = collection.len()))]
pub fn write_dictionary(path: &Path, collection: &DictionaryCollection) -> Result<WriteResult> {
    let file_name = path
        .file_name()
        .ok_or_else(|| AutodictError::validation(format!("output path has no file name: {}", path.display())))?
        .to_string_lossy();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AutodictError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(collection)
        .map_err(|e| AutodictError::Serialize(format!("dictionary: {e}")))?;

    let temp = path.with_file_name(format!(".{file_name}.tmp"));
    std::fs::write(&temp, &json).map_err(|e| AutodictError::io(&temp, e))?;

    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(AutodictError::io(path, e));
    }

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let sha256 = format!("{:x}", hasher.finalize());

    debug!(size = json.len(), %sha256, "wrote dictionary");

    Ok(WriteResult {
        path: path.to_path_buf(),
        sha256,
        size_bytes: json.len(),
    })
}

/// Read a dictionary file back and check its invariants.
pub fn validate_dictionary(path: &Path) -> Result<DictionaryCollection> {
    let content = std::fs::read_to_string(path).map_err(|e| AutodictError::io(path, e))?;
    let collection: DictionaryCollection = serde_json::from_str(&content)
        .map_err(|e| AutodictError::validation(format!("invalid dictionary: {e}")))?;

    for (i, entry) in collection.entries.iter().enumerate() {
        if entry.description.trim().is_empty() {
            return Err(AutodictError::validation(format!(
                "entry {i} (`{}`) has an empty description",
                entry.title
            )));
        }
        if entry.example.trim().is_empty() {
            return Err(AutodictError::validation(format!(
                "entry {i} (`{}`) has an empty example",
                entry.title
            )));
        }
    }

    if let Some(pair) = collection
        .entries
        .windows(2)
        .find(|pair| pair[0].title >= pair[1].title)
    {
        return Err(AutodictError::validation(format!(
            "titles not strictly ascending: `{}` then `{}`",
            pair[0].title, pair[1].title
        )));
    }

    Ok(collection)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ad-assembler-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn tags() -> Vec<String> {
        autodict_shared::DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
    }

    fn described(description: &str, example: &str) -> Result<Enrichment> {
        Ok(Enrichment {
            description: Some(description.into()),
            example: example.into(),
        })
    }

    fn make_results() -> Vec<(CommandName, Result<Enrichment>)> {
        vec![
            (CommandName::new("cat"), described("concatenate files", "cat [OPTION]... [FILE]...")),
            (
                CommandName::new("mystery"),
                Ok(Enrichment {
                    description: None,
                    example: "mystery --help".into(),
                }),
            ),
            (
                CommandName::new("panicky"),
                Err(AutodictError::command("panicky", "worker panicked")),
            ),
            (CommandName::new("zcat"), described("decompress files", "zcat --help")),
        ]
    }

    #[test]
    fn assemble_skips_undescribed_and_failed() {
        let result = assemble(make_results(), &tags());

        let titles: Vec<&str> = result
            .collection
            .entries()
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, ["cat", "zcat"]);
        assert_eq!(result.excluded, 1);
        assert_eq!(result.failed, 1);
    }

    #[test]
    fn every_entry_gets_the_same_tags() {
        let result = assemble(make_results(), &tags());
        for entry in result.collection.entries() {
            assert_eq!(entry.tags, ["start", "open", "launch", "run", "service", "daemon"]);
        }
    }

    #[test]
    fn write_produces_pretty_json_in_key_order() {
        let tmp = temp_dir();
        let path = tmp.join("auto_dictionary.json");
        let result = assemble(make_results(), &["run".to_string()]);

        write_dictionary(&path, &result.collection).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        let expected = r#"[
  {
    "title": "cat",
    "description": "concatenate files",
    "example": "cat [OPTION]... [FILE]...",
    "tags": [
      "run"
    ]
  },
  {
    "title": "zcat",
    "description": "decompress files",
    "example": "zcat --help",
    "tags": [
      "run"
    ]
  }
]"#;
        assert_eq!(content, expected);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_empty_collection() {
        let tmp = temp_dir();
        let path = tmp.join("empty.json");
        write_dictionary(&path, &DictionaryCollection::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_overwrites_and_is_deterministic() {
        let tmp = temp_dir();
        let path = tmp.join("auto_dictionary.json");
        std::fs::write(&path, "stale content that is much longer than nothing").unwrap();

        let collection = assemble(make_results(), &tags()).collection;
        let first = write_dictionary(&path, &collection).unwrap();
        let second = write_dictionary(&path, &collection).unwrap();

        assert_eq!(first.sha256, second.sha256);
        assert_eq!(first.sha256.len(), 64);
        assert!(!std::fs::read_to_string(&path).unwrap().contains("stale"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let tmp = temp_dir();
        let path = tmp.join("dict.json");
        write_dictionary(&path, &assemble(make_results(), &tags()).collection).unwrap();

        for entry in std::fs::read_dir(&tmp).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.starts_with('.'), "temp file left behind: {name}");
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_failure_is_reported() {
        let tmp = temp_dir();
        let blocker = tmp.join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();

        let err = write_dictionary(&blocker.join("out.json"), &DictionaryCollection::default())
            .unwrap_err();
        assert!(matches!(err, AutodictError::Io { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn validate_accepts_written_dictionary() {
        let tmp = temp_dir();
        let path = tmp.join("dict.json");
        write_dictionary(&path, &assemble(make_results(), &tags()).collection).unwrap();

        let collection = validate_dictionary(&path).unwrap();
        assert_eq!(collection.len(), 2);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn validate_rejects_unsorted_titles() {
        let tmp = temp_dir();
        let path = tmp.join("dict.json");
        std::fs::write(
            &path,
            r#"[{"title":"zz","description":"d","example":"zz","tags":[]},
                {"title":"aa","description":"d","example":"aa","tags":[]}]"#,
        )
        .unwrap();

        let err = validate_dictionary(&path).unwrap_err();
        assert!(err.to_string().contains("strictly ascending"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn validate_rejects_duplicates_and_empty_descriptions() {
        let tmp = temp_dir();

        let dup = tmp.join("dup.json");
        std::fs::write(
            &dup,
            r#"[{"title":"ls","description":"d","example":"ls","tags":[]},
                {"title":"ls","description":"d","example":"ls","tags":[]}]"#,
        )
        .unwrap();
        assert!(validate_dictionary(&dup).is_err());

        let empty = tmp.join("empty-desc.json");
        std::fs::write(
            &empty,
            r#"[{"title":"ls","description":"  ","example":"ls","tags":[]}]"#,
        )
        .unwrap();
        let err = validate_dictionary(&empty).unwrap_err();
        assert!(err.to_string().contains("empty description"));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
