//! Corpus directory loading
//!
//! A brat corpus directory holds `<name>.txt` and `<name>.ann` pairs.
//! Only names with an `.ann` file are loaded.

use std::path::Path;

use anyhow::{Context, Result};

use relvec_core::Document;

/// Load every annotated document in `dir`, sorted by base name
pub fn load_documents(dir: &Path) -> Result<Vec<Document>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read corpus directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("ann") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();

    let mut documents = Vec::with_capacity(names.len());
    for name in names {
        let txt_path = dir.join(format!("{name}.txt"));
        let ann_path = dir.join(format!("{name}.ann"));
        let text = std::fs::read_to_string(&txt_path)
            .with_context(|| format!("Failed to read {}", txt_path.display()))?;
        let annotation = std::fs::read_to_string(&ann_path)
            .with_context(|| format!("Failed to read {}", ann_path.display()))?;

        tracing::debug!("Loaded document {}", name);
        documents.push(Document::new(name, text, annotation));
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "bob").unwrap();
        std::fs::write(dir.path().join("b.ann"), "T1\tPerson 0 3\tbob\n").unwrap();
        std::fs::write(dir.path().join("a.txt"), "alice").unwrap();
        std::fs::write(dir.path().join("a.ann"), "").unwrap();
        // text without annotations is ignored
        std::fs::write(dir.path().join("c.txt"), "carol").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(docs[1].text, "bob");
    }

    #[test]
    fn test_missing_text_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ann"), "").unwrap();

        let err = load_documents(dir.path()).unwrap_err();
        assert!(err.to_string().contains("a.txt"));
    }
}
