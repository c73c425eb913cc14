//! Case papers: uploaded document metadata and search.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreError, Result};
use crate::state::AppState;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "jpg", "png"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pleading,
    Evidence,
    #[serde(rename = "Order Copy")]
    OrderCopy,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pleading => "Pleading",
            Self::Evidence => "Evidence",
            Self::OrderCopy => "Order Copy",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub doc_type: DocumentType,
    pub custom_doc_name: String,
    pub original_file_name: String,
    pub path: PathBuf,
}

/// A search hit with the owning case's descriptive fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMatch<'a> {
    pub cino: &'a str,
    pub parties: String,
    pub reg_no_year: String,
    pub case_type: String,
    pub document: &'a DocumentRecord,
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

impl AppState {
    /// Copy `source` into `papers_dir` and record it against a loaded case.
    pub fn attach_document(
        &mut self,
        cino: &str,
        doc_type: DocumentType,
        custom_name: Option<&str>,
        source: &Path,
        papers_dir: &Path,
    ) -> Result<&DocumentRecord> {
        self.require_case(cino)?;
        let original = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CoreError::invalid(format!("Not a file: {}", source.display())))?
            .to_string();
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(CoreError::invalid(format!(
                "Unsupported document type .{ext}; expected one of {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let base = custom_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&original)
            .to_string();
        let file_name = sanitize(&format!("{cino}_{}_{base}", doc_type.as_str()));
        std::fs::create_dir_all(papers_dir)?;
        let dest = papers_dir.join(file_name);
        std::fs::copy(source, &dest)?;
        info!(cino, path = %dest.display(), "document saved");

        let docs = self.case_papers.entry(cino.to_string()).or_default();
        docs.push(DocumentRecord {
            doc_type,
            custom_doc_name: base,
            original_file_name: original,
            path: dest,
        });
        Ok(&docs[docs.len() - 1])
    }

    /// Documents whose case or document fields contain `term`, case-insensitively.
    ///
    /// Documents attached to cases that are no longer loaded are skipped.
    pub fn search_documents(&self, term: &str) -> Vec<DocumentMatch<'_>> {
        let term = term.trim().to_lowercase();
        let mut hits = Vec::new();
        for (cino, docs) in &self.case_papers {
            let Some(case) = self.find_case(cino) else {
                continue;
            };
            let parties = case.parties().to_lowercase();
            let reg_no_year = case.case_number_year();
            let case_type = case.type_name.as_deref().unwrap_or("").to_lowercase();
            let case_text = format!("{cino} {parties} {reg_no_year} {case_type}").to_lowercase();
            for doc in docs {
                let haystack = format!(
                    "{case_text} {} {} {}",
                    doc.custom_doc_name.to_lowercase(),
                    doc.original_file_name.to_lowercase(),
                    doc.doc_type.as_str().to_lowercase()
                );
                if haystack.contains(&term) {
                    hits.push(DocumentMatch {
                        cino,
                        parties: parties.clone(),
                        reg_no_year: reg_no_year.clone(),
                        case_type: case_type.clone(),
                        document: doc,
                    });
                }
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CaseRecord;

    fn state() -> AppState {
        AppState {
            cases: vec![CaseRecord {
                cino: Some("C1".into()),
                type_name: Some("O.S.".into()),
                reg_no: Some("12".into()),
                reg_year: Some("2020".into()),
                petparty_name: Some("Asha".into()),
                resparty_name: Some("Bank".into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn attach_copies_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("plaint.pdf");
        std::fs::write(&src, b"%PDF").unwrap();
        let papers = dir.path().join("papers");

        let mut s = state();
        let doc = s
            .attach_document("C1", DocumentType::Pleading, None, &src, &papers)
            .unwrap()
            .clone();
        assert_eq!(doc.custom_doc_name, "plaint.pdf");
        assert_eq!(doc.path, papers.join("C1_Pleading_plaint.pdf"));
        assert_eq!(std::fs::read(&doc.path).unwrap(), b"%PDF");
    }

    #[test]
    fn custom_name_and_search() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("scan.jpg");
        std::fs::write(&src, b"img").unwrap();
        let mut s = state();
        s.attach_document("C1", DocumentType::OrderCopy, Some("Interim order"), &src, dir.path())
            .unwrap();

        assert_eq!(s.search_documents("interim").len(), 1);
        assert_eq!(s.search_documents("ASHA").len(), 1);
        assert_eq!(s.search_documents("order copy").len(), 1);
        assert_eq!(s.search_documents("12/2020").len(), 1);
        assert_eq!(s.search_documents("").len(), 1);
        assert!(s.search_documents("affidavit").is_empty());
    }

    #[test]
    fn documents_of_unloaded_cases_hidden() {
        let mut s = state();
        s.case_papers.insert(
            "GONE".into(),
            vec![DocumentRecord {
                doc_type: DocumentType::Other,
                custom_doc_name: "x".into(),
                original_file_name: "x.pdf".into(),
                path: PathBuf::from("x.pdf"),
            }],
        );
        assert!(s.search_documents("x").is_empty());
    }

    #[test]
    fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("notes.txt");
        std::fs::write(&src, b"t").unwrap();
        let mut s = state();
        let err = s
            .attach_document("C1", DocumentType::Other, None, &src, dir.path())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert!(s.case_papers.is_empty());
    }
}
