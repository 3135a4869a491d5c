//! Profile loader: reads the biography documents once at startup.
//!
//! Contract: a missing or unreadable document degrades to an empty string and
//! a WARN log. The chatbot still answers, just with less context.

use std::path::{Path, PathBuf};

/// Biography text loaded at startup; immutable for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    /// Plain-text summary (`summary.txt`).
    pub summary: String,
    /// Text extracted from the LinkedIn PDF export (`linkedin.pdf`).
    pub linkedin: String,
}

impl Profile {
    /// Loads `summary.txt` and `linkedin.pdf` from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            summary: read_txt(dir.join("summary.txt")),
            linkedin: read_pdf_text(dir.join("linkedin.pdf")),
        }
    }

    /// True when neither document produced any text.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.linkedin.is_empty()
    }
}

/// Reads a UTF-8 text file; empty string on any failure.
fn read_txt(path: PathBuf) -> String {
    match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(
                target: "persona::profile",
                path = %path.display(),
                error = %e,
                "summary not loaded"
            );
            String::new()
        }
    }
}

/// Extracts text from every page of a PDF, pages joined with newlines;
/// empty string on any failure.
fn read_pdf_text(path: PathBuf) -> String {
    let doc = match lopdf::Document::load(&path) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(
                target: "persona::profile",
                path = %path.display(),
                error = %e,
                "linkedin pdf not loaded"
            );
            return String::new();
        }
    };
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut out: Vec<String> = Vec::with_capacity(pages.len());
    for page in pages {
        match doc.extract_text(&[page]) {
            Ok(text) => out.push(text),
            // A single broken page should not void the rest of the export.
            Err(e) => {
                tracing::warn!(
                    target: "persona::profile",
                    page,
                    error = %e,
                    "pdf page text extraction failed"
                );
                out.push(String::new());
            }
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_degrade_to_empty_profile() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::load(dir.path());
        assert_eq!(profile.summary, "");
        assert_eq!(profile.linkedin, "");
        assert!(profile.is_empty());
    }

    #[test]
    fn summary_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("summary.txt"), "Engineer. Builder.").unwrap();
        let profile = Profile::load(dir.path());
        assert_eq!(profile.summary, "Engineer. Builder.");
        assert_eq!(profile.linkedin, "");
        assert!(!profile.is_empty());
    }

    #[test]
    fn garbage_pdf_degrades_to_empty_string() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("linkedin.pdf"), b"not a pdf at all").unwrap();
        let profile = Profile::load(dir.path());
        assert_eq!(profile.linkedin, "");
    }
}
