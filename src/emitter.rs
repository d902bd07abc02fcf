//! Markdown section formatting.
//!
//! Each candidate contributes one self-contained section to the output
//! document: a `--- File: path ---` marker line, then the file's text in a
//! fenced code block tagged with the language from the extension table.
//! Files that could not be read as text get a one-line skip notice under
//! the same marker, so the document never silently drops a candidate.

use std::io::Write;

use thiserror::Error;

/// Errors writing to the output document.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("cannot write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Write one file section.
///
/// Trailing newlines in `text` are normalized to exactly one, so the
/// closing fence always sits on its own line and sections are separated by
/// a single blank line regardless of how the source file ended.
pub fn write_section<W: Write>(
    out: &mut W,
    display_path: &str,
    language: Option<&str>,
    text: &str,
) -> Result<(), EmitError> {
    writeln!(out, "--- File: {} ---", display_path)?;
    writeln!(out, "```{}", language.unwrap_or(""))?;
    writeln!(out, "{}", text.trim_end_matches('\n'))?;
    writeln!(out, "```")?;
    writeln!(out)?;
    Ok(())
}

/// Write a skip notice in place of a section.
pub fn write_skip_notice<W: Write>(
    out: &mut W,
    display_path: &str,
    reason: &str,
) -> Result<(), EmitError> {
    writeln!(out, "--- File: {} ---", display_path)?;
    writeln!(out, "_[file skipped: {}]_", reason)?;
    writeln!(out)?;
    Ok(())
}

/// Write the optional document preamble describing the bundle layout.
pub fn write_preamble<W: Write>(out: &mut W, root: &str) -> Result<(), EmitError> {
    writeln!(out, "# Project Code Context for LLM")?;
    writeln!(out)?;
    writeln!(out, "**Input Directory Scanned:** `{}`", root)?;
    writeln!(out)?;
    writeln!(
        out,
        "This document aggregates source code and text files from the project above."
    )?;
    writeln!(
        out,
        "Each file starts with a `--- File: relative/path ---` marker (forward slashes),"
    )?;
    writeln!(
        out,
        "followed by its content in a fenced code block tagged with the inferred language."
    )?;
    writeln!(out)?;
    writeln!(out, "---")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(path: &str, language: Option<&str>, text: &str) -> String {
        let mut buf = Vec::new();
        write_section(&mut buf, path, language, text).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_section_format() {
        let got = section("a.py", Some("python"), "print(\"hi\")\n");
        assert_eq!(got, "--- File: a.py ---\n```python\nprint(\"hi\")\n```\n\n");
    }

    #[test]
    fn test_section_without_language() {
        let got = section("notes", None, "hello\n");
        assert_eq!(got, "--- File: notes ---\n```\nhello\n```\n\n");
    }

    #[test]
    fn test_missing_trailing_newline_added() {
        let got = section("a.py", Some("python"), "x = 1");
        assert!(got.contains("x = 1\n```\n"));
    }

    #[test]
    fn test_multiple_trailing_newlines_collapsed() {
        let got = section("a.py", Some("python"), "x = 1\n\n\n");
        assert!(got.contains("x = 1\n```\n"));
        assert!(!got.contains("\n\n```"));
    }

    #[test]
    fn test_skip_notice() {
        let mut buf = Vec::new();
        write_skip_notice(&mut buf, "c.bin", "unreadable").unwrap();
        let got = String::from_utf8(buf).unwrap();
        assert_eq!(got, "--- File: c.bin ---\n_[file skipped: unreadable]_\n\n");
    }

    #[test]
    fn test_preamble_mentions_root() {
        let mut buf = Vec::new();
        write_preamble(&mut buf, "/tmp/project").unwrap();
        let got = String::from_utf8(buf).unwrap();
        assert!(got.contains("`/tmp/project`"));
        assert!(got.ends_with("---\n\n"));
    }
}
