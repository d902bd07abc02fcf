//! Run orchestration.
//!
//! [`Bundler`] ties the selector to the emitter: it validates the root,
//! opens the destination (truncating any previous bundle), and streams one
//! section per candidate in traversal order. Per-file and per-directory
//! failures are recorded in the [`BundleReport`] and never abort the run;
//! only a bad root or an unopenable destination is fatal.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::decode;
use crate::emitter::{write_preamble, write_section, write_skip_notice};
use crate::errors::BundleError;
use crate::filter::{language_tag, RuleSet};
use crate::walker::{select, WalkError};

/// Builder for a bundle run.
///
/// # Examples
///
/// ```no_run
/// use ctxcat::bundle::Bundler;
///
/// let report = Bundler::new("./my-project")
///     .write_to("project_context.md".as_ref())
///     .unwrap();
/// println!("{} files bundled, {} skipped", report.included, report.skipped);
/// ```
pub struct Bundler {
    root: PathBuf,
    rules: RuleSet,
    detect: bool,
    preamble: bool,
}

impl Bundler {
    /// Create a bundler for the given scan root with default rules.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rules: RuleSet::default(),
            detect: true,
            preamble: false,
        }
    }

    /// Replace the rule set.
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Enable or disable charset detection for non-UTF-8 files
    /// (default: enabled; disabled means straight lossy fallback).
    pub fn detect_encodings(mut self, detect: bool) -> Self {
        self.detect = detect;
        self
    }

    /// Prepend the descriptive document header (default: off).
    pub fn preamble(mut self, preamble: bool) -> Self {
        self.preamble = preamble;
        self
    }

    /// Run the bundle and write it to `dest`, overwriting any existing file.
    pub fn write_to(&self, dest: &Path) -> Result<BundleReport, BundleError> {
        self.validate_root()?;

        let file = File::create(dest).map_err(|source| BundleError::Output {
            path: dest.to_path_buf(),
            source,
        })?;
        let mut out = BufWriter::new(file);
        let report = self.write(&mut out)?;
        out.flush().map_err(|source| BundleError::Output {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(report)
    }

    /// Run the bundle against an arbitrary writer.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<BundleReport, BundleError> {
        self.validate_root()?;

        let resolver = decode::resolver(self.detect);
        let mut report = BundleReport::default();

        if self.preamble {
            write_preamble(out, &self.root.display().to_string())?;
        }

        for item in select(&self.root, &self.rules) {
            match item {
                Ok(candidate) => {
                    let display = candidate.display_path();
                    match decode::read_text(&candidate.path, resolver.as_ref()) {
                        Ok(decoded) => {
                            write_section(
                                out,
                                &display,
                                language_tag(&candidate.path),
                                &decoded.text,
                            )?;
                            report.included += 1;
                        }
                        Err(err) => {
                            report.warnings.push(err.to_string());
                            write_skip_notice(out, &display, "unreadable")?;
                            report.skipped += 1;
                        }
                    }
                }
                // Root errors were ruled out by validate_root; anything
                // surfacing here is an unlistable subtree.
                Err(err @ WalkError::Unlistable { .. }) => {
                    report.warnings.push(err.to_string());
                    report.unlistable_dirs += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(report)
    }

    fn validate_root(&self) -> Result<(), BundleError> {
        if !self.root.exists() {
            return Err(BundleError::RootNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(BundleError::RootNotADirectory(self.root.clone()));
        }
        Ok(())
    }
}

/// Outcome of a bundle run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BundleReport {
    /// Files whose content made it into the document.
    pub included: usize,
    /// Files replaced by a skip notice.
    pub skipped: usize,
    /// Directories that could not be listed.
    pub unlistable_dirs: usize,
    /// Human-readable descriptions of every recoverable failure.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn bundle_to_string(bundler: &Bundler) -> (String, BundleReport) {
        let mut buf = Vec::new();
        let report = bundler.write(&mut buf).unwrap();
        (String::from_utf8(buf).unwrap(), report)
    }

    #[test]
    fn test_scenario_single_python_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "print(\"hi\")\n").unwrap();
        fs::write(dir.path().join("b.log"), "noise\n").unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), "[core]\n").unwrap();

        let (doc, report) = bundle_to_string(&Bundler::new(dir.path()));

        assert_eq!(
            doc,
            "--- File: a.py ---\n```python\nprint(\"hi\")\n```\n\n"
        );
        assert_eq!(report.included, 1);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn test_scenario_binary_file_gets_notice() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("c.py"), b"\x00\x01garbage").unwrap();
        fs::write(dir.path().join("d.py"), "ok = True\n").unwrap();

        let (doc, report) = bundle_to_string(&Bundler::new(dir.path()));

        assert!(doc.contains("--- File: c.py ---\n_[file skipped: unreadable]_\n"));
        assert!(doc.contains("--- File: d.py ---\n```python\nok = True\n```\n"));
        assert_eq!(report.included, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_sections_follow_traversal_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.py"), "b\n").unwrap();
        fs::write(dir.path().join("a.py"), "a\n").unwrap();
        fs::create_dir_all(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/c.py"), "c\n").unwrap();

        let (doc, _) = bundle_to_string(&Bundler::new(dir.path()));

        let a = doc.find("--- File: a.py ---").unwrap();
        let b = doc.find("--- File: b.py ---").unwrap();
        let c = doc.find("--- File: lib/c.py ---").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_output_is_deterministic() {
        let dir = TempDir::new().unwrap();
        for name in ["x.py", "y.rs", "z.md"] {
            fs::write(dir.path().join(name), format!("{}\n", name)).unwrap();
        }

        let (first, _) = bundle_to_string(&Bundler::new(dir.path()));
        let (second, _) = bundle_to_string(&Bundler::new(dir.path()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_to_overwrites_previous_bundle() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        let dest = dir.path().join("out").join("bundle.md");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();

        // "out" is an excluded dir name, so the bundle never scans itself.
        let bundler = Bundler::new(dir.path());
        bundler.write_to(&dest).unwrap();
        let first = fs::read_to_string(&dest).unwrap();
        bundler.write_to(&dest).unwrap();
        let second = fs::read_to_string(&dest).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.matches("--- File: a.py ---").count(), 1);
    }

    #[test]
    fn test_non_utf8_file_is_decoded_not_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("legacy.txt"), b"caf\xe9\n").unwrap();

        let (doc, report) = bundle_to_string(&Bundler::new(dir.path()));

        assert_eq!(report.included, 1);
        assert!(doc.contains("caf\u{e9}\n"));
    }

    #[test]
    fn test_detection_disabled_falls_back_to_lossy() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("legacy.txt"), b"caf\xe9\n").unwrap();

        let (doc, report) =
            bundle_to_string(&Bundler::new(dir.path()).detect_encodings(false));

        assert_eq!(report.included, 1);
        assert!(doc.contains('\u{fffd}'));
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_subdirectory_warns_and_run_completes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        let sealed = dir.path().join("sealed");
        fs::create_dir(&sealed).unwrap();
        fs::write(sealed.join("hidden.py"), "y = 2\n").unwrap();
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o000)).unwrap();

        // Root bypasses permission checks; there is nothing to observe then.
        if fs::read_dir(&sealed).is_ok() {
            fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let (doc, report) = bundle_to_string(&Bundler::new(dir.path()));
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(doc.contains("--- File: a.py ---\n```python\nx = 1\n```\n"));
        assert!(!doc.contains("hidden.py"));
        assert_eq!(report.included, 1);
        assert_eq!(report.unlistable_dirs, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("sealed"));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let err = Bundler::new("/definitely/not/here")
            .write(&mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, BundleError::RootNotFound(_)));
    }

    #[test]
    fn test_preamble_precedes_sections() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();

        let (doc, _) = bundle_to_string(&Bundler::new(dir.path()).preamble(true));

        assert!(doc.starts_with("# Project Code Context for LLM\n"));
        let header = doc.find("---\n\n").unwrap();
        let section = doc.find("--- File: a.py ---").unwrap();
        assert!(header < section);
    }

    #[test]
    fn test_custom_rules() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "x\n").unwrap();
        fs::write(dir.path().join("b.weird"), "y\n").unwrap();

        let rules = RuleSet::empty().include(".weird");
        let (doc, report) = bundle_to_string(&Bundler::new(dir.path()).rules(rules));

        assert_eq!(report.included, 1);
        assert!(doc.contains("--- File: b.weird ---"));
        assert!(!doc.contains("a.py"));
    }
}
