//! File selection rules.
//!
//! A [`RuleSet`] holds the include/exclude configuration that decides which
//! files end up in the bundle: a set of included extensions (or bare
//! filenames such as `Dockerfile`), a set of directory names to prune, and a
//! set of excluded extensions/filenames that override inclusion.

use std::collections::BTreeSet;
use std::path::Path;

/// Extensions included by default. Entries are either dot-extensions
/// (matched case-insensitively against the file's extension) or bare
/// filenames (matched exactly).
pub const DEFAULT_INCLUDED: &[&str] = &[
    ".py", ".js", ".jsx", ".ts", ".tsx", ".html", ".htm", ".css", ".scss",
    ".java", ".kt", ".swift", ".c", ".cpp", ".h", ".hpp", ".cs", ".go",
    ".rs", ".php", ".rb", ".pl", ".sh", ".bat", ".ps1",
    ".json", ".yaml", ".yml", ".xml", ".toml", ".ini", ".cfg",
    ".md", ".txt", ".rst", ".tex",
    ".sql", ".dockerfile", "Dockerfile", ".env", ".gitignore", ".gitattributes",
];

/// Directory names pruned from traversal by default.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git", "node_modules", "venv", ".venv", "env", ".env",
    "__pycache__", "dist", "build", "target", "out",
    ".vscode", ".idea", ".project", ".settings",
    "vendor", "Pods", "Carthage",
];

/// Extensions and filenames excluded by default: logs, editor droppings,
/// lock files, and binary formats that are useless as LLM context.
pub const DEFAULT_EXCLUDED: &[&str] = &[
    ".log", ".tmp", ".temp", ".swp", ".bak", ".old",
    ".DS_Store", "Thumbs.db",
    ".lock", "package-lock.json", "yarn.lock", "composer.lock", "Pipfile.lock",
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".ico", ".svg",
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    ".zip", ".tar", ".gz", ".rar", ".7z",
    ".exe", ".dll", ".so", ".dylib", ".jar", ".class", ".pyc", ".o",
    ".mp3", ".wav", ".mp4", ".mov", ".avi",
];

/// Why a file was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptReason {
    /// Extension is in the included set.
    IncludedExtension,
    /// Exact filename is in the included set (e.g. `Dockerfile`).
    IncludedFilename,
}

/// Why a file was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Extension or filename is in the excluded set.
    Excluded,
    /// Neither extension nor filename is in the included set.
    NotIncluded,
}

/// Result of applying the rule set to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    Accept(AcceptReason),
    Reject(RejectReason),
}

/// Immutable include/exclude configuration, built once at startup.
///
/// Sets are ordered so listings and diagnostics come out in a stable order.
#[derive(Debug, Clone)]
pub struct RuleSet {
    included: BTreeSet<String>,
    excluded_dirs: BTreeSet<String>,
    excluded: BTreeSet<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            included: DEFAULT_INCLUDED.iter().map(|s| s.to_string()).collect(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            excluded: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RuleSet {
    /// Start from the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with empty sets (useful for tests and narrow scans).
    pub fn empty() -> Self {
        Self {
            included: BTreeSet::new(),
            excluded_dirs: BTreeSet::new(),
            excluded: BTreeSet::new(),
        }
    }

    /// Add an included extension or filename. Extensions may be given with
    /// or without the leading dot; `rs` and `.rs` are equivalent.
    pub fn include(mut self, entry: &str) -> Self {
        self.included.insert(normalize_entry(entry));
        self
    }

    /// Add an excluded extension or filename.
    pub fn exclude(mut self, entry: &str) -> Self {
        self.excluded.insert(normalize_entry(entry));
        self
    }

    /// Add a directory name to prune.
    pub fn exclude_dir(mut self, name: &str) -> Self {
        self.excluded_dirs.insert(name.to_string());
        self
    }

    /// Whether a directory with this name should be pruned entirely.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.contains(name)
    }

    /// Apply the rules to one file path. Exclusion wins over inclusion.
    pub fn check(&self, path: &Path) -> FilterResult {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => return FilterResult::Reject(RejectReason::NotIncluded),
        };

        let ext = dot_extension(path);

        if self.excluded.contains(filename)
            || ext.as_deref().is_some_and(|e| self.excluded.contains(e))
        {
            return FilterResult::Reject(RejectReason::Excluded);
        }

        if ext.as_deref().is_some_and(|e| self.included.contains(e)) {
            return FilterResult::Accept(AcceptReason::IncludedExtension);
        }
        if self.included.contains(filename) {
            return FilterResult::Accept(AcceptReason::IncludedFilename);
        }

        FilterResult::Reject(RejectReason::NotIncluded)
    }

    /// Included entries, in sorted order.
    pub fn included_entries(&self) -> impl Iterator<Item = &str> {
        self.included.iter().map(String::as_str)
    }

    /// Excluded directory names, in sorted order.
    pub fn excluded_dir_entries(&self) -> impl Iterator<Item = &str> {
        self.excluded_dirs.iter().map(String::as_str)
    }

    /// Excluded entries, in sorted order.
    pub fn excluded_entries(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }
}

/// The file's extension as a lowercase dot-prefixed string, if any.
fn dot_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
}

fn normalize_entry(entry: &str) -> String {
    // Extension entries are stored lowercase with their dot, so matching is
    // case-insensitive on the config side as well as the file side. Dotted
    // names that are not plain extensions (Thumbs.db, .DS_Store) and
    // mixed-case bare names (Dockerfile) are kept as exact filenames.
    if let Some(rest) = entry.strip_prefix('.') {
        if rest.contains('.') || !rest.chars().all(|c| c.is_ascii_alphanumeric()) {
            return entry.to_string();
        }
        return format!(".{}", rest.to_lowercase());
    }
    let mixed_case = entry.chars().any(|c| c.is_uppercase())
        && entry.chars().any(|c| c.is_lowercase());
    if entry.contains('.') || mixed_case {
        entry.to_string()
    } else {
        format!(".{}", entry.to_lowercase())
    }
}

/// Map a candidate file to its Markdown fence language tag.
///
/// Unmapped extensions return `None`, which renders as a bare fence.
pub fn language_tag(path: &Path) -> Option<&'static str> {
    let filename = path.file_name().and_then(|n| n.to_str())?;
    if filename == "Dockerfile" {
        return Some("dockerfile");
    }
    if matches!(filename, ".env" | ".gitignore" | ".gitattributes") {
        return Some("text");
    }

    let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
    let tag = match ext.as_str() {
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" => "typescript",
        "tsx" => "tsx",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "java" => "java",
        "kt" => "kotlin",
        "swift" => "swift",
        "c" | "h" => "c",
        "cpp" | "hpp" => "cpp",
        "cs" => "csharp",
        "go" => "go",
        "rs" => "rust",
        "php" => "php",
        "rb" => "ruby",
        "pl" => "perl",
        "sh" => "bash",
        "bat" => "batch",
        "ps1" => "powershell",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "xml" => "xml",
        "toml" => "toml",
        "ini" | "cfg" => "ini",
        "md" => "markdown",
        "txt" => "text",
        "rst" => "rst",
        "tex" => "latex",
        "sql" => "sql",
        "dockerfile" => "dockerfile",
        _ => return None,
    };
    Some(tag)
}
