//! Byte-to-text recovery for candidate files.
//!
//! Decoding tries UTF-8 first, then charset detection, then lossy UTF-8.
//! The detection step is pluggable: [`EncodingResolver`] has a
//! detector-backed implementation ([`DetectingResolver`], chardetng) and a
//! no-op one ([`FallbackResolver`]), chosen once at startup instead of
//! branching inside the decode path. Decoding itself never fails; files are
//! only rejected by the binary heuristic or by I/O errors, which callers
//! turn into skip notices.

use std::path::{Path, PathBuf};

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use thiserror::Error;

/// How many leading bytes feed the charset detector and the binary check.
const DETECT_PREFIX: usize = 8 * 1024;

/// Errors that make a single file unreadable. All are recoverable at the
/// run level; the file is skipped and the scan continues.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("binary content in {path}")]
    Binary { path: PathBuf },
}

/// Text recovered from one file, with the label of the encoding used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// Encoding label, e.g. `utf-8`, `windows-1252`, or `utf-8 (lossy)`.
    pub encoding: String,
}

/// Strategy for suggesting an encoding when bytes are not valid UTF-8.
pub trait EncodingResolver {
    /// Best-effort guess; `None` means "no suggestion, use the fallback".
    fn suggest(&self, bytes: &[u8]) -> Option<&'static Encoding>;
}

/// Resolver backed by chardetng.
#[derive(Debug, Default)]
pub struct DetectingResolver;

impl EncodingResolver for DetectingResolver {
    fn suggest(&self, bytes: &[u8]) -> Option<&'static Encoding> {
        let mut detector = EncodingDetector::new();
        let prefix = &bytes[..bytes.len().min(DETECT_PREFIX)];
        detector.feed(prefix, bytes.len() <= DETECT_PREFIX);
        let encoding = detector.guess(None, true);
        // A UTF-8 guess adds nothing: strict UTF-8 already failed.
        if encoding == encoding_rs::UTF_8 {
            None
        } else {
            Some(encoding)
        }
    }
}

/// Resolver that never suggests anything, forcing the lossy fallback.
#[derive(Debug, Default)]
pub struct FallbackResolver;

impl EncodingResolver for FallbackResolver {
    fn suggest(&self, _bytes: &[u8]) -> Option<&'static Encoding> {
        None
    }
}

/// Pick a resolver at startup.
pub fn resolver(detect: bool) -> Box<dyn EncodingResolver> {
    if detect {
        Box::new(DetectingResolver)
    } else {
        Box::new(FallbackResolver)
    }
}

/// True if the leading bytes look like binary data (contain NUL).
pub fn looks_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(DETECT_PREFIX)].contains(&0)
}

/// Read and decode one file.
///
/// The whole file is loaded in one shot; candidates are assumed small
/// enough for that. Returns `Err` only for I/O failures and binary
/// content; every text decode path succeeds.
pub fn read_text(path: &Path, resolver: &dyn EncodingResolver) -> Result<DecodedText, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if looks_binary(&bytes) {
        return Err(DecodeError::Binary {
            path: path.to_path_buf(),
        });
    }

    Ok(decode(&bytes, resolver))
}

/// Decode raw bytes: strict UTF-8, then the resolver's suggestion, then
/// lossy UTF-8. Never fails.
pub fn decode(bytes: &[u8], resolver: &dyn EncodingResolver) -> DecodedText {
    match std::str::from_utf8(bytes) {
        Ok(text) => DecodedText {
            text: text.to_string(),
            encoding: "utf-8".to_string(),
        },
        Err(_) => decode_non_utf8(bytes, resolver),
    }
}

fn decode_non_utf8(bytes: &[u8], resolver: &dyn EncodingResolver) -> DecodedText {
    if let Some(encoding) = resolver.suggest(bytes) {
        let (text, used, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return DecodedText {
                text: text.into_owned(),
                encoding: used.name().to_lowercase(),
            };
        }
    }

    DecodedText {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: "utf-8 (lossy)".to_string(),
    }
}
