use std::fmt;
use std::path::Path;

use anyhow::Error;
use serde::Serialize;

pub const DECODE_ERROR: &str = "DECODE_ERROR";
pub const FORMAT_ERROR: &str = "FORMAT_ERROR";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const IO_ERROR: &str = "IO_ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodedErrorKind {
    /// Source image or font could not be read or is not a supported format.
    Decode,
    /// Malformed character-region text or manifest value.
    Format,
    /// The imported font is unusable (no glyphs, missing default character).
    Validation,
}

#[derive(Debug, Clone)]
pub struct CodedError {
    pub code: &'static str,
    pub message: String,
    pub kind: CodedErrorKind,
}

impl CodedError {
    pub fn decode(path: &Path, reason: impl fmt::Display) -> Self {
        Self {
            code: DECODE_ERROR,
            message: format!("Unable to load '{}': {}", path.display(), reason),
            kind: CodedErrorKind::Decode,
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self {
            code: FORMAT_ERROR,
            message: message.into(),
            kind: CodedErrorKind::Format,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: VALIDATION_ERROR,
            message: message.into(),
            kind: CodedErrorKind::Validation,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            ok: false,
            error: ErrorEnvelopeBody {
                code: self.code.to_owned(),
                message: self.message.clone(),
            },
        }
    }
}

impl fmt::Display for CodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CodedError {}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: ErrorEnvelopeBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelopeBody {
    pub code: String,
    pub message: String,
}

pub fn find_coded_error(error: &Error) -> Option<&CodedError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CodedError>())
}

/// Envelope for any pipeline failure. Errors without a coded cause are
/// reported as IO failures with the full context chain as the message.
pub fn error_envelope(error: &Error) -> ErrorEnvelope {
    match find_coded_error(error) {
        Some(coded) => coded.envelope(),
        None => ErrorEnvelope {
            ok: false,
            error: ErrorEnvelopeBody {
                code: IO_ERROR.to_owned(),
                message: format!("{error:#}"),
            },
        },
    }
}
