use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Malformed record on line {line}: {reason}")]
    Decode { line: usize, reason: String },
    #[error("Missing \"running\" record in logs")]
    MissingMarker,
    #[error("Duplicate \"running\" record in logs (line {line}, engine {engine})")]
    DuplicateMarker { line: usize, engine: String },
    #[error("Could not write {path:?}: {source}{}", cleanup_note(.cleanup))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        /// Set when removing the partially written output failed as well.
        cleanup: Option<std::io::Error>,
    },
    #[error("Could not render page: {0}")]
    Render(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn cleanup_note(cleanup: &Option<std::io::Error>) -> String {
    match cleanup {
        Some(err) => format!(" (cleanup also failed: {err})"),
        None => String::new(),
    }
}

impl PlotError {
    pub fn decode(line: usize, reason: impl ToString) -> Self {
        Self::Decode {
            line,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_reports_cleanup_failure() {
        let err = PlotError::Write {
            path: PathBuf::from("out.html"),
            source: std::io::Error::other("disk full"),
            cleanup: Some(std::io::Error::other("permission denied")),
        };
        let message = err.to_string();
        assert!(message.contains("disk full"));
        assert!(message.contains("cleanup also failed: permission denied"));
    }

    #[test]
    fn write_error_without_cleanup_failure() {
        let err = PlotError::Write {
            path: PathBuf::from("out.html"),
            source: std::io::Error::other("disk full"),
            cleanup: None,
        };
        assert!(!err.to_string().contains("cleanup"));
    }
}
