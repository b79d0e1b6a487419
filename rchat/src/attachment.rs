//! `/include` command parsing and attachment file reads.
//!
//! ```rust
//! use std::path::PathBuf;
//!
//! use rchat::IncludeCommand;
//!
//! let command = IncludeCommand::parse("/include ./src *.rs")
//!     .expect("prompt is an include command")
//!     .expect("arguments are valid");
//!
//! assert_eq!(
//!     command,
//!     IncludeCommand::Glob {
//!         dir: PathBuf::from("./src"),
//!         pattern: "*.rs".to_string(),
//!     }
//! );
//! assert!(IncludeCommand::parse("hello there").is_none());
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

use crate::{ChatError, ChatMessage};

pub const INCLUDE_PREFIX: &str = "/include";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentErrorKind {
    NotFound,
    PermissionDenied,
    Other,
}

/// Per-file read failure, reported as a notice rather than a session error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentError {
    pub kind: AttachmentErrorKind,
    pub path: PathBuf,
    pub message: String,
}

impl AttachmentError {
    pub fn new(kind: AttachmentErrorKind, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn from_io(path: &Path, error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::new(
                AttachmentErrorKind::NotFound,
                path,
                format!("file '{}' not found", path.display()),
            ),
            io::ErrorKind::PermissionDenied => Self::new(
                AttachmentErrorKind::PermissionDenied,
                path,
                format!("permission denied for accessing the file '{}'", path.display()),
            ),
            _ => Self::new(
                AttachmentErrorKind::Other,
                path,
                format!("unexpected error reading '{}': {error}", path.display()),
            ),
        }
    }
}

impl Display for AttachmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for AttachmentError {}

impl From<AttachmentError> for ChatError {
    fn from(value: AttachmentError) -> Self {
        ChatError::attachment(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub ext: String,
    pub data: String,
}

impl Attachment {
    pub fn into_message(self) -> ChatMessage {
        ChatMessage::file(self.name, self.ext, self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeCommand {
    File(PathBuf),
    Glob { dir: PathBuf, pattern: String },
}

impl IncludeCommand {
    /// `None` when `prompt` is not an include command at all.
    pub fn parse(prompt: &str) -> Option<Result<Self, ChatError>> {
        let prompt = prompt.trim();
        if !prompt.starts_with(INCLUDE_PREFIX) {
            return None;
        }

        let parts = prompt.split_whitespace().collect::<Vec<_>>();
        let command = match parts.as_slice() {
            [_, path] => Ok(Self::File(PathBuf::from(path))),
            [_, dir, pattern] => Ok(Self::Glob {
                dir: PathBuf::from(dir),
                pattern: pattern.to_string(),
            }),
            _ => Err(ChatError::invalid_request(
                "usage: /include <path> or /include <dir> <pattern>",
            )),
        };

        Some(command)
    }

    /// Expands the command into candidate paths; glob failures become notices.
    pub fn resolve(&self) -> Vec<Result<PathBuf, AttachmentError>> {
        match self {
            Self::File(path) => vec![Ok(path.clone())],
            Self::Glob { dir, pattern } => {
                // Only `pattern` is a glob; the directory is matched literally.
                let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
                let full = Path::new(&escaped_dir).join(pattern);
                let full = full.to_string_lossy();
                match glob::glob(&full) {
                    Ok(paths) => paths
                        .map(|entry| {
                            entry.map_err(|err| AttachmentError::from_io(err.path(), err.error()))
                        })
                        .filter(|entry| !matches!(entry, Ok(path) if path.is_dir()))
                        .collect(),
                    Err(err) => vec![Err(AttachmentError::new(
                        AttachmentErrorKind::Other,
                        dir.clone(),
                        format!("invalid pattern '{pattern}': {err}"),
                    ))],
                }
            }
        }
    }
}

pub fn read_attachment(path: &Path) -> Result<Attachment, AttachmentError> {
    let data = std::fs::read_to_string(path).map_err(|err| AttachmentError::from_io(path, &err))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Attachment { name, ext, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatErrorKind;

    fn temp_dir(prefix: &str) -> PathBuf {
        let unique = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("rchat-{prefix}-{unique}"))
    }

    #[test]
    fn parse_distinguishes_single_file_glob_and_bad_arity() {
        assert_eq!(
            IncludeCommand::parse("/include notes.md"),
            Some(Ok(IncludeCommand::File(PathBuf::from("notes.md"))))
        );

        let error = IncludeCommand::parse("/include")
            .expect("prefix matched")
            .expect_err("missing path must fail");
        assert_eq!(error.kind, ChatErrorKind::InvalidRequest);

        assert!(IncludeCommand::parse("/include a b c").is_some_and(|parsed| parsed.is_err()));
    }

    #[test]
    fn read_attachment_reports_name_extension_and_data() {
        let dir = temp_dir("read");
        std::fs::create_dir_all(&dir).expect("dir should be created");
        let path = dir.join("plan.md");
        std::fs::write(&path, "# Plan\n").expect("file should be written");

        let attachment = read_attachment(&path).expect("file should be read");

        assert_eq!(attachment.name, "plan.md");
        assert_eq!(attachment.ext, "md");
        assert_eq!(attachment.data, "# Plan\n");
        assert_eq!(
            attachment.into_message(),
            ChatMessage::file("plan.md", "md", "# Plan\n")
        );

        std::fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn missing_files_are_classified_as_not_found() {
        let path = temp_dir("missing").join("nope.txt");

        let error = read_attachment(&path).expect_err("missing file must fail");

        assert_eq!(error.kind, AttachmentErrorKind::NotFound);
        assert_eq!(error.path, path);
        assert!(error.message.contains("not found"));
    }

    #[test]
    fn glob_resolves_matching_files_in_sorted_order() {
        let dir = temp_dir("glob");
        std::fs::create_dir_all(dir.join("nested.rs")).expect("dir should be created");
        std::fs::write(dir.join("b.rs"), "b").expect("write b");
        std::fs::write(dir.join("a.rs"), "a").expect("write a");
        std::fs::write(dir.join("c.txt"), "c").expect("write c");

        let command = IncludeCommand::Glob {
            dir: dir.clone(),
            pattern: "*.rs".to_string(),
        };
        let resolved = command
            .resolve()
            .into_iter()
            .map(|entry| entry.expect("entry should resolve"))
            .collect::<Vec<_>>();

        assert_eq!(resolved, vec![dir.join("a.rs"), dir.join("b.rs")]);

        std::fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn glob_metacharacters_in_the_directory_are_literal() {
        let dir = temp_dir("glob").join("drafts[1]");
        std::fs::create_dir_all(&dir).expect("dir should be created");
        std::fs::write(dir.join("a.rs"), "a").expect("write a");

        let command = IncludeCommand::Glob {
            dir: dir.clone(),
            pattern: "*.rs".to_string(),
        };
        let resolved = command
            .resolve()
            .into_iter()
            .map(|entry| entry.expect("entry should resolve"))
            .collect::<Vec<_>>();

        assert_eq!(resolved, vec![dir.join("a.rs")]);

        std::fs::remove_dir_all(dir.parent().expect("temp root")).expect("cleanup");
    }
}
