//! Submission payload, validation and destination path derivation.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_TITLE: &str = "leetcode";
pub const DEFAULT_LANGUAGE: &str = "codes";

/// Raw `/push` body. Every field is optional on the wire; defaults and
/// required-field checks are applied by [`Submission::try_from`].
#[derive(Debug, Default, Deserialize)]
pub struct PushRequest {
    pub title: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub token: Option<String>,
    pub repo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("No code provided")]
    MissingCode,

    #[error("Missing GitHub token or repo")]
    MissingCredentials,
}

/// A validated submission with defaults applied.
#[derive(Clone)]
pub struct Submission {
    pub title: String,
    pub code: String,
    pub language: String,
    pub token: String,
    pub repo: String,
}

impl TryFrom<PushRequest> for Submission {
    type Error = SubmissionError;

    fn try_from(request: PushRequest) -> Result<Self, Self::Error> {
        let code = non_empty(request.code).ok_or(SubmissionError::MissingCode)?;
        let (token, repo) = match (non_empty(request.token), non_empty(request.repo)) {
            (Some(token), Some(repo)) => (token, repo),
            _ => return Err(SubmissionError::MissingCredentials),
        };

        Ok(Self {
            title: request.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            code,
            language: request
                .language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            token,
            repo,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Submission {
    pub fn problem_folder(&self) -> String {
        problem_folder(&self.title)
    }

    pub fn file_ext(&self) -> &'static str {
        file_ext(&self.language)
    }

    /// Destination path inside the repository: `{folder}/solution.{ext}`.
    pub fn path(&self) -> String {
        format!("{}/solution.{}", self.problem_folder(), self.file_ext())
    }

    pub fn commit_message(&self) -> String {
        format!("Add solution for {}", self.title)
    }

    pub fn encoded_content(&self) -> String {
        STANDARD.encode(self.code.as_bytes())
    }
}

impl fmt::Debug for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submission")
            .field("title", &self.title)
            .field("language", &self.language)
            .field("repo", &self.repo)
            .field("code_len", &self.code.len())
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Folder name for a problem title.
///
/// Keeps ASCII letters, digits, underscores and whitespace, then trims and
/// joins the remaining words with `_`. Titles that sanitize to nothing fall
/// back to [`DEFAULT_TITLE`].
pub fn problem_folder(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    let folder = kept.split_whitespace().collect::<Vec<_>>().join("_");
    if folder.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        folder
    }
}

/// File extension inferred from a free-form language label. First match wins.
pub fn file_ext(language: &str) -> &'static str {
    let language = language.to_lowercase();

    if language.contains("cpp") || language.contains("c++") {
        "cpp"
    } else if language == "c" {
        "c"
    } else if language.contains("python") {
        "py"
    } else if language.contains("java") && !language.contains("javascript") {
        "java"
    } else if language.contains("javascript") {
        "js"
    } else if language.contains("kotlin") {
        "kt"
    } else if language.contains("swift") {
        "swift"
    } else {
        "txt"
    }
}
