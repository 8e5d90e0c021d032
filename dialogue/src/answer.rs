//! Session results.

use errors::{DialogueError, ErrorKind};
use serde::{Deserialize, Serialize};

/// The aggregated answer of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideAnswer {
    pub full_text: String,
    pub session_uid: String,
    /// Service-side session id, kept for support correlation
    pub sid: Option<String>,
    pub frames: usize
}

/// One `# heading` block of a guide answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideSection {
    /// `None` for text that precedes the first heading
    pub heading: Option<String>,
    pub body: String
}

impl GuideAnswer {
    /// Splits the markdown answer at lines beginning with `# `.
    ///
    /// Text before the first heading becomes an untitled section (omitted
    /// when blank). Sections with empty bodies are kept.
    pub fn sections(&self) -> Vec<GuideSection> {
        split_sections(&self.full_text)
    }
}

pub fn split_sections(text: &str) -> Vec<GuideSection> {
    let mut sections = Vec::new();
    let mut heading: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    let mut flush = |heading: Option<String>, body: &mut Vec<&str>| {
        let joined = body.join("\n").trim().to_string();
        body.clear();
        if heading.is_some() || !joined.is_empty() {
            sections.push(GuideSection {
                heading,
                body: joined
            });
        }
    };

    for line in text.lines() {
        if let Some(title) = line.strip_prefix("# ") {
            flush(heading.take(), &mut body);
            heading = Some(title.trim().to_string());
        } else {
            body.push(line);
        }
    }
    flush(heading, &mut body);

    sections
}

/// Serialisable result view handed to UI layers: either the full text or
/// a classified error, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionOutcome {
    Completed {
        #[serde(rename = "fullText")]
        full_text: String
    },
    Failed {
        #[serde(rename = "errorKind")]
        error_kind: ErrorKind,
        #[serde(rename = "errorMessage")]
        error_message: String
    }
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

impl From<&Result<GuideAnswer, DialogueError>> for SessionOutcome {
    fn from(result: &Result<GuideAnswer, DialogueError>) -> Self {
        match result {
            Ok(answer) => Self::Completed {
                full_text: answer.full_text.clone()
            },
            Err(err) => Self::Failed {
                error_kind: err.kind(),
                error_message: err.to_string()
            }
        }
    }
}
