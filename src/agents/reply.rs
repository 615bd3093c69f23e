use regex::Regex;
use std::sync::OnceLock;

/// The two fields extracted from a well-formed enrichment reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyParts {
    pub summary: String,
    pub image_prompt: String,
}

impl ReplyParts {
    /// Fallback when the reply cannot be parsed: reuse the reviewer's own
    /// words as both summary and image prompt.
    pub fn from_feedback(feedback: &str) -> Self {
        let text = feedback.trim().to_string();
        Self {
            summary: text.clone(),
            image_prompt: text,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("expected two labeled lines, got {lines}")]
pub struct MalformedReply {
    pub lines: usize,
}

fn summary_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^summary:").unwrap())
}

fn prompt_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The API spells it "DALL·E"; tolerate the ASCII variants too.
    RE.get_or_init(|| Regex::new(r"(?i)^dall[·-]?e prompt:").unwrap())
}

/// Parses the expected two-line reply: a `Summary:` line followed by a
/// `DALL·E Prompt:` line. Blank lines are skipped; a line missing its prefix
/// contributes its full trimmed text. Fewer than two non-empty lines is a
/// [`MalformedReply`].
pub fn parse_reply(raw: &str) -> Result<ReplyParts, MalformedReply> {
    let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());

    let (first, second) = match (lines.next(), lines.next()) {
        (Some(f), Some(s)) => (f, s),
        (first, _) => {
            return Err(MalformedReply {
                lines: first.map_or(0, |_| 1),
            })
        }
    };

    Ok(ReplyParts {
        summary: summary_prefix().replace(first, "").trim().to_string(),
        image_prompt: prompt_prefix().replace(second, "").trim().to_string(),
    })
}
