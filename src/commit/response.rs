//! Decoding vendor text into ranked commit message candidates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commit::prompt::PLAIN_TEXT_SEPARATOR;
use crate::commit::request::{GenerationRequest, ResponseFormat};
use crate::error::DecodeError;
use crate::llm::json::extract_json;

/// Highest relevance score a candidate may carry.
pub const MAX_SCORE: u8 = 100;

/// One proposed commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub message: String,
    /// Relevance score, 0 to 100.
    pub score: u8,
    /// Optional explanation in the configured secondary language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Normalized result of one vendor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// Exact text the vendor produced, replayed as an assistant turn.
    pub raw_text: String,
    /// Candidates sorted by descending score.
    pub candidates: Vec<Candidate>,
    /// Note for the human; never part of the commit.
    pub advisory: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    commits: Vec<RawCandidate>,
    #[serde(default, alias = "assistant")]
    advisory: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    message: String,
    score: f64,
    #[serde(default, alias = "japanese")]
    explanation: Option<String>,
}

/// Validates and decodes vendor text for one request.
#[derive(Debug, Clone, Copy)]
pub struct ResponseParser {
    format: ResponseFormat,
    require_candidates: bool,
}

impl ResponseParser {
    pub fn new(format: ResponseFormat, require_candidates: bool) -> Self {
        Self {
            format,
            require_candidates,
        }
    }

    /// Parser matching the format and candidate count of `request`.
    pub fn for_request(request: &GenerationRequest) -> Self {
        Self::new(request.format(), request.constraints.candidate_count > 0)
    }

    /// Decode `raw` into a [`GenerationResult`].
    pub fn parse(&self, raw: &str) -> Result<GenerationResult, DecodeError> {
        let (mut candidates, advisory) = match self.format {
            ResponseFormat::Structured => parse_structured(raw)?,
            ResponseFormat::PlainText => (parse_plain(raw), None),
        };

        if self.require_candidates && candidates.is_empty() {
            return Err(DecodeError::new("response contained no candidates", raw));
        }

        // Stable sort: equal scores keep response order.
        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        Ok(GenerationResult {
            raw_text: raw.to_string(),
            candidates,
            advisory,
        })
    }
}

fn parse_structured(raw: &str) -> Result<(Vec<Candidate>, Option<String>), DecodeError> {
    let json = extract_json(raw);
    let decoded: RawResponse =
        serde_json::from_str(json).map_err(|e| DecodeError::new(e.to_string(), raw))?;

    let candidates = decoded
        .commits
        .into_iter()
        .enumerate()
        .map(|(idx, c)| to_candidate(idx, c, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((candidates, non_blank(decoded.advisory)))
}

fn to_candidate(idx: usize, raw_candidate: RawCandidate, raw: &str) -> Result<Candidate, DecodeError> {
    let message = first_line(&raw_candidate.message)
        .ok_or_else(|| DecodeError::new(format!("candidate {idx} has an empty message"), raw))?
        .to_string();

    let score = raw_candidate.score.round();
    if !score.is_finite() || !(0.0..=f64::from(MAX_SCORE)).contains(&score) {
        return Err(DecodeError::new(
            format!(
                "candidate {idx} has score {} outside 0..={MAX_SCORE}",
                raw_candidate.score
            ),
            raw,
        ));
    }

    Ok(Candidate {
        message,
        // In range 0..=100 after the check above.
        score: score as u8,
        explanation: non_blank(raw_candidate.explanation),
    })
}

/// Legacy text mode: separator-delimited messages without scores.
///
/// Each block is reduced to its first non-empty line. Candidates are
/// deduplicated by that line, keeping the first occurrence.
fn parse_plain(raw: &str) -> Vec<Candidate> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if line.trim() == PLAIN_TEXT_SEPARATOR {
            blocks.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    blocks.push(current.join("\n"));

    let mut candidates: Vec<Candidate> = Vec::new();

    for block in &blocks {
        let Some(message) = first_line(strip_fence(block.trim())) else {
            continue;
        };
        if candidates.iter().any(|c| c.message == message) {
            debug!("Dropping duplicate candidate: {}", message);
            continue;
        }
        candidates.push(Candidate {
            message: message.to_string(),
            score: 0,
            explanation: None,
        });
    }

    candidates
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Drop a surrounding markdown fence, including any language tag on the
/// opening line.
fn strip_fence(text: &str) -> &str {
    let text = match text.strip_prefix("```") {
        Some(rest) => rest.split_once('\n').map_or("", |(_, body)| body),
        None => text,
    };
    text.trim_end().strip_suffix("```").unwrap_or(text)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
