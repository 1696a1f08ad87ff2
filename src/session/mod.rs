//! Interactive refinement loop around the vendor.
//!
//! The session owns the conversation history. Each refinement appends one
//! [`Turn`] and re-issues generation; the loop is explicit so any number of
//! cycles runs in constant stack.

pub mod directive;
pub mod prompter;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::commit::diff::StagedDiff;
use crate::commit::request::{GenerationRequest, PromptConstraints, Turn};
use crate::commit::response::{Candidate, GenerationResult};
use crate::error::CommitError;
use crate::llm::vendor::Vendor;

pub use directive::Directive;
pub use prompter::{DialoguerPrompter, Prompter};

const REGENERATE_LABEL: &str = "🔃 Regenerate";
const REFINE_LABEL: &str = "✏️  Refine...";
const DONE_LABEL: &str = "✔ Done";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingGeneration,
    PresentingCandidates,
    CollectingRefinement,
    Accepted,
    Cancelled,
}

/// One commit-drafting interaction.
pub struct RefinementSession<'a, P: Prompter> {
    vendor: &'a dyn Vendor,
    prompter: &'a mut P,
    diff: Arc<StagedDiff>,
    constraints: PromptConstraints,
    history: Vec<Turn>,
    last_result: Option<GenerationResult>,
    /// Set when `last_result` no longer reflects the current history.
    needs_regeneration: bool,
    accepted: Option<String>,
    state: SessionState,
    /// Fired to abort an in-flight vendor call.
    interrupt: CancellationToken,
}

impl<'a, P: Prompter> RefinementSession<'a, P> {
    pub fn new(
        vendor: &'a dyn Vendor,
        prompter: &'a mut P,
        diff: Arc<StagedDiff>,
        constraints: PromptConstraints,
    ) -> Self {
        Self {
            vendor,
            prompter,
            diff,
            constraints,
            history: Vec::new(),
            last_result: None,
            needs_regeneration: true,
            accepted: None,
            state: SessionState::AwaitingGeneration,
            interrupt: CancellationToken::new(),
        }
    }

    /// Abort generation when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.interrupt = token;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn last_result(&self) -> Option<&GenerationResult> {
        self.last_result.as_ref()
    }

    pub fn needs_regeneration(&self) -> bool {
        self.needs_regeneration
    }

    /// The request the next generation will send.
    pub fn request(&self) -> GenerationRequest {
        GenerationRequest::new(
            Arc::clone(&self.diff),
            self.constraints.clone(),
            self.history.clone(),
        )
    }

    /// Drive the session until a candidate is accepted.
    ///
    /// Returns the accepted message. Interruption at any point leaves the
    /// session `Cancelled` with no result and returns
    /// [`CommitError::Cancelled`].
    pub async fn run(&mut self) -> Result<String, CommitError> {
        let outcome = self.drive().await;
        if matches!(outcome, Err(CommitError::Cancelled)) {
            self.cancel();
        }
        outcome
    }

    async fn drive(&mut self) -> Result<String, CommitError> {
        loop {
            debug!("Session state: {:?}", self.state);
            match self.state {
                SessionState::AwaitingGeneration => self.generate().await?,
                SessionState::PresentingCandidates => self.present()?,
                SessionState::CollectingRefinement => self.collect_refinement()?,
                SessionState::Accepted => {
                    if let Some(message) = &self.accepted {
                        return Ok(message.clone());
                    }
                    self.state = SessionState::PresentingCandidates;
                }
                SessionState::Cancelled => return Err(CommitError::Cancelled),
            }
        }
    }

    fn cancel(&mut self) {
        debug!("Session cancelled");
        self.last_result = None;
        self.state = SessionState::Cancelled;
    }

    /// Issue one request, offering a retry with the same history on failure.
    async fn generate(&mut self) -> Result<(), CommitError> {
        loop {
            let request = self.request();
            debug!(
                "Requesting {} candidate(s) from {} with {} history turn(s)",
                request.constraints.candidate_count,
                self.vendor.kind(),
                request.history.len()
            );
            self.prompter.note("The AI is analyzing your changes...");

            let outcome = tokio::select! {
                result = self.vendor.generate(&request) => result,
                () = self.interrupt.cancelled() => return Err(CommitError::Cancelled),
            };

            match outcome {
                Ok(result) => {
                    self.last_result = Some(result);
                    self.needs_regeneration = false;
                    self.state = SessionState::PresentingCandidates;
                    return Ok(());
                }
                Err(err) => {
                    warn!("Generation failed: {}", err);
                    self.last_result = None;
                    self.needs_regeneration = true;
                    self.prompter.note(&format!("✖ {err}"));
                    if !self.prompter.confirm("Try again?", true)? {
                        return Err(err.into());
                    }
                }
            }
        }
    }

    fn present(&mut self) -> Result<(), CommitError> {
        let Some(result) = &self.last_result else {
            self.state = SessionState::AwaitingGeneration;
            return Ok(());
        };

        if let Some(advisory) = &result.advisory {
            self.prompter.note(&format!("💡 {advisory}"));
        }

        let mut items = vec![REGENERATE_LABEL.to_string()];
        items.extend(result.candidates.iter().map(candidate_label));
        items.push(REFINE_LABEL.to_string());

        let default = usize::from(!result.candidates.is_empty());
        let choice = self.prompter.select(
            "Pick a commit message to use (Ctrl+C to exit):",
            &items,
            default,
        )?;

        if choice == 0 {
            self.needs_regeneration = true;
            self.state = SessionState::AwaitingGeneration;
        } else if choice == items.len() - 1 {
            self.state = SessionState::CollectingRefinement;
        } else if let Some(candidate) = result.candidates.get(choice - 1) {
            debug!("Accepted candidate with score {}", candidate.score);
            self.accepted = Some(candidate.message.clone());
            self.state = SessionState::Accepted;
        }

        Ok(())
    }

    /// Gather directives until the user is done, then append one turn.
    fn collect_refinement(&mut self) -> Result<(), CommitError> {
        let mut items: Vec<String> = Directive::MENU
            .iter()
            .map(|d| d.label().to_string())
            .collect();
        items.push(DONE_LABEL.to_string());

        let mut directives: Vec<String> = Vec::new();
        loop {
            let prompt = if directives.is_empty() {
                "What should change?".to_string()
            } else {
                format!("Anything else? ({} request(s) so far)", directives.len())
            };
            let choice = self.prompter.select(&prompt, &items, 0)?;
            let Some(directive) = Directive::MENU.get(choice).copied() else {
                break;
            };

            let input = if directive.needs_input() {
                let text = self
                    .prompter
                    .input(directive.label().trim_end_matches("..."), "")?;
                if text.trim().is_empty() {
                    continue;
                }
                text
            } else {
                String::new()
            };
            directives.push(directive.render(&input));
        }

        let Some(previous) = &self.last_result else {
            self.state = SessionState::AwaitingGeneration;
            return Ok(());
        };

        if directives.is_empty() {
            self.state = SessionState::PresentingCandidates;
            return Ok(());
        }

        self.history
            .push(Turn::new(previous.raw_text.clone(), directives.join("\n\n")));
        debug!("History now has {} turn(s)", self.history.len());
        self.needs_regeneration = true;
        self.state = SessionState::AwaitingGeneration;
        Ok(())
    }
}

fn candidate_label(candidate: &Candidate) -> String {
    match &candidate.explanation {
        Some(explanation) => format!("{}  ({})", candidate.message, explanation),
        None => candidate.message.clone(),
    }
}

/// Offer one free-text edit of the accepted message.
///
/// An empty edit cancels the commit.
pub fn final_edit<P: Prompter>(prompter: &mut P, message: &str) -> Result<String, CommitError> {
    let edited = prompter.input("Enter a commit message:", message)?;
    let edited = edited.trim();
    if edited.is_empty() {
        return Err(CommitError::Cancelled);
    }
    Ok(edited.to_string())
}
