//! Prompt construction for AI-generated commit messages.
//!
//! The output is a pure function of the diff and constraints. Conversation
//! history is not part of the prompt; vendors append it as extra turns.

use crate::commit::diff::StagedDiff;
use crate::commit::request::{ProjectSignal, PromptConstraints, ResponseFormat};

/// Line that separates candidates in the plain-text format.
pub const PLAIN_TEXT_SEPARATOR: &str = "---";

/// System and user prompt text for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPrompt {
    pub system: String,
    pub user: String,
}

/// Build the system and user prompts for a commit message request.
pub fn build_prompt(diff: &StagedDiff, constraints: &PromptConstraints) -> CommitPrompt {
    let mut sections = vec![message_rules(constraints.max_length)];

    for signal in &constraints.project_signals {
        sections.push(signal_block(*signal));
    }

    sections.push(match constraints.format {
        ResponseFormat::Structured => structured_output_rules(constraints),
        ResponseFormat::PlainText => plain_output_rules(constraints.candidate_count),
    });

    if let Some(instruction) = &constraints.additional_instruction {
        sections.push(additional_instruction_block(instruction));
    }

    CommitPrompt {
        system: sections.join("\n\n"),
        user: user_prompt(diff, constraints),
    }
}

fn message_rules(max_length: usize) -> String {
    [
        "Generate a concise git commit message written in present tense for the following code diff with the given specifications below, aiming for the best result you can think of:".to_string(),
        "* It must always be written in English.".to_string(),
        format!("* Commit message must be a maximum of {max_length} characters."),
        "* It must be a single line in the imperative mood, with no period at the end.".to_string(),
        "* Please do not use words like 'Refactor' or 'Update'.".to_string(),
        "* Exclude anything unnecessary such as translation. The message will be passed directly into git commit.".to_string(),
        "* Please do not output code blocks such as '```'.".to_string(),
        "* Please follow the Conventional Commits format for commit messages.".to_string(),
        "  * When bumping a module, please set scope: `build(deps)`.".to_string(),
        "  * It's unnecessary to include 'in ...' in the commit message. Instead, please include it in the scope of Conventional Commits.".to_string(),
        "    * For example, `feat: add ... in Dockerfile` should be `feat(Dockerfile): add ...`.".to_string(),
        "    * For example, `fix(utils): fix typo in foobar.ts` should be `fix(utils/foobar): fix typo`.".to_string(),
        "  * Derive the scope from the directory of the changed files.".to_string(),
        "  * Please do not include file extensions in the scope.".to_string(),
        "    * For example, use `feat(index): add ...` instead of `feat(index.ts): add ...`.".to_string(),
        "Please generate the best commit message that has the above features and that you wouldn't be embarrassed to show to anyone.".to_string(),
    ]
    .join("\n")
}

fn signal_block(signal: ProjectSignal) -> String {
    let (intro, scopes): (&str, &[&str]) = match signal {
        ProjectSignal::Nuxt => (
            "This is a Nuxt.js project. Prefer these scopes when the change lives in the matching directory:",
            &[
                "components", "pages", "layouts", "composables", "plugins", "middleware",
                "server", "stores", "assets", "i18n", "nuxt.config",
            ],
        ),
        ProjectSignal::Next => (
            "This is a Next.js project. Prefer these scopes when the change lives in the matching directory:",
            &[
                "app", "pages", "components", "api", "middleware", "lib", "hooks", "styles",
                "next.config",
            ],
        ),
    };

    let list: String = scopes
        .iter()
        .map(|s| format!("  * `{s}`"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{intro}\n{list}")
}

fn structured_output_rules(constraints: &PromptConstraints) -> String {
    let count = constraints.candidate_count;
    let (example, explanation_rule) = match &constraints.secondary_language {
        Some(language) => (
            r#"{"commits": [{"message": "type(scope): description", "score": 90, "explanation": "..."}], "advisory": "..."}"#,
            format!(
                "* Each candidate must include `explanation`: one short sentence in {language} describing the message."
            ),
        ),
        None => (
            r#"{"commits": [{"message": "type(scope): description", "score": 90}], "advisory": "..."}"#,
            "* Omit `explanation`.".to_string(),
        ),
    };

    [
        "## Output Format".to_string(),
        "Respond with ONLY a JSON object (no markdown, no explanation outside the JSON):".to_string(),
        example.to_string(),
        format!("* `commits` must contain exactly {count} candidate(s), best first."),
        "* `score` is an integer from 0 to 100 rating how well the message describes the change.".to_string(),
        explanation_rule,
        "* `advisory` is optional: a short note for the developer (for example, that the change mixes unrelated concerns). It never becomes part of the commit.".to_string(),
    ]
    .join("\n")
}

fn plain_output_rules(count: usize) -> String {
    [
        "## Output Format".to_string(),
        format!("Respond with {count} commit message(s) and nothing else."),
        format!("Separate messages with a line containing only `{PLAIN_TEXT_SEPARATOR}`."),
    ]
    .join("\n")
}

fn additional_instruction_block(instruction: &str) -> String {
    format!(
        "## Additional Instruction (HIGHEST PRIORITY)\n\
         The following instruction comes from the repository owner and takes precedence over every rule above. \
         If it conflicts with any other rule, follow this instruction.\n\n{instruction}"
    )
}

fn user_prompt(diff: &StagedDiff, constraints: &PromptConstraints) -> String {
    let mut parts = Vec::new();

    if let Some(commit_type) = &constraints.commit_type {
        parts.push(format!("Preferred commit type: `{commit_type}`"));
    }

    if let Some(hint) = &constraints.hint {
        parts.push(format!("Hint from the author: {hint}"));
    }

    let files: String = diff
        .files()
        .iter()
        .map(|f| format!("- {f}"))
        .collect::<Vec<_>>()
        .join("\n");
    parts.push(format!("## Changed Files\n{files}"));
    parts.push(format!("## Diff\n{}", diff.text()));

    parts.join("\n\n")
}
