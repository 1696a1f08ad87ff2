//! Refinement directives offered after a generation.

/// A short instruction sent back to the model as the next user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    TypeFix,
    TypeFeat,
    TypeChore,
    RemoveScope,
    Shorter,
    AddContext,
    FreeText,
}

impl Directive {
    /// Menu order.
    pub const MENU: [Directive; 7] = [
        Directive::TypeFix,
        Directive::TypeFeat,
        Directive::TypeChore,
        Directive::RemoveScope,
        Directive::Shorter,
        Directive::AddContext,
        Directive::FreeText,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Directive::TypeFix => "Change type to fix",
            Directive::TypeFeat => "Change type to feat",
            Directive::TypeChore => "Change type to chore",
            Directive::RemoveScope => "Remove scope",
            Directive::Shorter => "Make it shorter",
            Directive::AddContext => "Add extra context...",
            Directive::FreeText => "Write your own request...",
        }
    }

    /// Whether the directive needs text from the user.
    pub fn needs_input(&self) -> bool {
        matches!(self, Directive::AddContext | Directive::FreeText)
    }

    /// Text for the next user turn. `input` is ignored by fixed directives.
    pub fn render(&self, input: &str) -> String {
        match self {
            Directive::TypeFix => "Change the type to fix.".to_string(),
            Directive::TypeFeat => "Change the type to feat.".to_string(),
            Directive::TypeChore => "Change the type to chore.".to_string(),
            Directive::RemoveScope => "Remove the scope.".to_string(),
            Directive::Shorter => "Make the message shorter.".to_string(),
            Directive::AddContext => format!("Add extra context: {}", input.trim()),
            Directive::FreeText => input.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fixed_directives() {
        assert_eq!(Directive::RemoveScope.render("ignored"), "Remove the scope.");
        assert_eq!(Directive::TypeFix.render(""), "Change the type to fix.");
    }

    #[test]
    fn test_render_input_directives() {
        assert_eq!(
            Directive::AddContext.render(" mention performance "),
            "Add extra context: mention performance"
        );
        assert_eq!(Directive::FreeText.render("use the scope api"), "use the scope api");
    }

    #[test]
    fn test_only_text_directives_need_input() {
        let needing: Vec<Directive> = Directive::MENU
            .into_iter()
            .filter(Directive::needs_input)
            .collect();
        assert_eq!(needing, vec![Directive::AddContext, Directive::FreeText]);
    }
}
