use crate::mode::Mode;

/// An in-band slash command typed at a turn boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Exit,
    Switch(Mode),
    /// Any other `/...` input, kept verbatim for the notice
    Unknown(String),
}

impl Command {
    /// Parse user input. Returns `None` for ordinary text (no leading `/`).
    /// Matching is case-insensitive on the first word.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let text = input.trim();
        if !text.starts_with('/') {
            return None;
        }
        let lowered = text.to_lowercase();
        let name = lowered.split_whitespace().next().unwrap_or_default();

        Some(match name {
            "/exit" | "/quit" | "/done" | "/qq" => Self::Exit,
            "/vocab" | "/vocabulaire" | "/v" => Self::Switch(Mode::VocabDrill),
            "/chat" | "/discussion" | "/c" => Self::Switch(Mode::GeneralChat),
            _ => Self::Unknown(text.to_string()),
        })
    }

    #[must_use]
    pub const fn help_text() -> &'static str {
        "/chat (/c) : discussion libre · /vocab (/v) : révision du vocabulaire · /exit (/qq) : quitter"
    }
}
