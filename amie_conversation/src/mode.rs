//! Per-mode configuration of the session machine.

use std::fmt;

use amie_core::ChatMessage;

const CHAT_PERSONA: &str = "Tu es une amie française très sympathique. \
Discute de manière détendue et amicale. Parle uniquement en français. \
Pose des questions légères et amusantes si possible.";

const CHAT_OPENER: &str = "Commence la conversation en parlant de choses amusantes.";

const TUTOR_PERSONA: &str = "You are a helpful French tutor.";

const MEMORY_HEADER: &str = "Notes from our previous sessions:";

const RATING_PROMPT: &str = "Based on our conversation, rate my mastery for these words on a scale \
from 1 (poor) to 10 (excellent). Give your rating for each word, one word per line:";

const SUMMARY_PROMPT: &str = "Summarise this session in a few short lines for your own notes: \
which words I practised, what I struggled with, and anything worth revisiting next time. \
Plain text only.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    GeneralChat,
    VocabDrill,
}

impl Mode {
    /// Notice shown when the dispatcher switches into this mode.
    #[must_use]
    pub const fn entry_notice(self) -> &'static str {
        match self {
            Self::GeneralChat => "Retour en mode chat.",
            Self::VocabDrill => "Passage en mode vocabulaire.",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GeneralChat => f.write_str("chat"),
            Self::VocabDrill => f.write_str("vocab"),
        }
    }
}

/// What a mode does on entry, on each turn and on exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeProfile {
    pub mode: Mode,
    /// Said once when the mode starts, before the oracle opens
    pub greeting: Option<&'static str>,
    /// Round is built around words picked by the selector
    pub selects_words: bool,
    /// Capture `[word]` flags into the store and save right away
    pub flag_brackets: bool,
    /// Ask the oracle to rate the round's words when the mode ends
    pub rate_on_exit: bool,
    /// Ask for a short summary and append it to the memory log when the mode ends
    pub summarize_on_exit: bool,
    /// Inject the memory log into the system prompt
    pub use_memory_log: bool,
}

impl ModeProfile {
    #[must_use]
    pub const fn general_chat(use_memory_log: bool) -> Self {
        Self {
            mode: Mode::GeneralChat,
            greeting: None,
            selects_words: false,
            flag_brackets: false,
            rate_on_exit: false,
            summarize_on_exit: false,
            use_memory_log,
        }
    }

    #[must_use]
    pub const fn vocab_drill(summarize_on_exit: bool, use_memory_log: bool) -> Self {
        Self {
            mode: Mode::VocabDrill,
            greeting: Some("Bienvenue en mode vocabulaire !"),
            selects_words: true,
            flag_brackets: true,
            rate_on_exit: true,
            summarize_on_exit,
            use_memory_log,
        }
    }

    /// The system and opening turns that start a round.
    #[must_use]
    pub fn seed_turns(&self, words: &[String], memory: &str) -> Vec<ChatMessage> {
        let persona = match self.mode {
            Mode::GeneralChat => CHAT_PERSONA,
            Mode::VocabDrill => TUTOR_PERSONA,
        };
        let memory = memory.trim();
        let system = if self.use_memory_log && !memory.is_empty() {
            format!("{persona}\n\n{MEMORY_HEADER}\n{memory}")
        } else {
            persona.to_string()
        };

        let opener = match self.mode {
            Mode::GeneralChat => CHAT_OPENER.to_string(),
            Mode::VocabDrill => drill_instructions(words),
        };
        vec![ChatMessage::system(system), ChatMessage::user(opener)]
    }

    #[must_use]
    pub fn rating_request(words: &[String]) -> String {
        format!("{RATING_PROMPT}\n{}", words.join(", "))
    }

    #[must_use]
    pub const fn summary_request() -> &'static str {
        SUMMARY_PROMPT
    }
}

fn drill_instructions(words: &[String]) -> String {
    let vocab = words.join(", ");
    format!(
        "You are my French tutor. Your name is Amie.

You have a list of words for me to practice: {vocab}

Your task is to test me on these words, one by one. You should speak to me entirely in French.

For each word:
1. Ask me to explain or translate it, or to use it in a French sentence.
2. Check my answer and explain if necessary.
3. Provide correct examples and additional explanations if I struggle.

If I answer correctly, move on to the next word.

IMPORTANT:
- I might write words inside [square brackets] to flag words I don't know. This is just for me: you should NEVER use square brackets yourself.
- If I type `?word`, explain the meaning or usage of that word.
- If I type `??word`, explain grammar, conjugation, or nuances of that word.

Focus purely on helping me practice these words effectively. Keep your questions short and clear."
    )
}
