//! The conversation session machine and its dispatch loop.

use std::path::PathBuf;

use amie_core::{ChatMessage, LLMProvider, Role};
use amie_vocab::{
    DEFAULT_MASTERY_THRESHOLD, DEFAULT_MAX_WORDS, VocabStore, apply_ratings, select_for_drill,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::console::Console;
use crate::error::SessionError;
use crate::memory_log::MemoryLog;
use crate::mode::{Mode, ModeProfile};
use crate::session::ConversationSession;

const WELCOME: &str = "Salut ! C'est moi, Amie ! Alors....";
const FAREWELL: &str = "À bientôt !";
const UNKNOWN_COMMAND: &str = "Commande inconnue.";
const NOTHING_TO_PRACTISE: &str =
    "Aucun mot à réviser pour l'instant : tout ton vocabulaire est maîtrisé !";

/// Settings for both modes.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub model: String,
    pub max_words: usize,
    pub mastery_threshold: u32,
    pub chat_memory: bool,
    pub drill_memory: bool,
    pub summarize_drills: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_words: DEFAULT_MAX_WORDS,
            mastery_threshold: DEFAULT_MASTERY_THRESHOLD,
            chat_memory: true,
            drill_memory: true,
            summarize_drills: true,
        }
    }
}

/// How a mode round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Exit,
    Switch(Mode),
}

/// Runs practice rounds against the oracle, owning the vocabulary store for
/// the lifetime of the process.
pub struct SessionMachine<P, C>
where
    P: LLMProvider,
    C: Console,
{
    provider: P,
    console: C,
    config: MachineConfig,
    store: VocabStore,
    store_path: PathBuf,
    memory_log: MemoryLog,
    rng: StdRng,
}

impl<P, C> SessionMachine<P, C>
where
    P: LLMProvider,
    C: Console,
{
    pub fn new(
        provider: P,
        console: C,
        config: MachineConfig,
        store: VocabStore,
        store_path: PathBuf,
        memory_log: MemoryLog,
    ) -> Self {
        info!(
            "Creating session machine with {} entries from {}",
            store.len(),
            store_path.display()
        );
        Self {
            provider,
            console,
            config,
            store,
            store_path,
            memory_log,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Use a fixed seed for word selection.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub const fn store(&self) -> &VocabStore {
        &self.store
    }

    #[must_use]
    pub const fn console(&self) -> &C {
        &self.console
    }

    const fn profile(&self, mode: Mode) -> ModeProfile {
        match mode {
            Mode::GeneralChat => ModeProfile::general_chat(self.config.chat_memory),
            Mode::VocabDrill => {
                ModeProfile::vocab_drill(self.config.summarize_drills, self.config.drill_memory)
            }
        }
    }

    /// The outer loop: start in free chat, follow mode switches, stop on exit.
    pub async fn run(&mut self) -> Result<(), SessionError> {
        self.console.say(WELCOME);
        let mut mode = Mode::GeneralChat;

        loop {
            match self.run_mode(mode).await? {
                Transition::Exit => {
                    self.console.say(FAREWELL);
                    info!("Session machine stopped");
                    return Ok(());
                }
                Transition::Switch(next) => {
                    self.console.say(next.entry_notice());
                    mode = next;
                }
            }
        }
    }

    /// Run one round of `mode` until the learner types a known command or
    /// input ends. Oracle failures are reported to the learner and never end
    /// the round; storage failures do.
    pub async fn run_mode(&mut self, mode: Mode) -> Result<Transition, SessionError> {
        let profile = self.profile(mode);
        if let Some(greeting) = profile.greeting {
            self.console.say(greeting);
        }

        let words = if profile.selects_words {
            let words = select_for_drill(
                &self.store,
                self.config.max_words,
                self.config.mastery_threshold,
                &mut self.rng,
            );
            if words.is_empty() {
                info!("No entry at or below mastery {}", self.config.mastery_threshold);
                self.console.say(NOTHING_TO_PRACTISE);
                return Ok(Transition::Switch(Mode::GeneralChat));
            }
            words
        } else {
            Vec::new()
        };

        let memory = if profile.use_memory_log {
            self.read_memory()
        } else {
            String::new()
        };
        let mut session = ConversationSession::new(mode, words);
        session.extend(profile.seed_turns(&session.words, &memory));
        info!(
            "Entering {mode} mode, round {} with {} words",
            session.id,
            session.words.len()
        );

        self.open(&mut session).await;

        loop {
            let Some(line) = self.console.read_line()? else {
                debug!("End of input, leaving {mode} mode");
                self.finish(&profile, &mut session).await?;
                return Ok(Transition::Exit);
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            match Command::parse(input) {
                Some(Command::Unknown(command)) => {
                    debug!("Unrecognized command {command}");
                    self.console.say(UNKNOWN_COMMAND);
                    self.console.say(Command::help_text());
                }
                Some(Command::Exit) => {
                    self.finish(&profile, &mut session).await?;
                    return Ok(Transition::Exit);
                }
                Some(Command::Switch(next)) => {
                    self.finish(&profile, &mut session).await?;
                    return Ok(Transition::Switch(next));
                }
                None => {
                    if profile.flag_brackets {
                        self.capture_flags(input)?;
                    }
                    self.exchange(&mut session, input).await;
                }
            }
        }
    }

    fn read_memory(&self) -> String {
        self.memory_log.read_all().unwrap_or_else(|e| {
            warn!(
                "Cannot read memory log {}: {e}",
                self.memory_log.path().display()
            );
            String::new()
        })
    }

    async fn call(&self, messages: &[ChatMessage]) -> Result<String, SessionError> {
        debug!("Calling oracle with {} turns", messages.len());
        let response = self
            .provider
            .chat(messages, &self.config.model)
            .await
            .map_err(SessionError::OracleUnavailable)?;
        if response.content.trim().is_empty() {
            return Err(SessionError::EmptyResponse);
        }
        Ok(response.content)
    }

    /// Let the oracle speak first. On failure the round continues with only
    /// the seeded turns.
    async fn open(&mut self, session: &mut ConversationSession) {
        match self.call(session.messages()).await {
            Ok(reply) => {
                self.console.say(&reply);
                session.add_message(Role::Assistant, reply);
            }
            Err(e) => {
                warn!("Opening call failed: {e}");
                self.console.say(&format!(
                    "Je n'arrive pas à démarrer la conversation ({e}). Écris-moi quelque chose pour réessayer."
                ));
            }
        }
    }

    /// One learner turn. The transcript only grows when the oracle answers, so
    /// a failed call leaves the last good turn as the recovery point.
    async fn exchange(&mut self, session: &mut ConversationSession, input: &str) {
        let request = session.request_with(input);
        match self.call(&request).await {
            Ok(reply) => {
                self.console.say(&reply);
                session.add_message(Role::User, input.to_string());
                session.add_message(Role::Assistant, reply);
            }
            Err(e) => {
                warn!("Turn failed: {e}");
                self.console
                    .say(&format!("Désolée, je n'ai pas pu répondre ({e}). Réessaie !"));
            }
        }
    }

    fn capture_flags(&mut self, input: &str) -> Result<(), SessionError> {
        let added = self.store.flag_unknown(input);
        if added.is_empty() {
            return Ok(());
        }
        info!("Flagged {} unknown words", added.len());
        self.console
            .say(&format!("Mots inconnus détectés : {}", added.join(", ")));
        self.store.save(&self.store_path)?;
        Ok(())
    }

    /// End-of-round work: rating pass and store flush, then the summary.
    async fn finish(
        &mut self,
        profile: &ModeProfile,
        session: &mut ConversationSession,
    ) -> Result<(), SessionError> {
        if profile.rate_on_exit && !session.words.is_empty() {
            self.rate(session).await;
            self.store.save(&self.store_path)?;
            self.console.say("Vocabulaire enregistré.");
        }
        if profile.summarize_on_exit {
            self.summarize(session).await;
        }
        info!(
            "Leaving {} mode, round {} after {} turns in {}s",
            session.mode,
            session.id,
            session.message_count(),
            session.elapsed().num_seconds()
        );
        Ok(())
    }

    async fn rate(&mut self, session: &mut ConversationSession) {
        let prompt = ModeProfile::rating_request(&session.words);
        let request = session.request_with(&prompt);

        let reply = match self.call(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Rating call failed, mastery unchanged: {e}");
                self.console
                    .say("Je n'ai pas pu évaluer ta maîtrise cette fois-ci.");
                return;
            }
        };

        self.console.say("Voici mon évaluation de ta maîtrise :");
        self.console.say(&reply);

        let outcome = apply_ratings(&mut self.store, &session.words, &reply);
        info!("Updated mastery for {} words", outcome.updated.len());
        if !outcome.malformed.is_empty() {
            warn!(
                "No score found for {}; keeping previous mastery",
                outcome.malformed.join(", ")
            );
        }
        if !outcome.unmentioned.is_empty() {
            debug!("Not rated: {}", outcome.unmentioned.join(", "));
        }

        session.add_message(Role::User, prompt);
        session.add_message(Role::Assistant, reply);
    }

    async fn summarize(&self, session: &ConversationSession) {
        let request = session.request_with(ModeProfile::summary_request());
        match self.call(&request).await {
            Ok(summary) => {
                if let Err(e) = self.memory_log.append(&summary) {
                    warn!(
                        "Cannot append to memory log {}: {e}",
                        self.memory_log.path().display()
                    );
                }
            }
            Err(e) => warn!("Summary call failed, nothing logged: {e}"),
        }
    }
}
