//! Interactive conversation: free chat and vocabulary drill rounds sharing
//! one vocabulary store.

use amie_config::Config;
use amie_conversation::{MachineConfig, MemoryLog, SessionMachine, StdConsole};
use amie_vocab::VocabStore;
use tracing::info;

use super::{build_provider, resolve_model};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional model override
    pub model: Option<String>,
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let provider = build_provider(&config)?;

        let store_path = config.vocab_csv();
        let store = VocabStore::load(&store_path)?;
        info!(
            "Loaded {} vocabulary entries from {}",
            store.len(),
            store_path.display()
        );

        let machine_config = MachineConfig {
            model: resolve_model(input.model, &config, &provider),
            max_words: config.drill.max_words,
            mastery_threshold: config.drill.mastery_threshold,
            chat_memory: config.chat.use_memory_log,
            drill_memory: config.drill.use_memory_log,
            summarize_drills: config.drill.summarize_on_exit,
        };

        let mut machine = SessionMachine::new(
            provider,
            StdConsole,
            machine_config,
            store,
            store_path,
            MemoryLog::new(config.memory_log()),
        );
        machine.run().await?;
        Ok(())
    }
}
