use amie_config::Config;
use amie_vocab::VocabStore;

/// Strategy for displaying configuration and vocabulary statistics.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== amie Configuration ===\n");

        println!("API Key:");
        let masked = config
            .providers
            .openai
            .resolved_api_key()
            .map_or_else(|| "(not set)".to_string(), |key| mask_key(&key));
        println!("  OpenAI: {masked}");
        if let Some(ref base_url) = config.providers.openai.base_url {
            println!("  Base URL: {base_url}");
        }
        println!();

        println!("Model: {}", config.agents.defaults.model);
        println!();

        println!("Paths:");
        println!("  Vocabulary: {}", config.vocab_csv().display());
        println!("  Notes: {}", config.raw_dir().display());
        println!("  Extraction Cache: {}", config.cache_dir().display());
        println!("  Memory Log: {}", config.memory_log().display());
        println!();

        println!("Drill:");
        println!("  Max Words: {}", config.drill.max_words);
        println!("  Mastery Threshold: {}", config.drill.mastery_threshold);
        println!("  Summarize On Exit: {}", config.drill.summarize_on_exit);
        println!("  Use Memory Log: {}", config.drill.use_memory_log);
        println!();

        println!("Ingestion:");
        println!("  Extensions: {}", config.ingestion.extensions.join(", "));
        println!("  Bypass Cache: {}", config.ingestion.bypass_cache);
        println!();

        println!("Vocabulary:");
        match VocabStore::load(&config.vocab_csv()) {
            Ok(store) => {
                let stats = store.stats(config.drill.mastery_threshold);
                println!("  Entries: {}", stats.total);
                println!("  To Practise: {}", stats.practisable);
                println!("  Mastered: {}", stats.mastered);
            }
            Err(e) => {
                println!("  Status: Unreadable");
                println!("  Error: {e}");
            }
        }

        Ok(())
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}
