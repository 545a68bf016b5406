//! Mode transitions, drill side effects and failure handling, driven by a
//! scripted console and a scripted oracle.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use amie_conversation::{
    Console, MachineConfig, MemoryLog, Mode, SessionMachine, Transition,
};
use amie_core::Role;
use amie_core::testing::ScriptedProvider;
use amie_vocab::{VocabEntry, VocabStore};
use tempfile::TempDir;

#[derive(Debug, Default)]
struct ScriptedConsole {
    inputs: VecDeque<String>,
    said: Vec<String>,
}

impl ScriptedConsole {
    fn said(&self, text: &str) -> bool {
        self.said.iter().any(|s| s.contains(text))
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, text: &str) {
        self.said.push(text.to_string());
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        Ok(self.inputs.pop_front())
    }
}

struct Fixture {
    dir: TempDir,
    provider: Arc<ScriptedProvider>,
}

impl Fixture {
    fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("temp dir");
        };
        Self {
            dir,
            provider: Arc::new(ScriptedProvider::new(replies)),
        }
    }

    fn store_path(&self) -> PathBuf {
        self.dir.path().join("vocab.csv")
    }

    fn memory_log(&self) -> MemoryLog {
        MemoryLog::new(self.dir.path().join("memory.md"))
    }

    fn machine(
        &self,
        store: VocabStore,
        inputs: &[&str],
    ) -> SessionMachine<Arc<ScriptedProvider>, ScriptedConsole> {
        let console = ScriptedConsole {
            inputs: inputs.iter().map(ToString::to_string).collect(),
            said: Vec::new(),
        };
        SessionMachine::new(
            self.provider.clone(),
            console,
            MachineConfig::default(),
            store,
            self.store_path(),
            self.memory_log(),
        )
        .with_seed(3)
    }

    fn saved_store(&self) -> VocabStore {
        let Ok(store) = VocabStore::load(&self.store_path()) else {
            panic!("saved store should load");
        };
        store
    }
}

fn store_of(words: &[(&str, u32)]) -> VocabStore {
    let mut store = VocabStore::new();
    for &(word, mastery) in words {
        store.insert(VocabEntry {
            mastery,
            ..VocabEntry::new(word)
        });
    }
    store
}

fn mastery(store: &VocabStore, word: &str) -> Option<u32> {
    store.get(word).map(|e| e.mastery)
}

#[tokio::test]
async fn quit_from_chat_stops_the_loop() {
    let fx = Fixture::new(["Salut ! Tu as vu le match hier ?"]);
    let mut machine = fx.machine(VocabStore::new(), &["/qq"]);

    assert!(machine.run().await.is_ok());
    assert_eq!(fx.provider.calls(), 1);
    assert!(machine.console().said("Tu as vu le match"));
    assert!(machine.console().said("À bientôt !"));
}

#[tokio::test]
async fn end_of_input_is_an_exit() {
    let fx = Fixture::new(["Salut !"]);
    let mut machine = fx.machine(VocabStore::new(), &[]);

    assert!(machine.run().await.is_ok());
    assert!(machine.console().said("À bientôt !"));
}

#[tokio::test]
async fn switch_to_drill_then_rate_on_exit() {
    let fx = Fixture::new([
        "Salut !",
        "Que veut dire « pomme » ?",
        "pomme: 8\nchaise - 3 (faible)\n",
        "On a révisé pomme et chaise.",
    ]);
    let store = store_of(&[("pomme", 2), ("chaise", 5), ("table", 9)]);
    let mut machine = fx.machine(store, &["/v", "/qq"]);

    assert!(machine.run().await.is_ok());
    assert_eq!(fx.provider.calls(), 4);
    assert!(machine.console().said("Passage en mode vocabulaire."));

    let drill_opening = &fx.provider.requests()[1];
    assert_eq!(drill_opening[0].content, "You are a helpful French tutor.");
    assert!(drill_opening[1].content.contains("pomme"));
    assert!(drill_opening[1].content.contains("chaise"));
    assert!(!drill_opening[1].content.contains("table"));

    let rating_request = &fx.provider.requests()[2];
    let last = &rating_request[rating_request.len() - 1];
    assert_eq!(last.role, Role::User);
    assert!(last.content.contains("rate my mastery"));

    let saved = fx.saved_store();
    assert_eq!(mastery(&saved, "pomme"), Some(8));
    assert_eq!(mastery(&saved, "chaise"), Some(3));
    assert_eq!(mastery(&saved, "table"), Some(9));

    let log = fx.memory_log().read_all().unwrap_or_default();
    assert!(log.contains("On a révisé pomme et chaise.\n\n"));
}

#[tokio::test]
async fn unknown_command_keeps_the_current_round() {
    let fx = Fixture::new(["Salut !", "Très bien, et toi ?"]);
    let mut machine = fx.machine(VocabStore::new(), &["/bogus", "ça va ?", "/qq"]);

    assert!(machine.run().await.is_ok());
    assert!(machine.console().said("Commande inconnue."));
    assert!(!machine.console().said("Retour en mode chat."));

    let requests = fx.provider.requests();
    assert_eq!(requests.len(), 2);
    let turn = &requests[1];
    assert_eq!(turn.len(), 4);
    assert_eq!(turn[2].content, "Salut !");
    assert_eq!(turn[3].content, "ça va ?");
}

#[tokio::test]
async fn bracket_flags_are_stored_once_with_defaults() {
    let fx = Fixture::new([
        "Parlons de « pomme ».",
        "D'accord !",
        "Et la « pomme » ?",
        "pomme: 6",
        "Résumé.",
    ]);
    let mut machine = fx.machine(store_of(&[("pomme", 0)]), &[
        "je ne connais pas [grenouille] et [ricaner], ni [grenouille]",
        "[pomme] encore",
        "/c",
    ]);

    let transition = machine.run_mode(Mode::VocabDrill).await;
    assert_eq!(transition.ok(), Some(Transition::Switch(Mode::GeneralChat)));
    assert!(machine.console().said("Mots inconnus détectés : grenouille, ricaner"));

    let saved = fx.saved_store();
    assert_eq!(saved.len(), 3);
    assert_eq!(saved.get("grenouille"), Some(&VocabEntry::new("grenouille")));
    assert_eq!(saved.get("ricaner"), Some(&VocabEntry::new("ricaner")));
    assert_eq!(mastery(&saved, "pomme"), Some(6));
}

#[tokio::test]
async fn flagged_words_are_saved_before_the_round_ends() {
    let fx = Fixture::new(["Parlons de « pomme »."]);
    fx.provider.push_failure("réseau coupé");
    let mut machine = fx.machine(store_of(&[("pomme", 0)]), &["c'est [ricaner] ?"]);

    // No reply and no rating are available: the flag must already be on disk.
    let Ok(transition) = machine.run_mode(Mode::VocabDrill).await else {
        panic!("oracle failures must not end the round with an error");
    };
    assert_eq!(transition, Transition::Exit);
    assert!(fx.saved_store().contains("ricaner"));
    assert_eq!(mastery(&fx.saved_store(), "pomme"), Some(0));
}

#[tokio::test]
async fn drill_with_nothing_to_practise_returns_to_chat() {
    let fx = Fixture::new(Vec::<String>::new());
    let mut machine = fx.machine(store_of(&[("pomme", 8), ("chaise", 10)]), &["/qq"]);

    let transition = machine.run_mode(Mode::VocabDrill).await;
    assert_eq!(transition.ok(), Some(Transition::Switch(Mode::GeneralChat)));
    assert_eq!(fx.provider.calls(), 0);
    assert!(machine.console().said("Aucun mot à réviser"));
}

#[tokio::test]
async fn failed_turn_keeps_last_good_turn() {
    let fx = Fixture::new(["Salut !"]);
    fx.provider.push_failure("timeout");
    fx.provider.push_reply("Re-salut !");
    let mut machine = fx.machine(VocabStore::new(), &["premier", "second", "/qq"]);

    assert!(machine.run().await.is_ok());
    assert!(machine.console().said("Désolée, je n'ai pas pu répondre"));

    let requests = fx.provider.requests();
    assert_eq!(requests.len(), 3);
    let retry = &requests[2];
    assert_eq!(retry.len(), 4);
    assert_eq!(retry[2].content, "Salut !");
    assert_eq!(retry[3].content, "second");
}

#[tokio::test]
async fn failed_rating_keeps_mastery_and_still_saves() {
    let fx = Fixture::new(["Que veut dire « pomme » ?"]);
    fx.provider.push_failure("service indisponible");
    fx.provider.push_reply("Résumé de la séance.");
    let mut machine = fx.machine(store_of(&[("pomme", 2)]), &["/exit"]);

    let transition = machine.run_mode(Mode::VocabDrill).await;
    assert_eq!(transition.ok(), Some(Transition::Exit));
    assert!(machine.console().said("Je n'ai pas pu évaluer"));
    assert_eq!(mastery(&fx.saved_store(), "pomme"), Some(2));
    assert!(
        fx.memory_log()
            .read_all()
            .unwrap_or_default()
            .contains("Résumé de la séance.")
    );
}

#[tokio::test]
async fn memory_log_seeds_the_chat_persona() {
    let fx = Fixture::new(["Salut ! On reparle des fruits ?"]);
    assert!(fx.memory_log().append("L'élève confond pomme et poire.").is_ok());
    let mut machine = fx.machine(VocabStore::new(), &["/qq"]);

    assert!(machine.run().await.is_ok());
    let opening = &fx.provider.requests()[0];
    assert_eq!(opening[0].role, Role::System);
    assert!(opening[0].content.contains("L'élève confond pomme et poire."));
}

#[tokio::test]
async fn chat_never_flags_brackets() {
    let fx = Fixture::new(["Salut !", "Oui, [grenouille] veut dire frog."]);
    let mut machine = fx.machine(VocabStore::new(), &["c'est quoi [grenouille] ?", "/qq"]);

    assert!(machine.run().await.is_ok());
    assert!(machine.store().is_empty());
    assert!(!fx.store_path().exists());
}
