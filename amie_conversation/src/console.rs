//! The line-oriented interactive surface.

use std::io::{BufRead, Write};

/// Where the machine shows replies and reads the learner's lines.
pub trait Console {
    /// Show a message from Amie.
    fn say(&mut self, text: &str);

    /// Read one line of input, without its line ending. `None` at end of input.
    fn read_line(&mut self) -> std::io::Result<Option<String>>;
}

/// Stdin/stdout console.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn say(&mut self, text: &str) {
        println!("\nAmie : {text}");
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        print!("\nToi : ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim_end_matches(['\n', '\r']).to_string()))
    }
}
