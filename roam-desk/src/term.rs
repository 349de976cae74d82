use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Line-oriented prompt over stdin. One reader for the whole process so
/// buffered input is never split between callers.
pub struct Prompter {
    reader: Mutex<BufReader<Stdin>>,
}

impl Prompter {
    pub fn new() -> Self {
        Self {
            reader: Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }

    /// Print `prompt` without a newline and read one trimmed line.
    pub async fn ask(&self, prompt: &str) -> std::io::Result<String> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        let mut line = String::new();
        self.reader.lock().await.read_line(&mut line).await?;
        Ok(line.trim().to_string())
    }

    pub async fn confirm(&self, prompt: &str) -> std::io::Result<bool> {
        let answer = self.ask(&format!("{prompt} [y/N] ")).await?;
        Ok(matches!(answer.as_str(), "y" | "Y" | "yes"))
    }
}
