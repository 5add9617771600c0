//! Line-oriented terminal I/O.

use async_trait::async_trait;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;

/// Where the shell reads answers and writes text.
#[async_trait]
pub trait Console: Send {
    /// Show `prompt` and wait for one line. `None` once input is closed.
    async fn read_line(&mut self, prompt: &str) -> Option<String>;

    fn print(&mut self, text: &str);
}

/// Stdin/stdout console.
///
/// Stdin is read on a dedicated thread so a pending read never blocks the
/// runtime or its shutdown.
pub struct StdConsole {
    lines: mpsc::UnboundedReceiver<String>,
}

impl StdConsole {
    pub fn new() -> Self {
        let (tx, lines) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read stdin");
                        break;
                    }
                }
            }
        });
        Self { lines }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn read_line(&mut self, prompt: &str) -> Option<String> {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "{}", prompt);
        let _ = stdout.flush();
        self.lines.recv().await
    }

    fn print(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// `y`/`yes` in any case.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
