use std::io::IsTerminal;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Operator confirmation before long-running steps
#[allow(async_fn_in_trait)]
pub trait Confirm {
    /// Ask `prompt`; `true` means go ahead.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Interpret a typed answer. An empty answer accepts.
pub fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" | "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prompts on stdout and reads the answer from stdin
#[derive(Debug, Clone, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        // Piped or redirected input: nobody to ask
        if !std::io::stdin().is_terminal() {
            tracing::info!("stdin is not a terminal, continuing without confirmation");
            return true;
        }

        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let question = format!("{} [Y/n] ", prompt);
            if stdout.write_all(question.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
                return true;
            }

            match lines.next_line().await {
                Ok(Some(answer)) => match parse_answer(&answer) {
                    Some(choice) => return choice,
                    None => continue,
                },
                // EOF or read failure: treat as acceptance, like a bare Enter
                Ok(None) | Err(_) => return true,
            }
        }
    }
}

/// Always accepts (`--yes`)
#[derive(Debug, Clone, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!("Auto-confirmed: {}", prompt);
        true
    }
}
