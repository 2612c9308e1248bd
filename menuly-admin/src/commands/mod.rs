/// Admin CLI commands
///
/// - `create-user`: interactive single-user creation
/// - `create-test-users`: one owner plus two staff for demos
/// - `verify-env`: configuration and backend connectivity report
/// - `update-token`: write a secret into an env file
///
/// Commands take their backend and terminal as arguments so they can be
/// driven by tests with `MockBaas` and in-memory buffers.

pub mod create_user;
pub mod test_users;
pub mod update_token;
pub mod verify_env;

use std::io::{BufRead, Write};

/// Line-oriented terminal prompts
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asks for a value; a blank answer yields `default` (or an empty string)
    ///
    /// # Errors
    ///
    /// Fails if the terminal cannot be written or input is closed.
    pub fn ask(&mut self, label: &str, default: Option<&str>) -> anyhow::Result<String> {
        match default {
            Some(default) if !default.is_empty() => write!(self.output, "{} [{}]: ", label, default)?,
            _ => write!(self.output, "{}: ", label)?,
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            anyhow::bail!("Input closed while waiting for {}", label);
        }

        let answer = line.trim();
        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer.to_string())
    }

    /// Asks until a non-empty answer is given
    pub fn ask_required(&mut self, label: &str) -> anyhow::Result<String> {
        loop {
            let answer = self.ask(label, None)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            writeln!(self.output, "{} is required", label)?;
        }
    }

    /// Writes a line to the terminal
    pub fn say(&mut self, message: impl std::fmt::Display) -> anyhow::Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Shows the start and end of a secret
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{} ({} chars)", head, tail, chars.len())
}
