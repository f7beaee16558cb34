//! Interactive operator prompts: questions on stderr, answers from stdin.
//!
//! Flows take a `&mut dyn Prompter` so tests can script an entire session
//! without a terminal.

use crate::cli_output;
use std::io::BufRead as _;

/// An interactive question/answer surface.
pub trait Prompter {
    /// Ask for a non-empty line of input.
    fn input(&mut self, message: &str) -> eyre::Result<String>;

    /// Ask for a line of input, falling back to `default` on an empty answer.
    fn input_or_default(&mut self, message: &str, default: &str) -> eyre::Result<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str, default: bool) -> eyre::Result<bool>;

    /// Ask to pick one of `choices`; returns the chosen index.
    fn select(&mut self, message: &str, choices: &[String]) -> eyre::Result<usize>;

    /// Re-ask `message` until `validate` accepts the answer.
    ///
    /// Rejected answers are reported as warnings and never leave this loop, so
    /// callers only ever see a validated value.
    fn input_validated(
        &mut self,
        message: &str,
        validate: &dyn Fn(&str) -> Result<(), String>,
    ) -> eyre::Result<String> {
        loop {
            let answer = self.input(message)?;
            match validate(&answer) {
                Ok(()) => return Ok(answer),
                Err(reason) => cli_output::warn(&reason),
            }
        }
    }
}

/// The production prompter: stderr questions, stdin answers.
pub struct StderrPrompter;

impl StderrPrompter {
    fn read_line() -> eyre::Result<String> {
        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| eyre::eyre!("read answer: {e}"))?;
        if read == 0 {
            eyre::bail!("stdin closed while waiting for an answer");
        }
        Ok(line.trim().to_owned())
    }
}

impl Prompter for StderrPrompter {
    fn input(&mut self, message: &str) -> eyre::Result<String> {
        loop {
            cli_output::stderr_write(&format!("{message}: "));
            let line = Self::read_line()?;
            if !line.is_empty() {
                return Ok(line);
            }
        }
    }

    fn input_or_default(&mut self, message: &str, default: &str) -> eyre::Result<String> {
        cli_output::stderr_write(&format!("{message} [{default}]: "));
        let line = Self::read_line()?;
        if line.is_empty() {
            Ok(default.to_owned())
        } else {
            Ok(line)
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> eyre::Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            cli_output::stderr_write(&format!("{message} {hint} "));
            let answer = Self::read_line()?.to_ascii_lowercase();
            match answer.as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => cli_output::warn("answer y or n"),
            }
        }
    }

    fn select(&mut self, message: &str, choices: &[String]) -> eyre::Result<usize> {
        if choices.is_empty() {
            eyre::bail!("nothing to select from for: {message}");
        }
        cli_output::stderr_writeln(&format!("{message}:"));
        for (i, choice) in choices.iter().enumerate() {
            cli_output::stderr_writeln(&format!("  {}) {choice}", i + 1));
        }
        loop {
            cli_output::stderr_write(&format!("Choice [1-{}]: ", choices.len()));
            let answer = Self::read_line()?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                Ok(_) | Err(_) => cli_output::warn("pick one of the listed numbers"),
            }
        }
    }
}

/// Test prompter: pops pre-scripted answers instead of reading stdin.
///
/// `select` answers are matched by label so scripts stay readable.
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I>(answers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    fn pop(&mut self, message: &str) -> eyre::Result<String> {
        self.answers
            .pop_front()
            .ok_or_else(|| eyre::eyre!("scripted answers exhausted at: {message}"))
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn input(&mut self, message: &str) -> eyre::Result<String> {
        let answer = self.pop(message)?;
        if answer.is_empty() {
            eyre::bail!("scripted empty answer for required input: {message}");
        }
        Ok(answer)
    }

    fn input_or_default(&mut self, message: &str, default: &str) -> eyre::Result<String> {
        let answer = self.pop(message)?;
        if answer.is_empty() {
            Ok(default.to_owned())
        } else {
            Ok(answer)
        }
    }

    fn confirm(&mut self, message: &str, _default: bool) -> eyre::Result<bool> {
        let answer = self.pop(message)?.to_ascii_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    fn select(&mut self, message: &str, choices: &[String]) -> eyre::Result<usize> {
        let answer = self.pop(message)?;
        choices
            .iter()
            .position(|c| c == &answer)
            .ok_or_else(|| eyre::eyre!("scripted answer {answer} not among choices for: {message}"))
    }
}
