// ============================================================
// Layer 5 — Console Prompter
// ============================================================
// Reads answers from an input stream and writes prompts to an
// output stream for the interactive menu.
//
// Both streams are passed in by the caller (stdin/stdout in
// the binary, in-memory buffers in tests), so there is no
// shared global reader.
//
// Prompt format:
//
//   >>>file name>
//
// Blank answers are asked again. An answer that fails to parse
// prints the reason and asks again. End of input is an error.
//
// Reference: Rust Book §2 (Processing a Guess)

use anyhow::{bail, Context, Result};
use std::{
    fmt::Display,
    io::{BufRead, Write},
    str::FromStr,
};

const PROMPT_PREFIX: &str = ">>>";

pub struct Prompter<R, W> {
    input:  R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Direct access to the output stream for messages
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Write a line of text
    pub fn say(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Write the prompt and read one trimmed answer.
    /// Returns `None` at end of input.
    pub fn read_answer(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{PROMPT_PREFIX}{prompt}> ")?;
        self.output.flush()?;

        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .context("Cannot read from input")?;
        Ok((n > 0).then(|| line.trim().to_string()))
    }

    /// Ask until a non-blank answer arrives.
    pub fn ask_string(&mut self, prompt: &str) -> Result<String> {
        loop {
            match self.read_answer(prompt)? {
                None => bail!("Input closed while waiting for '{prompt}'"),
                Some(answer) if answer.is_empty() => continue,
                Some(answer) => return Ok(answer),
            }
        }
    }

    /// Ask, offering a default used when the answer is blank.
    pub fn ask_string_or(&mut self, prompt: &str, default: &str) -> Result<String> {
        match self.read_answer(&format!("{prompt} [{default}]"))? {
            None => bail!("Input closed while waiting for '{prompt}'"),
            Some(answer) if answer.is_empty() => Ok(default.to_string()),
            Some(answer) => Ok(answer),
        }
    }

    /// Ask until the answer parses as `T`.
    pub fn ask<T>(&mut self, prompt: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        loop {
            let answer = self.ask_string(prompt)?;
            match answer.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "Invalid input: {e}")?,
            }
        }
    }
}
