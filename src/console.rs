use crate::Result;
use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Terminal input and output used by the workflows.
///
/// Generic over the reader and writer so tests can feed canned answers and
/// inspect what was printed.
pub struct Console<R, W> {
    input: R,
    output: W,
    prompts: usize,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            prompts: 0,
        }
    }

    /// Print `label` without a newline and read one line of input.
    ///
    /// The answer is trimmed. End of input yields an empty string.
    pub fn prompt(&mut self, label: &str) -> Result<String> {
        self.prompts += 1;
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    pub fn println(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    pub fn blank(&mut self) -> Result<()> {
        writeln!(self.output)?;
        Ok(())
    }

    /// Number of prompts issued so far.
    pub fn prompts(&self) -> usize {
        self.prompts
    }

    pub fn output(&self) -> &W {
        &self.output
    }
}
