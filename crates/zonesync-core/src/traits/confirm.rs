//! Operator confirmation
//!
//! Only an explicit `y` counts as yes. Empty input, end of input, and
//! anything else is a no.

use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;

/// Yes/no oracle consulted before risky steps
pub trait Confirmation: Send + Sync {
    /// Show `prompt` and wait for an answer
    fn confirm(&self, prompt: &str) -> Result<bool, crate::Error>;
}

/// Confirmation read line by line from a reader, prompts written to a writer
pub struct LineConfirmation<R, W> {
    inner: Mutex<(R, W)>,
}

impl<R, W> LineConfirmation<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            inner: Mutex::new((input, output)),
        }
    }
}

impl LineConfirmation<BufReader<Stdin>, Stdout> {
    /// Confirmation on the process terminal
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R, W> Confirmation for LineConfirmation<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm(&self, prompt: &str) -> Result<bool, crate::Error> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| crate::Error::Other("confirmation stream poisoned".to_string()))?;
        let (input, output) = &mut *guard;

        write!(output, "{} (y/N)? ", prompt)?;
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;

        Ok(is_affirmative(&line))
    }
}

/// `y` or `Y`, surrounding whitespace ignored
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
