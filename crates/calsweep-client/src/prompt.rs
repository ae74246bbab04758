//! Operator decisions for the review loop.

use std::io::{self, BufRead, Write};

/// What to do with one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Delete every event in the group.
    Delete,
    /// Leave the group alone and move on.
    Skip,
    /// Stop reviewing.
    Quit,
}

impl Decision {
    /// Interprets an answer: `y` deletes, `q` quits, anything else skips.
    ///
    /// Surrounding whitespace and case are ignored.
    pub fn parse(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" => Self::Delete,
            "q" => Self::Quit,
            _ => Self::Skip,
        }
    }
}

/// Source of per-group decisions.
pub trait DecisionSource {
    /// Shows `prompt` and returns the operator's decision.
    fn decide(&mut self, prompt: &str) -> io::Result<Decision>;
}

/// Reads answers line by line from a terminal-like reader.
///
/// End of input counts as [`Decision::Quit`].
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompts on stdout and reads stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    /// Creates a prompt over the given reader and writer.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> DecisionSource for ConsolePrompt<R, W> {
    fn decide(&mut self, prompt: &str) -> io::Result<Decision> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(Decision::Quit);
        }
        Ok(Decision::parse(&line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_answers() {
        assert_eq!(Decision::parse("y"), Decision::Delete);
        assert_eq!(Decision::parse("  Y \n"), Decision::Delete);
        assert_eq!(Decision::parse("q\n"), Decision::Quit);
        assert_eq!(Decision::parse("Q"), Decision::Quit);
        assert_eq!(Decision::parse("n"), Decision::Skip);
        assert_eq!(Decision::parse(""), Decision::Skip);
        assert_eq!(Decision::parse("yes"), Decision::Skip);
        assert_eq!(Decision::parse("quit"), Decision::Skip);
    }

    #[test]
    fn console_reads_one_line_per_prompt() {
        let input = io::Cursor::new("y\nn\nq\n");
        let mut output = Vec::new();
        let mut prompt = ConsolePrompt::new(input, &mut output);

        assert_eq!(prompt.decide("first? ").unwrap(), Decision::Delete);
        assert_eq!(prompt.decide("second? ").unwrap(), Decision::Skip);
        assert_eq!(prompt.decide("third? ").unwrap(), Decision::Quit);

        assert_eq!(String::from_utf8(output).unwrap(), "first? second? third? ");
    }

    #[test]
    fn console_end_of_input_quits() {
        let mut output = Vec::new();
        let mut prompt = ConsolePrompt::new(io::Cursor::new(""), &mut output);
        assert_eq!(prompt.decide("delete? ").unwrap(), Decision::Quit);
    }

    #[test]
    fn console_blank_line_skips() {
        let mut prompt = ConsolePrompt::new(io::Cursor::new("\n"), Vec::new());
        assert_eq!(prompt.decide("delete? ").unwrap(), Decision::Skip);
    }
}
