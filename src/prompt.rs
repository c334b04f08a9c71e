use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Line-oriented console prompts. Generic over the streams so the import flow
/// can be driven by scripted input in tests.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }

    /// Prints `question` and returns the trimmed answer. End of input is an
    /// error rather than an empty answer.
    pub fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(line.trim().to_string())
    }

    /// Asks a yes/no question. Only "yes" or "y" (any case) counts as yes.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{} (yes/no): ", question))?;
        Ok(matches!(answer.to_lowercase().as_str(), "yes" | "y"))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
