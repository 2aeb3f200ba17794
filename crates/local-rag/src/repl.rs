//! Interactive question loop
//!
//! Reads a line, sends it to the query engine, prints the answer, repeats.
//! `exit`/`quit` (any case, surrounding whitespace ignored), end of input, and
//! Ctrl-C all end the session cleanly. Ctrl-C at a terminal prompt reaches the
//! loop through rustyline; anywhere else it is caught by
//! [`exit_on_interrupt`].

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{BufRead, IsTerminal, StdinLock, Stdout, Write};

use crate::config::{QueryErrorPolicy, ReplConfig};
use crate::error::Result;
use crate::query::QueryEngine;

/// Prompt shown before every question
pub const PROMPT: &str = "Ask a question: ";
/// Printed when the user leaves with an exit keyword or end of input
pub const FAREWELL: &str = "Exiting. Goodbye!";
/// Printed for blank input
pub const EMPTY_INPUT: &str = "Please enter a valid question.";
/// Printed on Ctrl-C
pub const INTERRUPTED: &str = "Interrupted by user. Exiting.";
/// Width of the line printed after each answer
pub const SEPARATOR_WIDTH: usize = 60;

/// Result of reading one line from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A line of input, without the trailing newline
    Line(String),
    /// Ctrl-C at the prompt
    Interrupted,
    /// Ctrl-D or closed stdin
    Eof,
}

/// Source of user input lines
pub trait LineReader {
    /// Show `prompt` and read one line
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Line reader for stdin that is not a terminal
///
/// Writes the prompt itself, since rustyline stays silent without a tty.
pub struct PipedReader<I, O> {
    input: I,
    out: O,
}

impl<I: BufRead, O: Write> PipedReader<I, O> {
    /// Read lines from `input`, echoing prompts to `out`
    pub fn new(input: I, out: O) -> Self {
        Self { input, out }
    }
}

impl<I: BufRead, O: Write> LineReader for PipedReader<I, O> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        let len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(len);
        Ok(ReadOutcome::Line(line))
    }
}

/// Reader on the process's stdin
///
/// Uses rustyline (line editing, history) on a terminal and a plain
/// [`PipedReader`] otherwise.
pub enum TerminalReader {
    /// Interactive terminal
    Editor(DefaultEditor),
    /// Redirected stdin
    Piped(PipedReader<StdinLock<'static>, Stdout>),
}

impl TerminalReader {
    /// Create a reader on stdin
    pub fn new() -> Result<Self> {
        if std::io::stdin().is_terminal() {
            Ok(Self::Editor(DefaultEditor::new()?))
        } else {
            tracing::debug!("stdin is not a terminal, reading lines without an editor");
            Ok(Self::Piped(PipedReader::new(
                std::io::stdin().lock(),
                std::io::stdout(),
            )))
        }
    }
}

impl LineReader for TerminalReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        let editor = match self {
            Self::Editor(editor) => editor,
            Self::Piped(reader) => return reader.read_line(prompt),
        };

        match editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(e.into()),
        }
    }
}

/// Exit with status 0 and the interrupt notice on Ctrl-C
///
/// Covers interrupts outside the line editor, such as while a query is
/// waiting on the model. rustyline keeps the terminal in raw mode at the
/// prompt, so Ctrl-C there still arrives as [`ReadOutcome::Interrupted`].
pub fn exit_on_interrupt() -> Result<()> {
    ctrlc::set_handler(|| {
        let mut out = std::io::stdout();
        let _ = write!(out, "{}", interrupt_notice());
        let _ = out.flush();
        std::process::exit(0);
    })?;
    Ok(())
}

fn interrupt_notice() -> String {
    format!("\n{}\n", INTERRUPTED)
}

/// What a line of input asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// `exit` or `quit`
    Exit,
    /// Nothing but whitespace
    Empty,
    /// A trimmed question
    Question(&'a str),
}

impl<'a> Input<'a> {
    /// Classify a raw line
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            Input::Exit
        } else if trimmed.is_empty() {
            Input::Empty
        } else {
            Input::Question(trimmed)
        }
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Exit keyword
    Quit,
    /// Ctrl-C at the prompt
    Interrupted,
    /// Input closed
    EndOfInput,
}

/// Outcome of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplSummary {
    /// Why the loop stopped
    pub exit: LoopExit,
    /// Questions sent to the query engine
    pub questions: usize,
    /// Questions whose query failed under [`QueryErrorPolicy::Report`]
    pub failures: usize,
}

/// The interactive loop
pub struct Repl<'a, R, W> {
    reader: R,
    out: W,
    engine: &'a dyn QueryEngine,
    config: ReplConfig,
}

impl<'a, R: LineReader, W: Write> Repl<'a, R, W> {
    /// Create a loop reading from `reader` and printing to `out`
    pub fn new(reader: R, out: W, engine: &'a dyn QueryEngine, config: ReplConfig) -> Self {
        Self {
            reader,
            out,
            engine,
            config,
        }
    }

    /// Run until exit, end of input, or interrupt
    ///
    /// A failed query ends the loop with that error unless the policy is
    /// [`QueryErrorPolicy::Report`].
    pub fn run(&mut self) -> Result<ReplSummary> {
        let mut questions = 0;
        let mut failures = 0;

        let exit = loop {
            let line = match self.reader.read_line(PROMPT)? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted => {
                    write!(self.out, "{}", interrupt_notice())?;
                    break LoopExit::Interrupted;
                }
                ReadOutcome::Eof => {
                    writeln!(self.out, "{}", FAREWELL)?;
                    break LoopExit::EndOfInput;
                }
            };

            match Input::parse(&line) {
                Input::Exit => {
                    writeln!(self.out, "{}", FAREWELL)?;
                    break LoopExit::Quit;
                }
                Input::Empty => {
                    writeln!(self.out, "{}\n", EMPTY_INPUT)?;
                }
                Input::Question(question) => {
                    questions += 1;
                    if !self.answer(question)? {
                        failures += 1;
                    }
                }
            }
        };

        self.out.flush()?;
        tracing::info!("Session ended ({:?}) after {} questions", exit, questions);

        Ok(ReplSummary {
            exit,
            questions,
            failures,
        })
    }

    /// Query and print one answer block; `Ok(false)` for a reported failure
    fn answer(&mut self, question: &str) -> Result<bool> {
        let separator = "-".repeat(SEPARATOR_WIDTH);

        let response = match self.engine.query(question) {
            Ok(response) => response,
            Err(e) if self.config.on_error == QueryErrorPolicy::Report => {
                tracing::error!("Query failed: {}", e);
                writeln!(self.out, "\nError: {}", e)?;
                writeln!(self.out, "{}", separator)?;
                self.out.flush()?;
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        writeln!(self.out, "\nAnswer:")?;
        writeln!(self.out, "{}", response)?;
        if self.config.show_sources {
            for line in response.format_sources() {
                writeln!(self.out, "{}", line)?;
            }
        }
        writeln!(self.out, "{}", separator)?;
        self.out.flush()?;

        Ok(true)
    }
}
