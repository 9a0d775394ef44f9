//! Colored terminal output for operators.

use std::io::{self, IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes status lines to stdout and problems to stderr.
///
/// Color is used only when the stream is a terminal.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Creates an output manager.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    fn stdout() -> StandardStream {
        StandardStream::stdout(choice(io::stdout().is_terminal()))
    }

    fn stderr() -> StandardStream {
        StandardStream::stderr(choice(io::stderr().is_terminal()))
    }

    fn emit(
        stream: &mut StandardStream,
        spec: &ColorSpec,
        prefix: &str,
        message: &str,
    ) -> io::Result<()> {
        stream.set_color(spec)?;
        write!(stream, "{prefix}")?;
        stream.reset()?;
        writeln!(stream, "{message}")
    }

    /// Only shown with `--verbose`.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }
        let mut spec = ColorSpec::new();
        spec.set_dimmed(true);
        Self::emit(&mut Self::stdout(), &spec, "  ", message)
    }

    /// Warning on stderr.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Yellow)).set_bold(true);
        Self::emit(&mut Self::stderr(), &spec, "warning: ", message)
    }

    /// Success line with a check mark.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Green)).set_bold(true);
        Self::emit(&mut Self::stdout(), &spec, "✓ ", message)
    }

    /// Error line on stderr; shown even with `--quiet`.
    pub fn error(&self, message: &str) -> io::Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::White))
            .set_bg(Some(Color::Red))
            .set_bold(true);
        let mut stream = Self::stderr();
        stream.set_color(&spec)?;
        write!(stream, "✗ {message}")?;
        stream.reset()?;
        writeln!(stream)
    }

    /// Step in progress.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Cyan));
        Self::emit(&mut Self::stdout(), &spec, "→ ", message)
    }

    /// Section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::White))
            .set_bg(Some(Color::Blue))
            .set_bold(true);
        let mut stream = Self::stdout();
        writeln!(stream)?;
        stream.set_color(&spec)?;
        write!(stream, "* {title}")?;
        stream.reset()?;
        writeln!(stream)
    }

    /// Indented detail line.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(Self::stdout(), "    {message}")
    }
}

fn choice(is_terminal: bool) -> ColorChoice {
    if is_terminal && std::env::var_os("NO_COLOR").is_none() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
