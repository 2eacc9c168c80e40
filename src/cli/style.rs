//! Terminal styling for sync output
//!
//! Colors are dropped when the target stream is not a terminal or
//! `NO_COLOR` is set; detection is left to `owo-colors`.

use indicatif::ProgressStyle;
pub use owo_colors::Stream;
use owo_colors::{OwoColorize, Style};
use std::fmt;

/// A value painted with a style for one output stream
pub struct Painted<T> {
    value: T,
    style: Style,
    stream: Stream,
}

impl<T> Painted<T> {
    /// Check color support on stderr instead of stdout
    #[must_use]
    pub const fn on_stderr(mut self) -> Self {
        self.stream = Stream::Stderr;
        self
    }
}

impl<T: fmt::Display> fmt::Display for Painted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let painted = self
            .value
            .if_supports_color(self.stream, |v| v.style(self.style));
        write!(f, "{painted}")
    }
}

const fn paint<T>(value: T, style: Style, stream: Stream) -> Painted<T> {
    Painted {
        value,
        style,
        stream,
    }
}

/// Semantic colors, available on anything printable
pub trait Stylize: fmt::Display {
    /// Cyan: paths, branch names, counts
    fn accent(&self) -> Painted<&Self> {
        paint(self, Style::new().cyan(), Stream::Stdout)
    }

    /// Red, for stderr
    fn error(&self) -> Painted<&Self> {
        paint(self, Style::new().red(), Stream::Stderr)
    }

    /// Yellow, for stderr
    fn warn(&self) -> Painted<&Self> {
        paint(self, Style::new().yellow(), Stream::Stderr)
    }

    /// Dimmed secondary text
    fn muted(&self) -> Painted<&Self> {
        paint(self, Style::new().dimmed(), Stream::Stdout)
    }

    /// Bold phase headers
    fn emphasis(&self) -> Painted<&Self> {
        paint(self, Style::new().bold(), Stream::Stdout)
    }
}

impl<T: fmt::Display + ?Sized> Stylize for T {}

/// Green checkmark for a completed operation
pub const fn check() -> Painted<&'static str> {
    paint("✓", Style::new().green(), Stream::Stdout)
}

/// Red cross for a failed operation (stderr)
pub const fn cross() -> Painted<&'static str> {
    paint("✗", Style::new().red(), Stream::Stderr)
}

/// The URL as an OSC 8 hyperlink where the terminal supports it
pub fn hyperlink_url(stream: Stream, url: &str) -> String {
    let target = match stream {
        Stream::Stdout => supports_hyperlinks::Stream::Stdout,
        Stream::Stderr => supports_hyperlinks::Stream::Stderr,
    };
    if supports_hyperlinks::on(target) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Spinner shown while scanning and planning
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
}
