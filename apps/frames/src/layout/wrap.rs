//! Greedy line wrapper.
//!
//! One left-to-right pass over the token stream at a single font size. Runs are
//! atomic unless a run alone is wider than the line, in which case it is split
//! codepoint by codepoint.

use serde::{Deserialize, Serialize};

use crate::layout::measure::{FontSpec, Px, WidthOracle};
use crate::layout::tokenizer::Token;

/// A finished line and its measured width at the wrap size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    pub width: Px,
}

/// Wraps `tokens` into lines no wider than `max_width`.
///
/// Paragraph breaks always end a line, so blank lines come out as empty
/// zero-width lines. A single codepoint wider than `max_width` is still
/// emitted on a line of its own.
pub fn wrap<O: WidthOracle + ?Sized>(
    tokens: &[Token],
    oracle: &O,
    font: &FontSpec,
    max_width: Px,
) -> Vec<Line> {
    let mut wrapper = Wrapper {
        oracle,
        font,
        max_width,
        current: String::new(),
        lines: Vec::new(),
    };

    for token in tokens {
        match token {
            Token::ParagraphBreak => wrapper.flush(),
            Token::Space => wrapper.push_space(),
            Token::Run(run) => wrapper.push_run(run),
        }
    }

    wrapper.finish()
}

struct Wrapper<'a, O: ?Sized> {
    oracle: &'a O,
    font: &'a FontSpec,
    max_width: Px,
    current: String,
    lines: Vec<Line>,
}

impl<O: WidthOracle + ?Sized> Wrapper<'_, O> {
    fn fits(&self, text: &str) -> bool {
        self.oracle.measure(text, self.font) <= self.max_width
    }

    /// Records the buffer as a line (trailing spaces stripped) and resets it.
    fn flush(&mut self) {
        let text = self.current.trim_end_matches(' ').to_string();
        let width = self.oracle.measure(&text, self.font);
        self.lines.push(Line { text, width });
        self.current.clear();
    }

    fn push_space(&mut self) {
        // No leading space on a wrapped line.
        if !self.current.is_empty() {
            self.current.push(' ');
        }
    }

    fn push_run(&mut self, run: &str) {
        let candidate = format!("{}{}", self.current, run);
        if self.fits(&candidate) {
            self.current = candidate;
            return;
        }

        if !self.current.is_empty() {
            self.flush();
        }
        if self.fits(run) {
            self.current = run.to_string();
            return;
        }

        self.hard_break(run);
    }

    /// Splits an over-wide run between codepoints. The trailing partial piece
    /// stays in the buffer so following tokens can join it.
    fn hard_break(&mut self, run: &str) {
        for c in run.chars() {
            if !self.current.is_empty() {
                let mut candidate = self.current.clone();
                candidate.push(c);
                if !self.fits(&candidate) {
                    self.flush();
                }
            }
            self.current.push(c);
        }
    }

    fn finish(mut self) -> Vec<Line> {
        if !self.current.is_empty() {
            self.flush();
        }
        self.lines
    }
}
