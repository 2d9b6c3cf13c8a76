//! Script-aware tokenizer for mixed Chinese/Latin text.
//!
//! Text is split into paragraphs on `\n`, words on literal spaces, and each word
//! into maximal runs of one [`ScriptClass`]. Run boundaries are the only places
//! the wrapper may break a word without falling back to a codepoint-level split.

/// One atomic unit handed to the line wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Maximal run of one script class, content preserved verbatim.
    Run(String),
    /// A single literal space between words.
    Space,
    /// Paragraph separator; an empty paragraph is a lone break.
    ParagraphBreak,
}

/// Script class used to find run boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptClass {
    /// CJK Unified Ideographs (U+4E00..=U+9FFF).
    Cjk,
    /// ASCII letters and digits.
    Alphanumeric,
    /// Punctuation, symbols and everything else.
    Other,
}

/// Classifies a single codepoint.
pub fn classify(c: char) -> ScriptClass {
    match c {
        '\u{4E00}'..='\u{9FFF}' => ScriptClass::Cjk,
        c if c.is_ascii_alphanumeric() => ScriptClass::Alphanumeric,
        _ => ScriptClass::Other,
    }
}

/// Tokenizes raw text.
///
/// Line endings are normalized first. No break is emitted after the final
/// paragraph, so empty text yields an empty sequence. Leading and trailing
/// whitespace is kept; trimming is up to the caller.
pub fn tokenize(text: &str) -> Vec<Token> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut tokens = Vec::new();

    for paragraph in normalized.split('\n') {
        if paragraph.is_empty() {
            tokens.push(Token::ParagraphBreak);
            continue;
        }

        let mut words = paragraph.split(' ').peekable();
        while let Some(word) = words.next() {
            push_runs(word, &mut tokens);
            if words.peek().is_some() {
                tokens.push(Token::Space);
            }
        }
        tokens.push(Token::ParagraphBreak);
    }

    tokens.pop();
    tokens
}

/// Splits one space-free word into maximal same-class runs.
fn push_runs(word: &str, tokens: &mut Vec<Token>) {
    let mut run = String::new();
    let mut run_class: Option<ScriptClass> = None;

    for c in word.chars() {
        let class = classify(c);
        if run_class.is_some_and(|current| current != class) {
            tokens.push(Token::Run(std::mem::take(&mut run)));
        }
        run_class = Some(class);
        run.push(c);
    }

    if !run.is_empty() {
        tokens.push(Token::Run(run));
    }
}
