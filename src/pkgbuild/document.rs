//! Span-preserving model of a PKGBUILD
//!
//! Only top-level assignments are located: a variable name at column 0
//! followed by `=`, with either a single word (`pkgver=1.0`) or a
//! parenthesized array that may span several lines:
//!
//! ```text
//! source_x86_64=("${pkgname}.deb::https://example.com/app_amd64.deb"
//!                'app.desktop')   # trailing comment
//! ```
//!
//! Every word keeps the byte range it occupies in the original text, so an
//! edit touches exactly those bytes and nothing else.

use std::ops::Range;

use crate::checksum::HashAlgorithm;
use crate::parser::types::SourceTarget;
use crate::pkgbuild::error::PatchError;

/// Quoting of a word as written in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    /// `value`, or a word mixing quoted and bare parts
    None,
    /// `'value'`
    Single,
    /// `"value"`
    Double,
}

impl Quote {
    fn delimiter(&self) -> &'static str {
        match self {
            Quote::None => "",
            Quote::Single => "'",
            Quote::Double => "\"",
        }
    }
}

/// One shell word of an assignment value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Bytes of the whole word, quotes included
    pub span: Range<usize>,
    pub quote: Quote,
    /// Text between the quotes (the whole word when unquoted), escapes untouched
    pub inner: String,
}

impl Word {
    fn new(text: &str, span: Range<usize>) -> Self {
        let raw = &text[span.clone()];
        let quote = enclosing_quote(raw);
        let inner = match quote {
            Quote::None => raw.to_string(),
            Quote::Single | Quote::Double => raw[1..raw.len() - 1].to_string(),
        };
        Self { span, quote, inner }
    }

    /// Render `inner` (already escaped for this word's quoting) with the original quotes
    pub fn requote(&self, inner: &str) -> String {
        let delimiter = self.quote.delimiter();
        format!("{delimiter}{inner}{delimiter}")
    }

    /// Split `name::url` into the rename prefix (with `::`) and the URL part
    pub fn rename_split(&self) -> (&str, &str) {
        match self.inner.find("::") {
            Some(idx) => self.inner.split_at(idx + 2),
            None => ("", self.inner.as_str()),
        }
    }

    /// Whether the URL part points at a remote location
    pub fn is_remote(&self) -> bool {
        self.rename_split().1.contains("://")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentValue {
    Scalar(Word),
    Array(Vec<Word>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    /// 1-based line of the assignment
    pub line: usize,
    pub value: AssignmentValue,
}

/// Top-level assignments of a PKGBUILD in file order
///
/// Function bodies and heredoc bodies are skipped, so `key=value` lines inside
/// them are never mistaken for variables.
#[derive(Debug, Clone)]
pub struct PkgbuildDocument {
    assignments: Vec<Assignment>,
}

impl PkgbuildDocument {
    pub fn parse(text: &str) -> Result<Self, PatchError> {
        let mut scanner = Scanner::new(text);
        let assignments = scanner.assignments()?;
        Ok(Self { assignments })
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// First top-level assignment of `name`
    pub fn assignment(&self, name: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.name == name)
    }

    pub fn scalar(&self, name: &str) -> Option<&Word> {
        match &self.assignment(name)?.value {
            AssignmentValue::Scalar(word) => Some(word),
            AssignmentValue::Array(_) => None,
        }
    }

    pub fn array(&self, name: &str) -> Option<&[Word]> {
        match &self.assignment(name)?.value {
            AssignmentValue::Array(words) => Some(words),
            AssignmentValue::Scalar(_) => None,
        }
    }

    pub fn pkgver(&self) -> Option<&str> {
        self.scalar("pkgver").map(|w| w.inner.as_str())
    }

    pub fn pkgrel(&self) -> Option<&str> {
        self.scalar("pkgrel").map(|w| w.inner.as_str())
    }

    /// Checksum algorithms the file declares for a target, in file order
    pub fn checksum_algorithms(&self, target: SourceTarget) -> Vec<HashAlgorithm> {
        let mut algorithms = Vec::new();
        for assignment in &self.assignments {
            let Some(algorithm) = HashAlgorithm::ALL
                .into_iter()
                .find(|a| assignment.name == target.field(&a.sums_field()))
            else {
                continue;
            };
            if matches!(assignment.value, AssignmentValue::Array(_))
                && !algorithms.contains(&algorithm)
            {
                algorithms.push(algorithm);
            }
        }
        algorithms
    }

    /// Index of the first remote entry of `source<suffix>`
    pub fn remote_source_index(&self, target: SourceTarget) -> Option<usize> {
        self.array(&target.field("source"))?
            .iter()
            .position(Word::is_remote)
    }
}

/// Detect whether a raw word is one single- or double-quoted string
fn enclosing_quote(raw: &str) -> Quote {
    let bytes = raw.as_bytes();
    if bytes.len() < 2 {
        return Quote::None;
    }
    match bytes[0] {
        b'\'' => match raw[1..].find('\'') {
            Some(idx) if idx + 2 == raw.len() => Quote::Single,
            _ => Quote::None,
        },
        b'"' => {
            let mut i = 1;
            while i < bytes.len() {
                match bytes[i] {
                    b'\\' => i += 2,
                    b'"' => {
                        return if i + 1 == bytes.len() {
                            Quote::Double
                        } else {
                            Quote::None
                        };
                    }
                    _ => i += 1,
                }
            }
            Quote::None
        }
        _ => Quote::None,
    }
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// `name() {`, `name ()`, `function name {`
fn is_function_header(line: &str) -> bool {
    let line = line.trim_start();
    let (line, keyword) = match line.strip_prefix("function ") {
        Some(rest) => (rest.trim_start(), true),
        None => (line, false),
    };
    let name_len = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')))
        .unwrap_or(line.len());
    if name_len == 0 {
        return false;
    }
    let rest = line[name_len..].trim_start();
    rest.starts_with("()") || (keyword && (rest.is_empty() || rest.starts_with('{')))
}

/// A function whose body closes on its header line, e.g. `pkgver() { cat VERSION; }`
fn is_one_line_function(line: &str) -> bool {
    let line = line.trim_end();
    line.ends_with('}') && line.matches('{').count() == line.matches('}').count()
}

/// Delimiter of a heredoc started on this line (`<<EOF`, `<<-'EOF'`)
fn heredoc_tag(line: &str) -> Option<String> {
    if line.trim_start().starts_with('#') {
        return None;
    }
    let mut rest = line;
    while let Some(idx) = rest.find("<<") {
        let after = &rest[idx + 2..];
        // `<<<` is a here-string
        if let Some(stripped) = after.strip_prefix('<') {
            rest = stripped.trim_start_matches('<');
            continue;
        }
        let after = after.strip_prefix('-').unwrap_or(after).trim_start();
        let after = after.trim_start_matches(['\'', '"', '\\']);
        let tag: String = after
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if !tag.is_empty() {
            return Some(tag);
        }
        rest = after;
    }
    None
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.bytes[..offset.min(self.bytes.len())]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Move to the start of the next line
    fn next_line(&mut self) {
        match self.bytes[self.pos..].iter().position(|&b| b == b'\n') {
            Some(idx) => self.pos += idx + 1,
            None => self.pos = self.bytes.len(),
        }
    }

    /// Text of the line starting at `pos`, without the newline
    fn current_line(&self) -> &'a str {
        let text: &'a str = self.text;
        let rest = &text[self.pos..];
        match rest.find('\n') {
            Some(idx) => &rest[..idx],
            None => rest,
        }
    }

    fn assignments(&mut self) -> Result<Vec<Assignment>, PatchError> {
        let mut assignments = Vec::new();
        while self.pos < self.bytes.len() {
            let line = self.current_line();
            if let Some(tag) = heredoc_tag(line) {
                self.next_line();
                self.skip_heredoc(&tag);
                continue;
            }
            if is_function_header(line) {
                self.skip_function();
                continue;
            }
            if let Some(assignment) = self.assignment_at_line_start()? {
                assignments.push(assignment);
            }
            self.next_line();
        }
        Ok(assignments)
    }

    /// Skip past the line that closes a heredoc started on the previous line
    fn skip_heredoc(&mut self, tag: &str) {
        while self.pos < self.bytes.len() {
            let line = self.current_line();
            self.next_line();
            if line.trim() == tag {
                return;
            }
        }
    }

    /// Skip a function from its header line through the column-0 `}`
    fn skip_function(&mut self) {
        let header = self.current_line();
        self.next_line();
        if is_one_line_function(header) {
            return;
        }
        while self.pos < self.bytes.len() {
            let line = self.current_line();
            self.next_line();
            if let Some(tag) = heredoc_tag(line) {
                self.skip_heredoc(&tag);
            } else if line.trim_end() == "}" {
                return;
            }
        }
    }

    /// Parse `name=value` at the current line start, leaving `pos` on the value's last line
    fn assignment_at_line_start(&mut self) -> Result<Option<Assignment>, PatchError> {
        let start = self.pos;
        if !self.peek().is_some_and(is_name_start) {
            return Ok(None);
        }
        let mut end = start;
        while end < self.bytes.len() && is_name_char(self.bytes[end]) {
            end += 1;
        }
        if self.bytes.get(end) != Some(&b'=') {
            return Ok(None);
        }

        let name = self.text[start..end].to_string();
        let line = self.line_of(start);
        self.pos = end + 1;

        let value = if self.peek() == Some(b'(') {
            self.pos += 1;
            AssignmentValue::Array(self.array_words(line)?)
        } else {
            let word_start = self.pos;
            let word_end = self.word_end(false, line)?;
            self.pos = word_end;
            AssignmentValue::Scalar(Word::new(self.text, word_start..word_end))
        };

        Ok(Some(Assignment { name, line, value }))
    }

    fn array_words(&mut self, line: usize) -> Result<Vec<Word>, PatchError> {
        let mut words = Vec::new();
        loop {
            match self.peek() {
                None => return Err(PatchError::Unterminated { line }),
                Some(b')') => {
                    self.pos += 1;
                    return Ok(words);
                }
                Some(b' ' | b'\t' | b'\n' | b'\r') => self.pos += 1,
                Some(b'#') => {
                    // Comment inside an array runs to end of line
                    match self.bytes[self.pos..].iter().position(|&b| b == b'\n') {
                        Some(idx) => self.pos += idx,
                        None => return Err(PatchError::Unterminated { line }),
                    }
                }
                Some(_) => {
                    let word_start = self.pos;
                    let word_end = self.word_end(true, line)?;
                    self.pos = word_end;
                    words.push(Word::new(self.text, word_start..word_end));
                }
            }
        }
    }

    /// End offset of the shell word starting at `pos`
    fn word_end(&self, in_array: bool, line: usize) -> Result<usize, PatchError> {
        let len = self.bytes.len();
        let mut i = self.pos;
        let mut quote: Option<u8> = None;

        while i < len {
            let b = self.bytes[i];
            match quote {
                Some(b'\'') => {
                    if b == b'\'' {
                        quote = None;
                    }
                    i += 1;
                }
                Some(_) => match b {
                    b'\\' => i += 2,
                    b'"' => {
                        quote = None;
                        i += 1;
                    }
                    _ => i += 1,
                },
                None => match b {
                    b'\\' => i += 2,
                    b'\'' | b'"' => {
                        quote = Some(b);
                        i += 1;
                    }
                    b' ' | b'\t' | b'\n' | b'\r' | b';' => break,
                    b')' if in_array => break,
                    _ => i += 1,
                },
            }
        }

        if quote.is_some() {
            return Err(PatchError::Unterminated { line });
        }
        Ok(i.min(len))
    }
}
