//! Minimal line-oriented TOML reader
//!
//! Used when the `toml` crate rejects a manifest so that dependency tables
//! can still be salvaged. Supports:
//! - `[section]` and `[section.subsection]` headers
//! - flat `key = "value"` pairs (basic or literal strings)
//! - single-line inline tables: `key = { version = "1.0", features = [...] }`
//!
//! Anything else (multi-line arrays, dates, numbers) is kept as an opaque
//! value or skipped line by line.

/// A scanned value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteValue {
    Str(String),
    Table(Vec<(String, LiteValue)>),
    Other(String),
}

impl LiteValue {
    /// Version of a dependency entry: a bare string or an inline table's `version`
    pub fn dependency_version(&self) -> Option<&str> {
        match self {
            LiteValue::Str(s) => Some(s),
            LiteValue::Table(entries) => entries.iter().find_map(|(k, v)| match v {
                LiteValue::Str(s) if k == "version" => Some(s.as_str()),
                _ => None,
            }),
            LiteValue::Other(_) => None,
        }
    }
}

/// One line-level token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `[a.b]` header, stored as the dotted path without brackets
    Header(String),
    /// `key = value`
    Pair(String, LiteValue),
}

/// Sections accumulated from a token stream, in document order
#[derive(Debug, Default)]
pub struct LiteDocument {
    sections: Vec<(String, Vec<(String, LiteValue)>)>,
}

impl LiteDocument {
    /// Scan a document, skipping lines that do not tokenize
    pub fn parse(content: &str) -> Self {
        let mut doc = LiteDocument::default();
        let mut current = String::new();

        for token in content.lines().filter_map(tokenize_line) {
            match token {
                Token::Header(path) => current = path,
                Token::Pair(key, value) => doc.push(&current, key, value),
            }
        }

        doc
    }

    fn push(&mut self, section: &str, key: String, value: LiteValue) {
        match self.sections.iter_mut().find(|(name, _)| name == section) {
            Some((_, entries)) => entries.push((key, value)),
            None => self
                .sections
                .push((section.to_string(), vec![(key, value)])),
        }
    }

    /// Entries of a section; empty when absent
    pub fn section(&self, path: &str) -> &[(String, LiteValue)] {
        self.sections
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }
}

/// Tokenize one line; `None` for blank, comment or unrecognized lines
pub fn tokenize_line(line: &str) -> Option<Token> {
    let line = strip_comment(line).trim();
    if line.is_empty() {
        return None;
    }

    if line.starts_with('[') {
        let inner = line.trim_start_matches('[').trim_end_matches(']').trim();
        if inner.is_empty() {
            return None;
        }
        let path: Vec<String> = inner.split('.').map(|p| unquote(p.trim())).collect();
        return Some(Token::Header(path.join(".")));
    }

    let (key, value) = split_pair(line)?;
    Some(Token::Pair(key, parse_value(value)?))
}

fn split_pair(s: &str) -> Option<(String, &str)> {
    let eq = find_unquoted(s, '=')?;
    let key = unquote(s[..eq].trim());
    if key.is_empty() {
        return None;
    }
    Some((key, s[eq + 1..].trim()))
}

fn parse_value(raw: &str) -> Option<LiteValue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(s) = quoted(raw) {
        return Some(LiteValue::Str(s.to_string()));
    }

    if let Some(body) = raw.strip_prefix('{') {
        // An unterminated inline table means a multi-line value we do not handle
        let body = body.strip_suffix('}')?;
        let entries = split_top_level(body)
            .into_iter()
            .filter_map(|part| {
                let (k, v) = split_pair(part.trim())?;
                Some((k, parse_value(v)?))
            })
            .collect();
        return Some(LiteValue::Table(entries));
    }

    Some(LiteValue::Other(raw.to_string()))
}

/// Contents of a fully quoted string, or None
fn quoted(s: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|q| {
        let inner = s.strip_prefix(q)?.strip_suffix(q)?;
        (!inner.contains(q)).then_some(inner)
    })
}

fn unquote(s: &str) -> String {
    quoted(s).unwrap_or(s).to_string()
}

fn strip_comment(line: &str) -> &str {
    match find_unquoted(line, '#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn find_unquoted(s: &str, target: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, ch) in s.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == target => return Some(idx),
            None => {}
        }
    }
    None
}

/// Split on commas that are outside quotes, brackets and braces
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, ch) in s.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[' | '{') => depth += 1,
            (None, ']' | '}') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&s[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts.retain(|p| !p.trim().is_empty());
    parts
}
