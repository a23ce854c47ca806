use std::str::Split;

/// Quote characters removed from either end of a property value.
const QUOTES: &[char] = &['"', '\''];

/// A meaningful line of a profile file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    Section(&'a str),
    Property { key: &'a str, value: &'a str },
}

/// Represents an on-going parse. Yields only section headers and properties;
/// comments, short lines and lines without `=` are dropped.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    lines: Split<'a, char>,
    line: usize,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n'),
            line: 0,
        }
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            self.line += 1;

            if let Some(parsed) = classify(line) {
                return Some(parsed);
            }

            if !line.trim_end_matches('\r').is_empty() {
                tracing::trace!(line_number = self.line, "skipping {line:?}");
            }
        }

        None
    }
}

/// `raw` still carries its carriage return, which counts towards the minimum
/// length of a property line.
fn classify(raw: &str) -> Option<Line<'_>> {
    let line = raw.trim_end_matches('\r');

    if let Some(rest) = line.strip_prefix('[') {
        let name = rest.rfind(']').map_or(rest, |end| &rest[..end]);
        return Some(Line::Section(name));
    }

    if raw.starts_with('#') || raw.len() <= 2 {
        return None;
    }

    let (key, value) = line.split_once('=')?;

    Some(Line::Property {
        key: key.trim(),
        value: strip_quotes(value),
    })
}

/// Trim `value` and remove one leading and one trailing quote. The two ends are
/// checked independently, so `"abc'` and `abc"` both lose their quote.
fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    let value = value.strip_prefix(QUOTES).unwrap_or(value);
    let value = value.strip_suffix(QUOTES).unwrap_or(value);
    value.trim()
}
