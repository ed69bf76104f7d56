//! Token substitution applied to filtered resources
//!
//! Two token styles are recognized, in this order:
//!
//! 1. `${name}`
//! 2. `@name@`
//!
//! Each style is a [`TokenReader`] wrapping the previous one, so the second
//! stage lazily consumes the first stage's output in a single pass. A value
//! substituted by the first stage is scanned again by the second, never by
//! the stage that produced it. Tokens without a mapping are passed through
//! verbatim. Tokens never span a line break.
//!
//! Each stage holds one input line in memory at a time, so a filtered file
//! without line breaks is buffered whole. Filtering is meant for text
//! resources; binary files should be copied without it.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::error::{PackagingError, Result};

/// Delimiters of one substitution stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub begin: &'static str,
    pub end: &'static str,
}

/// Ordered substitution stages applied to every filtered copy
pub const FILTER_STAGES: [Delimiters; 2] = [
    Delimiters {
        begin: "${",
        end: "}",
    },
    Delimiters {
        begin: "@",
        end: "@",
    },
];

/// Token name to replacement value
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterProperties {
    values: HashMap<String, String>,
}

impl FilterProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the mapping from `.properties` filter files and inline values
    ///
    /// Files are applied in order, later files overriding earlier ones.
    /// Inline values override every file.
    pub fn load(files: &[PathBuf], inline: &IndexMap<String, String>) -> Result<Self> {
        let mut properties = Self::new();

        for file in files {
            let content =
                std::fs::read_to_string(file).map_err(|e| PackagingError::FilterProperties {
                    path: file.clone(),
                    message: e.to_string(),
                })?;
            for (key, value) in parse_properties(&content) {
                properties.values.insert(key, value);
            }
            tracing::debug!("Loaded filter file {}", file.display());
        }

        for (key, value) in inline {
            properties.values.insert(key.clone(), value.clone());
        }

        Ok(properties)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Wrap `source` in every stage of [`FILTER_STAGES`]
pub fn filter_reader<'a>(
    source: impl Read + 'a,
    properties: &'a FilterProperties,
) -> Box<dyn Read + 'a> {
    FILTER_STAGES
        .iter()
        .fold(Box::new(source) as Box<dyn Read + 'a>, |reader, stage| {
            Box::new(TokenReader::new(reader, *stage, properties))
        })
}

/// Stream `source` through the filter stages into `destination`
pub fn copy_filtered(
    source: impl Read,
    destination: &mut impl std::io::Write,
    properties: &FilterProperties,
) -> std::io::Result<u64> {
    let mut reader = filter_reader(source, properties);
    std::io::copy(&mut reader, destination)
}

/// A reader substituting one token style
///
/// Input is consumed one line at a time; only the current line is held in
/// memory, however long it is.
pub struct TokenReader<'p, R> {
    inner: BufReader<R>,
    delimiters: Delimiters,
    properties: &'p FilterProperties,
    line: Vec<u8>,
    pending: Vec<u8>,
    pos: usize,
}

impl<'p, R: Read> TokenReader<'p, R> {
    pub fn new(inner: R, delimiters: Delimiters, properties: &'p FilterProperties) -> Self {
        Self {
            inner: BufReader::new(inner),
            delimiters,
            properties,
            line: Vec::new(),
            pending: Vec::new(),
            pos: 0,
        }
    }

    /// Refill `pending` with the next interpolated line; false at EOF
    fn fill(&mut self) -> std::io::Result<bool> {
        self.line.clear();
        if self.inner.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(false);
        }
        self.pending.clear();
        self.pos = 0;
        interpolate(
            &self.line,
            self.delimiters,
            self.properties,
            &mut self.pending,
        );
        Ok(true)
    }
}

impl<R: Read> Read for TokenReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        while self.pos >= self.pending.len() {
            if !self.fill()? {
                return Ok(0);
            }
        }

        let available = &self.pending[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

fn interpolate(
    line: &[u8],
    delimiters: Delimiters,
    properties: &FilterProperties,
    out: &mut Vec<u8>,
) {
    let begin = delimiters.begin.as_bytes();
    let end = delimiters.end.as_bytes();
    let mut i = 0;

    while i < line.len() {
        if !line[i..].starts_with(begin) {
            out.push(line[i]);
            i += 1;
            continue;
        }

        let key_start = i + begin.len();
        let Some(key_len) = find(&line[key_start..], end) else {
            out.extend_from_slice(begin);
            i = key_start;
            continue;
        };
        let key = &line[key_start..key_start + key_len];

        // `${a ${b}`: restart at the inner token
        if let Some(inner) = find(key, begin) {
            out.extend_from_slice(&line[i..key_start + inner]);
            i = key_start + inner;
            continue;
        }

        match std::str::from_utf8(key).ok().and_then(|k| properties.get(k)) {
            Some(value) => {
                out.extend_from_slice(value.as_bytes());
                i = key_start + key_len + end.len();
            }
            None => {
                // The closing delimiter may open the next token
                out.extend_from_slice(&line[i..key_start + key_len]);
                i = key_start + key_len;
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parse the `key=value` pairs of a `.properties` file
///
/// Supports `#`/`!` comments, `=`, `:` or whitespace separators, trailing
/// backslash continuations and the common escapes.
pub fn parse_properties(content: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut logical = String::new();

    for raw in content.lines() {
        let line = raw.trim_start();

        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        if ends_with_continuation(line) {
            logical.push_str(&line[..line.len() - 1]);
            continue;
        }

        logical.push_str(line);
        if let Some(entry) = split_entry(&logical) {
            entries.push(entry);
        }
        logical.clear();
    }

    if !logical.is_empty() {
        if let Some(entry) = split_entry(&logical) {
            entries.push(entry);
        }
    }

    entries
}

fn ends_with_continuation(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
    trailing % 2 == 1
}

fn split_entry(line: &str) -> Option<(String, String)> {
    let mut key = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    key.push(unescape(escaped));
                }
            }
            '=' | ':' => break,
            c if c.is_whitespace() => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
                if matches!(chars.peek(), Some('=') | Some(':')) {
                    chars.next();
                }
                break;
            }
            c => key.push(c),
        }
    }

    if key.is_empty() {
        return None;
    }

    let rest: String = chars.collect();
    let mut value = String::new();
    let mut rest = rest.trim_start().chars();
    while let Some(c) = rest.next() {
        if c == '\\' {
            if let Some(escaped) = rest.next() {
                value.push(unescape(escaped));
            }
        } else {
            value.push(c);
        }
    }

    Some((key, value))
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}
