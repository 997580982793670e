//! Query-path engine used by the structured-value search stage.
//!
//! Paths are `$`-rooted: `.key`, `['key']`, `[0]`, wildcards `.*` /
//! `[*]`, recursive descent `..`, and filters `[?(@.path)]`,
//! `[?(@.path == literal)]`, `[?(@.path != literal)]`.

use serde_json::Value;

use crate::errors::{ProcessError, Result};
use crate::values::is_truthy;

#[derive(Debug, Clone)]
pub(crate) struct Path {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Index(i64),
    Wildcard,
    Recursive,
    Filter(Filter),
}

#[derive(Debug, Clone)]
struct Filter {
    operand: Vec<OperandStep>,
    cmp: Option<(Cmp, Value)>,
}

#[derive(Debug, Clone)]
enum OperandStep {
    Key(String),
    Index(i64),
}

#[derive(Debug, Clone, Copy)]
enum Cmp {
    Eq,
    Ne,
}

pub(crate) fn parse(input: &str) -> Result<Path> {
    let mut p = Cursor::new(input);
    p.skip_ws();
    if !p.consume('$') {
        return Err(invalid("path must start with `$`"));
    }
    let mut segments = Vec::new();
    loop {
        p.skip_ws();
        if p.eof() {
            break;
        }
        if p.peek_str("..") {
            p.advance(2);
            segments.push(Segment::Recursive);
            // `..` swallows both dots, so the descendant selector
            // follows immediately: a bare key, `*`, or a bracket
            // segment picked up by the `[` branch below.
            if p.consume('*') {
                segments.push(Segment::Wildcard);
            } else if !p.eof() && p.peek() != Some('[') {
                segments.push(Segment::Key(p.identifier()?));
            }
            continue;
        }
        if p.consume('.') {
            if p.consume('*') {
                segments.push(Segment::Wildcard);
            } else {
                segments.push(Segment::Key(p.identifier()?));
            }
            continue;
        }
        if p.consume('[') {
            p.skip_ws();
            if p.consume('*') {
                p.expect(']')?;
                segments.push(Segment::Wildcard);
            } else if p.consume('?') {
                p.expect('(')?;
                let filter = parse_filter(&mut p)?;
                p.expect(')')?;
                p.expect(']')?;
                segments.push(Segment::Filter(filter));
            } else if matches!(p.peek(), Some('\'') | Some('"')) {
                let key = p.quoted_string()?;
                p.expect(']')?;
                segments.push(Segment::Key(key));
            } else {
                let idx = p.integer()?;
                p.skip_ws();
                p.expect(']')?;
                segments.push(Segment::Index(idx));
            }
            continue;
        }
        return Err(invalid(format!("unexpected character at offset {}", p.offset())));
    }
    Ok(Path { segments })
}

fn parse_filter(p: &mut Cursor) -> Result<Filter> {
    p.skip_ws();
    if !p.consume('@') {
        return Err(invalid("filter operand must start with `@`"));
    }
    let mut operand = Vec::new();
    loop {
        if p.consume('.') {
            operand.push(OperandStep::Key(p.identifier()?));
            continue;
        }
        if p.consume('[') {
            p.skip_ws();
            if matches!(p.peek(), Some('\'') | Some('"')) {
                let key = p.quoted_string()?;
                p.expect(']')?;
                operand.push(OperandStep::Key(key));
            } else {
                let idx = p.integer()?;
                p.skip_ws();
                p.expect(']')?;
                operand.push(OperandStep::Index(idx));
            }
            continue;
        }
        break;
    }
    p.skip_ws();
    let cmp = if p.peek_str("==") {
        p.advance(2);
        Some(Cmp::Eq)
    } else if p.peek_str("!=") {
        p.advance(2);
        Some(Cmp::Ne)
    } else {
        None
    };
    let cmp = match cmp {
        Some(op) => {
            p.skip_ws();
            Some((op, p.literal()?))
        }
        None => None,
    };
    Ok(Filter { operand, cmp })
}

fn invalid(msg: impl std::fmt::Display) -> ProcessError {
    ProcessError::usage(format!("invalid query path: {msg}"))
}

impl Path {
    /// Set-of-matches evaluation: every segment maps the current match
    /// set to the next one, in document order.
    pub(crate) fn eval<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for seg in &self.segments {
            current = match seg {
                Segment::Key(k) => current
                    .into_iter()
                    .flat_map(|v| match v {
                        Value::Object(map) => map.get(k).into_iter().collect(),
                        _ => Vec::new(),
                    })
                    .collect(),
                Segment::Index(i) => {
                    // Negative indexes match nothing.
                    if *i < 0 {
                        Vec::new()
                    } else {
                        let idx = *i as usize;
                        current
                            .into_iter()
                            .flat_map(|v| match v {
                                Value::Array(arr) => arr.get(idx).into_iter().collect(),
                                _ => Vec::new(),
                            })
                            .collect()
                    }
                }
                Segment::Wildcard => current
                    .into_iter()
                    .flat_map(|v| match v {
                        Value::Array(arr) => arr.iter().collect(),
                        Value::Object(map) => map.values().collect(),
                        _ => Vec::new(),
                    })
                    .collect(),
                Segment::Recursive => current
                    .into_iter()
                    .flat_map(|v| {
                        let mut out = Vec::new();
                        collect_descendants(v, &mut out);
                        out
                    })
                    .collect(),
                Segment::Filter(filter) => current
                    .into_iter()
                    .flat_map(|v| match v {
                        Value::Array(arr) => arr.iter().collect(),
                        _ => vec![v],
                    })
                    .filter(|v| filter.matches(v))
                    .collect(),
            };
        }
        current
    }
}

fn collect_descendants<'a>(v: &'a Value, out: &mut Vec<&'a Value>) {
    out.push(v);
    match v {
        Value::Array(arr) => {
            for elt in arr {
                collect_descendants(elt, out);
            }
        }
        Value::Object(map) => {
            for elt in map.values() {
                collect_descendants(elt, out);
            }
        }
        _ => {}
    }
}

impl Filter {
    fn matches(&self, current: &Value) -> bool {
        let mut node = current;
        for step in &self.operand {
            node = match step {
                OperandStep::Key(k) => match node {
                    Value::Object(map) => match map.get(k) {
                        Some(v) => v,
                        None => &Value::Null,
                    },
                    _ => &Value::Null,
                },
                OperandStep::Index(i) => match node {
                    Value::Array(arr) if *i >= 0 => {
                        arr.get(*i as usize).unwrap_or(&Value::Null)
                    }
                    _ => &Value::Null,
                },
            };
        }
        match &self.cmp {
            None => is_truthy(node),
            Some((Cmp::Eq, lit)) => values_equal(node, lit),
            Some((Cmp::Ne, lit)) => !values_equal(node, lit),
        }
    }
}

/// Numeric comparison is value-based so `1 == 1.0` holds.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(na), Value::Number(nb)) => match (na.as_f64(), nb.as_f64()) {
            (Some(fa), Some(fb)) => fa == fb,
            _ => na == nb,
        },
        _ => a == b,
    }
}

struct Cursor<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    fn offset(&self) -> usize {
        self.i
    }

    fn peek(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    fn advance(&mut self, n: usize) {
        self.i += n;
    }

    fn consume(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.consume(c) {
            Ok(())
        } else {
            Err(invalid(format!("expected '{c}' at offset {}", self.i)))
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    fn identifier(&mut self) -> Result<String> {
        let start = self.i;
        while let Some(c) = self.peek() {
            if c == '_' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(invalid(format!("identifier expected at offset {start}")));
        }
        Ok(self.s[start..self.i].to_string())
    }

    fn integer(&mut self) -> Result<i64> {
        let start = self.i;
        if self.peek() == Some('-') {
            self.i += 1;
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        self.s[start..self.i]
            .parse::<i64>()
            .map_err(|_| invalid(format!("integer expected at offset {start}")))
    }

    fn quoted_string(&mut self) -> Result<String> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(invalid("quoted string expected")),
        };
        self.i += 1;
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.i += c.len_utf8();
            if c == quote {
                return Ok(out);
            }
            if c == '\\' {
                match self.peek() {
                    Some(nc) => {
                        self.i += nc.len_utf8();
                        match nc {
                            'n' => out.push('\n'),
                            't' => out.push('\t'),
                            'r' => out.push('\r'),
                            '\\' | '"' | '\'' => out.push(nc),
                            _ => {
                                out.push('\\');
                                out.push(nc);
                            }
                        }
                    }
                    None => break,
                }
            } else {
                out.push(c);
            }
        }
        Err(invalid("unterminated string"))
    }

    fn literal(&mut self) -> Result<Value> {
        if matches!(self.peek(), Some('\'') | Some('"')) {
            return Ok(Value::String(self.quoted_string()?));
        }
        if self.peek_str("true") {
            self.advance(4);
            return Ok(Value::Bool(true));
        }
        if self.peek_str("false") {
            self.advance(5);
            return Ok(Value::Bool(false));
        }
        if self.peek_str("null") {
            self.advance(4);
            return Ok(Value::Null);
        }
        let start = self.i;
        if self.peek() == Some('-') {
            self.i += 1;
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.peek() == Some('.') {
            self.i += 1;
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.i += 1;
                } else {
                    break;
                }
            }
        }
        let text = &self.s[start..self.i];
        if text.is_empty() || text == "-" {
            return Err(invalid(format!("literal expected at offset {start}")));
        }
        if text.contains('.') {
            text.parse::<f64>()
                .map(Value::from)
                .map_err(|_| invalid(format!("bad number literal {text:?}")))
        } else {
            text.parse::<i64>()
                .map(Value::from)
                .map_err(|_| invalid(format!("bad number literal {text:?}")))
        }
    }
}
