//! PHP-literal driver
//!
//! Reads `.php` config files of the form `<?php return [...];` without running
//! PHP. Only literal expressions are understood: arrays in both `array(...)`
//! and `[...]` syntax, quoted strings, numbers, `true`/`false`/`null`, the
//! `__DIR__` and `__FILE__` constants, and `.` concatenation of scalars.
//!
//! A file with no `return` evaluates to `1` when included, and so does an
//! explicit `return 1;`. Both load as an empty config.

use super::{matches_extension, read_source, FormatDriver};
use crate::domain::{empty_tree, into_root, kind_of, stringify, ConfigMap, ConfigTree};
use crate::error::{ConfigError, Result};
use std::path::Path;

pub struct PhpDriver;

impl FormatDriver for PhpDriver {
    fn name(&self) -> &'static str {
        "php"
    }

    fn supports(&self, filename: &Path) -> bool {
        matches_extension(filename, &["php"])
    }

    fn load(&self, filename: &Path) -> Result<ConfigTree> {
        let content = read_source(filename)?;
        parse_php(&content, filename)
    }
}

pub fn parse_php(content: &str, filename: &Path) -> Result<ConfigTree> {
    let mut parser = Parser::new(content, filename);
    match parser.script()? {
        None => Ok(empty_tree()),
        Some(ConfigTree::Number(n)) if n.as_i64() == Some(1) => Ok(empty_tree()),
        Some(value @ (ConfigTree::Object(_) | ConfigTree::Array(_))) => into_root(filename, value),
        Some(other) => Err(ConfigError::parse(
            filename,
            format!("the file must return an array, found {}", kind_of(&other)),
        )),
    }
}

/// PHP array keys are either integers or strings.
#[derive(Debug, PartialEq)]
enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    fn from_value(value: ConfigTree) -> std::result::Result<Self, String> {
        match value {
            ConfigTree::String(s) if is_integer_key(&s) => {
                s.parse().map(Key::Int).map_err(|_| format!("invalid array key `{s}`"))
            }
            ConfigTree::String(s) => Ok(Key::Str(s)),
            ConfigTree::Number(n) => match n.as_i64() {
                Some(i) => Ok(Key::Int(i)),
                None => Ok(Key::Int(n.as_f64().unwrap_or_default() as i64)),
            },
            ConfigTree::Bool(b) => Ok(Key::Int(i64::from(b))),
            ConfigTree::Null => Ok(Key::Str(String::new())),
            other => Err(format!("illegal array key type: {}", kind_of(&other))),
        }
    }

    fn into_string(self) -> String {
        match self {
            Key::Int(i) => i.to_string(),
            Key::Str(s) => s,
        }
    }
}

/// Decimal strings without leading zeros are stored as integer keys.
fn is_integer_key(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits == "0" {
        return s == "0";
    }
    !digits.starts_with('0')
}

#[derive(Default)]
struct PhpArray {
    entries: Vec<(Key, ConfigTree)>,
    next_index: i64,
}

impl PhpArray {
    fn push(&mut self, value: ConfigTree) {
        self.insert(Key::Int(self.next_index), value);
    }

    fn insert(&mut self, key: Key, value: ConfigTree) {
        if let Key::Int(i) = key {
            if i >= self.next_index {
                self.next_index = i.saturating_add(1);
            }
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// A list (keys `0..n` in order) becomes a sequence, anything else a map.
    fn into_tree(self) -> ConfigTree {
        let is_list =
            self.entries.iter().enumerate().all(|(i, (k, _))| *k == Key::Int(i as i64));
        if is_list {
            ConfigTree::Array(self.entries.into_iter().map(|(_, v)| v).collect())
        } else {
            ConfigTree::Object(
                self.entries.into_iter().map(|(k, v)| (k.into_string(), v)).collect::<ConfigMap>(),
            )
        }
    }
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    path: &'a Path,
}

impl<'a> Parser<'a> {
    fn new(content: &str, path: &'a Path) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        Self { chars: content.chars().collect(), pos: 0, path }
    }

    /// Returns `None` when the script never reaches a `return`.
    fn script(&mut self) -> Result<Option<ConfigTree>> {
        self.skip_whitespace();
        if self.at_end() {
            return Ok(None);
        }
        if !self.eat_keyword("<?php") {
            return Err(self.error("expected an opening `<?php` tag"));
        }

        self.skip_trivia();
        while self.eat_keyword("declare") {
            self.skip_declare()?;
            self.skip_trivia();
        }
        if self.at_end() || self.peek_str("?>") {
            return Ok(None);
        }
        if !self.eat_keyword("return") {
            return Err(self.error("expected a `return` statement"));
        }

        let value = self.expression()?;
        self.skip_trivia();
        if !(self.eat(';') || self.at_end() || self.peek_str("?>")) {
            return Err(self.error("expected `;` after the returned expression"));
        }
        Ok(Some(value))
    }

    fn skip_declare(&mut self) -> Result<()> {
        self.skip_trivia();
        self.expect('(')?;
        while let Some(c) = self.bump() {
            if c == ')' {
                self.skip_trivia();
                self.expect(';')?;
                return Ok(());
            }
        }
        Err(self.error("unterminated `declare`"))
    }

    fn expression(&mut self) -> Result<ConfigTree> {
        let first = self.term()?;
        self.skip_trivia();
        if self.peek() != Some('.') {
            return Ok(first);
        }

        let mut parts = vec![first];
        while self.eat('.') {
            parts.push(self.term()?);
            self.skip_trivia();
        }

        let mut joined = String::new();
        for part in &parts {
            if part.is_array() || part.is_object() {
                return Err(self.error("array to string conversion"));
            }
            joined.push_str(&stringify(part));
        }
        Ok(ConfigTree::String(joined))
    }

    fn term(&mut self) -> Result<ConfigTree> {
        self.skip_trivia();
        let Some(c) = self.peek() else {
            return Err(self.error("unexpected end of file"));
        };

        match c {
            '[' => {
                self.pos += 1;
                self.array(']')
            }
            '(' => {
                self.pos += 1;
                let value = self.expression()?;
                self.skip_trivia();
                self.expect(')')?;
                Ok(value)
            }
            '\'' => self.single_quoted(),
            '"' => self.double_quoted(),
            '-' | '+' => {
                self.pos += 1;
                match (c, self.term()?) {
                    ('-', ConfigTree::Number(n)) => Ok(negate(&n)),
                    (_, ConfigTree::Number(n)) => Ok(ConfigTree::Number(n)),
                    _ => Err(self.error("unary sign applies to numbers only")),
                }
            }
            c if c.is_ascii_digit() => self.number(),
            '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.number(),
            c if c == '\\' || c == '_' || c.is_alphabetic() => self.constant(),
            other => Err(self.error(&format!("unexpected character `{other}`"))),
        }
    }

    fn array(&mut self, close: char) -> Result<ConfigTree> {
        let mut array = PhpArray::default();
        loop {
            self.skip_trivia();
            if self.eat(close) {
                break;
            }

            let first = self.expression()?;
            self.skip_trivia();
            if self.eat_str("=>") {
                let key = Key::from_value(first).map_err(|msg| self.error(&msg))?;
                let value = self.expression()?;
                array.insert(key, value);
            } else {
                array.push(first);
            }

            self.skip_trivia();
            if self.eat(',') {
                continue;
            }
            if self.eat(close) {
                break;
            }
            return Err(self.error(&format!("expected `,` or `{close}` in array")));
        }
        Ok(array.into_tree())
    }

    fn constant(&mut self) -> Result<ConfigTree> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c == '\\' || c == '_' || c.is_alphanumeric()) {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        let name = word.trim_start_matches('\\').to_ascii_lowercase();

        match name.as_str() {
            "array" => {
                self.skip_trivia();
                self.expect('(')?;
                self.array(')')
            }
            "true" => Ok(ConfigTree::Bool(true)),
            "false" => Ok(ConfigTree::Bool(false)),
            "null" => Ok(ConfigTree::Null),
            "php_eol" => Ok(ConfigTree::String("\n".to_string())),
            "__file__" => Ok(ConfigTree::String(self.path.display().to_string())),
            "__dir__" => {
                let dir = match self.path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => {
                        parent.display().to_string()
                    }
                    _ => ".".to_string(),
                };
                Ok(ConfigTree::String(dir))
            }
            _ => Err(self.error(&format!("unsupported constant `{word}`"))),
        }
    }

    fn single_quoted(&mut self) -> Result<ConfigTree> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\'') => break,
                Some('\\') if matches!(self.peek(), Some('\\' | '\'')) => {
                    out.extend(self.bump());
                }
                Some(c) => out.push(c),
            }
        }
        Ok(ConfigTree::String(out))
    }

    fn double_quoted(&mut self) -> Result<ConfigTree> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.error("unterminated string"));
            };
            match c {
                '"' => break,
                '$' if self.peek().is_some_and(|n| n == '{' || n == '_' || n.is_alphabetic()) => {
                    return Err(self.error("variable interpolation is not supported"));
                }
                '{' if self.peek() == Some('$') => {
                    return Err(self.error("variable interpolation is not supported"));
                }
                '\\' => self.escape(&mut out)?,
                c => out.push(c),
            }
        }
        Ok(ConfigTree::String(out))
    }

    fn escape(&mut self, out: &mut String) -> Result<()> {
        let Some(c) = self.peek() else {
            out.push('\\');
            return Ok(());
        };
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'v' => out.push('\u{0B}'),
            'e' => out.push('\u{1B}'),
            'f' => out.push('\u{0C}'),
            '\\' | '$' | '"' => out.push(c),
            '0'..='7' => {
                let digits = self.take_digits(8, 3);
                let code = u32::from_str_radix(&digits, 8).unwrap_or_default() & 0xFF;
                out.extend(char::from_u32(code));
                return Ok(());
            }
            'x' if self.peek_at(1).is_some_and(|h| h.is_ascii_hexdigit()) => {
                self.pos += 1;
                let digits = self.take_digits(16, 2);
                let code = u32::from_str_radix(&digits, 16).unwrap_or_default();
                out.extend(char::from_u32(code));
                return Ok(());
            }
            'u' if self.peek_at(1) == Some('{') => {
                self.pos += 2;
                let digits = self.take_digits(16, 6);
                if !self.eat('}') {
                    return Err(self.error("unterminated unicode escape"));
                }
                let code = u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("invalid unicode escape"))?;
                out.push(code);
                return Ok(());
            }
            // Unknown escapes keep their backslash.
            _ => {
                out.push('\\');
                return Ok(());
            }
        }
        self.pos += 1;
        Ok(())
    }

    fn take_digits(&mut self, radix: u32, max: usize) -> String {
        let mut digits = String::new();
        while digits.len() < max {
            match self.peek() {
                Some(c) if c.is_digit(radix) => {
                    digits.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        digits
    }

    fn number(&mut self) -> Result<ConfigTree> {
        if self.peek() == Some('0') {
            let radix = match self.peek_at(1) {
                Some('x' | 'X') => Some(16),
                Some('b' | 'B') => Some(2),
                Some('o' | 'O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                let digits = self.take_number_digits(radix);
                return i64::from_str_radix(&digits, radix)
                    .map(ConfigTree::from)
                    .map_err(|_| self.error("invalid integer literal"));
            }
        }

        let mut text = self.take_number_digits(10);
        if text.is_empty() {
            text.push('0');
        }
        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            text.push('.');
            text.push_str(&self.take_number_digits(10));
            is_float = true;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent_follows = match self.peek_at(1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if exponent_follows {
                self.pos += 1;
                text.push('e');
                if let Some(sign @ ('+' | '-')) = self.peek() {
                    text.push(sign);
                    self.pos += 1;
                }
                text.push_str(&self.take_number_digits(10));
                is_float = true;
            }
        }

        if !is_float {
            if text.len() > 1 && text.starts_with('0') {
                return i64::from_str_radix(&text[1..], 8)
                    .map(ConfigTree::from)
                    .map_err(|_| self.error("invalid octal literal"));
            }
            if let Ok(i) = text.parse::<i64>() {
                return Ok(ConfigTree::from(i));
            }
        }

        // Integers too large for i64 become floats, as in PHP.
        text.parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(ConfigTree::Number)
            .ok_or_else(|| self.error("invalid number literal"))
    }

    /// Digits of the given radix, skipping `_` separators.
    fn take_number_digits(&mut self, radix: u32) -> String {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_digit(radix) {
                digits.push(c);
            } else if c != '_' {
                break;
            }
            self.pos += 1;
        }
        digits
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if self.peek_str("//") || (self.peek() == Some('#') && self.peek_at(1) != Some('[')) {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.pos += 1;
                }
            } else if self.peek_str("/*") {
                self.pos += 2;
                while !self.at_end() && !self.peek_str("*/") {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(self.chars.len());
            } else {
                break;
            }
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn peek_str(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.peek_str(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    /// Case-insensitive keyword that is not the prefix of a longer identifier.
    fn eat_keyword(&mut self, word: &str) -> bool {
        let len = word.chars().count();
        let matches = word
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i).is_some_and(|p| p.eq_ignore_ascii_case(&c)));
        let boundary = self.peek_at(len).is_none_or(|c| !(c == '_' || c.is_alphanumeric()));
        if matches && boundary {
            self.pos += len;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected `{c}`")))
        }
    }

    fn error(&self, message: &str) -> ConfigError {
        let consumed = &self.chars[..self.pos.min(self.chars.len())];
        let line = consumed.iter().filter(|c| **c == '\n').count() + 1;
        ConfigError::parse(self.path, format!("{message} on line {line}"))
    }
}

fn negate(n: &serde_json::Number) -> ConfigTree {
    if let Some(neg) = n.as_i64().and_then(i64::checked_neg) {
        return ConfigTree::from(neg);
    }
    let f = -n.as_f64().unwrap_or_default();
    serde_json::Number::from_f64(f).map(ConfigTree::Number).unwrap_or(ConfigTree::Null)
}
