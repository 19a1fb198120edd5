//! Path expression parser.
//!
//! A hand-written cursor over the expression text. Each segment is one of:
//!
//! ```text
//! .name  .*              child / wildcard
//! ..name ..* ..[...]     recursive descent
//! [...]                  bracket: '*', quoted names, bare names, indices,
//!                        slices, or a comma-separated union of those
//! ```
//!
//! Errors carry the byte offset where the cursor stopped.

use super::{Segment, Selector};
use crate::error::PathError;

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

pub(super) fn parse(path: &str) -> Result<Vec<Segment>, PathError> {
    let mut cur = Cursor { src: path, pos: 0 };
    let mut segments = Vec::new();

    if path.trim().is_empty() {
        return Err(cur.error("empty path"));
    }

    if !cur.eat('$') {
        // A bare leading field, as in `Sns.Message`.
        segments.push(Segment::Child(Selector::Name(cur.name()?)));
    }

    while let Some(c) = cur.peek() {
        match c {
            '.' if cur.rest().starts_with("..") => {
                cur.pos += 2;
                let selector = if cur.peek() == Some('[') { cur.bracket()? } else { cur.dot_selector()? };
                segments.push(Segment::Descendant(selector));
            }
            '.' => {
                cur.pos += 1;
                segments.push(Segment::Child(cur.dot_selector()?));
            }
            '[' => segments.push(Segment::Child(cur.bracket()?)),
            other => return Err(cur.error(format!("unexpected '{other}'"))),
        }
    }

    Ok(segments)
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn error(&self, reason: impl Into<String>) -> PathError {
        PathError::new(self.src, self.pos, reason)
    }

    fn name(&mut self) -> Result<String, PathError> {
        match regex!(r"^[\p{L}\p{N}_@-]+").find(self.rest()) {
            Some(m) => {
                self.pos += m.end();
                Ok(m.as_str().to_string())
            }
            None => Err(self.error("expected field name")),
        }
    }

    fn dot_selector(&mut self) -> Result<Selector, PathError> {
        if self.eat('*') { Ok(Selector::Wildcard) } else { Ok(Selector::Name(self.name()?)) }
    }

    fn bracket(&mut self) -> Result<Selector, PathError> {
        let open = self.pos;
        if !self.eat('[') {
            return Err(self.error("expected '['"));
        }

        let mut items = Vec::new();
        loop {
            self.skip_ws();
            let item = match self.peek() {
                None => return Err(PathError::new(self.src, open, "unterminated bracket")),
                Some('*') => {
                    self.pos += 1;
                    Selector::Wildcard
                }
                Some('\'' | '"') => Selector::Name(self.quoted()?),
                Some(c) if c == '-' || c == ':' || c.is_ascii_digit() => self.index_or_slice()?,
                Some(_) => Selector::Name(self.name()?),
            };
            items.push(item);

            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                break;
            }
            return match self.peek() {
                None => Err(PathError::new(self.src, open, "unterminated bracket")),
                Some(c) => Err(self.error(format!("expected ',' or ']', found '{c}'"))),
            };
        }

        if items.len() == 1 { Ok(items.remove(0)) } else { Ok(Selector::Union(items)) }
    }

    fn quoted(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        let Some(quote) = self.peek() else {
            return Err(self.error("expected quoted name"));
        };
        self.pos += quote.len_utf8();

        let mut out = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                },
                c if c == quote => {
                    self.pos += offset + c.len_utf8();
                    return Ok(out);
                }
                c => out.push(c),
            }
        }
        Err(PathError::new(self.src, start, "unterminated quoted name"))
    }

    fn int(&mut self) -> Result<Option<i64>, PathError> {
        let Some(m) = regex!(r"^-?[0-9]+").find(self.rest()) else {
            return Ok(None);
        };
        let value = m.as_str().parse::<i64>().map_err(|_| self.error("index out of range"))?;
        self.pos += m.end();
        Ok(Some(value))
    }

    fn index_or_slice(&mut self) -> Result<Selector, PathError> {
        let start = self.int()?;
        self.skip_ws();
        if !self.eat(':') {
            return start.map(Selector::Index).ok_or_else(|| self.error("expected index"));
        }

        self.skip_ws();
        let end = self.int()?;
        self.skip_ws();
        let step = if self.eat(':') {
            self.skip_ws();
            self.int()?.unwrap_or(1)
        } else {
            1
        };
        if step == 0 {
            return Err(self.error("slice step cannot be zero"));
        }
        Ok(Selector::Slice { start, end, step })
    }
}
