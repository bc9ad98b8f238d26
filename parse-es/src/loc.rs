use crate::char::ECMASCRIPT_LINE_TERMINATORS;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TT;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;

/// A half-open byte range within the source. Offsets are UTF-8 byte offsets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn error(self, typ: SyntaxErrorType, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError::new(typ, self, actual_token)
  }

  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  pub fn add(self, other: Loc) -> Loc {
    let mut new = self;
    new.extend(other);
    new
  }
}

/// Where a byte offset lies in the source, in the terms error reporters expect.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
  /// 1-based, already shifted by the starting line the source was supplied with.
  pub line: u32,
  /// 0-based, counted in characters from the start of the line.
  pub column: u32,
}

/// Precomputed line starts for a source text.
///
/// `\r\n` counts as a single line break, as do lone `\r`, `\n`, U+2028 and U+2029.
#[derive(Clone, Debug)]
pub struct LineIndex {
  line_starts: Vec<usize>,
  base_line: u32,
}

impl LineIndex {
  pub fn new(source: &str, base_line: u32) -> LineIndex {
    let mut line_starts = vec![0];
    let mut iter = source.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
      if !ECMASCRIPT_LINE_TERMINATORS.contains(&c) {
        continue;
      };
      if c == '\r' {
        if let Some((_, '\n')) = iter.peek() {
          iter.next();
          line_starts.push(i + 2);
          continue;
        };
      };
      line_starts.push(i + c.len_utf8());
    }
    LineIndex {
      line_starts,
      base_line: max(base_line, 1),
    }
  }

  fn line_offset(&self, offset: usize) -> usize {
    match self.line_starts.binary_search(&offset) {
      Ok(i) => i,
      Err(i) => i - 1,
    }
  }

  pub fn position(&self, source: &str, offset: usize) -> Position {
    let offset = min(offset, source.len());
    let line = self.line_offset(offset);
    let start = self.line_starts[line];
    let column = source
      .get(start..offset)
      .map(|s| s.chars().count())
      .unwrap_or(0);
    Position {
      line: self.base_line + line as u32,
      column: column as u32,
    }
  }

  pub fn line(&self, offset: usize) -> u32 {
    self.base_line + self.line_offset(offset) as u32
  }

  /// The full text of the line containing `offset`, without its terminator.
  pub fn line_text<'a>(&self, source: &'a str, offset: usize) -> &'a str {
    let offset = min(offset, source.len());
    let line = self.line_offset(offset);
    let start = self.line_starts[line];
    let rest = source.get(start..).unwrap_or("");
    let end = rest
      .find(|c| ECMASCRIPT_LINE_TERMINATORS.contains(&c))
      .unwrap_or(rest.len());
    &rest[..end]
  }
}
