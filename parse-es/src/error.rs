use crate::loc::Loc;
use crate::token::TT;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use std::error::Error;
use std::fmt::Display;

/// A stable classification of syntax errors produced by the scanner and parser.
///
/// Diagnostic codes (prefix `PS`) are assigned per variant and are stable:
/// - `PS0001`: [`SyntaxErrorType::BreakOutsideLoop`]
/// - `PS0002`: [`SyntaxErrorType::ContinueNonLoopLabel`]
/// - `PS0003`: [`SyntaxErrorType::ContinueOutsideLoop`]
/// - `PS0004`: [`SyntaxErrorType::DuplicateLabel`]
/// - `PS0005`: [`SyntaxErrorType::ExpectedSyntax`]
/// - `PS0006`: [`SyntaxErrorType::IllegalCharacter`]
/// - `PS0007`: [`SyntaxErrorType::InvalidAssignmentTarget`]
/// - `PS0008`: [`SyntaxErrorType::InvalidEscape`]
/// - `PS0009`: [`SyntaxErrorType::InvalidForInTarget`]
/// - `PS0010`: [`SyntaxErrorType::InvalidLabel`]
/// - `PS0011`: [`SyntaxErrorType::InvalidPropertyId`]
/// - `PS0012`: [`SyntaxErrorType::InvalidRegexFlag`]
/// - `PS0013`: [`SyntaxErrorType::LineTerminatorAfterThrow`]
/// - `PS0014`: [`SyntaxErrorType::MalformedLiteralNumber`]
/// - `PS0015`: [`SyntaxErrorType::MissingExponent`]
/// - `PS0016`: [`SyntaxErrorType::MissingSemicolon`]
/// - `PS0017`: [`SyntaxErrorType::MultipleDefaults`]
/// - `PS0018`: [`SyntaxErrorType::MultipleForInVariables`]
/// - `PS0019`: [`SyntaxErrorType::NestingTooDeep`]
/// - `PS0020`: [`SyntaxErrorType::RequiredTokenNotFound`]
/// - `PS0021`: [`SyntaxErrorType::ReservedIdentifier`]
/// - `PS0022`: [`SyntaxErrorType::ReturnOutsideFunction`]
/// - `PS0023`: [`SyntaxErrorType::TryStatementHasNoCatchOrFinally`]
/// - `PS0024`: [`SyntaxErrorType::UndefinedLabel`]
/// - `PS0025`: [`SyntaxErrorType::UnexpectedEnd`]
/// - `PS0026`: [`SyntaxErrorType::UnreachableCatch`]
/// - `PS0027`: [`SyntaxErrorType::UnterminatedComment`]
/// - `PS0028`: [`SyntaxErrorType::UnterminatedRegex`]
/// - `PS0029`: [`SyntaxErrorType::UnterminatedString`]
/// - `PS0030`: [`SyntaxErrorType::InvalidSwitch`]
/// - `PS0031`: [`SyntaxErrorType::MissingFormalParameter`]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  BreakOutsideLoop,
  ContinueNonLoopLabel,
  ContinueOutsideLoop,
  DuplicateLabel,
  ExpectedSyntax(&'static str),
  IllegalCharacter,
  InvalidAssignmentTarget,
  InvalidEscape,
  InvalidForInTarget,
  InvalidLabel,
  InvalidPropertyId,
  InvalidRegexFlag,
  LineTerminatorAfterThrow,
  MalformedLiteralNumber,
  MissingExponent,
  MissingSemicolon,
  MultipleDefaults,
  MultipleForInVariables,
  NestingTooDeep,
  RequiredTokenNotFound(TT),
  ReservedIdentifier,
  ReturnOutsideFunction,
  TryStatementHasNoCatchOrFinally,
  UndefinedLabel,
  UnexpectedEnd,
  UnreachableCatch,
  UnterminatedComment,
  UnterminatedRegex,
  UnterminatedString,
  InvalidSwitch,
  MissingFormalParameter,
}

#[derive(Clone)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  pub loc: Loc,
  pub actual_token: Option<TT>,
}

impl SyntaxError {
  pub fn new(typ: SyntaxErrorType, loc: Loc, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError {
      typ,
      loc,
      actual_token,
    }
  }

  /// Whether the scanner had reached the end of a source of `source_len` bytes when this error was raised, meaning more input could still fix it.
  pub fn at_eof(&self, source_len: usize) -> bool {
    self.actual_token == Some(TT::EOF) || self.loc.1 >= source_len
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.typ.message(self.actual_token))
  }
}

impl Error for SyntaxError {}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;

impl SyntaxErrorType {
  /// Stable diagnostic code for this syntax error variant.
  pub fn code(&self) -> &'static str {
    match self {
      SyntaxErrorType::BreakOutsideLoop => "PS0001",
      SyntaxErrorType::ContinueNonLoopLabel => "PS0002",
      SyntaxErrorType::ContinueOutsideLoop => "PS0003",
      SyntaxErrorType::DuplicateLabel => "PS0004",
      SyntaxErrorType::ExpectedSyntax(_) => "PS0005",
      SyntaxErrorType::IllegalCharacter => "PS0006",
      SyntaxErrorType::InvalidAssignmentTarget => "PS0007",
      SyntaxErrorType::InvalidEscape => "PS0008",
      SyntaxErrorType::InvalidForInTarget => "PS0009",
      SyntaxErrorType::InvalidLabel => "PS0010",
      SyntaxErrorType::InvalidPropertyId => "PS0011",
      SyntaxErrorType::InvalidRegexFlag => "PS0012",
      SyntaxErrorType::LineTerminatorAfterThrow => "PS0013",
      SyntaxErrorType::MalformedLiteralNumber => "PS0014",
      SyntaxErrorType::MissingExponent => "PS0015",
      SyntaxErrorType::MissingSemicolon => "PS0016",
      SyntaxErrorType::MultipleDefaults => "PS0017",
      SyntaxErrorType::MultipleForInVariables => "PS0018",
      SyntaxErrorType::NestingTooDeep => "PS0019",
      SyntaxErrorType::RequiredTokenNotFound(_) => "PS0020",
      SyntaxErrorType::ReservedIdentifier => "PS0021",
      SyntaxErrorType::ReturnOutsideFunction => "PS0022",
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => "PS0023",
      SyntaxErrorType::UndefinedLabel => "PS0024",
      SyntaxErrorType::UnexpectedEnd => "PS0025",
      SyntaxErrorType::UnreachableCatch => "PS0026",
      SyntaxErrorType::UnterminatedComment => "PS0027",
      SyntaxErrorType::UnterminatedRegex => "PS0028",
      SyntaxErrorType::UnterminatedString => "PS0029",
      SyntaxErrorType::InvalidSwitch => "PS0030",
      SyntaxErrorType::MissingFormalParameter => "PS0031",
    }
  }

  /// Human-readable description of the error, incorporating the token that was found if available.
  pub fn message(&self, actual_token: Option<TT>) -> String {
    let base = match self {
      SyntaxErrorType::BreakOutsideLoop => {
        "unlabelled break must be inside loop or switch".to_string()
      }
      SyntaxErrorType::ContinueNonLoopLabel => {
        "continue can only use labels of iteration statements".to_string()
      }
      SyntaxErrorType::ContinueOutsideLoop => "continue must be inside loop".to_string(),
      SyntaxErrorType::DuplicateLabel => "duplicate label".to_string(),
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {expected}"),
      SyntaxErrorType::IllegalCharacter => "illegal character".to_string(),
      SyntaxErrorType::InvalidAssignmentTarget => "invalid assignment left-hand side".to_string(),
      SyntaxErrorType::InvalidEscape => "invalid Unicode escape sequence".to_string(),
      SyntaxErrorType::InvalidForInTarget => "invalid for/in left-hand side".to_string(),
      SyntaxErrorType::InvalidLabel => "invalid label".to_string(),
      SyntaxErrorType::InvalidPropertyId => "invalid property id".to_string(),
      SyntaxErrorType::InvalidRegexFlag => {
        "invalid flag after regular expression".to_string()
      }
      SyntaxErrorType::LineTerminatorAfterThrow => {
        "line terminator is not allowed between throw and its expression".to_string()
      }
      SyntaxErrorType::MalformedLiteralNumber => "malformed number literal".to_string(),
      SyntaxErrorType::MissingExponent => "missing exponent".to_string(),
      SyntaxErrorType::MissingSemicolon => "missing ; before statement".to_string(),
      SyntaxErrorType::MultipleDefaults => "more than one switch default".to_string(),
      SyntaxErrorType::MultipleForInVariables => {
        "invalid for/in left-hand side: more than one variable".to_string()
      }
      SyntaxErrorType::NestingTooDeep => {
        "expression or statement nested too deeply".to_string()
      }
      SyntaxErrorType::RequiredTokenNotFound(tt) => format!("missing {}", token_display(*tt)),
      SyntaxErrorType::ReservedIdentifier => "identifier is a reserved word".to_string(),
      SyntaxErrorType::ReturnOutsideFunction => "invalid return".to_string(),
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => {
        "'try' without 'catch' or 'finally'".to_string()
      }
      SyntaxErrorType::UndefinedLabel => "undefined label".to_string(),
      SyntaxErrorType::UnexpectedEnd => "unexpected end of input".to_string(),
      SyntaxErrorType::UnreachableCatch => {
        "any catch clauses following an unqualified catch are unreachable".to_string()
      }
      SyntaxErrorType::UnterminatedComment => "unterminated comment".to_string(),
      SyntaxErrorType::UnterminatedRegex => {
        "unterminated regular expression literal".to_string()
      }
      SyntaxErrorType::UnterminatedString => "unterminated string literal".to_string(),
      SyntaxErrorType::InvalidSwitch => "invalid switch statement".to_string(),
      SyntaxErrorType::MissingFormalParameter => "missing formal parameter".to_string(),
    };
    match actual_token {
      Some(TT::EOF) if *self != SyntaxErrorType::UnexpectedEnd => {
        format!("{base} (found end of input)")
      }
      _ => base,
    }
  }
}

fn token_display(tt: TT) -> &'static str {
  match tt {
    TT::BraceClose => "}",
    TT::BraceOpen => "{",
    TT::BracketClose => "]",
    TT::Colon => ":",
    TT::Identifier => "identifier",
    TT::KeywordWhile => "while",
    TT::ParenthesisClose => ")",
    TT::ParenthesisOpen => "(",
    TT::Semicolon => ";",
    _ => "token",
  }
}
