use crate::ir::BinaryOp;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use once_cell::sync::Lazy;

/// A binary-position operator. `&&` and `||` are kept apart because they short-circuit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Infix {
  And,
  Or,
  Op(BinaryOp),
}

/// Operator and precedence, higher binds tighter. All of these are left-associative.
#[rustfmt::skip]
pub static INFIX_OPERATOR_MAPPING: Lazy<HashMap<TT, (Infix, u8)>> = Lazy::new(|| {
  let mut map = HashMap::<TT, (Infix, u8)>::new();
  map.insert(TT::BarBar, (Infix::Or, 1));
  map.insert(TT::AmpersandAmpersand, (Infix::And, 2));
  map.insert(TT::Bar, (Infix::Op(BinaryOp::BitOr), 3));
  map.insert(TT::Caret, (Infix::Op(BinaryOp::BitXor), 4));
  map.insert(TT::Ampersand, (Infix::Op(BinaryOp::BitAnd), 5));
  map.insert(TT::EqualsEquals, (Infix::Op(BinaryOp::Eq), 6));
  map.insert(TT::ExclamationEquals, (Infix::Op(BinaryOp::Ne), 6));
  map.insert(TT::EqualsEqualsEquals, (Infix::Op(BinaryOp::StrictEq), 6));
  map.insert(TT::ExclamationEqualsEquals, (Infix::Op(BinaryOp::StrictNe), 6));
  map.insert(TT::ChevronLeft, (Infix::Op(BinaryOp::Lt), 7));
  map.insert(TT::ChevronLeftEquals, (Infix::Op(BinaryOp::Le), 7));
  map.insert(TT::ChevronRight, (Infix::Op(BinaryOp::Gt), 7));
  map.insert(TT::ChevronRightEquals, (Infix::Op(BinaryOp::Ge), 7));
  map.insert(TT::KeywordIn, (Infix::Op(BinaryOp::In), 7));
  map.insert(TT::KeywordInstanceof, (Infix::Op(BinaryOp::Instanceof), 7));
  map.insert(TT::ChevronLeftChevronLeft, (Infix::Op(BinaryOp::Shl), 8));
  map.insert(TT::ChevronRightChevronRight, (Infix::Op(BinaryOp::Shr), 8));
  map.insert(TT::ChevronRightChevronRightChevronRight, (Infix::Op(BinaryOp::UShr), 8));
  map.insert(TT::Plus, (Infix::Op(BinaryOp::Add), 9));
  map.insert(TT::Hyphen, (Infix::Op(BinaryOp::Sub), 9));
  map.insert(TT::Asterisk, (Infix::Op(BinaryOp::Mul), 10));
  map.insert(TT::Slash, (Infix::Op(BinaryOp::Div), 10));
  map.insert(TT::Percent, (Infix::Op(BinaryOp::Mod), 10));
  map
});

/// The operation a compound assignment token performs, or None for plain `=`.
#[rustfmt::skip]
pub static ASSIGNMENT_OPERATOR_MAPPING: Lazy<HashMap<TT, Option<BinaryOp>>> = Lazy::new(|| {
  let mut map = HashMap::<TT, Option<BinaryOp>>::new();
  map.insert(TT::Equals, None);
  map.insert(TT::AmpersandEquals, Some(BinaryOp::BitAnd));
  map.insert(TT::AsteriskEquals, Some(BinaryOp::Mul));
  map.insert(TT::BarEquals, Some(BinaryOp::BitOr));
  map.insert(TT::CaretEquals, Some(BinaryOp::BitXor));
  map.insert(TT::ChevronLeftChevronLeftEquals, Some(BinaryOp::Shl));
  map.insert(TT::ChevronRightChevronRightChevronRightEquals, Some(BinaryOp::UShr));
  map.insert(TT::ChevronRightChevronRightEquals, Some(BinaryOp::Shr));
  map.insert(TT::HyphenEquals, Some(BinaryOp::Sub));
  map.insert(TT::PercentEquals, Some(BinaryOp::Mod));
  map.insert(TT::PlusEquals, Some(BinaryOp::Add));
  map.insert(TT::SlashEquals, Some(BinaryOp::Div));
  map
});
