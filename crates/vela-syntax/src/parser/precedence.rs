//! Operator tables for expression parsing.
//!
//! Binding strength and associativity come from
//! [`TokenKind::operator_info`]; this module maps operator tokens to the
//! AST operators they build and answers the reverse question for the
//! printer.

use crate::ast::{BinaryOperator, NodeKind, UnaryOperator};
use crate::token::{Associativity, InputSide, Precedence, TokenKind};

/// A binary operator usable in precedence climbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Infix {
    pub op: BinaryOperator,
    pub precedence: Precedence,
    pub associativity: Associativity,
}

/// Get the binary operator a token starts, if any.
///
/// `not` in infix position begins `not in`; `is` may be followed by `not`,
/// which the caller checks for. Assignment operators and `|>` are not
/// climbed: they are handled by the statement and trailer parsers.
pub fn infix_operator(kind: TokenKind) -> Option<Infix> {
    use BinaryOperator::*;

    let op = match kind {
        TokenKind::Plus => Add,
        TokenKind::Minus => Subtract,
        TokenKind::Star => Multiply,
        TokenKind::Slash => Divide,
        TokenKind::DoubleSlash => FloorDivide,
        TokenKind::Percent => Modulo,
        TokenKind::DoubleStar => Power,
        TokenKind::Ampersand => BitwiseAnd,
        TokenKind::Pipe => BitwiseOr,
        TokenKind::Caret => BitwiseXor,
        TokenKind::DoubleLeftAngle => LeftShift,
        TokenKind::DoubleRightAngle => RightShift,
        TokenKind::LeftAngle => Less,
        TokenKind::RightAngle => Greater,
        TokenKind::LeftAngleEquals => LessEqual,
        TokenKind::RightAngleEquals => GreaterEqual,
        TokenKind::DoubleEquals => Equal,
        TokenKind::ExclamationEquals => NotEqual,
        TokenKind::LeftRightArrow => Compare,
        TokenKind::In => In,
        TokenKind::Is => Is,
        TokenKind::DoubleQuestion => Coalesce,
        TokenKind::DoubleDot => RangeInclusive,
        TokenKind::TripleDot => RangeExclusive,
        TokenKind::And => And,
        TokenKind::Or => Or,
        TokenKind::Not => {
            return Some(Infix {
                op: NotIn,
                precedence: Precedence::Comparison,
                associativity: Associativity::Right,
            })
        }
        _ => return None,
    };
    let info = kind.operator_info()?;
    info.allows(InputSide::Infix).then_some(Infix {
        op,
        precedence: info.precedence,
        associativity: info.associativity,
    })
}

/// Get the prefix operator a token starts, if any. `not` is handled
/// separately because its operand binds at comparison level.
pub fn prefix_operator(kind: TokenKind) -> Option<UnaryOperator> {
    match kind {
        TokenKind::Plus => Some(UnaryOperator::Plus),
        TokenKind::Minus => Some(UnaryOperator::Minus),
        TokenKind::Tilde => Some(UnaryOperator::BitwiseNot),
        TokenKind::DoublePlus => Some(UnaryOperator::Increment),
        TokenKind::DoubleMinus => Some(UnaryOperator::Decrement),
        _ => None,
    }
}

pub fn postfix_operator(kind: TokenKind) -> Option<UnaryOperator> {
    match kind {
        TokenKind::DoublePlus => Some(UnaryOperator::Increment),
        TokenKind::DoubleMinus => Some(UnaryOperator::Decrement),
        _ => None,
    }
}

/// The binary operator applied by a compound assignment (`+=` -> `+`).
pub fn augmented_operator(kind: TokenKind) -> Option<BinaryOperator> {
    use BinaryOperator::*;

    let op = match kind {
        TokenKind::PlusEquals => Add,
        TokenKind::MinusEquals => Subtract,
        TokenKind::StarEquals => Multiply,
        TokenKind::SlashEquals => Divide,
        TokenKind::DoubleSlashEquals => FloorDivide,
        TokenKind::PercentEquals => Modulo,
        TokenKind::DoubleStarEquals => Power,
        TokenKind::AmpersandEquals => BitwiseAnd,
        TokenKind::PipeEquals => BitwiseOr,
        TokenKind::CaretEquals => BitwiseXor,
        TokenKind::DoubleLeftAngleEquals => LeftShift,
        TokenKind::DoubleRightAngleEquals => RightShift,
        TokenKind::DoubleQuestionEquals => Coalesce,
        _ => return None,
    };
    Some(op)
}

/// Precedence and associativity of a binary operator.
pub fn binary_precedence(op: BinaryOperator) -> (Precedence, Associativity) {
    use BinaryOperator::*;

    match op {
        Power => (Precedence::Power, Associativity::Right),
        Multiply | Divide | FloorDivide | Modulo => (Precedence::Multiplicative, Associativity::Left),
        Add | Subtract => (Precedence::Additive, Associativity::Left),
        LeftShift | RightShift => (Precedence::Shift, Associativity::Left),
        BitwiseAnd => (Precedence::BitAnd, Associativity::Left),
        BitwiseXor => (Precedence::BitXor, Associativity::Left),
        BitwiseOr => (Precedence::BitOr, Associativity::Left),
        RangeInclusive | RangeExclusive => (Precedence::Range, Associativity::Left),
        Coalesce => (Precedence::Coalesce, Associativity::Left),
        Less | Greater | LessEqual | GreaterEqual | Equal | NotEqual | Compare | In | NotIn
        | Is | IsNot => (Precedence::Comparison, Associativity::Right),
        And => (Precedence::And, Associativity::Left),
        Or => (Precedence::Or, Associativity::Left),
    }
}

/// How tightly a node binds when printed as an operand. Atoms and
/// trailers bind tighter than any operator.
pub fn node_precedence(kind: &NodeKind) -> u8 {
    match kind {
        NodeKind::Binary { op, .. } => binary_precedence(*op).0 as u8,
        NodeKind::Unary {
            op: UnaryOperator::Not,
            ..
        } => Precedence::Not as u8,
        NodeKind::Unary {
            side: InputSide::Postfix,
            ..
        } => Precedence::Postfix as u8,
        NodeKind::Unary { .. } | NodeKind::Await { .. } => Precedence::Unary as u8,
        NodeKind::Ternary { .. } => Precedence::Ternary as u8,
        NodeKind::Yield { .. } | NodeKind::Tuple { .. } | NodeKind::Comprehension { .. } => {
            Precedence::Assignment as u8
        }
        _ => Precedence::Postfix as u8 + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infix_levels() {
        let mul = infix_operator(TokenKind::Star).unwrap();
        let add = infix_operator(TokenKind::Plus).unwrap();
        assert!(mul.precedence > add.precedence);
        assert_eq!(
            infix_operator(TokenKind::DoubleStar).unwrap().associativity,
            Associativity::Right
        );
        assert_eq!(infix_operator(TokenKind::Not).unwrap().op, BinaryOperator::NotIn);
    }

    #[test]
    fn test_non_climbing_tokens() {
        assert!(infix_operator(TokenKind::Equals).is_none());
        assert!(infix_operator(TokenKind::PipeRightAngle).is_none());
        assert!(infix_operator(TokenKind::Tilde).is_none());
        assert!(infix_operator(TokenKind::DoublePlus).is_none());
    }

    #[test]
    fn test_augmented() {
        assert_eq!(augmented_operator(TokenKind::DoubleQuestionEquals), Some(BinaryOperator::Coalesce));
        assert_eq!(augmented_operator(TokenKind::Equals), None);
    }

    #[test]
    fn test_tables_agree() {
        for kind in [TokenKind::Plus, TokenKind::DoubleStar, TokenKind::In, TokenKind::Or] {
            let infix = infix_operator(kind).unwrap();
            assert_eq!(
                binary_precedence(infix.op),
                (infix.precedence, infix.associativity)
            );
        }
    }
}
