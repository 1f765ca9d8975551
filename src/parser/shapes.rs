//! The catalogue of line shapes: small finite-state machines, one per
//! statement form, encoded as data and driven by the generic matcher in
//! the parent module. A shape both classifies a token list and splits it
//! into the token groups its operator node recurses on.
//!
//! Catalogue order is semantic: the first shape that accepts a line
//! defines it, so literals and brackets come before assignment, control
//! flow before the dotted collection calls, and comparison before the
//! arithmetic forms. Rearranging this list changes the language.

use once_cell::sync::Lazy;

use crate::ast::OpKind;
use crate::lexer::TokenKind;

/// How an edge treats the token it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Consume and discard.
    Skip,
    /// The token becomes a one-token child group of its own.
    Single,
    /// The token joins the accumulating group buffer.
    Group,
}

#[derive(Debug, Clone, Copy)]
pub enum TokenMatcher {
    /// Accepts every token, the end sentinel included.
    Any,
    Is(TokenKind),
    OneOf(&'static [TokenKind]),
}

impl TokenMatcher {
    pub fn accepts(&self, kind: TokenKind) -> bool {
        match self {
            TokenMatcher::Any => true,
            TokenMatcher::Is(wanted) => *wanted == kind,
            TokenMatcher::OneOf(wanted) => wanted.contains(&kind),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub to: usize,
    pub matcher: TokenMatcher,
    pub capture: Capture,
}

/// One statement form: states are indices into `states`, each holding its
/// outgoing edges in priority order.
#[derive(Debug, Clone)]
pub struct LineShape {
    pub op: OpKind,
    pub end: usize,
    pub states: Vec<Vec<Edge>>,
}

const VALUE_DECLARATORS: &[TokenKind] = &[
    TokenKind::DeclareInteger,
    TokenKind::DeclareFloat,
    TokenKind::DeclareCharacter,
    TokenKind::DeclareString,
    TokenKind::DeclareBoolean,
    TokenKind::DeclareArray,
    TokenKind::DeclareTuple,
    TokenKind::DeclareDictionary,
];

const EMPTY_DECLARATORS: &[TokenKind] = &[
    TokenKind::DeclareStack,
    TokenKind::DeclareQueue,
    TokenKind::DeclarePriorityQueue,
];

const BINARY_BOOLEAN_KEYWORDS: &[TokenKind] = &[TokenKind::And, TokenKind::Or];

const UNARY_BOOLEAN_KEYWORDS: &[TokenKind] = &[TokenKind::Not];

const COMPARATORS: &[TokenKind] = &[
    TokenKind::IsEqualTo,
    TokenKind::IsNotEqualTo,
    TokenKind::IsGreaterThan,
    TokenKind::IsLessThan,
    TokenKind::IsGreaterThanOrEqualTo,
    TokenKind::IsLessThanOrEqualTo,
];

fn edge(to: usize, matcher: TokenMatcher, capture: Capture) -> Edge {
    Edge {
        to,
        matcher,
        capture,
    }
}

fn shape(op: OpKind, end: usize, states: Vec<Vec<Edge>>) -> LineShape {
    LineShape { op, end, states }
}

use Capture::{Group, Single, Skip};
use TokenMatcher::{Any, Is, OneOf};

/// `[a, b, …]` and `<a, b, …>`: elements split on top-level commas.
fn bracketed_list(op: OpKind, open: TokenKind, close: TokenKind) -> LineShape {
    shape(
        op,
        4,
        vec![
            vec![edge(2, Is(open), Skip)],
            vec![edge(2, Any, Group)],
            vec![
                edge(3, Is(close), Skip),
                edge(1, Is(TokenKind::Comma), Skip),
                edge(2, Any, Group),
            ],
            vec![edge(4, Is(TokenKind::End), Skip)],
        ],
    )
}

/// `target.KEYWORD(argument)`.
fn dotted_call(op: OpKind, word: TokenKind) -> LineShape {
    shape(
        op,
        7,
        vec![
            vec![edge(1, Any, Group)],
            vec![edge(2, Is(TokenKind::Dot), Skip), edge(1, Any, Group)],
            vec![edge(3, Is(word), Skip)],
            vec![edge(4, Is(TokenKind::LParen), Skip)],
            vec![edge(5, Any, Group)],
            vec![edge(6, Is(TokenKind::RParen), Skip), edge(5, Any, Group)],
            vec![edge(7, Is(TokenKind::End), Skip)],
        ],
    )
}

/// `target.KEYWORD` with no argument list.
fn dotted_plain(op: OpKind, word: TokenKind) -> LineShape {
    shape(
        op,
        4,
        vec![
            vec![edge(1, Any, Group)],
            vec![edge(2, Is(TokenKind::Dot), Skip), edge(1, Any, Group)],
            vec![edge(3, Is(word), Skip)],
            vec![edge(4, Is(TokenKind::End), Skip)],
        ],
    )
}

/// `left OPERATOR right`, split at the first top-level occurrence.
fn infix(op: OpKind, operator: TokenMatcher, capture: Capture) -> LineShape {
    shape(
        op,
        4,
        vec![
            vec![edge(1, Any, Group)],
            vec![edge(2, operator, capture), edge(1, Any, Group)],
            vec![edge(3, Any, Group)],
            vec![edge(4, Is(TokenKind::End), Skip), edge(3, Any, Group)],
        ],
    )
}

pub static CATALOGUE: Lazy<Vec<LineShape>> = Lazy::new(|| {
    vec![
        // collection literals and brackets
        bracketed_list(OpKind::ArrayLit, TokenKind::LBracket, TokenKind::RBracket),
        bracketed_list(OpKind::TupleLit, TokenKind::LAngle, TokenKind::RAngle),
        shape(
            OpKind::DictLit,
            3,
            vec![
                vec![edge(1, Is(TokenKind::LBrace), Skip)],
                vec![
                    edge(2, Is(TokenKind::RBrace), Skip),
                    edge(1, Is(TokenKind::Comma), Skip),
                    edge(1, Any, Group),
                ],
                vec![edge(3, Is(TokenKind::End), Skip)],
            ],
        ),
        shape(
            OpKind::Brackets,
            4,
            vec![
                vec![edge(1, Is(TokenKind::LParen), Skip)],
                vec![edge(2, Any, Group)],
                vec![edge(3, Is(TokenKind::RParen), Skip), edge(2, Any, Group)],
                vec![edge(4, Is(TokenKind::End), Skip)],
            ],
        ),
        // assignment
        shape(
            OpKind::Assignment,
            4,
            vec![
                vec![edge(1, Is(TokenKind::Name), Single)],
                vec![edge(2, Is(TokenKind::Equals), Skip)],
                vec![edge(3, Any, Group)],
                vec![edge(4, Is(TokenKind::End), Skip), edge(3, Any, Group)],
            ],
        ),
        // declarations
        shape(
            OpKind::Declaration,
            5,
            vec![
                vec![edge(1, OneOf(VALUE_DECLARATORS), Single)],
                vec![edge(2, Is(TokenKind::Name), Single)],
                vec![edge(3, Is(TokenKind::Equals), Skip)],
                vec![edge(4, Any, Group)],
                vec![edge(5, Is(TokenKind::End), Skip), edge(4, Any, Group)],
            ],
        ),
        shape(
            OpKind::EmptyDeclaration,
            3,
            vec![
                vec![edge(1, OneOf(EMPTY_DECLARATORS), Single)],
                vec![edge(2, Is(TokenKind::Name), Single)],
                vec![edge(3, Is(TokenKind::End), Skip)],
            ],
        ),
        // control flow
        shape(
            OpKind::If,
            4,
            vec![
                vec![edge(1, Is(TokenKind::If), Skip)],
                vec![edge(2, Any, Group)],
                vec![edge(3, Is(TokenKind::Do), Skip), edge(2, Any, Group)],
                vec![edge(4, Is(TokenKind::End), Skip)],
            ],
        ),
        shape(
            OpKind::While,
            4,
            vec![
                vec![edge(1, Is(TokenKind::While), Skip)],
                vec![edge(2, Any, Group)],
                vec![edge(3, Is(TokenKind::Do), Skip), edge(2, Any, Group)],
                vec![edge(4, Is(TokenKind::End), Skip)],
            ],
        ),
        shape(
            OpKind::For,
            6,
            vec![
                vec![edge(1, Is(TokenKind::For), Skip)],
                vec![edge(2, Is(TokenKind::Name), Single)],
                vec![edge(3, Is(TokenKind::In), Skip)],
                vec![edge(4, Any, Group)],
                vec![edge(5, Is(TokenKind::Do), Skip), edge(4, Any, Group)],
                vec![edge(6, Is(TokenKind::End), Skip)],
            ],
        ),
        // output, arguments split on top-level commas
        shape(
            OpKind::Output,
            5,
            vec![
                vec![edge(1, Is(TokenKind::Output), Skip)],
                vec![edge(2, Is(TokenKind::LParen), Skip)],
                vec![edge(3, Any, Group)],
                vec![
                    edge(4, Is(TokenKind::RParen), Skip),
                    edge(2, Is(TokenKind::Comma), Skip),
                    edge(3, Any, Group),
                ],
                vec![edge(5, Is(TokenKind::End), Skip)],
            ],
        ),
        // length
        shape(
            OpKind::Length,
            5,
            vec![
                vec![edge(1, Is(TokenKind::Length), Skip)],
                vec![edge(2, Is(TokenKind::LParen), Skip)],
                vec![edge(3, Any, Group)],
                vec![edge(4, Is(TokenKind::RParen), Skip), edge(3, Any, Group)],
                vec![edge(5, Is(TokenKind::End), Skip)],
            ],
        ),
        // dotted collection operations
        dotted_call(OpKind::Index, TokenKind::ReadByIndex),
        shape(
            OpKind::Append,
            7,
            vec![
                vec![edge(1, Is(TokenKind::Name), Single)],
                vec![edge(2, Is(TokenKind::Dot), Skip)],
                vec![edge(3, Is(TokenKind::Append), Skip)],
                vec![edge(4, Is(TokenKind::LParen), Skip)],
                vec![edge(5, Any, Group)],
                vec![edge(6, Is(TokenKind::RParen), Skip), edge(5, Any, Group)],
                vec![edge(7, Is(TokenKind::End), Skip)],
            ],
        ),
        // the two-argument ADDITEM form must come before the one-argument
        // form, otherwise the comma would never split
        shape(
            OpKind::PriorityAdd,
            9,
            vec![
                vec![edge(1, Any, Group)],
                vec![edge(2, Is(TokenKind::Dot), Skip), edge(1, Any, Group)],
                vec![edge(3, Is(TokenKind::AddItem), Skip)],
                vec![edge(4, Is(TokenKind::LParen), Skip)],
                vec![edge(5, Any, Group)],
                vec![edge(6, Is(TokenKind::Comma), Skip), edge(5, Any, Group)],
                vec![edge(7, Any, Group)],
                vec![edge(8, Is(TokenKind::RParen), Skip), edge(7, Any, Group)],
                vec![edge(9, Is(TokenKind::End), Skip)],
            ],
        ),
        dotted_call(OpKind::CollectionAdd, TokenKind::AddItem),
        dotted_plain(OpKind::CollectionRead, TokenKind::ReadItem),
        dotted_plain(OpKind::CollectionPop, TokenKind::PopItem),
        dotted_call(OpKind::DictInsert, TokenKind::InsertPair),
        dotted_call(OpKind::DictLookup, TokenKind::LookupValue),
        dotted_call(OpKind::DictRemove, TokenKind::RemovePair),
        dotted_plain(OpKind::DictKeys, TokenKind::ListKeys),
        // key:value pair
        shape(
            OpKind::Pair,
            4,
            vec![
                vec![edge(1, Any, Group)],
                vec![edge(2, Is(TokenKind::Colon), Skip), edge(1, Any, Group)],
                vec![edge(3, Any, Group)],
                vec![edge(4, Is(TokenKind::End), Skip), edge(3, Any, Group)],
            ],
        ),
        // boolean logic and comparison; the keyword token is kept as a
        // child so the evaluator can see which one fired
        infix(OpKind::BoolBinary, OneOf(BINARY_BOOLEAN_KEYWORDS), Single),
        shape(
            OpKind::BoolUnary,
            3,
            vec![
                vec![edge(1, OneOf(UNARY_BOOLEAN_KEYWORDS), Single)],
                vec![edge(2, Any, Group)],
                vec![edge(3, Is(TokenKind::End), Skip), edge(2, Any, Group)],
            ],
        ),
        infix(OpKind::Comparison, OneOf(COMPARATORS), Single),
        // arithmetic
        infix(OpKind::Sub, Is(TokenKind::Minus), Skip),
        infix(OpKind::Add, Is(TokenKind::Plus), Skip),
        infix(OpKind::Mul, Is(TokenKind::Times), Skip),
        infix(OpKind::Div, Is(TokenKind::Divide), Skip),
        infix(OpKind::IntDiv, Is(TokenKind::IntDivide), Skip),
        infix(OpKind::Mod, Is(TokenKind::Modulo), Skip),
    ]
});
