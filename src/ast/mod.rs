//! AST nodes for BP. Every source line parses into exactly one tree:
//! either a lone [`Leaf`](AstNode::Leaf) wrapping a single token, or an
//! [`Operator`](AstNode::Operator) node whose children were recursively
//! parsed from the token groups its line shape captured.

use std::fmt::Display;

use crate::lexer::Token;

/// The operation an operator node performs. One variant per line shape in
/// the parser's catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Brackets,
    ArrayLit,
    TupleLit,
    DictLit,
    Assignment,
    Declaration,
    EmptyDeclaration,
    If,
    While,
    For,
    Output,
    Length,
    Index,
    Append,
    PriorityAdd,
    CollectionAdd,
    CollectionRead,
    CollectionPop,
    DictInsert,
    DictLookup,
    DictRemove,
    DictKeys,
    Pair,
    BoolBinary,
    BoolUnary,
    Comparison,
    Sub,
    Add,
    Mul,
    Div,
    IntDiv,
    Mod,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Leaf(Token),
    Operator { op: OpKind, children: Vec<AstNode> },
}

impl AstNode {
    /// Render this tree back to a canonical line of BP source. Parsing
    /// the result yields an equal tree (redundant brackets aside, which
    /// the parser never records in the first place).
    pub fn to_source(&self) -> String {
        match self {
            AstNode::Leaf(token) => token.lexeme(),
            AstNode::Operator { op, children } => {
                let child = |index: usize| {
                    children
                        .get(index)
                        .map(AstNode::to_source)
                        .unwrap_or_default()
                };
                let all = || {
                    children
                        .iter()
                        .map(AstNode::to_source)
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                match op {
                    OpKind::Brackets => format!("({})", child(0)),
                    OpKind::ArrayLit => format!("[{}]", all()),
                    OpKind::TupleLit => format!("<{}>", all()),
                    OpKind::DictLit => format!("{{{}}}", all()),
                    OpKind::Pair => format!("{}:{}", child(0), child(1)),
                    OpKind::Assignment => format!("{} = {}", child(0), child(1)),
                    OpKind::Declaration => {
                        format!("{} {} = {}", child(0), child(1), child(2))
                    }
                    OpKind::EmptyDeclaration => format!("{} {}", child(0), child(1)),
                    OpKind::If => format!("IF {} DO", child(0)),
                    OpKind::While => format!("WHILE {} DO", child(0)),
                    OpKind::For => format!("FOR {} IN {} DO", child(0), child(1)),
                    OpKind::Output => format!("OUTPUT({})", all()),
                    OpKind::Length => format!("LENGTH({})", child(0)),
                    OpKind::Index => format!("{}.READBYINDEX({})", child(0), child(1)),
                    OpKind::Append => format!("{}.APPEND({})", child(0), child(1)),
                    OpKind::PriorityAdd => {
                        format!("{}.ADDITEM({}, {})", child(0), child(1), child(2))
                    }
                    OpKind::CollectionAdd => format!("{}.ADDITEM({})", child(0), child(1)),
                    OpKind::CollectionRead => format!("{}.READITEM", child(0)),
                    OpKind::CollectionPop => format!("{}.POPITEM", child(0)),
                    OpKind::DictInsert => format!("{}.INSERTPAIR({})", child(0), child(1)),
                    OpKind::DictLookup => format!("{}.LOOKUPVALUE({})", child(0), child(1)),
                    OpKind::DictRemove => format!("{}.REMOVEPAIR({})", child(0), child(1)),
                    OpKind::DictKeys => format!("{}.LISTKEYS", child(0)),
                    OpKind::BoolBinary | OpKind::Comparison => {
                        format!("{} {} {}", child(0), child(1), child(2))
                    }
                    OpKind::BoolUnary => format!("{} {}", child(0), child(1)),
                    OpKind::Sub => format!("{} - {}", child(0), child(1)),
                    OpKind::Add => format!("{} + {}", child(0), child(1)),
                    OpKind::Mul => format!("{} * {}", child(0), child(1)),
                    OpKind::Div => format!("{} / {}", child(0), child(1)),
                    OpKind::IntDiv => format!("{} // {}", child(0), child(1)),
                    OpKind::Mod => format!("{} % {}", child(0), child(1)),
                }
            }
        }
    }
}

impl Display for AstNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_source())
    }
}
