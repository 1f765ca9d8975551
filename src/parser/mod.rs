//! # Parser
//!
//! Recognises one lexed line against the ordered catalogue of line
//! shapes. The matcher walks a shape's states over the token list,
//! collecting captured token groups as it goes; on acceptance the line
//! becomes an operator node whose children are parsed recursively from
//! the groups. A token list of one real token is a leaf, a bare `End` is
//! the empty line.
//!
//! While a shape runs, four counters track the balance of the bracket
//! families inside the group buffer. No skipping or single-capture edge
//! may fire while any counter is off zero, which keeps bracketed
//! sub-expressions intact for the recursive pass instead of letting a
//! top-level operator split them.

mod shapes;

pub use shapes::*;

use std::{error::Error, fmt::Display};

use crate::ast::{AstNode, OpKind};
use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ParseError {}

/// Parse one lexed line into its AST.
pub fn parse_line(tokens: &[Token]) -> Result<AstNode, ParseError> {
    match tokens.len() {
        0 => Err(ParseError::new("cannot parse an unterminated token list")),
        1 => Ok(AstNode::Leaf(Token::EmptyLine)),
        2 => Ok(AstNode::Leaf(tokens[0].clone())),
        _ => {
            let (op, groups) = split_tokens(tokens)?;
            let mut children = Vec::with_capacity(groups.len());
            for group in &groups {
                children.push(parse_line(group)?);
            }
            Ok(AstNode::Operator { op, children })
        }
    }
}

/// Try every shape in catalogue order; the first acceptance wins.
fn split_tokens(tokens: &[Token]) -> Result<(OpKind, Vec<Vec<Token>>), ParseError> {
    for shape in CATALOGUE.iter() {
        if let Some(groups) = run_shape(shape, tokens) {
            return Ok((shape.op, groups));
        }
    }
    Err(ParseError::new(format!(
        "no valid pattern for '{}'",
        render(tokens)
    )))
}

/// Drive one shape over the token list. Returns the captured groups on
/// acceptance, `None` as soon as no edge fits or the tokens run out.
fn run_shape(shape: &LineShape, tokens: &[Token]) -> Option<Vec<Vec<Token>>> {
    let mut state = 0;
    let mut groups: Vec<Vec<Token>> = Vec::new();
    let mut buffer: Vec<Token> = Vec::new();
    let mut brackets = [0i32; 4];
    let mut index = 0;

    loop {
        let token = &tokens[index];
        let balanced = brackets.iter().all(|&count| count == 0);

        let edge = shape.states.get(state)?.iter().find(|edge| {
            (balanced || edge.capture == Capture::Group) && edge.matcher.accepts(token.kind())
        })?;

        match edge.capture {
            Capture::Group => {
                if let Some((family, delta)) = bracket_delta(token.kind()) {
                    brackets[family] += delta;
                }
                buffer.push(token.clone());
            }
            Capture::Skip | Capture::Single => {
                if !buffer.is_empty() {
                    buffer.push(Token::End);
                    groups.push(std::mem::take(&mut buffer));
                }
                if edge.capture == Capture::Single {
                    groups.push(vec![token.clone(), Token::End]);
                }
            }
        }

        state = edge.to;
        if state == shape.end {
            return Some(groups);
        }
        if index == tokens.len() - 1 {
            return None;
        }
        index += 1;
    }
}

fn bracket_delta(kind: TokenKind) -> Option<(usize, i32)> {
    match kind {
        TokenKind::LParen => Some((0, 1)),
        TokenKind::RParen => Some((0, -1)),
        TokenKind::LBracket => Some((1, 1)),
        TokenKind::RBracket => Some((1, -1)),
        TokenKind::LBrace => Some((2, 1)),
        TokenKind::RBrace => Some((2, -1)),
        TokenKind::LAngle => Some((3, 1)),
        TokenKind::RAngle => Some((3, -1)),
        _ => None,
    }
}

fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|token| !matches!(token, Token::End))
        .map(Token::lexeme)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(line: &str) -> AstNode {
        parse_line(&tokenize(line).unwrap()).unwrap()
    }

    fn op_of(line: &str) -> OpKind {
        match parse(line) {
            AstNode::Operator { op, .. } => op,
            leaf => panic!("expected an operator node, got {leaf:?}"),
        }
    }

    #[test]
    fn test_empty_line_is_a_leaf() {
        assert_eq!(AstNode::Leaf(Token::EmptyLine), parse(""));
    }

    #[test]
    fn test_single_token_is_a_leaf() {
        assert_eq!(AstNode::Leaf(Token::EndIf), parse("ENDIF"));
    }

    #[test]
    fn test_classification() {
        assert_eq!(OpKind::Assignment, op_of("x = 1"));
        assert_eq!(OpKind::Declaration, op_of("INTEGER x = 1"));
        assert_eq!(OpKind::EmptyDeclaration, op_of("STACK s"));
        assert_eq!(OpKind::If, op_of("IF x ISEQUALTO 1 DO"));
        assert_eq!(OpKind::While, op_of("WHILE x ISLESSTHAN 3 DO"));
        assert_eq!(OpKind::For, op_of("FOR x IN xs DO"));
        assert_eq!(OpKind::Output, op_of("OUTPUT(x)"));
        assert_eq!(OpKind::Length, op_of("LENGTH(xs)"));
        assert_eq!(OpKind::ArrayLit, op_of("[1, 2]"));
        assert_eq!(OpKind::TupleLit, op_of("<1, 2>"));
        assert_eq!(OpKind::DictLit, op_of("{\"a\":1}"));
        assert_eq!(OpKind::Index, op_of("s.READBYINDEX(1)"));
        assert_eq!(OpKind::Append, op_of("xs.APPEND(4)"));
        assert_eq!(OpKind::PriorityAdd, op_of("q.ADDITEM(\"hi\", 5)"));
        assert_eq!(OpKind::CollectionAdd, op_of("q.ADDITEM(5)"));
        assert_eq!(OpKind::CollectionRead, op_of("q.READITEM"));
        assert_eq!(OpKind::CollectionPop, op_of("q.POPITEM"));
        assert_eq!(OpKind::DictInsert, op_of("d.INSERTPAIR(\"c\":3)"));
        assert_eq!(OpKind::DictLookup, op_of("d.LOOKUPVALUE(\"b\")"));
        assert_eq!(OpKind::DictRemove, op_of("d.REMOVEPAIR(\"a\")"));
        assert_eq!(OpKind::DictKeys, op_of("d.LISTKEYS"));
        assert_eq!(OpKind::BoolBinary, op_of("a AND b"));
        assert_eq!(OpKind::BoolUnary, op_of("NOT a"));
        assert_eq!(OpKind::Comparison, op_of("a ISLESSTHAN b"));
        assert_eq!(OpKind::Sub, op_of("a - b"));
        assert_eq!(OpKind::Add, op_of("a + b"));
        assert_eq!(OpKind::Mod, op_of("a % b"));
    }

    #[test]
    fn test_assignment_splits_name_and_expression() {
        let AstNode::Operator { op, children } = parse("total = total + x") else {
            panic!("expected operator");
        };
        assert_eq!(OpKind::Assignment, op);
        assert_eq!(2, children.len());
        assert_eq!(AstNode::Leaf(Token::Name("total".into())), children[0]);
        assert!(matches!(
            children[1],
            AstNode::Operator {
                op: OpKind::Add,
                ..
            }
        ));
    }

    #[test]
    fn test_comparator_token_is_kept_as_child() {
        let AstNode::Operator { children, .. } = parse("n ISLESSTHAN 3") else {
            panic!("expected operator");
        };
        assert_eq!(AstNode::Leaf(Token::IsLessThan), children[1]);
    }

    #[test]
    fn test_brackets_keep_subexpressions_intact() {
        // the inner call's parentheses must not let OUTPUT's closing
        // bracket edge fire early
        let AstNode::Operator { op, children } = parse("OUTPUT(d.LOOKUPVALUE(\"b\"))") else {
            panic!("expected operator");
        };
        assert_eq!(OpKind::Output, op);
        assert_eq!(1, children.len());
        assert!(matches!(
            children[0],
            AstNode::Operator {
                op: OpKind::DictLookup,
                ..
            }
        ));
    }

    #[test]
    fn test_output_splits_on_top_level_commas_only() {
        let AstNode::Operator { children, .. } = parse("OUTPUT([1, 2], x)") else {
            panic!("expected operator");
        };
        assert_eq!(2, children.len());
        assert!(matches!(
            children[0],
            AstNode::Operator {
                op: OpKind::ArrayLit,
                ..
            }
        ));
    }

    #[test]
    fn test_dict_literal_splits_into_pairs() {
        let AstNode::Operator { children, .. } = parse("{\"a\":1, \"b\":2}") else {
            panic!("expected operator");
        };
        assert_eq!(2, children.len());
        for child in children {
            assert!(matches!(
                child,
                AstNode::Operator {
                    op: OpKind::Pair,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_empty_collection_literals() {
        assert!(matches!(
            parse("[]"),
            AstNode::Operator { op: OpKind::ArrayLit, children } if children.is_empty()
        ));
        assert!(matches!(
            parse("{}"),
            AstNode::Operator { op: OpKind::DictLit, children } if children.is_empty()
        ));
    }

    #[test]
    fn test_subtraction_splits_at_first_operator() {
        let AstNode::Operator { op, children } = parse("a - b - c") else {
            panic!("expected operator");
        };
        assert_eq!(OpKind::Sub, op);
        assert_eq!(AstNode::Leaf(Token::Name("a".into())), children[0]);
        assert!(matches!(
            children[1],
            AstNode::Operator {
                op: OpKind::Sub,
                ..
            }
        ));
    }

    #[test]
    fn test_no_shape_accepts() {
        let tokens = tokenize("INTEGER = 4").unwrap();
        assert!(parse_line(&tokens).is_err());
    }

    #[test]
    fn test_round_trip_through_source() {
        let lines = [
            "INTEGER a = 3",
            "x = a + b",
            "FOR x IN xs DO",
            "WHILE n ISLESSTHAN 3 DO",
            "OUTPUT(a, \"text\", [1, 2])",
            "d.INSERTPAIR(\"c\":3)",
            "q.ADDITEM(\"low\", 1)",
            "s.READBYINDEX([1, 4])",
            "NOT a AND b",
            "{\"a\":1, \"b\":2}",
        ];
        for line in lines {
            let first = parse(line);
            let second = parse(&first.to_source());
            assert_eq!(first, second, "round trip changed '{line}'");
        }
    }
}
