use crate::interpreter::{Value, ValueKind};

/// One lexeme of a BP source line, or one of the internal tokens the
/// evaluator produces while reducing a line (value carriers and
/// control-flow signals).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // value literals; payloads keep the raw lexeme, validation happens
    // when a runtime value is built from them
    Integer(String),
    Decimal(String),
    Character(char),
    Str(String),
    Boolean(bool),
    Name(String),

    // punctuation
    Comma,
    Colon,
    Dot,

    // brackets
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LAngle,
    RAngle,

    // operators
    IntDivide,
    Equals,
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,

    // declarators
    DeclareInteger,
    DeclareFloat,
    DeclareCharacter,
    DeclareString,
    DeclareBoolean,
    DeclareArray,
    DeclareTuple,
    DeclareDictionary,
    DeclareStack,
    DeclareQueue,
    DeclarePriorityQueue,

    // collection operation keywords
    Length,
    ReadByIndex,
    Append,
    AddItem,
    ReadItem,
    PopItem,
    InsertPair,
    LookupValue,
    RemovePair,
    ListKeys,

    // statement keywords
    Do,
    If,
    Else,
    EndIf,
    While,
    EndWhile,
    For,
    In,
    EndFor,
    Output,

    // boolean logic
    And,
    Or,
    Not,

    // comparators
    IsEqualTo,
    IsNotEqualTo,
    IsGreaterThan,
    IsLessThan,
    IsGreaterThanOrEqualTo,
    IsLessThanOrEqualTo,

    /// Terminates every token list produced by the lexer.
    End,
    /// Stands in for a source line with no tokens at all.
    EmptyLine,

    /// Carrier for an evaluated runtime value.
    Value(Value),

    // control-flow signals emitted by the evaluator and consumed by the
    // program runner
    OpenIf,
    SkipIf,
    OpenWhile,
    SkipWhile,
    OpenFor { name: String, values: Vec<Value> },
    SkipFor,
    OutputRequest(Vec<Token>),
    NonActionable,
}

/// The tag of a [`Token`], without its payload. Shape matchers compare
/// against these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Integer,
    Decimal,
    Character,
    Str,
    Boolean,
    Name,
    Comma,
    Colon,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    IntDivide,
    Equals,
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
    DeclareInteger,
    DeclareFloat,
    DeclareCharacter,
    DeclareString,
    DeclareBoolean,
    DeclareArray,
    DeclareTuple,
    DeclareDictionary,
    DeclareStack,
    DeclareQueue,
    DeclarePriorityQueue,
    Length,
    ReadByIndex,
    Append,
    AddItem,
    ReadItem,
    PopItem,
    InsertPair,
    LookupValue,
    RemovePair,
    ListKeys,
    Do,
    If,
    Else,
    EndIf,
    While,
    EndWhile,
    For,
    In,
    EndFor,
    Output,
    And,
    Or,
    Not,
    IsEqualTo,
    IsNotEqualTo,
    IsGreaterThan,
    IsLessThan,
    IsGreaterThanOrEqualTo,
    IsLessThanOrEqualTo,
    End,
    EmptyLine,
    Value(ValueKind),
    OpenIf,
    SkipIf,
    OpenWhile,
    SkipWhile,
    OpenFor,
    SkipFor,
    OutputRequest,
    NonActionable,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Integer(_) => TokenKind::Integer,
            Token::Decimal(_) => TokenKind::Decimal,
            Token::Character(_) => TokenKind::Character,
            Token::Str(_) => TokenKind::Str,
            Token::Boolean(_) => TokenKind::Boolean,
            Token::Name(_) => TokenKind::Name,
            Token::Comma => TokenKind::Comma,
            Token::Colon => TokenKind::Colon,
            Token::Dot => TokenKind::Dot,
            Token::LParen => TokenKind::LParen,
            Token::RParen => TokenKind::RParen,
            Token::LBracket => TokenKind::LBracket,
            Token::RBracket => TokenKind::RBracket,
            Token::LBrace => TokenKind::LBrace,
            Token::RBrace => TokenKind::RBrace,
            Token::LAngle => TokenKind::LAngle,
            Token::RAngle => TokenKind::RAngle,
            Token::IntDivide => TokenKind::IntDivide,
            Token::Equals => TokenKind::Equals,
            Token::Plus => TokenKind::Plus,
            Token::Minus => TokenKind::Minus,
            Token::Times => TokenKind::Times,
            Token::Divide => TokenKind::Divide,
            Token::Modulo => TokenKind::Modulo,
            Token::DeclareInteger => TokenKind::DeclareInteger,
            Token::DeclareFloat => TokenKind::DeclareFloat,
            Token::DeclareCharacter => TokenKind::DeclareCharacter,
            Token::DeclareString => TokenKind::DeclareString,
            Token::DeclareBoolean => TokenKind::DeclareBoolean,
            Token::DeclareArray => TokenKind::DeclareArray,
            Token::DeclareTuple => TokenKind::DeclareTuple,
            Token::DeclareDictionary => TokenKind::DeclareDictionary,
            Token::DeclareStack => TokenKind::DeclareStack,
            Token::DeclareQueue => TokenKind::DeclareQueue,
            Token::DeclarePriorityQueue => TokenKind::DeclarePriorityQueue,
            Token::Length => TokenKind::Length,
            Token::ReadByIndex => TokenKind::ReadByIndex,
            Token::Append => TokenKind::Append,
            Token::AddItem => TokenKind::AddItem,
            Token::ReadItem => TokenKind::ReadItem,
            Token::PopItem => TokenKind::PopItem,
            Token::InsertPair => TokenKind::InsertPair,
            Token::LookupValue => TokenKind::LookupValue,
            Token::RemovePair => TokenKind::RemovePair,
            Token::ListKeys => TokenKind::ListKeys,
            Token::Do => TokenKind::Do,
            Token::If => TokenKind::If,
            Token::Else => TokenKind::Else,
            Token::EndIf => TokenKind::EndIf,
            Token::While => TokenKind::While,
            Token::EndWhile => TokenKind::EndWhile,
            Token::For => TokenKind::For,
            Token::In => TokenKind::In,
            Token::EndFor => TokenKind::EndFor,
            Token::Output => TokenKind::Output,
            Token::And => TokenKind::And,
            Token::Or => TokenKind::Or,
            Token::Not => TokenKind::Not,
            Token::IsEqualTo => TokenKind::IsEqualTo,
            Token::IsNotEqualTo => TokenKind::IsNotEqualTo,
            Token::IsGreaterThan => TokenKind::IsGreaterThan,
            Token::IsLessThan => TokenKind::IsLessThan,
            Token::IsGreaterThanOrEqualTo => TokenKind::IsGreaterThanOrEqualTo,
            Token::IsLessThanOrEqualTo => TokenKind::IsLessThanOrEqualTo,
            Token::End => TokenKind::End,
            Token::EmptyLine => TokenKind::EmptyLine,
            Token::Value(value) => TokenKind::Value(value.kind()),
            Token::OpenIf => TokenKind::OpenIf,
            Token::SkipIf => TokenKind::SkipIf,
            Token::OpenWhile => TokenKind::OpenWhile,
            Token::SkipWhile => TokenKind::SkipWhile,
            Token::OpenFor { .. } => TokenKind::OpenFor,
            Token::SkipFor => TokenKind::SkipFor,
            Token::OutputRequest(_) => TokenKind::OutputRequest,
            Token::NonActionable => TokenKind::NonActionable,
        }
    }

    /// The source spelling of this token. Used to reconstruct a line from
    /// its AST and to quote offending tokens in error messages.
    pub fn lexeme(&self) -> String {
        match self {
            Token::Integer(raw) | Token::Decimal(raw) | Token::Name(raw) => raw.clone(),
            Token::Character(c) => format!("'{c}'"),
            Token::Str(s) => format!("\"{s}\""),
            Token::Boolean(true) => "TRUE".into(),
            Token::Boolean(false) => "FALSE".into(),
            Token::Comma => ",".into(),
            Token::Colon => ":".into(),
            Token::Dot => ".".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::LBracket => "[".into(),
            Token::RBracket => "]".into(),
            Token::LBrace => "{".into(),
            Token::RBrace => "}".into(),
            Token::LAngle => "<".into(),
            Token::RAngle => ">".into(),
            Token::IntDivide => "//".into(),
            Token::Equals => "=".into(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Times => "*".into(),
            Token::Divide => "/".into(),
            Token::Modulo => "%".into(),
            Token::DeclareInteger => "INTEGER".into(),
            Token::DeclareFloat => "FLOAT".into(),
            Token::DeclareCharacter => "CHARACTER".into(),
            Token::DeclareString => "STRING".into(),
            Token::DeclareBoolean => "BOOLEAN".into(),
            Token::DeclareArray => "ARRAY".into(),
            Token::DeclareTuple => "TUPLE".into(),
            Token::DeclareDictionary => "DICTIONARY".into(),
            Token::DeclareStack => "STACK".into(),
            Token::DeclareQueue => "QUEUE".into(),
            Token::DeclarePriorityQueue => "PRIORITYQUEUE".into(),
            Token::Length => "LENGTH".into(),
            Token::ReadByIndex => "READBYINDEX".into(),
            Token::Append => "APPEND".into(),
            Token::AddItem => "ADDITEM".into(),
            Token::ReadItem => "READITEM".into(),
            Token::PopItem => "POPITEM".into(),
            Token::InsertPair => "INSERTPAIR".into(),
            Token::LookupValue => "LOOKUPVALUE".into(),
            Token::RemovePair => "REMOVEPAIR".into(),
            Token::ListKeys => "LISTKEYS".into(),
            Token::Do => "DO".into(),
            Token::If => "IF".into(),
            Token::Else => "ELSE".into(),
            Token::EndIf => "ENDIF".into(),
            Token::While => "WHILE".into(),
            Token::EndWhile => "ENDWHILE".into(),
            Token::For => "FOR".into(),
            Token::In => "IN".into(),
            Token::EndFor => "ENDFOR".into(),
            Token::Output => "OUTPUT".into(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::IsEqualTo => "ISEQUALTO".into(),
            Token::IsNotEqualTo => "ISNOTEQUALTO".into(),
            Token::IsGreaterThan => "ISGREATERTHAN".into(),
            Token::IsLessThan => "ISLESSTHAN".into(),
            Token::IsGreaterThanOrEqualTo => "ISGREATERTHANOREQUALTO".into(),
            Token::IsLessThanOrEqualTo => "ISLESSTHANOREQUALTO".into(),
            Token::End | Token::EmptyLine => String::new(),
            internal => format!("<{:?}>", internal.kind()),
        }
    }
}
