//! # Lexer
//!
//! Turns one BP source line into a flat token list terminated by a single
//! [`Token::End`]. Matching is greedy and prioritised: for every position
//! the ordered rule table below is scanned front to back and the first
//! rule whose pattern matches the start of the remaining text wins. The
//! table order resolves all overlaps (`//` before `/`, keywords before
//! identifiers), so it is part of the language definition and must not be
//! rearranged.

mod token;

pub use token::*;

use once_cell::sync::Lazy;
use regex::Regex;
use std::{error::Error, fmt::Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError(String);

pub type LexResult<T> = Result<T, LexError>;

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Error for LexError {}

enum Build {
    /// Token with no payload; the rule emits a clone of this prototype.
    Emit(Token),
    /// Token built from the pattern's first capture group.
    FromValue(fn(&str) -> LexResult<Token>),
}

struct LexRule {
    pattern: Regex,
    build: Build,
}

/// Every pattern is anchored at the start of the remaining text and burns
/// off leading whitespace before matching.
fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!(r"^\s*(?:{pattern})")).expect("token pattern must compile")
}

fn symbol(pattern: &str, token: Token) -> LexRule {
    LexRule {
        pattern: anchored(pattern),
        build: Build::Emit(token),
    }
}

/// Keywords additionally demand a word boundary, so `INTEGER` does not
/// swallow the front of an identifier like `INTEGERS`.
fn keyword(word: &str, token: Token) -> LexRule {
    LexRule {
        pattern: anchored(&format!(r"{word}\b")),
        build: Build::Emit(token),
    }
}

fn valued(pattern: &str, build: fn(&str) -> LexResult<Token>) -> LexRule {
    LexRule {
        pattern: anchored(pattern),
        build: Build::FromValue(build),
    }
}

static LEX_RULES: Lazy<Vec<LexRule>> = Lazy::new(|| {
    vec![
        // numbers, longest shape first
        valued(r"(-?[0-9]+\.[0-9]+)", |v| Ok(Token::Decimal(v.into()))),
        valued(r"(-?[0-9]+)", |v| Ok(Token::Integer(v.into()))),
        // character and string literals
        valued(r"'([^'])'", |v| match v.chars().next() {
            Some(c) => Ok(Token::Character(c)),
            None => Err(LexError("empty character literal".into())),
        }),
        valued(r#""([^"]*)""#, |v| Ok(Token::Str(v.into()))),
        // punctuation
        symbol(",", Token::Comma),
        symbol(":", Token::Colon),
        symbol(r"\.", Token::Dot),
        // brackets
        symbol(r"\(", Token::LParen),
        symbol(r"\)", Token::RParen),
        symbol(r"\[", Token::LBracket),
        symbol(r"\]", Token::RBracket),
        symbol(r"\{", Token::LBrace),
        symbol(r"\}", Token::RBrace),
        symbol("<", Token::LAngle),
        symbol(">", Token::RAngle),
        // operators, `//` before `/`
        symbol("//", Token::IntDivide),
        symbol("=", Token::Equals),
        symbol(r"\+", Token::Plus),
        symbol("-", Token::Minus),
        symbol(r"\*", Token::Times),
        symbol("/", Token::Divide),
        symbol("%", Token::Modulo),
        // boolean literals
        valued(r"((?:TRUE)|(?:FALSE))\b", |v| Ok(Token::Boolean(v == "TRUE"))),
        // declarators
        keyword("INTEGER", Token::DeclareInteger),
        keyword("FLOAT", Token::DeclareFloat),
        keyword("CHARACTER", Token::DeclareCharacter),
        keyword("STRING", Token::DeclareString),
        keyword("BOOLEAN", Token::DeclareBoolean),
        keyword("ARRAY", Token::DeclareArray),
        keyword("TUPLE", Token::DeclareTuple),
        keyword("DICTIONARY", Token::DeclareDictionary),
        keyword("STACK", Token::DeclareStack),
        keyword("QUEUE", Token::DeclareQueue),
        keyword("PRIORITYQUEUE", Token::DeclarePriorityQueue),
        // collection operations
        keyword("LENGTH", Token::Length),
        keyword("READBYINDEX", Token::ReadByIndex),
        keyword("APPEND", Token::Append),
        keyword("ADDITEM", Token::AddItem),
        keyword("READITEM", Token::ReadItem),
        keyword("POPITEM", Token::PopItem),
        keyword("INSERTPAIR", Token::InsertPair),
        keyword("LOOKUPVALUE", Token::LookupValue),
        keyword("REMOVEPAIR", Token::RemovePair),
        keyword("LISTKEYS", Token::ListKeys),
        // statement keywords
        keyword("DO", Token::Do),
        keyword("IF", Token::If),
        keyword("ELSE", Token::Else),
        keyword("ENDIF", Token::EndIf),
        keyword("WHILE", Token::While),
        keyword("ENDWHILE", Token::EndWhile),
        keyword("FOR", Token::For),
        keyword("IN", Token::In),
        keyword("ENDFOR", Token::EndFor),
        keyword("OUTPUT", Token::Output),
        // boolean logic
        keyword("AND", Token::And),
        keyword("OR", Token::Or),
        keyword("NOT", Token::Not),
        // comparators; the word boundary keeps the short names from
        // claiming the front of the long ones
        keyword("ISEQUALTO", Token::IsEqualTo),
        keyword("ISNOTEQUALTO", Token::IsNotEqualTo),
        keyword("ISGREATERTHAN", Token::IsGreaterThan),
        keyword("ISLESSTHAN", Token::IsLessThan),
        keyword("ISGREATERTHANOREQUALTO", Token::IsGreaterThanOrEqualTo),
        keyword("ISLESSTHANOREQUALTO", Token::IsLessThanOrEqualTo),
        // identifiers come last, so every reserved word wins
        valued(r"([a-zA-Z0-9_]+)", |v| Ok(Token::Name(v.into()))),
    ]
});

/// Tokenize one source line. An empty (or all-whitespace) line yields
/// `[End]`.
pub fn tokenize(line: &str) -> LexResult<Vec<Token>> {
    let mut rest = line.trim();
    let mut tokens = Vec::new();

    'scan: while !rest.is_empty() {
        for rule in LEX_RULES.iter() {
            let Some(caps) = rule.pattern.captures(rest) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };

            let token = match &rule.build {
                Build::Emit(prototype) => prototype.clone(),
                Build::FromValue(build) => {
                    build(caps.get(1).map(|m| m.as_str()).unwrap_or(""))?
                }
            };

            tokens.push(token);
            rest = &rest[whole.end()..];
            continue 'scan;
        }

        return Err(LexError(format!(
            "no token pattern matches the start of '{rest}'"
        )));
    }

    tokens.push(Token::End);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_empty_line() {
        assert_eq!(Ok(vec![Token::End]), tokenize("   "));
    }

    #[test]
    fn test_lex_declaration() {
        assert_eq!(
            Ok(vec![
                Token::DeclareInteger,
                Token::Name("foo".into()),
                Token::Equals,
                Token::Integer("42".into()),
                Token::End,
            ]),
            tokenize("INTEGER foo = 42")
        );
    }

    #[test]
    fn test_lex_decimal_before_integer() {
        assert_eq!(
            Ok(vec![Token::Decimal("-13.37".into()), Token::End]),
            tokenize("-13.37")
        );
    }

    #[test]
    fn test_lex_keyword_needs_word_boundary() {
        // `INTEGERS` must fall through to an identifier
        assert_eq!(
            Ok(vec![Token::Name("INTEGERS".into()), Token::End]),
            tokenize("INTEGERS")
        );
    }

    #[test]
    fn test_lex_long_comparator_wins() {
        assert_eq!(
            Ok(vec![
                Token::Name("a".into()),
                Token::IsGreaterThanOrEqualTo,
                Token::Name("b".into()),
                Token::End,
            ]),
            tokenize("a ISGREATERTHANOREQUALTO b")
        );
    }

    #[test]
    fn test_lex_integer_divide_before_divide() {
        assert_eq!(
            Ok(vec![
                Token::Name("a".into()),
                Token::IntDivide,
                Token::Name("b".into()),
                Token::End,
            ]),
            tokenize("a // b")
        );
    }

    #[test]
    fn test_lex_string_and_character() {
        assert_eq!(
            Ok(vec![
                Token::Str("hello world".into()),
                Token::Comma,
                Token::Character('x'),
                Token::End,
            ]),
            tokenize("\"hello world\", 'x'")
        );
    }

    #[test]
    fn test_lex_method_call() {
        assert_eq!(
            Ok(vec![
                Token::Name("d".into()),
                Token::Dot,
                Token::InsertPair,
                Token::LParen,
                Token::Str("c".into()),
                Token::Colon,
                Token::Integer("3".into()),
                Token::RParen,
                Token::End,
            ]),
            tokenize("d.INSERTPAIR(\"c\":3)")
        );
    }

    #[test]
    fn test_lex_rejects_unknown_prefix() {
        assert!(tokenize("a ? b").is_err());
    }

    #[test]
    fn test_lex_sign_sticks_to_literal() {
        // without surrounding whitespace the `-` is taken by the integer
        // pattern, exactly as the prioritised match order dictates
        assert_eq!(
            Ok(vec![
                Token::Integer("5".into()),
                Token::Integer("-3".into()),
                Token::End,
            ]),
            tokenize("5 -3")
        );
    }
}
