//! The runtime value universe. Everything a BP program can store in a
//! variable or pass through an operation is one of these variants; the
//! collections hold values by value, so cloning a token carrier can never
//! alias frame state.

use std::fmt::Display;

use crate::lexer::Token;

use super::dictionary::Dictionary;
use super::error::{RunResult, RuntimeError};

/// The kind tag of a [`Value`], used for type checks and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Float,
    Character,
    Str,
    Boolean,
    Tuple,
    Array,
    Stack,
    Queue,
    PriorityQueue,
    Pair,
    Dictionary,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Character => "character",
            ValueKind::Str => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Tuple => "tuple",
            ValueKind::Array => "array",
            ValueKind::Stack => "stack",
            ValueKind::Queue => "queue",
            ValueKind::PriorityQueue => "priority queue",
            ValueKind::Pair => "dictionary pair",
            ValueKind::Dictionary => "dictionary",
        })
    }
}

/// One entry of a priority queue. The backing list stays sorted by
/// ascending priority, so the tail always holds the highest.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityItem {
    pub value: Value,
    pub priority: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Character(char),
    Str(String),
    Boolean(bool),
    Tuple(Vec<Value>),
    Array(Vec<Value>),
    /// The tail is the top.
    Stack(Vec<Value>),
    /// New items enter at the head; the tail is read and popped first.
    Queue(Vec<Value>),
    PriorityQueue(Vec<PriorityItem>),
    /// Transient key/value carrier used while building dictionaries.
    Pair(Box<Value>, Box<Value>),
    Dictionary(Dictionary),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Character(_) => ValueKind::Character,
            Value::Str(_) => ValueKind::Str,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Tuple(_) => ValueKind::Tuple,
            Value::Array(_) => ValueKind::Array,
            Value::Stack(_) => ValueKind::Stack,
            Value::Queue(_) => ValueKind::Queue,
            Value::PriorityQueue(_) => ValueKind::PriorityQueue,
            Value::Pair(_, _) => ValueKind::Pair,
            Value::Dictionary(_) => ValueKind::Dictionary,
        }
    }

    /// Build a value from a token: either an unwrapped carrier or a
    /// literal, whose raw lexeme is validated here.
    pub fn from_token(token: &Token) -> RunResult<Value> {
        match token {
            Token::Value(value) => Ok(value.clone()),
            Token::Integer(raw) => raw.parse::<i64>().map(Value::Integer).map_err(|_| {
                RuntimeError::Type(format!("'{raw}' is not a valid integer value"))
            }),
            Token::Decimal(raw) => raw.parse::<f64>().map(Value::Float).map_err(|_| {
                RuntimeError::Type(format!("'{raw}' is not a valid float value"))
            }),
            Token::Character(c) => Ok(Value::Character(*c)),
            Token::Str(s) => Ok(Value::Str(s.clone())),
            Token::Boolean(b) => Ok(Value::Boolean(*b)),
            other => Err(RuntimeError::Type(format!(
                "'{}' cannot be used as a value",
                other.lexeme()
            ))),
        }
    }

    /// Wrap this value into a carrier token, ready to travel back up the
    /// AST.
    pub fn to_token(self) -> Token {
        Token::Value(self)
    }

    /// `LENGTH` of a string or collection. Scalars other than characters
    /// have none.
    pub fn length(&self) -> RunResult<i64> {
        match self {
            Value::Str(s) => Ok(s.chars().count() as i64),
            Value::Character(_) => Ok(1),
            Value::Tuple(items) | Value::Array(items) | Value::Stack(items)
            | Value::Queue(items) => Ok(items.len() as i64),
            Value::PriorityQueue(items) => Ok(items.len() as i64),
            Value::Dictionary(dict) => Ok(dict.len() as i64),
            other => Err(RuntimeError::Type(format!(
                "a {} has no length",
                other.kind()
            ))),
        }
    }

    /// The text `OUTPUT` prints for this value. Stacks, queues, priority
    /// queues, dictionaries and pairs cannot be printed.
    pub fn output_representation(&self) -> RunResult<String> {
        match self {
            Value::Integer(n) => Ok(n.to_string()),
            Value::Float(f) => Ok(format!("{f:?}")),
            Value::Character(c) => Ok(c.to_string()),
            Value::Str(s) => Ok(s.clone()),
            Value::Boolean(true) => Ok("TRUE".into()),
            Value::Boolean(false) => Ok("FALSE".into()),
            Value::Tuple(items) | Value::Array(items) => {
                let rendered = items
                    .iter()
                    .map(Value::output_representation)
                    .collect::<RunResult<Vec<_>>>()?;
                Ok(format!("[{}]", rendered.join(", ")))
            }
            other => Err(RuntimeError::Type(format!(
                "a {} cannot be printed",
                other.kind()
            ))),
        }
    }

    /// `READBYINDEX` on a string, array or tuple. A single integer picks
    /// one element; a two-integer list takes the half-open range `[a, b)`
    /// from a string but the inclusive range `[a, b]` from an array or
    /// tuple.
    pub fn read_by_index(&self, index: &Value) -> RunResult<Value> {
        let index = IndexArg::from_value(index)?;
        match self {
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                match index {
                    IndexArg::Single(i) => {
                        Ok(Value::Str(char_at(&chars, i)?.to_string()))
                    }
                    IndexArg::Range(from, to) => {
                        let mut taken = String::new();
                        for position in from..to {
                            taken.push(char_at(&chars, position)?);
                        }
                        Ok(Value::Str(taken))
                    }
                }
            }
            Value::Array(items) | Value::Tuple(items) => {
                let sliced = match index {
                    IndexArg::Single(i) => return element_at(items, i),
                    IndexArg::Range(from, to) => {
                        // an inverted range reads nothing at all
                        let mut taken = Vec::new();
                        for position in from..=to {
                            taken.push(element_at(items, position)?);
                        }
                        taken
                    }
                };
                Ok(match self {
                    Value::Tuple(_) => Value::Tuple(sliced),
                    _ => Value::Array(sliced),
                })
            }
            other => Err(RuntimeError::Type(format!(
                "a {} cannot be read by index",
                other.kind()
            ))),
        }
    }

    /// `APPEND` to an array.
    pub fn append(&mut self, item: Value) -> RunResult<()> {
        match self {
            Value::Array(items) => {
                items.push(item);
                Ok(())
            }
            other => Err(RuntimeError::Type(format!(
                "APPEND works on arrays, not on a {}",
                other.kind()
            ))),
        }
    }

    /// Drop the element at `index` from an array.
    pub fn remove_at(&mut self, index: i64) -> RunResult<()> {
        match self {
            Value::Array(items) => {
                if index < 0 || index as usize >= items.len() {
                    return Err(RuntimeError::Domain(format!(
                        "index {index} is out of range for an array of {}",
                        items.len()
                    )));
                }
                items.remove(index as usize);
                Ok(())
            }
            other => Err(RuntimeError::Type(format!(
                "elements can only be removed from arrays, not from a {}",
                other.kind()
            ))),
        }
    }

    /// `ADDITEM` on a stack or queue. Stacks push onto the tail, queues
    /// prepend at the head; both read and pop at the tail.
    pub fn add_item(&mut self, item: Value) -> RunResult<()> {
        match self {
            Value::Stack(items) => {
                items.push(item);
                Ok(())
            }
            Value::Queue(items) => {
                items.insert(0, item);
                Ok(())
            }
            Value::PriorityQueue(_) => Err(RuntimeError::Type(
                "a priority queue needs a priority alongside the item".into(),
            )),
            other => Err(RuntimeError::Type(format!(
                "ADDITEM works on stacks and queues, not on a {}",
                other.kind()
            ))),
        }
    }

    /// `ADDITEM` with a priority. The item lands immediately before the
    /// first entry of equal or greater priority, so among equals the
    /// older one stays nearer the tail and exits first.
    pub fn add_with_priority(&mut self, item: Value, priority: i64) -> RunResult<()> {
        match self {
            Value::PriorityQueue(items) => {
                let entry = PriorityItem {
                    value: item,
                    priority,
                };
                match items.iter().position(|queued| queued.priority >= priority) {
                    Some(position) => items.insert(position, entry),
                    None => items.push(entry),
                }
                Ok(())
            }
            other => Err(RuntimeError::Type(format!(
                "a priority can only be given to a priority queue, not a {}",
                other.kind()
            ))),
        }
    }

    /// `READITEM`: the tail of a stack, queue or priority queue.
    pub fn read_item(&self) -> RunResult<Value> {
        match self {
            Value::Stack(items) | Value::Queue(items) => items
                .last()
                .cloned()
                .ok_or_else(|| empty_collection(self.kind(), "read")),
            Value::PriorityQueue(items) => items
                .last()
                .map(|item| item.value.clone())
                .ok_or_else(|| empty_collection(self.kind(), "read")),
            other => Err(RuntimeError::Type(format!(
                "READITEM works on stacks and queues, not on a {}",
                other.kind()
            ))),
        }
    }

    /// `POPITEM`: remove the tail of a stack, queue or priority queue.
    pub fn pop_item(&mut self) -> RunResult<()> {
        let kind = self.kind();
        let removed = match self {
            Value::Stack(items) | Value::Queue(items) => items.pop().map(|_| ()),
            Value::PriorityQueue(items) => items.pop().map(|_| ()),
            other => {
                return Err(RuntimeError::Type(format!(
                    "POPITEM works on stacks and queues, not on a {}",
                    other.kind()
                )))
            }
        };
        removed.ok_or_else(|| empty_collection(kind, "pop"))
    }
}

/// A validated `READBYINDEX` argument.
enum IndexArg {
    Single(i64),
    Range(i64, i64),
}

impl IndexArg {
    fn from_value(index: &Value) -> RunResult<IndexArg> {
        match index {
            Value::Integer(i) => Ok(IndexArg::Single(*i)),
            Value::Array(items) | Value::Tuple(items) if items.len() == 2 => {
                match (&items[0], &items[1]) {
                    (Value::Integer(from), Value::Integer(to)) => {
                        Ok(IndexArg::Range(*from, *to))
                    }
                    _ => Err(RuntimeError::Type(
                        "an index range must hold two integers".into(),
                    )),
                }
            }
            other => Err(RuntimeError::Type(format!(
                "a {} is not a valid index",
                other.kind()
            ))),
        }
    }
}

fn char_at(chars: &[char], position: i64) -> RunResult<char> {
    if position < 0 {
        return Err(out_of_range(position, chars.len()));
    }
    chars
        .get(position as usize)
        .copied()
        .ok_or_else(|| out_of_range(position, chars.len()))
}

fn element_at(items: &[Value], position: i64) -> RunResult<Value> {
    if position < 0 {
        return Err(out_of_range(position, items.len()));
    }
    items
        .get(position as usize)
        .cloned()
        .ok_or_else(|| out_of_range(position, items.len()))
}

fn out_of_range(position: i64, length: usize) -> RuntimeError {
    RuntimeError::Domain(format!(
        "index {position} is out of range for a length of {length}"
    ))
}

fn empty_collection(kind: ValueKind, action: &str) -> RuntimeError {
    RuntimeError::Domain(format!("cannot {action} an item from an empty {kind}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_slice_is_half_open() {
        let s = Value::Str("abcdef".into());
        let index = Value::Array(vec![Value::Integer(1), Value::Integer(4)]);
        assert_eq!(Ok(Value::Str("bcd".into())), s.read_by_index(&index));
    }

    #[test]
    fn test_array_slice_is_inclusive() {
        let a = Value::Array(vec![
            Value::Integer(10),
            Value::Integer(20),
            Value::Integer(30),
            Value::Integer(40),
            Value::Integer(50),
        ]);
        let index = Value::Array(vec![Value::Integer(1), Value::Integer(4)]);
        assert_eq!(
            Ok(Value::Array(vec![
                Value::Integer(20),
                Value::Integer(30),
                Value::Integer(40),
                Value::Integer(50),
            ])),
            a.read_by_index(&index)
        );
    }

    #[test]
    fn test_tuple_slice_stays_a_tuple() {
        let t = Value::Tuple(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        let index = Value::Tuple(vec![Value::Integer(0), Value::Integer(1)]);
        assert_eq!(
            Ok(Value::Tuple(vec![Value::Integer(1), Value::Integer(2)])),
            t.read_by_index(&index)
        );
    }

    #[test]
    fn test_index_out_of_range_is_a_domain_error() {
        let a = Value::Array(vec![Value::Integer(1)]);
        assert!(matches!(
            a.read_by_index(&Value::Integer(3)),
            Err(RuntimeError::Domain(_))
        ));
        assert!(matches!(
            a.read_by_index(&Value::Integer(-1)),
            Err(RuntimeError::Domain(_))
        ));
    }

    #[test]
    fn test_stack_is_lifo() {
        let mut stack = Value::Stack(vec![]);
        for n in [1, 2, 3] {
            stack.add_item(Value::Integer(n)).unwrap();
        }
        assert_eq!(Ok(Value::Integer(3)), stack.read_item());
        stack.pop_item().unwrap();
        assert_eq!(Ok(Value::Integer(2)), stack.read_item());
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = Value::Queue(vec![]);
        for n in [1, 2, 3] {
            queue.add_item(Value::Integer(n)).unwrap();
        }
        assert_eq!(Ok(Value::Integer(1)), queue.read_item());
        queue.pop_item().unwrap();
        assert_eq!(Ok(Value::Integer(2)), queue.read_item());
    }

    #[test]
    fn test_priority_queue_orders_by_priority() {
        let mut queue = Value::PriorityQueue(vec![]);
        queue.add_with_priority(Value::Str("low".into()), 1).unwrap();
        queue.add_with_priority(Value::Str("hi".into()), 5).unwrap();
        queue.add_with_priority(Value::Str("mid".into()), 3).unwrap();
        assert_eq!(Ok(Value::Str("hi".into())), queue.read_item());
        queue.pop_item().unwrap();
        assert_eq!(Ok(Value::Str("mid".into())), queue.read_item());
    }

    #[test]
    fn test_equal_priority_keeps_the_older_item_ahead() {
        let mut queue = Value::PriorityQueue(vec![]);
        queue.add_with_priority(Value::Str("first".into()), 2).unwrap();
        queue.add_with_priority(Value::Str("second".into()), 2).unwrap();
        // the newcomer is placed before the existing equal, so the older
        // item stays at the tail and exits first
        assert_eq!(Ok(Value::Str("first".into())), queue.read_item());
    }

    #[test]
    fn test_pop_from_empty_is_a_domain_error() {
        let mut stack = Value::Stack(vec![]);
        assert!(matches!(stack.pop_item(), Err(RuntimeError::Domain(_))));
        assert!(matches!(stack.read_item(), Err(RuntimeError::Domain(_))));
    }

    #[test]
    fn test_array_remove_at() {
        let mut a = Value::Array(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
        ]);
        a.remove_at(1).unwrap();
        assert_eq!(
            Value::Array(vec![Value::Integer(1), Value::Integer(3)]),
            a
        );
        assert!(matches!(a.remove_at(5), Err(RuntimeError::Domain(_))));
    }

    #[test]
    fn test_output_representations() {
        assert_eq!(Ok("5.0".into()), Value::Float(5.0).output_representation());
        assert_eq!(Ok("TRUE".into()), Value::Boolean(true).output_representation());
        assert_eq!(
            Ok("[1, 2.5, x]".into()),
            Value::Array(vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::Character('x'),
            ])
            .output_representation()
        );
        assert!(Value::Stack(vec![]).output_representation().is_err());
    }

    #[test]
    fn test_literal_validation() {
        assert_eq!(
            Ok(Value::Integer(-3)),
            Value::from_token(&Token::Integer("-3".into()))
        );
        assert!(Value::from_token(&Token::Integer("99999999999999999999".into())).is_err());
    }
}
