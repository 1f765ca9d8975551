//! # Evaluator
//!
//! Reduces one line's AST to a single summary token by post-order
//! traversal: children first, left to right, then a dispatch on the
//! operator kind.
//!
//! Operations that bind or update a variable receive their argument
//! tokens with identifiers unresolved, because they need the name itself;
//! every other operation sees identifiers replaced by (a copy of) their
//! current value. Collection mutations follow an edit-then-reassign
//! pattern: read the value out, change the working copy, store it back
//! under the original name.

use crate::ast::{AstNode, OpKind};
use crate::lexer::Token;

use super::dictionary::Dictionary;
use super::error::{RunResult, RuntimeError};
use super::scope::Scope;
use super::value::{Value, ValueKind};

pub fn evaluate(node: &AstNode, scope: &mut Scope) -> RunResult<Token> {
    match node {
        AstNode::Leaf(token) => Ok(token.clone()),
        AstNode::Operator { op, children } => {
            let mut args = Vec::with_capacity(children.len());
            for child in children {
                guard_control_leaf(child)?;
                args.push(evaluate(child, scope)?);
            }
            apply(*op, args, scope)
        }
    }
}

/// Control tokens are only meaningful as whole lines; inside an
/// expression they indicate a malformed program.
fn guard_control_leaf(node: &AstNode) -> RunResult<()> {
    if let AstNode::Leaf(token) = node {
        if matches!(
            token,
            Token::Else | Token::EndIf | Token::EndWhile | Token::EndFor | Token::End
        ) {
            return Err(RuntimeError::Structure(format!(
                "'{}' cannot appear inside an expression",
                token.lexeme()
            )));
        }
    }
    Ok(())
}

fn apply(op: OpKind, args: Vec<Token>, scope: &mut Scope) -> RunResult<Token> {
    match op {
        // these need variable names, so their arguments stay unresolved
        OpKind::Assignment => assign(args, scope),
        OpKind::Declaration => declare(args, scope),
        OpKind::EmptyDeclaration => declare_empty(args, scope),
        OpKind::For => for_header(args, scope),
        OpKind::Append => append(args, scope),
        OpKind::PriorityAdd => priority_add(args, scope),
        OpKind::CollectionAdd => collection_add(args, scope),
        OpKind::CollectionPop => collection_pop(args, scope),
        OpKind::DictInsert => dict_insert(args, scope),
        OpKind::DictRemove => dict_remove(args, scope),
        // everything else works on plain values
        other => {
            let args = args
                .into_iter()
                .map(|token| resolve(token, scope))
                .collect::<RunResult<Vec<_>>>()?;
            match other {
                OpKind::Brackets => forward(args),
                OpKind::ArrayLit => Ok(Value::Array(values_of(args)?).to_token()),
                OpKind::TupleLit => Ok(Value::Tuple(values_of(args)?).to_token()),
                OpKind::DictLit => dict_literal(args),
                OpKind::Pair => pair(args),
                OpKind::Add => add(args),
                OpKind::Sub => sub(args),
                OpKind::Mul => mul(args),
                OpKind::Div => div(args),
                OpKind::IntDiv => int_div(args),
                OpKind::Mod => modulo(args),
                OpKind::Comparison => compare(args),
                OpKind::BoolBinary => bool_binary(args),
                OpKind::BoolUnary => bool_unary(args),
                OpKind::Index => read_by_index(args),
                OpKind::Length => length(args),
                OpKind::Output => Ok(Token::OutputRequest(args)),
                OpKind::If => condition_signal(args, Token::OpenIf, Token::SkipIf),
                OpKind::While => condition_signal(args, Token::OpenWhile, Token::SkipWhile),
                OpKind::CollectionRead => collection_read(args),
                OpKind::DictLookup => dict_lookup(args),
                OpKind::DictKeys => dict_keys(args),
                unhandled => Err(RuntimeError::Structure(format!(
                    "{unhandled:?} cannot be evaluated here"
                ))),
            }
        }
    }
}

/// Replace an identifier token by a carrier of its current value.
fn resolve(token: Token, scope: &Scope) -> RunResult<Token> {
    match token {
        Token::Name(name) => Ok(scope.lookup(&name)?.clone().to_token()),
        other => Ok(other),
    }
}

/// The value behind a token, following one identifier hop if needed.
fn value_of(token: &Token, scope: &Scope) -> RunResult<Value> {
    match token {
        Token::Name(name) => scope.lookup(name).cloned(),
        other => Value::from_token(other),
    }
}

fn values_of(args: Vec<Token>) -> RunResult<Vec<Value>> {
    args.iter().map(Value::from_token).collect()
}

fn arity<const N: usize>(args: Vec<Token>, what: &str) -> RunResult<[Token; N]> {
    let found = args.len();
    <[Token; N]>::try_from(args).map_err(|_| {
        RuntimeError::Structure(format!("{what} takes {N} operand(s), found {found}"))
    })
}

fn variable_name(token: &Token) -> RunResult<&str> {
    match token {
        Token::Name(name) => Ok(name),
        other => Err(RuntimeError::Name(format!(
            "'{}' is not a variable name",
            other.lexeme()
        ))),
    }
}

/// Store an edited collection back under the variable it was read from.
fn store_back(target: &Token, value: Value, scope: &mut Scope) -> RunResult<()> {
    scope.set(variable_name(target)?, value)
}

fn forward(args: Vec<Token>) -> RunResult<Token> {
    let [inner] = arity::<1>(args, "a bracketed expression")?;
    Ok(inner)
}

fn assign(args: Vec<Token>, scope: &mut Scope) -> RunResult<Token> {
    let [name_token, value_token] = arity::<2>(args, "assignment")?;
    let value = value_of(&value_token, scope)?;
    scope.set(variable_name(&name_token)?, value)?;
    Ok(Token::NonActionable)
}

fn declared_kind(token: &Token) -> RunResult<ValueKind> {
    match token {
        Token::DeclareInteger => Ok(ValueKind::Integer),
        Token::DeclareFloat => Ok(ValueKind::Float),
        Token::DeclareCharacter => Ok(ValueKind::Character),
        Token::DeclareString => Ok(ValueKind::Str),
        Token::DeclareBoolean => Ok(ValueKind::Boolean),
        Token::DeclareArray => Ok(ValueKind::Array),
        Token::DeclareTuple => Ok(ValueKind::Tuple),
        Token::DeclareDictionary => Ok(ValueKind::Dictionary),
        Token::DeclareStack => Ok(ValueKind::Stack),
        Token::DeclareQueue => Ok(ValueKind::Queue),
        Token::DeclarePriorityQueue => Ok(ValueKind::PriorityQueue),
        other => Err(RuntimeError::Structure(format!(
            "'{}' is not a declarator",
            other.lexeme()
        ))),
    }
}

/// Check an initial value against the declared type. Integers may
/// initialise a FLOAT variable; nothing else converts.
fn conform(declared: ValueKind, value: Value) -> RunResult<Value> {
    if value.kind() == declared {
        return Ok(value);
    }
    match (declared, value) {
        (ValueKind::Float, Value::Integer(n)) => Ok(Value::Float(n as f64)),
        (declared, value) => Err(RuntimeError::Type(format!(
            "a {} value cannot initialise a {declared} variable",
            value.kind()
        ))),
    }
}

/// Declare a variable with an initial value. A name already visible in an
/// enclosing frame is assigned instead of redeclared, so declarations
/// inside loop bodies keep working once the first iteration has carried
/// the variable outward. Redeclaring within the same frame stays an
/// error.
fn declare(args: Vec<Token>, scope: &mut Scope) -> RunResult<Token> {
    let [decl_token, name_token, value_token] = arity::<3>(args, "a declaration")?;
    let name = variable_name(&name_token)?;
    let declared = declared_kind(&decl_token)?;
    let value = conform(declared, value_of(&value_token, scope)?)?;
    if scope.declared_here(name) {
        return Err(RuntimeError::Name(format!(
            "'{name}' is already declared in this scope"
        )));
    }
    if scope.contains(name) {
        scope.set(name, value)?;
    } else {
        scope.make(name, value)?;
    }
    Ok(Token::NonActionable)
}

/// Declare a stack, queue or priority queue, which always start empty.
fn declare_empty(args: Vec<Token>, scope: &mut Scope) -> RunResult<Token> {
    let [decl_token, name_token] = arity::<2>(args, "a declaration")?;
    let name = variable_name(&name_token)?;
    let value = match declared_kind(&decl_token)? {
        ValueKind::Stack => Value::Stack(Vec::new()),
        ValueKind::Queue => Value::Queue(Vec::new()),
        ValueKind::PriorityQueue => Value::PriorityQueue(Vec::new()),
        declared => {
            return Err(RuntimeError::Type(format!(
                "a {declared} declaration needs an initial value"
            )))
        }
    };
    if scope.declared_here(name) {
        return Err(RuntimeError::Name(format!(
            "'{name}' is already declared in this scope"
        )));
    }
    if scope.contains(name) {
        scope.set(name, value)?;
    } else {
        scope.make(name, value)?;
    }
    Ok(Token::NonActionable)
}

/// Evaluate a `FOR` header into the signal the runner iterates on.
fn for_header(args: Vec<Token>, scope: &mut Scope) -> RunResult<Token> {
    let [name_token, list_token] = arity::<2>(args, "FOR")?;
    let name = variable_name(&name_token)?.to_owned();
    let list = value_of(&list_token, scope)?;
    let Value::Array(values) = list else {
        return Err(RuntimeError::Type(format!(
            "FOR iterates over an array, not a {}",
            list.kind()
        )));
    };
    if values.is_empty() {
        Ok(Token::SkipFor)
    } else {
        Ok(Token::OpenFor { name, values })
    }
}

fn append(args: Vec<Token>, scope: &mut Scope) -> RunResult<Token> {
    let [target, item] = arity::<2>(args, "APPEND")?;
    let mut array = value_of(&target, scope)?;
    array.append(value_of(&item, scope)?)?;
    store_back(&target, array, scope)?;
    Ok(Token::NonActionable)
}

fn collection_add(args: Vec<Token>, scope: &mut Scope) -> RunResult<Token> {
    let [target, item] = arity::<2>(args, "ADDITEM")?;
    let mut collection = value_of(&target, scope)?;
    collection.add_item(value_of(&item, scope)?)?;
    store_back(&target, collection, scope)?;
    Ok(Token::NonActionable)
}

fn priority_add(args: Vec<Token>, scope: &mut Scope) -> RunResult<Token> {
    let [target, item, priority_token] = arity::<3>(args, "ADDITEM")?;
    let mut queue = value_of(&target, scope)?;
    let item = value_of(&item, scope)?;
    let priority = match value_of(&priority_token, scope)? {
        Value::Integer(priority) => priority,
        other => {
            return Err(RuntimeError::Type(format!(
                "a priority must be an integer, not a {}",
                other.kind()
            )))
        }
    };
    queue.add_with_priority(item, priority)?;
    store_back(&target, queue, scope)?;
    Ok(Token::NonActionable)
}

fn collection_pop(args: Vec<Token>, scope: &mut Scope) -> RunResult<Token> {
    let [target] = arity::<1>(args, "POPITEM")?;
    let mut collection = value_of(&target, scope)?;
    collection.pop_item()?;
    store_back(&target, collection, scope)?;
    Ok(Token::NonActionable)
}

fn dict_insert(args: Vec<Token>, scope: &mut Scope) -> RunResult<Token> {
    let [target, pair_token] = arity::<2>(args, "INSERTPAIR")?;
    let mut value = value_of(&target, scope)?;
    let kind = value.kind();
    {
        let Value::Dictionary(dictionary) = &mut value else {
            return Err(RuntimeError::Type(format!(
                "INSERTPAIR works on dictionaries, not on a {kind}"
            )));
        };
        let Value::Pair(key, pair_value) = value_of(&pair_token, scope)? else {
            return Err(RuntimeError::Type(
                "INSERTPAIR takes a key:value pair".into(),
            ));
        };
        dictionary.insert(*key, *pair_value)?;
    }
    store_back(&target, value, scope)?;
    Ok(Token::NonActionable)
}

fn dict_remove(args: Vec<Token>, scope: &mut Scope) -> RunResult<Token> {
    let [target, key_token] = arity::<2>(args, "REMOVEPAIR")?;
    let mut value = value_of(&target, scope)?;
    let key = value_of(&key_token, scope)?;
    let kind = value.kind();
    {
        let Value::Dictionary(dictionary) = &mut value else {
            return Err(RuntimeError::Type(format!(
                "REMOVEPAIR works on dictionaries, not on a {kind}"
            )));
        };
        dictionary.remove(&key)?;
    }
    store_back(&target, value, scope)?;
    Ok(Token::NonActionable)
}

fn dict_literal(args: Vec<Token>) -> RunResult<Token> {
    let mut pairs = Vec::with_capacity(args.len());
    for token in &args {
        match Value::from_token(token)? {
            Value::Pair(key, value) => pairs.push((*key, *value)),
            other => {
                return Err(RuntimeError::Type(format!(
                    "a dictionary is built from key:value pairs, not a {}",
                    other.kind()
                )))
            }
        }
    }
    Ok(Value::Dictionary(Dictionary::from_pairs(pairs)?).to_token())
}

fn pair(args: Vec<Token>) -> RunResult<Token> {
    let [key, value] = arity::<2>(args, "a key:value pair")?;
    Ok(Value::Pair(
        Box::new(Value::from_token(&key)?),
        Box::new(Value::from_token(&value)?),
    )
    .to_token())
}

fn two_values(args: Vec<Token>, what: &str) -> RunResult<(Value, Value)> {
    let [left, right] = arity::<2>(args, what)?;
    Ok((Value::from_token(&left)?, Value::from_token(&right)?))
}

fn checked(result: Option<i64>) -> RunResult<i64> {
    result.ok_or_else(|| RuntimeError::Domain("integer overflow".into()))
}

/// `+` adds numbers, concatenates strings and joins arrays.
fn add(args: Vec<Token>) -> RunResult<Token> {
    let (left, right) = two_values(args, "'+'")?;
    let result = match (left, right) {
        (Value::Str(mut left), Value::Str(right)) => {
            left.push_str(&right);
            Value::Str(left)
        }
        (Value::Array(mut left), Value::Array(right)) => {
            left.extend(right);
            Value::Array(left)
        }
        (Value::Integer(left), Value::Integer(right)) => {
            Value::Integer(checked(left.checked_add(right))?)
        }
        (Value::Float(left), Value::Float(right)) => Value::Float(left + right),
        (Value::Float(left), Value::Integer(right)) => Value::Float(left + right as f64),
        (Value::Integer(left), Value::Float(right)) => Value::Float(left as f64 + right),
        (left, right) => {
            return Err(RuntimeError::Type(format!(
                "cannot add a {} and a {}",
                left.kind(),
                right.kind()
            )))
        }
    };
    Ok(result.to_token())
}

fn sub(args: Vec<Token>) -> RunResult<Token> {
    let (left, right) = two_values(args, "'-'")?;
    let result = match (left, right) {
        (Value::Integer(left), Value::Integer(right)) => {
            Value::Integer(checked(left.checked_sub(right))?)
        }
        (Value::Float(left), Value::Float(right)) => Value::Float(left - right),
        (Value::Float(left), Value::Integer(right)) => Value::Float(left - right as f64),
        (Value::Integer(left), Value::Float(right)) => Value::Float(left as f64 - right),
        (left, right) => {
            return Err(RuntimeError::Type(format!(
                "cannot subtract a {} from a {}",
                right.kind(),
                left.kind()
            )))
        }
    };
    Ok(result.to_token())
}

fn mul(args: Vec<Token>) -> RunResult<Token> {
    let (left, right) = two_values(args, "'*'")?;
    let result = match (left, right) {
        (Value::Integer(left), Value::Integer(right)) => {
            Value::Integer(checked(left.checked_mul(right))?)
        }
        (Value::Float(left), Value::Float(right)) => Value::Float(left * right),
        (Value::Float(left), Value::Integer(right)) => Value::Float(left * right as f64),
        (Value::Integer(left), Value::Float(right)) => Value::Float(left as f64 * right),
        (left, right) => {
            return Err(RuntimeError::Type(format!(
                "cannot multiply a {} and a {}",
                left.kind(),
                right.kind()
            )))
        }
    };
    Ok(result.to_token())
}

/// `/` always produces a float, even for two integers.
fn div(args: Vec<Token>) -> RunResult<Token> {
    let (left, right) = two_values(args, "'/'")?;
    let (left, right) = match (left, right) {
        (Value::Integer(left), Value::Integer(right)) => (left as f64, right as f64),
        (Value::Float(left), Value::Float(right)) => (left, right),
        (Value::Float(left), Value::Integer(right)) => (left, right as f64),
        (Value::Integer(left), Value::Float(right)) => (left as f64, right),
        (left, right) => {
            return Err(RuntimeError::Type(format!(
                "cannot divide a {} by a {}",
                left.kind(),
                right.kind()
            )))
        }
    };
    if right == 0.0 {
        return Err(RuntimeError::Domain("division by zero".into()));
    }
    Ok(Value::Float(left / right).to_token())
}

fn integer_operands(args: Vec<Token>, what: &str) -> RunResult<(i64, i64)> {
    match two_values(args, what)? {
        (Value::Integer(left), Value::Integer(right)) => Ok((left, right)),
        (left, right) => Err(RuntimeError::Type(format!(
            "{what} only works on integers, found a {} and a {}",
            left.kind(),
            right.kind()
        ))),
    }
}

/// `//`: integer division rounding towards negative infinity.
fn int_div(args: Vec<Token>) -> RunResult<Token> {
    let (left, right) = integer_operands(args, "'//'")?;
    if right == 0 {
        return Err(RuntimeError::Domain("integer division by zero".into()));
    }
    let quotient = checked(left.checked_div(right))?;
    let remainder = left % right;
    let floored = if remainder != 0 && (remainder < 0) != (right < 0) {
        quotient - 1
    } else {
        quotient
    };
    Ok(Value::Integer(floored).to_token())
}

/// `%`: remainder carrying the divisor's sign, matching `//`.
fn modulo(args: Vec<Token>) -> RunResult<Token> {
    let (left, right) = integer_operands(args, "'%'")?;
    if right == 0 {
        return Err(RuntimeError::Domain("modulo by zero".into()));
    }
    let remainder = checked(left.checked_rem(right))?;
    let floored = if remainder != 0 && (remainder < 0) != (right < 0) {
        remainder + right
    } else {
        remainder
    };
    Ok(Value::Integer(floored).to_token())
}

fn compare(args: Vec<Token>) -> RunResult<Token> {
    let [left_token, comparator, right_token] = arity::<3>(args, "a comparison")?;
    let left = Value::from_token(&left_token)?;
    let right = Value::from_token(&right_token)?;
    if left.kind() != right.kind() {
        return Err(RuntimeError::Type(format!(
            "comparison operands must share a type, found a {} and a {}",
            left.kind(),
            right.kind()
        )));
    }
    let result = match comparator {
        Token::IsEqualTo => left == right,
        Token::IsNotEqualTo => left != right,
        ordering => match (&left, &right) {
            (Value::Integer(left), Value::Integer(right)) => {
                ordered(&ordering, left.cmp(right))?
            }
            (Value::Float(left), Value::Float(right)) => ordered(
                &ordering,
                left.partial_cmp(right).unwrap_or(std::cmp::Ordering::Less),
            )?,
            _ => {
                return Err(RuntimeError::Type(
                    "only numbers support ordering comparisons".into(),
                ))
            }
        },
    };
    Ok(Value::Boolean(result).to_token())
}

fn ordered(comparator: &Token, ordering: std::cmp::Ordering) -> RunResult<bool> {
    use std::cmp::Ordering::{Equal, Greater, Less};
    match comparator {
        Token::IsLessThan => Ok(ordering == Less),
        Token::IsLessThanOrEqualTo => Ok(matches!(ordering, Less | Equal)),
        Token::IsGreaterThan => Ok(ordering == Greater),
        Token::IsGreaterThanOrEqualTo => Ok(matches!(ordering, Greater | Equal)),
        other => Err(RuntimeError::Structure(format!(
            "'{}' is not a comparator",
            other.lexeme()
        ))),
    }
}

fn boolean_operand(token: &Token) -> RunResult<bool> {
    match Value::from_token(token)? {
        Value::Boolean(b) => Ok(b),
        other => Err(RuntimeError::Type(format!(
            "boolean logic needs booleans, found a {}",
            other.kind()
        ))),
    }
}

fn bool_binary(args: Vec<Token>) -> RunResult<Token> {
    let [left, keyword, right] = arity::<3>(args, "boolean logic")?;
    let left = boolean_operand(&left)?;
    let right = boolean_operand(&right)?;
    let result = match keyword {
        Token::And => left && right,
        Token::Or => left || right,
        other => {
            return Err(RuntimeError::Structure(format!(
                "'{}' is not a boolean connective",
                other.lexeme()
            )))
        }
    };
    Ok(Value::Boolean(result).to_token())
}

fn bool_unary(args: Vec<Token>) -> RunResult<Token> {
    let [keyword, operand] = arity::<2>(args, "boolean logic")?;
    let operand = boolean_operand(&operand)?;
    match keyword {
        Token::Not => Ok(Value::Boolean(!operand).to_token()),
        other => Err(RuntimeError::Structure(format!(
            "'{}' is not a boolean connective",
            other.lexeme()
        ))),
    }
}

fn read_by_index(args: Vec<Token>) -> RunResult<Token> {
    let [target, index] = arity::<2>(args, "READBYINDEX")?;
    let target = Value::from_token(&target)?;
    let index = Value::from_token(&index)?;
    Ok(target.read_by_index(&index)?.to_token())
}

fn length(args: Vec<Token>) -> RunResult<Token> {
    let [target] = arity::<1>(args, "LENGTH")?;
    Ok(Value::Integer(Value::from_token(&target)?.length()?).to_token())
}

/// An `IF`/`WHILE` condition: booleans directly, or the integers 0 and 1.
fn condition_signal(args: Vec<Token>, open: Token, skip: Token) -> RunResult<Token> {
    let [condition] = arity::<1>(args, "a condition")?;
    let truth = match Value::from_token(&condition)? {
        Value::Boolean(b) => b,
        Value::Integer(1) => true,
        Value::Integer(0) => false,
        other => {
            return Err(RuntimeError::Type(format!(
                "a {} is not a valid condition",
                other.kind()
            )))
        }
    };
    Ok(if truth { open } else { skip })
}

fn collection_read(args: Vec<Token>) -> RunResult<Token> {
    let [target] = arity::<1>(args, "READITEM")?;
    Ok(Value::from_token(&target)?.read_item()?.to_token())
}

fn dict_lookup(args: Vec<Token>) -> RunResult<Token> {
    let [target, key] = arity::<2>(args, "LOOKUPVALUE")?;
    let Value::Dictionary(dictionary) = Value::from_token(&target)? else {
        return Err(RuntimeError::Type(
            "LOOKUPVALUE works on dictionaries".into(),
        ));
    };
    Ok(dictionary.lookup(&Value::from_token(&key)?)?.to_token())
}

fn dict_keys(args: Vec<Token>) -> RunResult<Token> {
    let [target] = arity::<1>(args, "LISTKEYS")?;
    let Value::Dictionary(dictionary) = Value::from_token(&target)? else {
        return Err(RuntimeError::Type("LISTKEYS works on dictionaries".into()));
    };
    Ok(Value::Array(dictionary.keys()).to_token())
}
