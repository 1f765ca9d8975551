//! The scope stack: one frame per open statement, with the base frame at
//! the bottom. Frames record which statement opened them and any state
//! the runner needs to close them again (an else flag, a loop header
//! line, the remaining iteration values).

use std::collections::HashMap;

use super::error::{RunResult, RuntimeError};
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Base,
    If,
    While,
    For,
}

/// What the runner left behind when it opened the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameCondition {
    None,
    /// `IF` frames: whether a later `ELSE` body should run.
    RunElse(bool),
    /// `WHILE` frames: the line index of the loop header.
    Resume(usize),
    /// `FOR` frames: the loop variable, the values still to iterate, and
    /// the line index of the `FOR` header.
    Iteration {
        name: String,
        remaining: Vec<Value>,
        start: usize,
    },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    condition: FrameCondition,
    values: HashMap<String, Value>,
}

impl Frame {
    fn new(kind: FrameKind, condition: FrameCondition) -> Self {
        Frame {
            kind,
            condition,
            values: HashMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct Scope {
    frames: Vec<Frame>,
}

impl Default for Scope {
    fn default() -> Self {
        Scope {
            frames: vec![Frame::new(FrameKind::Base, FrameCondition::None)],
        }
    }
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, kind: FrameKind, condition: FrameCondition) {
        self.frames.push(Frame::new(kind, condition));
    }

    pub fn top_kind(&self) -> RunResult<FrameKind> {
        self.frames
            .last()
            .map(|frame| frame.kind)
            .ok_or_else(no_frames)
    }

    pub fn top_condition(&self) -> RunResult<&FrameCondition> {
        self.frames
            .last()
            .map(|frame| &frame.condition)
            .ok_or_else(no_frames)
    }

    /// Look a name up, innermost frame first.
    pub fn lookup(&self, name: &str) -> RunResult<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.values.get(name))
            .ok_or_else(|| {
                RuntimeError::Name(format!("there is no variable named '{name}' in scope"))
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames
            .iter()
            .any(|frame| frame.values.contains_key(name))
    }

    /// Whether the name is already declared in the innermost frame.
    pub fn declared_here(&self, name: &str) -> bool {
        self.frames
            .last()
            .map(|frame| frame.values.contains_key(name))
            .unwrap_or(false)
    }

    /// Create a new variable in the innermost frame.
    pub fn make(&mut self, name: &str, value: Value) -> RunResult<()> {
        let Some(frame) = self.frames.last_mut() else {
            return Err(no_frames());
        };
        if frame.values.contains_key(name) {
            return Err(RuntimeError::Name(format!(
                "a variable named '{name}' already exists in this scope"
            )));
        }
        frame.values.insert(name.into(), value);
        Ok(())
    }

    /// Change an existing variable, wherever it lives. The new value must
    /// keep the variable's kind.
    pub fn set(&mut self, name: &str, value: Value) -> RunResult<()> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(existing) = frame.values.get(name) {
                if existing.kind() != value.kind() {
                    return Err(RuntimeError::Type(format!(
                        "cannot assign a {} to '{name}', which holds a {}",
                        value.kind(),
                        existing.kind()
                    )));
                }
                frame.values.insert(name.into(), value);
                return Ok(());
            }
        }
        Err(RuntimeError::Name(format!(
            "cannot assign to '{name}', it has not been declared"
        )))
    }

    /// Remove a variable from its containing frame.
    pub fn delete(&mut self, name: &str) -> RunResult<()> {
        for frame in self.frames.iter_mut().rev() {
            if frame.values.remove(name).is_some() {
                return Ok(());
            }
        }
        Err(RuntimeError::Name(format!(
            "cannot delete '{name}', it has not been declared"
        )))
    }

    /// Close the innermost frame, discarding its variables.
    pub fn pop_destructive(&mut self) -> RunResult<(FrameKind, FrameCondition)> {
        let frame = self.pop_frame()?;
        Ok((frame.kind, frame.condition))
    }

    /// Close the innermost frame, carrying its variables down into the
    /// frame below. A carried name that already exists below is updated
    /// in place (the kinds must agree), so loop bodies can re-declare.
    pub fn pop_constructive(&mut self) -> RunResult<(FrameKind, FrameCondition)> {
        let frame = self.pop_frame()?;
        for (name, value) in frame.values {
            self.carry_down(name, value)?;
        }
        Ok((frame.kind, frame.condition))
    }

    fn pop_frame(&mut self) -> RunResult<Frame> {
        if self.frames.len() <= 1 {
            return Err(RuntimeError::Structure(
                "the base frame cannot be closed".into(),
            ));
        }
        self.frames.pop().ok_or_else(no_frames)
    }

    fn carry_down(&mut self, name: String, value: Value) -> RunResult<()> {
        let Some(frame) = self.frames.last_mut() else {
            return Err(no_frames());
        };
        if let Some(existing) = frame.values.get(&name) {
            if existing.kind() != value.kind() {
                return Err(RuntimeError::Type(format!(
                    "cannot carry a {} into '{name}', which holds a {}",
                    value.kind(),
                    existing.kind()
                )));
            }
        }
        frame.values.insert(name, value);
        Ok(())
    }
}

fn no_frames() -> RuntimeError {
    RuntimeError::Structure("the scope stack is empty".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() {
        let mut scope = Scope::new();
        scope.make("x", Value::Integer(1)).unwrap();
        scope.push(FrameKind::If, FrameCondition::RunElse(false));
        assert_eq!(Ok(&Value::Integer(1)), scope.lookup("x"));
    }

    #[test]
    fn test_inner_frame_shadows_outer() {
        let mut scope = Scope::new();
        scope.make("x", Value::Integer(1)).unwrap();
        scope.push(FrameKind::For, FrameCondition::None);
        scope.make("x", Value::Integer(2)).unwrap();
        assert_eq!(Ok(&Value::Integer(2)), scope.lookup("x"));
        scope.delete("x").unwrap();
        assert_eq!(Ok(&Value::Integer(1)), scope.lookup("x"));
    }

    #[test]
    fn test_make_rejects_same_frame_duplicates() {
        let mut scope = Scope::new();
        scope.make("x", Value::Integer(1)).unwrap();
        assert!(matches!(
            scope.make("x", Value::Integer(2)),
            Err(RuntimeError::Name(_))
        ));
    }

    #[test]
    fn test_set_enforces_the_declared_kind() {
        let mut scope = Scope::new();
        scope.make("x", Value::Integer(1)).unwrap();
        assert!(matches!(
            scope.set("x", Value::Float(2.0)),
            Err(RuntimeError::Type(_))
        ));
        assert!(scope.set("x", Value::Integer(2)).is_ok());
    }

    #[test]
    fn test_constructive_pop_carries_variables_down() {
        let mut scope = Scope::new();
        scope.push(FrameKind::While, FrameCondition::Resume(4));
        scope.make("x", Value::Integer(1)).unwrap();
        let (kind, condition) = scope.pop_constructive().unwrap();
        assert_eq!(FrameKind::While, kind);
        assert_eq!(FrameCondition::Resume(4), condition);
        assert_eq!(Ok(&Value::Integer(1)), scope.lookup("x"));
    }

    #[test]
    fn test_constructive_pop_updates_existing_names() {
        let mut scope = Scope::new();
        scope.make("x", Value::Integer(1)).unwrap();
        scope.push(FrameKind::While, FrameCondition::None);
        scope.make("x", Value::Integer(5)).unwrap();
        scope.pop_constructive().unwrap();
        assert_eq!(Ok(&Value::Integer(5)), scope.lookup("x"));
        assert_eq!(1, scope.depth());
    }

    #[test]
    fn test_destructive_pop_discards_variables() {
        let mut scope = Scope::new();
        scope.push(FrameKind::If, FrameCondition::None);
        scope.make("temp", Value::Integer(1)).unwrap();
        scope.pop_destructive().unwrap();
        assert!(scope.lookup("temp").is_err());
    }

    #[test]
    fn test_base_frame_cannot_be_popped() {
        let mut scope = Scope::new();
        assert!(matches!(
            scope.pop_constructive(),
            Err(RuntimeError::Structure(_))
        ));
    }
}
