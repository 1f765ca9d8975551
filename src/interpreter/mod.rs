//! # Interpreter
//!
//! The program runner walks the parsed lines with a cursor, evaluates
//! each one, and acts on the control-flow signals the evaluator sends
//! back up: opening and closing scope frames, skipping past the bodies of
//! untaken branches, and jumping the cursor for loops. The evaluator
//! itself never suspends; every cross-line decision travels through a
//! signal token, which keeps the two halves decoupled.

mod dictionary;
mod error;
mod eval;
mod scope;
mod value;

pub use dictionary::Dictionary;
pub use error::{RunResult, RuntimeError};
pub use eval::evaluate;
pub use scope::{FrameCondition, FrameKind, Scope};
pub use value::{PriorityItem, Value, ValueKind};

use log::trace;

use crate::ast::{AstNode, OpKind};
use crate::lexer::Token;

/// What a line contributes to control-flow nesting, judged from its
/// parsed form alone. Used while skipping over untaken bodies, where the
/// lines must not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineSignal {
    OpenIf,
    EndIf,
    Else,
    OpenWhile,
    EndWhile,
    OpenFor,
    EndFor,
}

fn line_signal(line: &AstNode) -> Option<LineSignal> {
    match line {
        AstNode::Operator { op: OpKind::If, .. } => Some(LineSignal::OpenIf),
        AstNode::Operator {
            op: OpKind::While, ..
        } => Some(LineSignal::OpenWhile),
        AstNode::Operator { op: OpKind::For, .. } => Some(LineSignal::OpenFor),
        AstNode::Leaf(Token::Else) => Some(LineSignal::Else),
        AstNode::Leaf(Token::EndIf) => Some(LineSignal::EndIf),
        AstNode::Leaf(Token::EndWhile) => Some(LineSignal::EndWhile),
        AstNode::Leaf(Token::EndFor) => Some(LineSignal::EndFor),
        _ => None,
    }
}

pub struct ProgramRunner {
    lines: Vec<AstNode>,
}

impl ProgramRunner {
    pub fn new(lines: Vec<AstNode>) -> Self {
        ProgramRunner { lines }
    }

    /// Run the program, printing `OUTPUT` lines to stdout.
    pub fn run(&self) -> RunResult<()> {
        self.execute(|line| println!("{line}"))
    }

    /// Run the program, handing every produced output line to `emit`.
    pub fn execute<F: FnMut(&str)>(&self, mut emit: F) -> RunResult<()> {
        let mut scope = Scope::new();
        let mut cursor: isize = -1;

        while cursor + 1 < self.lines.len() as isize {
            cursor += 1;
            trace!("evaluating line {}", cursor + 1);
            let signal = evaluate(&self.lines[cursor as usize], &mut scope)?;
            self.act_on(signal, &mut cursor, &mut scope, &mut emit)?;
        }

        if scope.depth() != 1 {
            return Err(RuntimeError::Structure(format!(
                "the program ended with {} statement(s) left open",
                scope.depth() - 1
            )));
        }
        Ok(())
    }

    fn act_on<F: FnMut(&str)>(
        &self,
        signal: Token,
        cursor: &mut isize,
        scope: &mut Scope,
        emit: &mut F,
    ) -> RunResult<()> {
        match signal {
            Token::OutputRequest(items) => {
                emit(&render_output(&items)?);
            }

            Token::OpenIf => scope.push(FrameKind::If, FrameCondition::RunElse(false)),
            Token::SkipIf => {
                scope.push(FrameKind::If, FrameCondition::RunElse(true));
                self.skip_until(cursor, &[LineSignal::EndIf, LineSignal::Else])?;
            }
            Token::Else => {
                let (kind, condition) = scope.pop_constructive()?;
                if kind != FrameKind::If {
                    return Err(RuntimeError::Structure(
                        "ELSE without an open IF statement".into(),
                    ));
                }
                scope.push(FrameKind::If, FrameCondition::None);
                if !matches!(condition, FrameCondition::RunElse(true)) {
                    self.skip_until(cursor, &[LineSignal::EndIf])?;
                }
            }
            Token::EndIf => {
                let (kind, _) = scope.pop_constructive()?;
                if kind != FrameKind::If {
                    return Err(RuntimeError::Structure(
                        "ENDIF without an open IF statement".into(),
                    ));
                }
            }

            Token::OpenWhile => {
                scope.push(FrameKind::While, FrameCondition::Resume(*cursor as usize));
            }
            Token::SkipWhile => {
                scope.push(FrameKind::While, FrameCondition::None);
                self.skip_until(cursor, &[LineSignal::EndWhile])?;
            }
            Token::EndWhile => {
                let (kind, condition) = scope.pop_constructive()?;
                if kind != FrameKind::While {
                    return Err(RuntimeError::Structure(
                        "ENDWHILE without an open WHILE statement".into(),
                    ));
                }
                // jump back so the header is evaluated again next step
                if let FrameCondition::Resume(header) = condition {
                    *cursor = header as isize - 1;
                }
            }

            Token::OpenFor { name, values } => {
                let Some((first, rest)) = values.split_first() else {
                    return Err(RuntimeError::Structure(
                        "a FOR statement opened with nothing to iterate".into(),
                    ));
                };
                scope.push(
                    FrameKind::For,
                    FrameCondition::Iteration {
                        name: name.clone(),
                        remaining: rest.to_vec(),
                        start: *cursor as usize,
                    },
                );
                scope.make(&name, first.clone())?;
            }
            Token::SkipFor => {
                scope.push(FrameKind::For, FrameCondition::None);
                self.skip_until(cursor, &[LineSignal::EndFor])?;
            }
            Token::EndFor => {
                if scope.top_kind()? != FrameKind::For {
                    return Err(RuntimeError::Structure(
                        "ENDFOR without an open FOR statement".into(),
                    ));
                }
                // the loop variable dies before the pop, so it never
                // leaks into the enclosing frame
                let condition = scope.top_condition()?.clone();
                if let FrameCondition::Iteration { name, .. } = &condition {
                    scope.delete(name)?;
                }
                scope.pop_constructive()?;
                if let FrameCondition::Iteration {
                    name,
                    remaining,
                    start,
                } = condition
                {
                    if let Some((next, rest)) = remaining.split_first() {
                        scope.push(
                            FrameKind::For,
                            FrameCondition::Iteration {
                                name: name.clone(),
                                remaining: rest.to_vec(),
                                start,
                            },
                        );
                        scope.make(&name, next.clone())?;
                        *cursor = start as isize;
                    }
                }
            }

            // anything else is a plain value or a no-op line
            _ => {}
        }
        Ok(())
    }

    /// Advance the cursor to the next matching target line at the current
    /// nesting depth, then step back one so the main loop re-reads it.
    /// Skipped lines are classified from their parsed form only, never
    /// evaluated.
    fn skip_until(&self, cursor: &mut isize, targets: &[LineSignal]) -> RunResult<()> {
        let mut nesting = [0i32; 3];
        loop {
            *cursor += 1;
            if *cursor as usize >= self.lines.len() {
                return Err(RuntimeError::Structure(
                    "reached the end of the program while looking for a closing statement"
                        .into(),
                ));
            }
            let Some(signal) = line_signal(&self.lines[*cursor as usize]) else {
                continue;
            };
            if nesting.iter().all(|&count| count == 0) && targets.contains(&signal) {
                *cursor -= 1;
                return Ok(());
            }
            match signal {
                LineSignal::OpenIf => nesting[0] += 1,
                LineSignal::EndIf => nesting[0] -= 1,
                LineSignal::OpenWhile => nesting[1] += 1,
                LineSignal::EndWhile => nesting[1] -= 1,
                LineSignal::OpenFor => nesting[2] += 1,
                LineSignal::EndFor => nesting[2] -= 1,
                LineSignal::Else => {}
            }
        }
    }
}

/// One `OUTPUT` line: `"> "` followed by each argument's representation,
/// with no separator.
fn render_output(items: &[Token]) -> RunResult<String> {
    let mut line = String::from("> ");
    for item in items {
        line.push_str(&Value::from_token(item)?.output_representation()?);
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_line;

    fn runner(source: &str) -> ProgramRunner {
        let lines = source
            .lines()
            .map(|line| parse_line(&tokenize(line).unwrap()).unwrap())
            .collect();
        ProgramRunner::new(lines)
    }

    fn run_collect(source: &str) -> RunResult<Vec<String>> {
        let mut output = Vec::new();
        runner(source).execute(|line| output.push(line.to_owned()))?;
        Ok(output)
    }

    #[test]
    fn test_arithmetic_and_promotion() {
        let output = run_collect("INTEGER a = 3\nFLOAT b = 2\nOUTPUT(a + b)").unwrap();
        assert_eq!(vec!["> 5.0"], output);
    }

    #[test]
    fn test_while_loop_preserves_body_variables() {
        let source = "INTEGER n = 0\n\
                      WHILE n ISLESSTHAN 3 DO\n\
                      INTEGER n = n + 1\n\
                      ENDWHILE\n\
                      OUTPUT(n)";
        assert_eq!(vec!["> 3"], run_collect(source).unwrap());
    }

    #[test]
    fn test_for_loop_sums_and_drops_its_variable() {
        let source = "ARRAY xs = [10, 20, 30]\n\
                      INTEGER total = 0\n\
                      FOR x IN xs DO\n\
                      total = total + x\n\
                      ENDFOR\n\
                      OUTPUT(total)";
        assert_eq!(vec!["> 60"], run_collect(source).unwrap());

        let leaky = "ARRAY xs = [1]\n\
                     FOR x IN xs DO\n\
                     ENDFOR\n\
                     OUTPUT(x)";
        assert!(matches!(run_collect(leaky), Err(RuntimeError::Name(_))));
    }

    #[test]
    fn test_for_over_empty_array_runs_no_iterations() {
        let source = "ARRAY xs = []\n\
                      FOR x IN xs DO\n\
                      OUTPUT(\"never\")\n\
                      ENDFOR\n\
                      OUTPUT(\"done\")";
        assert_eq!(vec!["> done"], run_collect(source).unwrap());
    }

    #[test]
    fn test_if_takes_the_true_branch() {
        let source = "INTEGER x = 5\n\
                      IF x ISGREATERTHAN 3 DO\n\
                      OUTPUT(\"big\")\n\
                      ELSE\n\
                      OUTPUT(\"small\")\n\
                      ENDIF";
        assert_eq!(vec!["> big"], run_collect(source).unwrap());
    }

    #[test]
    fn test_if_takes_the_else_branch() {
        let source = "INTEGER x = 1\n\
                      IF x ISGREATERTHAN 3 DO\n\
                      OUTPUT(\"big\")\n\
                      ELSE\n\
                      OUTPUT(\"small\")\n\
                      ENDIF";
        assert_eq!(vec!["> small"], run_collect(source).unwrap());
    }

    #[test]
    fn test_nested_statements_skip_as_a_block() {
        let source = "INTEGER x = 0\n\
                      IF x ISEQUALTO 1 DO\n\
                      WHILE TRUE DO\n\
                      OUTPUT(\"inner\")\n\
                      ENDWHILE\n\
                      ELSE\n\
                      OUTPUT(\"outer\")\n\
                      ENDIF";
        assert_eq!(vec!["> outer"], run_collect(source).unwrap());
    }

    #[test]
    fn test_nested_for_loops() {
        let source = "ARRAY xs = [1, 2]\n\
                      ARRAY ys = [10, 20]\n\
                      INTEGER total = 0\n\
                      FOR x IN xs DO\n\
                      FOR y IN ys DO\n\
                      total = total + x * y\n\
                      ENDFOR\n\
                      ENDFOR\n\
                      OUTPUT(total)";
        assert_eq!(vec!["> 90"], run_collect(source).unwrap());
    }

    #[test]
    fn test_priority_queue_scenario() {
        let source = "PRIORITYQUEUE q\n\
                      q.ADDITEM(\"low\", 1)\n\
                      q.ADDITEM(\"hi\", 5)\n\
                      q.ADDITEM(\"mid\", 3)\n\
                      OUTPUT(q.READITEM)\n\
                      q.POPITEM\n\
                      OUTPUT(q.READITEM)";
        assert_eq!(vec!["> hi", "> mid"], run_collect(source).unwrap());
    }

    #[test]
    fn test_slicing_asymmetry_scenario() {
        let source = "STRING s = \"abcdef\"\n\
                      ARRAY a = [10, 20, 30, 40, 50]\n\
                      OUTPUT(s.READBYINDEX([1,4]))\n\
                      OUTPUT(a.READBYINDEX([1,4]))";
        assert_eq!(
            vec!["> bcd", "> [20, 30, 40, 50]"],
            run_collect(source).unwrap()
        );
    }

    #[test]
    fn test_empty_lines_have_no_effect() {
        let source = "INTEGER a = 1\n\n\nOUTPUT(a)";
        assert_eq!(vec!["> 1"], run_collect(source).unwrap());
    }

    #[test]
    fn test_unclosed_statement_is_a_structure_error() {
        let source = "INTEGER x = 1\nIF x ISEQUALTO 1 DO\nOUTPUT(\"open\")";
        assert!(matches!(
            run_collect(source),
            Err(RuntimeError::Structure(_))
        ));
    }

    #[test]
    fn test_mismatched_closer_is_a_structure_error() {
        let source = "INTEGER x = 1\nIF x ISEQUALTO 1 DO\nENDWHILE";
        assert!(matches!(
            run_collect(source),
            Err(RuntimeError::Structure(_))
        ));
    }

    #[test]
    fn test_stray_closer_is_a_structure_error() {
        assert!(matches!(
            run_collect("ENDIF"),
            Err(RuntimeError::Structure(_))
        ));
    }

    #[test]
    fn test_printing_a_stack_is_a_type_error() {
        let source = "STACK s\nOUTPUT(s)";
        assert!(matches!(run_collect(source), Err(RuntimeError::Type(_))));
    }

    #[test]
    fn test_while_header_on_the_first_line() {
        let source = "WHILE FALSE DO\n\
                      OUTPUT(\"never\")\n\
                      ENDWHILE\n\
                      OUTPUT(\"after\")";
        assert_eq!(vec!["> after"], run_collect(source).unwrap());
    }

    #[test]
    fn test_countdown_loop_jumps_back_to_the_header() {
        let source = "INTEGER n = 3\n\
                      WHILE n ISGREATERTHAN 0 DO\n\
                      OUTPUT(n)\n\
                      INTEGER n = n - 1\n\
                      ENDWHILE";
        assert_eq!(vec!["> 3", "> 2", "> 1"], run_collect(source).unwrap());
    }
}
