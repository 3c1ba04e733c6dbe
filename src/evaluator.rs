//! The tree-walking statement/expression evaluator (§4.4).
//!
//! Drives the program counter `(cur_fid, cur_ln)` over a loaded
//! [`Program`], dispatching one [`Statement`] at a time against a
//! per-frame variable namespace and a call stack of [`CallFrame`]s. User
//! exceptions are not Rust errors (see [`crate::error`]'s module comment);
//! only compile-time-impossible conditions use `Result`'s `?` channel.

use std::collections::HashMap;

use crate::ast::{AssignSource, Expr, LineRef, LineTarget, Statement};
use crate::constants::{CALL_STACK_LIMIT, FID_MAIN, IMPLICIT_MAIN_LABEL, OP_FAIL, RESERVED_FATAL_EXCEPTION};
use crate::error::{RuntimeError, RuntimeErrorKind, RuntimeResult, SourceLoc};
use crate::keyword::Stream;
use crate::loader::Program;
use crate::operators::{self, OperatorOutcome};
use crate::streams::Streams;
use crate::value::Value;
use util::EnumFromStr;

/// The result of reducing an expression: either a value, or the name of a
/// user exception that fired partway through (div/mod by zero, `#`
/// out-of-range, or any nested `JUMP`... well, `JUMP` isn't an expression,
/// so in practice this is always `OP_FAIL`, but the evaluator treats the
/// channel generically).
enum ExprOutcome {
    Value(Value),
    Thrown(String),
}

type ExprResult = RuntimeResult<ExprOutcome>;

#[derive(Clone, Debug)]
struct CallFrame {
    return_fid: u32,
    return_ln: u32,
    saved_vars: HashMap<String, Value>,
    handlers: HashMap<String, (u32, u32)>,
}

/// What happened after one `run` loop either halts cleanly or hits a fatal
/// error. The REPL cares which; a plain script run only cares about `Err`.
pub enum RunOutcome {
    Halted,
}

pub struct Evaluator<'p> {
    program: &'p Program,
    cur_fid: u32,
    cur_ln: Option<u32>,
    vars: HashMap<String, Value>,
    call_stack: Vec<CallFrame>,
    unsafe_jump: bool,
    debug: bool,
}

impl<'p> Evaluator<'p> {
    pub fn new(program: &'p Program, args: &[String], unsafe_jump: bool, debug: bool) -> Evaluator<'p> {
        let mut vars = HashMap::new();
        for (i, arg) in args.iter().enumerate() {
            vars.insert(format!("ARG{}", i + 1), Value::Str(arg.clone()));
        }
        let main_line = *program.file(FID_MAIN).labels.get(IMPLICIT_MAIN_LABEL).unwrap_or(&1);
        Evaluator {
            program,
            cur_fid: FID_MAIN,
            cur_ln: Some(main_line),
            vars,
            call_stack: Vec::new(),
            unsafe_jump,
            debug,
        }
    }

    /// Starts at `MAIN`'s transient one-past-the-end line with `vars`
    /// already installed, rather than at `MAIN`'s default entry point. Used
    /// by the REPL (§6, §12): each entered line runs with `cur_ln = +∞`
    /// (concretely, one past the last line `MAIN` stores) so it is never
    /// confused with a stored line, and picks up the namespace left over
    /// from the previous line. A bare advance (an `INTO`, or a `GOIF` that
    /// falls through) pushes `cur_ln` past this point again, which the
    /// ordinary PC-step loop then reads as "no call stack, nothing to run" —
    /// precisely the REPL's "one statement, then back to the prompt"
    /// behavior. A `GO`/`JUMP`/taken `GOIF` instead sends execution into
    /// the loaded program itself, same as `evaluate_input` in the prototype.
    pub fn resume(program: &'p Program, vars: HashMap<String, Value>, unsafe_jump: bool, debug: bool) -> Evaluator<'p> {
        let transient_ln = program.file(FID_MAIN).max_line();
        Evaluator {
            program,
            cur_fid: FID_MAIN,
            cur_ln: Some(transient_ln),
            vars,
            call_stack: Vec::new(),
            unsafe_jump,
            debug,
        }
    }

    pub fn vars(&self) -> &HashMap<String, Value> {
        &self.vars
    }

    pub fn into_vars(self) -> HashMap<String, Value> {
        self.vars
    }

    /// Runs one statement directly, without touching the program counter.
    /// This is how the REPL evaluates a typed-in line: it is parsed once
    /// by the caller and handed straight to the evaluator (`cur_ln = +∞`
    /// throughout, per §6), then [`Evaluator::run`] drains whatever call
    /// stack that one statement may have pushed (a `JUMP`).
    pub fn run_one(&mut self, stmt: &Statement, streams: &mut dyn Streams) -> RuntimeResult<()> {
        let loc = self.loc();
        self.dispatch(stmt, &loc, streams)
    }

    /// The PC-step loop (§4.4's "PC step"). Returns once the call stack is
    /// empty and there is no more code to run.
    pub fn run(&mut self, streams: &mut dyn Streams) -> RuntimeResult<RunOutcome> {
        loop {
            let cur_ln = match self.cur_ln {
                Some(ln) => ln,
                None => {
                    if self.call_stack.is_empty() {
                        return Ok(RunOutcome::Halted);
                    }
                    self.do_return(&[], streams)?;
                    continue;
                }
            };

            let file = self.program.file(self.cur_fid);
            if cur_ln > file.max_line() {
                self.do_return(&[], streams)?;
                continue;
            }

            let stmt = match file.line(cur_ln) {
                Some(stmt) => stmt.clone(),
                None => {
                    self.cur_ln = Some(cur_ln + 1);
                    continue;
                }
            };

            if self.debug {
                let _ = streams.write_stderr(&format!("{} {:?}\n", cur_ln, stmt));
            }

            let loc = SourceLoc::new(file.display_name.clone(), cur_ln);
            self.dispatch(&stmt, &loc, streams)?;
        }
    }

    fn loc(&self) -> SourceLoc {
        let display_name = self.program.file(self.cur_fid).display_name.clone();
        SourceLoc::new(display_name, self.cur_ln.unwrap_or(0))
    }

    fn dispatch(&mut self, stmt: &Statement, loc: &SourceLoc, streams: &mut dyn Streams) -> RuntimeResult<()> {
        match stmt {
            Statement::Go(target) => {
                let (fid, ln) = self.resolve_line_ref(target, loc)?;
                self.cur_fid = fid;
                self.cur_ln = Some(ln);
                Ok(())
            }
            Statement::GoIf { target, cond } => self.do_goif(target, cond, loc, streams),
            Statement::Jump { target, args, handlers } => self.do_jump(target, args, handlers, loc, streams),
            Statement::Throw(name) => self.do_throw(name.clone(), loc),
            Statement::Return(rets) => self.do_return(rets, streams),
            Statement::Into { source, target } => self.do_into(source, target, loc, streams),
        }
    }

    fn do_goif(&mut self, target: &LineRef, cond: &Expr, loc: &SourceLoc, streams: &mut dyn Streams) -> RuntimeResult<()> {
        match self.eval_expr(cond, loc, streams)? {
            ExprOutcome::Thrown(name) => self.unwind(name, loc),
            ExprOutcome::Value(Value::Bool(true)) => {
                let (fid, ln) = self.resolve_line_ref(target, loc)?;
                self.cur_fid = fid;
                self.cur_ln = Some(ln);
                Ok(())
            }
            ExprOutcome::Value(Value::Bool(false)) => {
                self.cur_ln = Some(loc.line + 1);
                Ok(())
            }
            ExprOutcome::Value(_) => Err(RuntimeError::new(RuntimeErrorKind::NonBooleanCondition, loc.clone())),
        }
    }

    fn do_jump(
        &mut self,
        target: &LineRef,
        arg_exprs: &[Expr],
        handler_decls: &[crate::ast::Handler],
        loc: &SourceLoc,
        streams: &mut dyn Streams,
    ) -> RuntimeResult<()> {
        if self.call_stack.len() >= CALL_STACK_LIMIT && !self.unsafe_jump {
            return Err(RuntimeError::new(RuntimeErrorKind::StackOverflow, loc.clone()));
        }

        let mut arg_values = Vec::with_capacity(arg_exprs.len());
        for expr in arg_exprs {
            match self.eval_expr(expr, loc, streams)? {
                ExprOutcome::Value(v) => arg_values.push(v),
                ExprOutcome::Thrown(name) => return self.unwind(name, loc),
            }
        }

        let mut handlers = HashMap::new();
        for h in handler_decls {
            let resolved = self.resolve_line_ref(&h.target, loc)?;
            handlers.insert(h.exception.clone(), resolved);
        }

        let (target_fid, target_ln) = self.resolve_line_ref(target, loc)?;
        let saved_vars = self.vars.clone();

        self.call_stack.push(CallFrame {
            return_fid: self.cur_fid,
            return_ln: loc.line + 1,
            saved_vars,
            handlers,
        });

        let mut new_vars = HashMap::new();
        if arg_exprs.is_empty() {
            for (name, value) in self.vars.iter() {
                if is_numbered(name, "ARG") {
                    new_vars.insert(name.clone(), value.clone());
                }
            }
        } else {
            for (i, value) in arg_values.into_iter().enumerate() {
                new_vars.insert(format!("ARG{}", i + 1), value);
            }
        }

        self.vars = new_vars;
        self.cur_fid = target_fid;
        self.cur_ln = Some(target_ln);
        Ok(())
    }

    fn do_throw(&mut self, name: String, loc: &SourceLoc) -> RuntimeResult<()> {
        self.unwind(name, loc)
    }

    fn do_return(&mut self, rets: &[Expr], streams: &mut dyn Streams) -> RuntimeResult<()> {
        let loc = self.loc();
        if self.call_stack.is_empty() {
            self.cur_ln = None;
            return Ok(());
        }

        let mut computed = Vec::with_capacity(rets.len());
        for expr in rets {
            match self.eval_expr(expr, &loc, streams)? {
                ExprOutcome::Value(v) => computed.push(v),
                ExprOutcome::Thrown(name) => return self.unwind(name, &loc),
            }
        }

        let frame = self.call_stack.pop().expect("checked non-empty above");
        let mut restored = frame.saved_vars;

        if rets.is_empty() {
            for (name, value) in self.vars.iter() {
                if is_numbered(name, "RET") {
                    restored.insert(name.clone(), value.clone());
                }
            }
        } else {
            for (i, value) in computed.into_iter().enumerate() {
                restored.insert(format!("RET{}", i + 1), value);
            }
        }

        self.vars = restored;
        self.cur_fid = frame.return_fid;
        self.cur_ln = Some(frame.return_ln);
        Ok(())
    }

    fn do_into(&mut self, source: &AssignSource, target: &str, loc: &SourceLoc, streams: &mut dyn Streams) -> RuntimeResult<()> {
        match source {
            AssignSource::Unset => {
                self.vars.remove(target);
            }
            AssignSource::Expr(expr) => match self.eval_expr(expr, loc, streams)? {
                ExprOutcome::Thrown(name) => return self.unwind(name, loc),
                ExprOutcome::Value(value) => match Stream::from_str(target) {
                    Ok(Stream::STDOUT) => {
                        streams
                            .write_stdout(&value.to_string())
                            .map_err(|e| RuntimeError::new(RuntimeErrorKind::Io(e.to_string()), loc.clone()))?;
                    }
                    Ok(Stream::STDERR) => {
                        streams
                            .write_stderr(&value.to_string())
                            .map_err(|e| RuntimeError::new(RuntimeErrorKind::Io(e.to_string()), loc.clone()))?;
                    }
                    Ok(Stream::STDIN) => return Err(RuntimeError::new(RuntimeErrorKind::WriteToStdin, loc.clone())),
                    Err(_) => {
                        if self.debug {
                            let _ = streams.write_stderr(&format!("Storing {:?} into {}.\n", value, target));
                        }
                        self.vars.insert(target.to_owned(), value);
                    }
                },
            },
        }

        self.cur_ln = Some(loc.line + 1);
        Ok(())
    }

    /// Pops frames looking for a handler of `name`, building the unwind
    /// chain as it goes (§4.4 "throw", §7).
    fn unwind(&mut self, name: String, loc: &SourceLoc) -> RuntimeResult<()> {
        if name == RESERVED_FATAL_EXCEPTION {
            return Err(RuntimeError::new(RuntimeErrorKind::ExplicitError, loc.clone()));
        }

        let mut chain = Vec::new();
        loop {
            match self.call_stack.pop() {
                None => {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::UncaughtException { name, chain },
                        loc.clone(),
                    ));
                }
                Some(frame) => {
                    let call_site = SourceLoc::new(
                        self.program.file(frame.return_fid).display_name.clone(),
                        frame.return_ln.saturating_sub(1),
                    );
                    if let Some(&(h_fid, h_ln)) = frame.handlers.get(&name) {
                        self.vars = frame.saved_vars;
                        self.cur_fid = h_fid;
                        self.cur_ln = Some(h_ln);
                        return Ok(());
                    }
                    chain.push(call_site);
                }
            }
        }
    }

    fn resolve_line_ref(&self, line_ref: &LineRef, loc: &SourceLoc) -> RuntimeResult<(u32, u32)> {
        let fid = match &line_ref.alias {
            Some(alias) => *self
                .program
                .file(self.cur_fid)
                .alias_table
                .get(alias)
                .expect("alias existence checked at compile time"),
            None => self.cur_fid,
        };

        let ln = match &line_ref.target {
            LineTarget::Absolute(n) => *n,
            LineTarget::Relative(n) => loc.line as i64 + n,
            LineTarget::Label(label) => {
                *self.program.file(fid).labels.get(label).expect("label existence checked at compile time") as i64
            }
        };

        if ln <= 0 {
            return Err(RuntimeError::new(
                RuntimeErrorKind::InvalidJumpTarget(format!("Line {} does not exist", ln)),
                loc.clone(),
            ));
        }

        Ok((fid, ln as u32))
    }

    fn eval_expr(&mut self, expr: &Expr, loc: &SourceLoc, streams: &mut dyn Streams) -> ExprResult {
        match expr {
            Expr::IntLit(n) => Ok(ExprOutcome::Value(Value::Int(*n))),
            Expr::BoolLit(b) => Ok(ExprOutcome::Value(Value::Bool(*b))),
            Expr::StrSigil(key) => Ok(ExprOutcome::Value(Value::Str(self.program.strings.resolve(*key).to_owned()))),
            Expr::Var(name) => self.read_var(name, loc, streams),
            Expr::UnsetQuery(name) => Ok(ExprOutcome::Value(Value::Bool(!self.vars.contains_key(name)))),
            Expr::Unary { op, operand } => match self.eval_expr(operand, loc, streams)? {
                ExprOutcome::Thrown(name) => Ok(ExprOutcome::Thrown(name)),
                ExprOutcome::Value(v) => Ok(ExprOutcome::Value(operators::apply_unary(*op, v, loc)?)),
            },
            Expr::Binary { op, lhs, rhs } => {
                let lhs_v = match self.eval_expr(lhs, loc, streams)? {
                    ExprOutcome::Thrown(name) => return Ok(ExprOutcome::Thrown(name)),
                    ExprOutcome::Value(v) => v,
                };
                let rhs_v = match self.eval_expr(rhs, loc, streams)? {
                    ExprOutcome::Thrown(name) => return Ok(ExprOutcome::Thrown(name)),
                    ExprOutcome::Value(v) => v,
                };
                match operators::apply_binary(*op, lhs_v, rhs_v, loc)? {
                    OperatorOutcome::Value(v) => Ok(ExprOutcome::Value(v)),
                    OperatorOutcome::OpFail => {
                        if self.debug {
                            let _ = streams.write_stderr("Failed expression.  Throwing OP_FAIL\n");
                        }
                        Ok(ExprOutcome::Thrown(OP_FAIL.to_owned()))
                    }
                }
            }
            Expr::Ternary { cond, then_branch, else_branch } => {
                let cond_v = match self.eval_expr(cond, loc, streams)? {
                    ExprOutcome::Thrown(name) => return Ok(ExprOutcome::Thrown(name)),
                    ExprOutcome::Value(v) => v,
                };
                let then_v = match self.eval_expr(then_branch, loc, streams)? {
                    ExprOutcome::Thrown(name) => return Ok(ExprOutcome::Thrown(name)),
                    ExprOutcome::Value(v) => v,
                };
                let else_v = match self.eval_expr(else_branch, loc, streams)? {
                    ExprOutcome::Thrown(name) => return Ok(ExprOutcome::Thrown(name)),
                    ExprOutcome::Value(v) => v,
                };
                Ok(ExprOutcome::Value(operators::apply_ternary(cond_v, then_v, else_v, loc)?))
            }
        }
    }

    fn read_var(&mut self, name: &str, loc: &SourceLoc, streams: &mut dyn Streams) -> ExprResult {
        match Stream::from_str(name) {
            Ok(Stream::STDIN) => {
                let line = streams
                    .read_stdin_line()
                    .map_err(|e| RuntimeError::new(RuntimeErrorKind::Io(e.to_string()), loc.clone()))?;
                Ok(ExprOutcome::Value(Value::Str(line)))
            }
            Ok(Stream::STDOUT) => Err(RuntimeError::new(RuntimeErrorKind::ReadFromStdout, loc.clone())),
            Ok(Stream::STDERR) => Err(RuntimeError::new(RuntimeErrorKind::ReadFromStderr, loc.clone())),
            Err(_) => match self.vars.get(name) {
                Some(v) => Ok(ExprOutcome::Value(v.clone())),
                None => Err(RuntimeError::new(RuntimeErrorKind::UnknownVariable(name.to_owned()), loc.clone())),
            },
        }
    }
}

fn is_numbered(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::loader::{load, MemoryProvider};
    use crate::streams::MemoryStreams;
    use std::collections::HashMap as Map;

    fn run_program(root: &str) -> (RuntimeResult<RunOutcome>, MemoryStreams) {
        let mut provider = MemoryProvider {
            root: root.to_owned(),
            root_display: "MAIN".to_owned(),
            std_lib: String::new(),
            files: Map::new(),
        };
        let program = load(&mut provider).unwrap();
        let mut streams = MemoryStreams::default();
        let result = {
            let mut eval = Evaluator::new(&program, &[], false, false);
            eval.run(&mut streams)
        };
        (result, streams)
    }

    #[test]
    fn hello_world_writes_stdout() {
        let (result, streams) = run_program("\"Hello, world\\n\" INTO STDOUT");
        assert!(result.is_ok());
        assert_eq!(streams.stdout, "Hello, world\n");
    }

    #[test]
    fn counted_loop_writes_digits() {
        let src = "1 INTO I\nLOOP:\nI INTO STDOUT\n\"\\n\" INTO STDOUT\nI + 1 INTO I\nGOIF LOOP I <= 5";
        let (result, streams) = run_program(src);
        assert!(result.is_ok());
        assert_eq!(streams.stdout, "1\n2\n3\n4\n5\n");
    }

    #[test]
    fn jump_with_args_and_return() {
        let src = concat!(
            "JUMP ADD (3, 4) HANDLE OP_FAIL ERR\n",
            "RET1 INTO STDOUT\n",
            "GO END\n",
            "ADD:\n",
            "ARG1 + ARG2 INTO SUM\n",
            "RETURN (SUM)\n",
            "ERR:\n",
            "\"err\" INTO STDERR\n",
            "END:\n",
        );
        let (result, streams) = run_program(src);
        assert!(result.is_ok());
        assert_eq!(streams.stdout, "7");
    }

    #[test]
    fn catchable_exception_is_recovered() {
        let src = concat!(
            "JUMP DIVIDE (10, 0) HANDLE OP_FAIL RECOVER\n",
            "GO END\n",
            "DIVIDE:\n",
            "ARG1 / ARG2 INTO Q\n",
            "RETURN (Q)\n",
            "RECOVER:\n",
            "\"caught\" INTO STDOUT\n",
            "END:\n",
        );
        let (result, streams) = run_program(src);
        assert!(result.is_ok());
        assert_eq!(streams.stdout, "caught");
    }

    #[test]
    fn uncaught_exception_is_a_runtime_error() {
        let (result, _) = run_program("THROW BOOM");
        match result {
            Err(err) => assert!(matches!(err.kind, RuntimeErrorKind::UncaughtException { .. })),
            Ok(_) => panic!("expected an uncaught exception"),
        }
    }

    /// An uncaught exception unwinding through two nested `JUMP`s records
    /// both call sites in the chain (§7).
    #[test]
    fn uncaught_exception_chain_records_every_unwound_jump() {
        let src = concat!(
            "JUMP OUTER ()\n",
            "OUTER:\n",
            "JUMP INNER ()\n",
            "INNER:\n",
            "THROW BOOM\n",
        );
        let (result, _) = run_program(src);
        match result {
            Err(err) => match err.kind {
                RuntimeErrorKind::UncaughtException { name, chain } => {
                    assert_eq!(name, "BOOM");
                    assert_eq!(chain.len(), 2);
                }
                other => panic!("unexpected kind: {:?}", other),
            },
            Ok(_) => panic!("expected an uncaught exception"),
        }
    }

    #[test]
    fn reading_unknown_variable_is_a_runtime_error() {
        let (result, _) = run_program("@X INTO X\nX INTO STDOUT");
        match result {
            Err(err) => assert!(matches!(err.kind, RuntimeErrorKind::UnknownVariable(_))),
            Ok(_) => panic!("expected an unknown-variable error"),
        }
    }

    #[test]
    fn explicit_error_throw_is_fatal() {
        let (result, _) = run_program("THROW ERROR");
        match result {
            Err(err) => assert!(matches!(err.kind, RuntimeErrorKind::ExplicitError)),
            Ok(_) => panic!("expected a fatal error"),
        }
    }

    #[test]
    fn stack_overflow_without_unsafe_jump() {
        let src = "MAIN:\nJUMP MAIN ()";
        let mut provider = MemoryProvider {
            root: src.to_owned(),
            root_display: "MAIN".to_owned(),
            std_lib: String::new(),
            files: Map::new(),
        };
        let program = load(&mut provider).unwrap();
        let mut streams = MemoryStreams::default();
        let mut eval = Evaluator::new(&program, &[], false, false);
        let result = eval.run(&mut streams);
        match result {
            Err(err) => assert!(matches!(err.kind, RuntimeErrorKind::StackOverflow)),
            Ok(_) => panic!("expected a stack overflow"),
        }
    }

    #[test]
    fn argument_forwarding_tail_call() {
        let src = concat!(
            "JUMP FWD (9)\n",
            "GO END\n",
            "FWD:\n",
            "JUMP INNER ()\n",
            "INNER:\n",
            "ARG1 INTO STDOUT\n",
            "RETURN ()\n",
            "END:\n",
        );
        let (result, streams) = run_program(src);
        assert!(result.is_ok());
        assert_eq!(streams.stdout, "9");
    }

    /// A REPL line (§6, §12) must run exactly once and hand control back
    /// to the prompt, never falling through into `MAIN`'s real line 1.
    #[test]
    fn repl_resume_runs_one_statement_without_entering_the_stored_program() {
        let mut provider = MemoryProvider {
            root: "\"should not run\" INTO STDOUT".to_owned(),
            root_display: "MAIN".to_owned(),
            std_lib: String::new(),
            files: Map::new(),
        };
        let mut program = load(&mut provider).unwrap();
        let stmt = program.compile_repl_line("5 INTO X").unwrap().unwrap();

        let mut streams = MemoryStreams::default();
        let mut eval = Evaluator::resume(&program, Map::new(), false, false);
        eval.run_one(&stmt, &mut streams).unwrap();
        let outcome = eval.run(&mut streams).unwrap();
        assert!(matches!(outcome, RunOutcome::Halted));
        assert_eq!(streams.stdout, "");

        let vars = eval.into_vars();
        assert_eq!(vars.get("X"), Some(&Value::Int(5)));
    }

    /// Scenario 6 (§8): a root file `LOAD`s a library and jumps into one of
    /// its labels through the local alias, end to end.
    #[test]
    fn cross_file_jump_runs_the_loaded_files_statements() {
        let mut provider = MemoryProvider {
            root: "LOAD lib.goif L\nJUMP L:GREET ()".to_owned(),
            root_display: "MAIN".to_owned(),
            std_lib: String::new(),
            files: Map::new(),
        };
        provider.files.insert("lib.goif".to_owned(), "GREET:\n\"hi\" INTO STDOUT\nRETURN ()".to_owned());
        let program = load(&mut provider).unwrap();
        let mut streams = MemoryStreams::default();
        let mut eval = Evaluator::new(&program, &[], false, false);
        let result = eval.run(&mut streams);
        assert!(result.is_ok());
        assert_eq!(streams.stdout, "hi");
    }

    #[test]
    fn repl_go_statement_enters_the_stored_program() {
        let src = "GO END\nEND:\n\"hi\" INTO STDOUT";
        let mut provider = MemoryProvider {
            root: src.to_owned(),
            root_display: "MAIN".to_owned(),
            std_lib: String::new(),
            files: Map::new(),
        };
        let mut program = load(&mut provider).unwrap();
        let stmt = program.compile_repl_line("GO END").unwrap().unwrap();

        let mut streams = MemoryStreams::default();
        let mut eval = Evaluator::resume(&program, Map::new(), false, false);
        eval.run_one(&stmt, &mut streams).unwrap();
        eval.run(&mut streams).unwrap();
        assert_eq!(streams.stdout, "hi");
    }
}
