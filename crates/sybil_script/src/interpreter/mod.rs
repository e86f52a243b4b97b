//! Tree-walking interpreter.
//!
//! Module-level code binds names directly in the [`Namespace`] it runs
//! against; function bodies get a local frame and read through to the
//! namespace, then to builtins. Execution stops at the first error, so any
//! bindings made before a failing statement stay in the namespace.

mod builtins;
mod operators;

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::{BinaryOp, Expr, Literal, Program, Stmt, StmtKind, Target};
use crate::errors::{
    arity_mismatch, assertion_failed, duplicate_argument, missing_argument, not_callable,
    raised, recursion_limit, type_error, undefined_variable, unexpected_keyword, value_error,
    ScriptResult,
};
use crate::namespace::Namespace;
use crate::stack::ensure_sufficient_stack;
use crate::value::{FunctionValue, Value};

pub use builtins::{lookup as lookup_builtin, Builtin, EXCEPTION_TYPES};
use builtins::{call_builtin, construct_exception};

/// Maximum nesting of script function calls.
pub const MAX_CALL_DEPTH: usize = 1000;

/// How a block finished.
enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Local bindings of a function call. Module-level code has none and binds
/// straight into the namespace.
struct Frame {
    locals: Option<FxHashMap<String, Value>>,
}

impl Frame {
    fn module() -> Self {
        Frame { locals: None }
    }

    fn function(locals: FxHashMap<String, Value>) -> Self {
        Frame {
            locals: Some(locals),
        }
    }
}

pub struct Interpreter<'ns> {
    globals: &'ns Namespace,
    depth: usize,
}

impl<'ns> Interpreter<'ns> {
    pub fn new(globals: &'ns Namespace) -> Self {
        Interpreter { globals, depth: 0 }
    }

    /// Run a compiled program at module level.
    pub fn run(&mut self, program: &Program) -> ScriptResult<()> {
        let mut frame = Frame::module();
        self.exec_block(&mut frame, &program.body)?;
        Ok(())
    }

    /// Evaluate a standalone expression at module level.
    pub fn evaluate(&mut self, expr: &Expr) -> ScriptResult<Value> {
        self.eval(&Frame::module(), expr)
    }

    /// Call any callable value with already-evaluated arguments.
    pub fn call(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> ScriptResult<Value> {
        match callee {
            Value::Function(func) => self.call_function(func, args, kwargs),
            Value::Builtin(builtin) => call_builtin(*builtin, &args, &kwargs),
            Value::Native(native) => native.call(&args, &kwargs),
            Value::ExceptionType(name) => construct_exception(name, &args, &kwargs),
            other => Err(not_callable(other.type_name())),
        }
    }

    fn call_function(
        &mut self,
        func: &Rc<FunctionValue>,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> ScriptResult<Value> {
        let def = &func.def;
        if self.depth >= MAX_CALL_DEPTH {
            return Err(recursion_limit(MAX_CALL_DEPTH));
        }
        if args.len() > def.params.len() {
            return Err(arity_mismatch(&def.name, def.params.len(), args.len()));
        }

        let mut locals = FxHashMap::default();
        for (param, arg) in def.params.iter().zip(args) {
            locals.insert(param.name.clone(), arg);
        }
        for (key, value) in kwargs {
            if !def.params.iter().any(|p| p.name == key) {
                return Err(unexpected_keyword(&def.name, &key));
            }
            if locals.contains_key(&key) {
                return Err(duplicate_argument(&def.name, &key));
            }
            locals.insert(key, value);
        }
        for (param, default) in def.params.iter().zip(&func.defaults) {
            if locals.contains_key(&param.name) {
                continue;
            }
            match default {
                Some(value) => {
                    locals.insert(param.name.clone(), value.clone());
                }
                None => return Err(missing_argument(&def.name, &param.name)),
            }
        }

        let mut frame = Frame::function(locals);
        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.exec_block(&mut frame, &def.body));
        self.depth -= 1;

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal | Flow::Break | Flow::Continue => Ok(Value::None),
        }
    }

    // Statements

    fn exec_block(&mut self, frame: &mut Frame, body: &[Stmt]) -> ScriptResult<Flow> {
        for stmt in body {
            let flow = self
                .exec_stmt(frame, stmt)
                .map_err(|e| e.at_line(stmt.line))?;
            if !matches!(flow, Flow::Normal) {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, frame: &mut Frame, stmt: &Stmt) -> ScriptResult<Flow> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval(frame, expr)?;
            }
            StmtKind::Assign { targets, value } => {
                let value = self.eval(frame, value)?;
                for target in targets {
                    self.assign(frame, target, value.clone())?;
                }
            }
            StmtKind::AugAssign { target, op, value } => {
                let current = self.load_target(frame, target)?;
                let rhs = self.eval(frame, value)?;
                // `+=` extends a list in place, so aliases observe it.
                if let (BinaryOp::Add, Value::List(items)) = (op, &current) {
                    let extra = operators::iterate(&rhs)?;
                    items.borrow_mut().extend(extra);
                } else {
                    let updated = operators::binary(*op, &current, &rhs)?;
                    self.assign(frame, target, updated)?;
                }
            }
            StmtKind::Del(targets) => {
                for target in targets {
                    self.delete(frame, target)?;
                }
            }
            StmtKind::Pass => {}
            StmtKind::Assert { test, message } => {
                if !self.eval(frame, test)?.is_truthy() {
                    let message = match message {
                        Some(expr) => self.eval(frame, expr)?.to_string(),
                        None => String::new(),
                    };
                    return Err(assertion_failed(message));
                }
            }
            StmtKind::Raise(expr) => {
                let Some(expr) = expr else {
                    return Err(raised("RuntimeError", "No active exception to reraise"));
                };
                return Err(match self.eval(frame, expr)? {
                    Value::Exception(exc) => raised(&exc.type_name, exc.message.clone()),
                    Value::ExceptionType(name) => raised(&name, ""),
                    _ => type_error("exceptions must derive from BaseException"),
                });
            }
            StmtKind::If { branches, orelse } => {
                for (test, body) in branches {
                    if self.eval(frame, test)?.is_truthy() {
                        return self.exec_block(frame, body);
                    }
                }
                return self.exec_block(frame, orelse);
            }
            StmtKind::While { test, body } => {
                while self.eval(frame, test)?.is_truthy() {
                    match self.exec_block(frame, body)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
            }
            StmtKind::For { target, iter, body } => {
                let items = operators::iterate(&self.eval(frame, iter)?)?;
                for item in items {
                    self.assign(frame, target, item)?;
                    match self.exec_block(frame, body)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
            }
            StmtKind::Break => return Ok(Flow::Break),
            StmtKind::Continue => return Ok(Flow::Continue),
            StmtKind::FunctionDef(def) => {
                let defaults = def
                    .params
                    .iter()
                    .map(|p| p.default.as_ref().map(|d| self.eval(frame, d)).transpose())
                    .collect::<ScriptResult<Vec<_>>>()?;
                let func = FunctionValue {
                    def: Rc::clone(def),
                    defaults,
                };
                self.store(frame, &def.name, Value::Function(Rc::new(func)));
            }
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval(frame, expr)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    // Names and targets

    fn load(&self, frame: &Frame, name: &str) -> ScriptResult<Value> {
        if let Some(value) = frame.locals.as_ref().and_then(|l| l.get(name)) {
            return Ok(value.clone());
        }
        self.globals
            .get(name)
            .or_else(|| lookup_builtin(name))
            .ok_or_else(|| undefined_variable(name))
    }

    fn store(&self, frame: &mut Frame, name: &str, value: Value) {
        match &mut frame.locals {
            Some(locals) => {
                locals.insert(name.to_string(), value);
            }
            None => {
                self.globals.insert(name, value);
            }
        }
    }

    fn assign(&mut self, frame: &mut Frame, target: &Target, value: Value) -> ScriptResult<()> {
        match target {
            Target::Name(name) => {
                self.store(frame, name, value);
                Ok(())
            }
            Target::Tuple(targets) => {
                let items = operators::iterate(&value)?;
                if items.len() != targets.len() {
                    return Err(value_error(if items.len() < targets.len() {
                        format!(
                            "not enough values to unpack (expected {}, got {})",
                            targets.len(),
                            items.len()
                        )
                    } else {
                        format!("too many values to unpack (expected {})", targets.len())
                    }));
                }
                for (target, item) in targets.iter().zip(items) {
                    self.assign(frame, target, item)?;
                }
                Ok(())
            }
            Target::Index { object, index } => {
                let object = self.eval(frame, object)?;
                let index = self.eval(frame, index)?;
                operators::set_item(&object, index, value)
            }
        }
    }

    fn load_target(&mut self, frame: &Frame, target: &Target) -> ScriptResult<Value> {
        match target {
            Target::Name(name) => self.load(frame, name),
            Target::Index { object, index } => {
                let object = self.eval(frame, object)?;
                let index = self.eval(frame, index)?;
                operators::get_item(&object, &index)
            }
            Target::Tuple(_) => Err(type_error("illegal expression for augmented assignment")),
        }
    }

    fn delete(&mut self, frame: &mut Frame, target: &Target) -> ScriptResult<()> {
        match target {
            Target::Name(name) => {
                let removed = match &mut frame.locals {
                    Some(locals) => locals.remove(name.as_str()),
                    None => self.globals.remove(name),
                };
                removed.map(|_| ()).ok_or_else(|| undefined_variable(name))
            }
            Target::Tuple(targets) => {
                for target in targets {
                    self.delete(frame, target)?;
                }
                Ok(())
            }
            Target::Index { object, index } => {
                let object = self.eval(frame, object)?;
                let index = self.eval(frame, index)?;
                operators::del_item(&object, &index)
            }
        }
    }

    // Expressions

    fn eval(&mut self, frame: &Frame, expr: &Expr) -> ScriptResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::None => Value::None,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Int(n) => Value::Int(*n),
                Literal::Float(x) => Value::Float(*x),
                Literal::Str(s) => Value::str(s),
                Literal::Bytes(b) => Value::bytes(b),
            }),
            Expr::Name(name) => self.load(frame, name),
            Expr::List(items) => Ok(Value::list(self.eval_all(frame, items)?)),
            Expr::Tuple(items) => Ok(Value::tuple(self.eval_all(frame, items)?)),
            Expr::Dict(pairs) => {
                let mut entries = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let key = self.eval(frame, key)?;
                    if !key.is_hashable() {
                        return Err(crate::errors::unhashable(key.type_name()));
                    }
                    let value = self.eval(frame, value)?;
                    operators::dict_insert(&mut entries, key, value);
                }
                Ok(Value::dict(entries))
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval(frame, operand)?;
                operators::unary(*op, &operand)
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(frame, left)?;
                let right = self.eval(frame, right)?;
                operators::binary(*op, &left, &right)
            }
            Expr::Compare { left, links } => {
                let mut left = self.eval(frame, left)?;
                for (op, right) in links {
                    let right = self.eval(frame, right)?;
                    if !operators::compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::And(left, right) => {
                let left = self.eval(frame, left)?;
                if left.is_truthy() {
                    self.eval(frame, right)
                } else {
                    Ok(left)
                }
            }
            Expr::Or(left, right) => {
                let left = self.eval(frame, left)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval(frame, right)
                }
            }
            Expr::Conditional { test, then, orelse } => {
                if self.eval(frame, test)?.is_truthy() {
                    self.eval(frame, then)
                } else {
                    self.eval(frame, orelse)
                }
            }
            Expr::Call {
                callee,
                args,
                keywords,
            } => {
                let callee = self.eval(frame, callee)?;
                let args = self.eval_all(frame, args)?;
                let kwargs = keywords
                    .iter()
                    .map(|(name, expr)| Ok((name.clone(), self.eval(frame, expr)?)))
                    .collect::<ScriptResult<Vec<_>>>()?;
                self.call(&callee, args, kwargs)
            }
            Expr::Index { object, index } => {
                let object = self.eval(frame, object)?;
                let index = self.eval(frame, index)?;
                operators::get_item(&object, &index)
            }
        }
    }

    fn eval_all(&mut self, frame: &Frame, exprs: &[Expr]) -> ScriptResult<Vec<Value>> {
        exprs.iter().map(|e| self.eval(frame, e)).collect()
    }
}

impl Program {
    /// Execute against `namespace`, binding module-level names in it.
    pub fn execute(&self, namespace: &Namespace) -> ScriptResult<()> {
        tracing::trace!(
            first_line = self.first_line,
            statements = self.body.len(),
            "executing program"
        );
        Interpreter::new(namespace).run(self)
    }
}
