//! Reverse Polish Notation calculator engine.
//!
//! [`Rpn`] owns an operand stack and a [`Registry`] of operators and advances the stack one
//! token at a time with [`Rpn::step`]. Failures come back as [`StepError`] values; nothing in
//! here panics or unwinds on bad input, so a shell can decide whether to keep feeding tokens.
//!
//! ```
//! let mut rpn = rpn::Rpn::new();
//! for tok in ["5", "9", "1", "-", "/"] {
//! 	rpn.step(tok).unwrap();
//! }
//! assert_eq!(rpn.result(), rpn::Number::Float(0.625));
//! ```

use std::collections::HashSet;
use std::fmt;
use tracing::trace;
#[macro_use]
extern crate lazy_static;

pub mod define;
pub mod error;
pub mod lex;
pub mod ops;
pub mod shell;

pub use error::{DefineError, Halt, StepError};
pub use lex::{is_number, tokenize};
pub use ops::{Arity, Func, Operator, Registry, Row};

///status code of a successful step
pub const SUCCESS: u8 = 0;

///`(status, message)` pair for a step outcome, `(0, "")` on success
pub fn status(res: &Result<(), StepError>) -> (u8, String) {
	match res {
		Ok(()) => (SUCCESS, String::new()),
		Err(e) => (e.code(), e.to_string())
	}
}

///value as reported to the user: integral finite values collapse to `Int`
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
	Int(i64),
	Float(f64)
}
impl From<f64> for Number {
	fn from(n: f64) -> Self {
		//i64::MAX as f64 rounds up to 2^63, hence the strict bound
		if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
			Self::Int(n as i64)
		}
		else {Self::Float(n)}
	}
}
impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(i) => write!(f, "{i}"),
			Self::Float(x) => write!(f, "{x}"),
		}
	}
}

///apply one token to `stk`
///
///Operands are only consumed when the operator succeeds, so on any `Err` the stack is
///exactly what it was before the call.
pub fn apply(ops: &Registry, stk: &mut Vec<f64>, token: &str) -> Result<(), StepError> {
	if is_number(token) {
		let n: f64 = token.parse().map_err(|_| StepError::InvalidToken)?;
		stk.push(n);
		return Ok(());
	}
	let op = ops.get(token).ok_or(StepError::InvalidToken)?;
	let len = stk.len();
	match (op.func(), len) {
		(_, 0) => Err(StepError::InsufficientOperands),
		(Func::Binary(f), 2..) => {
			let res = defined(f(stk[len-1], stk[len-2]))?;
			stk.truncate(len-2);
			stk.push(res);
			Ok(())
		},
		(Func::Binary(_), _) => {
			let g = op.fallback().ok_or(StepError::InsufficientForBinary)?;
			stk[0] = defined(g(stk[0]))?;
			Ok(())
		},
		(Func::Unary(f), _) => {
			stk[len-1] = defined(f(stk[len-1]))?;
			Ok(())
		}
	}
}

#[inline(always)]
///NaN never enters the stack
fn defined(n: f64) -> Result<f64, StepError> {
	if n.is_nan() {Err(StepError::Domain)} else {Ok(n)}
}

///stack evaluator: operand stack plus the operators it understands
#[derive(Clone, Debug, Default)]
pub struct Rpn {
	stack: Vec<f64>,
	ops: Registry,
}
impl Rpn {
	///empty stack, built-in operators
	pub fn new() -> Self {
		Self::default()
	}

	///empty stack, custom operator table
	pub fn with_registry(ops: Registry) -> Self {
		Self {stack: Vec::new(), ops}
	}

	///evaluate one numeral or operator token
	pub fn step(&mut self, token: &str) -> Result<(), StepError> {
		let res = apply(&self.ops, &mut self.stack, token);
		trace!(token, ok = res.is_ok(), depth = self.stack.len(), "step");
		res
	}

	///tokenize `line` and step through it, stopping at the first failure
	///
	///Returns the number of tokens evaluated. Tokens before the failing one stay applied.
	pub fn exec(&mut self, line: &str) -> Result<usize, Halt> {
		let toks = tokenize(&self.ops, line);
		for (index, token) in toks.iter().enumerate() {
			if let Err(error) = self.step(token) {
				return Err(Halt {index, token: token.clone(), error});
			}
		}
		Ok(toks.len())
	}

	///like [`Rpn::exec`] but keeps going past failures, returning every one of them
	pub fn exec_all(&mut self, line: &str) -> Vec<Halt> {
		tokenize(&self.ops, line).into_iter().enumerate()
			.filter_map(|(index, token)| self.step(&token).err().map(|error| Halt {index, token, error}))
			.collect()
	}

	///current stack, bottom first
	pub fn peek_stack(&self) -> &[f64] {
		&self.stack
	}

	///top of stack, 0 when empty
	pub fn result(&self) -> Number {
		self.stack.last().map_or(Number::Int(0), |&n| n.into())
	}

	///drop the top value, no-op on an empty stack
	pub fn pop_last(&mut self) {
		self.stack.pop();
	}

	pub fn clear(&mut self) {
		self.stack.clear();
	}

	pub fn registry(&self) -> &Registry {
		&self.ops
	}

	pub fn registry_mut(&mut self) -> &mut Registry {
		&mut self.ops
	}

	///add an operator, ignored if the alias is taken
	pub fn register(&mut self, op: Operator) -> bool {
		self.ops.register(op)
	}

	///remove an operator, ignored if the alias is unknown
	pub fn unregister(&mut self, alias: &str) -> bool {
		self.ops.unregister(alias).is_some()
	}

	pub fn describe_all(&self) -> Vec<Row> {
		self.ops.describe_all()
	}

	pub fn known_operator_aliases(&self) -> HashSet<&str> {
		self.ops.known_operator_aliases()
	}
}
