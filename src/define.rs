//! User-defined operators written as RPN bodies.
//!
//! `avg 2 + 2 /` defines a binary `avg`: the operands are pushed (`b` then `a`), the body runs
//! on a scratch stack and whatever ends up on top is the result.

use std::sync::Arc;
use tracing::debug;

use crate::error::DefineError;
use crate::lex::is_number;
use crate::ops::{Arity, Func, Operator, Registry};
use crate::apply;

///build an operator from an RPN `body`
///
///Every body token must be a numeral or an alias known to `ops` right now. The body runs against
///a snapshot of `ops`, so operators added later (the new alias included) are invisible to it.
///A body that fails while running yields NaN, which the evaluator turns into a domain error.
pub fn compose(ops: &Registry, alias: &str, arity: Arity, body: &str) -> Result<Operator, DefineError> {
	let toks: Vec<String> = body.split_whitespace().map(String::from).collect();
	if toks.is_empty() {
		return Err(DefineError::EmptyBody);
	}
	if let Some(bad) = toks.iter().find(|t| !is_number(t) && !ops.contains(t)) {
		return Err(DefineError::UnknownToken(bad.clone()));
	}
	let expr = toks.join(" ");
	let prog = Arc::new(Program {ops: ops.clone(), toks});
	let func = match arity {
		Arity::One => Func::Unary(Arc::new(move |n| prog.run(&[n]))),
		Arity::Two => Func::Binary(Arc::new(move |a, b| prog.run(&[b, a]))),
	};
	let op = Operator::new(alias, expr, func)?;
	debug!(alias, body = op.expr(), "composed operator");
	Ok(op)
}

///frozen body plus the operators it may use
struct Program {
	ops: Registry,
	toks: Vec<String>,
}
impl Program {
	fn run(&self, args: &[f64]) -> f64 {
		let mut stk = args.to_vec();
		for t in &self.toks {
			if apply(&self.ops, &mut stk, t).is_err() {
				return f64::NAN;
			}
		}
		stk.last().copied().unwrap_or(f64::NAN)
	}
}
