//! Operator registry: the table of aliases the evaluator understands.
//!
//! Entries keep insertion order, which only matters for the listing.
//! Built-ins are loaded from a static table; anything else is added at runtime
//! through [`Registry::register`] and lives until it is unregistered or the process ends.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use phf::phf_ordered_map;
use tracing::{debug, warn};

use crate::error::DefineError;
use crate::lex::is_number;

pub type UnaryFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;
pub type BinaryFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

///listing column titles
pub const HEADER: [&str; 3] = ["Alias", "Args", "Function"];
///default listing padding multiplier
pub const DEFAULT_PADDING: f64 = 1.5;
///numeral class markers, reported alongside the aliases
const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

///operand count of an operator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Arity {
	One = 1,
	Two = 2
}
impl Arity {
	///parameter list shown in the listing
	pub fn signature(self) -> &'static str {
		match self {
			Self::One => "(n)",
			Self::Two => "(a, b)",
		}
	}
}
impl FromStr for Arity {
	type Err = DefineError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"1" => Ok(Self::One),
			"2" => Ok(Self::Two),
			_ => Err(DefineError::BadArity(s.into()))
		}
	}
}

///evaluation function, the variant fixes the arity
///
///Binary functions receive the first-popped value (top of stack) as `a`
///and the second-popped one as `b`.
#[derive(Clone)]
pub enum Func {
	Unary(UnaryFn),
	Binary(BinaryFn)
}
impl Func {
	pub fn arity(&self) -> Arity {
		match self {
			Self::Unary(_) => Arity::One,
			Self::Binary(_) => Arity::Two,
		}
	}
}

///one entry of the registry
#[derive(Clone)]
pub struct Operator {
	alias: String,
	func: Func,
	///used by binary operators when only one operand is available
	fallback: Option<UnaryFn>,
	signature: String,
	expr: String,
}
impl fmt::Debug for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Operator")
			.field("alias", &self.alias)
			.field("signature", &self.signature)
			.field("expr", &self.expr)
			.finish_non_exhaustive()
	}
}
impl Operator {
	///general constructor, rejects aliases the tokenizer could never produce
	pub fn new(alias: impl Into<String>, expr: impl Into<String>, func: Func) -> Result<Self, DefineError> {
		let alias = alias.into();
		if alias.is_empty() {
			return Err(DefineError::EmptyAlias);
		}
		if alias.chars().any(char::is_whitespace) {
			return Err(DefineError::Whitespace(alias));
		}
		if is_number(&alias) {
			return Err(DefineError::NumericAlias(alias));
		}
		Ok(Self {
			signature: func.arity().signature().into(),
			alias,
			func,
			fallback: None,
			expr: expr.into(),
		})
	}

	pub fn unary<F>(alias: impl Into<String>, expr: impl Into<String>, f: F) -> Result<Self, DefineError>
		where F: Fn(f64) -> f64 + Send + Sync + 'static {
		Self::new(alias, expr, Func::Unary(Arc::new(f)))
	}

	pub fn binary<F>(alias: impl Into<String>, expr: impl Into<String>, f: F) -> Result<Self, DefineError>
		where F: Fn(f64, f64) -> f64 + Send + Sync + 'static {
		Self::new(alias, expr, Func::Binary(Arc::new(f)))
	}

	///attach a unary companion form under the same alias
	///
	///Only binary operators ever consult it.
	pub fn or_unary<F>(mut self, expr: &str, f: F) -> Self
		where F: Fn(f64) -> f64 + Send + Sync + 'static {
		self.fallback = Some(Arc::new(f));
		self.signature = format!("{} | {}", self.func.arity().signature(), Arity::One.signature());
		self.expr = format!("{} | {expr}", self.expr);
		self
	}

	pub fn alias(&self) -> &str {&self.alias}
	pub fn arity(&self) -> Arity {self.func.arity()}
	pub fn func(&self) -> &Func {&self.func}
	pub fn fallback(&self) -> Option<&UnaryFn> {self.fallback.as_ref()}
	pub fn signature(&self) -> &str {&self.signature}
	pub fn expr(&self) -> &str {&self.expr}

	fn cells(&self) -> [&str; 3] {
		[&self.alias, &self.signature, &self.expr]
	}
}

///static description of a built-in
#[derive(Clone, Copy)]
enum Builtin {
	One(fn(f64) -> f64, &'static str),
	Two(fn(f64, f64) -> f64, &'static str)
}

fn add(a: f64, b: f64) -> f64 {b + a}
fn sub(a: f64, b: f64) -> f64 {b - a}
fn mul(a: f64, b: f64) -> f64 {b * a}
///never faults: a zero divisor gives +inf whatever the dividend
fn div(a: f64, b: f64) -> f64 {if a == 0.0 {f64::INFINITY} else {b / a}}
fn pow(a: f64, b: f64) -> f64 {b.powf(a)}
fn log(a: f64, b: f64) -> f64 {b.log(a)}

static BUILTINS: phf::OrderedMap<&'static str, Builtin> = phf_ordered_map! {
	"+" => Builtin::Two(add, "b + a"),
	"-" => Builtin::Two(sub, "b - a"),
	"*" => Builtin::Two(mul, "b * a"),
	"/" => Builtin::Two(div, "b / a (inf if a = 0)"),
	"^" => Builtin::Two(pow, "b ^ a"),
	"log" => Builtin::Two(log, "log(b) / log(a)"),
	"sin" => Builtin::One(f64::sin, "sin(n)"),
	"cos" => Builtin::One(f64::cos, "cos(n)"),
	"tan" => Builtin::One(f64::tan, "tan(n)"),
	"acos" => Builtin::One(f64::acos, "acos(n)"),
	"exp" => Builtin::One(f64::exp, "e ^ n"),
};

impl Builtin {
	///aliases in the table are literals, so this cannot hit the alias checks
	fn entry(self, alias: &'static str) -> Operator {
		let (func, expr) = match self {
			Self::One(f, e) => (Func::Unary(Arc::new(f)), e),
			Self::Two(f, e) => (Func::Binary(Arc::new(f)), e),
		};
		Operator {
			alias: alias.into(),
			signature: func.arity().signature().into(),
			func,
			fallback: None,
			expr: expr.into(),
		}
	}
}

///one line of the operator listing, each cell already padded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
	pub alias: String,
	pub signature: String,
	pub expr: String,
}
impl fmt::Display for Row {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let line = format!("{}{}{}", self.alias, self.signature, self.expr);
		f.write_str(line.trim_end())
	}
}

///ordered, alias-unique collection of operators
#[derive(Clone, Debug)]
pub struct Registry {
	ops: Vec<Operator>,
	///listing padding multiplier, already normalized
	padding: f64,
	///padded listing column widths
	widths: [usize; 3],
}
impl Default for Registry {
	///built-in set: `+ - * / ^ log sin cos tan acos exp`
	fn default() -> Self {
		let mut reg = Self::empty();
		for (&alias, &b) in BUILTINS.entries() {
			reg.ops.push(b.entry(alias));
		}
		reg.reflow();
		reg
	}
}
impl Registry {
	///registry without any operators
	pub fn empty() -> Self {
		let mut reg = Self {
			ops: Vec::new(),
			padding: DEFAULT_PADDING,
			widths: [0; 3],
		};
		reg.reflow();
		reg
	}

	pub fn with_padding(mut self, padding: f64) -> Self {
		self.set_padding(padding);
		self
	}

	///set the listing padding multiplier
	///
	///Values of 10 or more are read as a percentage (`150` means `1.5`).
	pub fn set_padding(&mut self, padding: f64) {
		self.padding = if padding >= 10.0 {
			warn!(padding, "padding multiplier read as a percentage");
			padding / 100.0
		}
		else {padding};
		self.reflow();
	}

	pub fn padding(&self) -> f64 {self.padding}

	///position of `alias` in insertion order
	pub fn lookup(&self, alias: &str) -> Option<usize> {
		self.ops.iter().position(|op| op.alias == alias)
	}

	pub fn get(&self, alias: &str) -> Option<&Operator> {
		self.lookup(alias).map(|i| &self.ops[i])
	}

	pub fn contains(&self, alias: &str) -> bool {
		self.lookup(alias).is_some()
	}

	pub fn len(&self) -> usize {self.ops.len()}

	pub fn is_empty(&self) -> bool {self.ops.is_empty()}

	pub fn iter(&self) -> impl Iterator<Item = &Operator> {
		self.ops.iter()
	}

	///append `op` unless its alias is taken, returns whether it was added
	pub fn register(&mut self, op: Operator) -> bool {
		if self.contains(&op.alias) {
			debug!(alias = %op.alias, "alias already registered, ignoring");
			return false;
		}
		debug!(alias = %op.alias, arity = op.arity() as u8, "registering operator");
		self.ops.push(op);
		self.reflow();
		true
	}

	///remove the entry for `alias`, if any
	pub fn unregister(&mut self, alias: &str) -> Option<Operator> {
		let i = self.lookup(alias)?;
		debug!(alias, "unregistering operator");
		let op = self.ops.remove(i);
		self.reflow();
		Some(op)
	}

	///digit markers plus every alias, for input filtering
	pub fn known_operator_aliases(&self) -> HashSet<&str> {
		DIGITS.into_iter()
			.chain(self.ops.iter().map(|op| op.alias.as_str()))
			.collect()
	}

	///padded column titles
	pub fn header(&self) -> Row {
		self.row(HEADER)
	}

	///padded listing rows in insertion order
	pub fn describe_all(&self) -> Vec<Row> {
		self.ops.iter().map(|op| self.row(op.cells())).collect()
	}

	fn row(&self, cells: [&str; 3]) -> Row {
		let [a, s, e] = self.widths;
		Row {
			alias: format!("{:<a$}", cells[0]),
			signature: format!("{:<s$}", cells[1]),
			expr: format!("{:<e$}", cells[2]),
		}
	}

	///recompute column widths: widest cell or title, scaled by the padding, never narrower than the content
	fn reflow(&mut self) {
		for (col, title) in HEADER.iter().enumerate() {
			let w = self.ops.iter()
				.map(|op| op.cells()[col].chars().count())
				.fold(title.chars().count(), usize::max);
			self.widths[col] = ((w as f64 * self.padding) as usize).max(w);
		}
	}
}
