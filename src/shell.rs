//! Line-oriented shell around [`Rpn`]: command routing, listing and colored output.
//!
//! Reading lines is left to the caller (the binary uses rustyline), so everything here can be
//! driven with in-memory writers.

use std::io::{self, Write};
use phf::phf_ordered_map;
use tracing::debug;

use crate::define::compose;
use crate::{tokenize, Arity, Number, Rpn};

///Bundle of output streams, for brevity.
pub struct Streams<'a> {
	pub output: &'a mut dyn Write,
	pub error: &'a mut dyn Write
}
#[macro_export]
///Default streams using stdout, stderr
macro_rules! stdio {
	() => {
		$crate::shell::Streams {
			output: &mut ::std::io::stdout(),
			error: &mut ::std::io::stderr()
		}
	}
}

///what the caller should do after a line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Exit
}

///command name => (usage, description), in help order
static COMMANDS: phf::OrderedMap<&'static str, (&'static str, &'static str)> = phf_ordered_map! {
	"calc" => ("calc EXPR", "Calculate an RPN expression, e.g. `calc 23+` or `calc 5 8 +`. Lines that are not commands are calculated too."),
	"state" => ("state", "Show the current stack, bottom first."),
	"del" => ("del", "Remove the last value from the stack. Alias: undo."),
	"reset" => ("reset", "Empty the stack. Alias: c."),
	"operators" => ("operators", "List the available operators."),
	"add" => ("add ALIAS 1|2 BODY", "Define an operator for this session from an RPN body, e.g. `add avg 2 + 2 /`."),
	"remove" => ("remove ALIAS", "Remove an operator for this session."),
	"history" => ("history", "Show the lines entered in this session."),
	"help" => ("help [COMMAND]", "Show all commands, or details of one."),
	"exit" => ("exit", "Leave the calculator. Alias: quit."),
};

const HINT_EMPTY: &str = "Please make sure to pass a numeric value or appropriate operator!";

///ANSI SGR decoration, no-op when disabled
#[derive(Clone, Copy, Debug)]
pub struct Paint {
	pub enabled: bool
}
impl Paint {
	fn wrap(self, sgr: &str, text: &str) -> String {
		if self.enabled {format!("\x1b[{sgr}m{text}\x1b[0m")} else {text.into()}
	}
	pub fn title(self, text: &str) -> String {self.wrap("1;35", text)}
	pub fn result(self, text: &str) -> String {self.wrap("1;32", text)}
	pub fn error(self, text: &str) -> String {self.wrap("0;31", text)}
	pub fn hint(self, text: &str) -> String {self.wrap("0;33", text)}
	pub fn prompt(self, text: &str) -> String {self.wrap("0;36", text)}
	pub fn command(self, text: &str) -> String {self.wrap("1;96", text)}
}

///interactive session state
pub struct Shell {
	rpn: Rpn,
	history: Vec<String>,
	paint: Paint,
	///report every failing token of a line instead of halting at the first
	keep_going: bool,
}
impl Shell {
	pub fn new(rpn: Rpn) -> Self {
		Self {rpn, history: Vec::new(), paint: Paint {enabled: true}, keep_going: false}
	}

	pub fn with_paint(mut self, paint: Paint) -> Self {
		self.paint = paint;
		self
	}

	pub fn keep_going(mut self, on: bool) -> Self {
		self.keep_going = on;
		self
	}

	pub fn rpn(&self) -> &Rpn {&self.rpn}

	pub fn history(&self) -> &[String] {&self.history}

	///welcome text
	pub fn banner(&self) -> String {
		let p = self.paint;
		format!(
			"\n{}\n\n{}\n",
			p.title("Welcome to the Reverse Polish Notation Calculator!"),
			p.hint(&format!("Type {} for list of available options.", p.command("help")))
		)
	}

	pub fn prompt(&self, text: &str) -> String {
		self.paint.prompt(text)
	}

	///run one input line
	pub fn handle(&mut self, line: &str, io: &mut Streams) -> io::Result<Flow> {
		let line = line.trim();
		if line.is_empty() {
			writeln!(io.error, "{}", self.paint.hint(HINT_EMPTY))?;
			return Ok(Flow::Continue);
		}
		self.history.push(line.into());
		let (cmd, arg) = line.split_once(char::is_whitespace)
			.map_or((line, ""), |(c, a)| (c, a.trim()));
		debug!(cmd, arg, "shell line");
		match cmd {
			"calc" => self.calc(arg, io)?,
			"state" => self.state(io)?,
			"del"|"undo" => {
				self.rpn.pop_last();
				self.state(io)?;
			},
			"reset"|"c" => {
				self.rpn.clear();
				writeln!(io.output, "RPN state reset.")?;
			},
			"operators" => self.operators(io)?,
			"add" => self.add(arg, io)?,
			"remove" => self.remove(arg, io)?,
			"history" => {
				let width = self.history.len().to_string().len();	//length of longest index number
				for (i, l) in self.history.iter().enumerate() {
					writeln!(io.output, "{:>width$}  {l}", i+1)?;
				}
			},
			"help" => self.help(arg, io)?,
			"exit"|"quit" => {
				writeln!(io.output, "Goodbye!")?;
				return Ok(Flow::Exit);
			},
			_ => self.calc(line, io)?
		}
		Ok(Flow::Continue)
	}

	fn calc(&mut self, expr: &str, io: &mut Streams) -> io::Result<()> {
		if tokenize(self.rpn.registry(), expr).is_empty() {
			writeln!(io.error, "{}", self.paint.hint(HINT_EMPTY))?;
			return Ok(());
		}
		if self.keep_going {
			for halt in self.rpn.exec_all(expr) {
				writeln!(io.error, "{}", self.paint.error(&format!("! {halt}")))?;
			}
		}
		else if let Err(halt) = self.rpn.exec(expr) {
			writeln!(io.error, "{}", self.paint.error(&format!("! {halt}")))?;
		}
		writeln!(io.output, "{}", self.paint.result(&format!("= {}", self.rpn.result())))
	}

	fn state(&self, io: &mut Streams) -> io::Result<()> {
		let vals: Vec<String> = self.rpn.peek_stack().iter()
			.map(|&n| Number::from(n).to_string())
			.collect();
		writeln!(io.output, "[{}]", vals.join(", "))
	}

	fn operators(&self, io: &mut Streams) -> io::Result<()> {
		let reg = self.rpn.registry();
		writeln!(io.output, "{}", self.paint.title(&reg.header().to_string()))?;
		for row in reg.describe_all() {
			writeln!(io.output, "{row}")?;
		}
		Ok(())
	}

	fn add(&mut self, arg: &str, io: &mut Streams) -> io::Result<()> {
		let mut parts = arg.splitn(3, char::is_whitespace);
		let (Some(alias), Some(arity), Some(body)) = (parts.next(), parts.next(), parts.next()) else {
			return writeln!(io.error, "{}", self.paint.error("! add: usage: add ALIAS 1|2 BODY"));
		};
		let op = match arity.parse::<Arity>().and_then(|ar| compose(self.rpn.registry(), alias, ar, body)) {
			Ok(op) => op,
			Err(e) => {
				return writeln!(io.error, "{}", self.paint.error(&format!("! add: {e}")));
			}
		};
		if self.rpn.register(op) {
			writeln!(io.output, "Added operator '{alias}'.")
		}
		else {
			writeln!(io.error, "{}", self.paint.error(&format!("! add: Operator '{alias}' already exists")))
		}
	}

	fn remove(&mut self, alias: &str, io: &mut Streams) -> io::Result<()> {
		if alias.is_empty() {
			writeln!(io.error, "{}", self.paint.error("! remove: usage: remove ALIAS"))
		}
		else if self.rpn.unregister(alias) {
			writeln!(io.output, "Removed operator '{alias}'.")
		}
		else {
			writeln!(io.error, "{}", self.paint.error(&format!("! remove: Unknown operator '{alias}'")))
		}
	}

	fn help(&self, topic: &str, io: &mut Streams) -> io::Result<()> {
		let topic = match topic {
			"undo" => "del",
			"c" => "reset",
			"quit" => "exit",
			t => t
		};
		if topic.is_empty() {
			let width = COMMANDS.values().map(|(usage, _)| usage.len()).max().unwrap_or(0);
			for (usage, desc) in COMMANDS.values() {
				writeln!(io.output, "{}  {desc}", self.paint.command(&format!("{usage:<width$}")))?;
			}
			Ok(())
		}
		else if let Some((usage, desc)) = COMMANDS.get(topic) {
			writeln!(io.output, "$ {usage}\n{desc}")
		}
		else {
			writeln!(io.error, "{}", self.paint.error(&format!("! help: No such command: {topic}")))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	///run lines without colors, return (stdout, stderr, last flow)
	fn drive(shell: &mut Shell, lines: &[&str]) -> (String, String, Flow) {
		let (mut out, mut err) = (Vec::new(), Vec::new());
		let mut flow = Flow::Continue;
		{
			let mut io = Streams {output: &mut out, error: &mut err};
			for l in lines {
				flow = shell.handle(l, &mut io).unwrap();
			}
		}
		(String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap(), flow)
	}

	fn plain() -> Shell {
		Shell::new(Rpn::new()).with_paint(Paint {enabled: false})
	}

	#[test]
	fn calc_prints_result() {
		let mut sh = plain();
		let (out, err, _) = drive(&mut sh, &["5 8 +"]);
		assert_eq!(out, "= 13\n");
		assert!(err.is_empty());
		let (out, _, _) = drive(&mut sh, &["calc 2/"]);
		assert_eq!(out, "= 6.5\n");
	}

	#[test]
	fn halts_on_first_error() {
		let mut sh = plain();
		let (out, err, _) = drive(&mut sh, &["1 + 2 +"]);
		assert_eq!(err, "! '+': Operation requires at least one numeric value.\n");
		assert_eq!(out, "= 1\n");
		assert_eq!(sh.rpn().peek_stack(), [1.0]);
	}

	#[test]
	fn keep_going_reports_all() {
		let mut sh = plain().keep_going(true);
		let (out, err, _) = drive(&mut sh, &["+ 1 * 2 +"]);
		assert_eq!(err.lines().count(), 2);
		assert_eq!(out, "= 3\n");
	}

	#[test]
	fn stack_commands() {
		let mut sh = plain();
		let (out, _, _) = drive(&mut sh, &["1 2.5 3", "state", "del", "undo", "reset", "state"]);
		assert_eq!(out, "= 3\n[1, 2.5, 3]\n[1, 2.5]\n[1]\nRPN state reset.\n[]\n");
	}

	#[test]
	fn empty_input_hints() {
		let mut sh = plain();
		let (out, err, _) = drive(&mut sh, &["", "abc"]);
		assert!(out.is_empty());
		assert_eq!(err.lines().count(), 2);
		assert!(err.starts_with("Please make sure"));
		assert_eq!(sh.history(), ["abc"]);
	}

	#[test]
	fn add_and_remove() {
		let mut sh = plain();
		let (out, err, _) = drive(&mut sh, &["add avg 2 + 2 /", "3 6 avg"]);
		assert!(err.is_empty(), "{err}");
		assert_eq!(out, "Added operator 'avg'.\n= 4.5\n");
		let (_, err, _) = drive(&mut sh, &["add avg 2 -"]);
		assert_eq!(err, "! add: Operator 'avg' already exists\n");
		let (out, err, _) = drive(&mut sh, &["remove avg", "remove avg"]);
		assert_eq!(out, "Removed operator 'avg'.\n");
		assert_eq!(err, "! remove: Unknown operator 'avg'\n");
	}

	#[test]
	fn add_errors() {
		let mut sh = plain();
		let (_, err, _) = drive(&mut sh, &["add f", "add f 3 +", "add f 1 sqrt"]);
		let lines: Vec<&str> = err.lines().collect();
		assert_eq!(lines, [
			"! add: usage: add ALIAS 1|2 BODY",
			"! add: Arity must be 1 or 2, got '3'",
			"! add: Unknown token 'sqrt' in operator body",
		]);
	}

	#[test]
	fn operators_listing() {
		let mut sh = plain();
		let (out, _, _) = drive(&mut sh, &["operators"]);
		let lines: Vec<&str> = out.lines().collect();
		assert_eq!(lines.len(), 12);
		assert!(lines[0].starts_with("Alias"));
		assert!(lines[1].starts_with("+ "));
		assert!(lines[11].starts_with("exp "));
	}

	#[test]
	fn history_and_exit() {
		let mut sh = plain();
		let (out, _, flow) = drive(&mut sh, &["1", "history", "quit"]);
		assert_eq!(out, "= 1\n1  1\n2  history\nGoodbye!\n");
		assert_eq!(flow, Flow::Exit);
	}

	#[test]
	fn help_topics() {
		let mut sh = plain();
		let (out, _, _) = drive(&mut sh, &["help undo"]);
		assert_eq!(out, "$ del\nRemove the last value from the stack. Alias: undo.\n");
		let (out, _, _) = drive(&mut sh, &["help"]);
		assert_eq!(out.lines().count(), COMMANDS.len());
		let (_, err, _) = drive(&mut sh, &["help nope"]);
		assert_eq!(err, "! help: No such command: nope\n");
	}

	#[test]
	fn colors() {
		let p = Paint {enabled: true};
		assert_eq!(p.error("x"), "\x1b[0;31mx\x1b[0m");
		assert_eq!(Paint {enabled: false}.error("x"), "x");
	}
}
