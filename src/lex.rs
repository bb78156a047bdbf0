//! Numeral recognition and input line tokenizing.

use regex::Regex;
use tracing::trace;

use crate::ops::Registry;

lazy_static! {
	///signed base-10 integer or float literal, no inf/nan spellings
	static ref NUMERAL: Regex = Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").unwrap();
	static ref WORD: Regex = Regex::new(r"\S+").unwrap();
}

///`token` is a numeral the evaluator will push
pub fn is_number(token: &str) -> bool {
	NUMERAL.is_match(token)
}

///split a raw input line into evaluator tokens
///
///Whole words that are numerals or aliases pass through unchanged. Other words are scanned
///left to right: the longest alias starting at the current position wins, otherwise a single
///digit is taken, otherwise the character is dropped. So `23+` is `2 3 +` and `2sin` is `2 sin`.
///
///Digits inside such a word are always single tokens and `.` is dropped like any other
///unknown character: `1.5+` becomes `1 5 +`. Separate a decimal with whitespace (`1.5 +`)
///to keep it whole.
pub fn tokenize(ops: &Registry, line: &str) -> Vec<String> {
	let mut aliases: Vec<&str> = ops.iter().map(|op| op.alias()).collect();
	aliases.sort_by_key(|a| std::cmp::Reverse(a.len()));	//longest match first

	let mut toks = Vec::new();
	for word in WORD.find_iter(line).map(|m| m.as_str()) {
		if is_number(word)||ops.contains(word) {
			toks.push(word.to_string());
			continue;
		}
		let mut rest = word;
		while let Some(c) = rest.chars().next() {
			if let Some(a) = aliases.iter().find(|a| rest.starts_with(**a)) {
				toks.push(a.to_string());
				rest = &rest[a.len()..];
			}
			else {
				if c.is_ascii_digit() {toks.push(c.into());}
				else {trace!(%c, "dropping character");}
				rest = &rest[c.len_utf8()..];
			}
		}
	}
	toks
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numerals() {
		for t in ["1", "1.0", "1.01", "-1", "-1.0", "-1.01", "-0", "-0.0", "+7", ".5", "5.", "1e3", "2.5E-4"] {
			assert!(is_number(t), "{t}");
		}
	}

	#[test]
	fn not_numerals() {
		for t in ["", "-", "+", ".", "A", "1.2.3", "--1", "inf", "-inf", "nan", "NaN", "1e", "0x10", "1 2", "e5"] {
			assert!(!is_number(t), "{t}");
		}
	}

	#[test]
	fn whole_words() {
		let reg = Registry::default();
		assert_eq!(tokenize(&reg, "5 8 +"), ["5", "8", "+"]);
		assert_eq!(tokenize(&reg, "  -3\t-2 *  "), ["-3", "-2", "*"]);
		assert_eq!(tokenize(&reg, "0.5 acos"), ["0.5", "acos"]);
	}

	#[test]
	fn concatenated() {
		let reg = Registry::default();
		assert_eq!(tokenize(&reg, "23+"), ["2", "3", "+"]);
		assert_eq!(tokenize(&reg, "2sin"), ["2", "sin"]);
		assert_eq!(tokenize(&reg, "59,1-/"), ["5", "9", "1", "-", "/"]);
	}

	#[test]
	fn decimals_only_survive_as_whole_words() {
		let reg = Registry::default();
		assert_eq!(tokenize(&reg, "1.5+"), ["1", "5", "+"]);
		assert_eq!(tokenize(&reg, "1.5 +"), ["1.5", "+"]);
	}

	#[test]
	fn junk_is_dropped() {
		let reg = Registry::default();
		assert_eq!(tokenize(&reg, "abc"), Vec::<String>::new());
		assert_eq!(tokenize(&reg, "x1y2z"), ["1", "2"]);
		assert!(tokenize(&reg, "").is_empty());
	}

	#[test]
	fn longest_alias_wins() {
		let mut reg = Registry::default();
		reg.register(crate::ops::Operator::unary("sinsin", "sin(sin(n))", |n: f64| n.sin().sin()).unwrap());
		assert_eq!(tokenize(&reg, "1sinsin"), ["1", "sinsin"]);
		assert_eq!(tokenize(&reg, "1sinsinsin"), ["1", "sinsin", "sin"]);
	}
}
