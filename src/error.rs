use thiserror::Error;

///per-token failure, never fatal: the stack is untouched when one of these is returned
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StepError {
	///neither a numeral nor a known alias
	#[error("Values must be valid number or operator.")]
	InvalidToken,
	///operator requested on an empty stack
	#[error("Not enough values to perform operation.")]
	InsufficientOperands,
	///binary operator with one operand and no unary companion
	#[error("Operation requires at least one numeric value.")]
	InsufficientForBinary,
	///operator produced NaN (acos out of range, log of a negative, ...)
	#[error("Result is undefined for the given values.")]
	Domain,
}

impl StepError {
	///numeric status, 0 is reserved for success
	pub fn code(self) -> u8 {
		match self {
			Self::InvalidToken => 1,
			Self::InsufficientOperands => 2,
			Self::InsufficientForBinary => 3,
			Self::Domain => 4,
		}
	}
}

///first failing token of a batch
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("'{token}': {error}")]
pub struct Halt {
	///position of the token within the batch
	pub index: usize,
	pub token: String,
	#[source]
	pub error: StepError,
}

///malformed operator definition
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DefineError {
	#[error("Operator alias must not be empty")]
	EmptyAlias,
	#[error("Operator alias '{0}' would be read as a number")]
	NumericAlias(String),
	#[error("Operator alias '{0}' must not contain whitespace")]
	Whitespace(String),
	#[error("Arity must be 1 or 2, got '{0}'")]
	BadArity(String),
	#[error("Operator body is empty")]
	EmptyBody,
	#[error("Unknown token '{0}' in operator body")]
	UnknownToken(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn step_error_codes() {
		assert_eq!(StepError::InvalidToken.code(), 1);
		assert_eq!(StepError::InsufficientOperands.code(), 2);
		assert_eq!(StepError::InsufficientForBinary.code(), 3);
		assert_eq!(StepError::Domain.code(), 4);
	}

	#[test]
	fn step_error_messages() {
		assert_eq!(StepError::InvalidToken.to_string(), "Values must be valid number or operator.");
		assert_eq!(StepError::InsufficientOperands.to_string(), "Not enough values to perform operation.");
		assert_eq!(StepError::InsufficientForBinary.to_string(), "Operation requires at least one numeric value.");
	}

	#[test]
	fn halt_display() {
		let h = Halt {index: 2, token: "x".into(), error: StepError::InvalidToken};
		assert_eq!(h.to_string(), "'x': Values must be valid number or operator.");
	}
}
