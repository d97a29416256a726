use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// A single problem found while validating a submitted definition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Violation {
	/// A state label was declared more than once.
	DuplicateState(String),

	/// A state is labelled with the "no transition" marker, so no transition could reach it.
	ReservedStateLabel(String),

	/// A symbol was declared more than once.
	DuplicateSymbol(String),

	/// The initial state is not one of the declared states.
	UnknownInitialState(String),

	/// An accepting state is not one of the declared states.
	UnknownAcceptingState(String),

	/// A transition points at a state that was never declared.
	UnknownStateReference {
		from: String,
		symbol: String,
		target: String,
	},

	/// A transition leaves a state that was never declared.
	UnknownTransitionSource {
		from: String,
		symbol: String,
	},

	/// A transition is keyed by a symbol outside the alphabet.
	UnknownTransitionSymbol {
		from: String,
		symbol: String,
	},
}

/// Every [`Violation`] found in one definition, in detection order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DefinitionError {
	pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SimulationError {
	/// `position` is a byte offset for text input and a token index for pre-split input.
	UnknownSymbol { symbol: String, position: usize },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FormatError {
	/// 1-based.
	pub line: usize,
	/// 1-based, in characters.
	pub column: usize,
	pub kind: FormatErrorKind,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormatErrorKind {
	ExpectedColon,
	ExpectedComma,
	ExpectedArrow,
	EmptyLabel,
	UnknownHeader(String),
	DuplicateHeader(&'static str),
	MissingHeader(&'static str),
	TrailingInput,
	Nom(nom::error::ErrorKind),
}

/// Failure to turn definition text into an automaton.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LoadError {
	Format(FormatError),
	Definition(DefinitionError),
}

impl Display for Violation {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self {
			Self::DuplicateState(state) => write!(f, "State {state:?} is declared more than once"),
			Self::ReservedStateLabel(state) => write!(f, "State label {state:?} is reserved for \"no transition\""),
			Self::DuplicateSymbol(symbol) => write!(f, "Symbol {symbol:?} is declared more than once"),
			Self::UnknownInitialState(state) => {
				write!(f, "Initial state {state:?} is not one of the declared states")
			},
			Self::UnknownAcceptingState(state) => {
				write!(f, "Accepting state {state:?} is not one of the declared states")
			},
			Self::UnknownStateReference { from, symbol, target } => write!(
				f,
				"Transition from {from:?} on {symbol:?} points to undeclared state {target:?}"
			),
			Self::UnknownTransitionSource { from, symbol } => {
				write!(f, "Transition on {symbol:?} leaves undeclared state {from:?}")
			},
			Self::UnknownTransitionSymbol { from, symbol } => {
				write!(f, "Transition from {from:?} uses symbol {symbol:?} outside the alphabet")
			},
		}
	}
}

impl Display for DefinitionError {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		write!(f, "Invalid automaton definition ({} problems)", self.violations.len())?;
		for violation in self.violations.iter() {
			write!(f, "\n- {violation}")?;
		}
		Ok(())
	}
}

impl DefinitionError {
	pub fn messages(&self) -> Vec<String> {
		self.violations.iter().map(ToString::to_string).collect::<Vec<_>>()
	}
}

impl Display for SimulationError {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self {
			Self::UnknownSymbol { symbol, position } => {
				write!(f, "Input symbol {symbol:?} at position {position} is not in the alphabet")
			},
		}
	}
}

impl Display for FormatError {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		write!(f, "line {}, column {}: ", self.line, self.column)?;
		match &self.kind {
			FormatErrorKind::ExpectedColon => f.write_str("expected ':' after header keyword"),
			FormatErrorKind::ExpectedComma => f.write_str("expected ',' between source state and symbol"),
			FormatErrorKind::ExpectedArrow => f.write_str("expected '->' before destinations"),
			FormatErrorKind::EmptyLabel => f.write_str("expected a non-empty label"),
			FormatErrorKind::UnknownHeader(name) => write!(f, "unknown header {name:?}"),
			FormatErrorKind::DuplicateHeader(name) => write!(f, "header {name:?} given more than once"),
			FormatErrorKind::MissingHeader(name) => write!(f, "missing required header {name:?}"),
			FormatErrorKind::TrailingInput => f.write_str("unexpected trailing input"),
			FormatErrorKind::Nom(kind) => write!(f, "parse error ({})", kind.description()),
		}
	}
}

impl Display for LoadError {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self {
			Self::Format(err) => write!(f, "Malformed definition: {err}"),
			Self::Definition(err) => err.fmt(f),
		}
	}
}

impl Error for Violation {}

impl Error for DefinitionError {}

impl Error for SimulationError {}

impl Error for FormatError {}

impl Error for LoadError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::Format(err) => Some(err),
			Self::Definition(err) => Some(err),
		}
	}
}

impl From<FormatError> for LoadError {
	fn from(err: FormatError) -> Self {
		Self::Format(err)
	}
}

impl From<DefinitionError> for LoadError {
	fn from(err: DefinitionError) -> Self {
		Self::Definition(err)
	}
}
