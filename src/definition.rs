use nom::Err as NomErr;
use nom::IResult;
use nom::Parser;
use nom::error::ErrorKind as NomErrorKind;
use nom::error::ParseError;

use crate::automaton::Automaton;
use crate::automaton::define;
use crate::error::DefinitionError;
use crate::error::FormatError;
use crate::error::FormatErrorKind;
use crate::error::LoadError;
use crate::transition_table::RawTarget;
use crate::transition_table::RawTransition;

/// A definition as written in the text format:
///
/// ```text
/// # comment
/// states: q0, q1, q2
/// alphabet: a, b
/// initial: q0
/// accepting: q2
/// q0, a -> q0, q1
/// q0, b -> -
/// ```
///
/// Headers may come in any order, each exactly once. Header keywords are
/// case-insensitive; no other spellings are accepted.
/// Every line containing `->` is a transition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Definition {
	pub states: Vec<String>,
	pub alphabet: Vec<String>,
	pub initial: String,
	pub accepting: Vec<String>,
	pub transitions: Vec<RawTransition>,
}

#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd)]
enum Header {
	States,
	Alphabet,
	Initial,
	Accepting,
}

#[derive(Debug)]
enum Line<'a> {
	Header(Header, &'a str),
	Transition {
		from: &'a str,
		symbol: &'a str,
		targets: &'a str,
	},
}

#[derive(Debug)]
struct LineError<'a> {
	input: &'a str,
	kind: FormatErrorKind,
}

impl<'a> ParseError<&'a str> for LineError<'a> {
	fn from_error_kind(input: &'a str, nom: NomErrorKind) -> Self {
		Self {
			input,
			kind: FormatErrorKind::Nom(nom),
		}
	}

	fn append(_: &'a str, _: NomErrorKind, other: Self) -> Self {
		other
	}
}

impl<'a> LineError<'a> {
	fn new(input: &'a str, kind: FormatErrorKind) -> Self {
		Self { input, kind }
	}
}

type ParsingResult<'a, T> = IResult<&'a str, T, LineError<'a>>;

/// Parses and validates definition text in one go.
pub fn load(text: &str) -> Result<Automaton, LoadError> {
	let definition: Definition = Definition::parse(text)?;
	Ok(definition.define()?)
}

impl Definition {
	pub fn parse(text: &str) -> Result<Self, FormatError> {
		let mut states: Option<Vec<String>> = None;
		let mut alphabet: Option<Vec<String>> = None;
		let mut initial: Option<String> = None;
		let mut accepting: Option<Vec<String>> = None;
		let mut transitions: Vec<RawTransition> = Vec::new();

		let mut line_count: usize = 0;
		for (i, line) in text.lines().enumerate() {
			line_count = i + 1;
			let content: &str = line.trim_end();
			if content.trim_start().is_empty() || content.trim_start().starts_with('#') {
				continue;
			}

			let parsed: Line<'_> = match parse_line(content) {
				Ok((_, parsed)) => parsed,
				Err(NomErr::Error(err) | NomErr::Failure(err)) => {
					return Err(located(line_count, content, err.input, err.kind));
				},
				Err(NomErr::Incomplete(_)) => {
					return Err(located(line_count, content, "", FormatErrorKind::TrailingInput));
				},
			};

			match parsed {
				Line::Transition { from, symbol, targets } => {
					transitions.push(RawTransition::new(from, symbol, RawTarget::from_cell(targets)));
				},
				Line::Header(header, value) => {
					let duplicate: bool = match header {
						Header::States => states.replace(list(value)).is_some(),
						Header::Alphabet => alphabet.replace(list(value)).is_some(),
						Header::Accepting => accepting.replace(list(value)).is_some(),
						Header::Initial => {
							let label: &str = value.trim();
							if label.is_empty() {
								return Err(located(line_count, content, value, FormatErrorKind::EmptyLabel));
							}
							initial.replace(label.to_owned()).is_some()
						},
					};
					if duplicate {
						return Err(FormatError {
							line: line_count,
							column: 1,
							kind: FormatErrorKind::DuplicateHeader(header.keyword()),
						});
					}
				},
			}
		}

		let missing = |header: Header| FormatError {
			line: line_count + 1,
			column: 1,
			kind: FormatErrorKind::MissingHeader(header.keyword()),
		};
		let states: Vec<String> = states.ok_or_else(|| missing(Header::States))?;
		let alphabet: Vec<String> = alphabet.ok_or_else(|| missing(Header::Alphabet))?;
		let initial: String = initial.ok_or_else(|| missing(Header::Initial))?;
		let accepting: Vec<String> = accepting.ok_or_else(|| missing(Header::Accepting))?;

		debug!("parsed definition with {} transition lines", transitions.len());

		Ok(Self {
			states,
			alphabet,
			initial,
			accepting,
			transitions,
		})
	}

	pub fn define(&self) -> Result<Automaton, DefinitionError> {
		define(
			&self.states,
			&self.alphabet,
			&self.initial,
			&self.accepting,
			&self.transitions,
		)
	}
}

impl Header {
	fn keyword(self) -> &'static str {
		match self {
			Self::States => "states",
			Self::Alphabet => "alphabet",
			Self::Initial => "initial",
			Self::Accepting => "accepting",
		}
	}

	fn from_keyword(keyword: &str) -> Option<Self> {
		match keyword {
			"states" => Some(Self::States),
			"alphabet" => Some(Self::Alphabet),
			"initial" => Some(Self::Initial),
			"accepting" => Some(Self::Accepting),
			_ => None,
		}
	}
}

fn list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(str::trim)
		.filter(|label| !label.is_empty())
		.map(str::to_owned)
		.collect::<Vec<_>>()
}

fn located(line: usize, content: &str, remaining: &str, kind: FormatErrorKind) -> FormatError {
	let offset: usize = content.len().saturating_sub(remaining.len());
	FormatError {
		line,
		column: content[..offset].chars().count() + 1,
		kind,
	}
}

// ========================================

fn parse_line(input: &str) -> ParsingResult<'_, Line<'_>> {
	if input.contains("->") {
		parse_transition(input)
	} else {
		parse_header(input)
	}
}

fn parse_header(input: &str) -> ParsingResult<'_, Line<'_>> {
	use nom::character::complete::alpha1;
	use nom::character::complete::space0;

	let (input, _): (&str, &str) = space0::<&str, LineError<'_>>(input)?;
	let keyword_start: &str = input;
	let (input, keyword): (&str, &str) = match alpha1::<&str, LineError<'_>>(input) {
		Ok(ok) => ok,
		Err(_) => return Err(NomErr::Failure(LineError::new(input, FormatErrorKind::EmptyLabel))),
	};
	let Some(header): Option<Header> = Header::from_keyword(&keyword.to_ascii_lowercase()) else {
		return Err(NomErr::Failure(LineError::new(
			keyword_start,
			FormatErrorKind::UnknownHeader(keyword.to_owned()),
		)));
	};
	let (input, _): (&str, &str) = space0::<&str, LineError<'_>>(input)?;
	let (input, _): (&str, char) = parse_char::<':'>(input, FormatErrorKind::ExpectedColon)?;

	Ok(("", Line::Header(header, input)))
}

fn parse_transition(input: &str) -> ParsingResult<'_, Line<'_>> {
	use nom::bytes::complete::tag;
	use nom::bytes::complete::take_till;
	use nom::bytes::complete::take_until;

	let start: &str = input;
	let (input, from): (&str, &str) = take_till::<_, &str, LineError<'_>>(|ch: char| ch == ',').parse(input)?;
	let from: &str = non_empty(start, from)?;

	let (input, _): (&str, char) = parse_char::<','>(input, FormatErrorKind::ExpectedComma)?;

	let start: &str = input;
	let (input, symbol): (&str, &str) = match take_until::<&str, &str, LineError<'_>>("->").parse(input) {
		Ok(ok) => ok,
		Err(_) => return Err(NomErr::Failure(LineError::new(input, FormatErrorKind::ExpectedArrow))),
	};
	let symbol: &str = non_empty(start, symbol)?;

	let (targets, _): (&str, &str) = match tag::<&str, &str, LineError<'_>>("->").parse(input) {
		Ok(ok) => ok,
		Err(_) => return Err(NomErr::Failure(LineError::new(input, FormatErrorKind::ExpectedArrow))),
	};

	Ok(("", Line::Transition { from, symbol, targets }))
}

fn non_empty<'a>(start: &'a str, label: &'a str) -> Result<&'a str, NomErr<LineError<'a>>> {
	let label: &str = label.trim();
	if label.is_empty() {
		return Err(NomErr::Failure(LineError::new(start, FormatErrorKind::EmptyLabel)));
	}
	Ok(label)
}

fn parse_char<const CHAR: char>(input: &str, kind: FormatErrorKind) -> ParsingResult<'_, char> {
	let mut chars: std::str::Chars = input.chars();

	if let Some(ch) = chars.next() {
		if ch == CHAR {
			return Ok((chars.as_str(), ch));
		}
	}

	Err(NomErr::Failure(LineError::new(input, kind)))
}
