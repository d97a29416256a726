use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::error::DefinitionError;
use crate::error::Violation;
use crate::transition_table;
use crate::transition_table::RawTransition;

/// Index of a state within one [`Automaton`].
#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StateIdx(pub(crate) usize);

/// Index of a symbol within one [`Automaton`]'s alphabet.
#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SymbolIdx(pub(crate) usize);

/// Identity of a state.
///
/// User-defined states carry their label. States produced by subset construction
/// carry the names of the source states they stand for, in source index order,
/// so two subsets compare equal iff they have the same members.
/// The empty subset is the sink.
#[derive(Debug, Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum StateName {
	Label(String),
	Subset(Vec<StateName>),
}

/// A finite automaton over string-labelled states and symbols.
///
/// A `(state, symbol)` pair with no entry in `transitions` has no destinations;
/// stored destination sets are never empty.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Automaton {
	states: Vec<StateName>,
	alphabet: Vec<String>,
	initial: StateIdx,
	accepting: BTreeSet<StateIdx>,
	transitions: BTreeMap<(StateIdx, SymbolIdx), BTreeSet<StateIdx>>,
}

/// Validates a raw definition and builds the automaton it describes.
///
/// All problems are collected before failing; see [`DefinitionError`].
pub fn define<S, Y, A>(
	states: &[S],
	alphabet: &[Y],
	initial: &str,
	accepting: &[A],
	transitions: &[RawTransition],
) -> Result<Automaton, DefinitionError>
where
	S: AsRef<str>,
	Y: AsRef<str>,
	A: AsRef<str>,
{
	let mut violations: Vec<Violation> = Vec::new();

	let catalog: Catalog = Catalog::declare(states, alphabet, initial, accepting, &mut violations);
	let table: BTreeMap<(StateIdx, SymbolIdx), BTreeSet<StateIdx>> =
		transition_table::build(&catalog, transitions, &mut violations);

	let initial: StateIdx = match catalog.initial() {
		Some(initial) if violations.is_empty() => initial,
		_ => {
			debug!("rejecting definition with {} violations", violations.len());
			return Err(DefinitionError { violations });
		},
	};

	let (states, alphabet, accepting): (Vec<String>, Vec<String>, BTreeSet<StateIdx>) = catalog.into_parts();
	Ok(Automaton::from_parts(
		states.into_iter().map(StateName::Label).collect::<Vec<_>>(),
		alphabet,
		initial,
		accepting,
		table,
	))
}

impl Automaton {
	pub(crate) fn from_parts(
		states: Vec<StateName>,
		alphabet: Vec<String>,
		initial: StateIdx,
		accepting: BTreeSet<StateIdx>,
		mut transitions: BTreeMap<(StateIdx, SymbolIdx), BTreeSet<StateIdx>>,
	) -> Self {
		transitions.retain(|_, targets| !targets.is_empty());
		let automaton: Self = Self {
			states,
			alphabet,
			initial,
			accepting,
			transitions,
		};
		debug_assert!(automaton.invariants_hold(), "malformed automaton: {automaton:#?}");
		automaton
	}

	fn invariants_hold(&self) -> bool {
		let n: usize = self.states.len();
		let unique: BTreeSet<&StateName> = self.states.iter().collect::<BTreeSet<_>>();
		let symbols: BTreeSet<&String> = self.alphabet.iter().collect::<BTreeSet<_>>();
		unique.len() == n
			&& symbols.len() == self.alphabet.len()
			&& self.initial.0 < n
			&& self.accepting.iter().all(|s| s.0 < n)
			&& self.transitions.iter().all(|(&(from, symbol), targets)| {
				from.0 < n && symbol.0 < self.alphabet.len() && targets.iter().all(|t| t.0 < n)
			})
	}

	pub fn states(&self) -> &[StateName] {
		&self.states
	}

	pub fn alphabet(&self) -> &[String] {
		&self.alphabet
	}

	pub fn initial(&self) -> StateIdx {
		self.initial
	}

	pub fn accepting(&self) -> &BTreeSet<StateIdx> {
		&self.accepting
	}

	pub fn is_accepting(&self, state: StateIdx) -> bool {
		self.accepting.contains(&state)
	}

	pub fn state_count(&self) -> usize {
		self.states.len()
	}

	pub fn state_name(&self, state: StateIdx) -> &StateName {
		&self.states[state.0]
	}

	pub fn symbol(&self, symbol: SymbolIdx) -> &str {
		&self.alphabet[symbol.0]
	}

	pub fn state_indices(&self) -> impl Iterator<Item = StateIdx> + use<> {
		(0..self.states.len()).map(StateIdx)
	}

	pub fn symbol_indices(&self) -> impl Iterator<Item = SymbolIdx> + use<> {
		(0..self.alphabet.len()).map(SymbolIdx)
	}

	/// Destinations of `(state, symbol)`; empty when the pair has no transition.
	pub fn targets(&self, state: StateIdx, symbol: SymbolIdx) -> impl Iterator<Item = StateIdx> + '_ {
		self.transitions
			.get(&(state, symbol))
			.into_iter()
			.flat_map(|targets| targets.iter().copied())
	}

	pub fn target_count(&self, state: StateIdx, symbol: SymbolIdx) -> usize {
		self.transitions.get(&(state, symbol)).map_or(0, BTreeSet::len)
	}

	/// Every stored transition, ordered by source state then symbol.
	pub fn transitions(&self) -> impl Iterator<Item = (StateIdx, SymbolIdx, &BTreeSet<StateIdx>)> + '_ {
		self.transitions
			.iter()
			.map(|(&(from, symbol), targets)| (from, symbol, targets))
	}

	/// True iff no pair has more than one destination (missing pairs are allowed).
	pub fn is_functional(&self) -> bool {
		self.transitions.values().all(|targets| targets.len() <= 1)
	}

	pub fn find_state(&self, label: &str) -> Option<StateIdx> {
		self.states
			.iter()
			.position(|name| matches!(name, StateName::Label(l) if l == label))
			.map(StateIdx)
	}

	pub fn find_symbol(&self, symbol: &str) -> Option<SymbolIdx> {
		self.alphabet.iter().position(|s| s == symbol).map(SymbolIdx)
	}
}

impl StateIdx {
	pub fn index(self) -> usize {
		self.0
	}
}

impl SymbolIdx {
	pub fn index(self) -> usize {
		self.0
	}
}

impl StateName {
	/// The sink produced by subset construction.
	pub fn sink() -> Self {
		Self::Subset(Vec::new())
	}

	pub fn is_sink(&self) -> bool {
		matches!(self, Self::Subset(members) if members.is_empty())
	}
}

impl std::fmt::Display for StateName {
	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Label(label) => fmt.write_str(label),
			Self::Subset(members) if members.is_empty() => fmt.write_str("∅"),
			Self::Subset(members) => {
				fmt.write_str("{")?;
				for (i, member) in members.iter().enumerate() {
					if i > 0 {
						fmt.write_str(",")?;
					}
					member.fmt(fmt)?;
				}
				fmt.write_str("}")
			},
		}
	}
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::transition_table::RawTarget;

	fn raw(from: &str, symbol: &str, target: RawTarget) -> RawTransition {
		RawTransition::new(from, symbol, target)
	}

	#[test]
	fn define_builds_sets_of_destinations() {
		let a: Automaton = define(
			&["q0", "q1"],
			&["a", "b"],
			"q0",
			&["q1"],
			&[
				raw("q0", "a", RawTarget::Many(vec!["q0".to_owned(), "q1".to_owned(), "q0".to_owned()])),
				raw("q0", "b", RawTarget::One("q1".to_owned())),
				raw("q1", "a", RawTarget::Blank),
			],
		)
		.unwrap();

		let q0: StateIdx = a.find_state("q0").unwrap();
		let q1: StateIdx = a.find_state("q1").unwrap();
		let sym_a: SymbolIdx = a.find_symbol("a").unwrap();
		let sym_b: SymbolIdx = a.find_symbol("b").unwrap();

		assert_eq!(a.initial(), q0);
		assert!(a.is_accepting(q1));
		assert_eq!(a.targets(q0, sym_a).collect::<Vec<_>>(), vec![q0, q1]);
		assert_eq!(a.targets(q0, sym_b).collect::<Vec<_>>(), vec![q1]);
		assert_eq!(a.target_count(q1, sym_a), 0);
		assert_eq!(a.transitions().count(), 2);
		assert!(!a.is_functional());
	}

	#[test]
	fn define_collects_all_violations() {
		let err: DefinitionError = define(
			&["q0", "q1", "q0"],
			&["a", "a"],
			"q7",
			&["q1", "q8"],
			&[
				raw("q0", "a", RawTarget::One("q5".to_owned())),
				raw("q9", "a", RawTarget::Blank),
				raw("q1", "z", RawTarget::Blank),
			],
		)
		.unwrap_err();

		assert_eq!(
			err.violations,
			vec![
				Violation::DuplicateState("q0".to_owned()),
				Violation::DuplicateSymbol("a".to_owned()),
				Violation::UnknownInitialState("q7".to_owned()),
				Violation::UnknownAcceptingState("q8".to_owned()),
				Violation::UnknownStateReference {
					from: "q0".to_owned(),
					symbol: "a".to_owned(),
					target: "q5".to_owned(),
				},
				Violation::UnknownTransitionSource {
					from: "q9".to_owned(),
					symbol: "a".to_owned(),
				},
				Violation::UnknownTransitionSymbol {
					from: "q1".to_owned(),
					symbol: "z".to_owned(),
				},
			]
		);
	}

	#[test]
	fn state_labelled_as_no_transition_is_rejected() {
		let err: DefinitionError = define(
			&["q0", "-"],
			&["a"],
			"q0",
			&["-"],
			&[raw("q0", "a", RawTarget::from_cell("-"))],
		)
		.unwrap_err();
		assert_eq!(err.violations, vec![Violation::ReservedStateLabel("-".to_owned())]);
	}

	#[test]
	fn owned_states_with_borrowed_alphabet() {
		let states: Vec<String> = (0..2).map(|i| format!("q{i}")).collect::<Vec<_>>();
		let a: Automaton = define(
			&states,
			&["a"],
			"q0",
			&["q1"],
			&[raw("q0", "a", RawTarget::from_cell("q1"))],
		)
		.unwrap();
		assert_eq!(a.alphabet(), ["a".to_owned()]);
		assert_eq!(a.state_count(), 2);
	}

	#[test]
	fn subset_names() {
		let name: StateName = StateName::Subset(vec![
			StateName::Label("q0".to_owned()),
			StateName::Label("q1".to_owned()),
		]);
		assert_eq!(name.to_string(), "{q0,q1}");
		assert_eq!(StateName::sink().to_string(), "∅");
		assert!(StateName::sink().is_sink());
		assert!(!name.is_sink());
	}
}
