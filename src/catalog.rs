use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::btree_map::Entry;

use crate::automaton::StateIdx;
use crate::automaton::SymbolIdx;
use crate::error::Violation;
use crate::transition_table::NO_TRANSITION;

/// Declared states and symbols of a definition, with label lookups.
///
/// Built even when the declaration is invalid, so that later validation steps
/// can keep collecting violations against whatever was declared.
/// Blank entries in any list are ignored.
#[derive(Debug)]
pub struct Catalog {
	states: Vec<String>,
	symbols: Vec<String>,
	state_lookup: BTreeMap<String, StateIdx>,
	symbol_lookup: BTreeMap<String, SymbolIdx>,
	initial: Option<StateIdx>,
	accepting: BTreeSet<StateIdx>,
}

impl Catalog {
	pub fn declare<S, Y, A>(
		states: &[S],
		symbols: &[Y],
		initial: &str,
		accepting: &[A],
		violations: &mut Vec<Violation>,
	) -> Self
	where
		S: AsRef<str>,
		Y: AsRef<str>,
		A: AsRef<str>,
	{
		let mut catalog: Self = Self {
			states: Vec::new(),
			symbols: Vec::new(),
			state_lookup: BTreeMap::new(),
			symbol_lookup: BTreeMap::new(),
			initial: None,
			accepting: BTreeSet::new(),
		};

		for label in non_blank(states) {
			if label.trim() == NO_TRANSITION {
				violations.push(Violation::ReservedStateLabel(label.to_owned()));
			}
			match catalog.state_lookup.entry(label.to_owned()) {
				Entry::Vacant(entry) => {
					entry.insert(StateIdx(catalog.states.len()));
					catalog.states.push(label.to_owned());
				},
				Entry::Occupied(_) => violations.push(Violation::DuplicateState(label.to_owned())),
			}
		}

		for label in non_blank(symbols) {
			match catalog.symbol_lookup.entry(label.to_owned()) {
				Entry::Vacant(entry) => {
					entry.insert(SymbolIdx(catalog.symbols.len()));
					catalog.symbols.push(label.to_owned());
				},
				Entry::Occupied(_) => violations.push(Violation::DuplicateSymbol(label.to_owned())),
			}
		}

		catalog.initial = catalog.state(initial);
		if catalog.initial.is_none() {
			violations.push(Violation::UnknownInitialState(initial.to_owned()));
		}

		for label in non_blank(accepting) {
			match catalog.state(label) {
				Some(state) => {
					catalog.accepting.insert(state);
				},
				None => violations.push(Violation::UnknownAcceptingState(label.to_owned())),
			}
		}

		debug!(
			"declared {} states, {} symbols, {} accepting",
			catalog.states.len(),
			catalog.symbols.len(),
			catalog.accepting.len()
		);

		catalog
	}

	pub fn state(&self, label: &str) -> Option<StateIdx> {
		self.state_lookup.get(label).copied()
	}

	pub fn symbol(&self, label: &str) -> Option<SymbolIdx> {
		self.symbol_lookup.get(label).copied()
	}

	pub fn initial(&self) -> Option<StateIdx> {
		self.initial
	}

	pub fn state_count(&self) -> usize {
		self.states.len()
	}

	pub fn symbol_count(&self) -> usize {
		self.symbols.len()
	}

	pub(crate) fn into_parts(self) -> (Vec<String>, Vec<String>, BTreeSet<StateIdx>) {
		(self.states, self.symbols, self.accepting)
	}
}

fn non_blank<S: AsRef<str>>(labels: &[S]) -> impl Iterator<Item = &str> {
	labels
		.iter()
		.map(S::as_ref)
		.filter(|label| !label.trim().is_empty())
}
