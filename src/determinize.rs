use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::automaton::Automaton;
use crate::automaton::StateIdx;
use crate::automaton::StateName;
use crate::automaton::SymbolIdx;

/// Subset construction.
///
/// Returns a total deterministic automaton accepting the same language as `source`.
/// Each new state stands for a set of source states; the empty set is the sink,
/// which loops to itself on every symbol. New states are numbered in discovery order:
/// `{initial}` first, then successors breadth-first in alphabet order,
/// so the result only depends on `source`.
///
/// The number of reachable subsets is at most `2^n`, which this does not try to avoid.
pub fn determinize(source: &Automaton) -> Automaton {
	let mut construction: SubsetConstruction<'_> = SubsetConstruction {
		source,
		subsets: Vec::new(),
		subset_ids: BTreeMap::new(),
		transitions: BTreeMap::new(),
	};

	let initial: StateIdx = construction.add_subset(BTreeSet::from([source.initial()]));

	// `construction.subsets` grows inside the loop.
	let mut i: usize = 0;
	while i < construction.subsets.len() {
		let current: BTreeSet<StateIdx> = construction.subsets[i].clone();
		for symbol in source.symbol_indices() {
			let next: BTreeSet<StateIdx> = step(source, &current, symbol);
			let next: StateIdx = construction.add_subset(next);
			construction
				.transitions
				.insert((StateIdx(i), symbol), BTreeSet::from([next]));
		}
		i += 1;
	}

	debug!(
		"subset construction: {} source states -> {} subsets",
		source.state_count(),
		construction.subsets.len()
	);

	construction.finish(initial)
}

/// Every state reachable from some member of `current` on `symbol`.
pub fn step(automaton: &Automaton, current: &BTreeSet<StateIdx>, symbol: SymbolIdx) -> BTreeSet<StateIdx> {
	current
		.iter()
		.flat_map(|&state| automaton.targets(state, symbol))
		.collect::<BTreeSet<_>>()
}

struct SubsetConstruction<'a> {
	source: &'a Automaton,
	subsets: Vec<BTreeSet<StateIdx>>,
	subset_ids: BTreeMap<BTreeSet<StateIdx>, StateIdx>,
	transitions: BTreeMap<(StateIdx, SymbolIdx), BTreeSet<StateIdx>>,
}

impl SubsetConstruction<'_> {
	fn add_subset(&mut self, subset: BTreeSet<StateIdx>) -> StateIdx {
		if let Some(&idx) = self.subset_ids.get(&subset) {
			return idx;
		}
		let idx: StateIdx = StateIdx(self.subsets.len());
		debug!("discovered subset {idx:?} = {}", self.name(&subset));
		self.subsets.push(subset.clone());
		self.subset_ids.insert(subset, idx);
		idx
	}

	fn name(&self, subset: &BTreeSet<StateIdx>) -> StateName {
		StateName::Subset(
			subset
				.iter()
				.map(|&member| self.source.state_name(member).clone())
				.collect::<Vec<_>>(),
		)
	}

	fn finish(self, initial: StateIdx) -> Automaton {
		let states: Vec<StateName> = self.subsets.iter().map(|subset| self.name(subset)).collect::<Vec<_>>();
		let accepting: BTreeSet<StateIdx> = self
			.subsets
			.iter()
			.enumerate()
			.filter(|(_, subset)| subset.iter().any(|&member| self.source.is_accepting(member)))
			.map(|(i, _)| StateIdx(i))
			.collect::<BTreeSet<_>>();
		Automaton::from_parts(
			states,
			self.source.alphabet().to_vec(),
			initial,
			accepting,
			self.transitions,
		)
	}
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::analysis::classify;
	use crate::analysis::is_deterministic;
	use crate::automaton::define;
	use crate::transition_table::RawTarget;
	use crate::transition_table::RawTransition;

	fn names(automaton: &Automaton) -> Vec<String> {
		automaton.states().iter().map(ToString::to_string).collect::<Vec<_>>()
	}

	#[test]
	fn two_destinations_need_no_sink() {
		let nfa: Automaton = define(
			&["q0", "q1"],
			&["a"],
			"q0",
			&["q1"],
			&[RawTransition::new("q0", "a", RawTarget::from_cell("q0, q1"))],
		)
		.unwrap();
		let dfa: Automaton = determinize(&nfa);
		assert_eq!(names(&dfa), vec!["{q0}", "{q0,q1}"]);
		assert!(is_deterministic(&dfa));
		assert_eq!(dfa.initial(), StateIdx(0));
		assert_eq!(dfa.accepting(), &BTreeSet::from([StateIdx(1)]));
		assert_eq!(dfa.targets(StateIdx(1), SymbolIdx(0)).collect::<Vec<_>>(), vec![StateIdx(1)]);
	}

	#[test]
	fn missing_transition_goes_to_sink() {
		let nfa: Automaton = define(
			&["q0", "q1"],
			&["a", "b"],
			"q0",
			&["q1"],
			&[
				RawTransition::new("q0", "a", RawTarget::Blank),
				RawTransition::new("q0", "b", RawTarget::from_cell("q1")),
				RawTransition::new("q1", "a", RawTarget::from_cell("q1")),
				RawTransition::new("q1", "b", RawTarget::from_cell("q0")),
			],
		)
		.unwrap();
		assert!(!classify(&nfa).deterministic);

		let dfa: Automaton = determinize(&nfa);
		assert_eq!(names(&dfa), vec!["{q0}", "∅", "{q1}"]);
		assert!(classify(&dfa).deterministic);
		let sink: StateIdx = StateIdx(1);
		assert!(dfa.state_name(sink).is_sink());
		assert!(!dfa.is_accepting(sink));
		for symbol in dfa.symbol_indices() {
			assert_eq!(dfa.targets(sink, symbol).collect::<Vec<_>>(), vec![sink]);
		}
	}

	#[test]
	fn no_transitions_at_all() {
		let nfa: Automaton = define(&["q0"], &["a", "b"], "q0", &["q0"], &[]).unwrap();
		let dfa: Automaton = determinize(&nfa);
		assert_eq!(names(&dfa), vec!["{q0}", "∅"]);
		assert_eq!(dfa.accepting(), &BTreeSet::from([StateIdx(0)]));
		assert!(is_deterministic(&dfa));
	}

	#[test]
	fn empty_alphabet_keeps_single_state() {
		let empty: [&str; 0] = [];
		let nfa: Automaton = define(&["q0"], &empty, "q0", &empty, &[]).unwrap();
		let dfa: Automaton = determinize(&nfa);
		assert_eq!(names(&dfa), vec!["{q0}"]);
		assert!(dfa.accepting().is_empty());
	}

	#[test]
	fn reproducible() {
		let nfa: Automaton = define(
			&["s", "t", "u"],
			&["x", "y"],
			"s",
			&["u"],
			&[
				RawTransition::new("s", "x", RawTarget::from_cell("s, t")),
				RawTransition::new("s", "y", RawTarget::from_cell("s")),
				RawTransition::new("t", "y", RawTarget::from_cell("u")),
				RawTransition::new("u", "x", RawTarget::from_cell("t, u")),
			],
		)
		.unwrap();
		let first: Automaton = determinize(&nfa);
		let second: Automaton = determinize(&nfa);
		assert_eq!(first, second);
		assert_eq!(names(&first), vec!["{s}", "{s,t}", "{s,u}", "{s,t,u}"]);
	}

	#[test]
	fn subsets_compare_as_sets() {
		// {p,q} is reached from both p (on a) and q (on a) with different insertion orders.
		let nfa: Automaton = define(
			&["p", "q"],
			&["a"],
			"p",
			&["q"],
			&[
				RawTransition::new("p", "a", RawTarget::from_cell("q, p")),
				RawTransition::new("q", "a", RawTarget::from_cell("p, q")),
			],
		)
		.unwrap();
		let dfa: Automaton = determinize(&nfa);
		assert_eq!(names(&dfa), vec!["{p}", "{p,q}"]);
	}
}
