use crate::automaton::Automaton;
use crate::automaton::StateIdx;
use crate::automaton::StateName;
use crate::automaton::SymbolIdx;

/// Determinism verdict with every offending `(state, symbol)` pair.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Classification {
	pub deterministic: bool,
	pub violations: Vec<Nondeterminism>,
}

/// A pair that does not have exactly one destination.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Nondeterminism {
	pub state: StateIdx,
	pub symbol: SymbolIdx,
	pub destinations: usize,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NondeterminismKind {
	/// No destination; subset construction routes this pair to the sink.
	Missing,
	/// More than one destination.
	Ambiguous,
}

impl Nondeterminism {
	pub fn kind(&self) -> NondeterminismKind {
		if self.destinations == 0 {
			NondeterminismKind::Missing
		} else {
			NondeterminismKind::Ambiguous
		}
	}

	pub fn describe(&self, automaton: &Automaton) -> String {
		let state: &StateName = automaton.state_name(self.state);
		let symbol: &str = automaton.symbol(self.symbol);
		match self.kind() {
			NondeterminismKind::Missing => format!("({state}, {symbol}) has no destination"),
			NondeterminismKind::Ambiguous => {
				format!("({state}, {symbol}) has {} destinations", self.destinations)
			},
		}
	}
}

/// Deterministic iff every declared state has exactly one destination on every symbol.
///
/// A missing transition counts against determinism; the total automaton returned by
/// [`crate::determinize::determinize`] is the deterministic form.
pub fn classify(automaton: &Automaton) -> Classification {
	let mut violations: Vec<Nondeterminism> = Vec::new();
	for state in automaton.state_indices() {
		for symbol in automaton.symbol_indices() {
			let destinations: usize = automaton.target_count(state, symbol);
			if destinations != 1 {
				violations.push(Nondeterminism {
					state,
					symbol,
					destinations,
				});
			}
		}
	}
	debug!("classified automaton: {} offending pairs", violations.len());
	Classification {
		deterministic: violations.is_empty(),
		violations,
	}
}

pub fn is_deterministic(automaton: &Automaton) -> bool {
	automaton
		.state_indices()
		.all(|state| automaton.symbol_indices().all(|symbol| automaton.target_count(state, symbol) == 1))
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::automaton::define;
	use crate::transition_table::RawTarget;
	use crate::transition_table::RawTransition;

	#[test]
	fn two_destinations_is_nondeterministic() {
		let a: Automaton = define(
			&["q0", "q1"],
			&["a"],
			"q0",
			&["q1"],
			&[
				RawTransition::new("q0", "a", RawTarget::from_cell("q0,q1")),
				RawTransition::new("q1", "a", RawTarget::from_cell("q1")),
			],
		)
		.unwrap();
		let c: Classification = classify(&a);
		assert!(!c.deterministic);
		assert!(!is_deterministic(&a));
		assert_eq!(c.violations.len(), 1);
		assert_eq!(c.violations[0].state, a.find_state("q0").unwrap());
		assert_eq!(c.violations[0].kind(), NondeterminismKind::Ambiguous);
		assert_eq!(c.violations[0].describe(&a), "(q0, a) has 2 destinations");
	}

	#[test]
	fn missing_destination_is_nondeterministic() {
		let a: Automaton = define(
			&["q0", "q1"],
			&["a"],
			"q0",
			&["q1"],
			&[
				RawTransition::new("q0", "a", RawTarget::Blank),
				RawTransition::new("q1", "a", RawTarget::from_cell("q0")),
			],
		)
		.unwrap();
		let c: Classification = classify(&a);
		assert!(!c.deterministic);
		assert_eq!(c.violations.len(), 1);
		assert_eq!(c.violations[0].kind(), NondeterminismKind::Missing);
		assert_eq!(c.violations[0].describe(&a), "(q0, a) has no destination");
	}

	#[test]
	fn total_single_valued_is_deterministic() {
		let a: Automaton = define(
			&["q0", "q1"],
			&["a", "b"],
			"q0",
			&["q1"],
			&[
				RawTransition::new("q0", "a", RawTarget::from_cell("q1")),
				RawTransition::new("q0", "b", RawTarget::from_cell("q0")),
				RawTransition::new("q1", "a", RawTarget::from_cell("q1")),
				RawTransition::new("q1", "b", RawTarget::from_cell("q0")),
			],
		)
		.unwrap();
		let c: Classification = classify(&a);
		assert!(c.deterministic);
		assert!(c.violations.is_empty());
		assert!(is_deterministic(&a));
	}
}
