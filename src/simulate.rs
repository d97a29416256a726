use std::collections::BTreeSet;

use crate::automaton::Automaton;
use crate::automaton::StateIdx;
use crate::automaton::SymbolIdx;
use crate::determinize::step;
use crate::error::SimulationError;

/// Outcome of running one word.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Verdict {
	pub accepted: bool,
	pub run: Run,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Run {
	/// Every pair had at most one destination.
	/// `path[0]` is the initial state and `path[i]` the state after `i` symbols.
	/// `halted_at` is the index of the symbol that had no transition, if any.
	Walk { path: Vec<StateIdx>, halted_at: Option<usize> },
	/// Set of current states before the first symbol and after each symbol.
	/// Stops early once the set is empty.
	Frontier { steps: Vec<BTreeSet<StateIdx>> },
}

/// Runs `input` against `automaton`.
///
/// `input` is split into alphabet symbols by [`tokenize`] before anything is consumed.
pub fn simulate(automaton: &Automaton, input: &str) -> Result<Verdict, SimulationError> {
	let word: Vec<SymbolIdx> = tokenize(automaton, input)?;
	Ok(run(automaton, &word))
}

/// Like [`simulate`], for input that is already split into symbols.
pub fn simulate_symbols<S: AsRef<str>>(automaton: &Automaton, symbols: &[S]) -> Result<Verdict, SimulationError> {
	let word: Vec<SymbolIdx> = symbols
		.iter()
		.enumerate()
		.map(|(position, symbol)| {
			automaton
				.find_symbol(symbol.as_ref())
				.ok_or_else(|| SimulationError::UnknownSymbol {
					symbol: symbol.as_ref().to_owned(),
					position,
				})
		})
		.collect::<Result<Vec<_>, _>>()?;
	Ok(run(automaton, &word))
}

pub fn accepts(automaton: &Automaton, input: &str) -> Result<bool, SimulationError> {
	simulate(automaton, input).map(|verdict| verdict.accepted)
}

/// Splits `input` into alphabet symbols.
///
/// Any segmentation of the whole input is accepted; among them, the longest symbol
/// is preferred at each position. Whitespace that does not start a symbol separates
/// tokens and is skipped. If no segmentation exists, the error names the character
/// at the furthest position any partial segmentation reaches.
pub fn tokenize(automaton: &Automaton, input: &str) -> Result<Vec<SymbolIdx>, SimulationError> {
	let mut by_length: Vec<SymbolIdx> = automaton
		.symbol_indices()
		.filter(|&symbol| !automaton.symbol(symbol).is_empty())
		.collect::<Vec<_>>();
	by_length.sort_by_key(|&symbol| std::cmp::Reverse(automaton.symbol(symbol).len()));

	let end: usize = input.len();

	// `complete[pos]` iff `input[pos..]` can be segmented.
	let mut complete: Vec<bool> = vec![false; end + 1];
	complete[end] = true;
	for pos in (0..end).rev().filter(|&pos| input.is_char_boundary(pos)) {
		let segmentable: bool = moves(automaton, &by_length, input, pos)
			.iter()
			.any(|&(_, next)| complete[next]);
		complete[pos] = segmentable;
	}

	if !complete[0] {
		let mut reached: Vec<bool> = vec![false; end + 1];
		reached[0] = true;
		for pos in 0..end {
			if reached[pos] {
				for (_, next) in moves(automaton, &by_length, input, pos) {
					reached[next] = true;
				}
			}
		}
		let position: usize = (0..end).rev().find(|&pos| reached[pos]).unwrap_or(0);
		let symbol: String = input[position..].chars().next().map(String::from).unwrap_or_default();
		debug!("no segmentation of {input:?} gets past byte {position}");
		return Err(SimulationError::UnknownSymbol { symbol, position });
	}

	let mut word: Vec<SymbolIdx> = Vec::new();
	let mut pos: usize = 0;
	while pos < end {
		let Some((symbol, next)): Option<(Option<SymbolIdx>, usize)> = moves(automaton, &by_length, input, pos)
			.into_iter()
			.find(|&(_, next)| complete[next])
		else {
			break;
		};
		word.extend(symbol);
		pos = next;
	}
	Ok(word)
}

/// Every way to advance from `pos`: each symbol starting there, longest first,
/// or else a single skipped whitespace character.
fn moves(automaton: &Automaton, by_length: &[SymbolIdx], input: &str, pos: usize) -> Vec<(Option<SymbolIdx>, usize)> {
	let rest: &str = &input[pos..];
	let mut moves: Vec<(Option<SymbolIdx>, usize)> = by_length
		.iter()
		.filter(|&&symbol| rest.starts_with(automaton.symbol(symbol)))
		.map(|&symbol| (Some(symbol), pos + automaton.symbol(symbol).len()))
		.collect::<Vec<_>>();
	if moves.is_empty() {
		if let Some(ch) = rest.chars().next().filter(|ch| ch.is_whitespace()) {
			moves.push((None, pos + ch.len_utf8()));
		}
	}
	moves
}

fn run(automaton: &Automaton, word: &[SymbolIdx]) -> Verdict {
	if automaton.is_functional() {
		walk(automaton, word)
	} else {
		frontier(automaton, word)
	}
}

fn walk(automaton: &Automaton, word: &[SymbolIdx]) -> Verdict {
	let mut current: StateIdx = automaton.initial();
	let mut path: Vec<StateIdx> = vec![current];
	for (i, &symbol) in word.iter().enumerate() {
		let Some(next): Option<StateIdx> = automaton.targets(current, symbol).next() else {
			debug!(
				"halted in {} on symbol {i} ({:?})",
				automaton.state_name(current),
				automaton.symbol(symbol)
			);
			return Verdict {
				accepted: false,
				run: Run::Walk {
					path,
					halted_at: Some(i),
				},
			};
		};
		debug!(
			"{} --{}--> {}",
			automaton.state_name(current),
			automaton.symbol(symbol),
			automaton.state_name(next)
		);
		current = next;
		path.push(current);
	}
	Verdict {
		accepted: automaton.is_accepting(current),
		run: Run::Walk { path, halted_at: None },
	}
}

fn frontier(automaton: &Automaton, word: &[SymbolIdx]) -> Verdict {
	let mut current: BTreeSet<StateIdx> = BTreeSet::from([automaton.initial()]);
	let mut steps: Vec<BTreeSet<StateIdx>> = vec![current.clone()];
	for &symbol in word.iter() {
		if current.is_empty() {
			break;
		}
		current = step(automaton, &current, symbol);
		debug!("after {:?}: {} states", automaton.symbol(symbol), current.len());
		steps.push(current.clone());
	}
	Verdict {
		accepted: current.iter().any(|&state| automaton.is_accepting(state)),
		run: Run::Frontier { steps },
	}
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::automaton::define;
	use crate::determinize::determinize;
	use crate::prune::prune;
	use crate::transition_table::RawTarget;
	use crate::transition_table::RawTransition;

	fn example_nfa() -> Automaton {
		define(
			&["q0", "q1"],
			&["a"],
			"q0",
			&["q1"],
			&[RawTransition::new("q0", "a", RawTarget::from_cell("q0, q1"))],
		)
		.unwrap()
	}

	#[test]
	fn nfa_frontier() {
		let nfa: Automaton = example_nfa();
		let verdict: Verdict = simulate(&nfa, "a").unwrap();
		assert!(verdict.accepted);
		assert_eq!(
			verdict.run,
			Run::Frontier {
				steps: vec![
					BTreeSet::from([StateIdx(0)]),
					BTreeSet::from([StateIdx(0), StateIdx(1)]),
				],
			}
		);
		assert!(!accepts(&nfa, "").unwrap());
		assert!(accepts(&nfa, "aaaa").unwrap());
	}

	#[test]
	fn dfa_walk() {
		let dfa: Automaton = determinize(&example_nfa());
		let verdict: Verdict = simulate(&dfa, "aa").unwrap();
		assert!(verdict.accepted);
		assert_eq!(
			verdict.run,
			Run::Walk {
				path: vec![StateIdx(0), StateIdx(1), StateIdx(1)],
				halted_at: None,
			}
		);
	}

	#[test]
	fn pruned_gap_rejects() {
		let nfa: Automaton = define(
			&["q0", "q1"],
			&["a", "b"],
			"q0",
			&["q1"],
			&[RawTransition::new("q0", "a", RawTarget::from_cell("q1"))],
		)
		.unwrap();
		let pruned: Automaton = prune(&determinize(&nfa));
		assert!(accepts(&pruned, "a").unwrap());
		let verdict: Verdict = simulate(&pruned, "ab").unwrap();
		assert!(!verdict.accepted);
		assert_eq!(
			verdict.run,
			Run::Walk {
				path: vec![StateIdx(0), StateIdx(1)],
				halted_at: Some(1),
			}
		);
	}

	#[test]
	fn unknown_symbol_is_reported_before_running() {
		let nfa: Automaton = example_nfa();
		assert_eq!(
			simulate(&nfa, "x").unwrap_err(),
			SimulationError::UnknownSymbol {
				symbol: "x".to_owned(),
				position: 0,
			}
		);
		assert_eq!(
			simulate(&nfa, "aax").unwrap_err(),
			SimulationError::UnknownSymbol {
				symbol: "x".to_owned(),
				position: 2,
			}
		);
		assert_eq!(
			simulate_symbols(&nfa, &["a", "zz"]).unwrap_err(),
			SimulationError::UnknownSymbol {
				symbol: "zz".to_owned(),
				position: 1,
			}
		);
	}

	#[test]
	fn longest_match_tokens() {
		let a: Automaton = define(&["s"], &["a", "ab", "b"], "s", &["s"], &[]).unwrap();
		let tokens: Vec<SymbolIdx> = tokenize(&a, "abab a b").unwrap();
		let symbols: Vec<&str> = tokens.iter().map(|&t| a.symbol(t)).collect::<Vec<_>>();
		assert_eq!(symbols, vec!["ab", "ab", "a", "b"]);
	}

	#[test]
	fn overlapping_symbols_fall_back_to_shorter_match() {
		let a: Automaton = define(
			&["s", "t", "u"],
			&["a", "ab", "bc"],
			"s",
			&["u"],
			&[
				RawTransition::new("s", "a", RawTarget::from_cell("t")),
				RawTransition::new("t", "bc", RawTarget::from_cell("u")),
			],
		)
		.unwrap();
		let tokens: Vec<SymbolIdx> = tokenize(&a, "abc").unwrap();
		let symbols: Vec<&str> = tokens.iter().map(|&t| a.symbol(t)).collect::<Vec<_>>();
		assert_eq!(symbols, vec!["a", "bc"]);
		assert!(accepts(&a, "abc").unwrap());
		assert_eq!(accepts(&a, "abc").unwrap(), accepts_symbols(&a, &["a", "bc"]));

		// "ab" still wins where both segmentations finish.
		let tokens: Vec<SymbolIdx> = tokenize(&a, "ab").unwrap();
		assert_eq!(tokens.iter().map(|&t| a.symbol(t)).collect::<Vec<_>>(), vec!["ab"]);

		assert_eq!(
			tokenize(&a, "abcx").unwrap_err(),
			SimulationError::UnknownSymbol {
				symbol: "x".to_owned(),
				position: 3,
			}
		);
		assert_eq!(
			tokenize(&a, "abb").unwrap_err(),
			SimulationError::UnknownSymbol {
				symbol: "b".to_owned(),
				position: 2,
			}
		);
	}

	fn accepts_symbols(automaton: &Automaton, symbols: &[&str]) -> bool {
		simulate_symbols(automaton, symbols).unwrap().accepted
	}
}
