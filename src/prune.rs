use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;

use crate::automaton::Automaton;
use crate::automaton::StateIdx;
use crate::automaton::StateName;
use crate::automaton::SymbolIdx;

/// Removes every state that is unreachable from the initial state or cannot reach
/// an accepting state. The initial state is always kept.
///
/// Transitions into removed states are dropped, so the result may be partial.
/// Surviving states keep their relative order; pruning twice changes nothing.
pub fn prune(automaton: &Automaton) -> Automaton {
	let removed: BTreeSet<StateIdx> = removable_states(automaton);
	if removed.is_empty() {
		return automaton.clone();
	}

	let mut remap: BTreeMap<StateIdx, StateIdx> = BTreeMap::new();
	let mut states: Vec<StateName> = Vec::new();
	for state in automaton.state_indices() {
		if removed.contains(&state) {
			debug!("pruning state {}", automaton.state_name(state));
			continue;
		}
		remap.insert(state, StateIdx(states.len()));
		states.push(automaton.state_name(state).clone());
	}

	let mut transitions: BTreeMap<(StateIdx, SymbolIdx), BTreeSet<StateIdx>> = BTreeMap::new();
	for (from, symbol, targets) in automaton.transitions() {
		let Some(&from): Option<&StateIdx> = remap.get(&from) else {
			continue;
		};
		let targets: BTreeSet<StateIdx> = targets
			.iter()
			.filter_map(|target| remap.get(target).copied())
			.collect::<BTreeSet<_>>();
		if !targets.is_empty() {
			transitions.insert((from, symbol), targets);
		}
	}

	let accepting: BTreeSet<StateIdx> = automaton
		.accepting()
		.iter()
		.filter_map(|state| remap.get(state).copied())
		.collect::<BTreeSet<_>>();

	Automaton::from_parts(
		states,
		automaton.alphabet().to_vec(),
		remap[&automaton.initial()],
		accepting,
		transitions,
	)
}

/// States [`prune`] would remove, in index order.
pub fn removable_states(automaton: &Automaton) -> BTreeSet<StateIdx> {
	let reachable: BTreeSet<StateIdx> = reachable_states(automaton);
	let live: BTreeSet<StateIdx> = live_states(automaton);
	automaton
		.state_indices()
		.filter(|state| *state != automaton.initial() && !(reachable.contains(state) && live.contains(state)))
		.collect::<BTreeSet<_>>()
}

/// States reachable from the initial state, including itself.
pub fn reachable_states(automaton: &Automaton) -> BTreeSet<StateIdx> {
	let mut successors: BTreeMap<StateIdx, BTreeSet<StateIdx>> = BTreeMap::new();
	for (from, _, targets) in automaton.transitions() {
		successors.entry(from).or_default().extend(targets.iter().copied());
	}
	search(&successors, [automaton.initial()])
}

/// States from which some accepting state is reachable, including accepting states.
pub fn live_states(automaton: &Automaton) -> BTreeSet<StateIdx> {
	let mut predecessors: BTreeMap<StateIdx, BTreeSet<StateIdx>> = BTreeMap::new();
	for (from, _, targets) in automaton.transitions() {
		for &target in targets.iter() {
			predecessors.entry(target).or_default().insert(from);
		}
	}
	search(&predecessors, automaton.accepting().iter().copied())
}

fn search<I>(edges: &BTreeMap<StateIdx, BTreeSet<StateIdx>>, start: I) -> BTreeSet<StateIdx>
where
	I: IntoIterator<Item = StateIdx>,
{
	let mut seen: BTreeSet<StateIdx> = BTreeSet::new();
	let mut queue: VecDeque<StateIdx> = VecDeque::new();
	for state in start {
		if seen.insert(state) {
			queue.push_back(state);
		}
	}
	while let Some(state) = queue.pop_front() {
		for &next in edges.get(&state).into_iter().flatten() {
			if seen.insert(next) {
				queue.push_back(next);
			}
		}
	}
	seen
}
