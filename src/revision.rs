use crate::analysis::Classification;
use crate::analysis::classify;
use crate::automaton::Automaton;
use crate::determinize::determinize;
use crate::error::DefinitionError;
use crate::error::LoadError;
use crate::error::SimulationError;
use crate::prune::prune;
use crate::simulate::Verdict;
use crate::simulate::simulate;
use crate::transition_table::RawTransition;

/// Which operation produced a [`Revision`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Stage {
	Defined,
	Determinized,
	Pruned,
}

/// An automaton together with how it was produced.
///
/// Transforming a revision yields a new one with the next version; the original is
/// left untouched, so earlier stages stay available to the caller.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Revision {
	version: u64,
	stage: Stage,
	automaton: Automaton,
}

impl Revision {
	pub fn new(automaton: Automaton) -> Self {
		Self {
			version: 1,
			stage: Stage::Defined,
			automaton,
		}
	}

	pub fn define<S, Y, A>(
		states: &[S],
		alphabet: &[Y],
		initial: &str,
		accepting: &[A],
		transitions: &[RawTransition],
	) -> Result<Self, DefinitionError>
	where
		S: AsRef<str>,
		Y: AsRef<str>,
		A: AsRef<str>,
	{
		crate::automaton::define(states, alphabet, initial, accepting, transitions).map(Self::new)
	}

	/// Parses definition text; see [`crate::definition::Definition`].
	pub fn load(text: &str) -> Result<Self, LoadError> {
		crate::definition::load(text).map(Self::new)
	}

	pub fn version(&self) -> u64 {
		self.version
	}

	pub fn stage(&self) -> Stage {
		self.stage
	}

	pub fn automaton(&self) -> &Automaton {
		&self.automaton
	}

	pub fn into_automaton(self) -> Automaton {
		self.automaton
	}

	pub fn classify(&self) -> Classification {
		classify(&self.automaton)
	}

	pub fn determinize(&self) -> Self {
		self.next(Stage::Determinized, determinize(&self.automaton))
	}

	pub fn prune(&self) -> Self {
		self.next(Stage::Pruned, prune(&self.automaton))
	}

	pub fn simulate(&self, input: &str) -> Result<Verdict, SimulationError> {
		simulate(&self.automaton, input)
	}

	fn next(&self, stage: Stage, automaton: Automaton) -> Self {
		debug!(
			"revision {} ({:?}) -> {} ({stage:?}), {} states",
			self.version,
			self.stage,
			self.version + 1,
			automaton.state_count()
		);
		Self {
			version: self.version + 1,
			stage,
			automaton,
		}
	}
}
