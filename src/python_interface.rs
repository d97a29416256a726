use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::analysis::Classification;
use crate::error::LoadError;
use crate::error::SimulationError;
use crate::revision::Revision;
use crate::revision::Stage;
use crate::transition_table::RawTarget;
use crate::transition_table::RawTransition;
use crate::view::TableView;
use crate::view::to_dot;

pyo3::create_exception!(faw, FawException, PyRuntimeError);
pyo3::create_exception!(faw, FawDefinitionError, FawException);
pyo3::create_exception!(faw, FawUnknownSymbol, FawException);

#[pyclass]
#[derive(Debug, Default)]
struct Workbench {
	revision: Option<Revision>,
}

/// Accepted shapes for one destination entry: a label or a list of labels.
/// `None` on the Python side means no transition.
#[derive(Debug, FromPyObject)]
enum PyTarget {
	One(String),
	Many(Vec<String>),
}

#[pymethods]
impl Workbench {
	#[new]
	fn new() -> Self {
		Self::default()
	}

	/// `transitions` maps `(state, symbol)` tuples to a label, a list of labels, or `None`.
	fn define(
		&mut self,
		states: Vec<String>,
		alphabet: Vec<String>,
		initial: &str,
		accepting: Vec<String>,
		transitions: &Bound<'_, PyDict>,
	) -> PyResult<u64> {
		let mut raw: Vec<RawTransition> = Vec::with_capacity(transitions.len());
		for (key, value) in transitions.iter() {
			let (from, symbol): (String, String) = key.extract()?;
			let target: Option<PyTarget> = value.extract()?;
			let target: RawTarget = match target {
				None => RawTarget::Blank,
				Some(PyTarget::One(label)) => RawTarget::One(label),
				Some(PyTarget::Many(labels)) => RawTarget::Many(labels),
			};
			raw.push(RawTransition::new(from, symbol, target));
		}

		let revision: Revision = Revision::define(&states, &alphabet, initial, &accepting, &raw)
			.map_err(|err| FawDefinitionError::new_err(err.messages()))?;
		Ok(self.replace(revision))
	}

	fn load(&mut self, text: &str) -> PyResult<u64> {
		let revision: Revision = Revision::load(text).map_err(|err| match err {
			LoadError::Definition(err) => FawDefinitionError::new_err(err.messages()),
			LoadError::Format(err) => FawDefinitionError::new_err(vec![err.to_string()]),
		})?;
		Ok(self.replace(revision))
	}

	/// `(deterministic, [(state, symbol, destination_count), ...])`.
	fn classify(&self) -> PyResult<(bool, Vec<(String, String, usize)>)> {
		let revision: &Revision = self.current()?;
		let classification: Classification = revision.classify();
		let violations: Vec<(String, String, usize)> = classification
			.violations
			.iter()
			.map(|violation| {
				(
					revision.automaton().state_name(violation.state).to_string(),
					revision.automaton().symbol(violation.symbol).to_owned(),
					violation.destinations,
				)
			})
			.collect::<Vec<_>>();
		Ok((classification.deterministic, violations))
	}

	fn determinize(&mut self) -> PyResult<u64> {
		let next: Revision = self.current()?.determinize();
		Ok(self.replace(next))
	}

	fn prune(&mut self) -> PyResult<u64> {
		let next: Revision = self.current()?.prune();
		Ok(self.replace(next))
	}

	fn validate(&self, word: &str) -> PyResult<bool> {
		match self.current()?.simulate(word) {
			Ok(verdict) => Ok(verdict.accepted),
			Err(err @ SimulationError::UnknownSymbol { .. }) => Err(FawUnknownSymbol::new_err(err.to_string())),
		}
	}

	fn table(&self) -> PyResult<String> {
		Ok(TableView::of(self.current()?.automaton()).to_string())
	}

	fn dot(&self) -> PyResult<String> {
		Ok(to_dot(self.current()?.automaton()))
	}

	#[getter]
	fn version(&self) -> Option<u64> {
		self.revision.as_ref().map(Revision::version)
	}

	#[getter]
	fn stage(&self) -> Option<&'static str> {
		self.revision.as_ref().map(|revision| match revision.stage() {
			Stage::Defined => "defined",
			Stage::Determinized => "determinized",
			Stage::Pruned => "pruned",
		})
	}

	#[getter]
	fn states(&self) -> PyResult<Vec<String>> {
		Ok(self
			.current()?
			.automaton()
			.states()
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>())
	}
}

impl Workbench {
	fn current(&self) -> PyResult<&Revision> {
		self.revision
			.as_ref()
			.ok_or_else(|| FawException::new_err("Workbench has no automaton defined"))
	}

	fn replace(&mut self, revision: Revision) -> u64 {
		let version: u64 = revision.version();
		self.revision = Some(revision);
		version
	}
}

#[pymodule]
mod faw {
	use super::*;

	#[pymodule_export]
	use super::Workbench;

	#[pymodule_init]
	fn init(m: &Bound<'_, PyModule>) -> PyResult<()> {
		m.add("FawException", m.py().get_type::<FawException>())?;
		m.add("FawDefinitionError", m.py().get_type::<FawDefinitionError>())?;
		m.add("FawUnknownSymbol", m.py().get_type::<FawUnknownSymbol>())?;
		Ok(())
	}
}
