use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::automaton::StateIdx;
use crate::automaton::SymbolIdx;
use crate::catalog::Catalog;
use crate::error::Violation;

/// Table-cell marker for "no transition".
pub const NO_TRANSITION: &str = "-";

/// Destinations for one `(state, symbol)` pair, as submitted.
///
/// Every shape is normalized into a set of destinations by [`build`];
/// blank labels and [`NO_TRANSITION`] contribute nothing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RawTarget {
	Blank,
	One(String),
	Many(Vec<String>),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RawTransition {
	pub from: String,
	pub symbol: String,
	pub target: RawTarget,
}

impl RawTarget {
	/// Parses free text such as `"q0, q1"`, `"-"` or `""`.
	pub fn from_cell(cell: &str) -> Self {
		let mut labels: Vec<String> = cell
			.split(',')
			.map(str::trim)
			.filter(|label| !is_blank(label))
			.map(str::to_owned)
			.collect::<Vec<_>>();
		match labels.len() {
			0 => Self::Blank,
			1 => Self::One(labels.pop().unwrap_or_default()),
			_ => Self::Many(labels),
		}
	}

	pub fn labels(&self) -> impl Iterator<Item = &str> {
		let labels: &[String] = match self {
			Self::Blank => &[],
			Self::One(label) => std::slice::from_ref(label),
			Self::Many(labels) => labels,
		};
		labels.iter().map(String::as_str).filter(|label| !is_blank(label))
	}
}

impl RawTransition {
	pub fn new<F, S>(from: F, symbol: S, target: RawTarget) -> Self
	where
		F: Into<String>,
		S: Into<String>,
	{
		Self {
			from: from.into(),
			symbol: symbol.into(),
			target,
		}
	}
}

fn is_blank(label: &str) -> bool {
	let label: &str = label.trim();
	label.is_empty() || label == NO_TRANSITION
}

/// Resolves raw transitions against `catalog`.
///
/// Entries repeated for the same pair are unioned and repeated destinations collapse.
/// Entries whose source or symbol is undeclared are reported and skipped;
/// undeclared destinations are reported and dropped.
pub fn build(
	catalog: &Catalog,
	raw: &[RawTransition],
	violations: &mut Vec<Violation>,
) -> BTreeMap<(StateIdx, SymbolIdx), BTreeSet<StateIdx>> {
	let mut table: BTreeMap<(StateIdx, SymbolIdx), BTreeSet<StateIdx>> = BTreeMap::new();

	for entry in raw.iter() {
		let maybe_from: Option<StateIdx> = catalog.state(&entry.from);
		if maybe_from.is_none() {
			violations.push(Violation::UnknownTransitionSource {
				from: entry.from.clone(),
				symbol: entry.symbol.clone(),
			});
		}
		let maybe_symbol: Option<SymbolIdx> = catalog.symbol(&entry.symbol);
		if maybe_symbol.is_none() {
			violations.push(Violation::UnknownTransitionSymbol {
				from: entry.from.clone(),
				symbol: entry.symbol.clone(),
			});
		}

		let mut targets: BTreeSet<StateIdx> = BTreeSet::new();
		for label in entry.target.labels() {
			match catalog.state(label) {
				Some(target) => {
					targets.insert(target);
				},
				None => violations.push(Violation::UnknownStateReference {
					from: entry.from.clone(),
					symbol: entry.symbol.clone(),
					target: label.to_owned(),
				}),
			}
		}

		if let (Some(from), Some(symbol)) = (maybe_from, maybe_symbol) {
			let merged: &mut BTreeSet<StateIdx> = table.entry((from, symbol)).or_default();
			merged.extend(targets);
		}
	}

	table.retain(|_, targets| !targets.is_empty());
	debug!("built transition table with {} non-empty entries", table.len());
	table
}
