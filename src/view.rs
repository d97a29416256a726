use std::collections::BTreeMap;
use std::fmt::Write;

use crate::automaton::Automaton;
use crate::automaton::StateIdx;

/// Cell text for a pair without destinations.
pub const EMPTY_CELL: &str = "-";

/// Transition table: one row per state, one column per symbol.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TableView {
	pub symbols: Vec<String>,
	pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TableRow {
	pub state: String,
	pub initial: bool,
	pub accepting: bool,
	/// Destination names per symbol, in alphabet order.
	pub cells: Vec<Vec<String>>,
}

/// Transition graph with parallel edges merged.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GraphView {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GraphNode {
	pub id: usize,
	pub label: String,
	pub initial: bool,
	pub accepting: bool,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GraphEdge {
	pub from: usize,
	pub to: usize,
	/// Every symbol leading from `from` to `to`, in alphabet order.
	pub symbols: Vec<String>,
}

impl TableView {
	pub fn of(automaton: &Automaton) -> Self {
		let rows: Vec<TableRow> = automaton
			.state_indices()
			.map(|state| TableRow {
				state: automaton.state_name(state).to_string(),
				initial: state == automaton.initial(),
				accepting: automaton.is_accepting(state),
				cells: automaton
					.symbol_indices()
					.map(|symbol| {
						automaton
							.targets(state, symbol)
							.map(|target| automaton.state_name(target).to_string())
							.collect::<Vec<_>>()
					})
					.collect::<Vec<_>>(),
			})
			.collect::<Vec<_>>();
		Self {
			symbols: automaton.alphabet().to_vec(),
			rows,
		}
	}
}

impl TableRow {
	/// `→` marks the initial state and `*` accepting ones.
	pub fn label(&self) -> String {
		let mut label: String = String::new();
		if self.initial {
			label.push('→');
		}
		if self.accepting {
			label.push('*');
		}
		label.push_str(&self.state);
		label
	}

	pub fn cell_text(&self, column: usize) -> String {
		match self.cells.get(column) {
			Some(targets) if !targets.is_empty() => targets.join(","),
			_ => EMPTY_CELL.to_owned(),
		}
	}
}

impl std::fmt::Display for TableView {
	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut grid: Vec<Vec<String>> = Vec::with_capacity(self.rows.len() + 1);
		grid.push(
			std::iter::once(String::new())
				.chain(self.symbols.iter().cloned())
				.collect::<Vec<_>>(),
		);
		for row in self.rows.iter() {
			grid.push(
				std::iter::once(row.label())
					.chain((0..self.symbols.len()).map(|column| row.cell_text(column)))
					.collect::<Vec<_>>(),
			);
		}

		let mut widths: Vec<usize> = vec![0; self.symbols.len() + 1];
		for line in grid.iter() {
			for (width, text) in widths.iter_mut().zip(line.iter()) {
				*width = (*width).max(text.chars().count());
			}
		}

		for (i, line) in grid.iter().enumerate() {
			if i > 0 {
				fmt.write_str("\n")?;
			}
			let mut rendered: String = String::new();
			for (column, (text, &width)) in line.iter().zip(widths.iter()).enumerate() {
				if column > 0 {
					rendered.push_str(" | ");
				}
				write!(rendered, "{text:<width$}")?;
			}
			fmt.write_str(rendered.trim_end())?;
		}
		Ok(())
	}
}

impl GraphView {
	pub fn of(automaton: &Automaton) -> Self {
		let nodes: Vec<GraphNode> = automaton
			.state_indices()
			.map(|state| GraphNode {
				id: state.index(),
				label: automaton.state_name(state).to_string(),
				initial: state == automaton.initial(),
				accepting: automaton.is_accepting(state),
			})
			.collect::<Vec<_>>();

		let mut merged: BTreeMap<(StateIdx, StateIdx), Vec<String>> = BTreeMap::new();
		for (from, symbol, targets) in automaton.transitions() {
			for &to in targets.iter() {
				merged
					.entry((from, to))
					.or_default()
					.push(automaton.symbol(symbol).to_owned());
			}
		}
		let edges: Vec<GraphEdge> = merged
			.into_iter()
			.map(|((from, to), symbols)| GraphEdge {
				from: from.index(),
				to: to.index(),
				symbols,
			})
			.collect::<Vec<_>>();

		Self { nodes, edges }
	}

	/// Accepting states are double circles; an invisible node points at the initial state.
	pub fn to_dot(&self) -> String {
		let mut dot: String = String::new();

		dot.push_str("digraph automaton {\n");
		dot.push_str("  rankdir=LR;\n");
		dot.push_str("  node [shape=circle];\n");
		dot.push_str("  start [style=invisible, height=0, width=0, fixedsize=true];\n");
		for node in self.nodes.iter() {
			let shape: &str = if node.accepting { ", shape=doublecircle" } else { "" };
			dot.push_str(&format!("  s{} [label=\"{}\"{shape}];\n", node.id, escape(&node.label)));
		}
		for node in self.nodes.iter().filter(|node| node.initial) {
			dot.push_str(&format!("  start -> s{};\n", node.id));
		}
		for edge in self.edges.iter() {
			dot.push_str(&format!(
				"  s{} -> s{} [label=\"{}\"];\n",
				edge.from,
				edge.to,
				escape(&edge.symbols.join(","))
			));
		}
		dot.push_str("}\n");
		dot
	}
}

/// Graphviz source for the transition graph of `automaton`.
pub fn to_dot(automaton: &Automaton) -> String {
	GraphView::of(automaton).to_dot()
}

fn escape(text: &str) -> String {
	let mut escaped: String = String::with_capacity(text.len());
	for ch in text.chars() {
		if ch == '"' || ch == '\\' {
			escaped.push('\\');
		}
		escaped.push(ch);
	}
	escaped
}

#[cfg(test)]
mod test {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::automaton::define;
	use crate::determinize::determinize;
	use crate::transition_table::RawTarget;
	use crate::transition_table::RawTransition;

	fn example() -> Automaton {
		define(
			&["q0", "q1"],
			&["a", "b"],
			"q0",
			&["q1"],
			&[
				RawTransition::new("q0", "a", RawTarget::from_cell("q0, q1")),
				RawTransition::new("q0", "b", RawTarget::from_cell("q1")),
			],
		)
		.unwrap()
	}

	#[test]
	fn table_rows() {
		let table: TableView = TableView::of(&example());
		assert_eq!(table.symbols, vec!["a", "b"]);
		assert_eq!(table.rows[0].label(), "→q0");
		assert_eq!(table.rows[1].label(), "*q1");
		assert_eq!(table.rows[0].cell_text(0), "q0,q1");
		assert_eq!(table.rows[1].cell_text(1), EMPTY_CELL);
	}

	#[test]
	fn table_text_is_aligned() {
		let table: TableView = TableView::of(&example());
		assert_eq!(
			table.to_string(),
			"    | a     | b\n\
			 →q0 | q0,q1 | q1\n\
			 *q1 | -     | -"
		);
	}

	#[test]
	fn subset_table_marks_sink() {
		let table: TableView = TableView::of(&determinize(&example()));
		let labels: Vec<String> = table.rows.iter().map(TableRow::label).collect::<Vec<_>>();
		assert_eq!(labels, vec!["→{q0}", "*{q0,q1}", "*{q1}", "∅"]);
	}

	#[test]
	fn parallel_edges_are_merged() {
		let graph: GraphView = GraphView::of(&example());
		assert_eq!(
			graph.edges,
			vec![
				GraphEdge {
					from: 0,
					to: 0,
					symbols: vec!["a".to_owned()],
				},
				GraphEdge {
					from: 0,
					to: 1,
					symbols: vec!["a".to_owned(), "b".to_owned()],
				},
			]
		);
	}

	#[test]
	fn dot_output() {
		let dot: String = to_dot(&example());
		assert!(dot.starts_with("digraph automaton {\n  rankdir=LR;\n"));
		assert!(dot.contains("  s1 [label=\"q1\", shape=doublecircle];\n"));
		assert!(dot.contains("  start -> s0;\n"));
		assert!(dot.contains("  s0 -> s1 [label=\"a,b\"];\n"));
		assert!(dot.ends_with("}\n"));
	}

	#[test]
	fn dot_labels_are_escaped() {
		assert_eq!(escape(r#"say "hi"\"#), r#"say \"hi\"\\"#);
	}
}
