#[macro_use(debug)]
extern crate tracing;

pub mod analysis;
pub mod automaton;
pub mod catalog;
pub mod definition;
pub mod determinize;
pub mod error;
pub mod prune;
pub mod revision;
pub mod simulate;
pub mod transition_table;
pub mod view;

pub mod c_interface;
#[cfg(feature = "python")]
pub mod python_interface;

pub use analysis::classify;
pub use automaton::Automaton;
pub use automaton::define;
pub use definition::load;
pub use determinize::determinize;
pub use error::DefinitionError;
pub use error::SimulationError;
pub use prune::prune;
pub use revision::Revision;
pub use simulate::simulate;
pub use transition_table::RawTarget;
pub use transition_table::RawTransition;
