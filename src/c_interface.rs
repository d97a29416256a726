use std::ffi::c_char;
use std::ffi::c_int;
use std::marker::PhantomData;
use std::str::Utf8Error;

use crate::analysis::is_deterministic;
use crate::automaton::Automaton;
use crate::definition::load;
use crate::determinize::determinize;
use crate::prune::prune;
use crate::simulate::accepts;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CSlice<'lifetime, T> {
	pointer: *const T,
	length: usize,
	_lifetime: PhantomData<&'lifetime [T]>,
}

pub type CStringView<'lifetime> = CSlice<'lifetime, c_char>;

pub const FAW_ACCEPTED: c_int = 1;
pub const FAW_REJECTED: c_int = 0;
pub const FAW_UNKNOWN_SYMBOL: c_int = -1;
pub const FAW_INVALID_UTF8: c_int = -2;

/// Returns null if `text` is not UTF-8 or not a valid definition.
#[unsafe(no_mangle)]
unsafe extern "C" fn fa_workbench_automaton_parse(text: CStringView<'_>) -> Option<Box<Automaton>> {
	let text: &str = match text.as_utf8() {
		Ok(text) => text,
		Err(err) => {
			debug!("rejecting definition text: {err}");
			return None;
		},
	};
	match load(text) {
		Ok(automaton) => Some(Box::new(automaton)),
		Err(err) => {
			debug!("rejecting definition text: {err}");
			None
		},
	}
}

#[unsafe(no_mangle)]
unsafe extern "C" fn fa_workbench_automaton_delete(automaton: Option<Box<Automaton>>) {
	std::mem::drop(automaton);
}

#[unsafe(no_mangle)]
unsafe extern "C" fn fa_workbench_automaton_is_deterministic(automaton: &Automaton) -> bool {
	is_deterministic(automaton)
}

/// The result is a new automaton owned by the caller.
#[unsafe(no_mangle)]
unsafe extern "C" fn fa_workbench_automaton_determinize(automaton: &Automaton) -> Box<Automaton> {
	Box::new(determinize(automaton))
}

/// The result is a new automaton owned by the caller.
#[unsafe(no_mangle)]
unsafe extern "C" fn fa_workbench_automaton_prune(automaton: &Automaton) -> Box<Automaton> {
	Box::new(prune(automaton))
}

/// One of [`FAW_ACCEPTED`], [`FAW_REJECTED`], [`FAW_UNKNOWN_SYMBOL`] or [`FAW_INVALID_UTF8`].
#[unsafe(no_mangle)]
unsafe extern "C" fn fa_workbench_automaton_accepts(automaton: &Automaton, input: CStringView<'_>) -> c_int {
	let Ok(input): Result<&str, Utf8Error> = input.as_utf8() else {
		return FAW_INVALID_UTF8;
	};
	match accepts(automaton, input) {
		Ok(true) => FAW_ACCEPTED,
		Ok(false) => FAW_REJECTED,
		Err(_) => FAW_UNKNOWN_SYMBOL,
	}
}

#[unsafe(no_mangle)]
unsafe extern "C" fn fa_workbench_automaton_state_count(automaton: &Automaton) -> usize {
	automaton.state_count()
}

impl<'lifetime> CStringView<'lifetime> {
	pub fn from_utf8(utf8: &'lifetime str) -> Self {
		Self {
			pointer: utf8.as_bytes().as_ptr().cast::<c_char>(),
			length: utf8.as_bytes().len(),
			_lifetime: PhantomData,
		}
	}

	pub fn from_bytes(bytes: &'lifetime [u8]) -> Self {
		Self {
			pointer: bytes.as_ptr().cast::<c_char>(),
			length: bytes.len(),
			_lifetime: PhantomData,
		}
	}

	pub fn as_utf8(&self) -> Result<&'lifetime str, Utf8Error> {
		let bytes: &[u8] = unsafe { std::slice::from_raw_parts(self.pointer.cast::<u8>(), self.length) };
		str::from_utf8(bytes)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	const DEFINITION: &str = "\
states: q0, q1
alphabet: a, b
initial: q0
accepting: q1
q0, a -> q0, q1
q0, b -> -
";

	#[test]
	fn basic() {
		unsafe {
			let nfa: Box<Automaton> = fa_workbench_automaton_parse(CStringView::from_utf8(DEFINITION)).unwrap();
			assert!(!fa_workbench_automaton_is_deterministic(&nfa));

			let dfa: Box<Automaton> = fa_workbench_automaton_determinize(&nfa);
			assert!(fa_workbench_automaton_is_deterministic(&dfa));
			assert_eq!(fa_workbench_automaton_state_count(&dfa), 3);

			let pruned: Box<Automaton> = fa_workbench_automaton_prune(&dfa);
			assert_eq!(fa_workbench_automaton_state_count(&pruned), 2);

			assert_eq!(
				fa_workbench_automaton_accepts(&pruned, CStringView::from_utf8("aa")),
				FAW_ACCEPTED
			);
			assert_eq!(
				fa_workbench_automaton_accepts(&pruned, CStringView::from_utf8("ab")),
				FAW_REJECTED
			);
			assert_eq!(
				fa_workbench_automaton_accepts(&pruned, CStringView::from_utf8("ac")),
				FAW_UNKNOWN_SYMBOL
			);
			assert_eq!(
				fa_workbench_automaton_accepts(&pruned, CStringView::from_bytes(&[0xff])),
				FAW_INVALID_UTF8
			);

			fa_workbench_automaton_delete(Some(pruned));
			fa_workbench_automaton_delete(Some(dfa));
			fa_workbench_automaton_delete(Some(nfa));
		}
	}

	#[test]
	fn invalid_definitions_are_null() {
		unsafe {
			assert!(fa_workbench_automaton_parse(CStringView::from_utf8("states: q0\n")).is_none());
			assert!(fa_workbench_automaton_parse(CStringView::from_bytes(b"\xc3\x28")).is_none());
		}
	}
}
