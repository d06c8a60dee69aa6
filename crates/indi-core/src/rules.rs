//! Switch selection rules
//!
//! Computes the switch states that result from setting one switch of a
//! vector, honoring the vector's rule. The functions here never mutate; the
//! caller applies the returned states through the codec so that the store and
//! the outbound message always agree.

use crate::value::Switch;
use crate::vector::{SwitchRule, SwitchVector};

/// States after setting `value_name` to `new_value`
///
/// The named switch takes `new_value`. Under `OneOfMany` every sibling takes
/// `!new_value`, so turning one switch off turns all of its siblings on. Other
/// rules leave siblings untouched.
pub fn states_for_switch(vector: &SwitchVector, value_name: &str, new_value: bool) -> Vec<bool> {
    let exclusive = vector.rule == Some(SwitchRule::OneOfMany);
    vector
        .values
        .iter()
        .map(|s| {
            if s.name == value_name {
                new_value
            } else if exclusive {
                !new_value
            } else {
                s.value
            }
        })
        .collect()
}

/// States with only `index` on, regardless of rule
pub fn states_for_index(len: usize, index: usize) -> Vec<bool> {
    (0..len).map(|i| i == index).collect()
}

/// Whether a set of states satisfies a rule
///
/// Vectors without a rule are unconstrained.
pub fn satisfies(rule: Option<SwitchRule>, states: &[bool]) -> bool {
    let on = states.iter().filter(|s| **s).count();
    match rule {
        Some(SwitchRule::OneOfMany) => on == 1,
        Some(SwitchRule::AtMostOne) => on <= 1,
        Some(SwitchRule::AnyOfMany) | None => true,
    }
}

/// Copy states into the switches of a vector, in order
pub(crate) fn apply_states(values: &mut [Switch], states: &[bool]) {
    for (switch, state) in values.iter_mut().zip(states) {
        switch.value = *state;
    }
}
