// Combinatorial search: roster selection and exclusive-resource assignment.

pub mod assign;
pub mod roster;
