//! Course catalog records, request shapes and the remote error taxonomy
//! shared by the client core and its front ends.

pub mod domain;
pub mod error;
pub mod protocol;
