//! Verification of parsing results against fixture tables.

pub mod protein_changes;
