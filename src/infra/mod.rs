//! Hardware-facing building blocks: the PECI controller register model.
pub mod registers;
