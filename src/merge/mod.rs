//! Output document assembly.

pub mod assembler;

pub use assembler::DocumentAssembler;
