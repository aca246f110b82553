//! Opcode handler modules for the VM interpreter
//!
//! Each module implements a category of opcode handlers as methods on `Interpreter`.

pub mod caches;
pub mod constants;
pub mod hashes;
pub mod objects;
pub mod stack;
