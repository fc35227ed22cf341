pub mod attributes;
pub mod bytecode;
pub mod classfile;
pub mod constants;
pub mod flags;
pub mod parser;
pub mod pool;
pub mod result;
