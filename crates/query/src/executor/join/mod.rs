//! JOIN algorithm implementations.

mod nested;

pub use nested::NestedLoopJoin;
