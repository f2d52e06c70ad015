//! Example front ends built on the library surface, used by the documentation
//! and the test suites.

pub mod calc;

#[cfg(test)]
mod __tests__;
