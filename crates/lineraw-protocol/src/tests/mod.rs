//! Behavioural test suites for the line/raw protocol crate.

mod support;
