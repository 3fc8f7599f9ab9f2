//! Behavioural test suites for the broker daemon.

mod support;
