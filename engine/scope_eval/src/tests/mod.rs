//! Test modules relocated from implementation files.
//!
//! The evaluator suites need a working expression host; `toy_host`
//! provides a deliberately tiny one so these tests exercise the host
//! seam without smuggling a parser into the crate.

mod scenario_tests;
mod toy_host;
