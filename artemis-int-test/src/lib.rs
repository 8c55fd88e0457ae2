//! End-to-end tests for artemis repositories.
//!
//! [test_util] holds the shared entities, repositories and store doubles;
//! the tests themselves live under `tests/`.

pub mod test_util;
