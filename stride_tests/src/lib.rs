//! Integration tests for the stride crates live in `tests/`.
