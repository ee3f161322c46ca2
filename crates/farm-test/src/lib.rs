//! Integration tests for `farm-lib` against an in-memory chain. See `tests/`.
