//! Test-only crate. The scenarios live in `tests/`, sharing the harness in
//! `tests/helpers`.
