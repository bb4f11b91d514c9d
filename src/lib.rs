//! Workspace tooling package. Holds the pre-commit hook configuration only;
//! the routing library and CLI live under `crates/`.
