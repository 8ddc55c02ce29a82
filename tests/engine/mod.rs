//! Integration tests for the dependency engine
