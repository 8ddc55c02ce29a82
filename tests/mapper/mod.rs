//! Integration tests for the value mapper
