//! End-to-end tests exercising schema, store, engine and bindings together

mod panel_tests;
