//! Integration tests for the binding controller

// Transactional update protocol and rollback
mod transaction_tests;

// Presence toggling on parameters allowing an absent value
mod presence_tests;
