//! Integration tests for beanctx

mod config_integration;
mod session_store;
mod synchronization_order;
