//! Property-based tests for beanctx

mod key_normalization;
