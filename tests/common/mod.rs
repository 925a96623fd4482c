#![allow(unused_imports)]
pub use extparse_test_utils::{count_entries, init_tracing, with_timeout};
