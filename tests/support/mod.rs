// Each test binary drives a different subset of the harness.
#[allow(dead_code)]
pub mod pipeline;
