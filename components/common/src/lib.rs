extern crate tracing as log;

pub mod logging;
