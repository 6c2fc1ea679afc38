//! Library wrapper around the `crane` CLI implementation.
//!
//! Compiling the binary crate root as a module lets `cargo test -p crane-cli --lib` typecheck
//! (and unit test) the CLI without building the integration test binaries.
//!
//! Note: `fn main()` inside `main.rs` is just another function when compiled as a module.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;
