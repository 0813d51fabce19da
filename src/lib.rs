// src/lib.rs
// =============================================================================
// Library root for url-checker.
//
// The binary (src/main.rs) is a thin shell around these modules:
// - checker: the concurrent check engine (the part that does the real work)
// - cli:     command-line flags
// - config:  config file loading and flag/env/file precedence
// - input:   reading the URL list
// - output:  text and JSON rendering
// =============================================================================

pub mod checker;
pub mod cli;
pub mod config;
pub mod input;
pub mod output;
