use std::io::Stderr;
use std::sync::{LazyLock, Mutex};

pub mod dialog;
pub mod display;
pub mod errors;
pub mod init;
pub mod message;

/// Shared handle on stderr.
///
/// Logging and interactive prompts lock it, so log lines never tear a prompt.
pub static TERMINAL_STDERR: LazyLock<Mutex<Stderr>> =
    LazyLock::new(|| Mutex::new(std::io::stderr()));
