use std::fmt::Display;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crossterm::tty::IsTty;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};

use super::TERMINAL_STDERR;

/// Disables interactive prompts if set to `1`
const SPELLBOOK_NO_PROMPT_VAR: &str = "_SPELLBOOK_NO_PROMPT";

#[derive(Clone)]
pub struct Select<T> {
    pub options: Vec<T>,
}

#[derive(Debug, Clone, Default)]
pub struct Text {
    pub initial: String,
}

/// A value parsed from free text, re-asked until it parses
#[derive(Debug, Clone, Default)]
pub struct Input<T> {
    pub default: Option<T>,
}

pub struct Spinner<F>(F);
impl<F: FnOnce() -> T + Send, T: Send> Spinner<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[derive(Debug, Clone)]
pub struct Dialog<'a, Type> {
    pub message: &'a str,
    pub help_message: Option<&'a str>,
    pub typed: Type,
}

struct Choice(usize, String);
impl Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.1.fmt(f)
    }
}

impl<T: Display> Dialog<'_, Select<T>> {
    /// Let the user pick one of the options.
    ///
    /// Pressing escape yields [inquire::InquireError::OperationCanceled].
    pub fn prompt(self) -> inquire::error::InquireResult<T> {
        let mut options = self.typed.options;

        let choices = options
            .iter()
            .map(ToString::to_string)
            .enumerate()
            .map(|(id, value)| Choice(id, value))
            .collect();

        let Choice(id, _) = {
            let _stderr_lock = TERMINAL_STDERR.lock();

            let mut dialog =
                inquire::Select::new(self.message, choices).with_render_config(spellbook_theme());

            if let Some(help_message) = self.help_message {
                dialog = dialog.with_help_message(help_message);
            }

            dialog.prompt()?
        };

        Ok(options.remove(id))
    }
}

impl Dialog<'_, Text> {
    pub fn prompt(self) -> inquire::error::InquireResult<String> {
        let _stderr_lock = TERMINAL_STDERR.lock();

        let mut dialog = inquire::Text::new(self.message)
            .with_initial_value(&self.typed.initial)
            .with_render_config(spellbook_theme());

        if let Some(help_message) = self.help_message {
            dialog = dialog.with_help_message(help_message);
        }

        dialog.prompt()
    }
}

impl<T> Dialog<'_, Input<T>>
where
    T: FromStr + Display + Clone,
{
    pub fn prompt(self) -> inquire::error::InquireResult<T> {
        let _stderr_lock = TERMINAL_STDERR.lock();

        let mut dialog = inquire::CustomType::<T>::new(self.message)
            .with_error_message("Please enter a valid value")
            .with_render_config(spellbook_theme());

        if let Some(default) = self.typed.default {
            dialog = dialog.with_default(default);
        }

        if let Some(help_message) = self.help_message {
            dialog = dialog.with_help_message(help_message);
        }

        dialog.prompt()
    }
}

impl<F: FnOnce() -> T + Send, T: Send> Dialog<'_, Spinner<F>> {
    /// Run the spinner's task, showing a spinner if it takes longer than
    /// `start_spinning_after`.
    pub fn spin_with_delay(self, start_spinning_after: Duration) -> T {
        let handle = tokio::runtime::Handle::current();
        std::thread::scope(|s| {
            let task = s.spawn(move || {
                // the task may need tokio
                let _guard = handle.enter();
                (self.typed.0)()
            });
            let mut dialog: Option<ProgressBar> = None;
            let started = Instant::now();
            loop {
                if task.is_finished() {
                    break;
                }

                if Instant::now() - started < start_spinning_after {
                    std::thread::sleep(Duration::from_millis(100));
                    continue;
                }

                let spinner = indicatif::ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::with_template("{spinner} {wide_msg} {prefix:>}")
                {
                    spinner.set_style(style);
                }
                spinner.set_message(self.message.to_string());
                if let Some(help_message) = self.help_message {
                    spinner.set_prefix(help_message.to_string())
                }
                spinner.enable_steady_tick(Duration::from_millis(100));
                dialog = Some(spinner);

                break;
            }

            let res = match task.join() {
                Ok(res) => res,
                Err(panic) => std::panic::resume_unwind(panic),
            };

            if let Some(dialog) = dialog {
                dialog.finish_and_clear();
            }

            res
        })
    }
}

impl Dialog<'_, ()> {
    /// True if stderr, stdin and stdout are ttys
    pub fn can_prompt() -> bool {
        if std::env::var(SPELLBOOK_NO_PROMPT_VAR).is_ok_and(|v| v == "1") {
            return false;
        }
        std::io::stderr().is_tty() && std::io::stdin().is_tty() && std::io::stdout().is_tty()
    }
}

pub fn spellbook_theme() -> RenderConfig<'static> {
    let mut render_config = RenderConfig::default_colored();

    let accent = Color::DarkMagenta;
    let muted = Color::LightBlue;

    render_config.answered_prompt_prefix = Styled::new(">").with_fg(accent);
    render_config.highlighted_option_prefix = Styled::new(">").with_fg(accent);
    render_config.prompt_prefix = Styled::new("?").with_fg(accent);
    render_config.prompt = StyleSheet::new().with_attr(Attributes::BOLD);
    render_config.help_message = Styled::new("").with_fg(muted).style;
    render_config.answer = Styled::new("").with_fg(accent).style;

    render_config
}
