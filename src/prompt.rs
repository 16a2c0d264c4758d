//! Prompts displayed to the user during a study session.

use anyhow::Result;
use anyhow::bail;
use std::io::{Write, stdin, stdout};
use termion::event::{Event, Key};
use termion::input::TermRead;
use termion::raw::IntoRawMode;
use vocab_srs::Difficulty;

/// Displays the given prompt and waits for a yes / no answer. Yes maps to true, and no maps to
/// false.
pub fn binary(prompt: impl AsRef<str>) -> Result<bool> {
    read_key(
        &format!("{} [y/n]", prompt.as_ref()),
        true,
        |key| match key {
            Key::Char('y') => Some(true),
            Key::Char('n') => Some(false),
            _ => None,
        },
        |&answer| if answer { "yes" } else { "no" },
    )
}

/// Displays the given prompt and waits until a key is pressed. Only Ctrl-C aborts, so q and
/// escape continue like any other key.
pub fn any(prompt: impl AsRef<str>) -> Result<()> {
    read_key(prompt.as_ref(), false, |_| Some(()), |_| "")
}

/// Asks how hard the item felt. Enter skips the question.
pub fn difficulty() -> Result<Option<Difficulty>> {
    read_key(
        "How hard was it? [e]asy [m]edium [h]ard, enter to skip",
        true,
        |key| match key {
            Key::Char('e') => Some(Some(Difficulty::Easy)),
            Key::Char('m') => Some(Some(Difficulty::Medium)),
            Key::Char('h') => Some(Some(Difficulty::Hard)),
            Key::Char('\n') => Some(None),
            _ => None,
        },
        |difficulty| match difficulty {
            Some(Difficulty::Easy) => "easy",
            Some(Difficulty::Medium) => "medium",
            Some(Difficulty::Hard) => "hard",
            None => "skipped",
        },
    )
}

/// Whether `key` ends the session. Ctrl-C always does, q and escape only with `quit_keys`.
fn aborts(key: &Key, quit_keys: bool) -> bool {
    match key {
        Key::Ctrl('c') => true,
        Key::Char('q') | Key::Esc => quit_keys,
        _ => false,
    }
}

/// Reads keys in raw mode until `select` accepts one, or until [`aborts`] says to stop.
fn read_key<T>(
    prompt: &str,
    quit_keys: bool,
    select: impl Fn(Key) -> Option<T>,
    echo: impl Fn(&T) -> &'static str,
) -> Result<T> {
    let mut stdout = stdout().into_raw_mode()?;
    write!(stdout, "{prompt} ")?;
    stdout.flush()?;

    for event in stdin().events() {
        let key = match event? {
            Event::Key(key) => key,
            _ => continue,
        };

        if aborts(&key, quit_keys) {
            write!(stdout, "\r\n")?;
            stdout.flush()?;

            bail!("Exiting instead of answering...")
        }

        if let Some(selection) = select(key) {
            write!(stdout, "{}\r\n", echo(&selection))?;
            stdout.flush()?;

            return Ok(selection);
        }
    }

    bail!("Input closed before an answer was given")
}
