//! Terminal rendering of publish notices and prompts.

use std::io::{self, BufRead, IsTerminal, Write};

use lolpub_core::notify::{Interaction, Notice, PasteDetails};

/// [`Interaction`] backed by stdout, stderr and stdin.
///
/// Prompts fall back to the defaults when stdin is not a terminal.
#[derive(Debug, Default)]
pub struct TerminalInteraction;

impl Interaction for TerminalInteraction {
    fn notify(&self, notice: Notice) {
        let line = render_notice(&notice);
        match notice {
            Notice::Success(_) | Notice::Info(_) => println!("{line}"),
            Notice::Degraded { .. } | Notice::Failure { .. } => eprintln!("{line}"),
        }
    }

    fn progress(&self, done: usize, total: usize, label: &str) {
        eprintln!("{}", render_progress(done, total, label));
    }

    fn paste_details(&self, default_title: &str, default_listed: bool) -> Option<PasteDetails> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Some(PasteDetails {
                title: default_title.to_string(),
                listed: default_listed,
            });
        }

        let mut stderr = io::stderr();
        match prompt_paste_details(&mut stdin.lock(), &mut stderr, default_title, default_listed) {
            Ok(details) => details,
            Err(error) => {
                tracing::warn!("Paste prompt failed: {error}");
                None
            }
        }
    }
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(message) | Notice::Info(message) => message.clone(),
        Notice::Degraded { message, caveat } => format!("{message} (warning: {caveat})"),
        Notice::Failure {
            target,
            message,
            saved_to,
        } => saved_to.as_ref().map_or_else(
            || format!("{target} failed: {message}"),
            |path| format!("{target} failed: {message}. Saved to {}", path.display()),
        ),
    }
}

pub fn render_progress(done: usize, total: usize, label: &str) -> String {
    format!("[{done}/{total}] {label}")
}

/// Ask for title and visibility. Empty answers keep the defaults; end of
/// input or `q` cancels.
pub fn prompt_paste_details<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    default_title: &str,
    default_listed: bool,
) -> io::Result<Option<PasteDetails>> {
    write!(writer, "Paste title [{default_title}]: ")?;
    writer.flush()?;
    let Some(title) = read_answer(reader)? else {
        return Ok(None);
    };

    let choices = if default_listed { "Y/n" } else { "y/N" };
    write!(writer, "List publicly? [{choices}]: ")?;
    writer.flush()?;
    let Some(listed) = read_answer(reader)? else {
        return Ok(None);
    };

    let listed = match listed.to_ascii_lowercase().as_str() {
        "" => default_listed,
        "y" | "yes" => true,
        _ => false,
    };
    let title = if title.is_empty() {
        default_title.to_string()
    } else {
        title
    };
    Ok(Some(PasteDetails { title, listed }))
}

fn read_answer<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let answer = line.trim();
    if answer.eq_ignore_ascii_case("q") {
        return Ok(None);
    }
    Ok(Some(answer.to_string()))
}
