//! Parsing of `<prefix>queue <subcommand> [args]` messages.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::{QueueError, TimeUnit};

/// Parsed queue subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCommand {
    Start,
    Join,
    Leave,
    /// Admin: add the given user ID
    Add(String),
    /// Admin: remove the given user ID
    Remove(String),
    Time(TimeUnit),
    Up,
    Down,
    Help,
    /// `queue` with nothing after it
    Missing,
    Unknown(String),
}

fn non_digits() -> &'static Regex {
    static NON_DIGITS: OnceLock<Regex> = OnceLock::new();
    NON_DIGITS.get_or_init(|| Regex::new(r"\D").expect("static regex"))
}

/// Turn a mention like `<@!1234>` into a raw ID. Other arguments pass through.
pub fn normalize_user_arg(arg: &str) -> String {
    if arg.starts_with('<') {
        non_digits().replace_all(arg, "").into_owned()
    } else {
        arg.to_string()
    }
}

/// Parse a chat message.
///
/// Returns `None` for messages that are not queue commands (wrong prefix or a
/// different command word). A `@name` suffix on the command word must match
/// `bot_username`, ignoring case; commands addressed to other bots are `None`.
pub fn parse(
    text: &str,
    prefix: &str,
    bot_username: Option<&str>,
) -> Option<Result<QueueCommand, QueueError>> {
    let rest = text.trim_start().strip_prefix(prefix)?;
    let mut words = rest.split_whitespace();

    let word = words.next()?;
    let (command, addressee) = match word.split_once('@') {
        Some((command, addressee)) => (command, Some(addressee)),
        None => (word, None),
    };
    if !command.eq_ignore_ascii_case("queue") {
        return None;
    }
    if let Some(addressee) = addressee {
        if !bot_username.is_some_and(|me| me.eq_ignore_ascii_case(addressee)) {
            return None;
        }
    }

    let Some(sub) = words.next() else {
        return Some(Ok(QueueCommand::Missing));
    };
    let args: Vec<&str> = words.collect();
    let sub = sub.to_lowercase();

    let parsed = match sub.as_str() {
        "start" => Ok(QueueCommand::Start),
        "join" => Ok(QueueCommand::Join),
        "leave" => Ok(QueueCommand::Leave),
        "add" | "remove" => match args.as_slice() {
            [target] => {
                let id = normalize_user_arg(target);
                if sub == "add" {
                    Ok(QueueCommand::Add(id))
                } else {
                    Ok(QueueCommand::Remove(id))
                }
            }
            _ => Err(QueueError::malformed(format!(
                "{}queue {} <user-mention-or-id>",
                prefix, sub
            ))),
        },
        "time" => match args.as_slice() {
            [] => Ok(QueueCommand::Time(TimeUnit::default())),
            [unit] => TimeUnit::parse(unit)
                .map(QueueCommand::Time)
                .ok_or_else(|| QueueError::malformed(format!("{}queue time [m|h|d]", prefix))),
            _ => Err(QueueError::malformed(format!("{}queue time [m|h|d]", prefix))),
        },
        "up" => Ok(QueueCommand::Up),
        "down" => Ok(QueueCommand::Down),
        "help" | "commands" => Ok(QueueCommand::Help),
        _ => Ok(QueueCommand::Unknown(sub)),
    };
    Some(parsed)
}
