// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::error::ParseError;

use chrono::{NaiveDate, NaiveTime};
use common::{Priority, Status};
use tracing::debug;

/// A recognized voice command with the fields pulled out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddTask {
        description: String,
        due_date: NaiveDate,
        priority: Priority,
    },
    UpdateTask {
        id: i64,
        status: Status,
    },
    DeleteTask {
        id: i64,
    },
    SearchTask {
        keyword: String,
    },
    ViewTasks,
    SetReminder {
        text: String,
        time: NaiveTime,
    },
    /// Nothing usable was heard. The clarification is spoken back as is.
    Unrecognized {
        clarification: &'static str,
    },
}

pub const NOT_UNDERSTOOD: &str = "Sorry, I did not understand that command.";
const ADD_HINT: &str =
    "Please specify the task, due date in YYYY-MM-DD format, and priority (low, medium, high).";
const UPDATE_HINT: &str = "Please specify the task ID and status to update.";
const DELETE_HINT: &str = "Please specify the task ID to delete.";
const SEARCH_HINT: &str = "Please specify a keyword to search for tasks.";
const REMINDER_HINT: &str =
    "Please specify the reminder text and time in the format 'reminder for <text> at HH:MM'.";
const TIME_HINT: &str = "Invalid time format. Please use HH:MM.";

/// One command template: when `triggers` holds, `extract` owns the transcript
/// and no later rule is tried.
struct Rule {
    name: &'static str,
    triggers: fn(&str) -> bool,
    extract: fn(&str) -> Result<Intent, ParseError>,
}

// Order matters: a transcript such as "add task: remove the old task ..."
// trips several triggers and the first one wins.
const RULES: &[Rule] = &[
    Rule {
        name: "add",
        triggers: wants_add,
        extract: extract_add,
    },
    Rule {
        name: "update",
        triggers: wants_update,
        extract: extract_update,
    },
    Rule {
        name: "delete",
        triggers: wants_delete,
        extract: extract_delete,
    },
    Rule {
        name: "search",
        triggers: wants_search,
        extract: extract_search,
    },
    Rule {
        name: "view",
        triggers: wants_view,
        extract: extract_view,
    },
    Rule {
        name: "reminder",
        triggers: wants_reminder,
        extract: extract_reminder,
    },
];

/// Maps a transcript to an intent. Never fails: template mismatches become
/// `Intent::Unrecognized` carrying the matching clarification.
pub fn interpret(transcript: &str) -> Intent {
    parse(transcript).unwrap_or_else(|err| Intent::Unrecognized {
        clarification: err.clarification(),
    })
}

/// Like `interpret`, but reports template mismatches as `ParseError`.
pub fn parse(transcript: &str) -> Result<Intent, ParseError> {
    let text = transcript.trim().to_lowercase();
    match rule_for(&text) {
        Some(rule) => {
            debug!("Command matched the '{}' rule.", rule.name);
            (rule.extract)(&text)
        }
        None => Err(ParseError::new(NOT_UNDERSTOOD)),
    }
}

/// Name of the rule that would handle `transcript`, if any.
pub fn matching_rule(transcript: &str) -> Option<&'static str> {
    rule_for(&transcript.trim().to_lowercase()).map(|rule| rule.name)
}

fn rule_for(text: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.triggers)(text))
}

fn wants_add(text: &str) -> bool {
    words_in_order(text, &["add", "create"], &["task", "to-do"])
}

fn wants_update(text: &str) -> bool {
    words_in_order(text, &["update", "mark"], &["task"])
}

fn wants_delete(text: &str) -> bool {
    words_in_order(text, &["delete", "remove"], &["task"])
}

fn wants_search(text: &str) -> bool {
    words_in_order(text, &["search"], &["task"])
}

fn wants_view(text: &str) -> bool {
    words_in_order(text, &["view"], &["tasks"])
}

fn wants_reminder(text: &str) -> bool {
    word_at(text, "reminder", 0).is_some()
}

/// `task: <description> due by <YYYY-MM-DD> priority <low|medium|high>`
fn extract_add(text: &str) -> Result<Intent, ParseError> {
    let hint = ParseError::new(ADD_HINT);

    for rest in marker_tails(text) {
        let toks = tokens(rest);
        // The description is greedy, so the last complete tail wins.
        for i in (0..toks.len()).rev() {
            let Some(window) = toks.get(i..i + 5) else {
                continue;
            };
            let (due_at, _) = window[0];
            if due_at == 0
                || window[0].1 != "due"
                || window[1].1 != "by"
                || !is_date_shape(window[2].1)
                || window[3].1 != "priority"
            {
                continue;
            }
            let Some(priority) = leading_priority(window[4].1) else {
                continue;
            };

            let description = rest[..due_at].trim();
            if description.is_empty() {
                return Err(hint);
            }
            let due_date =
                NaiveDate::parse_from_str(window[2].1, "%Y-%m-%d").map_err(|_| hint.clone())?;

            return Ok(Intent::AddTask {
                description: description.to_string(),
                due_date,
                priority,
            });
        }
    }

    Err(hint)
}

/// `task <id> <completed|pending>`
fn extract_update(text: &str) -> Result<Intent, ParseError> {
    let toks = tokens(text);
    toks.windows(3)
        .find_map(|w| {
            if !ends_with_word(w[0].1, "task") || !is_digits(w[1].1) {
                return None;
            }
            let status = if w[2].1.starts_with("completed") {
                Status::Completed
            } else if w[2].1.starts_with("pending") {
                Status::Pending
            } else {
                return None;
            };
            Some((w[1].1, status))
        })
        .and_then(|(id, status)| id.parse().ok().map(|id| Intent::UpdateTask { id, status }))
        .ok_or(ParseError::new(UPDATE_HINT))
}

/// `task <id>`
fn extract_delete(text: &str) -> Result<Intent, ParseError> {
    let toks = tokens(text);
    toks.windows(2)
        .find_map(|w| {
            if !ends_with_word(w[0].1, "task") {
                return None;
            }
            let digits = leading_digits(w[1].1);
            (!digits.is_empty()).then_some(digits)
        })
        .and_then(|id| id.parse().ok().map(|id| Intent::DeleteTask { id }))
        .ok_or(ParseError::new(DELETE_HINT))
}

fn extract_view(_text: &str) -> Result<Intent, ParseError> {
    Ok(Intent::ViewTasks)
}

/// `task: <keyword>`, the keyword being everything after the marker.
fn extract_search(text: &str) -> Result<Intent, ParseError> {
    marker_tails(text)
        .into_iter()
        .next()
        .map(|rest| Intent::SearchTask {
            keyword: rest.trim_end().to_string(),
        })
        .ok_or(ParseError::new(SEARCH_HINT))
}

/// `reminder for <text> at HH:MM`
fn extract_reminder(text: &str) -> Result<Intent, ParseError> {
    let toks = tokens(text);

    for r in 0..toks.len() {
        if !ends_with_word(toks[r].1, "reminder") || toks.get(r + 1).map(|t| t.1) != Some("for") {
            continue;
        }
        let body_start = toks[r + 1].0 + "for".len();

        // Greedy text: take the last `at HH:MM` pair after the opening words.
        let clock = (r + 3..toks.len().saturating_sub(1))
            .rev()
            .find(|&j| toks[j].1 == "at" && clock_prefix(toks[j + 1].1).is_some());
        let Some(j) = clock else {
            continue;
        };

        let body = text[body_start..toks[j].0].trim();
        let raw_time = clock_prefix(toks[j + 1].1).unwrap_or_default();
        if body.is_empty() {
            break;
        }
        let time = NaiveTime::parse_from_str(raw_time, "%H:%M")
            .map_err(|_| ParseError::new(TIME_HINT))?;

        return Ok(Intent::SetReminder {
            text: body.to_string(),
            time,
        });
    }

    Err(ParseError::new(REMINDER_HINT))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte range of the first whole-word `word` starting at or after `from`.
fn word_at(text: &str, word: &str, from: usize) -> Option<(usize, usize)> {
    text.get(from..)?
        .match_indices(word)
        .map(|(offset, _)| (from + offset, from + offset + word.len()))
        .find(|&(start, end)| {
            let before = text[..start].chars().next_back();
            let after = text[end..].chars().next();
            before.is_none_or(|c| !is_word_char(c)) && after.is_none_or(|c| !is_word_char(c))
        })
}

/// True when one of `firsts` appears as a word and one of `seconds` appears
/// as a word somewhere after it.
fn words_in_order(text: &str, firsts: &[&str], seconds: &[&str]) -> bool {
    let earliest_end = firsts
        .iter()
        .filter_map(|word| word_at(text, word, 0))
        .map(|(_, end)| end)
        .min();

    earliest_end.is_some_and(|end| seconds.iter().any(|word| word_at(text, word, end).is_some()))
}

/// Everything after each `task: ` or `to-do: ` marker, leftmost first.
fn marker_tails(text: &str) -> Vec<&str> {
    let mut tails: Vec<(usize, &str)> = Vec::new();
    for marker in ["task", "to-do"] {
        let mut from = 0;
        while let Some((start, end)) = word_at(text, marker, from) {
            if let Some(rest) = text[end..].strip_prefix(": ") {
                tails.push((start, rest));
            }
            from = end;
        }
    }
    tails.sort_by_key(|(start, _)| *start);
    tails.into_iter().map(|(_, rest)| rest).collect()
}

/// Whitespace separated tokens with their byte offsets.
fn tokens(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                out.push((s, &text[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }
    out
}

fn ends_with_word(token: &str, word: &str) -> bool {
    token
        .strip_suffix(word)
        .is_some_and(|head| head.chars().next_back().is_none_or(|c| !is_word_char(c)))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn leading_digits(s: &str) -> &str {
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    &s[..end]
}

fn is_date_shape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

fn leading_priority(s: &str) -> Option<Priority> {
    ["low", "medium", "high"]
        .into_iter()
        .find(|level| s.starts_with(level))
        .and_then(|level| level.parse().ok())
}

/// The `DD:DD` head of a token, without checking the ranges.
fn clock_prefix(s: &str) -> Option<&str> {
    let head = s.get(..5)?;
    let b = head.as_bytes();
    (b[0].is_ascii_digit()
        && b[1].is_ascii_digit()
        && b[2] == b':'
        && b[3].is_ascii_digit()
        && b[4].is_ascii_digit())
    .then_some(head)
}
