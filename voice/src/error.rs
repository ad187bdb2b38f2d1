// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use thiserror::Error;

/// Every failure an assistant operation can report. None of them is fatal to
/// the loop: each one is turned into a spoken reply at the boundary that
/// produced it.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Task ID {0} not found.")]
    TaskNotFound(i64),

    #[error("speech recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("speech output failed: {0}")]
    SpeechOutput(String),

    #[error("could not parse command: {0}")]
    Parse(#[from] ParseError),

    #[error("could not write reminder note: {0}")]
    NoteLog(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// Audio was captured but nothing intelligible came out of it.
    #[error("speech was not understood")]
    Unintelligible,

    /// The recognizer itself could not be reached or crashed.
    #[error("speech service unavailable: {0}")]
    Service(String),
}

impl RecognitionError {
    /// What the user hears when capture fails.
    pub fn reply(&self) -> &'static str {
        match self {
            Self::Unintelligible => "Sorry, I did not understand that.",
            Self::Service(_) => "Sorry, there is an issue with the speech service.",
        }
    }
}

/// A command matched a rule but its sub-fields did not fit the template.
/// The message is the clarification spoken back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{clarification}")]
pub struct ParseError {
    clarification: &'static str,
}

impl ParseError {
    pub const fn new(clarification: &'static str) -> Self {
        Self { clarification }
    }

    pub fn clarification(&self) -> &'static str {
        self.clarification
    }
}

pub type Result<T, E = AssistantError> = std::result::Result<T, E>;
