// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::process::Stdio;

use crate::error::{AssistantError, RecognitionError, Result};

use tokio::io::{
    self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin,
    Stdout,
};
use tokio::process::Command;
use tracing::{debug, info};

/// Speech-to-text capability.
#[allow(async_fn_in_trait)]
pub trait SpeechInput {
    /// Waits for the next utterance and returns it trimmed and lowercased.
    /// `Ok(None)` means nothing was said; recognizer failures are
    /// `AssistantError::Recognition`.
    async fn listen(&mut self) -> Result<Option<String>>;
}

/// Text-to-speech capability. Failures are `AssistantError::SpeechOutput`.
#[allow(async_fn_in_trait)]
pub trait SpeechOutput {
    async fn speak(&mut self, text: &str) -> Result<()>;
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Splits a configured command line such as `espeak -s 150` into program and
/// arguments. Returns `None` for a blank line.
fn split_command_line(line: &str) -> Option<(String, Vec<String>)> {
    let mut words = line.split_whitespace().map(str::to_string);
    let program = words.next()?;
    Some((program, words.collect()))
}

/// Reads typed transcripts, one per line. Stands in for a microphone.
pub struct ConsoleInput<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> ConsoleInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl ConsoleInput<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> SpeechInput for ConsoleInput<R> {
    async fn listen(&mut self) -> Result<Option<String>> {
        info!("Listening...");
        let line = self
            .lines
            .next_line()
            .await
            .map_err(|e| RecognitionError::Service(e.to_string()))?;

        match line {
            Some(line) => Ok(normalize(&line)),
            None => {
                debug!("Transcript stream is closed.");
                Ok(None)
            }
        }
    }
}

/// Runs an external recognizer once per listen and takes its standard
/// output as the transcript.
#[derive(Debug, Clone)]
pub struct CommandInput {
    program: String,
    args: Vec<String>,
}

impl CommandInput {
    pub fn from_command_line(line: &str) -> Option<Self> {
        split_command_line(line).map(|(program, args)| Self { program, args })
    }
}

impl SpeechInput for CommandInput {
    async fn listen(&mut self) -> Result<Option<String>> {
        info!("Listening...");
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| RecognitionError::Service(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(RecognitionError::Service(format!(
                "{} exited with {}",
                self.program, output.status
            ))
            .into());
        }

        match normalize(&String::from_utf8_lossy(&output.stdout)) {
            Some(transcript) => Ok(Some(transcript)),
            None => Err(RecognitionError::Unintelligible.into()),
        }
    }
}

/// Prints every utterance on its own line.
pub struct ConsoleOutput<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> ConsoleOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl ConsoleOutput<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> SpeechOutput for ConsoleOutput<W> {
    async fn speak(&mut self, text: &str) -> Result<()> {
        let line = format!("{text}\n");
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| AssistantError::SpeechOutput(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| AssistantError::SpeechOutput(e.to_string()))
    }
}

/// Runs an external synthesizer with the text as its last argument.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    program: String,
    args: Vec<String>,
}

impl CommandOutput {
    pub fn from_command_line(line: &str) -> Option<Self> {
        split_command_line(line).map(|(program, args)| Self { program, args })
    }
}

impl SpeechOutput for CommandOutput {
    async fn speak(&mut self, text: &str) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| AssistantError::SpeechOutput(format!("{}: {}", self.program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(AssistantError::SpeechOutput(format!(
                "{} exited with {}",
                self.program, status
            )))
        }
    }
}

/// Either adapter, picked at startup from the configuration.
pub enum Microphone {
    Console(ConsoleInput<BufReader<Stdin>>),
    Command(CommandInput),
}

impl Microphone {
    pub fn from_config(command: Option<&str>) -> Self {
        match command.and_then(CommandInput::from_command_line) {
            Some(input) => Self::Command(input),
            None => Self::Console(ConsoleInput::stdin()),
        }
    }
}

impl SpeechInput for Microphone {
    async fn listen(&mut self) -> Result<Option<String>> {
        match self {
            Self::Console(input) => input.listen().await,
            Self::Command(input) => input.listen().await,
        }
    }
}

pub enum Speaker {
    Console(ConsoleOutput<Stdout>),
    Command(CommandOutput),
}

impl Speaker {
    pub fn from_config(command: Option<&str>) -> Self {
        match command.and_then(CommandOutput::from_command_line) {
            Some(output) => Self::Command(output),
            None => Self::Console(ConsoleOutput::stdout()),
        }
    }
}

impl SpeechOutput for Speaker {
    async fn speak(&mut self, text: &str) -> Result<()> {
        match self {
            Self::Console(output) => output.speak(text).await,
            Self::Command(output) => output.speak(text).await,
        }
    }
}
