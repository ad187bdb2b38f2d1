// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::time::Duration;

use crate::error::AssistantError;
use crate::handlers;
use crate::interpreter;
use crate::notes::ReminderNotes;
use crate::reminder;
use crate::speech::{SpeechInput, SpeechOutput};
use crate::store::TaskStore;

use chrono::{Local, NaiveDateTime};
use tokio::time;
use tracing::{debug, error, info, warn};

/// Naive local wall clock, the only notion of time reminders use.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// The capture, interpret, execute, remind, idle loop.
///
/// Everything happens in sequence on the caller's task; the only state that
/// outlives an iteration is what the store persisted.
pub struct Assistant<S, I, O> {
    store: S,
    input: I,
    output: O,
    notes: ReminderNotes,
    idle: Duration,
    clock: fn() -> NaiveDateTime,
}

impl<S: TaskStore, I: SpeechInput, O: SpeechOutput> Assistant<S, I, O> {
    pub fn new(store: S, input: I, output: O, notes: ReminderNotes, idle: Duration) -> Self {
        Self {
            store,
            input,
            output,
            notes,
            idle,
            clock: local_now,
        }
    }

    /// Replaces the wall clock used for reminder checks.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Runs until the surrounding task is dropped.
    pub async fn run(&mut self) {
        info!(
            "Assistant started, idling {:?} between iterations.",
            self.idle
        );
        loop {
            self.step().await;
            time::sleep(self.idle).await;
        }
    }

    /// One iteration without the idle wait.
    pub async fn step(&mut self) {
        if let Some(transcript) = self.capture().await {
            self.handle(&transcript).await;
        }
        self.announce_reminders().await;
    }

    /// Interprets and executes a single transcript, then speaks the reply.
    pub async fn handle(&mut self, transcript: &str) {
        let intent = interpreter::interpret(transcript);
        debug!("Interpreted '{}' as {:?}", transcript, intent);
        let reply = handlers::execute(&self.store, &self.notes, intent).await;
        self.say(&reply).await;
    }

    async fn capture(&mut self) -> Option<String> {
        match self.input.listen().await {
            Ok(Some(transcript)) if transcript.trim().is_empty() => {
                debug!("Blank transcript, treating as silence.");
                None
            }
            Ok(Some(transcript)) => {
                info!("You said: {}", transcript);
                Some(transcript)
            }
            Ok(None) => None,
            Err(AssistantError::Recognition(err)) => {
                warn!("Recognition failed: {}", err);
                self.say(err.reply()).await;
                None
            }
            Err(err) => {
                error!("Listening error: {:?}", err);
                self.say("An unexpected error occurred while listening.")
                    .await;
                None
            }
        }
    }

    /// Speaks every reminder due now, in store order.
    pub async fn announce_reminders(&mut self) {
        let tasks = match self.store.list().await {
            Ok(tasks) => tasks,
            Err(err) => {
                error!("Check reminders error: {:?}", err);
                self.say("An error occurred while checking reminders.")
                    .await;
                return;
            }
        };

        let events = reminder::check((self.clock)(), &tasks);
        debug!("{} reminders due.", events.len());
        for event in events {
            self.say(&event.message).await;
        }
    }

    /// Speech output never fails past this point; the text is logged instead.
    async fn say(&mut self, text: &str) {
        if let Err(err) = self.output.speak(text).await {
            error!("Text-to-speech error: {}", err);
            warn!("Unspoken: {}", text);
        }
    }
}
