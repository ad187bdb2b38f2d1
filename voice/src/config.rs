// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

// Default locations, relative to the working directory.
const DEFAULT_DB_URL: &str = "sqlite://todo.db";
const DEFAULT_NOTES_FILE: &str = "reminders.txt";

/// Voice-driven task manager with spoken due-date reminders.
#[derive(Parser, Debug, Clone)]
#[command(name = "voice", version, about, long_about = None)]
pub struct Config {
    /// SQLite database holding the task list
    #[arg(long, env = "VOICE_TASKS_DATABASE_URL", default_value = DEFAULT_DB_URL)]
    pub database_url: String,

    /// File that dictated reminders are appended to
    #[arg(long, env = "VOICE_TASKS_NOTES_FILE", default_value = DEFAULT_NOTES_FILE)]
    pub notes_file: PathBuf,

    /// Seconds to idle between iterations
    #[arg(
        long,
        env = "VOICE_TASKS_INTERVAL_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,

    /// Speech-to-text program printing one transcript per run (reads stdin when unset)
    #[arg(long, env = "VOICE_TASKS_STT_COMMAND")]
    pub stt_command: Option<String>,

    /// Text-to-speech program taking the text as last argument (prints when unset)
    #[arg(long, env = "VOICE_TASKS_TTS_COMMAND")]
    pub tts_command: Option<String>,
}

impl Config {
    pub fn idle_interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
