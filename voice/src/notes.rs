// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::path::{Path, PathBuf};

use crate::error::Result;

use chrono::NaiveTime;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Append-only log of dictated reminders. The assistant never reads it back.
#[derive(Debug, Clone)]
pub struct ReminderNotes {
    path: PathBuf,
}

impl ReminderNotes {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `Reminder: <text> at <HH:MM>`, creating the file and its
    /// directory when missing.
    pub async fn append(&self, text: &str, time: NaiveTime) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let line = format_note(text, time);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        info!("Appended reminder note to {}", self.path.display());
        Ok(())
    }
}

pub fn format_note(text: &str, time: NaiveTime) -> String {
    format!("Reminder: {} at {}\n", text, time.format("%H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_append_creates_file_and_keeps_previous_lines() {
        let dir = tempdir().unwrap();
        let notes = ReminderNotes::new(dir.path().join("nested").join("reminders.txt"));

        // Act: Two appends, the first one creates the directory
        notes
            .append("call the bank", NaiveTime::from_hms_opt(9, 5, 0).unwrap())
            .await
            .unwrap();
        notes
            .append("stretch", NaiveTime::from_hms_opt(17, 30, 0).unwrap())
            .await
            .unwrap();

        // Assert
        let content = std::fs::read_to_string(notes.path()).unwrap();
        assert_eq!(
            content,
            "Reminder: call the bank at 09:05\nReminder: stretch at 17:30\n"
        );
    }

    #[tokio::test]
    async fn test_append_into_a_directory_path_fails() {
        let dir = tempdir().unwrap();
        let notes = ReminderNotes::new(dir.path());

        let err = notes
            .append("nothing", NaiveTime::from_hms_opt(8, 0, 0).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, crate::error::AssistantError::NoteLog(_)));
    }
}
