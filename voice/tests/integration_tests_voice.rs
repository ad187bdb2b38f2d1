use std::collections::VecDeque;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use common::{Priority, Status};
use tempfile::TempDir;
use voice::assistant::Assistant;
use voice::database::{establish_in_memory_pool, SqliteTaskStore};
use voice::error::{AssistantError, RecognitionError, Result};
use voice::notes::ReminderNotes;
use voice::speech::{SpeechInput, SpeechOutput};
use voice::store::TaskStore;

/// Plays back a fixed list of capture results, then silence.
struct ScriptedInput {
    script: VecDeque<Result<Option<String>>>,
}

impl ScriptedInput {
    fn saying(lines: &[&str]) -> Self {
        Self {
            script: lines.iter().map(|l| Ok(Some(l.to_string()))).collect(),
        }
    }

    fn failing(err: RecognitionError) -> Self {
        Self {
            script: VecDeque::from([Err(AssistantError::Recognition(err))]),
        }
    }
}

impl SpeechInput for ScriptedInput {
    async fn listen(&mut self) -> Result<Option<String>> {
        self.script.pop_front().unwrap_or(Ok(None))
    }
}

/// Remembers everything it was asked to say.
#[derive(Default)]
struct RecordingOutput {
    spoken: Vec<String>,
    broken: bool,
}

impl SpeechOutput for RecordingOutput {
    async fn speak(&mut self, text: &str) -> Result<()> {
        if self.broken {
            return Err(AssistantError::SpeechOutput("synthesizer offline".into()));
        }
        self.spoken.push(text.to_string());
        Ok(())
    }
}

/// 2025-01-01 21:00, three hours before a task due on 2025-01-02.
fn evening_before() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(21, 0, 0)
        .unwrap()
}

/// Helper function to build an assistant over a fresh, in-memory database.
async fn setup_assistant(
    input: ScriptedInput,
    output: RecordingOutput,
) -> (Assistant<SqliteTaskStore, ScriptedInput, RecordingOutput>, TempDir) {
    let pool = establish_in_memory_pool()
        .await
        .expect("Failed to open in-memory SQLite");
    let notes_dir = tempfile::tempdir().unwrap();
    let notes = ReminderNotes::new(notes_dir.path().join("reminders.txt"));

    let assistant = Assistant::new(
        SqliteTaskStore::new(pool),
        input,
        output,
        notes,
        Duration::from_millis(10),
    )
    .with_clock(evening_before);

    (assistant, notes_dir)
}

#[tokio::test]
async fn test_add_command_is_persisted_and_confirmed() {
    let input = ScriptedInput::saying(&["add task: buy milk due by 2025-01-10 priority high"]);
    let (mut assistant, _dir) = setup_assistant(input, RecordingOutput::default()).await;

    // Act
    assistant.step().await;

    // Assert: Reply first, then the reminder for the new high priority task
    assert_eq!(
        assistant.output().spoken,
        vec![
            "Task 'buy milk' added with due date 2025-01-10 and priority high.".to_string(),
            "Reminder: Task ID 1 is due in 8 days.".to_string(),
        ]
    );

    let tasks = assistant.store().list().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description, "buy milk");
    assert_eq!(tasks[0].priority, Priority::High);
    assert_eq!(tasks[0].status, Status::Pending);
}

#[tokio::test]
async fn test_reminders_follow_store_order() {
    let input = ScriptedInput::saying(&[
        "add task: water plants due by 2025-01-02 priority low",
        "add task: pay rent due by 2025-01-04 priority medium",
        "create a to-do: renew passport due by 2025-03-01 priority high",
    ]);
    let (mut assistant, _dir) = setup_assistant(input, RecordingOutput::default()).await;

    // Act: Three iterations, one command each
    assistant.step().await;
    assistant.step().await;
    assistant.step().await;

    // Assert: The final iteration announces every task inside its window
    let spoken = &assistant.output().spoken;
    let last_reply = spoken
        .iter()
        .rposition(|s| s.starts_with("Task 'renew passport'"))
        .unwrap();
    assert_eq!(
        spoken[last_reply + 1..],
        [
            "Reminder: Task ID 1 is due soon.".to_string(),
            "Reminder: Task ID 2 is due in 2 days.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_completed_tasks_stop_reminding() {
    let input = ScriptedInput::saying(&[
        "add task: water plants due by 2025-01-02 priority low",
        "mark task 1 completed",
    ]);
    let (mut assistant, _dir) = setup_assistant(input, RecordingOutput::default()).await;

    assistant.step().await;
    assistant.step().await;

    assert_eq!(
        assistant.output().spoken,
        vec![
            "Task 'water plants' added with due date 2025-01-02 and priority low.".to_string(),
            "Reminder: Task ID 1 is due soon.".to_string(),
            "Task ID 1 marked as completed.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_missing_task_is_reported_and_loop_continues() {
    let input = ScriptedInput::saying(&["delete task 42", "view tasks"]);
    let (mut assistant, _dir) = setup_assistant(input, RecordingOutput::default()).await;

    assistant.step().await;
    assistant.step().await;

    assert_eq!(
        assistant.output().spoken,
        vec![
            "Task ID 42 not found.".to_string(),
            "No tasks available.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_clarifications_are_spoken() {
    let input = ScriptedInput::saying(&[
        "add task: buy milk",
        "reminder for stretch at 25:99",
        "sing me a song",
    ]);
    let (mut assistant, dir) = setup_assistant(input, RecordingOutput::default()).await;

    for _ in 0..3 {
        assistant.step().await;
    }

    assert_eq!(
        assistant.output().spoken,
        vec![
            "Please specify the task, due date in YYYY-MM-DD format, and priority (low, medium, high).".to_string(),
            "Invalid time format. Please use HH:MM.".to_string(),
            "Sorry, I did not understand that command.".to_string(),
        ]
    );
    // The malformed reminder left no note behind.
    assert!(!dir.path().join("reminders.txt").exists());
}

#[tokio::test]
async fn test_reminder_note_is_appended() {
    let input = ScriptedInput::saying(&["set a reminder for call the dentist at 09:15"]);
    let (mut assistant, dir) = setup_assistant(input, RecordingOutput::default()).await;

    assistant.step().await;

    assert_eq!(
        assistant.output().spoken,
        vec!["Reminder set for call the dentist at 09:15.".to_string()]
    );
    let content = std::fs::read_to_string(dir.path().join("reminders.txt")).unwrap();
    assert_eq!(content, "Reminder: call the dentist at 09:15\n");
}

#[tokio::test]
async fn test_recognition_failures_are_spoken() {
    let (mut unintelligible, _a) = setup_assistant(
        ScriptedInput::failing(RecognitionError::Unintelligible),
        RecordingOutput::default(),
    )
    .await;
    let (mut offline, _b) = setup_assistant(
        ScriptedInput::failing(RecognitionError::Service("timeout".into())),
        RecordingOutput::default(),
    )
    .await;

    unintelligible.step().await;
    offline.step().await;

    assert_eq!(
        unintelligible.output().spoken,
        vec!["Sorry, I did not understand that.".to_string()]
    );
    assert_eq!(
        offline.output().spoken,
        vec!["Sorry, there is an issue with the speech service.".to_string()]
    );
}

#[tokio::test]
async fn test_silence_still_checks_reminders() {
    let (mut assistant, _dir) =
        setup_assistant(ScriptedInput::saying(&[]), RecordingOutput::default()).await;
    assistant
        .store()
        .insert(&common::NewTask {
            description: "submit form".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            priority: Priority::Low,
        })
        .await
        .unwrap();

    assistant.step().await;

    assert_eq!(
        assistant.output().spoken,
        vec!["Reminder: Task ID 1 is due soon.".to_string()]
    );
}

#[tokio::test]
async fn test_broken_speech_output_does_not_stop_the_iteration() {
    let input = ScriptedInput::saying(&["add task: buy milk due by 2025-01-10 priority high"]);
    let output = RecordingOutput {
        broken: true,
        ..Default::default()
    };
    let (mut assistant, _dir) = setup_assistant(input, output).await;

    // Act: Nothing can be spoken, the command still goes through
    assistant.step().await;

    assert!(assistant.output().spoken.is_empty());
    assert_eq!(assistant.store().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_run_keeps_iterating() {
    let input = ScriptedInput::saying(&[
        "add task: a due by 2030-01-01 priority low",
        "add task: b due by 2030-01-01 priority low",
    ]);
    let (mut assistant, _dir) = setup_assistant(input, RecordingOutput::default()).await;

    // Act: Let the endless loop run for a while, then drop it
    let _ = tokio::time::timeout(Duration::from_millis(500), assistant.run()).await;

    // Assert: Both scripted commands were handled on separate iterations
    let tasks = assistant.store().list().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1].description, "b");
}

#[tokio::test]
async fn test_storage_failure_is_spoken_and_iteration_completes() {
    let input = ScriptedInput::saying(&["view tasks"]);
    let (mut assistant, _dir) = setup_assistant(input, RecordingOutput::default()).await;
    assistant.store().close().await;

    // Act: Both the command and the reminder check hit a closed pool
    assistant.step().await;
    assistant.step().await;

    assert_eq!(
        assistant.output().spoken,
        vec![
            "An error occurred while viewing tasks.".to_string(),
            "An error occurred while checking reminders.".to_string(),
            "An error occurred while checking reminders.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_blank_transcript_is_silence() {
    let input = ScriptedInput::saying(&["", "   "]);
    let (mut assistant, _dir) = setup_assistant(input, RecordingOutput::default()).await;

    assistant.step().await;
    assistant.step().await;

    assert!(assistant.output().spoken.is_empty());
}
