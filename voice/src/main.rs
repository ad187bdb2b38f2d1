// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use clap::Parser;
use voice::assistant::Assistant;
use voice::config::Config;
use voice::database::{self, SqliteTaskStore};
use voice::notes::ReminderNotes;
use voice::speech::{Microphone, Speaker};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::parse();
    tracing::info!("Starting up the assistant...");

    let store = match database::establish_connection_pool(&config.database_url).await {
        Ok(pool) => {
            tracing::info!("Database connection was made successfully.");
            SqliteTaskStore::new(pool)
        }
        Err(e) => {
            tracing::error!("Failed to connect with the database: {:?}", e);
            std::process::exit(1);
        }
    };

    let mut assistant = Assistant::new(
        store.clone(),
        Microphone::from_config(config.stt_command.as_deref()),
        Speaker::from_config(config.tts_command.as_deref()),
        ReminderNotes::new(config.notes_file.clone()),
        config.idle_interval(),
    );

    // The loop never returns on its own; stop on Ctrl-C or SIGTERM and release the pool.
    tokio::select! {
        _ = assistant.run() => {}
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                tracing::error!("Failed to listen for shutdown signal: {:?}", e);
            }
            tracing::info!("Interrupted, shutting down.");
        }
        _ = terminate() => {
            tracing::info!("Terminated, shutting down.");
        }
    }

    drop(assistant);
    store.close().await;
}

/// Resolves on SIGTERM. Never resolves where the signal does not exist or
/// cannot be watched.
async fn terminate() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    std::future::pending::<()>().await;
}
