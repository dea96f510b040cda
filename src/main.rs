//! Homegrown - terminal client for the tutoring backend
//!
//! Picks an enrollment, then chats with its tutor line by line. Commands:
//! `/workspace`, `/notes [text]`, `/upload <path>`, `/back`, `/quit`.

use homegrown::backend::{EnrollmentRef, FileUpload, HttpBackend, LoggingBackend, TutorBackend};
use homegrown::config::ClientConfig;
use homegrown::runtime::{SessionRuntime, UploadStatus};
use homegrown::session::{SessionError, SessionEvent};
use homegrown::state_machine::ChatRequestState;
use homegrown::storage::{MemoryStore, Preferences, SqliteStore};
use homegrown::transcript::{Sender, TranscriptEntry};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the chat on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homegrown=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(api_url = %config.api_url, data_path = %config.data_path.display(), "Starting client");

    let prefs = open_preferences(&config.data_path);
    let backend = LoggingBackend::new(HttpBackend::new(&config)?);
    let mut runtime = SessionRuntime::new(backend, prefs);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    while let Some(enrollment) = pick_enrollment(&runtime, &mut input).await? {
        let session = runtime.enter_workspace(enrollment)?;
        println!("\n== {} ==", session.course_label());
        println!("{}", session.current_workspace().progress_label());
        for entry in session.current_transcript() {
            print_entry(&entry);
        }
        let printer = tokio::spawn(print_events(session.subscribe()));

        let keep_going = workspace_loop(&mut runtime, &mut input).await?;

        printer.abort();
        runtime.leave_workspace();
        if !keep_going {
            break;
        }
    }

    Ok(())
}

/// Open the on-disk store, falling back to memory when the device refuses
fn open_preferences(path: &Path) -> Preferences {
    match SqliteStore::open(path) {
        Ok(store) => Preferences::new(Arc::new(store)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Device storage unavailable, notes will not persist");
            Preferences::new(Arc::new(MemoryStore::new()))
        }
    }
}

/// Welcome screen: list enrollments and read a choice
async fn pick_enrollment<B: TutorBackend>(
    runtime: &SessionRuntime<B>,
    input: &mut Input,
) -> std::io::Result<Option<EnrollmentRef>> {
    loop {
        let choice = match runtime.load_enrollments().await {
            Ok(choice) => choice,
            Err(e) => {
                println!("{e}");
                println!("Press Enter to retry, or /quit.");
                match input.next_line().await? {
                    Some(line) if line.trim() == "/quit" => return Ok(None),
                    Some(_) => continue,
                    None => return Ok(None),
                }
            }
        };

        if choice.enrollments.is_empty() {
            println!("No enrollments found. Run the backend seed script and press Enter.");
            match input.next_line().await? {
                Some(line) if line.trim() == "/quit" => return Ok(None),
                Some(_) => continue,
                None => return Ok(None),
            }
        }

        println!("\nYour enrollments:");
        for (i, enrollment) in choice.enrollments.iter().enumerate() {
            let marker = if Some(enrollment.enrollment_id) == choice.preferred {
                "*"
            } else {
                " "
            };
            println!("{marker} {}. {}", i + 1, enrollment.option_label());
        }
        if let Some(preferred) = choice.preferred_enrollment() {
            println!("  {}", preferred.detail_label());
        }
        println!("Pick a number (Enter for *), or /quit:");

        let Some(line) = input.next_line().await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line == "/quit" {
            return Ok(None);
        }
        if line.is_empty() {
            return Ok(choice.preferred_enrollment().cloned());
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=choice.enrollments.len()).contains(&n) => {
                return Ok(choice.enrollments.into_iter().nth(n - 1));
            }
            _ => println!("Not a valid choice: {line}"),
        }
    }
}

/// Workspace screen; returns whether to go back to the welcome screen
async fn workspace_loop<B: TutorBackend>(
    runtime: &mut SessionRuntime<B>,
    input: &mut Input,
) -> std::io::Result<bool> {
    while let Some(line) = input.next_line().await? {
        let line = line.trim();
        let (command, rest) = split_command(line);

        match command {
            "/quit" => return Ok(false),
            "/back" => return Ok(true),
            "/workspace" => {
                if let Some(session) = runtime.session() {
                    let workspace = session.current_workspace();
                    println!("{}", workspace.title);
                    println!("{}", workspace.progress_label());
                    println!("Objective: {}", workspace.objective);
                }
            }
            "/notes" if rest.is_empty() => {
                if let Some(session) = runtime.session() {
                    println!("{}", session.notes());
                }
            }
            "/notes" => {
                match runtime.set_notes(rest).and_then(|()| runtime.save_notes()) {
                    Ok(()) => println!("Notes saved to this device."),
                    Err(e) => println!("{e}"),
                }
            }
            "/upload" => match FileUpload::from_path(Path::new(rest)).await {
                Ok(file) => match runtime.upload(file).await {
                    Ok(UploadStatus::Uploaded { filename }) => println!("Uploaded {filename}"),
                    Ok(UploadStatus::Failed { message }) => println!("{message}"),
                    Err(e) => println!("{e}"),
                },
                Err(e) => println!("Could not read {rest}: {e}"),
            },
            _ => match runtime.send_message(line).await {
                Ok(_) => {}
                Err(SessionError::InvalidInput(e)) => println!("({e})"),
                Err(e) => println!("{e}"),
            },
        }
    }
    Ok(false)
}

/// Split an input line into its command word and trimmed argument
fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    }
}

async fn print_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::EntryAppended(entry)) if entry.sender != Sender::Local => {
                print_entry(&entry);
            }
            Ok(SessionEvent::StateChanged(ChatRequestState::Pending { .. })) => {
                println!("  Thinking…");
            }
            Ok(SessionEvent::WorkspaceChanged(workspace)) => {
                println!("  [{}] {}", workspace.progress_label(), workspace.title);
            }
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_entry(entry: &TranscriptEntry) {
    let who = match entry.sender {
        Sender::Local => "you",
        Sender::Remote => "tutor",
        Sender::System => "system",
    };
    println!("[{who}] {}", entry.text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command_trims_argument() {
        assert_eq!(split_command("/upload  notes.txt"), ("/upload", "notes.txt"));
        assert_eq!(split_command("/notes   read chapter 2 "), ("/notes", "read chapter 2"));
        assert_eq!(split_command("/notes"), ("/notes", ""));
        assert_eq!(split_command("/notes   "), ("/notes", ""));
        assert_eq!(split_command("hello there"), ("hello", "there"));
    }
}
