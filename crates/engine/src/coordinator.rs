use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;

use common::ErrorKind;
use crossbeam_channel::{unbounded, Sender};
use logsink::{LogRow, LogSink, LogSinkError};
use matcher::Matcher;
use protocol::{write_assignment, Incoming, ProtocolError};

use crate::dispatcher::Dispatcher;
use crate::reorder::ReorderBuffer;
use crate::stitcher::Stitcher;

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("spawning worker process: {0}")]
    Spawn(#[source] io::Error),

    #[error("opening input file: {0}")]
    Dispatch(#[source] io::Error),

    #[error("writing matched paragraphs: {0}")]
    Output(#[source] io::Error),

    #[error(transparent)]
    LogSink(#[from] LogSinkError),

    #[error("worker {worker_id} protocol failure: {source}")]
    Worker {
        worker_id: u32,
        #[source]
        source: ProtocolError,
    },

    #[error("waiting for worker process: {0}")]
    Wait(#[source] io::Error),

    #[error("worker {worker_id} exited with {status}")]
    WorkerExit {
        worker_id: u32,
        status: std::process::ExitStatus,
    },
}

impl CoordinatorError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Spawn(_) | Self::Wait(_) | Self::WorkerExit { .. } => ErrorKind::Io,
            Self::Dispatch(_) | Self::Output(_) => ErrorKind::FileOpen,
            Self::LogSink(e) => e.kind(),
            Self::Worker { source, .. } => source.kind(),
        }
    }
}

enum Event {
    Message(Incoming),
    Closed(u32),
    Failed(u32, ProtocolError),
}

/// Drives the whole run: spawns the worker pool, dispatches ranges as
/// workers ask for them, reassembles results in file order, stitches and
/// matches paragraphs, and logs one row per chunk.
///
/// Returns whether any paragraph in the file matched.
pub fn run(
    self_exe: &Path,
    input_path: &Path,
    num_workers: u32,
    matcher: &Matcher,
    log_out: impl Write,
    mut stdout: impl Write,
) -> Result<bool, CoordinatorError> {
    let (sender, receiver) = unbounded::<Event>();

    let mut children: Vec<Child> = Vec::with_capacity(num_workers as usize);
    let mut writers: HashMap<u32, ChildStdin> = HashMap::with_capacity(num_workers as usize);

    for worker_id in 0..num_workers {
        let mut child = Command::new(self_exe)
            .arg("--worker")
            .arg(worker_id.to_string())
            .arg(input_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(CoordinatorError::Spawn)?;

        let stdin = child.stdin.take().expect("piped stdin");
        let mut stdout_pipe = child.stdout.take().expect("piped stdout");
        writers.insert(worker_id, stdin);
        children.push(child);
        tracing::debug!(worker_id, "worker process spawned");

        let tx: Sender<Event> = sender.clone();
        thread::spawn(move || loop {
            match protocol::read_message(&mut stdout_pipe) {
                Ok(Some(incoming)) => {
                    if tx.send(Event::Message(incoming)).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    let _ = tx.send(Event::Closed(worker_id));
                    break;
                }
                Err(e) => {
                    let _ = tx.send(Event::Failed(worker_id, e));
                    break;
                }
            }
        });
    }
    drop(sender);

    let mut dispatcher = Dispatcher::open(input_path).map_err(CoordinatorError::Dispatch)?;
    let mut reorder = ReorderBuffer::new();
    let mut stitcher = Stitcher::new();
    let mut log = LogSink::new(log_out)?;
    let mut any_match = false;
    let mut active_readers = num_workers;
    let mut worker_error: Option<CoordinatorError> = None;

    while active_readers > 0 {
        let Ok(event) = receiver.recv() else { break };
        match event {
            Event::Message(Incoming::Request(request)) => {
                let assignment = dispatcher
                    .next_assignment()
                    .map_err(CoordinatorError::Dispatch)?;
                if let Some(stdin) = writers.get_mut(&request.worker_id) {
                    write_assignment(stdin, &assignment).map_err(|source| CoordinatorError::Worker {
                        worker_id: request.worker_id,
                        source,
                    })?;
                }
            }
            Event::Message(Incoming::Result(result)) => {
                reorder.insert(result);
                for ready in reorder.drain_ready() {
                    let found = stitcher
                        .feed(&ready.payload, matcher, &mut stdout)
                        .map_err(CoordinatorError::Output)?;
                    log.write_row(LogRow {
                        process_id: ready.worker_id,
                        file_offset: ready.offset,
                        bytes_read: ready.bytes_read(),
                        elapsed_seconds: ready.elapsed_seconds,
                        found,
                    })?;
                    any_match |= found;
                }
            }
            Event::Closed(worker_id) => {
                tracing::debug!(worker_id, "worker pipe closed");
                active_readers -= 1;
            }
            Event::Failed(worker_id, source) => {
                tracing::warn!(worker_id, %source, "worker protocol failure");
                active_readers -= 1;
                worker_error.get_or_insert(CoordinatorError::Worker { worker_id, source });
            }
        }
    }

    let trailing_found = stitcher
        .flush(matcher, &mut stdout)
        .map_err(CoordinatorError::Output)?;
    any_match |= trailing_found;
    log.flush()?;

    for (worker_id, mut child) in (0u32..).zip(children) {
        let status = child.wait().map_err(CoordinatorError::Wait)?;
        if !status.success() {
            tracing::warn!(worker_id, %status, "worker exited with a failure status");
            worker_error.get_or_insert(CoordinatorError::WorkerExit { worker_id, status });
        }
    }

    if let Some(err) = worker_error {
        return Err(err);
    }
    Ok(any_match)
}
