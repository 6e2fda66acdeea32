//! Stderr progress line for a batch of invocations: `◐ invoking 3/8`.

use std::io::{IsTerminal, Write};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

const FRAMES: [char; 4] = ['◐', '◓', '◑', '◒'];

const INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running { done: usize },
    Stopped,
}

/// Redraws the progress line in a background task until [`stop`](Self::stop)
/// is called. Callers report each finished call with
/// [`finish_one`](Self::finish_one).
pub struct Spinner {
    handle: JoinHandle<()>,
    state: watch::Sender<State>,
}

impl Spinner {
    /// Start drawing progress for `total` calls.
    pub fn start(message: &str, total: usize) -> Self {
        let (state_tx, mut state_rx) = watch::channel(State::Running { done: 0 });
        let message = message.to_string();

        let handle = tokio::spawn(async move {
            let mut tick = 0usize;
            let mut done = 0;
            loop {
                let frame = FRAMES[tick % FRAMES.len()];
                eprint!("\x1b[2K\r{}", status_line(frame, &message, done, total));
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => tick += 1,
                    changed = state_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        match *state_rx.borrow_and_update() {
                            State::Running { done: n } => done = n,
                            State::Stopped => break,
                        }
                    }
                }
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self {
            handle,
            state: state_tx,
        }
    }

    /// Only draw when stderr is a terminal; piped output stays clean.
    pub fn start_if_tty(message: &str, total: usize) -> Option<Self> {
        std::io::stderr()
            .is_terminal()
            .then(|| Self::start(message, total))
    }

    /// Record one finished call.
    pub fn finish_one(&self) {
        self.state.send_modify(|state| {
            if let State::Running { done } = state {
                *done += 1;
            }
        });
    }

    /// Calls recorded as finished so far.
    pub fn finished(&self) -> usize {
        match *self.state.borrow() {
            State::Running { done } => done,
            State::Stopped => 0,
        }
    }

    /// Stop drawing and clear the line.
    pub async fn stop(self) {
        self.state.send_replace(State::Stopped);
        let _ = self.handle.await;
    }
}

/// A single call needs no counter.
fn status_line(frame: char, message: &str, done: usize, total: usize) -> String {
    if total <= 1 {
        format!("{frame} {message}")
    } else {
        format!("{frame} {message} {done}/{total}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_call_has_no_counter() {
        assert_eq!(status_line('◐', "invoking", 0, 1), "◐ invoking");
    }

    #[test]
    fn batch_shows_done_over_total() {
        assert_eq!(status_line('◓', "invoking", 3, 8), "◓ invoking 3/8");
    }

    #[tokio::test]
    async fn finish_one_counts_calls() {
        let spinner = Spinner::start("invoking", 3);
        assert_eq!(spinner.finished(), 0);
        spinner.finish_one();
        spinner.finish_one();
        assert_eq!(spinner.finished(), 2);
        spinner.stop().await;
    }

    #[tokio::test]
    async fn stop_after_redraws() {
        let spinner = Spinner::start("invoking", 2);
        tokio::time::sleep(Duration::from_millis(250)).await;
        spinner.finish_one();
        spinner.stop().await;
    }

    #[tokio::test]
    async fn start_if_tty_stops_cleanly_either_way() {
        if let Some(spinner) = Spinner::start_if_tty("invoking", 1) {
            spinner.stop().await;
        }
    }
}
