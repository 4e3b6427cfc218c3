//! Keypad code entry.
//!
//! A [`CodeEntrySession`] collects keys until the `#` terminator or its
//! deadline. Input that is not exactly four digits is rejected as soon as
//! the terminator arrives; the rest of the window is not offered for a
//! retry.

use std::sync::Arc;
use std::time::Duration;

use hearth_io::{CodePersistence, Notifier};
use hearth_types::{alarm, AlarmCode, CodeOutcome, CodePurpose, Notice};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::board::StatusBoard;
use crate::error::ControllerError;

/// Key that submits the accumulated input.
pub const TERMINATOR: char = '#';

/// Input beyond this many keys is dropped; it is rejected at submit anyway.
const MAX_INPUT: usize = 16;

/// One open code prompt.
#[derive(Debug)]
pub struct CodeEntrySession {
    deadline: Instant,
    input: String,
}

impl CodeEntrySession {
    pub fn new(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            input: String::new(),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Feed one key. Returns the submitted input when `key` is the
    /// terminator. Whitespace is ignored.
    pub fn push(&mut self, key: char) -> Option<String> {
        if key == TERMINATOR {
            return Some(std::mem::take(&mut self.input));
        }
        if !key.is_whitespace() && self.input.len() < MAX_INPUT {
            self.input.push(key);
        }
        None
    }
}

/// Clears the status prompt when the session ends, including when the
/// awaiting future is dropped.
struct PromptGuard<'a> {
    board: &'a StatusBoard,
}

impl<'a> PromptGuard<'a> {
    fn open(board: &'a StatusBoard, purpose: CodePurpose) -> Self {
        board.update(|s| s.code_prompt = Some(purpose));
        Self { board }
    }
}

impl Drop for PromptGuard<'_> {
    fn drop(&mut self) {
        self.board.update(|s| s.code_prompt = None);
    }
}

/// Owns the keypad input, the code store and the prompt announcement.
pub struct CodeEntry {
    keys: mpsc::Receiver<char>,
    store: Box<dyn CodePersistence>,
    notifier: Arc<dyn Notifier>,
}

impl CodeEntry {
    pub fn new(
        keys: mpsc::Receiver<char>,
        store: Box<dyn CodePersistence>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            keys,
            store,
            notifier,
        }
    }

    /// Open a session, announce it and wait for it to resolve.
    ///
    /// Keys typed before the session opened are discarded. The session is
    /// open before [`Notice::CodeRequested`] goes out, so keys typed in
    /// response to the notice count. The status board shows
    /// `code_prompt = Some(purpose)` for exactly as long as input is being
    /// collected.
    pub async fn await_code(
        &mut self,
        purpose: CodePurpose,
        timeout: Duration,
        board: &StatusBoard,
    ) -> CodeOutcome {
        let mut stale = 0usize;
        while self.keys.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            debug!(stale, "discarded keys typed before the prompt");
        }

        let mut session = CodeEntrySession::new(timeout);
        let _prompt = PromptGuard::open(board, purpose);
        self.notifier
            .notify(&Notice::CodeRequested {
                purpose,
                timeout_secs: timeout.as_secs(),
            })
            .await;
        let outcome = self.collect(&mut session).await;
        info!(%purpose, ?outcome, "code entry resolved");
        outcome
    }

    async fn collect(&mut self, session: &mut CodeEntrySession) -> CodeOutcome {
        loop {
            let key = match tokio::time::timeout_at(session.deadline(), self.keys.recv()).await {
                Err(_) => return CodeOutcome::TimedOut,
                Ok(None) => {
                    warn!("keypad input closed during code entry");
                    return CodeOutcome::TimedOut;
                }
                Ok(Some(key)) => key,
            };
            if let Some(entered) = session.push(key) {
                return self.check(&entered).await;
            }
        }
    }

    async fn check(&self, entered: &str) -> CodeOutcome {
        if !alarm::is_well_formed(entered) {
            debug!(len = entered.len(), "malformed code input");
            return CodeOutcome::Rejected;
        }
        match self.store.get_code().await {
            Ok(code) if code.matches(entered) => CodeOutcome::Accepted,
            Ok(_) => CodeOutcome::Rejected,
            Err(e) => {
                warn!(error = %e, "could not load alarm code, rejecting");
                CodeOutcome::Rejected
            }
        }
    }

    /// Replace the stored code.
    ///
    /// The current code is not asked for.
    pub async fn set_new_code(&self, candidate: &str) -> Result<(), ControllerError> {
        let code = AlarmCode::parse(candidate.trim())?;
        self.store.set_code(&code).await?;
        warn!("alarm code replaced without confirming the previous code");
        Ok(())
    }
}
