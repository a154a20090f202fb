//! Permission answers persisted between bridge runs.
//!
//! Answers are kept as a JSON object mapping permission aliases to their
//! state, e.g. `{ "fineLocation": "granted" }`. Writes hold an exclusive
//! [`FileLock`] so concurrent bridge processes do not clobber each other.
//! Permission checks never wait on that lock: while a writer holds it they
//! fall back to the answers last seen by this process.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use wlan::{Permission, PermissionHost, PermissionState, bridge};

use crate::config::config_dir;
use crate::file_lock::FileLock;

type Answers = BTreeMap<String, PermissionState>;

/// Asks the user a yes/no question.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn confirm(&self, question: &str) -> io::Result<bool>;
}

/// Prompts on stderr and reads the answer from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

#[async_trait]
impl Prompter for TerminalPrompt {
    async fn confirm(&self, question: &str) -> io::Result<bool> {
        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(format!("{question} [y/N] ").as_bytes())
            .await?;
        stderr.flush().await?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;
        Ok(is_yes(&line))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// [`PermissionHost`] backed by a JSON file and an interactive prompt.
///
/// A stored `denied` answer does not stop further prompts; only a grant
/// does.
pub struct FilePermissionHost<P> {
    path: PathBuf,
    prompter: P,
    last_seen: Mutex<Answers>,
}

impl<P: Prompter> FilePermissionHost<P> {
    pub fn new(path: impl Into<PathBuf>, prompter: P) -> Self {
        Self {
            path: path.into(),
            prompter,
            last_seen: Mutex::default(),
        }
    }

    /// Uses `<config dir>/wlan/permissions.json`.
    pub fn open_default(prompter: P) -> Result<Self> {
        let dir = config_dir().context("No user config directory available")?;
        Ok(Self::new(dir.join("permissions.json"), prompter))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored answers.
    pub fn stored(&self) -> Result<Answers> {
        let _lock = self.lock()?;
        read_answers(&self.path)
    }

    /// Stored answers if they can be read without waiting for a writer.
    pub fn try_stored(&self) -> Result<Option<Answers>> {
        let lock = FileLock::try_acquire_shared(&self.path)
            .with_context(|| format!("Failed to lock {}", self.path.display()))?;
        let Some(_lock) = lock else {
            return Ok(None);
        };

        let answers = read_answers(&self.path)?;
        self.remember(&answers);
        Ok(Some(answers))
    }

    pub fn record(&self, alias: &str, state: PermissionState) -> Result<()> {
        let _lock = self.lock()?;
        let mut answers = read_answers(&self.path)?;
        answers.insert(alias.to_string(), state);
        write_answers(&self.path, &answers)?;
        self.remember(&answers);
        debug!("Stored '{alias}' as {state}");
        Ok(())
    }

    /// Forgets every stored answer.
    pub fn reset(&self) -> Result<()> {
        let _lock = self.lock()?;
        self.remember(&Answers::new());
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove {}", self.path.display()))
            }
        }
    }

    fn remember(&self, answers: &Answers) {
        if let Ok(mut last_seen) = self.last_seen.lock() {
            last_seen.clone_from(answers);
        }
    }

    fn last_seen(&self, alias: &str) -> Option<PermissionState> {
        self.last_seen.lock().ok()?.get(alias).copied()
    }

    fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(&self.path)
            .with_context(|| format!("Failed to lock {}", self.path.display()))
    }
}

fn read_answers(path: &Path) -> Result<Answers> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Answers::new()),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    serde_json::from_str(&text).with_context(|| format!("Corrupt permission file {}", path.display()))
}

fn write_answers(path: &Path, answers: &Answers) -> Result<()> {
    let text = serde_json::to_string_pretty(answers)?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

#[async_trait]
impl<P: Prompter> PermissionHost for FilePermissionHost<P> {
    fn permission_state(&self, permission: &Permission) -> PermissionState {
        match self.try_stored() {
            Ok(Some(answers)) => answers
                .get(permission.alias)
                .copied()
                .unwrap_or(PermissionState::Prompt),
            Ok(None) => {
                debug!("Permission file busy, using last known answers");
                self.last_seen(permission.alias)
                    .unwrap_or(PermissionState::Prompt)
            }
            Err(e) => {
                warn!("Treating '{}' as undecided: {e:#}", permission.alias);
                PermissionState::Prompt
            }
        }
    }

    async fn request_permission(&self, permission: &Permission) {
        let question = format!(
            "Allow {} to access {}?",
            bridge::PLUGIN_NAME,
            permission.alias
        );

        let state = match self.prompter.confirm(&question).await {
            Ok(true) => PermissionState::Granted,
            Ok(false) => PermissionState::Denied,
            Err(e) => {
                error!("Permission prompt failed: {e}");
                return;
            }
        };

        info!("User answered {state} for '{}'", permission.alias);
        if let Err(e) = self.record(permission.alias, state) {
            error!("Failed to store permission answer: {e:#}");
        }
    }
}
