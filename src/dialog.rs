//! The narrow dialog surface the pipeline needs from the host application:
//! yes/no confirmation, the save/don't-save/cancel prompt, and file/folder
//! pickers.
//!
//! Cancellation is an ordinary value here, never an error. Every prompt
//! result is consumed explicitly by the caller, which decides whether a
//! cancel means "skip this step" or "abort the workflow".

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Outcome of a yes/no confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    /// The user dismissed the prompt without answering.
    Cancelled,
}

impl Answer {
    pub fn is_yes(&self) -> bool {
        matches!(self, Answer::Yes)
    }
}

/// Outcome of the unsaved-changes prompt shown before destructive workflow
/// steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    Save,
    DontSave,
    Cancel,
}

/// Prompts the pipeline can show. Implemented by the host application's
/// dialog layer; [`ScriptedDialogs`] implements it for tests.
pub trait Dialogs {
    /// Asks a yes/no question. Dismissing the dialog counts as declining.
    fn confirm(&mut self, message: &str) -> Answer;

    /// Asks whether to save unsaved work before continuing.
    fn save_changes(&mut self, message: &str) -> SaveChoice;

    /// Asks the user to pick an existing file, or `None` if they cancel.
    fn pick_file(&mut self, caption: &str, start_dir: &Path, filter: &str) -> Option<PathBuf>;

    /// Asks the user to pick a folder, or `None` if they cancel.
    fn pick_folder(&mut self, caption: &str, start_dir: &Path) -> Option<PathBuf>;

    /// Asks the user where a new document should be written, or `None` if
    /// they cancel.
    fn pick_save_path(&mut self, caption: &str, start_dir: &Path) -> Option<PathBuf>;
}

/// An implementation of [`Dialogs`] that replays queued responses, intended
/// for use in tests.
///
/// All clones of a `ScriptedDialogs` share the same queues and transcript,
/// so a test can keep one handle while a session owns another. Each prompt
/// kind pops from its own queue; when a queue runs dry the prompt is
/// declined, so an under-scripted test reads as a user who backs out rather
/// than one who hangs. Every message shown is recorded and can be inspected
/// through [`ScriptedDialogs::prompts`].
#[derive(Debug, Default, Clone)]
pub struct ScriptedDialogs {
    inner: Arc<Mutex<ScriptedDialogsInner>>,
}

#[derive(Debug, Default)]
struct ScriptedDialogsInner {
    answers: VecDeque<Answer>,
    save_choices: VecDeque<SaveChoice>,
    files: VecDeque<Option<PathBuf>>,
    folders: VecDeque<Option<PathBuf>>,
    save_paths: VecDeque<Option<PathBuf>>,
    prompts: Vec<String>,
}

impl ScriptedDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedDialogsInner> {
        self.inner.lock().unwrap()
    }

    pub fn push_answer(&self, answer: Answer) {
        self.lock().answers.push_back(answer);
    }

    pub fn push_save_choice(&self, choice: SaveChoice) {
        self.lock().save_choices.push_back(choice);
    }

    /// Queues a response for the next file picker; `None` cancels it.
    pub fn push_file(&self, path: Option<PathBuf>) {
        self.lock().files.push_back(path);
    }

    /// Queues a response for the next folder picker; `None` cancels it.
    pub fn push_folder(&self, path: Option<PathBuf>) {
        self.lock().folders.push_back(path);
    }

    /// Queues a response for the next save-path picker; `None` cancels it.
    pub fn push_save_path(&self, path: Option<PathBuf>) {
        self.lock().save_paths.push_back(path);
    }

    /// Every prompt message and picker caption shown so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }
}

impl Dialogs for ScriptedDialogs {
    fn confirm(&mut self, message: &str) -> Answer {
        let mut inner = self.lock();
        inner.prompts.push(message.to_owned());
        inner.answers.pop_front().unwrap_or(Answer::No)
    }

    fn save_changes(&mut self, message: &str) -> SaveChoice {
        let mut inner = self.lock();
        inner.prompts.push(message.to_owned());
        inner.save_choices.pop_front().unwrap_or(SaveChoice::Cancel)
    }

    fn pick_file(&mut self, caption: &str, _start_dir: &Path, _filter: &str) -> Option<PathBuf> {
        let mut inner = self.lock();
        inner.prompts.push(caption.to_owned());
        inner.files.pop_front().flatten()
    }

    fn pick_folder(&mut self, caption: &str, _start_dir: &Path) -> Option<PathBuf> {
        let mut inner = self.lock();
        inner.prompts.push(caption.to_owned());
        inner.folders.pop_front().flatten()
    }

    fn pick_save_path(&mut self, caption: &str, _start_dir: &Path) -> Option<PathBuf> {
        let mut inner = self.lock();
        inner.prompts.push(caption.to_owned());
        inner.save_paths.pop_front().flatten()
    }
}
