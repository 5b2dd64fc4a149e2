//! In-memory capabilities for exercising the tool without docker or a model.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use codepreview_core::preview::{ChatMessage, ModelResponse};

use super::model::ModelClient;
use super::operator::FileOperator;
use crate::error::Error;

/// Filesystem kept in maps. Directories must be created before files can
/// be written into them, like on a real filesystem.
#[derive(Default)]
pub struct MemoryFileOperator {
    files: Mutex<HashMap<PathBuf, String>>,
    dirs: Mutex<HashSet<PathBuf>>,
    pub writes: AtomicUsize,
    pub calls: AtomicUsize,
}

impl MemoryFileOperator {
    pub fn with_dirs(dirs: &[&str]) -> Self {
        let operator = Self::default();
        for dir in dirs {
            operator.add_dir(Path::new(dir));
        }
        operator
    }

    fn add_dir(&self, path: &Path) {
        let mut dirs = self.dirs.lock().unwrap();
        for ancestor in path.ancestors() {
            dirs.insert(ancestor.to_path_buf());
        }
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileOperator for MemoryFileOperator {
    async fn exists(&self, path: &Path) -> Result<bool, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.dirs.lock().unwrap().contains(path)
            || self.files.lock().unwrap().contains_key(path))
    }

    async fn read_file(&self, path: &Path) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.files.lock().unwrap().get(path).cloned().ok_or_else(|| {
            Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            )
        })
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let parent_exists = path
            .parent()
            .is_some_and(|p| self.dirs.lock().unwrap().contains(p));
        if !parent_exists {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "parent directory missing"),
            ));
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.add_dir(path);
        Ok(())
    }
}

/// Model that replays canned responses in order.
#[derive(Default)]
pub struct StubModel {
    responses: Mutex<VecDeque<Result<ModelResponse, String>>>,
    pub seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubModel {
    pub fn replying(texts: &[&str]) -> Self {
        let model = Self::default();
        for text in texts {
            model.push(Ok(ModelResponse::Text(text.to_string())));
        }
        model
    }

    pub fn failing(message: &str) -> Self {
        let model = Self::default();
        model.push(Err(message.to_string()));
        model
    }

    pub fn push(&self, response: Result<ModelResponse, String>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for StubModel {
    async fn execute(&self, messages: &[ChatMessage]) -> Result<ModelResponse, Error> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no canned response left".to_string()))
            .map_err(Error::Model)
    }
}
