/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Background asset loading.
//!
//! Files are read on the rayon pool. Completions travel back through a
//! channel and are only observed when [`AssetLoader::poll`] runs, which the
//! render loop does from a frame update. Nothing here ever blocks a tick.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, Sender},
};

use log::{debug, error, info};

use crate::render_loop::LoopError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetHandle(u64);

#[derive(Clone, Debug, PartialEq)]
pub enum LoadEvent {
    Started {
        path: PathBuf,
        loaded: usize,
        total: usize,
    },
    Progress {
        path: PathBuf,
        loaded: usize,
        total: usize,
    },
    /// Every requested asset has completed, successfully or not.
    Loaded,
    Error {
        path: PathBuf,
        reason: String,
    },
}

/// Counts requested and completed items and reports the load signals.
#[derive(Default)]
pub struct LoadingManager {
    loaded: usize,
    total: usize,
    listener: Option<Box<dyn FnMut(&LoadEvent)>>,
}

impl LoadingManager {
    #[must_use]
    pub fn with_listener(listener: impl FnMut(&LoadEvent) + 'static) -> Self {
        Self {
            listener: Some(Box::new(listener)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.loaded == self.total
    }

    fn emit(&mut self, event: &LoadEvent) {
        match event {
            LoadEvent::Started {
                path,
                loaded,
                total,
            } => info!(
                "Started loading file: {}. Loaded {loaded} of {total} files.",
                path.display()
            ),
            LoadEvent::Progress {
                path,
                loaded,
                total,
            } => debug!(
                "Loading file: {}. Loaded {loaded} of {total} files.",
                path.display()
            ),
            LoadEvent::Loaded => info!("All resources have been loaded."),
            LoadEvent::Error { path, reason } => {
                error!("There was an error loading {}: {reason}", path.display());
            }
        }
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }

    fn item_start(&mut self, path: &Path) {
        self.total += 1;
        let event = LoadEvent::Started {
            path: path.to_owned(),
            loaded: self.loaded,
            total: self.total,
        };
        self.emit(&event);
    }

    fn item_end(&mut self, path: &Path, failure: Option<&str>) {
        self.loaded += 1;
        if let Some(reason) = failure {
            self.emit(&LoadEvent::Error {
                path: path.to_owned(),
                reason: reason.to_owned(),
            });
        }
        let event = LoadEvent::Progress {
            path: path.to_owned(),
            loaded: self.loaded,
            total: self.total,
        };
        self.emit(&event);
        if self.is_idle() {
            self.emit(&LoadEvent::Loaded);
        }
    }
}

type Completion = (AssetHandle, PathBuf, Result<Vec<u8>, String>);

pub struct AssetLoader {
    root: PathBuf,
    manager: LoadingManager,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    completed: HashMap<AssetHandle, Result<Vec<u8>, LoopError>>,
    next_handle: u64,
}

impl AssetLoader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, manager: LoadingManager) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            root: root.into(),
            manager,
            sender,
            receiver,
            completed: HashMap::new(),
            next_handle: 0,
        }
    }

    /// Starts reading `path` (relative to the loader root) in the background.
    pub fn load(&mut self, path: impl AsRef<Path>) -> AssetHandle {
        let handle = AssetHandle(self.next_handle);
        self.next_handle += 1;
        let full_path = self.root.join(path.as_ref());
        self.manager.item_start(&full_path);
        let sender = self.sender.clone();
        rayon::spawn(move || {
            let result = std::fs::read(&full_path).map_err(|err| err.to_string());
            // The loader may be gone already; nobody is waiting for the data then.
            let _ = sender.send((handle, full_path, result));
        });
        handle
    }

    /// Collects finished loads without blocking.
    pub fn poll(&mut self) {
        while let Ok((handle, path, result)) = self.receiver.try_recv() {
            self.manager
                .item_end(&path, result.as_ref().err().map(String::as_str));
            let result = result.map_err(|reason| LoopError::AssetLoadFailure { path, reason });
            self.completed.insert(handle, result);
        }
    }

    /// Hands out the result of a finished load, once.
    pub fn take(&mut self, handle: AssetHandle) -> Option<Result<Vec<u8>, LoopError>> {
        self.completed.remove(&handle)
    }

    #[must_use]
    pub fn manager(&self) -> &LoadingManager {
        &self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc, thread, time::Duration};

    fn wait_for(loader: &mut AssetLoader, handle: AssetHandle) -> Result<Vec<u8>, LoopError> {
        for _ in 0..500 {
            loader.poll();
            if let Some(result) = loader.take(handle) {
                return result;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("asset never completed");
    }

    #[test]
    fn loads_file_in_background() {
        let dir = std::env::temp_dir().join(format!("sketchbook-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("palette.txt"), b"#00ff00").unwrap();

        let events = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&events);
        let manager = LoadingManager::with_listener(move |event| {
            recorded.borrow_mut().push(event.clone());
        });
        let mut loader = AssetLoader::new(&dir, manager);
        let handle = loader.load("palette.txt");
        assert!(!loader.manager().is_idle());

        let data = wait_for(&mut loader, handle).unwrap();
        assert_eq!(data, b"#00ff00");
        assert!(loader.take(handle).is_none());
        assert!(loader.manager().is_idle());
        assert_eq!(events.borrow().last(), Some(&LoadEvent::Loaded));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_reports_failure() {
        let mut loader = AssetLoader::new(std::env::temp_dir(), LoadingManager::default());
        let handle = loader.load("definitely/not/here.png");
        let result = wait_for(&mut loader, handle);
        assert!(matches!(result, Err(LoopError::AssetLoadFailure { .. })));
        assert_eq!(loader.manager().loaded(), 1);
    }
}
