//! Print requester that "prints" to text files on a background task.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gridline::{PrintDocument, PrintRequester};
use tokio::runtime::Handle;

/// How long a print job pretends to take.
const SPOOL_TIME: Duration = Duration::from_millis(600);

/// Outcome of the last finished job.
pub type PrintOutcome = Result<PathBuf, String>;

pub struct PrintSpooler {
    dir: PathBuf,
    runtime: Handle,
    document: Mutex<Option<PrintDocument>>,
    printing: Arc<AtomicBool>,
    finished: Arc<Mutex<Option<PrintOutcome>>>,
}

impl PrintSpooler {
    pub fn new(dir: PathBuf, runtime: Handle) -> Self {
        Self {
            dir,
            runtime,
            document: Mutex::new(None),
            printing: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(Mutex::new(None)),
        }
    }

    /// Outcome of the last job, once.
    pub fn take_finished(&self) -> Option<PrintOutcome> {
        self.finished.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

impl PrintRequester for PrintSpooler {
    fn attach(&self, document: PrintDocument) {
        *self.document.lock().unwrap_or_else(|e| e.into_inner()) = Some(document);
    }

    fn request_print(&self) {
        let Some(document) = self
            .document
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        else {
            log::warn!("print requested with nothing attached");
            return;
        };
        if self.printing.swap(true, Ordering::SeqCst) {
            log::warn!("print requested while a job is running");
            return;
        }

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self.dir.join(format!("{}-{timestamp}.txt", document.file_stem()));
        let printing = Arc::clone(&self.printing);
        let finished = Arc::clone(&self.finished);

        self.runtime.spawn(async move {
            tokio::time::sleep(SPOOL_TIME).await;
            let outcome = match tokio::fs::write(&path, document.to_text()).await {
                Ok(()) => {
                    log::info!("printed '{}' to {}", document.title, path.display());
                    Ok(path)
                }
                Err(e) => {
                    log::error!("print to {} failed: {e}", path.display());
                    Err(e.to_string())
                }
            };
            *finished.lock().unwrap_or_else(|e| e.into_inner()) = Some(outcome);
            printing.store(false, Ordering::SeqCst);
        });
    }

    fn is_printing(&self) -> bool {
        self.printing.load(Ordering::SeqCst)
    }
}
