//! Binding the pdfium shared library.
//!
//! `pdfium-render` only provides the Rust side; the actual PDF engine is the
//! platform `libpdfium` loaded at runtime. Resolution order (first match
//! wins):
//!
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing the
//!    platform library (`libpdfium.so`, `libpdfium.dylib`, `pdfium.dll`).
//! 2. The platform library in the current working directory.
//! 3. The system library search path.
//!
//! Nothing is ever downloaded.
//!
//! ## One engine per process
//!
//! pdfium is initialised and torn down process-wide: dropping any `Pdfium`
//! calls `FPDF_DestroyLibrary` for everyone. [`shared_pdfium`] therefore
//! binds exactly once and keeps the instance for the life of the process.
//! Every pipeline borrows it, so concurrent calls never see a teardown.

use crate::error::SetupError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing::{debug, info};

/// Environment variable naming an explicit pdfium library (or its directory).
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

static PDFIUM: OnceLock<Pdfium> = OnceLock::new();
static BIND_LOCK: Mutex<()> = Mutex::new(());

/// The process-wide pdfium engine, bound on first use.
///
/// A failed bind is not cached; a later call tries again (for example after
/// `PDFIUM_LIB_PATH` was fixed).
pub fn shared_pdfium() -> Result<&'static Pdfium, SetupError> {
    if let Some(pdfium) = PDFIUM.get() {
        return Ok(pdfium);
    }

    // Only one thread may bind: a losing second `Pdfium` would be dropped
    // and take the library down with it.
    let _guard = BIND_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(pdfium) = PDFIUM.get() {
        return Ok(pdfium);
    }
    let pdfium = bind_pdfium()?;
    info!("pdfium engine initialised");
    Ok(PDFIUM.get_or_init(|| pdfium))
}

/// Bind to pdfium using the resolution order described in the module docs.
fn bind_pdfium() -> Result<Pdfium, SetupError> {
    let mut attempts: Vec<String> = Vec::new();

    if let Ok(raw) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !raw.is_empty() {
            let candidate = library_file(Path::new(&raw));
            match bind_pdfium_from_path(&candidate) {
                Ok(pdfium) => return Ok(pdfium),
                Err(e) => attempts.push(format!("{PDFIUM_LIB_PATH_ENV}: {e}")),
            }
        }
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    if local.exists() {
        match bind_pdfium_from_path(&local) {
            Ok(pdfium) => return Ok(pdfium),
            Err(e) => attempts.push(format!("working directory: {e}")),
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound pdfium from system library path");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            attempts.push(format!("system library: {e:?}"));
            Err(SetupError::PdfiumBindingFailed(attempts.join("; ")))
        }
    }
}

/// Bind to a pdfium library at an explicit `path`.
fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, SetupError> {
    let bindings = Pdfium::bind_to_library(path).map_err(|e| {
        SetupError::PdfiumBindingFailed(format!("'{}': {e:?}", path.display()))
    })?;
    debug!("Bound pdfium from {}", path.display());
    Ok(Pdfium::new(bindings))
}

/// Directories are expanded to the platform library file inside them.
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}
