#![forbid(unsafe_code)]

//! File-system host for the native bridge.
//!
//! [`FsBridge`] answers the bridge commands against the local file system.
//! Choosing paths and revealing files are delegated to a [`FileDialog`], so
//! a desktop shell plugs in its native dialogs and tests plug in a script.
//!
//! Host failures are reported as [`BridgeError::Failed`] carrying the
//! user-facing message (`Failed to read file: ...`). A dialog closed without
//! a choice answers `null`.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use quire_text::{DEFAULT_FILE_NAME, FileType, html_to_text, text_to_html};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::bridge::{NativeBridge, OPEN_FILE, OPEN_FILE_LOCATION, SAVE_FILE, SAVE_FILE_AS};
use crate::config::DialogConfig;
use crate::error::BridgeError;

/// A named group of extensions offered by a file dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

impl DialogFilter {
    /// Filter matching a single document type.
    #[must_use]
    pub const fn for_type(file_type: FileType) -> Self {
        Self {
            name: file_type.filter_name(),
            extensions: match file_type {
                FileType::Html => &["html"],
                FileType::Txt => &["txt"],
            },
        }
    }
}

/// Filters of the open dialog, in display order.
pub const OPEN_FILTERS: [DialogFilter; 3] = [
    DialogFilter {
        name: "All Supported",
        extensions: &["html", "txt"],
    },
    DialogFilter::for_type(FileType::Html),
    DialogFilter::for_type(FileType::Txt),
];

/// Native file dialogs. `None` means the user closed the dialog.
pub trait FileDialog {
    fn pick_file(&self, filters: &[DialogFilter]) -> Option<PathBuf>;
    fn save_file(&self, filter: &DialogFilter, default_name: &str) -> Option<PathBuf>;

    /// Show `path` selected in the system file manager.
    fn reveal(&self, path: &Path) -> Result<(), String> {
        reveal_in_file_manager(path)
    }
}

/// Spawn the platform file manager with `path` selected. On Linux the
/// common managers are tried in turn, then the parent folder is opened.
pub fn reveal_in_file_manager(path: &Path) -> Result<(), String> {
    let target = path.as_os_str();
    if cfg!(target_os = "windows") {
        let mut select = OsString::from("/select,");
        select.push(target);
        return spawn("explorer", &[select.as_os_str()])
            .map_err(|e| format!("Failed to open and select file: {e}"));
    }
    if cfg!(target_os = "macos") {
        return spawn("open", &[OsStr::new("-R"), target])
            .map_err(|e| format!("Failed to open and select file: {e}"));
    }
    for manager in ["nautilus", "dolphin", "thunar", "nemo"] {
        if spawn(manager, &[OsStr::new("--select"), target]).is_ok() {
            debug!(manager, path = %path.display(), "revealed in file manager");
            return Ok(());
        }
    }
    let parent = path
        .parent()
        .ok_or_else(|| "Could not get parent directory".to_string())?;
    spawn("xdg-open", &[parent.as_os_str()]).map_err(|e| format!("Failed to open folder: {e}"))
}

fn spawn(program: &str, args: &[&OsStr]) -> std::io::Result<()> {
    Command::new(program).args(args).spawn().map(drop)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveFileArgs {
    content: String,
    file_path: String,
    file_type: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileLocationArgs {
    file_path: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveFileAsArgs {
    content: String,
    file_type: String,
}

type HostResult = Result<Value, String>;

/// Bridge host reading and writing local files.
#[derive(Debug, Clone)]
pub struct FsBridge<D> {
    dialog: D,
    default_stem: String,
}

impl<D: FileDialog> FsBridge<D> {
    #[must_use]
    pub fn new(dialog: D) -> Self {
        Self::with_config(dialog, &DialogConfig::default())
    }

    #[must_use]
    pub fn with_config(dialog: D, config: &DialogConfig) -> Self {
        Self {
            dialog,
            default_stem: config.default_save_stem.clone(),
        }
    }

    #[must_use]
    pub fn dialog(&self) -> &D {
        &self.dialog
    }

    fn open_file(&self) -> HostResult {
        let Some(path) = self.dialog.pick_file(&OPEN_FILTERS) else {
            debug!("open dialog closed");
            return Ok(Value::Null);
        };
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read file: {e}"))?;
        let path_str = path.to_string_lossy().into_owned();
        let content = match FileType::from_path(&path_str) {
            FileType::Txt => text_to_html(&raw),
            FileType::Html => raw,
        };
        info!(path = %path.display(), bytes = content.len(), "file opened");
        Ok(json!({
            "content": content,
            "file_path": path_str,
            "file_name": file_name_of(&path),
        }))
    }

    fn save_file(&self, args: Value) -> HostResult {
        let args: SaveFileArgs = parse_args(args)?;
        if args.file_path.is_empty() {
            return Err("No file path provided".to_string());
        }
        let content = convert_for(&args.file_type, args.content)?;
        let path = PathBuf::from(&args.file_path);
        write(&path, &content)?;
        Ok(Value::String(format!(
            "File saved successfully: {}",
            path.display()
        )))
    }

    fn save_file_as(&self, args: Value) -> HostResult {
        let args: SaveFileAsArgs = parse_args(args)?;
        let content = convert_for(&args.file_type, args.content)?;
        let file_type = FileType::from_extension(&args.file_type);
        let default_name = format!("{}.{}", self.default_stem, file_type.extension());
        let Some(path) = self
            .dialog
            .save_file(&DialogFilter::for_type(file_type), &default_name)
        else {
            debug!("save dialog closed");
            return Ok(Value::Null);
        };
        write(&path, &content)?;
        Ok(json!({
            "file_path": path.to_string_lossy(),
            "file_name": file_name_of(&path),
        }))
    }

    fn open_file_location(&self, args: Value) -> HostResult {
        let args: FileLocationArgs = parse_args(args)?;
        if args.file_path.is_empty() {
            return Err("No file path provided".to_string());
        }
        self.dialog.reveal(Path::new(&args.file_path))?;
        Ok(Value::Null)
    }
}

impl<D: FileDialog> NativeBridge for FsBridge<D> {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BridgeError> {
        let result = match command {
            OPEN_FILE => self.open_file(),
            SAVE_FILE => self.save_file(args),
            SAVE_FILE_AS => self.save_file_as(args),
            OPEN_FILE_LOCATION => self.open_file_location(args),
            other => Err(format!("Unknown command: {other}")),
        };
        result.map_err(|message| {
            warn!(command, %message, "host command failed");
            BridgeError::failed(command, message)
        })
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(args: Value) -> Result<T, String> {
    serde_json::from_value(args).map_err(|e| format!("Invalid arguments: {e}"))
}

/// Content as written for the wire type name; only `html` and `txt` exist.
fn convert_for(file_type: &str, content: String) -> Result<String, String> {
    match file_type {
        "html" => Ok(content),
        "txt" => Ok(html_to_text(&content)),
        _ => Err("Unsupported file type".to_string()),
    }
}

fn write(path: &Path, content: &str) -> Result<(), String> {
    std::fs::write(path, content).map_err(|e| format!("Failed to save file: {e}"))?;
    info!(path = %path.display(), bytes = content.len(), "file written");
    Ok(())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string()
}
