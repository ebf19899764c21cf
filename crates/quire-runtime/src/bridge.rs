#![forbid(unsafe_code)]

//! Native bridge: the channel through which file-system access is requested.
//!
//! A host implements [`NativeBridge`], a single opaque async call with JSON
//! arguments and results. [`BridgeClient`] layers the three typed commands
//! on top of it and validates responses:
//!
//! | command        | arguments                          | result                          |
//! |----------------|------------------------------------|---------------------------------|
//! | `open_file`    | none                               | `{content, file_path?, file_name?}` or `null` |
//! | `save_file`    | `{content, filePath, fileType}`    | anything                        |
//! | `save_file_as` | `{content, fileType}`              | `{file_path, file_name}` or `null` |
//! | `open_file_location` | `{filePath}`                 | anything                        |
//!
//! `null` means the user cancelled the native dialog.

use std::rc::Rc;

use quire_text::FileType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::BridgeError;

pub const OPEN_FILE: &str = "open_file";
pub const SAVE_FILE: &str = "save_file";
pub const SAVE_FILE_AS: &str = "save_file_as";
pub const OPEN_FILE_LOCATION: &str = "open_file_location";

/// Host side of the bridge.
#[allow(async_fn_in_trait)]
pub trait NativeBridge {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BridgeError>;
}

impl<B: NativeBridge> NativeBridge for Rc<B> {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BridgeError> {
        (**self).invoke(command, args).await
    }
}

/// A file picked through the open dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenedFile {
    /// Content as HTML; text files arrive already converted.
    pub content: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Location chosen in the save dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFile {
    pub file_path: String,
    pub file_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveFileArgs<'a> {
    content: &'a str,
    file_path: &'a str,
    file_type: FileType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileLocationArgs<'a> {
    file_path: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveFileAsArgs<'a> {
    content: &'a str,
    file_type: FileType,
}

/// Typed commands over a [`NativeBridge`].
#[derive(Debug, Clone)]
pub struct BridgeClient<B> {
    bridge: B,
}

impl<B: NativeBridge> BridgeClient<B> {
    #[must_use]
    pub fn new(bridge: B) -> Self {
        Self { bridge }
    }

    #[must_use]
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Ask the user for a file and read it. `None` when cancelled.
    pub async fn open_file(&self) -> Result<Option<OpenedFile>, BridgeError> {
        let value = self.call(OPEN_FILE, Value::Null).await?;
        if value.is_null() {
            debug!("open dialog cancelled");
            return Ok(None);
        }
        if !value.get("content").is_some_and(Value::is_string) {
            return Err(BridgeError::invalid(OPEN_FILE, "missing string field `content`"));
        }
        decode(OPEN_FILE, value).map(Some)
    }

    /// Write `content` to an existing location.
    pub async fn save_file(
        &self,
        content: &str,
        file_path: &str,
        file_type: FileType,
    ) -> Result<(), BridgeError> {
        let args = encode(
            SAVE_FILE,
            &SaveFileArgs {
                content,
                file_path,
                file_type,
            },
        )?;
        let reply = self.call(SAVE_FILE, args).await?;
        trace!(?reply, "save_file reply");
        Ok(())
    }

    /// Ask for a location and write `content` there. `None` when cancelled.
    pub async fn save_file_as(
        &self,
        content: &str,
        file_type: FileType,
    ) -> Result<Option<SavedFile>, BridgeError> {
        let args = encode(SAVE_FILE_AS, &SaveFileAsArgs { content, file_type })?;
        let value = self.call(SAVE_FILE_AS, args).await?;
        if value.is_null() {
            debug!("save dialog cancelled");
            return Ok(None);
        }
        decode(SAVE_FILE_AS, value).map(Some)
    }

    /// Show a file in the system file manager.
    pub async fn open_file_location(&self, file_path: &str) -> Result<(), BridgeError> {
        let args = encode(OPEN_FILE_LOCATION, &FileLocationArgs { file_path })?;
        self.call(OPEN_FILE_LOCATION, args).await.map(drop)
    }

    async fn call(&self, command: &str, args: Value) -> Result<Value, BridgeError> {
        debug!(command, "bridge call");
        self.bridge.invoke(command, args).await
    }
}

fn encode<T: Serialize>(command: &str, args: &T) -> Result<Value, BridgeError> {
    serde_json::to_value(args).map_err(|source| BridgeError::Serialize {
        command: command.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(command: &str, value: Value) -> Result<T, BridgeError> {
    serde_json::from_value(value).map_err(|err| BridgeError::invalid(command, err.to_string()))
}
