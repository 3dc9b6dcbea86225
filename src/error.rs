//! Application errors and their process exit codes.

use std::{io, path::PathBuf};

use miette::Diagnostic;
use strum::VariantNames;
use thiserror::Error;

use crate::firmware::FlashSize;

/// All failure modes of the flashing workflow.
///
/// Every variant carries the guidance shown to the user, and
/// [`Error::exit_code`] keeps the whole exit-code policy in one place.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("`{0}` is not installed")]
    #[diagnostic(
        code(espwiz::tool_not_installed),
        help("Install esptool first:\n  Debian: sudo apt install esptool\n  macOS: brew install esptool\n  pip: pip install esptool")
    )]
    ToolNotInstalled(String),

    #[error("No firmware images found in '{0}'")]
    #[diagnostic(
        code(espwiz::no_firmware),
        help("Restore the firmwares folder from the place you downloaded this tool from")
    )]
    NoFirmwareFound(PathBuf),

    #[error("The firmware image '{0}' does not exist")]
    #[diagnostic(
        code(espwiz::firmware_image_missing),
        help("Restore the firmwares folder from the place you downloaded this tool from")
    )]
    FirmwareImageMissing(PathBuf),

    #[error("esptool could not read the firmware image")]
    #[diagnostic(
        code(espwiz::firmware_assets_lost),
        help("Restore the firmwares folder from the place you downloaded this tool from")
    )]
    FirmwareAssetsLost,

    #[error("Could not determine the flash size of the connected device from:\n{output}")]
    #[diagnostic(
        code(espwiz::unknown_flash_size),
        help("Expected flash_id to report one of: {}", FlashSize::VARIANTS.join(", "))
    )]
    UnknownFlashSize { output: String },

    #[error("Connection to the device was lost (esptool exited with code {code})")]
    #[diagnostic(
        code(espwiz::connection_lost),
        help("Reconnect your board and relaunch")
    )]
    ConnectionLost { code: i32 },

    #[error("esptool exited with code {code}:\n{stderr}")]
    #[diagnostic(code(espwiz::tool_failed))]
    ToolFailed { code: i32, stderr: String },

    #[error("Operation was cancelled by the user")]
    #[diagnostic(code(espwiz::cancelled))]
    Cancelled,

    #[error(transparent)]
    #[diagnostic(code(espwiz::io))]
    Io(#[from] io::Error),
}

impl Error {
    /// Process exit status used when this error terminates the run.
    ///
    /// 2 for lost firmware assets, 76 for a missing esptool, 130 for
    /// cancellation, and esptool's own code when the tool itself failed.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::ToolNotInstalled(_) => 76,
            Error::NoFirmwareFound(_)
            | Error::FirmwareImageMissing(_)
            | Error::FirmwareAssetsLost => 2,
            Error::ConnectionLost { code } | Error::ToolFailed { code, .. } => {
                u8::try_from(*code).unwrap_or(1)
            }
            Error::Cancelled => 130,
            Error::UnknownFlashSize { .. } | Error::Io(_) => 1,
        }
    }
}
