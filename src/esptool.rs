//! Subprocess wrapper around the external esptool executable.
//!
//! Every invocation is synchronous and fully reaped before the next step of
//! the workflow runs. Captured invocations (version check, flash-size query)
//! keep their output for parsing; the flash write streams its stdout straight
//! to the terminal so the user sees esptool's live progress.

use std::{
    path::Path,
    process::{Command, Stdio},
};

use log::debug;

use crate::{
    error::Error,
    firmware::{self, FlashSize},
};

/// Flash start address used for full-image writes.
const WRITE_FLASH_ADDR: &str = "0x0000";

/// Exit codes esptool is known to use when the serial connection drops.
const CONNECTION_LOST_CODES: &[i32] = &[1, 5];

/// Exit code esptool uses when an input file cannot be read.
const MISSING_ASSET_CODE: i32 = 2;

/// Handle to the external esptool executable.
pub struct EspTool {
    command: String,
}

impl EspTool {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Runs `esptool version` and reports whether the tool is usable.
    ///
    /// A tool that cannot be located or launched is simply absent, not an
    /// error: the caller prints installation guidance and exits cleanly.
    pub fn is_installed(&self) -> bool {
        let output = match Command::new(&self.command).arg("version").output() {
            Ok(output) => output,
            Err(err) => {
                debug!("failed to launch `{} version`: {err}", self.command);
                return false;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        output.status.success() || stdout.contains("esptool")
    }

    /// Queries the connected device for its flash size via `flash_id`.
    pub fn detect_flash_size(&self, port: &Path) -> Result<FlashSize, Error> {
        debug!("querying flash size on {}", port.display());

        let output = Command::new(&self.command)
            .arg("--port")
            .arg(port)
            .arg("flash_id")
            .output()?;

        if !output.status.success() {
            return Err(classify_failure(
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        firmware::parse_flash_size(&stdout).ok_or_else(|| Error::UnknownFlashSize {
            output: stdout.trim().to_string(),
        })
    }

    /// Writes the firmware image to the device, starting at address 0.
    ///
    /// This reprograms the connected board; there is no rollback. stdout is
    /// inherited so esptool's progress output reaches the terminal live,
    /// while stderr is captured for the error taxonomy.
    pub fn write_flash(&self, port: &Path, image: &Path) -> Result<(), Error> {
        debug!(
            "running `{} --port {} write_flash {WRITE_FLASH_ADDR} {}`",
            self.command,
            port.display(),
            image.display()
        );

        let child = Command::new(&self.command)
            .arg("--port")
            .arg(port)
            .arg("write_flash")
            .arg(WRITE_FLASH_ADDR)
            .arg(image)
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()?;

        let output = child.wait_with_output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(classify_failure(
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
            ))
        }
    }
}

/// Maps a failed esptool exit status to the error taxonomy.
///
/// Codes 1 and 5 both mean the serial connection dropped, 2 means esptool
/// could not read one of its input files, and anything else is passed
/// through with the tool's own diagnostic text.
pub fn classify_failure(code: Option<i32>, stderr: &str) -> Error {
    let code = match code {
        Some(code) => code,
        // Killed by a signal: no code to translate, treat it like a dropped
        // connection so the user gets reconnection guidance.
        None => return Error::ConnectionLost { code: 1 },
    };

    if CONNECTION_LOST_CODES.contains(&code) {
        Error::ConnectionLost { code }
    } else if code == MISSING_ASSET_CODE {
        Error::FirmwareAssetsLost
    } else {
        Error::ToolFailed {
            code,
            stderr: stderr.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_codes_map_to_reconnection_guidance() {
        assert!(matches!(
            classify_failure(Some(1), ""),
            Error::ConnectionLost { code: 1 }
        ));
        assert!(matches!(
            classify_failure(Some(5), ""),
            Error::ConnectionLost { code: 5 }
        ));

        let message = classify_failure(Some(5), "").to_string();
        assert!(message.contains("Connection to the device was lost"));
    }

    #[test]
    fn missing_asset_code_maps_to_restore_guidance() {
        assert!(matches!(
            classify_failure(Some(2), ""),
            Error::FirmwareAssetsLost
        ));
    }

    #[test]
    fn other_codes_pass_through_the_tool_diagnostics() {
        let err = classify_failure(Some(9), "A fatal error occurred: MD5 mismatch\n");
        match err {
            Error::ToolFailed { code, stderr } => {
                assert_eq!(code, 9);
                assert_eq!(stderr, "A fatal error occurred: MD5 mismatch");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn signal_termination_reads_as_lost_connection() {
        assert!(matches!(
            classify_failure(None, ""),
            Error::ConnectionLost { code: 1 }
        ));
    }

    #[test]
    fn unlaunchable_tool_is_not_installed() {
        assert!(!EspTool::new("espwiz-definitely-no-such-tool").is_installed());
    }
}
