//! Firmware inventory and flash-size variant resolution.
//!
//! The firmware directory contains either ready-to-flash `.bin` images or
//! directories representing a firmware family with one image per flash size
//! (`2MB.bin`, `4MB.bin`, ...). Picking the right family member requires
//! asking the connected device for its flash size first.

use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    sync::OnceLock,
};

use log::debug;
use regex::Regex;
use strum::{Display, EnumString, VariantNames};

use crate::{error::Error, esptool::EspTool};

/// A single entry in the firmware directory: either a ready-to-flash image
/// file or a firmware family directory holding one image per flash size.
#[derive(Clone, Debug)]
pub struct FirmwareEntry {
    /// File name shown in the selection menu.
    pub name: String,
    /// Full path of the entry.
    pub path: PathBuf,
}

/// Flash sizes reported by `esptool flash_id` for ESP8266 modules.
///
/// The string form doubles as the variant file stem inside a firmware family
/// directory (`4MB` selects `4MB.bin`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Display, EnumString, VariantNames)]
#[non_exhaustive]
pub enum FlashSize {
    /// 1 MB
    #[strum(serialize = "1MB")]
    _1Mb,
    /// 2 MB
    #[strum(serialize = "2MB")]
    _2Mb,
    /// 4 MB
    #[strum(serialize = "4MB")]
    _4Mb,
    /// 8 MB
    #[strum(serialize = "8MB")]
    _8Mb,
    /// 16 MB
    #[strum(serialize = "16MB")]
    _16Mb,
}

/// Lists the firmware directory, sorted by name.
///
/// An empty or missing directory is fatal: without any images there is
/// nothing to flash, and the user needs to restore the assets rather than
/// plug in a device.
pub fn list_entries(dir: &Path) -> Result<Vec<FirmwareEntry>, Error> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::NoFirmwareFound(dir.to_path_buf()))
        }
        Err(err) => return Err(err.into()),
    };

    let mut entries: Vec<FirmwareEntry> = read
        .filter_map(|entry| {
            let entry = entry.ok()?;
            Some(FirmwareEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
            })
        })
        .collect();

    if entries.is_empty() {
        return Err(Error::NoFirmwareFound(dir.to_path_buf()));
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Extracts the flash-size label from esptool's `flash_id` output.
///
/// esptool prints a line of the form `Detected flash size: 4MB`; anything
/// without a recognized `<n>MB` label yields `None`.
pub fn parse_flash_size(output: &str) -> Option<FlashSize> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"\d+MB").expect("valid regex"));

    let label = pattern.find(output)?.as_str();
    FlashSize::from_str(label).ok()
}

/// Path of the sized variant image inside a firmware family directory.
pub fn variant_path(family_dir: &Path, size: FlashSize) -> PathBuf {
    family_dir.join(format!("{size}.bin"))
}

/// Resolves the concrete image file for a chosen entry.
///
/// A plain file is used as-is. A firmware family directory requires exactly
/// one flash-size query against the device to pick the sized variant. Either
/// way the resolved path must exist before it is handed to esptool.
pub fn resolve_image(
    tool: &EspTool,
    port: &Path,
    entry: &FirmwareEntry,
) -> Result<PathBuf, Error> {
    let path = if entry.path.is_dir() {
        let size = tool.detect_flash_size(port)?;
        println!("Detected flash size: {size}");
        variant_path(&entry.path, size)
    } else {
        entry.path.clone()
    };

    debug!("resolved firmware image: {}", path.display());

    if !path.is_file() {
        return Err(Error::FirmwareImageMissing(path));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flash_size_from_flash_id_output() {
        let output = "Manufacturer: ef\nDevice: 4016\nDetected flash size: 4MB\nHard resetting...";
        assert_eq!(parse_flash_size(output), Some(FlashSize::_4Mb));

        assert_eq!(
            parse_flash_size("Detected flash size: 16MB"),
            Some(FlashSize::_16Mb)
        );
    }

    #[test]
    fn unrecognized_flash_size_is_none() {
        assert_eq!(parse_flash_size("Detected flash size: 32MB"), None);
        assert_eq!(parse_flash_size("Serial port /dev/ttyUSB0"), None);
        assert_eq!(parse_flash_size(""), None);
    }

    #[test]
    fn flash_size_labels_round_trip() {
        assert_eq!(FlashSize::_2Mb.to_string(), "2MB");
        assert_eq!("2MB".parse::<FlashSize>().unwrap(), FlashSize::_2Mb);
    }

    #[test]
    fn variant_path_appends_label_and_extension() {
        let path = variant_path(Path::new("firmwares/espruino_v2.06"), FlashSize::_2Mb);
        assert_eq!(path, PathBuf::from("firmwares/espruino_v2.06/2MB.bin"));
    }

    #[test]
    fn empty_firmware_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();

        let err = list_entries(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NoFirmwareFound(_)));
    }

    #[test]
    fn missing_firmware_dir_is_fatal() {
        let err = list_entries(Path::new("definitely/not/a/real/dir")).unwrap_err();
        assert!(matches!(err, Error::NoFirmwareFound(_)));
    }

    #[test]
    fn entries_are_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["espruino.bin", "at_commands.bin", "micropython.bin"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let names: Vec<String> = list_entries(dir.path())
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(
            names,
            ["at_commands.bin", "espruino.bin", "micropython.bin"]
        );
    }

    #[test]
    fn plain_file_resolves_without_flash_query() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("at_commands.bin");
        fs::write(&image, b"\xe9").unwrap();

        let entry = FirmwareEntry {
            name: "at_commands.bin".into(),
            path: image.clone(),
        };

        // The tool name does not resolve to anything runnable; a flash-size
        // query would therefore fail, proving none is issued for plain files.
        let tool = EspTool::new("espwiz-no-such-tool");
        let resolved = resolve_image(&tool, Path::new("/dev/ttyUSB0"), &entry).unwrap();
        assert_eq!(resolved, image);
    }

    #[cfg(unix)]
    #[test]
    fn family_directory_resolves_sized_variant() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let calls = dir.path().join("calls");
        let fake_tool = dir.path().join("esptool");
        fs::write(
            &fake_tool,
            format!(
                "#!/bin/sh\necho \"$@\" >> {}\necho 'Detected flash size: 2MB'\n",
                calls.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&fake_tool, fs::Permissions::from_mode(0o755)).unwrap();

        let family = dir.path().join("espruino_v2.06");
        fs::create_dir(&family).unwrap();
        fs::write(family.join("2MB.bin"), b"\xe9").unwrap();

        let entry = FirmwareEntry {
            name: "espruino_v2.06".into(),
            path: family.clone(),
        };

        let tool = EspTool::new(fake_tool.to_str().unwrap());
        let resolved = resolve_image(&tool, Path::new("/dev/ttyUSB0"), &entry).unwrap();
        assert_eq!(resolved, family.join("2MB.bin"));

        // Exactly one flash-size query was issued.
        let calls = fs::read_to_string(calls).unwrap();
        assert_eq!(calls.lines().count(), 1);
        assert!(calls.contains("flash_id"));
    }

    #[cfg(unix)]
    #[test]
    fn missing_variant_is_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake_tool = dir.path().join("esptool");
        fs::write(&fake_tool, "#!/bin/sh\necho 'Detected flash size: 2MB'\n").unwrap();
        fs::set_permissions(&fake_tool, fs::Permissions::from_mode(0o755)).unwrap();

        let family = dir.path().join("espruino_v2.06");
        fs::create_dir(&family).unwrap();
        fs::write(family.join("4MB.bin"), b"\xe9").unwrap();

        let entry = FirmwareEntry {
            name: "espruino_v2.06".into(),
            path: family,
        };

        let tool = EspTool::new(fake_tool.to_str().unwrap());
        let err = resolve_image(&tool, Path::new("/dev/ttyUSB0"), &entry).unwrap_err();
        assert!(matches!(err, Error::FirmwareImageMissing(_)));
    }
}
