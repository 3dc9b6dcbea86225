//! Serial device enumeration.
//!
//! No serial communication happens in this crate, so "enumeration" is simply
//! a prefix filter over the platform's device directory listing. The filter
//! is split out as a pure function so it can be exercised against simulated
//! listings.

use std::{fs, io, path::Path};

/// Device-file name prefixes of USB serial adapters on macOS.
#[cfg(target_os = "macos")]
pub const SERIAL_PORT_PREFIXES: &[&str] =
    &["cu.usbserial", "cu.usbmodem", "tty.usbserial", "tty.usbmodem"];

/// Device-file name prefixes of USB serial adapters (USB-UART bridges and
/// CDC-ACM devices) on Linux.
#[cfg(not(target_os = "macos"))]
pub const SERIAL_PORT_PREFIXES: &[&str] = &["ttyUSB", "ttyACM"];

/// Whether a device-file name looks like a USB serial port.
pub fn is_serial_port(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| name.starts_with(prefix))
}

/// Filters a device-directory listing down to serial-port candidates,
/// sorted by name so the menu is stable across runs.
pub fn filter_ports(names: impl IntoIterator<Item = String>, prefixes: &[&str]) -> Vec<String> {
    let mut ports: Vec<String> = names
        .into_iter()
        .filter(|name| is_serial_port(name, prefixes))
        .collect();
    ports.sort();
    ports
}

/// Enumerates serial-port candidates under the device directory.
pub fn list_ports(device_dir: &Path, prefixes: &[&str]) -> io::Result<Vec<String>> {
    let names = fs::read_dir(device_dir)?
        .filter_map(|entry| Some(entry.ok()?.file_name().to_string_lossy().into_owned()));

    Ok(filter_ports(names, prefixes))
}
