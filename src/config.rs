//! Runtime configuration, resolved once at startup and passed by reference
//! to the components that need it.

use std::{env, path::PathBuf};

use crate::serial;

/// Application configuration.
///
/// All values are fixed for the lifetime of the process. The defaults match
/// the layout the tool is shipped with (a `firmwares/` directory next to the
/// binary, device nodes under `/dev`); the `ESPWIZ_*` environment variables
/// exist so tests and unusual setups can redirect each piece independently.
#[derive(Clone, Debug)]
pub struct Config {
    /// Name or path of the external esptool executable.
    pub esptool: String,
    /// Directory holding the flashable firmware images.
    pub firmware_dir: PathBuf,
    /// Directory enumerated when looking for serial devices.
    pub device_dir: PathBuf,
    /// Device-file name prefixes recognized as serial ports on this platform.
    pub port_prefixes: &'static [&'static str],
}

impl Config {
    /// Resolves the configuration from platform defaults and `ESPWIZ_*`
    /// environment overrides.
    pub fn load() -> Self {
        Self {
            esptool: env::var("ESPWIZ_ESPTOOL").unwrap_or_else(|_| "esptool".into()),
            firmware_dir: env::var_os("ESPWIZ_FIRMWARE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| "firmwares".into()),
            device_dir: env::var_os("ESPWIZ_DEVICE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| "/dev".into()),
            port_prefixes: serial::SERIAL_PORT_PREFIXES,
        }
    }

    /// Full device path passed to esptool for a chosen port name.
    pub fn port_path(&self, port: &str) -> PathBuf {
        self.device_dir.join(port)
    }
}
