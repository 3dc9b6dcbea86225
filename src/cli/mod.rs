//! The interactive flashing workflow.
//!
//! Strictly sequential: tool-presence check, firmware inventory, port
//! selection, firmware selection (with flash-size resolution where needed),
//! flash write. Each step blocks until it completes and nothing is held open
//! across steps.

use std::io::{self, BufRead};

use crossterm::style::Stylize;
use log::debug;

use crate::{
    config::Config,
    error::Error,
    esptool::EspTool,
    firmware::{self, FirmwareEntry},
    serial,
};

pub mod prompt;

/// Runs the whole workflow once.
pub fn run(config: &Config) -> Result<(), Error> {
    let tool = EspTool::new(&config.esptool);
    if !tool.is_installed() {
        return Err(Error::ToolNotInstalled(config.esptool.clone()));
    }

    // Validate the firmware inventory up front, so a lost assets folder is
    // reported before the user is asked to plug anything in.
    let firmwares = firmware::list_entries(&config.firmware_dir)?;

    let port = select_port(config)?;
    let entry = select_firmware(&firmwares)?;

    let device = config.port_path(&port);
    let image = firmware::resolve_image(&tool, &device, entry)?;

    println!();
    println!(
        "Flashing {} to {}",
        image.display().to_string().bold(),
        device.display().to_string().bold()
    );
    tool.write_flash(&device, &image)?;

    println!();
    println!("{}", "Firmware update was successful.".bold());
    Ok(())
}

/// Lets the user pick a serial port, waiting for one to show up if the
/// device directory has no candidates yet.
fn select_port(config: &Config) -> Result<String, Error> {
    let mut ports = serial::list_ports(&config.device_dir, config.port_prefixes)?;
    while ports.is_empty() {
        println!("No serial ports found. Plug in your Espressif device, then press Enter.");
        pause()?;
        ports = serial::list_ports(&config.device_dir, config.port_prefixes)?;
    }

    debug!("{} serial port candidate(s)", ports.len());

    println!();
    println!("Available serial ports:");
    let index = prompt::select_index("port", &ports)?;
    Ok(ports.remove(index))
}

/// Lets the user pick a firmware entry from the inventory.
fn select_firmware(firmwares: &[FirmwareEntry]) -> Result<&FirmwareEntry, Error> {
    let names: Vec<String> = firmwares.iter().map(|entry| entry.name.clone()).collect();

    println!();
    println!("Available firmwares:");
    let index = prompt::select_index("firmware", &names)?;
    Ok(&firmwares[index])
}

/// Blocks until the user presses Enter. EOF on stdin counts as cancellation,
/// so a detached run cannot spin in the no-ports retry loop.
fn pause() -> Result<(), Error> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Final pause so the terminal window does not vanish with the verdict when
/// the tool is launched from a file manager. Errors are ignored, the process
/// is about to terminate anyway.
pub fn pause_before_exit() {
    println!("Press Enter to exit.");
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
