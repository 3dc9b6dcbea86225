//! Numbered-menu prompts.

use dialoguer::{theme::ColorfulTheme, Input};

use crate::error::Error;

/// Validates a menu selection entered by the user.
///
/// Accepts a base-10 non-negative integer strictly below `count`; everything
/// else (including signs, decimals and surrounding garbage) is rejected with
/// the message shown to the user.
pub fn parse_selection(input: &str, count: usize) -> Result<usize, String> {
    let index = input
        .trim()
        .parse::<usize>()
        .map_err(|_| "Print a correct number.".to_string())?;

    if index < count {
        Ok(index)
    } else if count == 0 {
        Err("Print a correct number.".to_string())
    } else {
        Err(format!("Print a number between 0 and {}.", count - 1))
    }
}

/// Prints a numbered menu and reads a selection, reprompting until the input
/// is a valid index. A failed read (closed stdin, terminal interrupt inside
/// the prompt) counts as cancellation.
pub fn select_index(what: &str, items: &[String]) -> Result<usize, Error> {
    for (index, item) in items.iter().enumerate() {
        println!("{index} {item}");
    }

    loop {
        let input: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Choose your {what} by number"))
            .interact_text()
            .map_err(|_| Error::Cancelled)?;

        match parse_selection(&input, items.len()) {
            Ok(index) => return Ok(index),
            Err(message) => println!("{message}"),
        }
    }
}
