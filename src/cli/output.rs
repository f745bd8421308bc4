//! Colored terminal output
//!
//! `colored` honors NO_COLOR, CLICOLOR and CLICOLOR_FORCE. Diagnostics go to
//! stderr; everything meant for pipes goes to stdout.

use std::fmt::Display;

use colored::{ColoredString, Colorize};

pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

/// Green checkmark line, e.g. after a save
pub fn success(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// `Label: message` with a green label
pub fn action(label: &str, msg: &(impl Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

pub fn header(msg: &(impl Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Indented, uncolored
pub fn detail(msg: &(impl Display + ?Sized)) {
    println!("  {}", msg);
}

/// Raw stdout line for JSON and trees
pub fn info(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}

/// Badge for chart listings.
pub fn visibility(is_public: bool) -> ColoredString {
    if is_public {
        "public".green()
    } else {
        "private".dimmed()
    }
}
