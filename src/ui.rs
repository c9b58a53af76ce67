//! Terminal output helpers. Every file-sync transition is reported as a
//! right-aligned status word followed by the artifact path, so repeated
//! runs line up column-for-column.

use colored::{ColoredString, Colorize};

// pad before coloring: escape codes must not count against the width
fn pad(word: &str) -> String {
    format!("{word:>11}")
}

fn line(word: &ColoredString, name: &str) {
    println!("{word}  {name}");
}

pub fn create(name: &str) {
    line(&pad("create").green().bold(), name);
}

pub fn identical(name: &str) {
    line(&pad("identical").blue().bold(), name);
}

pub fn conflict(name: &str) {
    line(&pad("conflict").red().bold(), name);
}

pub fn force(name: &str) {
    line(&pad("force").yellow().bold(), name);
}

pub fn skip(name: &str) {
    line(&pad("skip").yellow().bold(), name);
}

pub fn exist(name: &str) {
    line(&pad("exist").red().bold(), name);
}

pub fn remove(name: &str) {
    line(&pad("remove").yellow().bold(), name);
}

pub fn mkdir(name: &str) {
    line(&pad("mkdir").green().bold(), name);
}

pub fn update(name: &str) {
    line(&pad("update").green().bold(), name);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}
