// scenescribe-cli/src/terminal.rs
//
// Styled console output helpers built on the `console` crate. Color is
// applied only when the terminal supports it; the plain text is unchanged
// either way.

use console::style;

/// Prints a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("===== {title} =====")).cyan().bold());
}

/// Prints an indented sub-heading, typically a filename.
pub fn print_subsection(title: &str) {
    println!("{}", style(title).bold());
}

/// Prints an aligned label/value status line; `highlight` bolds the value.
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let value = if highlight {
        style(value).bold().to_string()
    } else {
        value.to_string()
    };
    println!("  {:<14} {value}", format!("{label}:"));
}

pub fn print_success(message: &str) {
    println!("{} {message}", style("[OK]").green());
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", style("[ERROR]").red().bold());
}
