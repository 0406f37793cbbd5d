use crate::conversation::{Role, Turn};
use colored::*;
use std::io::Write;

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    println!("{}", "=".repeat(text.chars().count()).bright_cyan());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

pub fn print_prompt(text: &str) {
    print!("{}", text.yellow().bold());
    let _ = std::io::stdout().flush();
}

/// Terminal counterpart of a chat bubble.
pub fn print_turn(turn: &Turn) {
    match turn.role {
        Role::User => println!("{} {}", "You:".green().bold(), turn.content),
        Role::Assistant => println!("{} {}\n", "AI:".bright_blue().bold(), turn.content),
    }
}
