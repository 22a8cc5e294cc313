use crate::dispatcher::ShellSummary;
use crate::error::Result;
use colored::Colorize;
use console::{measure_text_width, Term};

const TOTAL_WIDTH: usize = 77;

pub(crate) fn clear_terminal() -> Result<()> {
    Term::stdout().clear_screen()?;
    Ok(())
}

pub(crate) fn print_header(name: &str) {
    let rule = format!(" {}", "=".repeat(TOTAL_WIDTH - 1));
    let title = format!("{} Console", name);
    let padding = TOTAL_WIDTH.saturating_sub(measure_text_width(&title)) / 2;

    println!(
        "{}\n{}{}\n{}",
        rule.green().bold(),
        " ".repeat(padding),
        title.bold(),
        rule.green().bold(),
    );
}

fn boxed(line: &str) -> String {
    let visible_width = measure_text_width(line);
    let padding = TOTAL_WIDTH.saturating_sub(visible_width + 2);
    format!("│ {}{} │", line, " ".repeat(padding))
}

/// One row per registered shell, followed by the REPL builtins.
pub(crate) fn menu_lines(shells: &[ShellSummary]) -> Vec<String> {
    let arrow = "  ";
    let width = shells
        .iter()
        .map(|shell| shell.name.len())
        .chain(["clear".len(), "exit".len()])
        .max()
        .unwrap_or_default()
        + 4;

    let mut lines: Vec<String> = shells
        .iter()
        .map(|shell| {
            let description = shell.description.clone().unwrap_or_default();
            format!(
                "{}{}{}{}",
                arrow,
                shell.name.green(),
                " ".repeat(width - shell.name.len()),
                description.white()
            )
        })
        .collect();

    for (builtin, description) in [
        ("clear", "Clear the terminal window"),
        ("exit", "Leave the console"),
    ] {
        lines.push(format!(
            "{}{}{}{}",
            arrow,
            builtin.green(),
            " ".repeat(width - builtin.len()),
            description.white()
        ));
    }
    lines
}

pub(crate) fn print_menu(shells: &[ShellSummary]) {
    let title = format!(" {} ", "Home".bold());
    let side = TOTAL_WIDTH.saturating_sub(measure_text_width(&title)) / 2;
    let rest = TOTAL_WIDTH.saturating_sub(measure_text_width(&title) + side);

    println!("\n╭{}{}{}╮", "─".repeat(side), title, "─".repeat(rest));
    println!("{}", boxed(""));
    println!("{}", boxed(&"Commands:".bold().to_string()));

    for line in menu_lines(shells) {
        println!("{}", boxed(&line));
    }
    println!("{}", boxed(""));
    println!("╰{}╯", "─".repeat(TOTAL_WIDTH));
}
