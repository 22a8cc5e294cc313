use chrono::Local;
use colored::Colorize;
use reedline::{Prompt, PromptEditMode, PromptHistorySearch};
use std::borrow::Cow;

#[derive(Debug)]
pub struct ShellPrompt {
    name: String,
}

impl ShellPrompt {
    pub fn new(name: &str) -> Self {
        ShellPrompt {
            name: name.to_string(),
        }
    }

    fn render(&self) -> String {
        let current_time = Local::now().format("%H:%M:%S").to_string();

        let shell_label = format!(" {}", self.name).cyan();
        let time_label = format!("| {}", current_time);
        let arrow = "\n => ".bright_magenta();

        format!("{} {} {}", shell_label, time_label, arrow)
    }
}

impl Prompt for ShellPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(self.render())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("::: ")
    }

    fn render_prompt_history_search_indicator(&self, _mode: PromptHistorySearch) -> Cow<'_, str> {
        Cow::Borrowed("(search)> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_the_app() {
        let prompt = ShellPrompt::new("Acme");
        let rendered = prompt.render_prompt_left();
        assert!(rendered.contains("Acme"));
        assert!(rendered.contains("=>"));
    }
}
