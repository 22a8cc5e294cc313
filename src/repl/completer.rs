use crate::dispatcher::ShellSummary;
use reedline::{Completer, Span, Suggestion};

const BUILTINS: &[&str] = &["clear", "exit", "quit"];

/// Completes shell names, then a shell's commands, then its options.
pub(crate) struct ReplCompleter {
    shells: Vec<ShellSummary>,
}

impl Completer for ReplCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let line = &line[..pos.min(line.len())];
        let words: Vec<&str> = line.split_whitespace().collect();

        // The word under the cursor, empty right after a space
        let (current, previous) = if line.is_empty() || line.ends_with(char::is_whitespace) {
            ("", &words[..])
        } else {
            let split = words.len().saturating_sub(1);
            (words[split], &words[..split])
        };
        let span = Span::new(line.len() - current.len(), line.len());

        let candidates: Vec<String> = match previous {
            [] => self
                .shells
                .iter()
                .map(|shell| shell.name.clone())
                .chain(BUILTINS.iter().map(|b| b.to_string()))
                .collect(),
            [name, rest @ ..] => match self.shell(name) {
                Some(shell) if rest.is_empty() && !current.starts_with('-') => shell.commands.clone(),
                Some(shell) => shell.options.clone(),
                None => Vec::new(),
            },
        };

        candidates
            .iter()
            .filter(|candidate| candidate.starts_with(current))
            .map(|candidate| self.build_suggestion(candidate, span))
            .collect()
    }
}

impl ReplCompleter {
    pub fn new(shells: Vec<ShellSummary>) -> Self {
        ReplCompleter { shells }
    }

    fn shell(&self, name: &str) -> Option<&ShellSummary> {
        self.shells
            .iter()
            .find(|shell| shell.name.eq_ignore_ascii_case(name))
    }

    fn build_suggestion(&self, value: &str, span: Span) -> Suggestion {
        Suggestion {
            value: value.to_string(),
            description: None,
            extra: None,
            span,
            style: None,
            append_whitespace: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completer() -> ReplCompleter {
        ReplCompleter::new(vec![
            ShellSummary {
                name: "plugin".to_string(),
                description: None,
                commands: vec!["loaded".to_string(), "load".to_string()],
                options: vec!["--help".to_string(), "--quiet".to_string()],
            },
            ShellSummary {
                name: "completion".to_string(),
                description: None,
                commands: vec!["commands".to_string()],
                options: vec!["--help".to_string()],
            },
        ])
    }

    fn values(suggestions: Vec<Suggestion>) -> Vec<String> {
        suggestions.into_iter().map(|s| s.value).collect()
    }

    #[test]
    fn test_completes_shell_names() {
        let suggestions = completer().complete("pl", 2);
        assert_eq!(values(suggestions), vec!["plugin"]);
    }

    #[test]
    fn test_completes_commands() {
        // Test
        let suggestions = completer().complete("plugin lo", 9);

        // Validate
        assert_eq!(suggestions[0].span, Span::new(7, 9));
        assert_eq!(values(suggestions), vec!["loaded", "load"]);
    }

    #[test]
    fn test_completes_options() {
        let suggestions = completer().complete("plugin loaded --q", 17);
        assert_eq!(values(suggestions), vec!["--quiet"]);
    }

    #[test]
    fn test_unknown_shell_has_no_completions() {
        assert!(completer().complete("nope ", 5).is_empty());
    }

    #[test]
    fn test_empty_line_lists_everything() {
        let suggestions = values(completer().complete("", 0));
        assert!(suggestions.contains(&"completion".to_string()));
        assert!(suggestions.contains(&"exit".to_string()));
    }
}
