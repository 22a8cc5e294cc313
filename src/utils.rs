/// Camelizes an underscored or space separated word: `api_docs` becomes `ApiDocs`.
///
/// Only the first letter of each word is touched, so `API` stays `API`.
pub fn camelize(word: &str) -> String {
    word.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Underscores a camel cased word: `ApiDocs` becomes `api_docs`.
pub fn underscore(word: &str) -> String {
    let mut result = String::with_capacity(word.len() + 4);
    let mut previous: Option<char> = None;

    for c in word.chars() {
        if c.is_uppercase() {
            if matches!(previous, Some(p) if p.is_lowercase() || p.is_ascii_digit()) {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
        previous = Some(c);
    }

    result
}

/// Splits a `Plugin.Name` identifier into its plugin qualifier and name.
pub fn plugin_split(identifier: &str) -> (Option<&str>, &str) {
    match identifier.split_once('.') {
        Some((plugin, name)) if !plugin.is_empty() => (Some(plugin), name),
        Some((_, name)) => (None, name),
        None => (None, identifier),
    }
}

/// Greedy word wrap to `width` columns. Existing line breaks are kept, every
/// line is indented by `indent` spaces and over-long words get a line of their own.
pub fn wrap_text(text: &str, width: usize, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let limit = width.saturating_sub(indent).max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > limit {
                lines.push(format!("{}{}", pad, line));
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(format!("{}{}", pad, line).trim_end().to_string());
    }

    lines.join("\n")
}
