use nu_ansi_term::{Color, Style};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// How style tags such as `<info>` are treated on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Tags are written untouched.
    Raw,
    /// Tags are stripped.
    Plain,
    /// Tags become ANSI escape sequences.
    Color,
}

fn style_for(tag: &str) -> Option<Style> {
    let style = match tag {
        "info" => Color::Cyan.normal(),
        "comment" => Color::Blue.normal(),
        "question" => Color::Magenta.normal(),
        "error" => Color::Red.bold(),
        "warning" => Color::Yellow.normal(),
        "success" => Color::Green.normal(),
        _ => return None,
    };
    Some(style)
}

fn replace_tags(text: &str, render: impl Fn(Style, &str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start + 1..];

        let styled = candidate.find('>').and_then(|end| {
            let tag = &candidate[..end];
            let style = style_for(tag)?;
            let close = format!("</{}>", tag);
            let body = &candidate[end + 1..];
            let close_at = body.find(&close)?;
            let consumed = start + 1 + end + 1 + close_at + close.len();
            Some((style, &body[..close_at], consumed))
        });

        match styled {
            Some((style, inner, consumed)) => {
                out.push_str(&render(style, inner));
                rest = &rest[consumed..];
            }
            None => {
                out.push('<');
                rest = candidate;
            }
        }
    }

    out.push_str(rest);
    out
}

/// A single output stream plus its styling mode.
pub struct ConsoleOutput {
    writer: Box<dyn Write>,
    mode: OutputMode,
}

impl ConsoleOutput {
    pub fn new(writer: Box<dyn Write>, mode: OutputMode) -> Self {
        ConsoleOutput { writer, mode }
    }

    pub fn stdout() -> Self {
        let mode = if console::Term::stdout().is_term() {
            OutputMode::Color
        } else {
            OutputMode::Plain
        };
        ConsoleOutput::new(Box::new(std::io::stdout()), mode)
    }

    pub fn stderr() -> Self {
        let mode = if console::Term::stderr().is_term() {
            OutputMode::Color
        } else {
            OutputMode::Plain
        };
        ConsoleOutput::new(Box::new(std::io::stderr()), mode)
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    pub fn styled(&self, text: &str) -> String {
        match self.mode {
            OutputMode::Raw => text.to_string(),
            OutputMode::Plain => replace_tags(text, |_, inner| inner.to_string()),
            OutputMode::Color => replace_tags(text, |style, inner| style.paint(inner).to_string()),
        }
    }

    /// Writes `message` followed by `newlines` line feeds, returning the bytes written.
    pub fn write(&mut self, message: &str, newlines: usize) -> std::io::Result<usize> {
        let text = format!("{}{}", self.styled(message), "\n".repeat(newlines));
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()?;
        Ok(text.len())
    }
}

/// In-memory writer whose clones share one buffer; used to capture output.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter(Rc<RefCell<Vec<u8>>>);

impl MemoryWriter {
    pub fn new() -> Self {
        MemoryWriter::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_strips_known_tags() {
        let output = ConsoleOutput::new(Box::new(MemoryWriter::new()), OutputMode::Plain);

        // Test
        let text = output.styled("<info>Welcome</info> to <b>x</b> 1 < 2");

        // Validate
        assert_eq!(text, "Welcome to <b>x</b> 1 < 2");
    }

    #[test]
    fn test_raw_keeps_tags() {
        let output = ConsoleOutput::new(Box::new(MemoryWriter::new()), OutputMode::Raw);
        assert_eq!(output.styled("<error>Error:</error> x"), "<error>Error:</error> x");
    }

    #[test]
    fn test_color_paints_tags() {
        let output = ConsoleOutput::new(Box::new(MemoryWriter::new()), OutputMode::Color);

        // Test
        let text = output.styled("<success>Wrote</success>");

        // Validate
        assert_eq!(text, Color::Green.normal().paint("Wrote").to_string());
        assert!(!text.contains("<success>"));
    }

    #[test]
    fn test_write_appends_newlines() -> std::io::Result<()> {
        let buffer = MemoryWriter::new();
        let mut output = ConsoleOutput::new(Box::new(buffer.clone()), OutputMode::Plain);

        // Test
        let written = output.write("<comment>hi</comment>", 2)?;

        // Validate
        assert_eq!(buffer.contents(), "hi\n\n");
        assert_eq!(written, 4);
        Ok(())
    }
}
