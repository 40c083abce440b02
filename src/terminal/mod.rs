// Captured program output

use std::io::Write;

/// Collects everything native functions print
///
/// Output is always captured; with `echo` set it is also written to the
/// process stdout as it arrives.
#[derive(Debug, Clone, Default)]
pub struct Terminal {
    text: String,
    echo: bool,
}

impl Terminal {
    pub fn new(echo: bool) -> Self {
        Terminal {
            text: String::new(),
            echo,
        }
    }

    /// Print without newline
    pub fn print(&mut self, text: &str) {
        self.text.push_str(text);
        if self.echo {
            let mut stdout = std::io::stdout().lock();
            let echoed = stdout.write_all(text.as_bytes());
            if let Err(err) = echoed.and_then(|()| stdout.flush()) {
                tracing::warn!(%err, "failed to echo program output");
            }
        }
    }

    /// Get all lines as a vector of strings
    pub fn get_output(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.text.split('\n').map(|s| s.to_string()).collect();
        // Remove trailing empty string if text ended with newline
        if lines.last().is_some_and(|s| s.is_empty()) {
            lines.pop();
        }
        lines
    }

    /// Everything printed so far, verbatim
    pub fn contents(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_output_splits_lines() {
        let mut terminal = Terminal::new(false);
        terminal.print("a");
        terminal.print("b\n");
        terminal.print("c\n");

        assert_eq!(terminal.get_output(), vec!["ab", "c"]);
        assert_eq!(terminal.contents(), "ab\nc\n");
    }

    #[test]
    fn test_empty_terminal_has_no_lines() {
        let terminal = Terminal::default();
        assert!(terminal.get_output().is_empty());
    }
}
