/// Sink for lexical and parse diagnostics.
///
/// `location` is either empty, ` at end` or ` at 'lexeme'`.
pub trait Reporter {
    fn report(&mut self, line: u32, location: &str, message: &str);
}

/// Prints diagnostics to stderr and remembers whether any were printed.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    had_error: bool
}

impl ConsoleReporter {
    pub fn new() -> ConsoleReporter {
        ConsoleReporter { had_error: false }
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn reset(&mut self) {
        self.had_error = false;
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, line: u32, location: &str, message: &str) {
        eprintln!("{}", format_report(line, location, message));
        self.had_error = true;
    }
}

pub fn format_report(line: u32, location: &str, message: &str) -> String {
    format!("[Line {}] Error{}: {}", line, location, message)
}

#[cfg(test)]
pub mod test {
    use super::*;

    /// Keeps every report so tests can assert on them.
    #[derive(Debug, Default)]
    pub struct CollectingReporter {
        pub reports: Vec<(u32, String, String)>
    }

    impl Reporter for CollectingReporter {
        fn report(&mut self, line: u32, location: &str, message: &str) {
            self.reports.push((line, location.to_owned(), message.to_owned()));
        }
    }

    #[test]
    fn console_reporter_tracks_errors() {
        let mut reporter = ConsoleReporter::new();
        assert!(!reporter.had_error());
        reporter.report(3, "", "Unexpected character '#'.");
        assert!(reporter.had_error());
        reporter.reset();
        assert!(!reporter.had_error());
    }

    #[test]
    fn report_format() {
        assert_eq!(format_report(1, "", "Unterminated string."), "[Line 1] Error: Unterminated string.");
        assert_eq!(format_report(2, " at end", "Expect expression."), "[Line 2] Error at end: Expect expression.");
        assert_eq!(format_report(7, " at ')'", "Expect expression."), "[Line 7] Error at ')': Expect expression.");
    }
}
