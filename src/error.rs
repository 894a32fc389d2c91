/// Input, schema or configuration problem (missing workbook, too few columns, bad TOML).
pub const EXIT_INPUT: u8 = 2;
/// Terminal or output I/O failure.
pub const EXIT_RUNTIME: u8 = 4;

/// The single error type surfaced to `main`: a message plus the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Source cannot be read or does not have the expected layout.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// The single line printed to stderr before exiting.
    pub fn report_line(&self) -> String {
        format!("System Error: {}", self.message)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_line_prefixes_message() {
        let err = AppError::schema("Workbook not found: x.xlsx");
        assert_eq!(err.report_line(), "System Error: Workbook not found: x.xlsx");
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert_eq!(AppError::runtime("boom").exit_code(), EXIT_RUNTIME);
    }
}
