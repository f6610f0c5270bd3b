use std::path::PathBuf;
use std::sync::Arc;

type Source = Arc<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
    source: Option<Source>,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
            source: None,
        }
    }

    /// Keep the underlying error so the final log line can show the whole chain.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// Message followed by every `caused by:` in the source chain.
    pub fn report(&self) -> String {
        let mut out = self.message.clone();
        let mut next = std::error::Error::source(self);
        while let Some(err) = next {
            // Wrapped errors often repeat their source's text; skip those links.
            let text = err.to_string();
            if !out.ends_with(&text) {
                out.push_str(&format!("\n  caused by: {text}"));
            }
            next = err.source();
        }
        out
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
            .field("source", &self.source)
            .finish()
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Errors from loading an observed point set.
///
/// Each rejection reason is its own variant so callers (and tests) can tell
/// them apart without matching on message text.
#[derive(thiserror::Error, Debug)]
pub enum DataError {
    /// The data file does not exist.
    #[error("Data file not found: {}", path.display())]
    NotFound { path: PathBuf },
    /// The file exists but could not be read or parsed as CSV.
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// One or both of the `x` / `y` columns are absent.
    #[error("CSV must contain 'x' and 'y' columns (missing: {})", missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    /// Fewer rows than the fit needs.
    #[error("Insufficient data: {rows} rows (minimum {min} required)")]
    InsufficientRows { rows: usize, min: usize },
    /// An empty or NaN cell in a required column.
    #[error("Data contains missing values: line {line}, column `{column}`")]
    MissingValue { line: usize, column: &'static str },
    /// A cell that is present but not a finite number.
    #[error("Invalid value '{value}' at line {line}, column `{column}`")]
    InvalidValue {
        line: usize,
        column: &'static str,
        value: String,
    },
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        let exit_code = match err {
            DataError::InsufficientRows { .. } => 3,
            _ => 2,
        };
        AppError::new(exit_code, err.to_string()).with_source(err)
    }
}
