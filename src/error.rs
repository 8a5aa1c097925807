use thiserror::Error;

/// Convenience result type for pipeline, retention and report operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Coarse error classification for programmatic handling by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The upload is not readable as delimited text (or fails an upload guard).
    Format,
    /// One or more required columns are absent from the header.
    MissingColumns,
    /// The header is present but no data rows follow.
    EmptyFile,
    /// Every data row was rejected by the record parser.
    NoValidData,
    /// A report could not be rendered.
    Render,
    /// No dataset with the requested id is retained.
    NotFound,
    /// Infrastructure failure (I/O, serialization, worker pool).
    Internal,
}

impl ErrorKind {
    /// Stable snake_case label, used in error bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Format => "format_error",
            Self::MissingColumns => "missing_columns",
            Self::EmptyFile => "empty_file",
            Self::NoValidData => "no_valid_data",
            Self::Render => "render_error",
            Self::NotFound => "not_found",
            Self::Internal => "internal_error",
        }
    }

    /// HTTP-style status code a transport layer should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Format | Self::MissingColumns | Self::EmptyFile | Self::NoValidData => 400,
            Self::NotFound => 404,
            Self::Render | Self::Internal => 500,
        }
    }
}

/// Error type shared by ingestion, retention and report rendering.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error (e.g. the observer log file, reading an upload from disk).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader failed on the header or the content as a whole.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Encoding a representation to JSON failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The report worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Content cannot be parsed as delimited tabular text.
    #[error("invalid csv format: {message}")]
    Format { message: String },

    /// The uploaded file name does not carry an allowed extension.
    #[error("file must be CSV format (.csv): '{filename}'")]
    UnsupportedExtension { filename: String },

    /// The upload is larger than the configured limit.
    #[error("file size {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    /// Required columns are absent, listed in canonical order.
    #[error("missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// Header present, zero data rows.
    #[error("csv file is empty: header found but no data rows")]
    EmptyFile,

    /// All data rows were rejected.
    #[error("no valid data found in csv ({rejected} rows rejected)")]
    NoValidData { rejected: usize },

    /// Report rendering refused or failed.
    #[error("failed to render report: {message}")]
    Render { message: String },

    /// Unknown dataset id.
    #[error("dataset not found: {id}")]
    NotFound { id: u64 },
}

impl PipelineError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(_) => ErrorKind::Internal,
                _ => ErrorKind::Format,
            },
            Self::Format { .. } | Self::UnsupportedExtension { .. } | Self::FileTooLarge { .. } => {
                ErrorKind::Format
            }
            Self::MissingColumns { .. } => ErrorKind::MissingColumns,
            Self::EmptyFile => ErrorKind::EmptyFile,
            Self::NoValidData { .. } => ErrorKind::NoValidData,
            Self::Render { .. } => ErrorKind::Render,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io(_) | Self::Serialization(_) | Self::ThreadPool(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub(crate) fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}
