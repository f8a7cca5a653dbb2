//! Domain error types.

/// A parse error with position information for predicate parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for signaltrader.
#[derive(Debug, thiserror::Error)]
pub enum SignalTraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid {name} condition: {source}")]
    RuleParse {
        name: String,
        input: String,
        #[source]
        source: ParseError,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignalTraderError {
    /// Multi-line description; parse errors get a caret under the offending input.
    pub fn detailed(&self) -> String {
        match self {
            SignalTraderError::RuleParse {
                name,
                input,
                source,
            } => format!(
                "failed to parse {} condition:\n{}",
                name,
                source.display_with_context(input)
            ),
            other => other.to_string(),
        }
    }
}

impl From<&SignalTraderError> for std::process::ExitCode {
    fn from(err: &SignalTraderError) -> Self {
        let code: u8 = match err {
            SignalTraderError::Io(_) | SignalTraderError::Report { .. } => 1,
            SignalTraderError::ConfigParse { .. }
            | SignalTraderError::ConfigMissing { .. }
            | SignalTraderError::ConfigInvalid { .. } => 2,
            SignalTraderError::Data { .. } => 3,
            SignalTraderError::RuleParse { .. } => 4,
            SignalTraderError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
