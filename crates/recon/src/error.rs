use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad tolerance, malformed address, etc.).
    ConfigValidation(String),
    /// Period key that is neither `YYYY-MM` nor `YYYY/MM`.
    PeriodParse(String),
    /// Required nested fields absent from an API payload.
    MalformedInput(String),
    /// Transfer record field that does not parse.
    RecordParse { field: &'static str, value: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::PeriodParse(value) => write!(f, "cannot parse period key '{value}'"),
            Self::MalformedInput(msg) => write!(f, "malformed payload: {msg}"),
            Self::RecordParse { field, value } => {
                write!(f, "transfer record: cannot parse {field} '{value}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
