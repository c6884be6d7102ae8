use clap::ValueEnum;

/// Verbosity of the diagnostics emitted on stderr. The default keeps the
/// auto-fast downgrade and partial-history notices visible; `Silent`
/// disables tracing entirely so only the tree reaches the terminal.
#[derive(Debug, Clone, ValueEnum, Default)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    /// Maps to a tracing level; `None` means no subscriber is installed.
    pub fn to_tracing_level(&self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}
