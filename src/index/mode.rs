use derive_more::Display;

/// How much history work the pipeline performs. Decided once, up front,
/// and threaded through the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RunMode {
    /// Batched history queries run and files carry metadata.
    #[display("full")]
    Full,
    /// Downgraded automatically because the file count exceeded the limit.
    #[display("auto-fast")]
    AutoFast,
    /// Fast mode explicitly requested by the caller.
    #[display("forced-fast")]
    ForcedFast,
}

impl RunMode {
    pub fn skips_history(&self) -> bool {
        !matches!(self, RunMode::Full)
    }
}

/// The performance/completeness trade-off at the heart of the pipeline,
/// as a pure function of its four inputs. An explicit fast request always
/// wins; `force_full` only overrides the automatic downgrade.
pub fn decide_mode(file_count: usize, limit: usize, fast: bool, force_full: bool) -> RunMode {
    if fast {
        RunMode::ForcedFast
    } else if file_count > limit && !force_full {
        RunMode::AutoFast
    } else {
        RunMode::Full
    }
}
