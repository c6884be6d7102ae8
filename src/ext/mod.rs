mod best_effort_path_ext;
mod unix_seconds_ext;

pub use best_effort_path_ext::BestEffortPathExt;
pub use unix_seconds_ext::UnixSecondsExt;
