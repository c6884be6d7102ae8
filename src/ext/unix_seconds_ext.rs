use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

const SECONDS_PER_DAY: i64 = 86_400;

/// Display helpers for unix-second commit timestamps (`git log %ct`).
pub trait UnixSecondsExt {
    /// Formats the timestamp as `YYYY-MM-DD`, or `None` when it does not
    /// represent a valid point in time.
    fn to_date_string(&self) -> Option<String>;

    /// Whole days elapsed between the timestamp and `now`, clamped at zero.
    fn days_ago(&self, now: i64) -> i64;
}

impl UnixSecondsExt for i64 {
    fn to_date_string(&self) -> Option<String> {
        OffsetDateTime::from_unix_timestamp(*self)
            .ok()?
            .format(DATE_FORMAT)
            .ok()
    }

    fn days_ago(&self, now: i64) -> i64 {
        (now - self).max(0) / SECONDS_PER_DAY
    }
}
