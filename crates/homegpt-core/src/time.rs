/// Current UTC time as an ISO-8601 string with millisecond precision
///
/// e.g. `2024-05-01T12:00:00.123Z`
pub fn timestamp() -> String {
    format!("{:.3}", jiff::Timestamp::now())
}
