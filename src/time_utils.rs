use crate::domain::market_data::TimeInterval;

/// Format an axis label for a candle time (epoch seconds, already shifted
/// into the display timezone).
///
/// - intraday intervals -> `HH:MM`
/// - daily interval -> `DD.MM`
pub fn format_time_label(timestamp_secs: i64, interval: TimeInterval) -> String {
    match interval {
        TimeInterval::OneDay => {
            let days = timestamp_secs.div_euclid(86_400);
            let (_, month, day) = civil_from_days(days);
            format!("{:02}.{:02}", day, month)
        }
        _ => {
            let secs = timestamp_secs.rem_euclid(86_400);
            format!("{:02}:{:02}", secs / 3600, (secs / 60) % 60)
        }
    }
}

/// Days-since-epoch to (year, month, day), proleptic Gregorian.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}
