//! # Text Reports
//!
//! Plain-text rendering of calibrated ages and pooled determinations for
//! terminal output.

use radiocal_core::{CalendarScale, CalibratedAge, ConfidenceInterval, PooledDetermination};
use std::fmt::Write;

/// Calendar year with its era prefix: `AD 450`, `BC 120` or `BP 1500`.
///
/// On the BC/AD scale year 0 and below are BC.
#[must_use]
pub fn year_label(year: f64, scale: CalendarScale) -> String {
    match scale {
        CalendarScale::Bp => format!("BP {:.0}", year),
        CalendarScale::Ad if year > 0.0 => format!("AD {:.0}", year),
        CalendarScale::Ad => format!("BC {:.0}", year.abs()),
    }
}

/// One interval as `<start> ‒ <end> (<percent>%)`.
#[must_use]
pub fn interval_line(interval: &ConfidenceInterval, scale: CalendarScale) -> String {
    format!(
        "{} ‒ {} ({:.1}%)",
        year_label(interval.start, scale),
        year_label(interval.end, scale),
        interval.percent()
    )
}

/// Full text block for one calibrated age.
#[must_use]
pub fn single_text(age: &CalibratedAge) -> String {
    let scale = age.scale();
    let determination = age.determination();
    let mut out = String::new();

    let _ = writeln!(out, "{}", determination.id);
    let _ = writeln!(out, "{}", "=".repeat(determination.id.chars().count().max(1)));
    let _ = writeln!(out);
    let _ = writeln!(out, "Calibration curve: {}", age.curve().title());
    let _ = writeln!(
        out,
        "Radiocarbon determination: {} ± {} BP",
        determination.date, determination.sigma
    );
    let _ = writeln!(out, "Calendar scale: {}", age.scale_label());
    let _ = writeln!(out);

    for (heading, intervals) in [
        ("68.2% probability", age.intervals68()),
        ("95.4% probability", age.intervals95()),
    ] {
        let _ = writeln!(out, "{}", heading);
        for interval in intervals {
            let _ = writeln!(out, "  {}", interval_line(interval, scale));
        }
    }

    out
}

/// Text summary of a pooled determination.
#[must_use]
pub fn pooled_text(pooled: &PooledDetermination) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Pooled determination");
    let _ = writeln!(out, "====================");
    let _ = writeln!(out, "Sources: {}", pooled.sources.join(", "));
    let _ = writeln!(out, "Mean:    {:.1} BP", pooled.mean());
    let _ = writeln!(out, "Error:   {:.1}", pooled.error());
    let _ = writeln!(out, "T:       {:.3}", pooled.test_statistic);
    let _ = writeln!(out, "df:      {}", pooled.degrees_of_freedom);
    out
}

// =============================================================================
// TESTS
// =============================================================================
