//! Year/month/day setup, as driven by a single rotary knob on a clock.

use chrono::{Datelike, Local, NaiveDate};
use shared::error::SequenceError;

use crate::{
    controller::SequenceController,
    field::{FieldSpec, LockedFields},
    result::ComposedResult,
};

pub const YEAR: &str = "Year";
pub const MONTH: &str = "Month";
pub const DAY: &str = "Day";
pub const TERMINAL_INSTRUCTIONS: &str = "Press knob to view selected date...";
pub const DEFAULT_YEAR_SPAN: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockOptions {
    pub today: NaiveDate,
    pub start_year: Option<i32>,
    pub year_span: i32,
}

impl ClockOptions {
    pub fn from_today(start_year: Option<i32>, year_span: i32) -> Self {
        Self {
            today: Local::now().date_naive(),
            start_year,
            year_span,
        }
    }

    pub fn year_range(&self) -> (i32, i32) {
        let min = self.start_year.unwrap_or_else(|| self.today.year());
        (min, min.saturating_add(self.year_span.max(0)))
    }
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

fn day_max(locked: &LockedFields<'_>) -> i64 {
    let year = locked.get(YEAR).and_then(|y| i32::try_from(y).ok());
    let month = locked.get(MONTH).and_then(|m| u32::try_from(m).ok());
    match (year, month) {
        (Some(year), Some(month)) => days_in_month(year, month).map_or(31, i64::from),
        _ => 31,
    }
}

pub fn clock_fields(options: &ClockOptions) -> Vec<FieldSpec> {
    let (year_min, year_max) = options.year_range();
    let year = options.today.year().clamp(year_min, year_max);

    vec![
        FieldSpec::new(YEAR, i64::from(year), i64::from(year_min), i64::from(year_max)),
        FieldSpec::new(MONTH, i64::from(options.today.month()), 1, 12),
        FieldSpec::new(DAY, i64::from(options.today.day()), 1, 31).with_max_from(day_max),
    ]
}

pub fn clock_sequence(options: &ClockOptions) -> Result<SequenceController, SequenceError> {
    Ok(SequenceController::new(clock_fields(options))?
        .with_terminal_instructions(TERMINAL_INSTRUCTIONS))
}

pub fn selected_date(result: &ComposedResult) -> Option<NaiveDate> {
    let year = i32::try_from(result.get(YEAR)?).ok()?;
    let month = u32::try_from(result.get(MONTH)?).ok()?;
    let day = u32::try_from(result.get(DAY)?).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(today: (i32, u32, u32)) -> ClockOptions {
        ClockOptions {
            today: NaiveDate::from_ymd_opt(today.0, today.1, today.2).expect("date"),
            start_year: None,
            year_span: DEFAULT_YEAR_SPAN,
        }
    }

    #[test]
    fn month_lengths_include_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2025, 4), Some(30));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 13), None);
    }

    #[test]
    fn fields_seed_from_today() {
        let mut seq = clock_sequence(&options((2024, 6, 15))).expect("valid");
        assert_eq!(seq.current_instructions(), "Please set the year...");
        let year = seq.current_field().expect("year");
        assert_eq!((year.min(), year.max(), year.current_value()), (2024, 2030, 2024));

        seq.select();
        assert_eq!(seq.current_instructions(), "Please set the month...");
        seq.select();
        assert_eq!(seq.current_instructions(), "Please set the day...");
        assert_eq!(seq.current_field().map(|f| f.current_value()), Some(15));
    }

    #[test]
    fn start_year_overrides_window_and_clamps_initial_year() {
        let mut opts = options((2024, 6, 15));
        opts.start_year = Some(2026);
        opts.year_span = 2;
        let fields = clock_fields(&opts);
        assert_eq!(fields[0].initial_value(), 2026);
        assert_eq!(opts.year_range(), (2026, 2028));
    }

    #[test]
    fn day_range_follows_locked_month() {
        let mut seq = clock_sequence(&options((2023, 1, 31))).expect("valid");
        seq.rotate_up(); // 2024, a leap year
        seq.select();
        seq.rotate_up(); // February
        seq.select();

        let day = seq.current_field().expect("day");
        assert_eq!(day.max(), 29);
        assert_eq!(day.current_value(), 29);
    }

    #[test]
    fn selected_date_reads_result() {
        let mut seq = clock_sequence(&options((2024, 6, 15))).expect("valid");
        seq.rotate_up();
        seq.select();
        seq.select();
        seq.rotate_down();
        seq.select();
        assert_eq!(seq.current_instructions(), TERMINAL_INSTRUCTIONS);

        let result = seq.compose_result().expect("finished");
        assert_eq!(
            selected_date(&result),
            NaiveDate::from_ymd_opt(2025, 6, 14)
        );
    }
}
