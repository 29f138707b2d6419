//! # moment CLI Entry Point
//!
//! Inspects and shifts epoch-millisecond instants, printing JSON to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use moment::{
    DateTimeFields, FixedOffsetSource, Moment, OffsetSource, MILLISECONDS_OF_ONE_DAY,
    MILLISECONDS_OF_ONE_HOUR, MILLISECONDS_OF_ONE_MINUTE, MILLISECONDS_OF_ONE_SECOND,
};
use serde::Serialize;

/// Inspect epoch-millisecond instants.
///
/// Calendar fields are UTC unless `--offset` (or `MOMENT_OFFSET`) names a
/// fixed offset such as `GMT+1`, `UTC-05:30` or `+04:00`.
#[derive(Parser, Debug)]
#[command(name = "moment", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// The current instant.
    Now {
        #[command(flatten)]
        offset: OffsetArg,
    },
    /// Calendar fields of an instant.
    Fields {
        /// Milliseconds since 1970-01-01T00:00:00Z.
        #[arg(allow_negative_numbers = true)]
        millis: i64,
        #[command(flatten)]
        offset: OffsetArg,
    },
    /// Midnight UTC of a YYYY-MM-DD date.
    ParseDate {
        date: String,
    },
    /// Start and end of the UTC day containing an instant.
    Day {
        #[arg(allow_negative_numbers = true)]
        millis: i64,
    },
    /// Shift an instant by seconds, minutes, hours and days.
    Shift {
        #[arg(allow_negative_numbers = true)]
        millis: i64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        seconds: i64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        minutes: i64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        hours: i64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        days: i64,
    },
    /// The host's current UTC offset in minutes.
    SystemOffset,
}

#[derive(clap::Args, Debug)]
struct OffsetArg {
    /// Fixed offset for local fields.
    #[arg(
        long,
        env = "MOMENT_OFFSET",
        default_value = "UTC",
        allow_hyphen_values = true,
        value_parser = parse_offset
    )]
    offset: FixedOffsetSource,
}

fn parse_offset(zone_id: &str) -> std::result::Result<FixedOffsetSource, String> {
    FixedOffsetSource::parse(zone_id).map_err(|e| e.to_string())
}

/// JSON view of one instant.
#[derive(Debug, Serialize)]
struct MomentReport {
    epoch_milli: Moment,
    utc: String,
    day_of_week: String,
    minute_of_day: u32,
    local: DateTimeFields,
}

impl MomentReport {
    fn new(moment: Moment, offset: &impl OffsetSource) -> Self {
        let offset_minutes = offset.offset_minutes();
        Self {
            epoch_milli: moment,
            utc: moment.to_string(),
            day_of_week: moment.day_of_week().to_string(),
            minute_of_day: moment.minute_of_day_at(offset_minutes),
            local: moment.fields_at(offset_minutes),
        }
    }
}

#[derive(Debug, Serialize)]
struct DayReport {
    start: MomentReport,
    end: MomentReport,
}

#[derive(Debug, Serialize)]
struct SystemOffsetReport {
    offset_minutes: i32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = run(cli.command)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn run(command: Commands) -> Result<serde_json::Value> {
    let utc = FixedOffsetSource::UTC;
    let value = match command {
        Commands::Now {
            offset: OffsetArg { offset },
        } => serde_json::to_value(MomentReport::new(Moment::now(), &offset))?,
        Commands::Fields {
            millis,
            offset: OffsetArg { offset },
        } => serde_json::to_value(MomentReport::new(Moment::of_epoch_milli(millis), &offset))?,
        Commands::ParseDate { date } => {
            let moment = Moment::parse_date(&date)
                .with_context(|| format!("cannot parse date argument '{date}'"))?;
            serde_json::to_value(MomentReport::new(moment, &utc))?
        }
        Commands::Day { millis } => {
            let moment = Moment::of_epoch_milli(millis);
            serde_json::to_value(DayReport {
                start: MomentReport::new(moment.start_of_day(), &utc),
                end: MomentReport::new(moment.end_of_day(), &utc),
            })?
        }
        Commands::Shift {
            millis,
            seconds,
            minutes,
            hours,
            days,
        } => {
            tracing::debug!(millis, seconds, minutes, hours, days, "shifting instant");
            let shifted = shift_millis(millis, seconds, minutes, hours, days).with_context(|| {
                format!(
                    "shift overflows the millisecond range: {millis} + {seconds}s {minutes}m {hours}h {days}d"
                )
            })?;
            serde_json::to_value(MomentReport::new(Moment::of_epoch_milli(shifted), &utc))?
        }
        Commands::SystemOffset => serde_json::to_value(SystemOffsetReport {
            offset_minutes: Moment::system_offset_minutes(),
        })?,
    };
    Ok(value)
}

/// `millis` moved by each amount, or `None` if any step leaves `i64`.
fn shift_millis(millis: i64, seconds: i64, minutes: i64, hours: i64, days: i64) -> Option<i64> {
    [
        (seconds, MILLISECONDS_OF_ONE_SECOND),
        (minutes, MILLISECONDS_OF_ONE_MINUTE),
        (hours, MILLISECONDS_OF_ONE_HOUR),
        (days, MILLISECONDS_OF_ONE_DAY),
    ]
    .into_iter()
    .try_fold(millis, |acc, (amount, scale)| {
        amount.checked_mul(scale).and_then(|delta| acc.checked_add(delta))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_report_uses_offset_for_local_fields() {
        let offset = FixedOffsetSource::parse("GMT+1").unwrap();
        let report = MomentReport::new(Moment::of_epoch_milli(1_577_746_077_615), &offset);
        assert_eq!(report.utc, "2019-12-30T22:47:57.615Z");
        assert_eq!(report.day_of_week, "Mon");
        assert_eq!(report.local.hour, 23);
        assert_eq!(report.minute_of_day, 23 * 60 + 47);
    }

    #[test]
    fn test_run_shift() {
        let value = run(Commands::Shift {
            millis: 0,
            seconds: 1,
            minutes: -1,
            hours: 0,
            days: 0,
        })
        .unwrap();
        assert_eq!(value["epoch_milli"], -59_000);
    }

    #[test]
    fn test_run_shift_overflow_is_an_error() {
        let err = run(Commands::Shift {
            millis: 0,
            seconds: 0,
            minutes: 0,
            hours: 0,
            days: 200_000_000_000_000,
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("shift overflows"), "got: {err:#}");

        assert!(shift_millis(i64::MAX, 1, 0, 0, 0).is_none());
        assert!(shift_millis(i64::MIN, 0, -1, 0, 0).is_none());
        assert_eq!(shift_millis(i64::MAX - 1_000, 1, 0, 0, 0), Some(i64::MAX));
    }

    #[test]
    fn test_run_parse_date_error_has_context() {
        let err = run(Commands::ParseDate {
            date: "2019-13-01".to_string(),
        })
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("cannot parse date argument"), "got: {message}");
        assert!(message.contains("month out of range"), "got: {message}");
    }
}
