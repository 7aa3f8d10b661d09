//! Quartz-like cron expressions parser and schedule matcher.
#![deny(unsafe_code, missing_docs)]

//! This crate is intended to:
//! - parse cron expressions, including Quartz extensions and several alternatives joined by `|`;
//! - calculate upcoming times matching the expression in any timezone;
//! - check whether a particular time matches the expression.
//!
//! _This is not a cron jobs scheduler or runner._ It only computes when an expression matches.
//!
//! ## Cron expression format
//!
//! By default, an expression has from 4 to 6 fields: minutes, hours, days of month, months,
//! and optional days of week and years. If seconds are requested by [`ParseOptions`],
//! the seconds field goes first and an expression has from 5 to 7 fields:
//! - if _seconds_ aren't requested, any second of the matching minute matches;
//! - if _day of week_ is absent, `?` is used;
//! - if _year_ is absent, `*` is used.
//!
//! | Field        | Required | Allowed values  | Allowed special characters |
//! |--------------|----------|-----------------|----------------------------|
//! | Seconds      | Optional | 0-59            | * , - /                    |
//! | Minutes      | Yes      | 0-59            | * , - /                    |
//! | Hours        | Yes      | 0-23            | * , - /                    |
//! | Day of Month | Yes      | 1-31            | * , - / ? L W LW           |
//! | Month        | Yes      | 1-12 or JAN-DEC | * , - /                    |
//! | Day of Week  | No       | 0-7 or SUN-SAT  | * , - / ? L #              |
//! | Year         | No       | 1970-2099       | * , - /                    |
//!
//! Patterns meanings:
//! - `*` - each possible value, i.e. `0,1,2,...,59` for minutes;
//! - `?` - day of month or day of week doesn't constrain the match;
//! - `,` - list of values or patterns, i.e. `1,7,12`, `SUN,FRI`;
//! - `-` - range of values, i.e. `0-15`, `JAN-MAR`, `SAT-SUN`;
//! - `/` - repeating values, i.e. `*/12`, `10/5`, `30-59/2`; step `0` means the start value only;
//! - `L` - last day of the month (day of month field), Saturday (day of week field), or last particular day of the week, i.e. `5L`;
//! - `LW` - last weekday (Monday to Friday) of the month;
//! - `W` - the weekday nearest to the specified day of month in the same month, i.e. `22W`;
//! - `#` - N-th (1 to 5) particular day of the week in the month, i.e. `fri#1`, `1#4`.
//!
//! Both `0` and `7` mean Sunday. Names of months and days are case-insensitive.
//!
//! When both day of month and day of week constrain days, a day matches if it satisfies _either_ of them.
//! If one of them is `*` and the other one constrains days, only the constraining one is taken into account.
//!
//! Several alternative expressions may be joined by `|`: time matches if it matches any of them,
//! i.e. `0 9 * * mon-fri | 0 12 * * sat,sun`.
//!
//! Short aliases for well-known expressions are allowed:
//!
//! | Alias                      | Expression  |
//! |----------------------------|-------------|
//! | `@yearly` (or `@annually`) | 0 0 1 1 ?   |
//! | `@monthly`                 | 0 0 1 * ?   |
//! | `@weekly`                  | 0 0 ? * 0   |
//! | `@daily` (or `@midnight`)  | 0 0 * * ?   |
//! | `@hourly`                  | 0 * * * ?   |
//!
//! ## How to use
//!
//! Two functions work with ISO-8601 strings:
//! - [get_future_matches()]: returns formatted times of the upcoming matches, see [`MatchOptions`];
//! - [is_time_matches()]: checks whether an instant matches the expression in a timezone.
//!
//! Both accept pattern text or an [`ExpressionSet`] parsed once beforehand,
//! which also has typed methods: [is_match()](ExpressionSet::is_match),
//! [upcoming()](ExpressionSet::upcoming) and [iter()](ExpressionSet::iter).
//!
//! ### Example with `get_future_matches`
//! ```rust
//! use cron_matcher::{get_future_matches, MatchOptions, Result};
//!
//! fn future_matches() -> Result<()> {
//!     let options = MatchOptions::default()
//!         .with_timezone("America/Los_Angeles")
//!         .with_start_at("2020-01-01T00:00:00")
//!         .with_match_count(2);
//!
//!     let matches = get_future_matches("0 22 * *", &options)?;
//!     assert_eq!(matches, vec!["2020-01-02T06:00:00Z", "2020-01-03T06:00:00Z"]);
//!
//!     Ok(())
//! }
//! # future_matches().unwrap();
//! ```
//!
//! ### Example with `iter`
//! ```rust
//! use chrono::Utc;
//! use cron_matcher::{ExpressionSet, Result};
//!
//! fn iterator() -> Result<()> {
//!     let expressions = ExpressionSet::new("0 0 LW * | 0 12 ? * 1#1")?;
//!     let now = Utc::now();
//!
//!     // Get the next 10 matches starting from now
//!     expressions.iter(&now).take(10).for_each(|t| println!("next: {t}"));
//!
//!     Ok(())
//! }
//! # iterator().unwrap();
//! ```
//!
//! # Feature flags
//! * `serde`: adds [`Serialize`](https://docs.rs/serde/latest/serde/trait.Serialize.html) and [`Deserialize`](https://docs.rs/serde/latest/serde/trait.Deserialize.html) trait implementation for parsed expressions and options.

/// Crate specific Error implementation.
pub mod error;
mod evaluator;
/// Parsed cron expressions and typed matching.
pub mod expression;
/// String-based matching API.
pub mod matcher;
/// Field patterns of cron expressions.
pub mod pattern;
mod series;
mod utils;

// Re-export of public entities.
pub use error::CronError;
pub use expression::{Expression, ExpressionSet, ParseOptions};
pub use matcher::{get_future_matches, is_time_matches, CronInput, MatchOptions, MatchValidator};
pub use pattern::{FieldKind, FieldPattern, FieldValue, PatternItem};

/// Convenient alias for `Result`.
pub type Result<T, E = CronError> = std::result::Result<T, E>;
