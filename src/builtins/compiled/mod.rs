//! Methods that resolve time zones through the compiled tz database.
//!
//! Each method here forwards to its `_with_provider` counterpart in `core`
//! with [`TZ_PROVIDER`](crate::builtins::TZ_PROVIDER).

mod date;
mod duration;
mod instant;
mod plain_date_time;
mod timezone;
mod zoneddatetime;
