//! System offset reads against a changing `TZ`.
//!
//! Kept to a single test in its own binary because it mutates the
//! process-wide environment.

use std::env;

use moment::{Moment, OffsetSource, SystemOffset};

#[test]
fn test_system_offset_follows_tz_changes() {
    let saved = env::var_os("TZ");

    let cases = [("<+01>-1", 60), ("<-01>1", -60), ("UTC0", 0), ("<+0530>-5:30", 330)];
    let mut seen = Vec::new();
    for (tz, _) in cases {
        env::set_var("TZ", tz);
        seen.push((Moment::system_offset_minutes(), SystemOffset.offset_minutes()));
    }

    match saved {
        Some(value) => env::set_var("TZ", value),
        None => env::remove_var("TZ"),
    }

    for ((tz, expected), (via_moment, via_source)) in cases.iter().zip(seen) {
        assert_eq!(via_moment, *expected, "TZ = {tz}");
        assert_eq!(via_source, *expected, "TZ = {tz}");
    }
}
