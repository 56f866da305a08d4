//! Background maintainer (component G, spec §4.7): keeps `genre_auto`
//! channels topped up without anyone having to call generate-schedule by
//! hand.

use chrono::{NaiveTime, Utc};
use jellystream_core::context::Context;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

const MISFIRE_GRACE: chrono::Duration = chrono::Duration::hours(1);

/// Run the maintainer loop forever, firing once per day at `fire_time_utc`
/// ("HH:MM"). Intended to be spawned as a background task alongside the
/// HTTP server.
///
/// The first wait tolerates a misfire (the process was down through
/// `fire_time`) and fires immediately. Every wait after that targets the
/// next calendar day's `fire_time` directly, so a fire that lands inside
/// the grace window is never re-counted as still pending.
pub async fn run(ctx: Context) {
    let fire_time = parse_fire_time(&ctx.config.scheduler.fire_time_utc);
    let mut next_fire = next_occurrence(Utc::now(), fire_time);

    loop {
        let wait = (next_fire - Utc::now()).to_std().unwrap_or(Duration::from_secs(0));
        sleep(wait).await;
        sweep(&ctx).await;
        next_fire = next_fire.date_naive().and_time(fire_time).and_utc() + chrono::Duration::days(1);
    }
}

fn parse_fire_time(raw: &str) -> NaiveTime {
    NaiveTime::parse_from_str(raw, "%H:%M").unwrap_or_else(|_| {
        warn!(fire_time_utc = raw, "invalid scheduler.fire_time_utc, defaulting to 02:00");
        NaiveTime::from_hms_opt(2, 0, 0).expect("valid constant time")
    })
}

/// The next instant the maintainer should fire, tolerating up to
/// [`MISFIRE_GRACE`] of having just missed `fire_time` (e.g. the process
/// was down). Used once at startup; subsequent fires are scheduled by
/// advancing a full day from the previous fire instead of re-checking this
/// grace window, so a consumed fire is never mistaken for a pending one.
fn next_occurrence(now: chrono::DateTime<Utc>, fire_time: NaiveTime) -> chrono::DateTime<Utc> {
    let today_fire = now.date_naive().and_time(fire_time).and_utc();
    let missed_within_grace = now >= today_fire && now - today_fire <= MISFIRE_GRACE;
    if missed_within_grace {
        return now;
    }
    if now < today_fire {
        today_fire
    } else {
        today_fire + chrono::Duration::days(1)
    }
}

/// Delay until the next occurrence of `fire_time`, tolerating up to
/// [`MISFIRE_GRACE`] of having just missed it (e.g. the process was down).
fn next_fire_delay(now: chrono::DateTime<Utc>, fire_time: NaiveTime) -> Duration {
    (next_occurrence(now, fire_time) - now).to_std().unwrap_or(Duration::from_secs(0))
}

/// One maintenance pass: extend every channel within `low_water_hours` of
/// running dry. Per-channel failures are isolated (spec §4.7 step 3).
async fn sweep(ctx: &Context) {
    let channels = match ctx.channels.list_enabled_genre_auto().await {
        Ok(channels) => channels,
        Err(e) => {
            error!(error = %e, "maintainer: failed to enumerate channels, skipping this cycle");
            return;
        }
    };

    let now = Utc::now();
    let low_water = chrono::Duration::hours(ctx.config.scheduler.low_water_hours);
    let extend_days = ctx.config.scheduler.extend_days;
    let mut extended = 0usize;

    for channel in channels {
        let needs_extension = match channel.schedule_generated_through {
            None => true,
            Some(watermark) => watermark - now <= low_water,
        };
        if !needs_extension {
            continue;
        }
        match jellystream_core::schedule::generate(ctx, channel.id, extend_days).await {
            Ok(entries_created) => {
                info!(channel_id = %channel.id, entries_created, "maintainer extended channel");
                extended += 1;
            }
            Err(e) => {
                error!(channel_id = %channel.id, error = %e, "maintainer failed to extend channel");
            }
        }
    }

    info!(extended, "maintainer sweep complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 27, h, m, 0).unwrap()
    }

    #[test]
    fn fires_later_today_when_before_fire_time() {
        let fire_time = NaiveTime::from_hms_opt(2, 0, 0).unwrap();
        let delay = next_fire_delay(at(0, 0), fire_time);
        assert_eq!(delay, Duration::from_secs(2 * 3600));
    }

    #[test]
    fn fires_immediately_within_misfire_grace() {
        let fire_time = NaiveTime::from_hms_opt(2, 0, 0).unwrap();
        let delay = next_fire_delay(at(2, 30), fire_time);
        assert_eq!(delay, Duration::from_secs(0));
    }

    #[test]
    fn schedules_for_tomorrow_once_grace_window_has_passed() {
        let fire_time = NaiveTime::from_hms_opt(2, 0, 0).unwrap();
        let delay = next_fire_delay(at(4, 0), fire_time);
        assert_eq!(delay, Duration::from_secs(22 * 3600));
    }
}
