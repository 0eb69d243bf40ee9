//! Duration labels <-> minutes
//!
//! Plan durations are advisory text ("45m", "1:30", "90–105m"). Anything we
//! can't read counts as zero minutes instead of failing the render.

/// Label used for sessions that carry no duration (rest days).
pub const NO_DURATION: &str = "—";

/// Durations at or above this many minutes are shown as h:mm.
const HOURS_FORMAT_THRESHOLD: u32 = 120;

/// Parse a duration label into whole minutes.
///
/// Accepts the no-duration sentinel, a single value ("45m", "45", "1:30",
/// "2h") or a range joined by an en-dash or hyphen ("90–105m"), which yields
/// the rounded average of both ends.
pub fn parse_duration(label: &str) -> u32 {
  let label = label.trim();
  if is_no_duration(label) {
    return 0;
  }

  let range = label
    .split_once('–')
    .or_else(|| label.split_once('-'))
    .filter(|(lo, hi)| !lo.trim().is_empty() && !hi.trim().is_empty());

  let minutes = match range {
    Some((lo, hi)) => match (parse_single(lo), parse_single(hi)) {
      (Some(lo), Some(hi)) => Some(((lo + hi) / 2.0).round()),
      _ => None,
    },
    None => parse_single(label).map(f64::round),
  };

  match minutes {
    Some(m) if m >= 0.0 => m as u32,
    _ => {
      tracing::debug!(label, "Unparseable duration, counting as 0 minutes");
      0
    }
  }
}

/// Scale `minutes` by `1 - reduction` and format the result.
///
/// A reduction of 0 reformats the same minute count.
pub fn format_reduced(minutes: u32, reduction: f64) -> String {
  let factor = 1.0 - reduction.clamp(0.0, 1.0);
  let reduced = (minutes as f64 * factor).round().max(0.0) as u32;
  format_minutes(reduced)
}

/// Format minutes as "{n}m", or "h:mm" from two hours up.
pub fn format_minutes(minutes: u32) -> String {
  if minutes >= HOURS_FORMAT_THRESHOLD {
    format!("{}:{:02}", minutes / 60, minutes % 60)
  } else {
    format!("{}m", minutes)
  }
}

/// Reduce a label in place of its minutes. Labels without a readable
/// duration are returned unchanged so rest markers keep their sentinel.
pub fn reduce_label(label: &str, reduction: f64) -> String {
  match parse_duration(label) {
    0 => label.to_string(),
    minutes => format_reduced(minutes, reduction),
  }
}

fn is_no_duration(label: &str) -> bool {
  label.is_empty()
    || label == NO_DURATION
    || label == "-"
    || label.eq_ignore_ascii_case("none")
    || label.eq_ignore_ascii_case("n/a")
}

/// One endpoint: "h:mm", "{n}h", "{n}m", "{n}min" or a bare number of minutes.
fn parse_single(raw: &str) -> Option<f64> {
  let s = raw.trim().to_ascii_lowercase();

  if let Some((h, m)) = s.split_once(':') {
    let hours: u32 = h.trim().parse().ok()?;
    let mins: u32 = m.trim().trim_end_matches('m').parse().ok()?;
    return Some(hours.checked_mul(60)?.checked_add(mins)? as f64);
  }

  if let Some(hours) = s.strip_suffix('h') {
    let hours: f64 = hours.trim().parse().ok()?;
    return Some(hours * 60.0);
  }

  let number = s
    .strip_suffix("mins")
    .or_else(|| s.strip_suffix("min"))
    .or_else(|| s.strip_suffix('m'))
    .unwrap_or(&s);
  let value: f64 = number.trim().parse().ok()?;
  value.is_finite().then_some(value)
}
