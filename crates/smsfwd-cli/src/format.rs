//! Output formatting for status, stats and the dashboard.

use anyhow::Result;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use smsfwd_core::{DeviceStatus, LoopStats, SignalQuality, Stats, ViewState, evaluate};

use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool, compact: bool) -> Self {
        Self { no_color, compact }
    }

    /// Serialize to JSON, honoring `compact`, with a trailing newline.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }
}

fn format_time(at: Option<OffsetDateTime>) -> String {
    at.and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| "never".to_string())
}

fn signal_line(quality: SignalQuality, summary: &str, opts: &FormatOptions) -> String {
    let value = format!("{:>3}% {}", quality.percentage, style::signal_bar(quality.percentage));
    format!(
        "{} {}",
        style::color_by_signal(&value, quality.level, opts.no_color),
        summary
    )
}

/// Multi-line device status for `smsfwd status`.
pub fn format_status_text(status: &DeviceStatus, opts: &FormatOptions) -> String {
    let view = ViewState {
        device_status: Some(status.clone()),
        ..ViewState::default()
    };
    let quality = view.signal_quality();

    let mut out = String::new();
    out.push_str(&format!(
        "{}   {}\n",
        style::label("Signal:  ", opts.no_color),
        signal_line(quality, &view.signal_summary(), opts)
    ));
    out.push_str(&format!(
        "{}   {} ({})\n",
        style::label("Operator:", opts.no_color),
        view.operator_display(),
        view.number_display()
    ));
    if let Some(version) = view.version_display() {
        out.push_str(&format!(
            "{}   {}\n",
            style::label("Version: ", opts.no_color),
            version
        ));
    }
    out
}

/// Device status plus the derived signal quality.
#[derive(Debug, Serialize)]
pub struct StatusJson<'a> {
    #[serde(flatten)]
    pub status: &'a DeviceStatus,
    pub signal: SignalQuality,
}

pub fn format_status_json(status: &DeviceStatus, opts: &FormatOptions) -> Result<String> {
    opts.as_json(&StatusJson {
        status,
        signal: evaluate(status.rsrp()),
    })
}

/// One-line counters for `smsfwd stats`.
pub fn format_stats_text(stats: &Stats, opts: &FormatOptions) -> String {
    format!(
        "{} {} total, {} today\n",
        style::label("Messages:", opts.no_color),
        stats.total_count,
        stats.today_count
    )
}

/// Full dashboard snapshot for JSON output.
#[derive(Debug, Serialize)]
pub struct DashboardJson<'a> {
    pub controller: &'a str,
    #[serde(flatten)]
    pub state: &'a ViewState,
    pub signal: SignalQuality,
    pub stats_loop: &'a LoopStats,
    pub status_loop: &'a LoopStats,
}

/// Render the dashboard screen.
pub fn format_dashboard_text(
    controller: &str,
    state: &ViewState,
    stats_loop: &LoopStats,
    status_loop: &LoopStats,
    opts: &FormatOptions,
) -> String {
    let no_color = opts.no_color;
    let mut out = String::new();

    out.push_str(&format!(
        "{} {}\n",
        style::label("SMS Forwarder", no_color),
        style::muted(controller, no_color)
    ));
    out.push_str(&format!("{}\n", "-".repeat(50)));

    let quality = state.signal_quality();
    out.push_str(&format!(
        "{} {}\n",
        style::label("Signal    ", no_color),
        signal_line(quality, &state.signal_summary(), opts)
    ));
    out.push_str(&format!(
        "{} {}\n",
        style::label("Operator  ", no_color),
        state.operator_display()
    ));
    out.push_str(&format!(
        "{} {}\n",
        style::label("Network   ", no_color),
        state.number_display()
    ));

    let messages = if state.stats_loading {
        style::muted("loading...", no_color)
    } else {
        format!("{} total, {} today", state.total_count(), state.today_count())
    };
    out.push_str(&format!("{} {}\n", style::label("Messages  ", no_color), messages));

    if let Some(version) = state.version_display() {
        out.push_str(&format!("{}\n", style::muted(&version, no_color)));
    }

    out.push_str(&format!("{}\n", "-".repeat(50)));
    out.push_str(&style::muted(
        &format!(
            "stats updated {} | status updated {}",
            format_time(state.stats_updated_at),
            format_time(state.status_updated_at)
        ),
        no_color,
    ));
    out.push('\n');

    for (name, stats) in [("stats", stats_loop), ("status", status_loop)] {
        if stats.consecutive_failures > 0 {
            let error = stats.last_error.as_deref().unwrap_or("unknown error");
            out.push_str(&style::muted(
                &format!(
                    "{} refresh failing ({}x): {}",
                    name, stats.consecutive_failures, error
                ),
                no_color,
            ));
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsfwd_core::MobileInfo;

    fn plain() -> FormatOptions {
        FormatOptions::new(true, false)
    }

    fn sample_status() -> DeviceStatus {
        DeviceStatus {
            mobile: Some(MobileInfo {
                rsrp: Some(-95.0),
                operator: Some("CHINA MOBILE".to_string()),
                number: None,
            }),
            version: Some("1.4.2".to_string()),
        }
    }

    #[test]
    fn test_status_text() {
        let text = format_status_text(&sample_status(), &plain());
        assert!(text.contains(" 47% [##...] Fair • RSRP: -95 dBm"));
        assert!(text.contains("CHINA MOBILE (4G LTE)"));
        assert!(text.contains("Script version: 1.4.2"));
    }

    #[test]
    fn test_status_text_without_mobile() {
        let text = format_status_text(&DeviceStatus::default(), &plain());
        assert!(text.contains("  0% [.....] N/A • RSRP: N/A"));
        assert!(!text.contains("Version"));
    }

    #[test]
    fn test_status_json() {
        let json = format_status_json(&sample_status(), &FormatOptions::new(true, true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mobile"]["rsrp"], -95.0);
        assert_eq!(value["signal"]["percentage"], 47);
        assert_eq!(value["signal"]["level"], "Fair");
        assert!(json.ends_with('\n'));
        assert!(!json.trim_end().contains('\n'));
    }

    #[test]
    fn test_stats_text() {
        let stats = Stats {
            total_count: 42,
            today_count: 5,
        };
        assert_eq!(format_stats_text(&stats, &plain()), "Messages: 42 total, 5 today\n");
    }

    #[test]
    fn test_dashboard_loading() {
        let text = format_dashboard_text(
            "http://modem.lan",
            &ViewState::default(),
            &LoopStats::default(),
            &LoopStats::default(),
            &plain(),
        );
        assert!(text.contains("Messages   loading..."));
        assert!(text.contains("Network    4G LTE"));
        assert!(text.contains("stats updated never"));
        assert!(!text.contains("failing"));
    }

    #[test]
    fn test_dashboard_with_data_and_failures() {
        let state = ViewState {
            stats: Some(Stats {
                total_count: 42,
                today_count: 5,
            }),
            device_status: Some(sample_status()),
            stats_loading: false,
            ..ViewState::default()
        };
        let failing = LoopStats {
            consecutive_failures: 2,
            last_error: Some("API error (500): serial port not open".to_string()),
            ..LoopStats::default()
        };
        let text = format_dashboard_text(
            "http://modem.lan",
            &state,
            &LoopStats::default(),
            &failing,
            &plain(),
        );
        assert!(text.contains("Messages   42 total, 5 today"));
        assert!(text.contains("Operator   CHINA MOBILE"));
        assert!(text.contains("status refresh failing (2x): API error (500): serial port not open"));
    }

    #[test]
    fn test_dashboard_json_is_flat() {
        let state = ViewState::default();
        let loop_stats = LoopStats::default();
        let json = FormatOptions::new(true, true)
            .as_json(&DashboardJson {
                controller: "http://modem.lan",
                state: &state,
                signal: state.signal_quality(),
                stats_loop: &loop_stats,
                status_loop: &loop_stats,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["stats_loading"], true);
        assert_eq!(value["signal"]["level"], "NotAvailable");
        assert_eq!(value["controller"], "http://modem.lan");
    }
}
