//! Plain-text rendering of a [`Snapshot`]: one line per metric, a short
//! title plus a detail string.

use std::io::{self, Write};

use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::queue;
use unicode_width::UnicodeWidthStr;

use crate::format::{format_bytes, format_rate, format_uptime};
use crate::system::collector::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub title: String,
    pub detail: String,
}

impl ReportLine {
    fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
        }
    }
}

pub fn render_report(snap: &Snapshot) -> Vec<ReportLine> {
    let mut lines = Vec::with_capacity(6);

    lines.push(ReportLine::new(
        format!("CPU: {:.1}%", snap.cpu.usage_percent),
        if snap.cpu.brand.is_empty() {
            format!("{} cores", snap.cpu.logical_cores)
        } else {
            format!("{} ({} cores)", snap.cpu.brand, snap.cpu.logical_cores)
        },
    ));

    lines.push(ReportLine::new(
        format!("Memory: {:.1}%", snap.memory.percent()),
        format!(
            "Used: {} / Total: {}",
            format_bytes(snap.memory.used as f64),
            format_bytes(snap.memory.total as f64)
        ),
    ));

    if let Some(disk) = &snap.disk {
        lines.push(ReportLine::new(
            format!("Disk: {:.1}%", disk.percent()),
            format!(
                "{} Used: {} / Total: {}",
                disk.mount_point.display(),
                format_bytes(disk.used() as f64),
                format_bytes(disk.total as f64)
            ),
        ));
    }

    if let Some(battery) = &snap.battery {
        lines.push(ReportLine::new(
            format!("Battery: {:.0}%", battery.percent),
            format!("Battery {}", battery.state.label()),
        ));
    }

    let net = &snap.network;
    let title = match &net.interface {
        Some(iface) => format!("Network: {} ({})", iface.name, iface.link_type.label()),
        None => "Network: unknown interface".to_string(),
    };
    lines.push(ReportLine::new(
        title,
        format!(
            "↑ {} ↓ {}, Sent {}, Received {}",
            format_rate(net.rate.upload_bytes_per_sec),
            format_rate(net.rate.download_bytes_per_sec),
            format_bytes(net.rate.total_sent as f64),
            format_bytes(net.rate.total_received as f64)
        ),
    ));

    lines.push(ReportLine::new(
        format!("Uptime: {}", format_uptime(snap.uptime_seconds)),
        format!("Sampled at {}", snap.taken_at.format("%Y-%m-%d %H:%M:%S")),
    ));

    lines
}

/// Write report lines with titles padded to a common display width
pub fn write_report<W: Write>(out: &mut W, lines: &[ReportLine]) -> io::Result<()> {
    let width = lines.iter().map(|l| l.title.width()).max().unwrap_or(0);

    for line in lines {
        let pad = " ".repeat(width - line.title.width() + 2);
        queue!(
            out,
            SetAttribute(Attribute::Bold),
            Print(&line.title),
            SetAttribute(Attribute::Reset),
            Print(pad),
            SetForegroundColor(Color::DarkGrey),
            Print(&line.detail),
            ResetColor,
            Print("\n"),
        )?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_pads_titles() {
        let lines = vec![
            ReportLine::new("CPU: 5.0%", "4 cores"),
            ReportLine::new("Uptime: 00:00:01", "now"),
        ];
        let mut out = Vec::new();
        write_report(&mut out, &lines).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("CPU: 5.0%"));
        assert!(text.contains(&" ".repeat(9)));
        assert_eq!(text.matches('\n').count(), 2);
    }
}
