// Console reporter
//
// Renders monitor events as human-readable text blocks on a writer
// (stdout in the binary).

use crate::models::DownloadStatusRecord;
use crate::monitor::{EventSink, MonitorEvent};
use chrono::Local;
use std::io::Write;

const RULE_WIDTH: usize = 70;

/// Writes monitor events as text.
///
/// Write failures (a closed stdout, for instance) are logged and otherwise
/// ignored; they never stop the monitor.
pub struct ConsoleReporter<W: Write> {
    out: W,
    /// Most recent record shown, for the empty-poll hint
    last_record: Option<DownloadStatusRecord>,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_record: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, event: &MonitorEvent) -> std::io::Result<()> {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        match event {
            MonitorEvent::InstallNotFound => {
                writeln!(self.out, "Error: Steam installation not found.")?;
            }
            MonitorEvent::Started {
                install_root,
                source,
                schedule,
                warning,
            } => {
                writeln!(self.out, "{}", heavy)?;
                writeln!(self.out, "STEAM DOWNLOAD MONITOR")?;
                writeln!(self.out, "{}", heavy)?;
                writeln!(self.out, "Steam path: {}", install_root)?;
                writeln!(self.out, "Watching:   {}", source)?;
                if schedule.single_poll {
                    writeln!(self.out, "Mode:       single check")?;
                } else {
                    let minutes = schedule.duration.as_secs() / 60;
                    writeln!(self.out, "Duration:   {} minutes", minutes)?;
                    writeln!(self.out, "Interval:   {} seconds", schedule.interval.as_secs())?;
                }
                writeln!(self.out, "{}", heavy)?;
                if let Some(warning) = warning {
                    writeln!(self.out, "Warning: {}", warning)?;
                }
            }
            MonitorEvent::Polled { poll, records } => {
                writeln!(self.out)?;
                writeln!(self.out, "[{}] Check #{}", Local::now().format("%H:%M:%S"), poll)?;
                writeln!(self.out, "{}", light)?;
                if !records.is_empty() {
                    for record in records {
                        self.render_record(record)?;
                    }
                    self.last_record = records.last().cloned();
                } else if let Some(last) = &self.last_record {
                    writeln!(self.out, "Last download: {}", last.display_name)?;
                    writeln!(self.out, "No active downloads")?;
                } else {
                    writeln!(self.out, "No active downloads")?;
                    writeln!(self.out, "Start a download in Steam to begin monitoring")?;
                }
                writeln!(self.out, "{}", light)?;
            }
            MonitorEvent::Completed { polls } => {
                writeln!(self.out)?;
                writeln!(self.out, "{}", heavy)?;
                writeln!(self.out, "MONITORING COMPLETE ({} checks)", polls)?;
                writeln!(self.out, "{}", heavy)?;
            }
            MonitorEvent::Interrupted { polls } => {
                writeln!(self.out)?;
                writeln!(self.out, "Monitoring stopped by user after {} checks.", polls)?;
            }
        }

        self.out.flush()
    }

    fn render_record(&mut self, record: &DownloadStatusRecord) -> std::io::Result<()> {
        writeln!(self.out, "Game:   {}", record.display_name)?;
        if record.status.is_downloading() {
            writeln!(
                self.out,
                "Speed:  {:.2} MB/s ({:.2} Mbps)",
                record.speed_mbps,
                record.speed_mbit()
            )?;
            writeln!(self.out, "Status: downloading")?;
        } else {
            writeln!(self.out, "Speed:  0.00 MB/s")?;
            writeln!(self.out, "Status: paused")?;
        }
        writeln!(self.out)
    }
}

impl<W: Write> EventSink for ConsoleReporter<W> {
    fn emit(&mut self, event: MonitorEvent) {
        if let Err(e) = self.render(&event) {
            tracing::warn!("Failed to write monitor output: {}", e);
        }
    }
}
