//! # Alarm Presenter
//!
//! Shows the medication alarm and rings until acknowledged.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Banner, bell and stop line go to a configurable writer
//! - 1.0.0: Initial release

use log::{debug, info, warn};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::format::format_time;
use super::model::Reminder;

/// Receives firings from the scheduler
pub trait AlarmPresenter: Send + Sync {
    /// Show the alarm for `reminder` and start the tone
    fn trigger(&self, reminder: &Reminder);

    /// Silence the tone and dismiss the alarm; no-op when idle
    fn stop(&self);

    fn is_active(&self) -> bool;
}

/// Tone loop settings
#[derive(Debug, Clone, Copy)]
pub struct AlarmTone {
    pub period: Duration,
}

impl Default for AlarmTone {
    fn default() -> Self {
        AlarmTone {
            period: Duration::from_secs(1),
        }
    }
}

/// Output shared between the alarm and its tone task
type AlarmOutput = Arc<Mutex<Box<dyn Write + Send>>>;

/// Alarm rendered on a terminal writer (stdout by default), ringing the bell
/// once per period
pub struct TerminalAlarm {
    tone: AlarmTone,
    out: AlarmOutput,
    ringing: Mutex<Option<JoinHandle<()>>>,
}

impl Default for TerminalAlarm {
    fn default() -> Self {
        Self::new(AlarmTone::default())
    }
}

impl TerminalAlarm {
    pub fn new(tone: AlarmTone) -> Self {
        Self::with_writer(tone, std::io::stdout())
    }

    pub fn with_writer<W: Write + Send + 'static>(tone: AlarmTone, writer: W) -> Self {
        TerminalAlarm {
            tone,
            out: Arc::new(Mutex::new(Box::new(writer))),
            ringing: Mutex::new(None),
        }
    }

    fn ringing(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ringing.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{text}").and_then(|_| out.flush()) {
            warn!("Failed to write alarm output: {e}");
        }
    }

    fn spawn_tone(&self) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime available, alarm will be silent");
                return None;
            }
        };

        let period = self.tone.period;
        let out = self.out.clone();
        Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let rang = {
                    let mut out = out.lock().unwrap_or_else(|e| e.into_inner());
                    out.write_all(b"\x07").and_then(|_| out.flush()).is_ok()
                };
                if !rang {
                    debug!("Alarm output closed, ending tone");
                    break;
                }
            }
        }))
    }
}

impl AlarmPresenter for TerminalAlarm {
    fn trigger(&self, reminder: &Reminder) {
        self.write_line(&render_banner(reminder));

        let tone = self.spawn_tone();
        if let Some(previous) = std::mem::replace(&mut *self.ringing(), tone) {
            previous.abort();
        }
    }

    fn stop(&self) {
        if let Some(tone) = self.ringing().take() {
            tone.abort();
            info!("Alarm acknowledged");
            self.write_line("🔕 Alarm stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.ringing()
            .as_ref()
            .is_some_and(|tone| !tone.is_finished())
    }
}

/// Multi-line alarm text: medication, 12-hour time, optional notes
pub fn render_banner(reminder: &Reminder) -> String {
    let time = format_time(reminder.time.as_deref().unwrap_or(""));
    let mut banner = format!(
        "\n⏰ Medication Reminder\n💊 Time to take {}\n🕐 Scheduled for {}",
        reminder.medication_name, time
    );
    if !reminder.notes.trim().is_empty() {
        banner.push_str(&format!("\n📝 {}", reminder.notes.trim()));
    }
    banner.push_str("\nPress Enter to stop the alarm.");
    banner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::model::Frequency;

    /// Writer whose bytes stay inspectable after the alarm takes ownership
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }

        fn bells(&self) -> usize {
            self.0.lock().unwrap().iter().filter(|b| **b == 0x07).count()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn buffered_alarm(period: Duration) -> (TerminalAlarm, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let alarm = TerminalAlarm::with_writer(AlarmTone { period }, buffer.clone());
        (alarm, buffer)
    }

    fn reminder(notes: &str) -> Reminder {
        Reminder {
            id: 7,
            medication_name: "Metformin".to_string(),
            date: None,
            time: Some("21:05".to_string()),
            frequency: Frequency::Daily,
            notes: notes.to_string(),
        }
    }

    #[test]
    fn test_render_banner() {
        let banner = render_banner(&reminder("with water"));
        assert!(banner.contains("Time to take Metformin"));
        assert!(banner.contains("9:05 PM"));
        assert!(banner.contains("📝 with water"));

        let banner = render_banner(&reminder("  "));
        assert!(!banner.contains("📝"));
    }

    #[tokio::test]
    async fn test_trigger_then_stop() {
        let (alarm, buffer) = buffered_alarm(Duration::from_millis(10));
        assert!(!alarm.is_active());

        alarm.trigger(&reminder("with water"));
        assert!(alarm.is_active());
        assert!(buffer.contents().contains("Time to take Metformin"));
        assert!(buffer.contents().contains("📝 with water"));

        alarm.stop();
        assert!(!alarm.is_active());
        assert!(buffer.contents().contains("🔕 Alarm stopped"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tone_rings_until_stopped() {
        let (alarm, buffer) = buffered_alarm(Duration::from_secs(1));

        alarm.trigger(&reminder(""));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        let rung = buffer.bells();
        assert!(rung >= 2, "expected repeated bells, got {rung}");

        alarm.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(buffer.bells(), rung);
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let (alarm, buffer) = buffered_alarm(Duration::from_secs(1));
        alarm.stop();
        alarm.stop();
        assert!(!alarm.is_active());
        assert!(buffer.contents().is_empty());
    }

    #[tokio::test]
    async fn test_retrigger_replaces_tone() {
        let (alarm, _buffer) = buffered_alarm(Duration::from_secs(1));
        alarm.trigger(&reminder(""));
        alarm.trigger(&reminder(""));
        assert!(alarm.is_active());

        alarm.stop();
        assert!(!alarm.is_active());
    }
}
