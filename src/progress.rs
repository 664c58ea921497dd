//! Download progress bars and a log writer that prints above them.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();

const DOWNLOAD_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})";
const STREAM_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(|| {
        let mp = MultiProgress::new();
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        mp
    })
}

/// Byte-counting bar for one download. `total_bytes` of 0 means the length
/// is unknown and a spinner is drawn instead.
pub fn add_progress_bar(total_bytes: u64) -> ProgressBar {
    let (bar, template) = if total_bytes > 0 {
        (ProgressBar::new(total_bytes), DOWNLOAD_TEMPLATE)
    } else {
        (ProgressBar::no_length(), STREAM_TEMPLATE)
    };
    let style = ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    multi_progress().add(bar.with_style(style))
}

fn print_line(line: &str) {
    let _ = multi_progress().println(line.trim_end_matches('\r'));
}

/// `MakeWriter` for the fmt layer; whole lines go through the shared
/// `MultiProgress` so bars are redrawn below them
#[derive(Default, Clone)]
pub struct LogWriterFactory;

pub struct LogWriter {
    pending: String,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.push_str(&String::from_utf8_lossy(buf));

        while let Some(idx) = self.pending.find('\n') {
            print_line(&self.pending[..idx]);
            self.pending.drain(..=idx);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            print_line(self.pending.trim_end_matches('\n'));
            self.pending.clear();
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            pending: String::new(),
        }
    }
}
