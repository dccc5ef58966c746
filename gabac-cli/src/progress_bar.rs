use std::sync::{Arc, Mutex};
use std::time::Duration;

use gabac::progress::{ByteNum, ProgressNotifier, Stage};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

#[derive(Debug, Default)]
struct BarState {
    total_bytes: u64,
    initialized: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct GabacProgressBar {
    bar: ProgressBar,
    state: Arc<Mutex<BarState>>,
}

impl GabacProgressBar {
    pub fn new() -> GabacProgressBar {
        let init_bar = ProgressBar::hidden();
        init_bar.set_style(ProgressStyle::default_spinner());
        init_bar.enable_steady_tick(Duration::from_millis(50));
        init_bar.set_message("Reading input...");

        Self {
            bar: init_bar,
            state: Arc::new(Mutex::new(BarState::default())),
        }
    }

    pub fn show(&self) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear()
    }

    fn init(&self) {
        let mut state = self.state.lock().unwrap();
        if state.initialized {
            return;
        }

        let template = if state.total_bytes == 0 {
            "{spinner} {bytes} ({bytes_per_sec}) {msg}"
        } else {
            self.bar.set_length(state.total_bytes);
            "{msg} {wide_bar} {bytes}/{total_bytes} [{elapsed}]"
        };
        self.bar.set_position(0);
        self.bar.set_style(
            ProgressStyle::default_bar()
                .template(template)
                .expect("Invalid progress bar template"),
        );
        state.initialized = true;
    }

    /// Sets the input size; `0` means unknown.
    pub fn set_total_bytes(&self, total_bytes: u64) {
        let mut state = self.state.lock().unwrap();

        state.initialized = false;
        state.total_bytes = total_bytes;
    }

    pub fn println<I: AsRef<str>>(&self, msg: I) {
        self.bar.println(msg);
    }
}

impl ProgressNotifier for GabacProgressBar {
    fn processed_bytes(&self, bytes: ByteNum) {
        self.init();
        self.bar.inc(bytes.get() as u64);
    }

    fn stage(&self, stage: Stage) {
        self.bar.set_message(format!("{}...", stage));
    }
}
