//! Terminal bell on notable battle moments.
use std::io::Write;

use battle_protocol::Winner;
use client_frontend_core::{Achievement, NoopHooks, SessionHooks};
use runtime::{Notice, NoticeLevel};

/// Rings the terminal bell for warnings, finished battles and achievements.
#[derive(Debug, Default)]
pub struct BellHooks;

impl BellHooks {
    fn ring(&self) {
        let mut stdout = std::io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|()| stdout.flush()) {
            tracing::debug!("bell failed: {err}");
        }
    }
}

impl SessionHooks for BellHooks {
    fn on_notice(&mut self, notice: &Notice) {
        if matches!(notice.level, NoticeLevel::Warning | NoticeLevel::Error) {
            self.ring();
        }
    }

    fn on_battle_finished(&mut self, _winner: Option<Winner>) {
        self.ring();
    }

    fn on_achievement(&mut self, _achievement: Achievement) {
        self.ring();
    }
}

/// Hooks matching the sound preference.
pub fn for_sound(enabled: bool) -> Box<dyn SessionHooks> {
    if enabled {
        Box::new(BellHooks)
    } else {
        Box::new(NoopHooks)
    }
}
