use std::time::Duration;

use bookgrid_core::notify::Timers;
use gloo::timers::callback::Timeout;

/// Browser timers via `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimers;

fn millis(delay: Duration) -> u32 {
  u32::try_from(delay.as_millis())
    .unwrap_or(u32::MAX)
}

impl Timers for GlooTimers {
  type Handle = Timeout;

  fn schedule(
    &self,
    delay: Duration,
    task: Box<dyn FnOnce()>
  ) -> Timeout {
    Timeout::new(millis(delay), task)
  }

  fn defer(
    &self,
    delay: Duration,
    task: Box<dyn FnOnce()>
  ) {
    Timeout::new(millis(delay), task).forget();
  }
}
