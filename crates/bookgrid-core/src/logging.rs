use std::io::IsTerminal;

use anyhow::anyhow;
use tracing::Level;
use tracing_subscriber::EnvFilter;

const LEVELS: [Level; 5] = [
  Level::ERROR,
  Level::WARN,
  Level::INFO,
  Level::DEBUG,
  Level::TRACE
];

/// Moves `base` one step per `-v` towards
/// trace and one step per `-q` towards
/// error.
pub fn adjust_level(
  base: Level,
  verbose: u8,
  quiet: u8
) -> Level {
  let position = LEVELS
    .iter()
    .position(|level| *level == base)
    .unwrap_or(2);
  let shifted = (position + usize::from(verbose))
    .saturating_sub(usize::from(quiet))
    .min(LEVELS.len() - 1);
  LEVELS[shifted]
}

/// Third-party crates stay at warn; the
/// bookgrid crates log at `level`.
pub fn default_directive(level: Level) -> String {
  let level = level.as_str().to_ascii_lowercase();
  format!(
    "warn,bookgrid_core={level},\
     bookgrid_shared={level},bookgrid_cli={level}"
  )
}

/// Installs the stderr fmt subscriber for
/// native hosts. `RUST_LOG` wins over the
/// configured level; an already installed
/// subscriber is kept.
pub fn init_tracing(level: Level) -> anyhow::Result<()> {
  let env_filter =
    EnvFilter::try_from_default_env()
      .or_else(|_| {
        EnvFilter::try_new(default_directive(level))
      })
      .map_err(|e| {
        anyhow!("invalid log filter: {e}")
      })?;

  let installed = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(true)
    .with_ansi(std::io::stderr().is_terminal())
    .with_writer(std::io::stderr)
    .try_init();

  if let Err(err) = installed {
    tracing::debug!(
      error = %err,
      "subscriber already installed"
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_shift_the_configured_level() {
    assert_eq!(
      adjust_level(Level::INFO, 0, 0),
      Level::INFO
    );
    assert_eq!(
      adjust_level(Level::INFO, 1, 0),
      Level::DEBUG
    );
    assert_eq!(
      adjust_level(Level::INFO, 9, 0),
      Level::TRACE
    );
    assert_eq!(
      adjust_level(Level::WARN, 0, 1),
      Level::ERROR
    );
    assert_eq!(
      adjust_level(Level::ERROR, 0, 3),
      Level::ERROR
    );
    assert_eq!(
      adjust_level(Level::WARN, 2, 1),
      Level::INFO
    );
  }

  #[test]
  fn directives_parse_as_filters() {
    let directive = default_directive(Level::DEBUG);
    assert!(directive.contains("bookgrid_core=debug"));
    assert!(directive.starts_with("warn,"));
    EnvFilter::try_new(&directive)
      .expect("valid directive");
  }

  #[test]
  fn second_install_is_tolerated() {
    init_tracing(Level::DEBUG).expect("first install");
    init_tracing(Level::WARN).expect("second install");
  }
}
