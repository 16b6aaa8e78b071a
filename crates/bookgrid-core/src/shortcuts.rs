#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum Platform {
  Mac,
  #[default]
  Other
}

impl Platform {
  /// Classifies `navigator.platform`.
  pub fn detect(navigator_platform: &str) -> Self {
    if navigator_platform
      .to_ascii_uppercase()
      .contains("MAC")
    {
      Platform::Mac
    } else {
      Platform::Other
    }
  }
}

/// A key press, as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
  pub key:   String,
  pub ctrl:  bool,
  pub meta:  bool,
  pub shift: bool,
  pub alt:   bool
}

impl KeyPress {
  pub fn plain(key: &str) -> Self {
    Self {
      key: key.to_string(),
      ..Self::default()
    }
  }

  pub fn with_ctrl(key: &str) -> Self {
    Self {
      key: key.to_string(),
      ctrl: true,
      ..Self::default()
    }
  }

  pub fn with_meta(key: &str) -> Self {
    Self {
      key: key.to_string(),
      meta: true,
      ..Self::default()
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Shortcut {
  Copy,
  Paste,
  Cancel
}

/// Maps key presses to clipboard
/// shortcuts.
#[derive(Debug, Clone, Copy)]
pub struct ShortcutRouter {
  platform: Platform
}

impl ShortcutRouter {
  pub fn new(platform: Platform) -> Self {
    Self { platform }
  }

  pub fn platform(&self) -> Platform {
    self.platform
  }

  /// `text_entry_focused` comes from the
  /// host; typing is never intercepted.
  pub fn route(
    &self,
    press: &KeyPress,
    text_entry_focused: bool
  ) -> Option<Shortcut> {
    if text_entry_focused {
      return None;
    }

    let key = press.key.to_lowercase();
    if key == "escape" {
      return Some(Shortcut::Cancel);
    }

    let primary = match self.platform {
      | Platform::Mac => press.meta,
      | Platform::Other => press.ctrl
    };
    if !primary || press.shift || press.alt
    {
      return None;
    }

    match key.as_str() {
      | "c" => Some(Shortcut::Copy),
      | "v" => Some(Shortcut::Paste),
      | _ => None
    }
  }

  pub fn copy_label(&self) -> &'static str {
    match self.platform {
      | Platform::Mac => "⌘C",
      | Platform::Other => "Ctrl+C"
    }
  }

  pub fn paste_label(&self) -> &'static str {
    match self.platform {
      | Platform::Mac => "⌘V",
      | Platform::Other => "Ctrl+V"
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn primary_modifier_follows_the_platform(
  ) {
    let mac = ShortcutRouter::new(Platform::Mac);
    let pc =
      ShortcutRouter::new(Platform::Other);

    assert_eq!(
      mac.route(&KeyPress::with_meta("c"), false),
      Some(Shortcut::Copy)
    );
    assert_eq!(
      mac.route(&KeyPress::with_ctrl("c"), false),
      None
    );
    assert_eq!(
      pc.route(&KeyPress::with_ctrl("V"), false),
      Some(Shortcut::Paste)
    );
    assert_eq!(
      pc.route(&KeyPress::plain("v"), false),
      None
    );
  }

  #[test]
  fn chords_and_text_entry_are_ignored() {
    let router =
      ShortcutRouter::new(Platform::Other);
    let mut shifted = KeyPress::with_ctrl("c");
    shifted.shift = true;

    assert_eq!(router.route(&shifted, false), None);
    assert_eq!(
      router.route(&KeyPress::with_ctrl("c"), true),
      None
    );
    assert_eq!(
      router.route(&KeyPress::plain("Escape"), true),
      None
    );
  }

  #[test]
  fn escape_cancels_without_modifier() {
    let router = ShortcutRouter::new(Platform::Mac);
    assert_eq!(
      router.route(&KeyPress::plain("Escape"), false),
      Some(Shortcut::Cancel)
    );
  }

  #[test]
  fn detects_platform_and_labels() {
    assert_eq!(Platform::detect("MacIntel"), Platform::Mac);
    assert_eq!(
      Platform::detect("Win32"),
      Platform::Other
    );
    assert_eq!(
      ShortcutRouter::new(Platform::Mac).paste_label(),
      "⌘V"
    );
    assert_eq!(
      ShortcutRouter::new(Platform::Other).copy_label(),
      "Ctrl+C"
    );
  }
}
