use serde::{Deserialize, Serialize};

/// Which pane owns the keyboard. Keybindings are looked up per mode.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
  // user config files come through `config`, which lowercases keys
  #[serde(alias = "settings")]
  Settings,
  #[default]
  #[serde(alias = "chat")]
  Chat,
}
