//! Component trait — the building block for every UI element.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::theme::Theme;

/// Every screen implements Component.
///
/// Lifecycle: `init` → (`handle_key_event` | `update` | `render`)*
pub trait Component: Send {
    /// Called once when the component is mounted.
    /// Receives the action sender for dispatching actions to the app loop.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// Handle a keyboard event. Return an Action to dispatch, or None.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Render into the provided frame area with the active theme.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Set focus state.
    fn set_focused(&mut self, _focused: bool) {}

    /// True while the component is capturing free text (e.g. a search
    /// box); global keybindings are suspended so characters reach it.
    fn wants_text_input(&self) -> bool {
        false
    }

    /// One-line key hint for the status bar while this screen is active.
    fn key_hints(&self) -> &'static str {
        ""
    }
}
