//! Application core — event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use netdeck_core::Controller;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme::{StylePart, Theme, ThemeKind};
use crate::tui::Tui;

/// How long a toast stays up before expiring on its own.
const TOAST_TTL: Duration = Duration::from_secs(5);
const MAX_TOASTS: usize = 4;

/// Connection status as seen by the TUI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    connection_status: ConnectionStatus,
    help_visible: bool,
    theme: Theme,
    /// Loaded configuration, kept so theme changes can persist.
    config: netdeck_config::Config,
    controller: Option<Controller>,
    toasts: Vec<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    command_tx: mpsc::UnboundedSender<netdeck_core::Command>,
    command_rx: Option<mpsc::UnboundedReceiver<netdeck_core::Command>>,
    bridge_cancel: CancellationToken,
}

impl App {
    pub fn new(controller: Option<Controller>, config: netdeck_config::Config) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();
        let theme = Theme::new(ThemeKind::from_name(config.ui.theme.as_deref()));

        Self {
            active_screen: ScreenId::Dashboard,
            previous_screen: None,
            screens,
            running: true,
            connection_status: ConnectionStatus::default(),
            help_visible: false,
            theme,
            config,
            controller,
            toasts: Vec::new(),
            action_tx,
            action_rx,
            command_tx,
            command_rx: Some(command_rx),
            bridge_cancel: CancellationToken::new(),
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        if let Some(controller) = self.controller.clone() {
            let command_rx = self
                .command_rx
                .take()
                .expect("command receiver taken twice");
            tokio::spawn(spawn_data_bridge(
                controller,
                self.action_tx.clone(),
                command_rx,
                self.bridge_cancel.clone(),
            ));
        } else {
            let _ = self.action_tx.send(Action::Notify(Notification::warning(
                "no profile configured; showing an empty lab",
            )));
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Mouse(_) => {}
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            // Drain and process all queued actions before the next event.
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        self.bridge_cancel.cancel();
        info!("event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Ctrl+C always quits, even mid text entry.
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        // While a screen captures text (search box), it gets every key.
        let capturing = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.wants_text_input());
        if capturing {
            if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                return screen.handle_key_event(key);
            }
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::SHIFT, KeyCode::Char('T')) => {
                return Ok(Some(Action::SetTheme(self.theme.kind().next())));
            }
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='5')) => {
                let n = c as u8 - b'0';
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }
            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }
            _ => {}
        }

        // Delegate to the active screen; Esc falls through to toast
        // dismissal, then back-navigation, when the screen ignores it.
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if let Some(action) = screen.handle_key_event(key)? {
                return Ok(Some(action));
            }
        }

        if key.code == KeyCode::Esc {
            if !self.toasts.is_empty() {
                return Ok(Some(Action::DismissNotification));
            }
            return Ok(Some(Action::GoBack));
        }

        Ok(None)
    }

    /// Process a single action — update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Resize(..) | Action::Render => {}

            Action::Tick => {
                let now = Instant::now();
                self.toasts
                    .retain(|(_, shown)| now.duration_since(*shown) < TOAST_TTL);
            }

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.previous_screen = Some(self.active_screen);
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::SetTheme(kind) => self.set_theme(*kind),

            Action::Connecting => self.connection_status = ConnectionStatus::Connecting,
            Action::Connected => self.connection_status = ConnectionStatus::Connected,
            Action::Disconnected(_) => self.connection_status = ConnectionStatus::Disconnected,
            Action::Reconnecting => self.connection_status = ConnectionStatus::Reconnecting,

            Action::Dispatch(cmd) => {
                if self.command_tx.send(cmd.clone()).is_err() {
                    self.toasts.push((
                        Notification::error("not connected; command dropped"),
                        Instant::now(),
                    ));
                }
            }

            Action::Notify(notification) => {
                self.toasts.push((notification.clone(), Instant::now()));
                if self.toasts.len() > MAX_TOASTS {
                    self.toasts.remove(0);
                }
            }

            Action::DismissNotification => {
                self.toasts.pop();
            }

            // Everything else (data updates in particular) goes to every
            // screen so background screens stay current.
            other => {
                let mut follow_ups = Vec::new();
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(other)? {
                        follow_ups.push(follow_up);
                    }
                }
                for follow_up in follow_ups {
                    self.action_tx.send(follow_up)?;
                }
            }
        }

        Ok(())
    }

    /// Switch theme and persist the choice.
    fn set_theme(&mut self, kind: ThemeKind) {
        self.theme = Theme::new(kind);
        self.config.ui.theme = Some(kind.name().to_owned());
        if let Err(e) = netdeck_config::save_config(&self.config) {
            warn!(error = %e, "failed to persist theme preference");
            self.toasts.push((
                Notification::warning(format!("theme not saved: {e}")),
                Instant::now(),
            ));
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        let theme = self.theme;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.render(frame, layout[0], &theme);
        }

        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);
        self.render_toasts(frame, area);

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    self.theme.style(StylePart::TabActive)
                } else {
                    self.theme.style(StylePart::TabInactive)
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", self.theme.style(StylePart::KeyHint)))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let connection = match self.connection_status {
            ConnectionStatus::Connected => {
                Span::styled("● connected", self.theme.style(StylePart::StatusGood))
            }
            ConnectionStatus::Disconnected => {
                Span::styled("○ disconnected", self.theme.style(StylePart::StatusBad))
            }
            ConnectionStatus::Reconnecting => {
                Span::styled("◐ reconnecting", self.theme.style(StylePart::StatusWarn))
            }
            ConnectionStatus::Connecting => {
                Span::styled("◐ connecting", self.theme.style(StylePart::StatusWarn))
            }
        };

        let screen_hints = self
            .screens
            .get(&self.active_screen)
            .map_or("", |s| s.key_hints());
        let hints = Span::styled(
            format!(" │ {screen_hints} │ T theme  ? help  q quit"),
            self.theme.style(StylePart::KeyHint),
        );

        let line = Line::from(vec![Span::raw(" "), connection, hints]);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Toasts stack in the top-right corner, newest at the top.
    fn render_toasts(&self, frame: &mut Frame, area: Rect) {
        for (i, (notification, _)) in self.toasts.iter().rev().enumerate() {
            let part = match notification.level {
                NotificationLevel::Info => StylePart::ToastInfo,
                NotificationLevel::Success => StylePart::ToastSuccess,
                NotificationLevel::Warning => StylePart::ToastWarning,
                NotificationLevel::Error => StylePart::ToastError,
            };
            let text = format!(" {} ", notification.message);
            #[allow(clippy::cast_possible_truncation)]
            let width = (text.chars().count() as u16 + 2).min(area.width.saturating_sub(2));
            #[allow(clippy::cast_possible_truncation)]
            let y = area.y + 1 + (i as u16) * 3;
            if y + 3 > area.height {
                break;
            }
            let toast_area = Rect::new(area.x + area.width.saturating_sub(width + 1), y, width, 3);

            frame.render_widget(Clear, toast_area);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(self.theme.style(part))
                .style(self.theme.style(StylePart::Overlay));
            let inner = block.inner(toast_area);
            frame.render_widget(block, toast_area);
            frame.render_widget(
                Paragraph::new(Span::styled(text, self.theme.style(part))),
                inner,
            );
        }
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_width = 64u16.min(area.width.saturating_sub(4));
        let help_height = 20u16.min(area.height.saturating_sub(4));
        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);
        frame.render_widget(
            Block::default().style(self.theme.style(StylePart::Overlay)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(self.theme.style(StylePart::Title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.style(StylePart::BorderFocused));
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let key = self.theme.style(StylePart::KeyHintKey);
        let hint = self.theme.style(StylePart::KeyHint);
        let heading = self.theme.style(StylePart::Title);

        let entry = |k: &'static str, text: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {k:<10}"), key),
                Span::styled(text, hint),
            ])
        };

        let help_text = vec![
            Line::from(""),
            Line::from(Span::styled("  Navigation", heading)),
            entry("1-5", "Jump to screen"),
            entry("Tab", "Next screen"),
            entry("j/k ↑/↓", "Move up/down"),
            entry("Esc", "Back / dismiss toast"),
            Line::from(""),
            Line::from(Span::styled("  Topology editor", heading)),
            entry("a / t", "Add node / cycle kind"),
            entry("n / p", "Select next / previous node"),
            entry("m", "Move mode (arrows nudge, m commits)"),
            entry("c", "Connect: arm source, then complete"),
            entry("d / x", "Delete node / disconnect link"),
            entry("s / S", "Start-stop / suspend node"),
            entry("u / r", "Undo / redo"),
            entry("g / R", "Toggle grid snap / reload from server"),
            Line::from(""),
            Line::from(Span::styled("  Global", heading)),
            entry("T / ? / q", "Theme / this help / quit"),
        ];
        frame.render_widget(Paragraph::new(help_text), inner);
    }
}
