use super::app_logic::TuiApp;
use super::app_state::action_for;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;

pub(super) fn handle_events(app: &mut TuiApp) -> Result<()> {
    if event::poll(Duration::from_millis(50))? {
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                if let Some(action) = action_for(key_event) {
                    app.apply(action);
                }
            }
            Event::Mouse(mouse_event) => app.handle_mouse(mouse_event),
            _ => {}
        }
    }
    Ok(())
}
