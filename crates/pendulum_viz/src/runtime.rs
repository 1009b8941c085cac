//! Terminal setup and the event loop.
//!
//! One thread owns both the input and the timer. Each iteration polls
//! crossterm for the time left until the next tick, so edits and ticks reach
//! the [`App`] strictly one after the other.

use std::io::{self, Write};
use std::time::Instant;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};

use crate::app::{App, Key, Msg};

/// Maps a crossterm key event to an app key, `None` for keys the app
/// ignores.
#[must_use]
pub fn key_from_crossterm(event: KeyEvent) -> Option<Key> {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Char('c') if ctrl => Some(Key::CtrlC),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Esc => Some(Key::Esc),
        _ => None,
    }
}

/// Translates a terminal event into an app message.
#[must_use]
pub fn msg_from_event(event: Event) -> Option<Msg> {
    match event {
        // Only presses; releases and repeats arrive on some platforms too.
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            key_from_crossterm(key).map(Msg::Key)
        }
        Event::Resize(width, height) => Some(Msg::Resize { width, height }),
        _ => None,
    }
}

/// Raw mode expects explicit carriage returns.
fn to_raw_lines(view: &str) -> String {
    view.replace('\n', "\r\n")
}

/// Runs `app` on stdout until it quits.
///
/// # Errors
///
/// Returns terminal I/O failures. The terminal is restored on every exit
/// path.
pub fn run(app: App) -> io::Result<App> {
    run_with_writer(app, io::stdout())
}

/// Runs `app`, drawing to `writer`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_writer<W: Write>(mut app: App, mut writer: W) -> io::Result<App> {
    enable_raw_mode()?;
    execute!(writer, EnterAlternateScreen, Hide)?;

    let result = event_loop(&mut app, &mut writer);

    let _ = execute!(writer, Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();

    result.map(|()| app)
}

fn event_loop<W: Write>(app: &mut App, writer: &mut W) -> io::Result<()> {
    if let Ok((width, height)) = terminal::size() {
        app.update(Msg::Resize { width, height });
    }

    let tick = app.controller().tick_interval();
    let mut last_view = String::new();
    let mut next_tick = Instant::now() + tick;

    tracing::info!(tick_ms = tick.as_millis(), "event loop started");

    while !app.quitting() {
        render(app, writer, &mut last_view)?;

        let timeout = next_tick.saturating_duration_since(Instant::now());
        if event::poll(timeout)?
            && let Some(msg) = msg_from_event(event::read()?)
        {
            app.update(msg);
        }

        let now = Instant::now();
        if now >= next_tick {
            app.update(Msg::Tick);
            next_tick += tick;
            // Fell behind (suspended terminal, slow recompute): skip ahead
            // rather than replaying missed frames.
            if next_tick < now {
                next_tick = now + tick;
            }
        }
    }

    tracing::info!("event loop finished");
    Ok(())
}

fn render<W: Write>(app: &App, writer: &mut W, last_view: &mut String) -> io::Result<()> {
    let view = app.view();
    if view == *last_view {
        return Ok(());
    }

    execute!(writer, MoveTo(0, 0), Clear(ClearType::All))?;
    write!(writer, "{}", to_raw_lines(&view))?;
    writer.flush()?;

    *last_view = view;
    Ok(())
}
