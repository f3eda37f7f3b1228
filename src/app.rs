use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use crossterm::event;
use ratatui::{Terminal, backend::Backend};
use tracing::{debug, error, info};

use crate::dashboard::{Dashboard, Flow, Message};
use crate::view;

/// Draw, wait for the next message, apply it. Returns once the dashboard
/// asks to quit or every sender has gone away.
pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    dashboard: &mut Dashboard,
    messages: &Receiver<Message>,
) -> Result<()> {
    loop {
        terminal
            .draw(|f| view::render(f, dashboard))
            .context("failed to draw frame")?;

        let Ok(message) = messages.recv() else {
            info!("All message senders closed, stopping");
            break;
        };

        if dashboard.handle(message) == Flow::Quit {
            break;
        }
    }
    Ok(())
}

/// Forward terminal events onto the message queue from a background thread.
pub fn spawn_input_reader(sender: Sender<Message>) {
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(input) => {
                    if sender.send(Message::Input(input)).is_err() {
                        debug!("Input reader stopping: dashboard closed");
                        break;
                    }
                }
                Err(err) => {
                    error!("Failed to read terminal event: {}", err);
                    break;
                }
            }
        }
    });
}
