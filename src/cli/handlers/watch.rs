//! Watch command handler
//!
//! Follows the live feed, redraws the grouped view after every change and
//! takes commands from stdin. A finished subscription is replaced after the
//! configured reconnect delay; there is no backoff.

use std::future::Future;
use std::io::{IsTerminal, Write};
use std::pin::Pin;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Sleep, sleep};

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::external::audio::build_sink;
use crate::external::stream::{HttpStreamAdapter, StreamAdapter, StreamSignal, Subscription, subscribe};
use crate::presentation::{HELP, UserCommand, parse_command, render_feed};
use crate::services::{FeedSession, SessionStats, SoundGate};

/// Clears the terminal and homes the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub struct WatchCommandHandler {
    config: Settings,
    unlock_on_start: bool,
    clear_screen: bool,
}

enum Flow {
    Continue,
    Redraw,
    Quit,
}

impl WatchCommandHandler {
    /// `unlock_on_start` treats `--sound` as the user's unlock action.
    pub fn new(config: Settings, unlock_on_start: bool) -> Self {
        Self {
            config,
            unlock_on_start,
            clear_screen: false,
        }
    }

    pub async fn execute(mut self) -> AppResult<()> {
        self.clear_screen = std::io::stdout().is_terminal();

        let url = self.config.stream.url.clone();
        let timeout = self.config.stream.connect_timeout();
        tracing::info!(url = %url, "Watching live feed");

        let stats = self
            .run(
                move || HttpStreamAdapter::new(url.clone(), timeout),
                BufReader::new(tokio::io::stdin()),
                std::io::stdout(),
                shutdown_signal(),
            )
            .await?;

        tracing::info!(
            connections = stats.connections,
            events = stats.events_added,
            sounds = stats.sounds_requested,
            "Stopped watching"
        );
        Ok(())
    }

    /// Drive a session until `shutdown` resolves or the user quits.
    ///
    /// `connect` is called for the first subscription and again after every
    /// reconnect delay.
    pub async fn run<F, A, R, W, S>(
        &self,
        mut connect: F,
        input: R,
        mut out: W,
        shutdown: S,
    ) -> AppResult<SessionStats>
    where
        F: FnMut() -> AppResult<A>,
        A: StreamAdapter + 'static,
        R: AsyncBufRead + Unpin,
        W: Write,
        S: Future<Output = ()>,
    {
        let tz = self.config.feed.time_zone()?;
        let gate = SoundGate::new(build_sink(&self.config.sound));
        let mut session = FeedSession::new(self.config.feed.dedup, self.config.feed.criteria(), gate.clone());

        let (tx, mut signals) = mpsc::unbounded_channel::<StreamSignal>();
        let mut subscription = Some(subscribe(connect()?, tx.clone()));
        let mut reconnect: Option<Pin<Box<Sleep>>> = None;
        let mut unlock = self.unlock_on_start.then(|| gate.spawn_unlock());

        let mut lines = input.lines();
        let mut input_open = true;
        tokio::pin!(shutdown);

        self.draw(&mut out, &render_feed(&session, &tz))?;

        loop {
            let flow = tokio::select! {
                _ = &mut shutdown => Flow::Quit,

                Some(signal) = signals.recv() => {
                    if session.apply(signal).changes_view() { Flow::Redraw } else { Flow::Continue }
                }

                line = lines.next_line(), if input_open => match line {
                    Ok(Some(line)) => self.on_input(&line, &mut session, &gate, &mut unlock, &mut out)?,
                    Ok(None) => {
                        tracing::debug!("Input closed, commands disabled");
                        input_open = false;
                        Flow::Continue
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Reading input failed, commands disabled");
                        input_open = false;
                        Flow::Continue
                    }
                },

                armed = wait_unlock(&mut unlock) => {
                    if !armed {
                        writeln!(out, "Sound could not be enabled, type `sound` to try again.")?;
                    }
                    Flow::Redraw
                }

                _ = wait_finished(&mut subscription) => {
                    subscription = None;
                    tracing::info!(
                        delay_secs = self.config.stream.reconnect_delay_secs,
                        "Feed ended, reconnecting after delay"
                    );
                    reconnect = Some(Box::pin(sleep(self.config.stream.reconnect_delay())));
                    Flow::Continue
                }

                _ = wait_sleep(&mut reconnect) => {
                    reconnect = None;
                    match connect() {
                        Ok(adapter) => subscription = Some(subscribe(adapter, tx.clone())),
                        Err(e) => {
                            tracing::warn!(error = %e, "Cannot create stream adapter, retrying after delay");
                            reconnect = Some(Box::pin(sleep(self.config.stream.reconnect_delay())));
                        }
                    }
                    Flow::Continue
                }
            };

            match flow {
                Flow::Continue => {}
                Flow::Redraw => self.draw(&mut out, &render_feed(&session, &tz))?,
                Flow::Quit => break,
            }
        }

        if let Some(subscription) = subscription {
            subscription.cancel();
        }
        Ok(session.stats())
    }

    fn on_input<W: Write>(
        &self,
        line: &str,
        session: &mut FeedSession,
        gate: &SoundGate,
        unlock: &mut Option<JoinHandle<bool>>,
        out: &mut W,
    ) -> AppResult<Flow> {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                writeln!(out, "{e}")?;
                return Ok(Flow::Continue);
            }
        };

        let flow = match command {
            UserCommand::Table(value) => {
                session.set_table_filter(value.unwrap_or_default());
                Flow::Redraw
            }
            UserCommand::Text(value) => {
                session.set_text_filter(value.unwrap_or_default());
                Flow::Redraw
            }
            UserCommand::ClearFilters => {
                session.clear_filters();
                Flow::Redraw
            }
            UserCommand::Sound => {
                if gate.is_armed() {
                    writeln!(out, "Sound is already enabled.")?;
                } else if unlock.is_none() {
                    *unlock = Some(gate.spawn_unlock());
                }
                Flow::Continue
            }
            UserCommand::Help => {
                writeln!(out, "{HELP}")?;
                Flow::Continue
            }
            UserCommand::Quit => Flow::Quit,
        };
        Ok(flow)
    }

    fn draw<W: Write>(&self, out: &mut W, screen: &str) -> AppResult<()> {
        if self.clear_screen {
            out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        out.write_all(screen.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

async fn wait_unlock(unlock: &mut Option<JoinHandle<bool>>) -> bool {
    let Some(handle) = unlock.as_mut() else {
        return std::future::pending().await;
    };
    let armed = match handle.await {
        Ok(armed) => armed,
        Err(e) => {
            tracing::error!(error = %e, "Sound unlock task failed");
            false
        }
    };
    *unlock = None;
    armed
}

async fn wait_finished(subscription: &mut Option<Subscription>) {
    match subscription.as_mut() {
        Some(subscription) => subscription.finished().await,
        None => std::future::pending().await,
    }
}

async fn wait_sleep(delay: &mut Option<Pin<Box<Sleep>>>) {
    match delay.as_mut() {
        Some(delay) => delay.await,
        None => std::future::pending().await,
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
