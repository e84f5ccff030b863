//! Push channel.
//!
//! One connection per signed-in session. A supervisor task follows the
//! session: it connects when a credential appears, closes the socket on
//! logout or a change of user, and reconnects with backoff when the
//! connection drops. Dropping the [`RealtimeHandle`] closes everything.

mod backoff;
pub mod channel;
pub mod notifications;

pub use backoff::ReconnectPolicy;
pub use notifications::{ChannelUpdate, Notification, NotificationCenter};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::session::{Credential, Session};
use channel::{Dropped, Handshake};

/// Keeps the push channel alive. Dropping it shuts the channel down.
pub struct RealtimeHandle {
    stop: watch::Sender<()>,
    task: JoinHandle<()>,
}

impl RealtimeHandle {
    /// Closes the socket and waits for the supervisor to finish.
    pub async fn shutdown(self) {
        let RealtimeHandle { stop, task } = self;
        drop(stop);
        if let Err(e) = task.await {
            log::warn!("Push channel supervisor ended abnormally: {e}");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

pub struct RealtimeService;

impl RealtimeService {
    pub fn start(
        runtime: &Handle,
        config: &Config,
        session: &Session,
        center: NotificationCenter,
    ) -> RealtimeHandle {
        let (stop, stop_rx) = watch::channel(());
        let supervisor = Supervisor {
            ws_url: config.ws_url.clone(),
            policy: config.reconnect.clone(),
            session: session.subscribe(),
            stop: stop_rx,
            center,
        };
        let task = runtime.spawn(supervisor.run());
        RealtimeHandle { stop, task }
    }
}

/// How one signed-in stretch ended.
enum Exit {
    Stop,
    SessionChanged,
    GaveUp,
}

struct Supervisor {
    ws_url: String,
    policy: ReconnectPolicy,
    session: watch::Receiver<Option<Credential>>,
    stop: watch::Receiver<()>,
    center: NotificationCenter,
}

impl Supervisor {
    async fn run(mut self) {
        let mut last_generation = None;
        loop {
            let credential = self.session.borrow_and_update().clone();
            let generation = credential.as_ref().map(Credential::generation);
            if last_generation.is_some() && generation != last_generation {
                self.center.clear();
            }
            last_generation = generation;

            let exit = match credential {
                Some(credential) => self.connected_session(&credential).await,
                None => Exit::GaveUp,
            };
            match exit {
                Exit::Stop => break,
                Exit::SessionChanged => continue,
                Exit::GaveUp => {
                    if let Exit::Stop = self.wait_for_session_change().await {
                        break;
                    }
                }
            }
        }
        self.center.set_connected(false);
        log::debug!("Push channel supervisor stopped");
    }

    async fn wait_for_session_change(&mut self) -> Exit {
        tokio::select! {
            changed = self.session.changed() => match changed {
                Ok(()) => Exit::SessionChanged,
                Err(_) => Exit::Stop,
            },
            _ = self.stop.changed() => Exit::Stop,
        }
    }

    /// Connect, read, reconnect for as long as this credential is current.
    async fn connected_session(&mut self, credential: &Credential) -> Exit {
        let center = self.center.clone();
        let mut attempt = 0;
        loop {
            let request = match channel::handshake_request(&self.ws_url, credential.token()) {
                Ok(request) => request,
                Err(e) => {
                    log::error!("Push channel disabled: {e}");
                    return Exit::GaveUp;
                }
            };
            let handshake = tokio::select! {
                handshake = channel::open(request) => handshake,
                exit = self.wait_for_session_change() => return exit,
            };

            match handshake {
                Handshake::Open(mut socket) => {
                    log::info!("Push channel connected");
                    attempt = 0;
                    center.set_connected(true);
                    let outcome = tokio::select! {
                        dropped = channel::read_frames(&mut socket, &center) => Ok(dropped),
                        exit = self.wait_for_session_change() => Err(exit),
                    };
                    center.set_connected(false);
                    match outcome {
                        Ok(Dropped::ClosedByServer) => log::info!("Push channel closed"),
                        Ok(Dropped::Error(e)) => log::warn!("Push channel lost: {e}"),
                        Err(exit) => {
                            channel::close(&mut socket).await;
                            log::info!("Push channel closed");
                            return exit;
                        }
                    }
                }
                Handshake::Rejected(status) => {
                    log::warn!("Push channel refused the credential ({status})");
                    return Exit::GaveUp;
                }
                Handshake::Failed(e) => log::warn!("Push channel handshake failed: {e}"),
            }

            attempt += 1;
            let Some(delay) = self.policy.delay_for(attempt) else {
                log::warn!("Push channel gave up after {} attempt(s)", attempt - 1);
                return Exit::GaveUp;
            };
            log::debug!("Reconnecting push channel in {delay:?}");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                exit = self.wait_for_session_change() => return exit,
            }
        }
    }
}
