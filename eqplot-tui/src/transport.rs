use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use eqplot_core::FilterSet;

/// Commands sent from the TUI to the config transport
#[derive(Debug, Clone)]
pub enum ConfigCommand {
    /// Replace the remote filter config with this snapshot
    Upload(FilterSet),
    /// Shutdown the transport thread
    Quit,
}

/// Responses sent from the config transport to the TUI
#[derive(Debug, Clone)]
pub enum ConfigResponse {
    /// Snapshot stored; revisions count up from 1
    Committed { revision: u64, filters: usize },
    Error(String),
    Shutdown,
}

/// Channel ends the TUI keeps
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    pub cmd_tx: Sender<ConfigCommand>,
    pub resp_rx: Receiver<ConfigResponse>,
}

/// Background side of the config upload channel. Keeps the last uploaded
/// snapshot the way a remote config service would.
pub struct ConfigTransport {
    cmd_rx: Receiver<ConfigCommand>,
    resp_tx: Sender<ConfigResponse>,
    revision: u64,
    current: Option<FilterSet>,
}

impl ConfigTransport {
    pub fn new() -> (Self, ConfigHandle) {
        let (cmd_tx, cmd_rx) = unbounded();
        let (resp_tx, resp_rx) = unbounded();
        let transport = Self {
            cmd_rx,
            resp_tx,
            revision: 0,
            current: None,
        };
        (transport, ConfigHandle { cmd_tx, resp_rx })
    }

    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("config-transport".into())
            .spawn(move || self.run())
    }

    fn run(mut self) {
        log::debug!("config transport started");
        while let Ok(command) = self.cmd_rx.recv() {
            match command {
                ConfigCommand::Upload(filters) => {
                    let response = self.store(filters);
                    if self.resp_tx.send(response).is_err() {
                        break;
                    }
                }
                ConfigCommand::Quit => {
                    let _ = self.resp_tx.send(ConfigResponse::Shutdown);
                    break;
                }
            }
        }
        log::debug!("config transport stopped");
    }

    fn store(&mut self, filters: FilterSet) -> ConfigResponse {
        if let Some((name, _)) = filters
            .iter()
            .find(|(_, f)| f.as_biquad().is_some_and(|p| !p.is_well_formed()))
        {
            log::error!("rejecting upload: filter {} has invalid parameters", name);
            return ConfigResponse::Error(format!("invalid parameters for {}", name));
        }

        self.revision += 1;
        let count = filters.len();
        if self.current.as_ref() == Some(&filters) {
            log::debug!("upload {} unchanged", self.revision);
        }
        self.current = Some(filters);
        log::info!("uploaded revision {} ({} filters)", self.revision, count);
        ConfigResponse::Committed {
            revision: self.revision,
            filters: count,
        }
    }
}
