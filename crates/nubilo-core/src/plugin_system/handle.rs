//! Background polling task for a [`PluginSupervisor`].
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{self, JoinHandle};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::kernel::context::SharedContext;
use crate::kernel::error::{Error, Result, SupervisorPhase};
use crate::plugin_system::record::RegistrySnapshot;
use crate::plugin_system::supervisor::PluginSupervisor;

type LoopOutput = Result<(PluginSupervisor, watch::Sender<RegistrySnapshot>)>;

impl PluginSupervisor {
    /// Move the supervisor onto a background task and return its handle.
    ///
    /// The first pass runs immediately, then one pass per poll interval.
    /// Passes run on the blocking pool because plugin code is synchronous.
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> SupervisorHandle {
        let cancel = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(self.snapshot());
        let context = Arc::clone(self.context());
        let task = tokio::spawn(run_loop(self, status_tx, cancel.clone()));
        SupervisorHandle {
            cancel,
            task,
            status: status_rx,
            context,
        }
    }
}

async fn run_loop(
    mut supervisor: PluginSupervisor,
    status_tx: watch::Sender<RegistrySnapshot>,
    cancel: CancellationToken,
) -> LoopOutput {
    let poll_interval = supervisor.config().poll_interval;
    supervisor.logger().info(&format!(
        "Plugin supervisor watching {} every {:?}",
        supervisor.config().plugin_directory_path.display(),
        poll_interval
    ));

    loop {
        let pass = task::spawn_blocking(move || {
            supervisor.reconcile();
            supervisor
        });
        supervisor = pass
            .await
            .map_err(|e| Error::supervisor(SupervisorPhase::Reconcile, e.to_string()))?;
        status_tx.send_replace(supervisor.snapshot());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = sleep(poll_interval) => {}
        }
    }

    supervisor.logger().debug("Plugin supervisor loop stopped");
    Ok((supervisor, status_tx))
}

/// Handle to a running supervisor.
///
/// Dropping the handle leaves the loop running until the runtime shuts down;
/// call [`stop`](Self::stop) to end it and unload the plugins.
pub struct SupervisorHandle {
    cancel: CancellationToken,
    task: JoinHandle<LoopOutput>,
    status: watch::Receiver<RegistrySnapshot>,
    context: SharedContext,
}

impl SupervisorHandle {
    /// Receiver that sees a fresh snapshot after every pass.
    pub fn subscribe(&self) -> watch::Receiver<RegistrySnapshot> {
        self.status.clone()
    }

    /// Snapshot published by the most recent pass.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.status.borrow().clone()
    }

    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Token that stops the loop at its next wait when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the loop, then unload every loaded plugin.
    ///
    /// A pass in progress is allowed to finish. Returns the supervisor with an
    /// empty registry, so it can be started again.
    pub async fn stop(self) -> Result<PluginSupervisor> {
        let SupervisorHandle { cancel, task, .. } = self;
        cancel.cancel();

        let (mut supervisor, status_tx) = task
            .await
            .map_err(|e| Error::supervisor(SupervisorPhase::Stop, e.to_string()))??;

        let supervisor = task::spawn_blocking(move || {
            let unloaded = supervisor.unload_all();
            supervisor
                .logger()
                .info(&format!("Plugin supervisor stopped, {} plugin(s) unloaded", unloaded));
            supervisor
        })
        .await
        .map_err(|e| Error::supervisor(SupervisorPhase::Stop, e.to_string()))?;

        status_tx.send_replace(supervisor.snapshot());
        Ok(supervisor)
    }
}
