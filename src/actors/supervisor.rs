use kameo::actor::{ActorId, ActorRef, Spawn, WeakActorRef};
use kameo::error::{ActorStopReason, Infallible};
use kameo::message::{Context, Message};
use std::ops::ControlFlow;
use tracing::{info, warn};

use crate::actors::registry::{DeviceRegistry, RegistryReply};
use crate::messages::{RegistryMsg, SupervisorMsg};

/// Root actor owning the device registry, restarting it if it fails
pub struct Supervisor {
    name: String,
    registry: ActorRef<DeviceRegistry>,
}

impl kameo::Actor for Supervisor {
    type Args = String;
    type Error = Infallible;

    async fn on_start(name: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        let registry = DeviceRegistry::spawn(DeviceRegistry::new());
        let _ = actor_ref.link(&registry).await;
        info!("Telemetry hub '{}' started", name);
        Ok(Self { name, registry })
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        _reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!("Telemetry hub '{}' stopped", self.name);
        Ok(())
    }

    async fn on_link_died(
        &mut self,
        actor_ref: WeakActorRef<Self>,
        id: ActorId,
        reason: ActorStopReason,
    ) -> Result<ControlFlow<ActorStopReason>, Self::Error> {
        if id != self.registry.id() {
            return Ok(ControlFlow::Break(reason));
        }

        match reason {
            ActorStopReason::Normal => {
                info!("Device registry stopped");
                Ok(ControlFlow::Continue(()))
            }
            reason => {
                warn!("Device registry terminated ({:?}), restarting", reason);
                let registry = DeviceRegistry::spawn(DeviceRegistry::new());
                if let Some(supervisor_ref) = actor_ref.upgrade() {
                    let _ = supervisor_ref.link(&registry).await;
                }
                self.registry = registry;
                Ok(ControlFlow::Continue(()))
            }
        }
    }
}

impl Message<SupervisorMsg> for Supervisor {
    type Reply = SupervisorReply;

    async fn handle(
        &mut self,
        msg: SupervisorMsg,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        match msg {
            SupervisorMsg::GetStatus => {
                let group_count = match self.registry.ask(RegistryMsg::GetStatus).await {
                    Ok(RegistryReply::Status { group_count }) => group_count,
                    Err(e) => {
                        warn!("Failed to query device registry status: {}", e);
                        0
                    }
                };
                SupervisorReply::Status {
                    name: self.name.clone(),
                    group_count,
                }
            }

            SupervisorMsg::GetRegistry => SupervisorReply::Registry(self.registry.clone()),

            SupervisorMsg::Shutdown => {
                info!("Shutdown requested for telemetry hub '{}'", self.name);
                let _ = self.registry.stop_gracefully().await;
                SupervisorReply::ShuttingDown
            }
        }
    }
}

#[derive(Debug, kameo::Reply)]
pub enum SupervisorReply {
    Status {
        name: String,
        group_count: usize,
    },
    Registry(ActorRef<DeviceRegistry>),
    ShuttingDown,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
