use kameo::actor::{ActorId, ActorRef, Spawn, WeakActorRef};
use kameo::error::{ActorStopReason, Infallible};
use kameo::message::{Context, Message};
use std::ops::ControlFlow;
use tokio::sync::oneshot;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::actors::children::ChildRegistry;
use crate::actors::device::DeviceEntity;
use crate::actors::group::GroupRegistry;
use crate::messages::RegistryMsg;
use crate::types::{DeviceId, GroupId};

/// Request to resolve, creating it if needed, the device actor for one
/// (group, device) identity.
///
/// The request is routed registry -> group -> device; whichever actor
/// completes it sends [`DeviceRegistered`] straight back through `reply`, so
/// the answer never travels back through the routers. A scope mismatch drops
/// the request, and the reply sender with it, leaving the caller with a
/// closed channel instead of a reply.
#[derive(Debug)]
pub struct RequestTrack {
    pub group_id: GroupId,
    pub device_id: DeviceId,
    pub reply: oneshot::Sender<DeviceRegistered>,
}

/// Acknowledgement that a device actor is registered and ready for telemetry
#[derive(Debug)]
pub struct DeviceRegistered {
    pub device: ActorRef<DeviceEntity>,
}

/// Top-level router owning one group registry per group id
pub struct DeviceRegistry {
    groups: ChildRegistry<GroupId, GroupRegistry>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            groups: ChildRegistry::new(),
        }
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl kameo::Actor for DeviceRegistry {
    type Args = Self;
    type Error = Infallible;

    async fn on_start(args: Self::Args, _actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!("Device registry started");
        Ok(args)
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        _reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!("Device registry stopped");
        Ok(())
    }

    async fn on_link_died(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        id: ActorId,
        reason: ActorStopReason,
    ) -> Result<ControlFlow<ActorStopReason>, Self::Error> {
        match self.groups.remove_by_actor(id) {
            Some(group_id) => {
                info!("Group registry actor for {} has been terminated", group_id);
                Ok(ControlFlow::Continue(()))
            }
            // Not one of our groups: the supervisor died, stop with it.
            None => Ok(ControlFlow::Break(reason)),
        }
    }
}

impl Message<RequestTrack> for DeviceRegistry {
    type Reply = ();

    async fn handle(
        &mut self,
        msg: RequestTrack,
        ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let group = match self.groups.get(&msg.group_id) {
            Some(group) => group.clone(),
            None => {
                info!("Creating group registry actor for {}", msg.group_id);
                let group = GroupRegistry::spawn(GroupRegistry::new(msg.group_id.clone()));
                let registry_ref = ctx.actor_ref().clone();
                let _ = registry_ref.link(&group).await;
                self.groups.insert(msg.group_id.clone(), group.clone());
                group
            }
        };

        if let Err(e) = group.tell(msg).await {
            warn!("Failed to forward track request to group registry: {}", e);
        }
    }
}

impl Message<RegistryMsg> for DeviceRegistry {
    type Reply = RegistryReply;

    async fn handle(
        &mut self,
        msg: RegistryMsg,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        match msg {
            RegistryMsg::GetStatus => RegistryReply::Status {
                group_count: self.groups.len(),
            },
        }
    }
}

#[derive(Debug, kameo::Reply)]
pub enum RegistryReply {
    Status { group_count: usize },
}

/// Send a track request through the registry and await the registration.
///
/// Routing itself is fire-and-forget; this helper adds the caller-side wait
/// the protocol deliberately leaves to callers.
pub async fn track(
    registry: &ActorRef<DeviceRegistry>,
    group_id: GroupId,
    device_id: DeviceId,
    wait: Duration,
) -> crate::types::Result<DeviceRegistered> {
    let (reply_tx, reply_rx) = oneshot::channel();
    registry
        .tell(RequestTrack {
            group_id,
            device_id,
            reply: reply_tx,
        })
        .await
        .map_err(|e| crate::types::Error::Actor(e.to_string()))?;

    match tokio::time::timeout(wait, reply_rx).await {
        Ok(Ok(registered)) => Ok(registered),
        Ok(Err(_)) => Err(crate::types::Error::Actor(
            "track request was dropped without a reply".to_string(),
        )),
        Err(_) => Err(crate::types::Error::Timeout),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
