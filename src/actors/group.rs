use kameo::actor::{ActorId, ActorRef, Spawn, WeakActorRef};
use kameo::error::{ActorStopReason, Infallible};
use kameo::message::{Context, Message};
use std::collections::HashSet;
use std::ops::ControlFlow;
use tracing::{info, warn};

use crate::actors::children::ChildRegistry;
use crate::actors::device::DeviceEntity;
use crate::actors::registry::RequestTrack;
use crate::messages::GroupMsg;
use crate::types::{DeviceId, GroupId, RequestId};

/// Owns the device actors of one group and routes track requests to them
pub struct GroupRegistry {
    group_id: GroupId,
    devices: ChildRegistry<DeviceId, DeviceEntity>,
}

impl GroupRegistry {
    pub fn new(group_id: GroupId) -> Self {
        Self {
            group_id,
            devices: ChildRegistry::new(),
        }
    }
}

impl kameo::Actor for GroupRegistry {
    type Args = Self;
    type Error = Infallible;

    async fn on_start(args: Self::Args, _actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!("Group registry {} started", args.group_id);
        Ok(args)
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        _reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!("Group registry {} stopped", self.group_id);
        Ok(())
    }

    async fn on_link_died(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        id: ActorId,
        reason: ActorStopReason,
    ) -> Result<ControlFlow<ActorStopReason>, Self::Error> {
        match self.devices.remove_by_actor(id) {
            Some(device_id) => {
                info!("Device actor for {} has been terminated", device_id);
                Ok(ControlFlow::Continue(()))
            }
            // Not one of our devices: the parent registry died, stop with it.
            None => Ok(ControlFlow::Break(reason)),
        }
    }
}

impl Message<RequestTrack> for GroupRegistry {
    type Reply = ();

    async fn handle(
        &mut self,
        msg: RequestTrack,
        ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        if msg.group_id != self.group_id {
            warn!(
                "Ignoring track request for group {}. This group registry is responsible for {}.",
                msg.group_id, self.group_id
            );
            return;
        }

        let device = match self.devices.get(&msg.device_id) {
            Some(device) => device.clone(),
            None => {
                info!("Creating device actor for {}", msg.device_id);
                let device = DeviceEntity::spawn(DeviceEntity::new(
                    self.group_id.clone(),
                    msg.device_id.clone(),
                ));
                let group_ref = ctx.actor_ref().clone();
                let _ = group_ref.link(&device).await;
                self.devices.insert(msg.device_id.clone(), device.clone());
                device
            }
        };

        // The reply sender in the message travels with it, so the device
        // answers the original caller directly.
        if let Err(e) = device.tell(msg).await {
            warn!("Failed to forward track request to device actor: {}", e);
        }
    }
}

impl Message<GroupMsg> for GroupRegistry {
    type Reply = GroupReply;

    async fn handle(
        &mut self,
        msg: GroupMsg,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        match msg {
            GroupMsg::RequestDeviceList { request_id } => GroupReply::DeviceList {
                request_id,
                devices: self.devices.keys().cloned().collect(),
            },
        }
    }
}

#[derive(Debug, kameo::Reply)]
pub enum GroupReply {
    DeviceList {
        request_id: RequestId,
        devices: HashSet<DeviceId>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
