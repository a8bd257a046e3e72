use kameo::actor::{ActorId, ActorRef, WeakActorRef};
use kameo::error::{ActorStopReason, Infallible};
use kameo::message::{Context, Message};
use std::ops::ControlFlow;
use tracing::{debug, info, warn};

use crate::actors::registry::{DeviceRegistered, RequestTrack};
use crate::messages::DeviceMsg;
use crate::types::{DeviceId, GroupId, RequestId};

/// Holds the last recorded temperature reading for one (group, device) identity
pub struct DeviceEntity {
    group_id: GroupId,
    device_id: DeviceId,
    last_reading: Option<f64>,
}

impl DeviceEntity {
    pub fn new(group_id: GroupId, device_id: DeviceId) -> Self {
        Self {
            group_id,
            device_id,
            last_reading: None,
        }
    }
}

impl kameo::Actor for DeviceEntity {
    type Args = Self;
    type Error = Infallible;

    async fn on_start(args: Self::Args, _actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        info!("Device actor {}-{} started", args.group_id, args.device_id);
        Ok(args)
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        _reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!("Device actor {}-{} stopped", self.group_id, self.device_id);
        Ok(())
    }

    async fn on_link_died(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        _id: ActorId,
        reason: ActorStopReason,
    ) -> Result<ControlFlow<ActorStopReason>, Self::Error> {
        // The only link is the owning group registry; its death takes this
        // device down with it.
        Ok(ControlFlow::Break(reason))
    }
}

impl Message<RequestTrack> for DeviceEntity {
    type Reply = ();

    async fn handle(
        &mut self,
        msg: RequestTrack,
        ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        // Re-validation of the group-level scope check, for callers that hold
        // a device handle directly.
        if msg.group_id == self.group_id && msg.device_id == self.device_id {
            let registered = DeviceRegistered {
                device: ctx.actor_ref().clone(),
            };
            if msg.reply.send(registered).is_err() {
                debug!(
                    "Track requester for {}-{} went away before registration",
                    self.group_id, self.device_id
                );
            }
        } else {
            warn!(
                "Ignoring track request for {}-{}. This device actor is responsible for {}-{}.",
                msg.group_id, msg.device_id, self.group_id, self.device_id
            );
        }
    }
}

impl Message<DeviceMsg> for DeviceEntity {
    type Reply = DeviceReply;

    async fn handle(
        &mut self,
        msg: DeviceMsg,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        match msg {
            DeviceMsg::RecordTemperature { request_id, value } => {
                info!("Recorded temperature reading {} with {}", value, request_id);
                self.last_reading = Some(value);
                DeviceReply::TemperatureRecorded { request_id }
            }

            DeviceMsg::ReadTemperature { request_id } => DeviceReply::Temperature {
                request_id,
                value: self.last_reading,
            },
        }
    }
}

#[derive(Debug, kameo::Reply)]
pub enum DeviceReply {
    TemperatureRecorded {
        request_id: RequestId,
    },
    Temperature {
        request_id: RequestId,
        value: Option<f64>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kameo::actor::Spawn;
    use tokio::sync::oneshot;
    use tokio::time::{Duration, timeout};

    fn spawn_device() -> ActorRef<DeviceEntity> {
        DeviceEntity::spawn(DeviceEntity::new("group".into(), "device".into()))
    }

    #[tokio::test]
    async fn test_reply_with_empty_reading_if_no_temperature_is_known() {
        let device = spawn_device();

        let reply = device
            .ask(DeviceMsg::ReadTemperature { request_id: 42 })
            .await
            .unwrap();
        if let DeviceReply::Temperature { request_id, value } = reply {
            assert_eq!(request_id, 42);
            assert_eq!(value, None);
        } else {
            panic!("Expected Temperature reply");
        }
    }

    #[tokio::test]
    async fn test_reply_with_latest_temperature_reading() {
        let device = spawn_device();

        let reply = device
            .ask(DeviceMsg::RecordTemperature {
                request_id: 1,
                value: 24.0,
            })
            .await
            .unwrap();
        assert!(matches!(
            reply,
            DeviceReply::TemperatureRecorded { request_id: 1 }
        ));

        let reply = device
            .ask(DeviceMsg::ReadTemperature { request_id: 2 })
            .await
            .unwrap();
        if let DeviceReply::Temperature { request_id, value } = reply {
            assert_eq!(request_id, 2);
            assert_eq!(value, Some(24.0));
        } else {
            panic!("Expected Temperature reply");
        }

        let reply = device
            .ask(DeviceMsg::RecordTemperature {
                request_id: 3,
                value: 55.0,
            })
            .await
            .unwrap();
        assert!(matches!(
            reply,
            DeviceReply::TemperatureRecorded { request_id: 3 }
        ));

        let reply = device
            .ask(DeviceMsg::ReadTemperature { request_id: 4 })
            .await
            .unwrap();
        if let DeviceReply::Temperature { request_id, value } = reply {
            assert_eq!(request_id, 4);
            assert_eq!(value, Some(55.0));
        } else {
            panic!("Expected Temperature reply");
        }
    }

    #[tokio::test]
    async fn test_reply_to_matching_track_request() {
        let device = spawn_device();

        let (reply_tx, reply_rx) = oneshot::channel();
        device
            .tell(RequestTrack {
                group_id: "group".into(),
                device_id: "device".into(),
                reply: reply_tx,
            })
            .await
            .unwrap();

        let registered = timeout(Duration::from_secs(3), reply_rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(registered.device.id(), device.id());
    }

    #[tokio::test]
    async fn test_ignore_track_request_for_wrong_group() {
        let device = spawn_device();

        let (reply_tx, reply_rx) = oneshot::channel();
        device
            .tell(RequestTrack {
                group_id: "wrongGroup".into(),
                device_id: "device".into(),
                reply: reply_tx,
            })
            .await
            .unwrap();

        // Dropped requests close the reply channel or stay silent; either way
        // no registration arrives.
        let outcome = timeout(Duration::from_millis(500), reply_rx).await;
        assert!(matches!(outcome, Err(_) | Ok(Err(_))));
    }

    #[tokio::test]
    async fn test_ignore_track_request_for_wrong_device() {
        let device = spawn_device();

        let (reply_tx, reply_rx) = oneshot::channel();
        device
            .tell(RequestTrack {
                group_id: "group".into(),
                device_id: "wrongDevice".into(),
                reply: reply_tx,
            })
            .await
            .unwrap();

        let outcome = timeout(Duration::from_millis(500), reply_rx).await;
        assert!(matches!(outcome, Err(_) | Ok(Err(_))));
    }
}
