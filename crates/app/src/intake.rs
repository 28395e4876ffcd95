//! Command intake — validates, decodes and applies actuation commands.
//!
//! Each inbound message goes through the same steps:
//!
//! 1. pick the payload object tagged with the expected payload-type number;
//! 2. reject it when its contents are empty;
//! 3. decode it into a [`Command`];
//! 4. apply `state`, then `brightness`, to the light.
//!
//! A message failing any step is dropped with a diagnostic. Nothing here
//! ever stops the intake loop.

use std::fmt;

use telebridge_domain::command::Command;
use telebridge_domain::error::DeviceError;
use telebridge_domain::payload::{LIGHT_STATE, Message, PoNum};
use tokio::sync::mpsc;

use crate::ports::{Light, SharedDevice};

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// The command was decoded and both fields were applied.
    Applied(Command),
    /// No payload object with the expected payload-type number.
    MissingPayload,
    /// The payload object had no contents.
    EmptyPayload,
    /// The contents did not decode into a [`Command`].
    DecodeFailed,
    /// The command decoded but the device rejected at least one field.
    ApplyFailed,
}

/// Failure of one or both halves of a command.
#[derive(Debug, thiserror::Error)]
#[error("failed to apply command (state: {}, brightness: {})", Outcome(.state), Outcome(.brightness))]
pub struct ApplyError {
    pub state: Option<DeviceError>,
    pub brightness: Option<DeviceError>,
}

struct Outcome<'a>(&'a Option<DeviceError>);

impl fmt::Display for Outcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(err) => write!(f, "{err}"),
            None => f.write_str("ok"),
        }
    }
}

/// Applies commands received on a light's `state` slot.
pub struct CommandIntake<L> {
    device: SharedDevice<L>,
    po_num: PoNum,
}

impl<L: Light> CommandIntake<L> {
    /// Accept commands tagged [`LIGHT_STATE`] for `device`.
    pub fn new(device: SharedDevice<L>) -> Self {
        Self {
            device,
            po_num: LIGHT_STATE,
        }
    }

    /// Validate, decode and apply one inbound message.
    pub async fn handle(&self, message: &Message) -> IntakeOutcome {
        let Some(po) = message.one_with_po(self.po_num) else {
            tracing::warn!(po_num = %self.po_num, "actuation command without valid payload object, dropping");
            return IntakeOutcome::MissingPayload;
        };
        if po.is_empty() {
            tracing::warn!(po_num = %self.po_num, "actuation command with empty payload, dropping");
            return IntakeOutcome::EmptyPayload;
        }

        let command: Command = match po.decode() {
            Ok(command) => command,
            Err(err) => {
                tracing::warn!(error = ?err, "failed to decode actuation command, dropping");
                return IntakeOutcome::DecodeFailed;
            }
        };

        match self.apply(command).await {
            Ok(()) => {
                tracing::info!(
                    state = command.state,
                    brightness = command.brightness,
                    "actuation command applied"
                );
                IntakeOutcome::Applied(command)
            }
            Err(err) => {
                tracing::warn!(%err, "actuation command partially or not applied");
                IntakeOutcome::ApplyFailed
            }
        }
    }

    /// Apply `state` then `brightness` while holding the device.
    ///
    /// Both fields are always attempted; a poll cannot observe the device
    /// between the two.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError`] carrying each field's failure, if any.
    pub async fn apply(&self, command: Command) -> Result<(), ApplyError> {
        let mut device = self.device.lock().await;
        let state = device.set_state(command.state).await.err();
        let brightness = device.set_brightness(command.brightness).await.err();

        if state.is_none() && brightness.is_none() {
            Ok(())
        } else {
            Err(ApplyError { state, brightness })
        }
    }

    /// Handle every message from `messages` until the subscription closes.
    pub async fn run(&self, mut messages: mpsc::Receiver<Message>) {
        while let Some(message) = messages.recv().await {
            self.handle(&message).await;
        }
        tracing::info!("command subscription closed, intake finished");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::ports::{StatusSource, share};
    use telebridge_domain::payload::{PayloadObject, TIMESERIES_READING};
    use telebridge_domain::summary::LightStatus;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        State(bool),
        Brightness(i64),
    }

    #[derive(Default)]
    struct RecordingLight {
        calls: Arc<Mutex<Vec<Call>>>,
        fail_state: bool,
    }

    impl StatusSource for RecordingLight {
        type Status = LightStatus;

        async fn get_status(&mut self) -> Result<LightStatus, DeviceError> {
            Ok(LightStatus::default())
        }
    }

    impl Light for RecordingLight {
        async fn set_state(&mut self, on: bool) -> Result<(), DeviceError> {
            self.calls.lock().unwrap().push(Call::State(on));
            if self.fail_state {
                return Err(DeviceError::Unavailable);
            }
            Ok(())
        }

        async fn set_brightness(&mut self, level: i64) -> Result<(), DeviceError> {
            self.calls.lock().unwrap().push(Call::Brightness(level));
            Ok(())
        }
    }

    fn intake(light: RecordingLight) -> (CommandIntake<RecordingLight>, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::clone(&light.calls);
        (CommandIntake::new(share(light)), calls)
    }

    fn command_message(command: &Command) -> Message {
        Message::single(PayloadObject::encode(LIGHT_STATE, command).unwrap())
    }

    #[tokio::test]
    async fn should_apply_state_then_brightness() {
        let (intake, calls) = intake(RecordingLight::default());
        let command = Command {
            state: true,
            brightness: 80,
        };

        let outcome = intake.handle(&command_message(&command)).await;

        assert_eq!(outcome, IntakeOutcome::Applied(command));
        assert_eq!(
            *calls.lock().unwrap(),
            [Call::State(true), Call::Brightness(80)]
        );
    }

    #[tokio::test]
    async fn should_drop_message_without_expected_payload_type() {
        let (intake, calls) = intake(RecordingLight::default());
        let message = Message::single(
            PayloadObject::encode(
                TIMESERIES_READING,
                &Command {
                    state: true,
                    brightness: 10,
                },
            )
            .unwrap(),
        );

        assert_eq!(intake.handle(&message).await, IntakeOutcome::MissingPayload);
        assert_eq!(
            intake.handle(&Message::default()).await,
            IntakeOutcome::MissingPayload
        );
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_drop_message_with_empty_payload() {
        let (intake, calls) = intake(RecordingLight::default());
        let message = Message::single(PayloadObject::new(LIGHT_STATE, Vec::new()));

        assert_eq!(intake.handle(&message).await, IntakeOutcome::EmptyPayload);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_drop_message_that_does_not_decode() {
        let (intake, calls) = intake(RecordingLight::default());
        let message = Message::single(PayloadObject::new(LIGHT_STATE, vec![0xff, 0x01]));

        assert_eq!(intake.handle(&message).await, IntakeOutcome::DecodeFailed);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_still_apply_brightness_when_state_fails() {
        let (intake, calls) = intake(RecordingLight {
            fail_state: true,
            ..RecordingLight::default()
        });
        let command = Command {
            state: false,
            brightness: 30,
        };

        let outcome = intake.handle(&command_message(&command)).await;

        assert_eq!(outcome, IntakeOutcome::ApplyFailed);
        assert_eq!(
            *calls.lock().unwrap(),
            [Call::State(false), Call::Brightness(30)]
        );
    }

    #[tokio::test]
    async fn should_report_which_half_failed() {
        let (intake, _calls) = intake(RecordingLight {
            fail_state: true,
            ..RecordingLight::default()
        });

        let err = intake
            .apply(Command {
                state: true,
                brightness: 1,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.state, Some(DeviceError::Unavailable)));
        assert!(err.brightness.is_none());
        assert_eq!(
            err.to_string(),
            "failed to apply command (state: device unavailable, brightness: ok)"
        );
    }

    #[tokio::test]
    async fn should_keep_running_after_bad_messages() {
        let (intake, calls) = intake(RecordingLight::default());
        let (tx, rx) = mpsc::channel(8);
        tx.send(Message::default()).await.unwrap();
        tx.send(Message::single(PayloadObject::new(LIGHT_STATE, Vec::new())))
            .await
            .unwrap();
        tx.send(command_message(&Command {
            state: true,
            brightness: 5,
        }))
        .await
        .unwrap();
        drop(tx);

        intake.run(rx).await;

        assert_eq!(
            *calls.lock().unwrap(),
            [Call::State(true), Call::Brightness(5)]
        );
    }
}
