//! Poll scheduler — drives the poll → normalize → publish path.
//!
//! Two modes are supported:
//! - **pull**: the scheduler owns the timer and queries the device itself
//!   ([`PollScheduler::run_pull`]);
//! - **push**: the adapter owns the cadence and hands snapshots over a channel
//!   ([`PollScheduler::run_push`]).
//!
//! In both modes a failed poll or publish is logged and the loop carries on.

use std::time::Duration;

use telebridge_domain::error::DeviceError;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::normalizer::Normalizer;
use crate::ports::{Bus, SharedDevice, StatusSource};
use crate::publisher::Publisher;
use crate::signals::{NamedReading, SignalSet};

/// Expands device snapshots into readings and publishes them.
pub struct PollScheduler<S, B> {
    signals: S,
    publisher: Publisher<B>,
    normalizer: Normalizer,
}

impl<S, B> PollScheduler<S, B>
where
    S: SignalSet,
    B: Bus,
{
    pub fn new(signals: S, publisher: Publisher<B>) -> Self {
        Self {
            signals,
            publisher,
            normalizer: Normalizer::new(),
        }
    }

    #[must_use]
    pub fn signals(&self) -> &S {
        &self.signals
    }

    #[must_use]
    pub fn publisher(&self) -> &Publisher<B> {
        &self.publisher
    }

    /// Publish one reading per signal for `status`.
    ///
    /// Returns how many readings were published; failures are logged.
    pub async fn emit(&self, status: &S::Status) -> usize {
        let mut published = 0;
        for NamedReading { signal, reading } in self.signals.expand(status, &self.normalizer) {
            match self.publisher.publish(signal, &reading).await {
                Ok(()) => {
                    published += 1;
                    tracing::debug!(
                        signal,
                        uuid = %reading.uuid,
                        time = reading.time.as_i64(),
                        "reading published"
                    );
                }
                Err(err) => tracing::warn!(%err, signal, "failed to publish reading"),
            }
        }
        published
    }

    /// Run a single pull-mode cycle: query the device, then publish.
    ///
    /// # Errors
    ///
    /// Returns the device error if the status query fails; nothing is
    /// published in that case.
    pub async fn tick<D>(&self, device: &SharedDevice<D>) -> Result<usize, DeviceError>
    where
        D: StatusSource<Status = S::Status>,
    {
        let status = device.lock().await.get_status().await?;
        tracing::debug!(?status, "status polled");
        Ok(self.emit(&status).await)
    }

    /// Poll `device` every `period`, forever.
    ///
    /// The first poll happens immediately. Late ticks are not caught up:
    /// the next poll is scheduled one full period after a late one.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub async fn run_pull<D>(&self, device: SharedDevice<D>, period: Duration)
    where
        D: StatusSource<Status = S::Status>,
    {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(err) = self.tick(&device).await {
                tracing::warn!(%err, "poll failed, retrying at next interval");
            }
        }
    }

    /// Publish every snapshot received on `statuses` until the channel closes.
    pub async fn run_push(&self, mut statuses: mpsc::Receiver<S::Status>) {
        while let Some(status) = statuses.recv().await {
            tracing::debug!(?status, "summary received");
            self.emit(&status).await;
        }
        tracing::info!("summary channel closed, push loop finished");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::bus::InProcessBus;
    use crate::interface::Service;
    use crate::ports::share;
    use crate::signals::{LightSignals, MeterSignals};
    use telebridge_domain::error::BusError;
    use telebridge_domain::payload::{Message, TIMESERIES_READING};
    use telebridge_domain::reading::Reading;
    use telebridge_domain::summary::{LightStatus, MeterSummary};

    struct ScriptedSource {
        results: VecDeque<Result<LightStatus, DeviceError>>,
        calls: Arc<AtomicUsize>,
    }

    impl StatusSource for ScriptedSource {
        type Status = LightStatus;

        async fn get_status(&mut self) -> Result<LightStatus, DeviceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .pop_front()
                .unwrap_or(Ok(LightStatus::default()))
        }
    }

    struct ClosedBus;

    impl Bus for ClosedBus {
        async fn publish(&self, _uri: &str, _message: Message) -> Result<(), BusError> {
            Err(BusError::Closed)
        }

        async fn subscribe(&self, _uri: &str) -> Result<mpsc::Receiver<Message>, BusError> {
            Err(BusError::Closed)
        }

        async fn set_metadata(&self, _uri: &str, _key: &str, _value: &str) -> Result<(), BusError> {
            Err(BusError::Closed)
        }
    }

    fn meter_scheduler<B: Bus>(bus: B) -> PollScheduler<MeterSignals, B> {
        let service = Service::new("ns", "meter1", "s.meter");
        let interface = service.interface("meter1", "i.meter");
        PollScheduler::new(
            MeterSignals::default(),
            Publisher::new(bus, service, interface, TIMESERIES_READING),
        )
    }

    fn light_scheduler(bus: Arc<InProcessBus>) -> PollScheduler<LightSignals, Arc<InProcessBus>> {
        let service = Service::new("ns", "lamp", "s.vlight");
        let interface = service.interface("vlight", "i.xbos.light");
        PollScheduler::new(
            LightSignals::default(),
            Publisher::new(bus, service, interface, LightSignals::PO_NUM),
        )
    }

    async fn subscribe_all(
        bus: &InProcessBus,
        scheduler: &PollScheduler<MeterSignals, Arc<InProcessBus>>,
    ) -> Vec<mpsc::Receiver<Message>> {
        let mut receivers = Vec::new();
        for spec in scheduler.signals().specs() {
            let uri = scheduler.publisher().interface().signal_uri(spec.name);
            receivers.push(bus.subscribe(&uri).await.unwrap());
        }
        receivers
    }

    fn decode(message: &Message) -> Reading<u64> {
        message
            .one_with_po(TIMESERIES_READING)
            .unwrap()
            .decode()
            .unwrap()
    }

    #[tokio::test]
    async fn should_emit_three_readings_for_meter_summary() {
        let bus = Arc::new(InProcessBus::new(8));
        let scheduler = meter_scheduler(Arc::clone(&bus));
        let mut receivers = subscribe_all(&bus, &scheduler).await;

        let summary = MeterSummary {
            current_power: 250,
            energy_lifetime: 1000,
            energy_today: 42,
        };
        assert_eq!(scheduler.emit(&summary).await, 3);

        let mut readings = Vec::new();
        for rx in &mut receivers {
            readings.push(decode(&rx.recv().await.unwrap()));
        }
        let values: Vec<_> = readings.iter().map(|r| r.value).collect();
        assert_eq!(values, [250, 1000, 42]);
        assert_ne!(readings[0].uuid, readings[1].uuid);
        assert_ne!(readings[1].uuid, readings[2].uuid);
        assert_ne!(readings[0].uuid, readings[2].uuid);
    }

    #[tokio::test]
    async fn should_keep_identifiers_stable_across_cycles() {
        let bus = Arc::new(InProcessBus::new(8));
        let scheduler = meter_scheduler(Arc::clone(&bus));
        let mut receivers = subscribe_all(&bus, &scheduler).await;

        scheduler.emit(&MeterSummary::default()).await;
        scheduler.emit(&MeterSummary::default()).await;

        for rx in &mut receivers {
            let first = decode(&rx.recv().await.unwrap());
            let second = decode(&rx.recv().await.unwrap());
            assert_eq!(first.uuid, second.uuid);
            assert!(second.time >= first.time);
        }
    }

    #[tokio::test]
    async fn should_count_only_successful_publishes() {
        let scheduler = meter_scheduler(ClosedBus);
        assert_eq!(scheduler.emit(&MeterSummary::default()).await, 0);
    }

    #[tokio::test]
    async fn should_publish_nothing_when_poll_fails() {
        let bus = Arc::new(InProcessBus::new(8));
        let scheduler = light_scheduler(Arc::clone(&bus));
        let uri = scheduler.publisher().interface().signal_uri("info");
        let mut rx = bus.subscribe(&uri).await.unwrap();
        let device = share(ScriptedSource {
            results: VecDeque::from([Err(DeviceError::Unavailable)]),
            calls: Arc::new(AtomicUsize::new(0)),
        });

        let result = scheduler.tick(&device).await;

        assert!(matches!(result, Err(DeviceError::Unavailable)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_polling_after_a_failure() {
        let bus = Arc::new(InProcessBus::new(8));
        let scheduler = Arc::new(light_scheduler(Arc::clone(&bus)));
        let uri = scheduler.publisher().interface().signal_uri("info");
        let mut rx = bus.subscribe(&uri).await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let device = share(ScriptedSource {
            results: VecDeque::from([
                Err(DeviceError::Unavailable),
                Ok(LightStatus {
                    state: true,
                    brightness: 55,
                }),
            ]),
            calls: Arc::clone(&calls),
        });

        let task = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move {
                scheduler
                    .run_pull(device, Duration::from_secs(30))
                    .await;
            })
        };

        let message = rx.recv().await.unwrap();
        let reading: Reading<LightStatus> = message
            .one_with_po(LightSignals::PO_NUM)
            .unwrap()
            .decode()
            .unwrap();
        assert_eq!(reading.value.brightness, 55);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!task.is_finished());
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn should_wait_one_period_between_polls() {
        let bus = Arc::new(InProcessBus::new(8));
        let scheduler = Arc::new(light_scheduler(Arc::clone(&bus)));
        let calls = Arc::new(AtomicUsize::new(0));
        let device = share(ScriptedSource {
            results: VecDeque::new(),
            calls: Arc::clone(&calls),
        });

        let task = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move {
                scheduler
                    .run_pull(device, Duration::from_secs(30))
                    .await;
            })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_polling_when_a_subscriber_stops_reading() {
        let bus = Arc::new(InProcessBus::new(2));
        let scheduler = Arc::new(light_scheduler(Arc::clone(&bus)));
        let uri = scheduler.publisher().interface().signal_uri("info");
        let _idle = bus.subscribe(&uri).await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let device = share(ScriptedSource {
            results: VecDeque::new(),
            calls: Arc::clone(&calls),
        });

        let task = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move {
                scheduler
                    .run_pull(device, Duration::from_secs(10))
                    .await;
            })
        };

        tokio::time::sleep(Duration::from_secs(105)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 11);
        task.abort();
    }

    #[tokio::test]
    async fn should_drain_push_channel_until_closed() {
        let bus = Arc::new(InProcessBus::new(16));
        let scheduler = meter_scheduler(Arc::clone(&bus));
        let mut receivers = subscribe_all(&bus, &scheduler).await;
        let (tx, rx) = mpsc::channel(4);

        tx.send(MeterSummary {
            current_power: 1,
            energy_lifetime: 2,
            energy_today: 3,
        })
        .await
        .unwrap();
        tx.send(MeterSummary {
            current_power: 4,
            energy_lifetime: 5,
            energy_today: 6,
        })
        .await
        .unwrap();
        drop(tx);

        scheduler.run_push(rx).await;

        let power = &mut receivers[0];
        assert_eq!(decode(&power.recv().await.unwrap()).value, 1);
        assert_eq!(decode(&power.recv().await.unwrap()).value, 4);
        let today = &mut receivers[2];
        assert_eq!(decode(&today.recv().await.unwrap()).value, 3);
        assert_eq!(decode(&today.recv().await.unwrap()).value, 6);
    }
}
