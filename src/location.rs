//! Location providers
//!
//! Providers publish fixes into a subscription. They never check permission
//! themselves; screens only subscribe after the permission gate allowed it.
//! A provider's feeding task ends as soon as its subscription is dropped.

use crate::core::{config::LocationConfig, geo::GeoPosition};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// One position report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub position: GeoPosition,
    /// Horizontal accuracy radius in metres, when known
    pub accuracy_m: Option<f64>,
}

impl Fix {
    pub fn new(position: GeoPosition) -> Self {
        Self {
            position,
            accuracy_m: None,
        }
    }

    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.accuracy_m = Some(meters);
        self
    }
}

pub trait LocationProvider: Send + Sync {
    /// Starts feeding fixes, using `runtime` for any background work
    fn subscribe(&self, runtime: &Handle) -> LocationSubscription;
}

/// Receiving end of a provider's fix stream
#[derive(Debug)]
pub struct LocationSubscription {
    receiver: watch::Receiver<Option<Fix>>,
    /// Held by providers that never publish, so the stream stays open
    idle_sender: Option<watch::Sender<Option<Fix>>>,
}

impl LocationSubscription {
    /// A subscription paired with the sender that feeds it
    pub fn channel() -> (watch::Sender<Option<Fix>>, Self) {
        let (sender, receiver) = watch::channel(None);
        (
            sender,
            Self {
                receiver,
                idle_sender: None,
            },
        )
    }

    /// A subscription that stays open and never yields a fix
    pub fn idle() -> Self {
        let (sender, mut subscription) = Self::channel();
        subscription.idle_sender = Some(sender);
        subscription
    }

    /// Last fix seen, without waiting
    pub fn latest(&self) -> Option<Fix> {
        *self.receiver.borrow()
    }

    /// The first fix the provider produces. `None` if it stops without one.
    pub async fn first_fix(&mut self) -> Option<Fix> {
        loop {
            let current = *self.receiver.borrow_and_update();
            if current.is_some() {
                return current;
            }
            if self.receiver.changed().await.is_err() {
                return None;
            }
        }
    }

    /// The next fix after the ones already observed. `None` once the
    /// provider has stopped.
    pub async fn next_fix(&mut self) -> Option<Fix> {
        loop {
            self.receiver.changed().await.ok()?;
            let current = *self.receiver.borrow_and_update();
            if current.is_some() {
                return current;
            }
        }
    }
}

/// Reports one configured position, optionally after a delay
#[derive(Debug, Clone)]
pub struct FixedLocationProvider {
    fix: Fix,
    delay: Duration,
}

impl FixedLocationProvider {
    pub fn new(position: GeoPosition, delay: Duration) -> Self {
        Self {
            fix: Fix::new(position).with_accuracy(15.0),
            delay,
        }
    }
}

impl LocationProvider for FixedLocationProvider {
    fn subscribe(&self, runtime: &Handle) -> LocationSubscription {
        let (sender, subscription) = LocationSubscription::channel();
        if self.delay.is_zero() {
            sender.send_replace(Some(self.fix));
            return subscription;
        }

        let fix = self.fix;
        let delay = self.delay;
        runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    sender.send_replace(Some(fix));
                }
                _ = sender.closed() => {}
            }
        });
        subscription
    }
}

/// Replays a recorded track at a fixed interval
#[derive(Debug, Clone)]
pub struct ReplayLocationProvider {
    track: Vec<GeoPosition>,
    interval: Duration,
    looped: bool,
}

impl ReplayLocationProvider {
    pub fn new(track: Vec<GeoPosition>, interval: Duration, looped: bool) -> Self {
        Self {
            track,
            interval,
            looped,
        }
    }
}

impl LocationProvider for ReplayLocationProvider {
    fn subscribe(&self, runtime: &Handle) -> LocationSubscription {
        let (sender, subscription) = LocationSubscription::channel();
        if self.track.is_empty() {
            return subscription;
        }

        let track = self.track.clone();
        let interval = self.interval;
        let looped = self.looped;
        runtime.spawn(async move {
            let mut index = 0;
            loop {
                sender.send_replace(Some(Fix::new(track[index]).with_accuracy(10.0)));
                index += 1;
                if index == track.len() {
                    if !looped {
                        break;
                    }
                    index = 0;
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = sender.closed() => break,
                }
            }
            log::debug!("location replay finished");
        });
        subscription
    }
}

/// Never produces a fix
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocationProvider;

impl LocationProvider for NoLocationProvider {
    fn subscribe(&self, _runtime: &Handle) -> LocationSubscription {
        LocationSubscription::idle()
    }
}

/// Builds the provider selected by configuration
pub fn provider_for_config(config: &LocationConfig) -> Arc<dyn LocationProvider> {
    match config {
        LocationConfig::Fixed { lat, lng, delay_ms } => Arc::new(FixedLocationProvider::new(
            GeoPosition::new(*lat, *lng),
            Duration::from_millis(*delay_ms),
        )),
        LocationConfig::Replay {
            track,
            interval_ms,
            looped,
        } => Arc::new(ReplayLocationProvider::new(
            track.clone(),
            Duration::from_millis(*interval_ms),
            *looped,
        )),
        LocationConfig::None => Arc::new(NoLocationProvider),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_provider_delivers_one_fix() {
        let provider = FixedLocationProvider::new(
            GeoPosition::new(10.5, 122.8),
            Duration::from_millis(5),
        );
        let mut subscription = provider.subscribe(&Handle::current());

        let fix = subscription.first_fix().await.unwrap();
        assert_eq!(fix.position, GeoPosition::new(10.5, 122.8));
        assert_eq!(subscription.next_fix().await, None);
    }

    #[tokio::test]
    async fn test_immediate_fixed_provider() {
        let provider = FixedLocationProvider::new(GeoPosition::new(1.0, 2.0), Duration::ZERO);
        let subscription = provider.subscribe(&Handle::current());
        assert_eq!(subscription.latest().map(|f| f.position), Some(GeoPosition::new(1.0, 2.0)));
    }

    #[tokio::test]
    async fn test_replay_provider_walks_track() {
        let track = vec![
            GeoPosition::new(1.0, 1.0),
            GeoPosition::new(2.0, 2.0),
            GeoPosition::new(3.0, 3.0),
        ];
        let provider = ReplayLocationProvider::new(track.clone(), Duration::from_millis(5), false);
        let mut subscription = provider.subscribe(&Handle::current());

        let mut seen = vec![subscription.first_fix().await.unwrap().position];
        while let Some(fix) = subscription.next_fix().await {
            seen.push(fix.position);
        }
        assert_eq!(seen, track);
    }

    #[tokio::test]
    async fn test_dropping_subscription_stops_feed() {
        let (sender, subscription) = LocationSubscription::channel();
        drop(subscription);
        assert!(sender.is_closed());

        let provider = ReplayLocationProvider::new(
            vec![GeoPosition::new(1.0, 1.0)],
            Duration::from_millis(1),
            true,
        );
        let subscription = provider.subscribe(&Handle::current());
        drop(subscription);
        // The looping task notices the closed channel and exits
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_no_provider_stays_silent() {
        let mut subscription = NoLocationProvider.subscribe(&Handle::current());
        let waited =
            tokio::time::timeout(Duration::from_millis(20), subscription.first_fix()).await;
        assert!(waited.is_err());
    }
}
