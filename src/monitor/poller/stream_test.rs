//! Tests for `PollingStream` behavior.

use super::*;
use crate::gateway::mock::MockGateway;
use crate::monitor::{ConfigurationSampler, ReachabilitySampler, Sampler};
use crate::network::{IpConfiguration, LinkError, LinkProvider, LinkSnapshot};
use crate::probe::Prober;
use crate::reconcile::{ConfigurationState, Reconciler};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_stream::StreamExt;

/// Mock sampler that returns predefined results.
struct MockSampler {
    results: Mutex<VecDeque<Result<u32, String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockSampler {
    fn new(results: Vec<Result<u32, String>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn returning(values: Vec<u32>) -> Self {
        Self::new(values.into_iter().map(Ok).collect())
    }
}

impl Sampler for MockSampler {
    type Output = u32;
    type Error = String;

    fn sample(&self) -> Result<u32, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("exhausted".to_string()))
    }
}

/// Prober that replays a fixed sequence of answers, then stays offline.
struct ScriptedProber(Mutex<VecDeque<bool>>);

impl Prober for ScriptedProber {
    fn is_internet_available(&self) -> bool {
        self.0.lock().unwrap().pop_front().unwrap_or(false)
    }
}

struct NoLinks;

impl LinkProvider for NoLinks {
    fn interface_names(&self) -> Result<Vec<String>, LinkError> {
        Ok(vec![])
    }

    fn snapshot(&self, _interface: &str) -> Result<Option<LinkSnapshot>, LinkError> {
        Ok(None)
    }
}

fn stream_of(sampler: MockSampler) -> PollingStream<MockSampler> {
    PollingMonitor::new(sampler, Duration::from_millis(5)).into_stream()
}

#[tokio::test]
async fn first_sample_is_always_emitted() {
    let values: Vec<_> = stream_of(MockSampler::returning(vec![3])).take(1).collect().await;

    assert_eq!(values, vec![3]);
}

#[tokio::test]
async fn no_emission_when_unchanged() {
    let sampler = MockSampler::returning(vec![1, 1, 1, 2]);
    let calls = Arc::clone(&sampler.calls);

    let values: Vec<_> = stream_of(sampler).take(2).collect().await;

    assert_eq!(values, vec![1, 2]);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn failed_samples_are_skipped() {
    let sampler = MockSampler::new(vec![
        Err("transient".to_string()),
        Ok(1),
        Err("transient".to_string()),
        Ok(2),
    ]);

    let values: Vec<_> = stream_of(sampler).take(2).collect().await;

    assert_eq!(values, vec![1, 2]);
}

#[tokio::test]
async fn failure_does_not_reset_comparison() {
    let sampler = MockSampler::new(vec![Ok(1), Err("transient".to_string()), Ok(1), Ok(2)]);

    let values: Vec<_> = stream_of(sampler).take(2).collect().await;

    assert_eq!(values, vec![1, 2]);
}

#[tokio::test]
async fn recovery_clears_failing_flag() {
    let sampler = MockSampler::new(vec![
        Ok(1),
        Err("access denied".to_string()),
        Err("access denied".to_string()),
        Ok(2),
    ]);
    let mut stream = stream_of(sampler);

    assert_eq!(stream.next().await, Some(1));
    assert!(!stream.is_failing());

    assert_eq!(stream.next().await, Some(2));
    assert!(!stream.is_failing());
}

#[tokio::test]
async fn failing_flag_stays_set_while_samples_fail() {
    let mut stream = stream_of(MockSampler::new(vec![Ok(1)]));

    assert_eq!(stream.next().await, Some(1));

    // The sampler is exhausted and fails on every later tick.
    let pending = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
    assert!(pending.is_err());
    assert!(stream.is_failing());
}

#[tokio::test]
async fn returning_to_earlier_value_is_emitted() {
    let values: Vec<_> = stream_of(MockSampler::returning(vec![1, 2, 1]))
        .take(3)
        .collect()
        .await;

    assert_eq!(values, vec![1, 2, 1]);
}

#[tokio::test]
async fn reachability_transitions_are_emitted() {
    let prober = ScriptedProber(Mutex::new(VecDeque::from([true, true, false, false, true])));
    let monitor = PollingMonitor::new(ReachabilitySampler::new(prober), Duration::from_millis(5));

    let values: Vec<_> = monitor.into_stream().take(3).collect().await;

    assert_eq!(values, vec![true, false, true]);
}

#[tokio::test]
async fn configuration_changes_are_emitted() {
    let gateway = Arc::new(
        MockGateway::with_interfaces(&["eth0"]).storing(Some("eth0"), IpConfiguration::dhcp()),
    );
    let reconciler = Arc::new(Reconciler::new(Arc::clone(&gateway), NoLinks));
    let sampler = ConfigurationSampler::new(Arc::clone(&reconciler), "eth0");
    assert_eq!(sampler.interface(), "eth0");

    let mut stream = PollingMonitor::new(sampler, Duration::from_millis(5)).into_stream();

    let first = stream.next().await.unwrap();
    assert_eq!(first, ConfigurationState::Available(IpConfiguration::dhcp()));

    let updated = IpConfiguration::static_ip(crate::network::StaticIpConfiguration::new(
        Some("10.0.0.2/8".parse().unwrap()),
        "10.0.0.1".parse().unwrap(),
        vec!["10.0.0.53".parse().unwrap()],
    ));
    reconciler.apply_configuration("eth0", &updated).unwrap();

    let second = stream.next().await.unwrap();
    assert_eq!(second, ConfigurationState::Available(updated));
}
