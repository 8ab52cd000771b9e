// tests/change_events.rs

mod common;
use crate::common::{init_tracing, with_timeout, ScriptDir};

use std::error::Error;

use scriptvisor::events::{ChangeKind, ChangeNotifier, Notification};
use scriptvisor::{ScriptId, Supervisor};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn slow_subscriber_is_told_it_lagged() {
    let notifier = ChangeNotifier::new(2);
    let mut sub = notifier.subscribe();
    let id = ScriptId::resolve("/nonexistent/lag.py");

    for _ in 0..5 {
        notifier.publish(&id, ChangeKind::Inserted);
    }

    assert_eq!(sub.try_recv(), Some(Notification::Lagged { missed: 3 }));
    let seqs: Vec<u64> = std::iter::from_fn(|| match sub.try_recv() {
        Some(Notification::Changed(event)) => Some(event.seq),
        _ => None,
    })
    .collect();
    assert_eq!(seqs, vec![3, 4]);
}

#[test]
fn publishing_without_subscribers_does_not_fail() {
    let notifier = ChangeNotifier::new(4);
    notifier.publish(&ScriptId::resolve("/nonexistent/none.py"), ChangeKind::Removed);
}

#[tokio::test]
async fn subscriber_sees_events_for_each_script_in_mutation_order() -> TestResult {
    init_tracing();

    let dir = ScriptDir::new();
    let a = dir.script("a.sh", "sleep 0.1");
    let b = dir.script("b.sh", "sleep 0.2");
    let supervisor = Supervisor::default();
    let mut sub = supervisor.subscribe();

    let la = supervisor.launch(&a, &ScriptDir::sh())?;
    let lb = supervisor.launch(&b, &ScriptDir::sh())?;
    with_timeout(la).await;
    with_timeout(lb).await;

    let mut per_script: Vec<(ScriptId, ChangeKind, u64)> = Vec::new();
    for _ in 0..4 {
        match with_timeout(sub.recv()).await {
            Some(Notification::Changed(event)) => {
                per_script.push((event.identity, event.kind, event.seq))
            }
            other => panic!("unexpected notification {other:?}"),
        }
    }

    // Sequence numbers are strictly increasing across the stream.
    assert!(per_script.windows(2).all(|w| w[0].2 < w[1].2));

    for script in [&a, &b] {
        let id = ScriptId::resolve(script);
        let kinds: Vec<ChangeKind> = per_script
            .iter()
            .filter(|(i, _, _)| *i == id)
            .map(|(_, k, _)| *k)
            .collect();
        assert_eq!(kinds, vec![ChangeKind::Inserted, ChangeKind::Removed]);
    }
    Ok(())
}
