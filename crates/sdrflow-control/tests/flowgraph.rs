//! Bridge driving a live flowgraph.

use sdrflow_control::{ControlBridge, ControlError, NoEndpoints};
use sdrflow_core::{BlockId, FlowError};
use sdrflow_runtime::{Flowgraph, FlowgraphConfig, FlowgraphHandle, IngressGate};
use std::sync::Arc;
use std::time::Duration;

fn setup() -> (Flowgraph, IngressGate, FlowgraphHandle, ControlBridge) {
    let mut config = FlowgraphConfig::default();
    config.transform.fft_size = 64;
    config.buffer_capacity = 1024;
    let (flowgraph, gate, handle) = Flowgraph::new(config).unwrap();
    let bridge = ControlBridge::new(Arc::new(handle.clone()), Arc::new(NoEndpoints))
        .with_snapshots(Arc::new(handle.clone()));
    for block in [BlockId::SPECTRUM, BlockId::FRONTEND] {
        bridge
            .add_block("", block, &handle.parameters(block).unwrap())
            .unwrap();
    }
    (flowgraph, gate, handle, bridge)
}

#[test]
fn block_tables_become_widgets() {
    let (_fg, _gate, handle, bridge) = setup();
    assert_eq!(bridge.widgets().len(), 9);
    assert_eq!(bridge.value("fft_order"), Some(6.0));
    assert_eq!(
        bridge.value("freq"),
        Some(handle.frontend().freq())
    );
}

#[test]
fn frontend_slider_applies_immediately() {
    let (_fg, _gate, handle, bridge) = setup();
    assert_eq!(bridge.notify("vga", 21.0).unwrap(), 22.0);
    assert_eq!(handle.frontend().to_config().vga, 22);
    assert_eq!(bridge.notify("freq", 915_000_000.3).unwrap(), 915_000_000.0);
    assert_eq!(handle.frontend().to_config().freq, 915_000_000);
}

#[test]
fn oversized_window_is_refused_by_target() {
    let (_fg, _gate, handle, bridge) = setup();
    // 2^10 points of IQ is 2048 samples, twice the buffer
    let err = bridge.notify("fft_order", 10.0).unwrap_err();
    assert!(matches!(
        err,
        ControlError::Target {
            source: FlowError::InvalidParameter { .. },
            ..
        }
    ));
    assert_eq!(bridge.value("fft_order"), Some(6.0));
    assert_eq!(handle.spectrum_config().fft_size, 64);
}

#[tokio::test]
async fn spectrum_slider_reshapes_output() {
    let (flowgraph, mut gate, handle, bridge) = setup();
    let run = tokio::spawn(flowgraph.run());

    assert_eq!(bridge.notify("fft_order", 7.0).unwrap(), 7.0);
    assert!(gate.push(&[0; 256]).await.unwrap());
    tokio::time::timeout(Duration::from_secs(5), handle.wait_for_generation(1))
        .await
        .unwrap();

    let snap = bridge.spectrum().unwrap();
    assert_eq!(snap.len(), 128);

    handle.stop();
    run.await.unwrap();

    assert!(matches!(
        bridge.notify("window", 1.0),
        Err(ControlError::Target {
            source: FlowError::ShutdownInProgress,
            ..
        })
    ));
}
