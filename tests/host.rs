// Tests for the host adapter: event parsing, queue, dispatcher and shared engine

mod common;

use common::{RecordingChannel, SharedStore, gcode_file};
use preheat_rs::host::{ChannelCommandSink, HostEvent, HostEventQueue, SharedPreheatEngine, run_dispatcher};
use preheat_rs::{MemorySettingsStore, PreheatEngine, PreheatOutcome, TriggerEvent};
use preheat_shared::FileOrigin;
use preheat_shared::config::keys;
use preheat_shared::event_interface::EventInterface;
use preheat_shared::file_manager::LocalFileManager;
use preheat_shared::host_traits::{CommandChannel, SettingValue, SettingsStore};
use tokio::sync::mpsc;

fn shared_engine(store: impl SettingsStore + 'static, files: LocalFileManager, channel: &RecordingChannel) -> SharedPreheatEngine {
    SharedPreheatEngine::new(PreheatEngine::new(Box::new(store), Box::new(files), Box::new(channel.clone())))
}

#[test]
fn test_host_event_json() {
    let event: HostEvent = serde_json::from_str(r#"{"type":"file_selected","origin":"local","path":"benchy.gcode"}"#).unwrap();
    assert_eq!(
        event.trigger(),
        Some(TriggerEvent::FileSelected { origin: FileOrigin::Local, path: "benchy.gcode".to_string() })
    );

    let event: HostEvent = serde_json::from_str(r#"{"type":"file_selected","origin":"sdcard","path":"A.GCO"}"#).unwrap();
    assert!(matches!(event, HostEvent::FileSelected { origin: FileOrigin::SdCard, .. }));

    let event: HostEvent = serde_json::from_str(r#"{"type":"connected"}"#).unwrap();
    assert_eq!(event.trigger(), Some(TriggerEvent::PrinterConnected));

    let event: HostEvent =
        serde_json::from_str(r#"{"type":"temperatures","readings":{"B":[45.2,60.0],"T0":[178.9,null]}}"#).unwrap();
    match event {
        HostEvent::Temperatures { readings } => {
            assert_eq!(readings["B"], (Some(45.2), Some(60.0)));
            assert_eq!(readings["T0"], (Some(178.9), None));
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(serde_json::from_str::<HostEvent>(r#"{"type":"reboot"}"#).is_err());
}

#[test]
fn test_channel_sink_reports_closed_channel() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sink = ChannelCommandSink::new(tx);
    sink.send("M104 S200").unwrap();
    assert_eq!(rx.try_recv().unwrap(), "M104 S200");
    drop(rx);
    assert!(sink.send("M140 S60").is_err());
}

#[tokio::test]
async fn test_pump_and_dispatch_json_lines() {
    let file = gcode_file(&["M190 S62\n", "M109 S205\n"]);
    let dir = file.path().parent().unwrap().to_path_buf();
    let name = file.path().file_name().unwrap().to_string_lossy().to_string();

    let channel = RecordingChannel::default();
    let store = MemorySettingsStore::new().with(keys::USE_LAST_USED_BED_TEMPERATURE, true);
    let engine = shared_engine(store, LocalFileManager::with_directory(dir), &channel);

    let input = format!(
        concat!(
            r#"{{"type":"file_selected","origin":"local","path":"{}"}}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{{"type":"temperatures","readings":{{"B":[40.0,75.0]}}}}"#,
            "\n",
            r#"{{"type":"connected"}}"#,
            "\n"
        ),
        name
    );
    let events = HostEventQueue::new(4);
    let (queued, handled) = tokio::join!(events.pump_json_lines(input.as_bytes()), run_dispatcher(&engine, &events));
    assert_eq!(queued, 3);
    assert_eq!(handled, 3);
    assert_eq!(channel.sent(), vec!["M104 S205", "M140 S62", "M104 S215", "M140 S75"]);
}

#[tokio::test]
async fn test_closed_queue_rejects_events() {
    let events = HostEventQueue::new(1);
    events.close();
    assert!(events.send_event(HostEvent::Connected).await.is_err());
    assert_eq!(events.recv_event().await, None);
}

#[test]
fn test_settings_saved_event_reloads() {
    let channel = RecordingChannel::default();
    let store = SharedStore::default();
    let engine = shared_engine(store.clone(), LocalFileManager::new(), &channel);
    store.put(keys::PREHEAT_ON_PRINTER_CONNECTED, SettingValue::Bool(false));
    assert_eq!(engine.dispatch(HostEvent::SettingsSaved), None);
    assert_eq!(engine.dispatch(HostEvent::Connected), Some(PreheatOutcome::Disabled));
    assert!(!engine.with_engine(|e| e.settings().preheat_on_printer_connected));
}

#[test]
fn test_shared_engine_serialises_threads() {
    let channel = RecordingChannel::default();
    let engine = shared_engine(MemorySettingsStore::new(), LocalFileManager::new(), &channel);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                let mut readings = preheat_rs::TemperatureSnapshot::new();
                readings.insert("B".to_string(), (None, Some(60.0 + i as f64)));
                engine.observe(readings);
                engine.on_event(&TriggerEvent::PrinterConnected)
            })
        })
        .collect();
    for handle in handles {
        assert!(matches!(handle.join().unwrap(), Some(PreheatOutcome::Heated(_))));
    }
    assert_eq!(channel.sent().len(), 8);
    assert!(engine.with_engine(|e| e.observed().last_bed).is_some());
}
