//! End-to-end tests for the full vocom stack.
//!
//! Each test wires the real engine (dispatcher, sampler, registries, codec)
//! to the virtual adapter, loads a profile document from disk and drives it
//! through simulated speech, key presses and joystick movement.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use vocom_adapter_virtual::{
    BackendCall, ScriptedMicrophone, ScriptedTranscriber, Speaker, VirtualBackend, VirtualWindow,
};
use vocom_app::axis_sampler::AxisSampler;
use vocom_app::codec::{DocumentFormat, ProfileCodec};
use vocom_app::context::EngineContext;
use vocom_app::dispatcher::{DispatcherConfig, PhraseDispatcher};
use vocom_app::library::{DEFAULT_PROFILE, ProfileLibrary};
use vocom_app::ports::AutomationBackend;
use vocom_app::registry::Registries;
use vocom_domain::axis::{AxisKey, AxisName};
use vocom_domain::error::{RegistryError, VocomError};

const PROFILE: &str = r#"
schema_version: "0"
profile_name: elite
triggers:
  - trigger_type: voice
    trigger_config:
      "*trigger_phrases": ["deploy landing gear"]
    actions:
      - action_type: send_input
        action_config:
          send_string: "{l}"
  - trigger_type: hotkey
    trigger_config:
      hotkey: "^!b"
    conditions:
      - condition_type: window_active
        condition_config:
          title: Elite
    actions:
      - action_type: press_key
        action_config:
          key: b
          hold_ms: 1
  - trigger_type: joystick_axis
    trigger_config:
      joystick_index: 1
      axis_name: Z
      trigger_mode: 2
      trigger_value: 50.0
      polling_frequency: 100
    actions:
      - action_type: run_process
        action_config:
          program: notify-send
          "*args": ["throttle up"]
"#;

struct Stack {
    backend: Arc<VirtualBackend>,
    speaker: Speaker,
    codec: ProfileCodec,
}

fn stack() -> Stack {
    let backend = Arc::new(VirtualBackend::default());
    let automation: Arc<dyn AutomationBackend> = Arc::clone(&backend) as Arc<dyn AutomationBackend>;
    let microphone = ScriptedMicrophone::default();
    let speaker = microphone.speaker();
    let dispatcher = PhraseDispatcher::new(
        DispatcherConfig {
            workers: 2,
            capture_timeout: Duration::from_millis(20),
            idle_interval: Duration::from_millis(5),
            ..DispatcherConfig::default()
        },
        Box::new(microphone),
        Arc::new(ScriptedTranscriber::default()),
    );
    let sampler = AxisSampler::new(Arc::clone(&automation), 200);
    let context = EngineContext::new(automation, Arc::new(dispatcher), Arc::new(sampler));
    let codec = ProfileCodec::new(Registries::with_builtins().unwrap(), context);
    Stack {
        backend,
        speaker,
        codec,
    }
}

fn write_profile(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("elite.yaml");
    std::fs::write(&path, PROFILE).unwrap();
    path
}

fn wait_for(backend: &VirtualBackend, call: &BackendCall) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if backend.calls().contains(call) {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

#[test]
fn should_send_input_when_phrase_is_spoken() {
    let stack = stack();
    let dir = tempfile::tempdir().unwrap();
    let mut profile = stack.codec.load_file(&write_profile(dir.path())).unwrap();
    profile.activate().unwrap();

    stack.speaker.say("please deploy the landing gear");

    assert!(wait_for(&stack.backend, &BackendCall::SendInput("{l}".to_string())));
    profile.deactivate().unwrap();
}

#[test]
fn should_ignore_unrelated_speech() {
    let stack = stack();
    let dir = tempfile::tempdir().unwrap();
    let mut profile = stack.codec.load_file(&write_profile(dir.path())).unwrap();
    profile.activate().unwrap();

    stack.speaker.say("xyzzy");
    thread::sleep(Duration::from_millis(100));
    profile.deactivate().unwrap();

    assert!(stack.backend.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Hotkeys and conditions
// ---------------------------------------------------------------------------

#[test]
fn should_press_key_only_when_window_is_active() {
    let stack = stack();
    let dir = tempfile::tempdir().unwrap();
    let mut profile = stack.codec.load_file(&write_profile(dir.path())).unwrap();
    profile.activate().unwrap();

    assert!(stack.backend.press("^!b"));
    assert!(stack.backend.calls().is_empty());

    stack.backend.open_window(VirtualWindow::new("Elite - Dangerous"));
    assert!(stack.backend.press("^!b"));
    assert_eq!(
        stack.backend.calls(),
        vec![
            BackendCall::KeyDown("b".to_string()),
            BackendCall::KeyUp("b".to_string()),
        ]
    );
    profile.deactivate().unwrap();
}

// ---------------------------------------------------------------------------
// Joystick axes
// ---------------------------------------------------------------------------

#[test]
fn should_run_process_when_throttle_crosses_threshold() {
    let stack = stack();
    let throttle = AxisKey {
        joystick: 1,
        axis: AxisName::Z,
    };
    stack.backend.set_axis(throttle, 0.0);
    let dir = tempfile::tempdir().unwrap();
    let mut profile = stack.codec.load_file(&write_profile(dir.path())).unwrap();
    profile.activate().unwrap();

    thread::sleep(Duration::from_millis(50));
    stack.backend.set_axis(throttle, 90.0);

    let expected = BackendCall::SpawnProcess {
        program: "notify-send".to_string(),
        args: vec!["throttle up".to_string()],
    };
    assert!(wait_for(&stack.backend, &expected));
    profile.deactivate().unwrap();
}

// ---------------------------------------------------------------------------
// Lifecycle and persistence
// ---------------------------------------------------------------------------

#[test]
fn should_release_every_hook_when_deactivated() {
    let stack = stack();
    let dir = tempfile::tempdir().unwrap();
    let mut profile = stack.codec.load_file(&write_profile(dir.path())).unwrap();

    profile.activate().unwrap();
    assert_eq!(stack.backend.hotkeys(), vec!["^!b".to_string()]);
    assert!(stack.codec.context().dispatcher().is_running());

    profile.deactivate().unwrap();
    assert!(stack.backend.hotkeys().is_empty());
    assert!(!stack.codec.context().dispatcher().is_running());
    assert!(!stack.codec.context().axis_sampler().is_running());
}

#[test]
fn should_save_loaded_profile_as_equivalent_json() {
    let stack = stack();
    let dir = tempfile::tempdir().unwrap();
    let profile = stack.codec.load_file(&write_profile(dir.path())).unwrap();
    let original = profile.to_document();

    let json_path = dir.path().join("elite.json");
    stack.codec.save_file(&profile, &json_path, false).unwrap();
    drop(profile);

    let text = std::fs::read_to_string(&json_path).unwrap();
    assert_eq!(DocumentFormat::Json.parse(&text).unwrap(), original);
    let reloaded = stack.codec.load_file(&json_path).unwrap();
    assert_eq!(reloaded.to_document(), original);
}

#[test]
fn should_leave_nothing_registered_when_document_is_invalid() {
    let stack = stack();
    let text = PROFILE.replace("trigger_type: hotkey", "trigger_type: mind_reader");

    let result = stack.codec.decode(&text, DocumentFormat::Yaml);

    assert!(matches!(
        result,
        Err(VocomError::Registry(RegistryError::UnknownType { .. }))
    ));
    assert!(stack.codec.context().dispatcher().registered_phrases().is_empty());
    assert!(stack.backend.hotkeys().is_empty());
}

#[test]
fn should_switch_between_named_profiles_from_directory() {
    let stack = stack();
    let dir = tempfile::tempdir().unwrap();
    let elite = stack.codec.load_file(&write_profile(dir.path())).unwrap();
    let profiles = dir.path().join("profiles");
    stack
        .codec
        .save_named(&elite, &profiles, DocumentFormat::Json, false)
        .unwrap();
    drop(elite);

    let mut library = ProfileLibrary::with_default(stack.codec.context().clone());
    let elite = stack.codec.load_named(&profiles, "elite").unwrap();
    library.add("elite", elite).unwrap();
    assert_eq!(library.names(), vec![DEFAULT_PROFILE, "elite"]);

    library.switch_to(Some("elite")).unwrap();
    assert_eq!(stack.backend.hotkeys(), vec!["^!b".to_string()]);

    library.switch_to(Some(DEFAULT_PROFILE)).unwrap();
    assert!(stack.backend.hotkeys().is_empty());
    assert!(!stack.codec.context().dispatcher().is_running());
    assert_eq!(library.active_name(), Some(DEFAULT_PROFILE));
}
