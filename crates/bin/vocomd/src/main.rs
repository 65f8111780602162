//! # vocomd — vocom daemon
//!
//! Composition root that wires the engine to its adapters and runs one
//! profile until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialise `tracing`
//! - Construct the port implementations (virtual adapter)
//! - Build the engine context, the registries and the profile codec
//! - Load the configured profile (by path or by name) into the profile
//!   library and activate it
//! - Feed console input to the virtual adapter
//! - Deactivate on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod console;

use std::io;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use vocom_adapter_virtual::{ScriptedMicrophone, ScriptedTranscriber, VirtualBackend};
use vocom_app::axis_sampler::AxisSampler;
use vocom_app::codec::ProfileCodec;
use vocom_app::context::EngineContext;
use vocom_app::dispatcher::PhraseDispatcher;
use vocom_app::ports::AutomationBackend;
use vocom_app::library::{DEFAULT_PROFILE, ProfileLibrary};
use vocom_app::profile::Profile;
use vocom_app::registry::Registries;

use crate::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Ports
    let backend = Arc::new(VirtualBackend::default());
    let automation: Arc<dyn AutomationBackend> = Arc::clone(&backend) as Arc<dyn AutomationBackend>;
    let microphone = ScriptedMicrophone::default();
    let speaker = microphone.speaker();
    let transcriber = Arc::new(ScriptedTranscriber::default());

    // Engine
    let dispatcher = Arc::new(PhraseDispatcher::new(
        config.dispatcher_config(),
        Box::new(microphone),
        transcriber,
    ));
    let sampler = Arc::new(AxisSampler::new(
        Arc::clone(&automation),
        config.axis.sampler_frequency,
    ));
    let context = EngineContext::new(automation, dispatcher, sampler);
    let registries = Registries::with_builtins().context("failed to register built-in types")?;
    let codec = ProfileCodec::new(registries, context.clone());

    let (mut library, active) = match load_configured(&codec, &config)? {
        Some(profile) => {
            let name = profile.name().to_string();
            let mut library = ProfileLibrary::new();
            library.add(name.clone(), profile)?;
            (library, name)
        }
        None => {
            tracing::warn!("no profile configured, running an empty one");
            (ProfileLibrary::with_default(context), DEFAULT_PROFILE.to_string())
        }
    };
    library
        .switch_to(Some(&active))
        .context("failed to activate profile")?;
    if let Some(profile) = library.active() {
        tracing::info!(
            profile = profile.name(),
            triggers = profile.triggers().len(),
            "vocomd running, press Ctrl-C to stop"
        );
    }

    // Console
    let console_backend = Arc::clone(&backend);
    thread::Builder::new()
        .name("vocom-console".to_string())
        .spawn(move || console::run(io::stdin().lock(), &console_backend, &speaker))
        .context("failed to start console")?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    library
        .switch_to(None)
        .context("failed to deactivate profile")?;
    tracing::info!("vocomd stopped");
    Ok(())
}

/// Load the profile named by the configuration: an explicit path first,
/// then a name looked up in the profile directory.
fn load_configured(codec: &ProfileCodec, config: &Config) -> anyhow::Result<Option<Profile>> {
    if let Some(path) = &config.profile.path {
        let profile = codec
            .load_file(path)
            .with_context(|| format!("failed to load profile {}", path.display()))?;
        return Ok(Some(profile));
    }
    if let Some(name) = &config.profile.name {
        let profile = codec
            .load_named(&config.profile.directory, name)
            .with_context(|| format!("failed to load profile `{name}`"))?;
        return Ok(Some(profile));
    }
    Ok(None)
}
