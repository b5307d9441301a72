use std::sync::Arc;

use {anyhow::Result, tracing::warn};

use {
    nestor_channels::{ChannelType, OutboundMessage, TracingEventSink},
    nestor_config::NestorConfig,
    nestor_gateway::ChannelOrchestrator,
};

fn orchestrator(config: &NestorConfig) -> Result<ChannelOrchestrator> {
    let configs = config.to_channel_configs()?;
    Ok(ChannelOrchestrator::new(configs)
        .with_default_factories()
        .with_event_sink(Arc::new(TracingEventSink)))
}

pub async fn send(
    config: &NestorConfig,
    channel: &str,
    to: String,
    message: String,
    subject: Option<String>,
) -> Result<()> {
    let channel_type: ChannelType = channel
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{e} (expected one of: telegram, email)"))?;

    let mut outbound = OutboundMessage::text(to, message);
    if let Some(subject) = subject {
        outbound = outbound.with_subject(subject);
    }

    let orch = orchestrator(config)?;
    let outcome = orch.dispatch(channel_type, &outbound).await;
    for (shut_channel, result) in orch.shutdown_all().await {
        if let Err(e) = result {
            warn!(channel = %shut_channel, error = %e, "shutdown failed");
        }
    }

    let receipt = outcome.inspect_err(|e| {
        if let Some(attempts) = e.attempts() {
            warn!(channel = %channel_type, attempts, "dispatch gave up");
        }
    })?;
    println!(
        "delivered via {} in {} attempt(s): {}",
        receipt.channel_type, receipt.attempts, receipt.message_id
    );
    Ok(())
}

pub fn status(config: &NestorConfig) -> Result<()> {
    let orch = orchestrator(config)?;
    let mut health: Vec<_> = orch.health().into_iter().collect();
    health.sort_by_key(|(channel_type, _)| channel_type.as_str());

    if health.is_empty() {
        eprintln!("no channels configured");
        return Ok(());
    }
    for (channel_type, state) in health {
        println!("{:<10} {state}", channel_type.as_str());
    }
    Ok(())
}
