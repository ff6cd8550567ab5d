use anyhow::{Context, Result, bail};
use colored::*;
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use syncroom_client::{ClientConfig, ConnectionOrchestrator, StateSynchronizer};

const HOST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub counter: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CounterAction {
    #[serde(rename = "INC")]
    Inc,
    #[serde(rename = "DEC")]
    Dec,
    #[serde(rename = "RESET")]
    Reset,
}

pub fn reduce(state: &Counter, action: &CounterAction) -> Counter {
    let counter = match action {
        CounterAction::Inc => state.counter + 1,
        CounterAction::Dec => state.counter - 1,
        CounterAction::Reset => 0,
    };
    Counter { counter }
}

const MENU: [&str; 5] = ["Increment", "Decrement", "Reset", "Show", "Quit"];

pub async fn run(config: ClientConfig) -> Result<()> {
    println!(
        "{} {} {}",
        "Joining room".green().bold(),
        config.orchestrator.room_name.cyan(),
        format!("via {}", config.signaling_url).dimmed()
    );

    let (orchestrator, sync) = join_room(&config).await?;

    let role = if orchestrator.is_host() {
        "host".yellow().bold()
    } else {
        "client".blue().bold()
    };
    println!("Joined as {}", role);

    loop {
        let choice = tokio::task::spawn_blocking(|| {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Counter")
                .items(&MENU)
                .default(0)
                .interact()
        })
        .await??;

        let action = match choice {
            0 => CounterAction::Inc,
            1 => CounterAction::Dec,
            2 => CounterAction::Reset,
            3 => {
                print_state(&sync, &orchestrator);
                continue;
            }
            4 => break,
            other => bail!("Unknown menu entry {other}"),
        };

        sync.dispatch(action).await?;
        // give the host's delivery a moment before printing
        if !orchestrator.is_host() {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        print_state(&sync, &orchestrator);
    }

    drop(sync);
    orchestrator.close().await;
    println!("{}", "Left the room".green());
    Ok(())
}

/// Connects and waits for a host. The synchronizer exists before any channel
/// opens, so the host's snapshot on channel open is never missed.
pub async fn join_room(
    config: &ClientConfig,
) -> Result<(Arc<ConnectionOrchestrator>, StateSynchronizer<Counter, CounterAction>)> {
    let orchestrator = Arc::new(
        ConnectionOrchestrator::connect(&config.signaling_url, config.orchestrator.clone())
            .await
            .context("Failed to reach the signaling relay")?,
    );
    let sync = StateSynchronizer::new(orchestrator.clone(), reduce, Counter { counter: 0 })?;

    let mut host_changes = orchestrator.host_changes();
    tokio::time::timeout(HOST_TIMEOUT, host_changes.wait_for(|host| host.is_some()))
        .await
        .context("No host announced in time")?
        .context("Session ended before a host was known")?;

    Ok((orchestrator, sync))
}

fn print_state(sync: &StateSynchronizer<Counter, CounterAction>, orchestrator: &ConnectionOrchestrator) {
    let versioned = sync.versioned();
    println!(
        "  counter = {}  {}",
        versioned.state.counter.to_string().bold(),
        format!(
            "(revision {}, {} peers, {:?})",
            versioned.revision,
            orchestrator.peers().len(),
            orchestrator.state()
        )
        .dimmed()
    );
}
