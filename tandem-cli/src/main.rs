use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use std::io::IsTerminal;
use std::time::Duration;
use tandem::Identity;
use tandem::client::transport::LoopbackRelay;
use tandem::client::{Role, Session, SessionConfig, SessionState};
use tandem::codec::decode_envelope;
use tandem::model::SignalingMessage;
use tandem::rtc::{RtcConfig, RtcConnector, SyntheticCamera};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

mod viewport;

use viewport::ConsoleViewport;

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Two-party media session negotiation", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Negotiate a call between two in-process participants.
    Demo {
        #[arg(long)]
        room: Option<String>,

        #[arg(long)]
        first: Option<String>,

        #[arg(long)]
        second: Option<String>,

        #[arg(long, default_value_t = 15)]
        timeout_secs: u64,

        /// Use the public STUN/TURN servers instead of host candidates only.
        #[arg(long)]
        stun: bool,
    },
    /// Decode a relay payload.
    Inspect { payload: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match Cli::parse().command {
        Commands::Demo {
            room,
            first,
            second,
            timeout_secs,
            stun,
        } => {
            let room = value_or_prompt(room, "Room", "room1")?;
            let first = value_or_prompt(first, "First participant", "alice")?;
            let second = value_or_prompt(second, "Second participant", "bob")?;
            if first == second {
                anyhow::bail!("Participants need distinct names");
            }

            let rtc = if stun {
                RtcConfig::default()
            } else {
                RtcConfig::local()
            };
            run_demo(&room, [first, second], rtc, Duration::from_secs(timeout_secs)).await?;
        }
        Commands::Inspect { payload } => inspect(&payload)?,
    }

    Ok(())
}

fn value_or_prompt(value: Option<String>, prompt: &str, default: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    if !std::io::stdin().is_terminal() {
        return Ok(default.to_owned());
    }
    Input::<String>::new()
        .with_prompt(prompt)
        .default(default.to_owned())
        .interact_text()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))
}

async fn run_demo(
    room: &str,
    names: [String; 2],
    rtc: RtcConfig,
    limit: Duration,
) -> Result<()> {
    println!(
        "{}",
        format!("🚀 Starting demo in room '{}'...", room).green().bold()
    );

    let relay = LoopbackRelay::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut statuses = Vec::new();
    let mut handles = Vec::new();

    for name in &names {
        let mut session = Session::new(
            SessionConfig::default(),
            SyntheticCamera,
            RtcConnector::new(rtc.clone()),
            Box::new(relay.channel()),
        )
        .with_viewport(Box::new(ConsoleViewport::new(name)));

        session
            .start(Identity::new(name.as_str(), room))
            .await
            .with_context(|| format!("{} failed to start", name))?;
        statuses.push(session.subscribe());

        let shutdown = shutdown_rx.clone();
        handles.push(tokio::spawn(async move {
            let result = session.run(shutdown).await;
            (session, result)
        }));
    }

    println!("{}", "📡 Negotiating...".cyan());
    let negotiated = tokio::time::timeout(limit, async {
        for status in &mut statuses {
            // Err means the session task already ended.
            if status
                .wait_for(|s| s.state == SessionState::Connected)
                .await
                .is_err()
            {
                return false;
            }
        }
        true
    })
    .await
    .unwrap_or(false);

    if negotiated {
        println!("{}", "✨ Both sides negotiated".green().bold());
        // Let remote tracks arrive before tearing down.
        tokio::time::sleep(Duration::from_secs(2)).await;
    } else {
        println!("{}", "⚠️  Negotiation did not finish in time".yellow().bold());
    }

    let _ = shutdown_tx.send(true);
    let mut failed = !negotiated;
    for (name, handle) in names.iter().zip(handles) {
        let (session, result) = handle.await.context("Session task panicked")?;
        let state = session.state().to_string();
        let state = if session.state() == SessionState::Closed && result.is_ok() {
            state.green()
        } else {
            state.red()
        };
        println!(
            "   {} {:<10} role: {:<12} final state: {}  remote tracks: {}",
            "•".bold(),
            name,
            describe_role(session.role()),
            state,
            session.remote_tracks().len()
        );
        if let Err(e) = result {
            println!("     {} {}", "error:".red().bold(), e);
            failed = true;
        }
    }

    if failed {
        anyhow::bail!("Demo failed");
    }
    Ok(())
}

fn describe_role(role: Role) -> ColoredString {
    match role {
        Role::Offerer => role.to_string().cyan(),
        Role::Answerer => role.to_string().magenta(),
        Role::Undetermined => role.to_string().dimmed(),
    }
}

fn inspect(payload: &str) -> Result<()> {
    let envelope = match decode_envelope(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            println!("{} {}", "✗".red().bold(), e);
            return Err(e).context("Payload rejected");
        }
    };

    println!(
        "{} {} from {} in room {}",
        "✓".green().bold(),
        envelope.data.kind().cyan().bold(),
        envelope.username.bold(),
        envelope.room.bold()
    );
    match &envelope.data {
        SignalingMessage::Offer { sdp } | SignalingMessage::Answer { sdp } => {
            println!("   sdp: {} lines", sdp.as_str().lines().count());
        }
        SignalingMessage::Candidate { candidate } => {
            println!("   candidate: {}", candidate.candidate);
            if let Some(mid) = &candidate.sdp_mid {
                println!("   sdpMid: {}", mid);
            }
            if let Some(index) = candidate.sdp_m_line_index {
                println!("   sdpMLineIndex: {}", index);
            }
        }
    }
    Ok(())
}
