//! Snapshot command - Record current skill totals
//!
//! Meant to run periodically (cron, systemd timer). Each run aggregates
//! every player's records and stores one snapshot per player and
//! instrument; the ranking list reads the latest of these.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use gitadora_config::Config;
use gitadora_skill::{InstrumentType, SkillAggregator};
use tracing::{info, warn};

/// Snapshot command arguments
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Instrument to snapshot (default: all)
    #[arg(short, long)]
    pub instrument: Option<String>,
}

/// Run the snapshot command
pub async fn run(config: Config, args: SnapshotArgs) -> Result<()> {
    let instruments = match args.instrument.as_deref() {
        Some(name) => vec![InstrumentType::parse(name)?],
        None => InstrumentType::ALL.to_vec(),
    };

    let db = super::open_database(&config).await?;
    let aggregator = SkillAggregator::new();
    let users = db.users().list().await.context("failed to list users")?;

    // One timestamp for the whole run
    let recorded_at = Utc::now();
    let mut written = 0usize;
    let mut failed = 0usize;

    for instrument in &instruments {
        for user in &users {
            match db
                .skills()
                .take_snapshot(user.id, *instrument, &aggregator, recorded_at)
                .await
            {
                Ok(snapshot) => {
                    written += 1;
                    info!(
                        player_id = user.id,
                        instrument = %instrument,
                        total_skill = snapshot.total_skill,
                        "Snapshot stored"
                    );
                }
                Err(e) => {
                    failed += 1;
                    warn!(player_id = user.id, instrument = %instrument, error = %e, "Snapshot failed");
                }
            }
        }
    }

    db.close().await;

    println!(
        "Stored {} snapshot(s) for {} player(s) across {} instrument(s)",
        written,
        users.len(),
        instruments.len()
    );

    if failed > 0 {
        anyhow::bail!("{} snapshot(s) failed", failed);
    }
    Ok(())
}
