//! Command implementations
//!
//! Each command opens a session over the on-disk stores, does its work, and
//! closes the session so every live handle is released.

use crate::config::AppConfig;
use crate::error::{CliError, Result};
use cadence_core::{Blob, Track, TrackId, TrackSource};
use cadence_playback::{HeadlessMedia, Player, PlayerEvent, RehydrationReport};
use cadence_storage::{FsAssetStore, FsSnapshotStore};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// A headless player over the configured data directory
pub struct Session {
    player: Player<HeadlessMedia>,
}

impl Session {
    /// Open the stores and load the saved playlist
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let assets = FsAssetStore::open(config.storage.assets_dir()).await?;
        let snapshots = FsSnapshotStore::open(config.storage.snapshots_dir()).await?;

        let mut player = Player::open(
            HeadlessMedia::new(),
            Arc::new(assets),
            Arc::new(snapshots),
            config.playback.clone(),
        )
        .await?;

        for warning in player.startup_warnings() {
            warn!(error = %warning, "Startup warning");
        }
        player.subscribe(|event| {
            if let PlayerEvent::Warning(error) = event {
                warn!(error = %error, "Player warning");
            }
        });

        info!(data_dir = ?config.storage.data_dir, "Session opened");
        Ok(Self { player })
    }

    /// The underlying player
    pub fn player(&self) -> &Player<HeadlessMedia> {
        &self.player
    }

    /// Release every live handle
    pub fn close(mut self) -> usize {
        self.player.shutdown()
    }
}

/// Print the playlist, restoring stored tracks first so playability is real
pub async fn list(session: &mut Session, out: &mut impl Write) -> Result<()> {
    session.player.rehydrate_all().await;

    let current = session.player.status().current_index;
    let tracks = session.player.tracks();
    if tracks.is_empty() {
        writeln!(out, "Playlist is empty")?;
        return Ok(());
    }

    for (index, track) in tracks.iter().enumerate() {
        let marker = if index == current { '*' } else { ' ' };
        writeln!(
            out,
            "{marker}{index:>3}  {:<20}  {} - {}  [{}, {}]",
            track.id.as_str(),
            track.title,
            track.artist,
            source_kind(track),
            availability(track),
        )?;
    }
    Ok(())
}

/// Read files from disk and append them to the playlist
///
/// Every file is read before anything is added, so an unreadable path
/// leaves the playlist untouched.
pub async fn add(
    session: &mut Session,
    paths: &[PathBuf],
    out: &mut impl Write,
) -> Result<Vec<TrackId>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push((read_blob(path).await?, file_name(path)));
    }

    let added = session.player.add_local_files(files).await;
    for id in &added {
        let title = session
            .player
            .tracks()
            .iter()
            .find(|track| &track.id == id)
            .map_or("", |track| track.title.as_str());
        writeln!(out, "Added {id}  {title}")?;
    }
    Ok(added)
}

/// Remove a track and its stored blob
pub async fn remove(session: &mut Session, id: &str, out: &mut impl Write) -> Result<()> {
    let id = TrackId::new(id);
    if !session.player.remove(&id).await {
        return Err(CliError::UnknownTrack(id.to_string()));
    }

    writeln!(out, "Removed {id}")?;
    Ok(())
}

/// Rehydrate every stored track and report the ones whose blob is gone
pub async fn check(session: &mut Session, out: &mut impl Write) -> Result<RehydrationReport> {
    let report = session.player.rehydrate_all().await;

    writeln!(
        out,
        "restored {}, missing {}, failed {}",
        report.restored, report.missing, report.failed
    )?;
    for track in session.player.tracks().iter().filter(|t| t.asset_missing) {
        writeln!(out, "missing asset: {}  {}", track.id, track.title)?;
    }
    Ok(report)
}

async fn read_blob(path: &Path) -> Result<Blob> {
    let data = tokio::fs::read(path).await?;
    Ok(match mime_guess::from_path(path).first() {
        Some(mime) => Blob::with_content_type(data, mime.to_string()),
        None => Blob::new(data),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn source_kind(track: &Track) -> &'static str {
    match track.source {
        TrackSource::Remote { .. } => "remote",
        TrackSource::Stored { .. } => "stored",
        TrackSource::None => "none",
    }
}

fn availability(track: &Track) -> &'static str {
    if track.is_playable() {
        "playable"
    } else if track.asset_missing {
        "missing"
    } else if track.needs_rehydration() {
        "pending"
    } else {
        "unplayable"
    }
}
