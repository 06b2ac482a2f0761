use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use partyplay::config::{AppConfig, CliConfig, FileConfig};
use partyplay::party::{parse_genres, NewParty};
use partyplay::song_bank::{album_observations_from_top_tracks, SongSubmission};
use partyplay::user::NewUser;
use partyplay::PartyPlay;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "partyplay", version)]
struct CliArgs {
    /// Path to the SQLite database file. Without one nothing is persisted.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file, its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// How many albums `top-albums` shows when no --limit is given.
    #[clap(long, default_value_t = partyplay::song_bank::DEFAULT_TOP_ALBUMS_LIMIT)]
    pub top_albums_limit: usize,

    /// Log filter used when LOG_LEVEL is not set.
    #[clap(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Registers a user.
    CreateUser {
        spotify_id: String,
        name: String,
        #[clap(long, default_value = "")]
        uri: String,
        #[clap(long, default_value = "")]
        access_token: String,
        #[clap(long, default_value = "")]
        refresh_token: String,
    },

    /// Shows a user record.
    ShowUser { spotify_id: String },

    /// Replaces the access and refresh tokens of a user.
    UpdateTokens {
        spotify_id: String,
        access_token: String,
        refresh_token: String,
    },

    /// Creates a party hosted by the given user.
    CreateParty {
        host_spotify_id: String,
        playlist_id: String,
        playlist_name: String,
        /// Genres separated by '/', e.g. "rock/indie pop".
        #[clap(long, default_value = "")]
        genres: String,
        #[clap(long, default_value_t = 0)]
        duration_minutes: u32,
    },

    /// Changes the name, genres and duration of a party.
    UpdateParty {
        playlist_id: String,
        playlist_name: String,
        #[clap(long, default_value = "")]
        genres: String,
        #[clap(long, default_value_t = 0)]
        duration_minutes: u32,
    },

    /// Adds a user to a party as a guest.
    JoinParty {
        spotify_id: String,
        playlist_id: String,
    },

    /// Shows a party with its members and song bank.
    ShowParty { playlist_id: String },

    /// Merges a JSON array of songs into the party's song bank.
    MergeSongs {
        playlist_id: String,
        #[clap(value_parser = parse_path)]
        songs_file: PathBuf,
    },

    /// Shows the song bank of a party.
    SongBank { playlist_id: String },

    /// Counts the albums of a "top tracks" JSON payload.
    RecordAlbums {
        #[clap(value_parser = parse_path)]
        top_tracks_file: PathBuf,
    },

    /// Shows the most observed albums.
    TopAlbums {
        #[clap(long)]
        limit: Option<usize>,
    },

    /// Shows every album of the catalog.
    Albums,

    /// Shows how many users and parties exist.
    Stats,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn execute(app: &PartyPlay, command: Command) -> Result<()> {
    match command {
        Command::CreateUser {
            spotify_id,
            name,
            uri,
            access_token,
            refresh_token,
        } => {
            let mut new_user =
                NewUser::new(spotify_id, name).with_tokens(access_token, refresh_token);
            new_user.uri = uri;
            let id = app.users().create_user(new_user)?;
            print_json(&json!({ "id": id }))
        }
        Command::ShowUser { spotify_id } => {
            let user = app
                .users()
                .find_by_spotify_id(&spotify_id)?
                .with_context(|| format!("No user with spotify id {}", spotify_id))?;
            print_json(&user)
        }
        Command::UpdateTokens {
            spotify_id,
            access_token,
            refresh_token,
        } => {
            app.users()
                .update_tokens(&spotify_id, &access_token, &refresh_token)?;
            print_json(&app.users().find_by_spotify_id(&spotify_id)?)
        }
        Command::CreateParty {
            host_spotify_id,
            playlist_id,
            playlist_name,
            genres,
            duration_minutes,
        } => {
            let new_party = NewParty {
                playlist_id,
                playlist_name,
                genres: parse_genres(&genres),
                duration_minutes,
            };
            let id = app.parties().create_party(&host_spotify_id, new_party)?;
            print_json(&json!({ "id": id }))
        }
        Command::UpdateParty {
            playlist_id,
            playlist_name,
            genres,
            duration_minutes,
        } => {
            app.parties().update_party(
                &playlist_id,
                &playlist_name,
                parse_genres(&genres),
                duration_minutes,
            )?;
            print_json(&app.parties().get_party(&playlist_id)?)
        }
        Command::JoinParty {
            spotify_id,
            playlist_id,
        } => print_json(&app.parties().join_party(&spotify_id, &playlist_id)?),
        Command::ShowParty { playlist_id } => print_json(&app.parties().get_party(&playlist_id)?),
        Command::MergeSongs {
            playlist_id,
            songs_file,
        } => {
            let songs: Vec<SongSubmission> = serde_json::from_str(&read_file(&songs_file)?)
                .with_context(|| format!("Failed to parse songs from {:?}", songs_file))?;
            debug!("Read {} songs from {:?}", songs.len(), songs_file);
            app.song_bank().merge_songs(&playlist_id, songs)?;
            print_json(&app.song_bank().get_song_bank(&playlist_id)?)
        }
        Command::SongBank { playlist_id } => {
            print_json(&app.song_bank().get_song_bank(&playlist_id)?)
        }
        Command::RecordAlbums { top_tracks_file } => {
            let observations = album_observations_from_top_tracks(&read_file(&top_tracks_file)?)?;
            app.song_bank().record_album_observations(&observations)?;
            print_json(&json!({ "recorded": observations.len() }))
        }
        Command::TopAlbums { limit } => match limit {
            Some(limit) => print_json(&app.song_bank().top_albums(limit)?),
            None => print_json(&app.top_albums()?),
        },
        Command::Albums => print_json(&app.song_bank().get_all_albums()?),
        Command::Stats => print_json(&app.current_stats()?),
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_path: cli_args.db_path.clone(),
        top_albums_limit: cli_args.top_albums_limit,
        log_level: cli_args.log_level.clone(),
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    // stdout carries the JSON output, logs go to stderr.
    let filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("Failed to initialize logging")?;

    let app = PartyPlay::open(&config)?;
    execute(&app, cli_args.command)
}
