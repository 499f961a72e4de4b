use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use log::info;

use mp4split::{move_header_and_write, split_and_write, sync_points, Mp4Error};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Split MP4 files at a time point, or relocate the movie header for fast-start playback"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Move the 'moov' atom ahead of 'mdat' so playback can start while
    /// the file downloads
    Faststart {
        /// Input MP4 file
        infile: PathBuf,

        /// Output file; omit to rewrite the input in place
        outfile: Option<PathBuf>,
    },
    /// Drop everything before the sample boundary at or before the given
    /// time and rebuild the movie header
    Split {
        /// Input MP4 file
        infile: PathBuf,

        /// Split point in seconds
        seconds: f64,

        /// Output file; defaults to <infile>.split.mp4
        outfile: Option<PathBuf>,
    },
    /// Print sync (keyframe) sample times in seconds
    SyncPoints {
        /// Input MP4 file
        infile: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Mp4Error> {
    match command {
        Command::Faststart { infile, outfile } => faststart(&infile, outfile.as_deref()),
        Command::Split {
            infile,
            seconds,
            outfile,
        } => {
            let outfile = outfile.unwrap_or_else(|| default_split_path(&infile));
            let mut reader = BufReader::new(File::open(&infile)?);
            let mut writer = BufWriter::new(File::create(&outfile)?);
            split_and_write(&mut reader, &mut writer, seconds)?;
            writer.flush()?;
            info!("wrote {}", outfile.display());
            Ok(())
        }
        Command::SyncPoints { infile } => {
            let mut reader = BufReader::new(File::open(&infile)?);
            for t in sync_points(&mut reader)? {
                println!("{t}");
            }
            Ok(())
        }
    }
}

fn faststart(infile: &Path, outfile: Option<&Path>) -> Result<(), Mp4Error> {
    let mut reader = BufReader::new(File::open(infile)?);
    match outfile {
        Some(outfile) => {
            let mut writer = BufWriter::new(File::create(outfile)?);
            let moved = move_header_and_write(&mut reader, &mut writer)?;
            writer.flush()?;
            info!("wrote {} (moved: {moved})", outfile.display());
        }
        None => {
            // Rewrite in place via a sibling temp file, keeping mode bits.
            let dir = infile.parent().unwrap_or_else(|| Path::new("."));
            let mut temp = tempfile::NamedTempFile::new_in(dir)?;
            let moved = move_header_and_write(&mut reader, &mut temp)?;
            temp.flush()?;
            let permissions = fs::metadata(infile)?.permissions();
            fs::set_permissions(temp.path(), permissions)?;
            temp.persist(infile).map_err(|err| Mp4Error::Io(err.error))?;
            info!("rewrote {} (moved: {moved})", infile.display());
        }
    }
    Ok(())
}

fn default_split_path(infile: &Path) -> PathBuf {
    let mut name = infile.file_stem().unwrap_or_default().to_os_string();
    name.push(".split.mp4");
    infile.with_file_name(name)
}
