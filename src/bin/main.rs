//! This is the main entry point of the FAT32 recovery tool.
//!
//! The program runs one command on a disk image: print the boot sector geometry, list
//! the root directory, print the volume layout, or recover a deleted file. Results and
//! the usage text are printed on stdout, diagnostics go through the logger on stderr.

use clap::Parser;
use clap::error::ErrorKind;
use fat_undelete::commands::{Cli, Command, usage};
use fat_undelete::filesystem::{Geometry, RecoveryMode, Sha1Digest};
use fat_undelete::traits::LayoutDisplay;
use fat_undelete::{DiskImage, FATVol};
use log::{debug, error};
use memmap2::MmapMut;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let prog = env::args().next().unwrap_or_else(|| String::from("fat_undelete"));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(_) => {
            print!("{}", usage(&prog));
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = stderrlog::new()
        .module(module_path!())
        .module("fat_undelete")
        .verbosity(usize::from(cli.verbose) + 1)
        .init()
    {
        eprintln!("Logger initialisation failed: {err}");
    }

    let command = Command::from_cli(&cli);
    if let Command::Invalid(msg) = &command {
        error!("{msg}");
        print!("{}", usage(&prog));
        return ExitCode::FAILURE;
    }

    let writable = matches!(command, Command::Recover { .. });
    let image = match DiskImage::open(&cli.disk, writable) {
        Ok(image) => image,
        Err(err) => {
            error!("Can't open {}: {err}", cli.disk.display());
            return ExitCode::FAILURE;
        }
    };
    let mut vol = match FATVol::from_image(image, cli.validate) {
        Ok(vol) => vol,
        Err(err) => {
            error!("{}: {err}", cli.disk.display());
            return ExitCode::FAILURE;
        }
    };

    let succeeded = match command {
        Command::Info => {
            print_info(vol.geometry());
            true
        }
        Command::List => print_root(&vol),
        Command::Layout => match vol.display_layout(3) {
            Ok(layout) => {
                print!("{layout}");
                true
            }
            Err(err) => {
                error!("Print layout error: {err}");
                false
            }
        },
        Command::Recover {
            filename,
            sha1,
            mode,
        } => recover(&mut vol, &filename, sha1.as_ref(), mode),
        Command::Invalid(_) => false,
    };

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_info(geometry: &Geometry) {
    println!("Number of FATs = {}", geometry.num_fat());
    println!("Number of bytes per sector = {}", geometry.bytes_per_sec());
    println!("Number of sectors per cluster = {}", geometry.sec_per_clus());
    println!("Number of reserved sectors = {}", geometry.rsvd_sec_cnt());
}

fn print_root(vol: &FATVol<MmapMut>) -> bool {
    match vol.list_root() {
        Ok(entries) => {
            for entry in &entries {
                println!("{entry}");
            }
            println!("Total number of entries = {}", entries.len());
            true
        }
        Err(err) => {
            error!("Root directory scan failed: {err}");
            false
        }
    }
}

/// Recovers `filename` and flushes the image. Prints exactly one result line.
fn recover(
    vol: &mut FATVol<MmapMut>,
    filename: &str,
    sha1: Option<&Sha1Digest>,
    mode: RecoveryMode,
) -> bool {
    let recovered = match vol.recover(filename, sha1, mode) {
        Ok(recovered) => recovered,
        Err(err) => {
            println!("{filename}: {err}");
            return false;
        }
    };

    if let Err(err) = vol.image().flush() {
        println!("{filename}: {err}");
        return false;
    }

    debug!(
        "{filename}: {} clusters linked from cluster {}",
        recovered.cluster_cnt(),
        recovered.entry().cluster_number()
    );
    if recovered.hash_verified() {
        println!("{filename}: successfully recovered with SHA-1");
    } else {
        println!("{filename}: successfully recovered");
    }
    true
}
