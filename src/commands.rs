//! This module defines the command line of the recovery tool and the `Command` enum
//! it is reduced to.
//!
//! Arguments are parsed by `clap` into a [`Cli`], then [`Command::from_cli`] checks
//! the combinations that `clap` alone can't express (exactly one mode, the digest
//! only with a recovery) and decodes the SHA-1 digest.

use clap::{ArgAction, Parser};
use hex::FromHex;
use std::path::PathBuf;

use crate::filesystem::recovery::{RecoveryMode, Sha1Digest};

/// Usage text printed on any command line error. `<prog>` is replaced by the program name.
pub const USAGE: &str = "\
Usage: <prog> disk <options>
  -i                     Print the file system information.
  -l                     List the root directory.
  -r filename [-s sha1]  Recover a contiguous file.
  -R filename -s sha1    Recover a possibly non-contiguous file.
";

/// Renders [`USAGE`] for the program `prog`.
pub fn usage(prog: &str) -> String {
    USAGE.replace("<prog>", prog)
}

/// Raw command line arguments.
#[derive(Parser, Debug)]
#[command(name = "fat_undelete")]
#[command(about = "Inspect a FAT32 disk image and recover deleted files")]
pub struct Cli {
    /// Path to the FAT32 disk image
    pub disk: PathBuf,

    /// Print the file system information
    #[arg(short = 'i')]
    pub info: bool,

    /// List the root directory
    #[arg(short = 'l')]
    pub list: bool,

    /// Print the layout of the volume regions
    #[arg(short = 'p', long = "layout")]
    pub layout: bool,

    /// Recover a contiguous file
    #[arg(short = 'r', value_name = "filename")]
    pub recover: Option<String>,

    /// Recover a possibly non-contiguous file
    #[arg(short = 'R', value_name = "filename")]
    pub recover_fragmented: Option<String>,

    /// SHA-1 of the file to recover, as 40 hex characters
    #[arg(short = 's', value_name = "sha1")]
    pub sha1: Option<String>,

    /// Apply the strict FAT32 boot sector checks
    #[arg(long)]
    pub validate: bool,

    /// Increase the log verbosity on stderr
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

/// Represents the single action requested on the command line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the boot sector geometry.
    Info,
    /// List the live entries of the root directory.
    List,
    /// Print the region layout of the volume.
    Layout,
    /// Recover a deleted file of the root directory.
    Recover {
        filename: String,
        sha1: Option<Sha1Digest>,
        mode: RecoveryMode,
    },
    /// Command for an invalid argument combination, encapsulating an error message.
    Invalid(String),
}

impl Command {
    /// Reduces parsed arguments to a command.
    ///
    /// # Parameters
    /// - `cli`: The arguments parsed by `clap`
    ///
    /// # Returns
    /// - `Command::Info`, `Command::List` or `Command::Layout` for `-i`, `-l` or `-p`.
    /// - `Command::Recover` for `-r` or `-R`, with the decoded digest of `-s` if any.
    /// - `Command::Invalid` if zero or several modes are given, if `-s` comes without
    ///   a recovery, if `-R` comes without `-s`, or if the digest is not 40 hex characters.
    pub fn from_cli(cli: &Cli) -> Self {
        let modes = [
            cli.info,
            cli.list,
            cli.layout,
            cli.recover.is_some(),
            cli.recover_fragmented.is_some(),
        ];
        if modes.iter().filter(|&&set| set).count() != 1 {
            return Command::Invalid(String::from("Exactly one of -i, -l, -p, -r or -R is expected."));
        }

        let sha1 = match cli.sha1.as_deref().map(<Sha1Digest>::from_hex).transpose() {
            Ok(sha1) => sha1,
            Err(err) => {
                return Command::Invalid(format!(
                    "Arg parsing error: '-s' expects 40 hex characters ({err})."
                ));
            }
        };

        if let Some(filename) = &cli.recover {
            Command::Recover {
                filename: filename.clone(),
                sha1,
                mode: RecoveryMode::Contiguous,
            }
        } else if let Some(filename) = &cli.recover_fragmented {
            if sha1.is_none() {
                return Command::Invalid(String::from("Missing arg: '-R' requires '-s sha1'."));
            }
            Command::Recover {
                filename: filename.clone(),
                sha1,
                mode: RecoveryMode::PossiblyNonContiguous,
            }
        } else if sha1.is_some() {
            Command::Invalid(String::from("'-s' is only valid with '-r' or '-R'."))
        } else if cli.info {
            Command::Info
        } else if cli.list {
            Command::List
        } else {
            Command::Layout
        }
    }
}
