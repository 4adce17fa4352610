use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a payload into a single frame.
    Encode(EncodeArgs),
    /// Decode frames from a byte stream and print them.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Data,
    Ack,
    Nack,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FcsArg {
    #[value(name = "16")]
    Fcs16,
    #[value(name = "32")]
    Fcs32,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Frame kind to encode.
    #[arg(long, short = 'k', default_value = "data")]
    pub kind: KindArg,
    /// Sequence number (0-7).
    #[arg(long, short = 's', default_value = "0")]
    pub seq: u8,
    /// Raw string payload (data frames only).
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Checksum width.
    #[arg(long, default_value = "16")]
    pub fcs: FcsArg,
    /// Print the frame as hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File to read frame bytes from. Reads stdin when omitted.
    pub file: Option<PathBuf>,
    /// Treat input as hex text rather than raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Checksum width.
    #[arg(long, default_value = "16")]
    pub fcs: FcsArg,
    /// Maximum payload size accepted per frame.
    #[arg(long, default_value = "4096")]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
