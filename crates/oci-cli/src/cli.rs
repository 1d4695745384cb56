use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "oci",
    about = "Inspect and validate OCI content digests and documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the digest of a file (`-` for stdin)
    Digest(DigestArgs),
    /// Check a file against an expected digest
    Verify(VerifyArgs),
    /// Break a digest string into its parts
    Parse(ParseArgs),
    /// Validate an OCI document and print its canonical form
    Validate(ValidateArgs),
    /// Show the registry request a path template resolves to
    Request(RequestArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum AlgorithmArg {
    Sha256,
    Sha384,
    Sha512,
}

#[derive(Args)]
pub struct DigestArgs {
    pub file: PathBuf,
    #[arg(short, long, value_enum, default_value = "sha256")]
    pub algorithm: AlgorithmArg,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub file: PathBuf,
    pub digest: String,
}

#[derive(Args)]
pub struct ParseArgs {
    pub digest: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DocumentKind {
    Manifest,
    Index,
    Image,
    Descriptor,
    Layout,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[arg(value_enum)]
    pub kind: DocumentKind,
    pub file: PathBuf,
}

#[derive(Args)]
pub struct RequestArgs {
    /// Registry address, e.g. https://registry.example.com
    pub address: String,
    /// HTTP method
    pub method: String,
    /// Path template, e.g. /v2/<name>/blobs/<digest>
    pub path: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub reference: Option<String>,
    #[arg(long)]
    pub digest: Option<String>,
    #[arg(long)]
    pub session_id: Option<String>,
}
