use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use oci_digest::{Algorithm, AlgorithmRegistry, Digest, DigestError};
use oci_distribution::{Client, ClientConfig, Method, RequestOptions};
use oci_image::{Descriptor, Image, ImageLayout, Index, Manifest};
use oci_struct::Document;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Digest(args) => cmd_digest(args, format),
        Command::Verify(args) => cmd_verify(args, format),
        Command::Parse(args) => cmd_parse(args, format),
        Command::Validate(args) => cmd_validate(args, format),
        Command::Request(args) => cmd_request(args, format),
    }
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Sha256 => Algorithm::Sha256,
            AlgorithmArg::Sha384 => Algorithm::Sha384,
            AlgorithmArg::Sha512 => Algorithm::Sha512,
        }
    }
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(Box::new(file))
}

fn digest_file(path: &Path, algorithm: Algorithm) -> anyhow::Result<Digest> {
    let reader = open_input(path)?;
    let digest = algorithm
        .from_reader(reader)
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(digest)
}

fn verify_file(path: &Path, expected: &Digest) -> anyhow::Result<bool> {
    let mut reader = open_input(path)?;
    let mut verifier = expected.verifier();
    io::copy(&mut reader, &mut verifier).with_context(|| format!("cannot read {}", path.display()))?;
    Ok(verifier.verified())
}

fn cmd_digest(args: DigestArgs, format: OutputFormat) -> anyhow::Result<()> {
    tracing::debug!(algorithm = ?args.algorithm, file = %args.file.display(), "digesting");
    let digest = digest_file(&args.file, args.algorithm.into())?;
    match format {
        OutputFormat::Text => println!("{}  {}", digest, args.file.display()),
        OutputFormat::Json => println!(
            "{}",
            json!({"file": args.file.display().to_string(), "digest": digest})
        ),
    }
    Ok(())
}

fn cmd_verify(args: VerifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let expected = match Digest::parse(&args.digest) {
        Ok(d) => d,
        Err(err @ DigestError::UnsupportedAlgorithm(_)) => {
            bail!("cannot verify {}: {err}", args.digest)
        }
        Err(err) => bail!("invalid digest {}: {err}", args.digest),
    };
    let verified = verify_file(&args.file, &expected)?;
    match format {
        OutputFormat::Text if verified => {
            println!("{} {} matches {}", "✓".green().bold(), args.file.display(), expected.to_string().cyan())
        }
        OutputFormat::Text => {
            println!("{} {} does not match {}", "✗".red().bold(), args.file.display(), expected.to_string().cyan())
        }
        OutputFormat::Json => println!(
            "{}",
            json!({"file": args.file.display().to_string(), "digest": expected, "verified": verified})
        ),
    }
    if !verified {
        bail!("digest mismatch");
    }
    Ok(())
}

/// Outcome of parsing a digest string: the grammar may accept it while the
/// registry does not know its algorithm.
#[derive(Debug, PartialEq)]
struct ParsedDigest {
    digest: Digest,
    error: Option<DigestError>,
}

fn parse_digest(input: &str) -> Result<ParsedDigest, DigestError> {
    let digest = Digest::parse_lenient(input)?;
    let error = digest.validate_with(AlgorithmRegistry::standard()).err();
    Ok(ParsedDigest { digest, error })
}

fn cmd_parse(args: ParseArgs, format: OutputFormat) -> anyhow::Result<()> {
    let parsed = parse_digest(&args.digest).with_context(|| format!("invalid digest {}", args.digest))?;
    let d = &parsed.digest;
    match format {
        OutputFormat::Text => {
            println!("Algorithm: {}", d.algorithm_token().yellow());
            println!("Encoded:   {}", d.encoded());
            match &parsed.error {
                None => println!("Status:    {}", "valid".green()),
                Some(err) if err.is_unsupported() => {
                    println!("Status:    {} ({err})", "unsupported".yellow())
                }
                Some(err) => println!("Status:    {} ({err})", "invalid".red()),
            }
        }
        OutputFormat::Json => println!(
            "{}",
            json!({
                "algorithm": d.algorithm_token(),
                "encoded": d.encoded(),
                "supported": parsed.error.as_ref().map_or(true, |e| !e.is_unsupported()),
                "error": parsed.error.as_ref().map(|e| e.to_string()),
            })
        ),
    }
    match parsed.error {
        Some(err) if !err.is_unsupported() => Err(err.into()),
        _ => Ok(()),
    }
}

fn canonical_json(kind: DocumentKind, text: &str) -> anyhow::Result<String> {
    let out = match kind {
        DocumentKind::Manifest => Manifest::from_json(text)?.to_json()?,
        DocumentKind::Index => Index::from_json(text)?.to_json()?,
        DocumentKind::Image => Image::from_json(text)?.to_json()?,
        DocumentKind::Descriptor => Descriptor::from_json(text)?.to_json()?,
        DocumentKind::Layout => ImageLayout::from_json(text)?.to_json()?,
    };
    Ok(out)
}

fn cmd_validate(args: ValidateArgs, format: OutputFormat) -> anyhow::Result<()> {
    tracing::debug!(kind = ?args.kind, file = %args.file.display(), "validating document");
    let mut text = String::new();
    open_input(&args.file)?
        .read_to_string(&mut text)
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let canonical = canonical_json(args.kind, &text)
        .with_context(|| format!("{} is not a valid {:?}", args.file.display(), args.kind))?;
    match format {
        OutputFormat::Text => {
            eprintln!("{} {} is a valid {:?}", "✓".green().bold(), args.file.display(), args.kind);
            println!("{canonical}");
        }
        OutputFormat::Json => println!("{canonical}"),
    }
    Ok(())
}

fn cmd_request(args: RequestArgs, format: OutputFormat) -> anyhow::Result<()> {
    let client = Client::new(ClientConfig::new(args.address))?;
    let method: Method = args.method.to_ascii_uppercase().parse()?;
    let mut options = RequestOptions::new();
    options.name = args.name;
    options.reference = args.reference;
    options.digest = args.digest;
    options.session_id = args.session_id;
    let request = client.new_request(method, &args.path, options)?;
    match format {
        OutputFormat::Text => {
            println!("{} {}", request.method().to_string().bold(), request.url());
            for (name, value) in request.headers() {
                println!("  {}: {}", name.dimmed(), value);
            }
        }
        OutputFormat::Json => println!(
            "{}",
            json!({
                "method": request.method().as_str(),
                "url": request.url().as_str(),
                "headers": request.headers().iter().map(|(k, v)| json!([k, v])).collect::<Vec<_>>(),
            })
        ),
    }
    Ok(())
}
