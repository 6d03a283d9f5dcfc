//! `sign` (§6.3): attach a detached RSA-PSS signature and an RFC 3161
//! timestamp to an already-persisted container.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use tracing::info;

use provtool_core::hash::Sha256Digest;
use provtool_sign::signer::sign_container;
use provtool_sign::timestamp::HttpTimestampAuthority;

#[derive(Parser, Debug)]
#[command(name = "sign", version, about = "Provenance signatures")]
struct Args {
    /// Path to the provenance container to sign.
    #[arg(long)]
    provfile: PathBuf,

    /// Path to the signer's PKCS#8 PEM private key file.
    #[arg(long)]
    private: PathBuf,

    /// The signer's family name.
    #[arg(long)]
    familyname: String,

    /// The signer's given name.
    #[arg(long)]
    givenname: String,

    /// URL of an RFC 3161 timestamp authority, e.g. http://zeitstempel.dfn.de
    #[arg(long)]
    timestampserver: String,
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let raw_bytes = std::fs::read(&args.provfile)
        .with_context(|| format!("reading {}", args.provfile.display()))?;
    let private_key = RsaPrivateKey::read_pkcs8_pem_file(&args.private)
        .with_context(|| format!("loading private key {}", args.private.display()))?;
    let authority = HttpTimestampAuthority::new(&args.timestampserver);

    let output = sign_container(&raw_bytes, &private_key, &args.familyname, &args.givenname, &authority)
        .context("signing container")?;

    let base = args.provfile.parent().unwrap_or_else(|| std::path::Path::new("."));

    let signed_path = base.join(format!("{}.prov", output.new_cid));
    std::fs::write(&signed_path, &output.signed_container_bytes)?;

    let signature_path = base.join(Sha256Digest::of(&output.signature_bytes).to_hex());
    std::fs::write(&signature_path, &output.signature_bytes)?;

    let timestamp_path = base.join(Sha256Digest::of(&output.timestamp_reply).to_hex());
    std::fs::write(&timestamp_path, &output.timestamp_reply)?;

    info!(signed = %signed_path.display(), "wrote signed container");
    println!("{}", signed_path.display());
    Ok(())
}

fn main() {
    provtool_cli::init_logging("sign.log");
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
