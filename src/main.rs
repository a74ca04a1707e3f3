use clap::Parser;
use safetynet::store::MemoTrustAnchorStore;
use safetynet::token::AttestationStatement;
use safetynet::verifier::OfflineVerifier;
use std::error::Error;
use std::fs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
enum SafetyNetCli {
    Verify(VerifyArgs),
    #[cfg(feature = "online")]
    VerifyOnline(OnlineArgs),
}

#[derive(Debug, clap::Args)]
struct TokenSource {
    /// The signed attestation, in compact JWS form
    #[arg(short, long, conflicts_with = "file")]
    token: Option<String>,

    /// File containing the signed attestation
    #[arg(short, long, default_value = "token.jws")]
    file: String,

    /// Print the statement as JSON
    #[arg(long)]
    json: bool,
}

impl TokenSource {
    fn read(&self) -> Result<String, Box<dyn Error>> {
        match &self.token {
            Some(t) => Ok(t.clone()),
            None => Ok(fs::read_to_string(&self.file)?.trim().to_string()),
        }
    }
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Verify the supplied attestation offline: signature, signing \
    certificate and hostname")]
struct VerifyArgs {
    #[command(flatten)]
    source: TokenSource,

    /// PEM bundle of root certificates the x5c chain must validate to
    #[arg(short, long)]
    roots: Option<String>,
}

#[cfg(feature = "online")]
#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Ask the attestation service to verify the supplied attestation \
    signature.  No certificate validation is done: do not use in production")]
struct OnlineArgs {
    #[command(flatten)]
    source: TokenSource,

    #[arg(long, env = "SAFETYNET_API_KEY")]
    api_key: String,

    #[arg(long, default_value = safetynet::verifier::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match SafetyNetCli::parse() {
        SafetyNetCli::Verify(args) => match verify(&args) {
            Ok(s) => print_statement(&s, args.source.json),
            Err(e) => eprintln!("verification failed: {e}"),
        },

        #[cfg(feature = "online")]
        SafetyNetCli::VerifyOnline(args) => match verify_online(&args) {
            Ok(s) => print_statement(&s, args.source.json),
            Err(e) => eprintln!("online verification failed: {e}"),
        },
    }
}

fn verify(args: &VerifyArgs) -> Result<AttestationStatement, Box<dyn Error>> {
    let token = args.source.read()?;

    let v = match &args.roots {
        Some(path) => {
            let pem = fs::read_to_string(path)?;

            let mut tas = MemoTrustAnchorStore::new();
            tas.load_pem(&pem)?;

            OfflineVerifier::with_trust_anchors(&tas)?
        }
        None => OfflineVerifier::new(),
    };

    Ok(v.verify_token(&token)?)
}

#[cfg(feature = "online")]
fn verify_online(args: &OnlineArgs) -> Result<AttestationStatement, Box<dyn Error>> {
    use safetynet::verifier::{OnlineConfig, OnlineVerifier};
    use std::time::Duration;

    let token = args.source.read()?;

    let config = OnlineConfig {
        endpoint: args.endpoint.clone(),
        api_key: args.api_key.clone(),
        timeout: Duration::from_secs(args.timeout),
    };

    Ok(OnlineVerifier::new(config)?.verify_token(&token)?)
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "TRUE"
    } else {
        "FALSE"
    }
}

fn print_statement(s: &AttestationStatement, json: bool) {
    if json {
        match serde_json::to_string_pretty(s) {
            Ok(j) => println!("{j}"),
            Err(e) => eprintln!("encoding statement: {e}"),
        }
        return;
    }

    println!("verification successful");
    println!("Nonce: {}", String::from_utf8_lossy(s.nonce()));
    println!("Timestamp: {} ms", s.timestamp_ms());

    // package details may be omitted when the service can't determine them
    if !s.apk_package_name().is_empty() && !s.apk_digest_sha256().is_empty() {
        println!("APK package name: {}", s.apk_package_name());
        println!("APK digest SHA256: {}", hex::encode(s.apk_digest_sha256()));
    }
    if !s.apk_certificate_digest_sha256().is_empty() {
        println!(
            "APK certificate digest SHA256: {}",
            hex::encode(s.apk_certificate_digest_sha256())
        );
    }

    println!("CTS profile match: {}", yes_no(s.cts_profile_match()));
    println!("Basic integrity match: {}", yes_no(s.basic_integrity()));

    if !s.evaluation_type().is_empty() {
        println!("Evaluation type: {}", s.evaluation_type());
    }
    if !s.advice().is_empty() {
        println!("Advice: {}", s.advice());
    }

    println!(
        "\nThis only shows the attestation is authentic. The caller must still \
        check that it matches the request by comparing nonce, package name, \
        timestamp and digests."
    );
}
