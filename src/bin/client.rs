//! # Range-Proof Client Binary
//!
//! Demo client: authenticates with its provisioned serial and keypair,
//! verifies the server's challenge binding, then submits a batch of
//! range proofs over randomly drawn values.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{rngs::OsRng, Rng};
use secure_range_proof::{
    build_range_proof, ecdsa_sign_digest, ecdsa_verify_digest, sha256, AuthResult, ClientConfig,
    ClientHello, ClientResponse, Envelope, MessageType, RangeProofResult, ServerChallenge, Sig64,
    Transport, NONCE_LEN,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Client submitting Pedersen-commitment range proofs to an srp-server
#[derive(Parser)]
#[command(name = "srp-client")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(long, default_value_t = 9000)]
    port: u16,

    /// Path to the key=value configuration file
    #[arg(long, default_value = "client/config/client.conf")]
    config: PathBuf,

    /// Claimed range lower bound
    #[arg(long, default_value_t = 0)]
    min: u64,

    /// Claimed range upper bound (default: 2^bitlen - 1)
    #[arg(long)]
    max: Option<u64>,

    /// Bit length bounding the range
    #[arg(long, default_value_t = 32)]
    bitlen: u32,

    /// Number of proofs to submit
    #[arg(long, default_value_t = 1)]
    requests: u32,
}

async fn send_env(
    transport: &mut Transport,
    msg_type: MessageType,
    payload: bytes::Bytes,
    request_id: Option<u32>,
) -> Result<()> {
    let env = Envelope {
        msg_type,
        payload,
        request_id,
    };
    transport.send_frame(&env.encode()?).await?;
    Ok(())
}

async fn recv_expected(transport: &mut Transport, expected: MessageType) -> Result<Envelope> {
    let frame = transport.recv_frame().await?;
    let env = Envelope::decode(&frame)?;
    if env.msg_type != expected {
        bail!("expected {expected:?}, got {:?}", env.msg_type);
    }
    Ok(env)
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    if cli.bitlen == 0 || cli.bitlen > 32 {
        bail!("bitlen must be 1..32");
    }
    let max = cli.max.unwrap_or((1u64 << cli.bitlen) - 1);
    if cli.min > max {
        bail!("min must not exceed max");
    }

    let identity = ClientConfig::load(&cli.config)?;

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .context("invalid server address")?;
    info!(%addr, serial = %identity.serial_id, "connecting");
    let mut transport = Transport::connect(addr).await?;

    // ---- Auth step 1: ClientHello ----
    let hello = ClientHello {
        serial_id: identity.serial_id.clone(),
        sig: ecdsa_sign_digest(
            &identity.client_priv,
            &sha256(identity.serial_id.as_bytes()),
        )?
        .to_vec(),
    };
    send_env(
        &mut transport,
        MessageType::ClientHello,
        hello.encode()?,
        None,
    )
    .await?;

    // ---- Auth step 2: ServerChallenge ----
    let env = recv_expected(&mut transport, MessageType::ServerChallenge).await?;
    let challenge = ServerChallenge::decode(&env.payload)?;
    if challenge.nonce.len() != NONCE_LEN {
        bail!("server nonce must be {NONCE_LEN} bytes");
    }
    let server_sig: Sig64 = challenge
        .server_sig
        .as_slice()
        .try_into()
        .map_err(|_| anyhow::anyhow!("server signature must be 64 bytes"))?;

    let mut bound = identity.serial_id.as_bytes().to_vec();
    bound.extend_from_slice(&challenge.nonce);
    if !ecdsa_verify_digest(&identity.server_pub, &sha256(&bound), &server_sig) {
        bail!("server signature verification failed");
    }

    // ---- Auth step 3: ClientResponse ----
    let response = ClientResponse {
        sig: ecdsa_sign_digest(&identity.client_priv, &sha256(&challenge.nonce))?.to_vec(),
    };
    send_env(
        &mut transport,
        MessageType::ClientResponse,
        response.encode()?,
        None,
    )
    .await?;

    let env = recv_expected(&mut transport, MessageType::AuthResult).await?;
    let auth = AuthResult::decode(&env.payload)?;
    if !auth.ok {
        bail!("auth failed: {}", auth.message.unwrap_or_default());
    }
    info!("auth ok: {}", auth.message.unwrap_or_default());

    // ---- Range proofs ----
    for i in 1..=cli.requests {
        let value = OsRng.gen_range(cli.min..=max);
        let proof = build_range_proof(cli.min, max, cli.bitlen, value)?;

        send_env(
            &mut transport,
            MessageType::RangeProofRequest,
            proof.encode()?,
            Some(i),
        )
        .await?;

        let env = recv_expected(&mut transport, MessageType::RangeProofResult).await?;
        if let Some(echoed) = env.request_id {
            if echoed != i {
                bail!("mismatched request_id: expected {i}, got {echoed}");
            }
        }
        let result = RangeProofResult::decode(&env.payload)?;
        info!(
            "range proof {}: {} (min={}, max={}, bitlen={})",
            if result.ok { "OK" } else { "FAIL" },
            result.message.unwrap_or_default(),
            cli.min,
            max,
            cli.bitlen
        );
    }

    Ok(())
}
