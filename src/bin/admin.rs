use std::collections::VecDeque;
use std::io::Read;

use alloy::primitives::{Address, Bytes};
use serde_json::json;

use universal_verifier::codec::{
    decode_query_params, encode_query_params, pack_cross_chain_proofs, unpack_cross_chain_proofs,
    unpack_zk_proof,
};
use universal_verifier::crypto::{recover_message_signer, AttestationDomain, StateAttestor};
use universal_verifier::telemetry::{init_telemetry, TelemetryConfig};
use universal_verifier::{CircuitKind, CrossChainMessage, QueryParams};

fn print_help() {
    eprintln!(
        "\
universal-verifier-admin

USAGE:
  universal-verifier-admin <command> [options]

COMMANDS:
  pack-params                     Encode JSON query params to hex
  unpack-params                   Decode hex query params to JSON
  unpack-proof                    Decode a packed zk proof
  unpack-cross-chain              Decode a packed attestation list
  sign-states                     Sign and pack cross-chain state messages

pack-params OPTIONS:
  --input <path|->                (default: -) JSON query params

unpack-params OPTIONS:
  --hex <hex>                     (required) Encoded query params

unpack-proof OPTIONS:
  --hex <hex>                     (required) Packed proof
  --circuit <circuit id>          (optional) Name signals with this circuit's layout

unpack-cross-chain OPTIONS:
  --hex <hex>                     (required) Packed attestation list
  --chain-id <n>                  (optional) Recover signers under this chain id
  --contract <address>            (optional) Verifier address (default: zero)

sign-states OPTIONS:
  --secret-key <hex>              (defaults to env ATTESTOR_SECRET_KEY)
  --chain-id <n>                  (required)
  --contract <address>            (required)
  --input <path|->                (default: -) JSON array of messages
"
    );
}

fn next_value(args: &mut VecDeque<String>, flag: &str) -> anyhow::Result<String> {
    args.pop_front()
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn parse_hex(label: &str, raw: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(raw.trim().trim_start_matches("0x"))
        .map_err(|e| anyhow::anyhow!("invalid {label} hex: {e}"))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let telemetry = TelemetryConfig {
        log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
        ..TelemetryConfig::from_env()
    };
    init_telemetry(&telemetry).map_err(|e| anyhow::anyhow!("telemetry: {e}"))?;

    let mut args: VecDeque<String> = std::env::args().skip(1).collect();
    let Some(command) = args.pop_front() else {
        print_help();
        return Ok(());
    };

    if matches!(command.as_str(), "-h" | "--help" | "help") {
        print_help();
        return Ok(());
    }

    match command.as_str() {
        "pack-params" => {
            let mut input = "-".to_string();
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--input" => input = next_value(&mut args, "--input")?,
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let params: QueryParams = serde_json::from_str(&read_input(&input)?)?;
            let encoded = encode_query_params(&params)?;
            println!("0x{}", hex::encode(&encoded));
            Ok(())
        }
        "unpack-params" => {
            let mut raw: Option<String> = None;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--hex" => raw = Some(next_value(&mut args, "--hex")?),
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let raw = raw.ok_or_else(|| anyhow::anyhow!("--hex is required"))?;
            let params = decode_query_params(&parse_hex("params", &raw)?)?;
            print_json(&params)
        }
        "unpack-proof" => {
            let mut raw: Option<String> = None;
            let mut circuit: Option<CircuitKind> = None;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--hex" => raw = Some(next_value(&mut args, "--hex")?),
                    "--circuit" => {
                        let id = next_value(&mut args, "--circuit")?;
                        circuit = Some(
                            CircuitKind::from_circuit_id(&id)
                                .ok_or_else(|| anyhow::anyhow!("unsupported circuit: {id}"))?,
                        );
                    }
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let raw = raw.ok_or_else(|| anyhow::anyhow!("--hex is required"))?;
            let (signals, proof) = unpack_zk_proof(&parse_hex("proof", &raw)?)?;
            let named = match circuit {
                Some(kind) => Some(kind.layout().decode(&signals)?),
                None => None,
            };
            print_json(&json!({
                "signals": signals,
                "namedSignals": named,
                "proof": proof,
            }))
        }
        "unpack-cross-chain" => {
            let mut raw: Option<String> = None;
            let mut chain_id: Option<u64> = None;
            let mut contract = Address::ZERO;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--hex" => raw = Some(next_value(&mut args, "--hex")?),
                    "--chain-id" => chain_id = Some(next_value(&mut args, "--chain-id")?.parse()?),
                    "--contract" => contract = next_value(&mut args, "--contract")?.parse()?,
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let raw = raw.ok_or_else(|| anyhow::anyhow!("--hex is required"))?;
            let messages = unpack_cross_chain_proofs(&parse_hex("cross-chain", &raw)?)?;
            let domain = chain_id.map(|id| AttestationDomain::new(id, contract));

            let entries: Vec<_> = messages
                .iter()
                .map(|signed| {
                    let signer = domain.as_ref().map(|domain| {
                        recover_message_signer(domain, signed)
                            .map(|address| address.to_string())
                            .unwrap_or_else(|e| format!("unrecoverable: {e}"))
                    });
                    json!({
                        "message": signed.message,
                        "signature": signed.signature,
                        "signer": signer,
                    })
                })
                .collect();
            print_json(&entries)
        }
        "sign-states" => {
            let mut secret_key: Option<String> = None;
            let mut chain_id: Option<u64> = None;
            let mut contract: Option<Address> = None;
            let mut input = "-".to_string();
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--secret-key" => secret_key = Some(next_value(&mut args, "--secret-key")?),
                    "--chain-id" => chain_id = Some(next_value(&mut args, "--chain-id")?.parse()?),
                    "--contract" => contract = Some(next_value(&mut args, "--contract")?.parse()?),
                    "--input" => input = next_value(&mut args, "--input")?,
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let secret_key = secret_key
                .or_else(|| std::env::var("ATTESTOR_SECRET_KEY").ok())
                .ok_or_else(|| anyhow::anyhow!("--secret-key or ATTESTOR_SECRET_KEY is required"))?;
            let domain = AttestationDomain::new(
                chain_id.ok_or_else(|| anyhow::anyhow!("--chain-id is required"))?,
                contract.ok_or_else(|| anyhow::anyhow!("--contract is required"))?,
            );
            let attestor = StateAttestor::from_hex(&secret_key, domain)?;

            let messages: Vec<CrossChainMessage> = serde_json::from_str(&read_input(&input)?)?;
            let signed = messages
                .into_iter()
                .map(|message| attestor.sign_message(message))
                .collect::<Result<Vec<_>, _>>()?;
            let packed: Bytes = pack_cross_chain_proofs(&signed)?;

            eprintln!("signer: {}", attestor.address());
            println!("{packed}");
            Ok(())
        }
        other => {
            print_help();
            anyhow::bail!("unknown command: {other}")
        }
    }
}
