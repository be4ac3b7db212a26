//! CLI commands for the toolkit
//!
//! Implements all command handlers for the CLI interface.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::Network;
use crate::core::{multisig_address_from_addresses, sign_transaction, Address};
use crate::crypto::{KeyPair, PublicKey};
use crate::entities::{DecodeOptions, Entity, EntityKind, Sha256Hash};
use crate::schema::{parse_signed_transaction, parse_transaction, signed_transaction_to_json};
use crate::script::parse_btc_script_sig;
use crate::wallet::KeyFile;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Inline JSON when the argument looks like an object, otherwise a file path
fn read_json_arg(arg: &str) -> CliResult<Value> {
    let text = if arg.trim_start().starts_with('{') {
        arg.to_string()
    } else {
        fs::read_to_string(arg)?
    };
    Ok(serde_json::from_str(&text)?)
}

/// Generate a key pair, optionally from a seed, and save it
pub fn cmd_keygen(seed: Option<&str>, output: Option<&Path>) -> CliResult<()> {
    let seed = seed.map(hex::decode).transpose()?;
    let pair = KeyPair::generate(seed.as_deref())?;
    let key_file = KeyFile::from_key_pair(&pair);

    println!("🔐 New key pair generated!");
    println!("   📍 Address: {}", key_file.address);
    println!("   🔑 Public Key: {}", key_file.public_key);

    match output {
        Some(path) => {
            key_file.save(path)?;
            println!("   💾 Saved to {}", path.display());
        }
        None => {
            println!("   🗝️  Private Key: {}", key_file.private_key);
            println!("\n   ⚠️  IMPORTANT: Store this private key somewhere safe.");
        }
    }

    Ok(())
}

/// Validate and classify an address
pub fn cmd_address_check(address: &str) -> CliResult<()> {
    match Address::parse(address) {
        Ok(address) => {
            println!("✅ Valid address: {}", address);
            println!("   Type: {:?}", address.address_type());
            println!("   Raw: {}", hex::encode_upper(address.raw_bytes()?));
            Ok(())
        }
        Err(e) => {
            println!("❌ Invalid address: {}", address);
            println!("   Reason: {} ({})", e, e.category());
            Err(e.into())
        }
    }
}

/// Derive the standard address of a public key
pub fn cmd_address_derive(public_key: &str) -> CliResult<()> {
    let key = PublicKey::from_hex(public_key)?;
    println!("📍 Address: {}", key.address());
    Ok(())
}

/// Derive from a public key when one is given, otherwise check the address
pub fn cmd_address(address: Option<&str>, public_key: Option<&str>) -> CliResult<()> {
    match (address, public_key) {
        (_, Some(key)) => cmd_address_derive(key),
        (Some(address), None) => cmd_address_check(address),
        (None, None) => Err("an address or --public-key is required".into()),
    }
}

/// Build an m-of-n multisig address
pub fn cmd_multisig(m: usize, addresses: &[String]) -> CliResult<()> {
    let signers = addresses
        .iter()
        .map(|a| Address::parse(a))
        .collect::<Result<Vec<_>, _>>()?;
    let address = multisig_address_from_addresses(&signers, m)?;

    println!("👥 Multisig address ({}-of-{}): {}", m, signers.len(), address);
    Ok(())
}

/// Decode a hex buffer as one entity and print it as JSON
pub fn cmd_decode(kind: EntityKind, hex_str: &str, raw: bool, subject: Option<&str>) -> CliResult<()> {
    let options = DecodeOptions {
        raw,
        subject: subject.map(Sha256Hash::from_hex).transpose()?,
    };
    let entity = Entity::from_hex(kind, hex_str, options)?;
    log::info!("Decoded {:?}", kind);

    println!("{}", serde_json::to_string_pretty(&entity)?);
    if let Some(id) = entity.id()? {
        println!("\n   🆔 Id: {}", id);
    }
    match &entity {
        Entity::BtcBlock(block) => print_time(block.time()),
        Entity::VbkBlock(block) => print_time(block.time()),
        _ => {}
    }

    Ok(())
}

fn print_time(time: Option<chrono::DateTime<chrono::Utc>>) {
    if let Some(time) = time {
        println!("   🕐 Time: {}", time.to_rfc3339());
    }
}

/// Interpret a Bitcoin script sig and print its publications
pub fn cmd_publications(hex_str: &str) -> CliResult<()> {
    let publications = parse_btc_script_sig(hex_str)?;

    println!("📦 Publications");
    println!("   ├─ ATV: {}", publications.atv.transaction.id()?);
    println!("   ├─ VTBs: {}", publications.vtbs.len());
    println!("   ├─ BTC context headers: {}", publications.context.btc.len());
    println!("   └─ VBK context headers: {}", publications.context.vbk.len());
    println!("{}", serde_json::to_string_pretty(&publications)?);

    Ok(())
}

/// Sign a JSON transaction with a key file
pub fn cmd_sign(key: &Path, tx: &str, index: i64, network: Option<Network>) -> CliResult<()> {
    let pair = KeyFile::load(key)?;
    let transaction = parse_transaction(&read_json_arg(tx)?)?;
    let network_byte = network.and_then(|n| n.network_byte());

    let signed = sign_transaction(transaction, &pair, index, network_byte)?;
    log::info!(
        "Signed {} with signature index {}",
        signed.transaction.source_address,
        index
    );

    println!("{}", serde_json::to_string_pretty(&signed_transaction_to_json(&signed))?);
    Ok(())
}

/// Verify a JSON signed transaction
pub fn cmd_verify(tx: &str) -> CliResult<()> {
    let signed = parse_signed_transaction(&read_json_arg(tx)?)?;

    if signed.verify()? {
        println!("✅ Signature valid");
        if let Some(id) = signed.transaction.tx_id {
            println!("   🆔 Transaction: {}", id);
        }
        Ok(())
    } else {
        println!("❌ Signature invalid");
        Err("signed transaction failed verification".into())
    }
}
