use alloy_primitives::Address;
use anyhow::{bail, Context, Result};

use chainverify::{VerificationResult, Verifier};
use chainverify_evm::EvmTxBuilder;

pub async fn run(verifier: &Verifier, input: &str, compact: bool) -> Result<()> {
    let result = verifier.verify(input).await;
    print_result(result, compact)
}

/// Wrap `(chain_id, to, data)` in an unsigned EIP-1559 transaction and verify it.
pub async fn run_evm_data(verifier: &Verifier, chain_id: u64, to: &str, data: &str) -> Result<()> {
    let to: Address = to.parse().with_context(|| format!("invalid contract address '{to}'"))?;
    let data = hex::decode(data.strip_prefix("0x").unwrap_or(data)).context("invalid calldata hex")?;

    let tx = EvmTxBuilder::eip1559(chain_id).to(to).input(data).build();
    let raw = format!("0x{}", hex::encode(tx.encode_unsigned()));
    println!("Transaction: {raw}");

    let result = verifier.verify(&raw).await;
    print_result(result, false)
}

fn print_result(result: Option<VerificationResult>, compact: bool) -> Result<()> {
    let Some(result) = result else {
        bail!("could not verify transaction; do not trust any inferred meaning of it");
    };
    let out = if compact { serde_json::to_string(&result)? } else { serde_json::to_string_pretty(&result)? };
    println!("{out}");
    Ok(())
}
