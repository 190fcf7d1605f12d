//! Ledger-Chain Verifier: reconciles inputs, outputs and fees of every
//! supported ledger transaction kind and collects anomaly warnings.
//!
//! Every step returns its own [`Warnings`]; the caller merges them into the
//! result. Any `Err` collapses the whole verification to `None`.

use alloy_primitives::Address;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use chainverify_core::recipients::gwei_to_wei_signed;
use chainverify_core::{
    gwei_to_wei, CanonicalTx, NetworkTable, Parameter, RecipientLedger, StateError, TxType,
    VerificationResult, VerifyError, Warning, Warnings,
};

use crate::encoding::{format_address, node_id_string, Id, EMPTY_ID};
use crate::error::CodecError;
use crate::state::{ChainContext, LedgerChainState};
use crate::tx::{
    decode_ledger_tx, EvmAtomicTx, EvmExportTx, EvmImportTx, LedgerTx, OutputOwners,
    PlatformExportTx, PlatformImportTx, PlatformTx, TransferableInput, TransferableOutput,
    Validator,
};

/// Shares of a permissionless validator are reported scaled by this factor.
const DELEGATION_FEE_SCALE: u64 = 10_000;

/// Per-kind result before the common fields are attached.
struct Reconciled {
    tx_type: TxType,
    ledger: RecipientLedger,
    fee: i128,
    parameters: Option<Vec<Parameter>>,
    warnings: Warnings,
}

/// Aggregated outputs with the anomalies they exhibit.
struct OutputSummary {
    ledger: RecipientLedger,
    warnings: Warnings,
}

pub struct AvaxVerifier {
    state: Arc<dyn LedgerChainState>,
    networks: NetworkTable,
}

impl AvaxVerifier {
    pub fn new(state: Arc<dyn LedgerChainState>, networks: NetworkTable) -> Self {
        Self { state, networks }
    }

    /// Verify `tx` as a ledger-model transaction; `None` when it is not one
    /// or when verification fails.
    pub async fn verify(&self, tx: &CanonicalTx) -> Option<VerificationResult> {
        let decoded = match decode_ledger_tx(tx.as_bytes()) {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(error = %e, "not a ledger-model transaction");
                return None;
            }
        };

        match self.verify_decoded(&decoded.tx).await {
            Ok(result) => {
                tracing::info!(
                    network = %result.network,
                    tx_type = %result.tx_type,
                    warnings = result.warnings.len(),
                    credentials = decoded.credentials,
                    "ledger transaction verified"
                );
                Some(result)
            }
            Err(e) => {
                tracing::debug!(error = %e, "ledger transaction verification failed");
                None
            }
        }
    }

    pub async fn verify_decoded(&self, tx: &LedgerTx) -> Result<VerificationResult, VerifyError> {
        let (network_id, blockchain_id) = match tx {
            LedgerTx::CChain(c) => (c.network_id(), *c.blockchain_id()),
            LedgerTx::PChain(p) => (p.base().network_id, p.base().blockchain_id),
        };
        if network_id == 0 {
            return Err(VerifyError::MissingNetworkId);
        }

        let ctx = self.state.get_context(network_id).await?;
        if ctx.network_id != network_id {
            return Err(VerifyError::NetworkMismatch { context: ctx.network_id, declared: network_id });
        }

        let mut warnings = Warnings::new();
        if !self.networks.is_known_ledger(network_id) {
            warnings.add(Warning::UnknownNetwork);
        }

        let expected_chain = match tx {
            LedgerTx::CChain(_) => &ctx.c_chain_id,
            LedgerTx::PChain(_) => &ctx.p_chain_id,
        };
        warnings.merge(check_blockchain(expected_chain, &blockchain_id));

        let reconciled = match tx {
            LedgerTx::CChain(EvmAtomicTx::Export(t)) => self.export_c(&ctx, t)?,
            LedgerTx::CChain(EvmAtomicTx::Import(t)) => self.import_c(&ctx, t)?,
            LedgerTx::PChain(PlatformTx::Export(t)) => self.export_p(&ctx, t).await?,
            LedgerTx::PChain(PlatformTx::Import(t)) => self.import_p(&ctx, t).await?,
            LedgerTx::PChain(stake) => self.stake(&ctx, stake).await?,
        };

        let message = tx.pack().map_err(|e| VerifyError::MessageHash { reason: e.to_string() })?;
        let message_to_sign = format!("0x{}", hex::encode(Sha256::digest(&message)));

        let mut result = VerificationResult::new(
            self.networks.ledger_description(network_id),
            reconciled.tx_type,
            message_to_sign,
        );
        result.recipients = reconciled.ledger.recipients();
        result.values = reconciled.ledger.values(gwei_to_wei);
        result.fee = Some(gwei_to_wei_signed(reconciled.fee).to_string());
        result.parameters = reconciled.parameters;
        result.warnings = warnings.with(reconciled.warnings);
        Ok(result)
    }

    // ─── C-chain ────────────────────────────────────────────────────────────

    fn export_c(&self, ctx: &ChainContext, tx: &EvmExportTx) -> Result<Reconciled, VerifyError> {
        let mut warnings = check_blockchain(&ctx.p_chain_id, &tx.destination_chain);

        let mut sent: u128 = 0;
        for input in &tx.ins {
            sent += input.amount as u128;
            warnings.merge(check_asset(ctx, &input.asset_id));
        }

        let exported = summarize_outputs(ctx, &tx.exported_outputs)?;
        let fee = sent as i128 - exported.ledger.total() as i128;
        Ok(Reconciled {
            tx_type: TxType::ExportC,
            fee,
            ledger: exported.ledger,
            parameters: None,
            warnings: warnings.with(exported.warnings),
        })
    }

    fn import_c(&self, ctx: &ChainContext, tx: &EvmImportTx) -> Result<Reconciled, VerifyError> {
        let mut warnings = check_blockchain(&ctx.p_chain_id, &tx.source_chain);

        let mut imported: u128 = 0;
        for input in &tx.imported_inputs {
            imported += input.input.amount() as u128;
            warnings.merge(check_asset(ctx, &input.asset_id));
        }

        let mut ledger = RecipientLedger::new();
        for out in &tx.outs {
            ledger.credit(Address::from(out.address).to_checksum(None), out.amount as u128);
            warnings.merge(check_asset(ctx, &out.asset_id));
        }
        warnings.add_if(ledger.len() > 1, Warning::MultipleRecipients);

        let fee = imported as i128 - ledger.total() as i128;
        Ok(Reconciled { tx_type: TxType::ImportC, ledger, fee, parameters: None, warnings })
    }

    // ─── P-chain ────────────────────────────────────────────────────────────

    async fn export_p(&self, ctx: &ChainContext, tx: &PlatformExportTx) -> Result<Reconciled, VerifyError> {
        let mut warnings = check_blockchain(&ctx.c_chain_id, &tx.destination_chain);

        let change = summarize_outputs(ctx, &tx.base.outputs)?;
        let exported = summarize_outputs(ctx, &tx.exported_outputs)?;
        warnings.merge(compare_recipients(&exported.ledger, &change.ledger));

        let (sent, input_warnings) =
            self.sum_inputs(ctx, &tx.base.inputs, exported.ledger.sole_recipient(), None).await?;

        let fee = sent as i128 - change.ledger.total() as i128 - exported.ledger.total() as i128;
        Ok(Reconciled {
            tx_type: TxType::ExportP,
            fee,
            ledger: exported.ledger,
            parameters: None,
            warnings: warnings.with(change.warnings).with(exported.warnings).with(input_warnings),
        })
    }

    async fn import_p(&self, ctx: &ChainContext, tx: &PlatformImportTx) -> Result<Reconciled, VerifyError> {
        let mut warnings = check_blockchain(&ctx.c_chain_id, &tx.source_chain);

        let received = summarize_outputs(ctx, &tx.base.outputs)?;
        let owner = received.ledger.sole_recipient();

        let (sent, base_warnings) = self.sum_inputs(ctx, &tx.base.inputs, owner, None).await?;
        let (imported, import_warnings) =
            self.sum_inputs(ctx, &tx.imported_inputs, owner, Some(&ctx.c_chain_id)).await?;
        warnings.merge(base_warnings);
        warnings.merge(import_warnings);

        let fee = imported as i128 + sent as i128 - received.ledger.total() as i128;
        Ok(Reconciled {
            tx_type: TxType::ImportP,
            fee,
            ledger: received.ledger,
            parameters: None,
            warnings: warnings.with(received.warnings),
        })
    }

    async fn stake(&self, ctx: &ChainContext, tx: &PlatformTx) -> Result<Reconciled, VerifyError> {
        let (tx_type, validator, stake, subnet, delegation_fee, legacy) = match tx {
            PlatformTx::AddValidator(t) => (TxType::AddValidatorP, &t.validator, &t.stake, None, Some(t.shares as u64), true),
            PlatformTx::AddDelegator(t) => (TxType::AddDelegatorP, &t.validator, &t.stake, None, None, true),
            PlatformTx::AddPermissionlessValidator(t) => (
                TxType::AddValidatorP,
                &t.subnet_validator.validator,
                &t.stake,
                Some(&t.subnet_validator.subnet_id),
                Some(t.shares as u64 * DELEGATION_FEE_SCALE),
                false,
            ),
            PlatformTx::AddPermissionlessDelegator(t) => (
                TxType::AddDelegatorP,
                &t.subnet_validator.validator,
                &t.stake,
                Some(&t.subnet_validator.subnet_id),
                None,
                false,
            ),
            PlatformTx::Import(_) | PlatformTx::Export(_) => {
                return Err(VerifyError::Other("not a staking transaction".into()))
            }
        };

        let mut warnings = Warnings::new();
        warnings.add_if(legacy, Warning::DeprecatedTx);

        let base = tx.base();
        let change = summarize_outputs(ctx, &base.outputs)?;
        let (sent, input_warnings) =
            self.sum_inputs(ctx, &base.inputs, change.ledger.sole_recipient(), None).await?;

        let staked = summarize_outputs(ctx, stake)?;
        let fee = sent as i128 - change.ledger.total() as i128 - staked.ledger.total() as i128;
        warnings.merge(compare_recipients(&staked.ledger, &change.ledger));

        if tx_type == TxType::AddDelegatorP {
            warnings.merge(self.check_node_id(ctx, validator).await);
        }
        if let Some(subnet) = subnet {
            warnings.add_if(subnet != &EMPTY_ID, Warning::UnknownSubnet);
        }

        Ok(Reconciled {
            tx_type,
            fee,
            ledger: staked.ledger,
            parameters: Some(stake_parameters(validator, delegation_fee)),
            warnings: warnings.with(change.warnings).with(input_warnings).with(staked.warnings),
        })
    }

    // ─── helpers ────────────────────────────────────────────────────────────

    /// Sum input amounts; with an `owner`, every input must be among the
    /// owner's unspent outputs or `FUNDS_NOT_RETURNED` is raised.
    async fn sum_inputs(
        &self,
        ctx: &ChainContext,
        inputs: &[TransferableInput],
        owner: Option<&str>,
        source_chain: Option<&Id>,
    ) -> Result<(u128, Warnings), StateError> {
        let utxos = match owner {
            Some(address) => Some(
                self.state
                    .get_unspent_outputs(ctx.network_id, address, source_chain)
                    .await?,
            ),
            None => None,
        };

        let mut warnings = Warnings::new();
        let mut total: u128 = 0;
        for input in inputs {
            total += input.input.amount() as u128;
            warnings.merge(check_asset(ctx, &input.asset_id));
            if let Some(set) = &utxos {
                warnings.add_if(!set.contains(&input.utxo), Warning::FundsNotReturned);
            }
        }
        Ok((total, warnings))
    }

    async fn check_node_id(&self, ctx: &ChainContext, validator: &Validator) -> Warnings {
        let node_id = node_id_string(&validator.node_id);
        for pending in [false, true] {
            let set = if pending {
                self.state.get_pending_validators(ctx.network_id).await
            } else {
                self.state.get_current_validators(ctx.network_id).await
            };
            match set {
                Ok(set) if set.contains(&node_id) => return Warnings::new(),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, node_id = %node_id, "validator set query failed");
                    return Warnings::single(Warning::UnknownNodeid);
                }
            }
        }
        Warnings::single(Warning::UnknownNodeid)
    }
}

fn check_blockchain(expected: &Id, actual: &Id) -> Warnings {
    Warnings::from((expected != actual).then_some(Warning::InvalidBlockchain))
}

fn check_asset(ctx: &ChainContext, asset_id: &Id) -> Warnings {
    Warnings::from((asset_id != &ctx.native_asset_id).then_some(Warning::InvalidAsset))
}

fn owner_addresses(ctx: &ChainContext, owners: &OutputOwners) -> Result<Vec<String>, CodecError> {
    owners.addrs.iter().map(|a| format_address(&ctx.hrp, a)).collect()
}

/// Aggregate outputs by canonical owner key.
fn summarize_outputs(ctx: &ChainContext, outputs: &[TransferableOutput]) -> Result<OutputSummary, VerifyError> {
    let mut ledger = RecipientLedger::new();
    let mut warnings = Warnings::new();
    for out in outputs {
        let owners = out.output.owners();
        let addresses = owner_addresses(ctx, owners).map_err(|e| VerifyError::Other(e.to_string()))?;
        warnings.add_if(addresses.len() > 1, Warning::MultipleSigners);
        warnings.add_if(out.output.locktime() != 0, Warning::FundsLocked);
        warnings.merge(check_asset(ctx, &out.asset_id));
        ledger.credit_owner_set(&addresses, out.output.amount() as u128);
    }
    warnings.add_if(ledger.len() > 1, Warning::MultipleRecipients);
    Ok(OutputSummary { ledger, warnings })
}

/// Warn when a single intended recipient differs from where the change goes.
fn compare_recipients(intended: &RecipientLedger, change: &RecipientLedger) -> Warnings {
    if intended.len() != 1 || change.is_empty() {
        return Warnings::new();
    }
    let diverted = change.len() > 1 || change.first() != intended.first();
    Warnings::from(diverted.then_some(Warning::UnspentAmountNotToRecipient))
}

fn stake_parameters(validator: &Validator, delegation_fee: Option<u64>) -> Vec<Parameter> {
    let mut params = vec![
        Parameter::new("nodeId", node_id_string(&validator.node_id)),
        Parameter::new("startTime", validator.start_time),
        Parameter::new("endTime", validator.end_time),
    ];
    if let Some(fee) = delegation_fee {
        params.push(Parameter::new("delegationFee", fee));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(entries: &[&str]) -> RecipientLedger {
        let mut l = RecipientLedger::new();
        for e in entries {
            l.credit(*e, 1);
        }
        l
    }

    #[test]
    fn compare_recipients_rules() {
        assert!(compare_recipients(&ledger(&["a"]), &ledger(&[])).is_empty());
        assert!(compare_recipients(&ledger(&["a"]), &ledger(&["a"])).is_empty());
        assert!(compare_recipients(&ledger(&["a", "b"]), &ledger(&["c"])).is_empty());
        assert!(compare_recipients(&ledger(&["a"]), &ledger(&["b"])).contains(Warning::UnspentAmountNotToRecipient));
        assert!(compare_recipients(&ledger(&["a"]), &ledger(&["a", "b"])).contains(Warning::UnspentAmountNotToRecipient));
    }

    #[test]
    fn permissionless_delegation_fee_is_scaled() {
        let v = Validator { node_id: [1u8; 20], start_time: 10, end_time: 20, weight: 1 };
        let params = stake_parameters(&v, Some(20 * DELEGATION_FEE_SCALE));
        assert_eq!(params[1], Parameter::new("startTime", "10"));
        assert_eq!(params[3], Parameter::new("delegationFee", "200000"));
    }
}
