//! Ledger-model transactions as closed variant types.
//!
//! Two sub-families share the codec: atomic C-chain transactions (type ids
//! 0 and 1) and P-chain transactions (12, 14, 17, 18, 25, 26). Decoding is
//! all-or-nothing: the unsigned transaction, plus an optional credentials
//! block, must consume the input exactly.

use crate::codec::{Packer, Reader};
use crate::encoding::{Id, ShortId};
use crate::error::CodecError;

pub mod type_id {
    pub const EVM_IMPORT_TX: u32 = 0;
    pub const EVM_EXPORT_TX: u32 = 1;
    pub const TRANSFER_INPUT: u32 = 5;
    pub const TRANSFER_OUTPUT: u32 = 7;
    pub const CREDENTIAL: u32 = 9;
    pub const OUTPUT_OWNERS: u32 = 11;
    pub const ADD_VALIDATOR_TX: u32 = 12;
    pub const ADD_DELEGATOR_TX: u32 = 14;
    pub const IMPORT_TX: u32 = 17;
    pub const EXPORT_TX: u32 = 18;
    pub const STAKEABLE_LOCK_IN: u32 = 21;
    pub const STAKEABLE_LOCK_OUT: u32 = 22;
    pub const ADD_PERMISSIONLESS_VALIDATOR_TX: u32 = 25;
    pub const ADD_PERMISSIONLESS_DELEGATOR_TX: u32 = 26;
    pub const EMPTY_SIGNER: u32 = 27;
    pub const PROOF_OF_POSSESSION: u32 = 28;
}

use type_id::*;

const SIGNATURE_LEN: usize = 65;

// ─── Outputs and inputs ──────────────────────────────────────────────────────

/// Spending condition: `threshold` of `addrs` after `locktime`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputOwners {
    pub locktime: u64,
    pub threshold: u32,
    pub addrs: Vec<ShortId>,
}

impl OutputOwners {
    pub fn single(addr: ShortId) -> Self {
        Self { locktime: 0, threshold: 1, addrs: vec![addr] }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            locktime: r.u64()?,
            threshold: r.u32()?,
            addrs: r.array("addresses", |r| r.fixed())?,
        })
    }

    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.locktime).u32(self.threshold);
        p.array("addresses", &self.addrs, |p, a| {
            p.fixed(a);
            Ok(())
        })?;
        Ok(())
    }

    /// `OutputOwners` preceded by its type id, as used for reward owners.
    fn read_typed(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        match r.u32()? {
            OUTPUT_OWNERS => Self::read(r),
            other => Err(CodecError::UnknownTypeId { context: "owner", type_id: other }),
        }
    }

    fn pack_typed(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u32(OUTPUT_OWNERS);
        self.pack(p)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutput {
    pub amount: u64,
    pub owners: OutputOwners,
}

impl TransferOutput {
    fn read(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self { amount: r.u64()?, owners: OutputOwners::read(r)? })
    }

    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.amount);
        self.owners.pack(p)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Transfer(TransferOutput),
    /// Stakeable until `locktime`, then spendable as `output`.
    Locked { locktime: u64, output: TransferOutput },
}

impl Output {
    pub fn amount(&self) -> u64 {
        self.transfer().amount
    }

    pub fn owners(&self) -> &OutputOwners {
        &self.transfer().owners
    }

    /// Non-zero when either the stake lock or the owners' lock is set.
    pub fn locktime(&self) -> u64 {
        match self {
            Self::Transfer(o) => o.owners.locktime,
            Self::Locked { locktime, output } => (*locktime).max(output.owners.locktime),
        }
    }

    fn transfer(&self) -> &TransferOutput {
        match self {
            Self::Transfer(o) | Self::Locked { output: o, .. } => o,
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        match r.u32()? {
            TRANSFER_OUTPUT => Ok(Self::Transfer(TransferOutput::read(r)?)),
            STAKEABLE_LOCK_OUT => {
                let locktime = r.u64()?;
                match r.u32()? {
                    TRANSFER_OUTPUT => Ok(Self::Locked { locktime, output: TransferOutput::read(r)? }),
                    other => Err(CodecError::UnknownTypeId { context: "locked output", type_id: other }),
                }
            }
            other => Err(CodecError::UnknownTypeId { context: "output", type_id: other }),
        }
    }

    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        match self {
            Self::Transfer(o) => {
                p.u32(TRANSFER_OUTPUT);
                o.pack(p)
            }
            Self::Locked { locktime, output } => {
                p.u32(STAKEABLE_LOCK_OUT).u64(*locktime).u32(TRANSFER_OUTPUT);
                output.pack(p)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableOutput {
    pub asset_id: Id,
    pub output: Output,
}

impl TransferableOutput {
    fn read(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self { asset_id: r.fixed()?, output: Output::read(r)? })
    }

    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.fixed(&self.asset_id);
        self.output.pack(p)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInput {
    pub amount: u64,
    pub sig_indices: Vec<u32>,
}

impl TransferInput {
    fn read(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self { amount: r.u64()?, sig_indices: r.array("signature indices", |r| r.u32())? })
    }

    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.amount);
        p.array("signature indices", &self.sig_indices, |p, i| {
            p.u32(*i);
            Ok(())
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Transfer(TransferInput),
    Locked { locktime: u64, input: TransferInput },
}

impl Input {
    pub fn amount(&self) -> u64 {
        match self {
            Self::Transfer(i) | Self::Locked { input: i, .. } => i.amount,
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        match r.u32()? {
            TRANSFER_INPUT => Ok(Self::Transfer(TransferInput::read(r)?)),
            STAKEABLE_LOCK_IN => {
                let locktime = r.u64()?;
                match r.u32()? {
                    TRANSFER_INPUT => Ok(Self::Locked { locktime, input: TransferInput::read(r)? }),
                    other => Err(CodecError::UnknownTypeId { context: "locked input", type_id: other }),
                }
            }
            other => Err(CodecError::UnknownTypeId { context: "input", type_id: other }),
        }
    }

    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        match self {
            Self::Transfer(i) => {
                p.u32(TRANSFER_INPUT);
                i.pack(p)
            }
            Self::Locked { locktime, input } => {
                p.u32(STAKEABLE_LOCK_IN).u64(*locktime).u32(TRANSFER_INPUT);
                input.pack(p)
            }
        }
    }
}

/// Reference to a previously created output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtxoId {
    pub tx_id: Id,
    pub output_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableInput {
    pub utxo: UtxoId,
    pub asset_id: Id,
    pub input: Input,
}

impl TransferableInput {
    fn read(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            utxo: UtxoId { tx_id: r.fixed()?, output_index: r.u32()? },
            asset_id: r.fixed()?,
            input: Input::read(r)?,
        })
    }

    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.fixed(&self.utxo.tx_id).u32(self.utxo.output_index).fixed(&self.asset_id);
        self.input.pack(p)
    }
}

fn read_outputs(r: &mut Reader<'_>) -> Result<Vec<TransferableOutput>, CodecError> {
    r.array("outputs", TransferableOutput::read)
}

fn pack_outputs(p: &mut Packer, outs: &[TransferableOutput]) -> Result<(), CodecError> {
    p.array("outputs", outs, |p, o| o.pack(p))?;
    Ok(())
}

fn read_inputs(r: &mut Reader<'_>) -> Result<Vec<TransferableInput>, CodecError> {
    r.array("inputs", TransferableInput::read)
}

fn pack_inputs(p: &mut Packer, ins: &[TransferableInput]) -> Result<(), CodecError> {
    p.array("inputs", ins, |p, i| i.pack(p))?;
    Ok(())
}

// ─── Atomic C-chain transactions ─────────────────────────────────────────────

/// Account credited by an atomic import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmOutput {
    pub address: ShortId,
    pub amount: u64,
    pub asset_id: Id,
}

/// Account debited by an atomic export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmInput {
    pub address: ShortId,
    pub amount: u64,
    pub asset_id: Id,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmImportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub source_chain: Id,
    pub imported_inputs: Vec<TransferableInput>,
    pub outs: Vec<EvmOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmExportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub destination_chain: Id,
    pub ins: Vec<EvmInput>,
    pub exported_outputs: Vec<TransferableOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvmAtomicTx {
    Import(EvmImportTx),
    Export(EvmExportTx),
}

impl EvmAtomicTx {
    pub fn network_id(&self) -> u32 {
        match self {
            Self::Import(tx) => tx.network_id,
            Self::Export(tx) => tx.network_id,
        }
    }

    pub fn blockchain_id(&self) -> &Id {
        match self {
            Self::Import(tx) => &tx.blockchain_id,
            Self::Export(tx) => &tx.blockchain_id,
        }
    }

    fn read(type_id: u32, r: &mut Reader<'_>) -> Result<Self, CodecError> {
        match type_id {
            EVM_IMPORT_TX => Ok(Self::Import(EvmImportTx {
                network_id: r.u32()?,
                blockchain_id: r.fixed()?,
                source_chain: r.fixed()?,
                imported_inputs: read_inputs(r)?,
                outs: r.array("evm outputs", |r| {
                    Ok(EvmOutput { address: r.fixed()?, amount: r.u64()?, asset_id: r.fixed()? })
                })?,
            })),
            EVM_EXPORT_TX => Ok(Self::Export(EvmExportTx {
                network_id: r.u32()?,
                blockchain_id: r.fixed()?,
                destination_chain: r.fixed()?,
                ins: r.array("evm inputs", |r| {
                    Ok(EvmInput {
                        address: r.fixed()?,
                        amount: r.u64()?,
                        asset_id: r.fixed()?,
                        nonce: r.u64()?,
                    })
                })?,
                exported_outputs: read_outputs(r)?,
            })),
            other => Err(CodecError::UnknownTypeId { context: "C-chain transaction", type_id: other }),
        }
    }

    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        match self {
            Self::Import(tx) => {
                p.u32(EVM_IMPORT_TX)
                    .u32(tx.network_id)
                    .fixed(&tx.blockchain_id)
                    .fixed(&tx.source_chain);
                pack_inputs(p, &tx.imported_inputs)?;
                p.array("evm outputs", &tx.outs, |p, o| {
                    p.fixed(&o.address).u64(o.amount).fixed(&o.asset_id);
                    Ok(())
                })?;
            }
            Self::Export(tx) => {
                p.u32(EVM_EXPORT_TX)
                    .u32(tx.network_id)
                    .fixed(&tx.blockchain_id)
                    .fixed(&tx.destination_chain);
                p.array("evm inputs", &tx.ins, |p, i| {
                    p.fixed(&i.address).u64(i.amount).fixed(&i.asset_id).u64(i.nonce);
                    Ok(())
                })?;
                pack_outputs(p, &tx.exported_outputs)?;
            }
        }
        Ok(())
    }
}

// ─── P-chain transactions ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub outputs: Vec<TransferableOutput>,
    pub inputs: Vec<TransferableInput>,
    pub memo: Vec<u8>,
}

impl BaseTx {
    fn read(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            network_id: r.u32()?,
            blockchain_id: r.fixed()?,
            outputs: read_outputs(r)?,
            inputs: read_inputs(r)?,
            memo: r.bytes("memo")?,
        })
    }

    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u32(self.network_id).fixed(&self.blockchain_id);
        pack_outputs(p, &self.outputs)?;
        pack_inputs(p, &self.inputs)?;
        p.bytes("memo", &self.memo)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    pub node_id: ShortId,
    pub start_time: u64,
    pub end_time: u64,
    pub weight: u64,
}

impl Validator {
    fn read(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self { node_id: r.fixed()?, start_time: r.u64()?, end_time: r.u64()?, weight: r.u64()? })
    }

    fn pack(&self, p: &mut Packer) {
        p.fixed(&self.node_id).u64(self.start_time).u64(self.end_time).u64(self.weight);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetValidator {
    pub validator: Validator,
    pub subnet_id: Id,
}

impl SubnetValidator {
    fn read(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self { validator: Validator::read(r)?, subnet_id: r.fixed()? })
    }

    fn pack(&self, p: &mut Packer) {
        self.validator.pack(p);
        p.fixed(&self.subnet_id);
    }
}

/// BLS key registration of a permissionless validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signer {
    Empty,
    ProofOfPossession { public_key: [u8; 48], signature: [u8; 96] },
}

impl Signer {
    fn read(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        match r.u32()? {
            EMPTY_SIGNER => Ok(Self::Empty),
            PROOF_OF_POSSESSION => Ok(Self::ProofOfPossession { public_key: r.fixed()?, signature: r.fixed()? }),
            other => Err(CodecError::UnknownTypeId { context: "signer", type_id: other }),
        }
    }

    fn pack(&self, p: &mut Packer) {
        match self {
            Self::Empty => {
                p.u32(EMPTY_SIGNER);
            }
            Self::ProofOfPossession { public_key, signature } => {
                p.u32(PROOF_OF_POSSESSION).fixed(public_key).fixed(signature);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub stake: Vec<TransferableOutput>,
    pub rewards_owner: OutputOwners,
    pub shares: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDelegatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub stake: Vec<TransferableOutput>,
    pub rewards_owner: OutputOwners,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPermissionlessValidatorTx {
    pub base: BaseTx,
    pub subnet_validator: SubnetValidator,
    pub signer: Signer,
    pub stake: Vec<TransferableOutput>,
    pub validator_rewards_owner: OutputOwners,
    pub delegator_rewards_owner: OutputOwners,
    pub shares: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPermissionlessDelegatorTx {
    pub base: BaseTx,
    pub subnet_validator: SubnetValidator,
    pub stake: Vec<TransferableOutput>,
    pub rewards_owner: OutputOwners,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformImportTx {
    pub base: BaseTx,
    pub source_chain: Id,
    pub imported_inputs: Vec<TransferableInput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformExportTx {
    pub base: BaseTx,
    pub destination_chain: Id,
    pub exported_outputs: Vec<TransferableOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformTx {
    AddValidator(AddValidatorTx),
    AddDelegator(AddDelegatorTx),
    AddPermissionlessValidator(AddPermissionlessValidatorTx),
    AddPermissionlessDelegator(AddPermissionlessDelegatorTx),
    Import(PlatformImportTx),
    Export(PlatformExportTx),
}

impl PlatformTx {
    pub fn base(&self) -> &BaseTx {
        match self {
            Self::AddValidator(tx) => &tx.base,
            Self::AddDelegator(tx) => &tx.base,
            Self::AddPermissionlessValidator(tx) => &tx.base,
            Self::AddPermissionlessDelegator(tx) => &tx.base,
            Self::Import(tx) => &tx.base,
            Self::Export(tx) => &tx.base,
        }
    }

    fn read(type_id: u32, r: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(match type_id {
            ADD_VALIDATOR_TX => Self::AddValidator(AddValidatorTx {
                base: BaseTx::read(r)?,
                validator: Validator::read(r)?,
                stake: read_outputs(r)?,
                rewards_owner: OutputOwners::read_typed(r)?,
                shares: r.u32()?,
            }),
            ADD_DELEGATOR_TX => Self::AddDelegator(AddDelegatorTx {
                base: BaseTx::read(r)?,
                validator: Validator::read(r)?,
                stake: read_outputs(r)?,
                rewards_owner: OutputOwners::read_typed(r)?,
            }),
            ADD_PERMISSIONLESS_VALIDATOR_TX => Self::AddPermissionlessValidator(AddPermissionlessValidatorTx {
                base: BaseTx::read(r)?,
                subnet_validator: SubnetValidator::read(r)?,
                signer: Signer::read(r)?,
                stake: read_outputs(r)?,
                validator_rewards_owner: OutputOwners::read_typed(r)?,
                delegator_rewards_owner: OutputOwners::read_typed(r)?,
                shares: r.u32()?,
            }),
            ADD_PERMISSIONLESS_DELEGATOR_TX => Self::AddPermissionlessDelegator(AddPermissionlessDelegatorTx {
                base: BaseTx::read(r)?,
                subnet_validator: SubnetValidator::read(r)?,
                stake: read_outputs(r)?,
                rewards_owner: OutputOwners::read_typed(r)?,
            }),
            IMPORT_TX => Self::Import(PlatformImportTx {
                base: BaseTx::read(r)?,
                source_chain: r.fixed()?,
                imported_inputs: read_inputs(r)?,
            }),
            EXPORT_TX => Self::Export(PlatformExportTx {
                base: BaseTx::read(r)?,
                destination_chain: r.fixed()?,
                exported_outputs: read_outputs(r)?,
            }),
            other => return Err(CodecError::UnknownTypeId { context: "P-chain transaction", type_id: other }),
        })
    }

    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        match self {
            Self::AddValidator(tx) => {
                p.u32(ADD_VALIDATOR_TX);
                tx.base.pack(p)?;
                tx.validator.pack(p);
                pack_outputs(p, &tx.stake)?;
                tx.rewards_owner.pack_typed(p)?;
                p.u32(tx.shares);
            }
            Self::AddDelegator(tx) => {
                p.u32(ADD_DELEGATOR_TX);
                tx.base.pack(p)?;
                tx.validator.pack(p);
                pack_outputs(p, &tx.stake)?;
                tx.rewards_owner.pack_typed(p)?;
            }
            Self::AddPermissionlessValidator(tx) => {
                p.u32(ADD_PERMISSIONLESS_VALIDATOR_TX);
                tx.base.pack(p)?;
                tx.subnet_validator.pack(p);
                tx.signer.pack(p);
                pack_outputs(p, &tx.stake)?;
                tx.validator_rewards_owner.pack_typed(p)?;
                tx.delegator_rewards_owner.pack_typed(p)?;
                p.u32(tx.shares);
            }
            Self::AddPermissionlessDelegator(tx) => {
                p.u32(ADD_PERMISSIONLESS_DELEGATOR_TX);
                tx.base.pack(p)?;
                tx.subnet_validator.pack(p);
                pack_outputs(p, &tx.stake)?;
                tx.rewards_owner.pack_typed(p)?;
            }
            Self::Import(tx) => {
                p.u32(IMPORT_TX);
                tx.base.pack(p)?;
                p.fixed(&tx.source_chain);
                pack_inputs(p, &tx.imported_inputs)?;
            }
            Self::Export(tx) => {
                p.u32(EXPORT_TX);
                tx.base.pack(p)?;
                p.fixed(&tx.destination_chain);
                pack_outputs(p, &tx.exported_outputs)?;
            }
        }
        Ok(())
    }
}

// ─── Envelope ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerTx {
    CChain(EvmAtomicTx),
    PChain(PlatformTx),
}

impl LedgerTx {
    /// Unsigned serialization including the codec version: the signed message.
    pub fn pack(&self) -> Result<Vec<u8>, CodecError> {
        let mut p = Packer::with_version();
        match self {
            Self::CChain(tx) => tx.pack(&mut p)?,
            Self::PChain(tx) => tx.pack(&mut p)?,
        }
        Ok(p.finish())
    }

    /// Serialization with `signatures.len()` secp256k1 credentials appended.
    pub fn pack_signed(&self, signatures: &[Vec<[u8; SIGNATURE_LEN]>]) -> Result<Vec<u8>, CodecError> {
        let mut p = Packer::new();
        p.fixed(&self.pack()?);
        p.array("credentials", signatures, |p, sigs| {
            p.u32(CREDENTIAL);
            p.array("signatures", sigs, |p, s| {
                p.fixed(s);
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(p.finish())
    }
}

/// A decoded ledger transaction with the number of credentials that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLedgerTx {
    pub tx: LedgerTx,
    pub credentials: usize,
}

/// Decode a ledger-model transaction, signed or unsigned.
pub fn decode_ledger_tx(bytes: &[u8]) -> Result<DecodedLedgerTx, CodecError> {
    let mut r = Reader::new(bytes);
    r.version()?;
    let type_id = r.u32()?;
    let tx = match type_id {
        EVM_IMPORT_TX | EVM_EXPORT_TX => LedgerTx::CChain(EvmAtomicTx::read(type_id, &mut r)?),
        _ => LedgerTx::PChain(PlatformTx::read(type_id, &mut r)?),
    };

    if r.is_empty() {
        return Ok(DecodedLedgerTx { tx, credentials: 0 });
    }

    let credentials = r.array("credentials", |r| match r.u32()? {
        CREDENTIAL => {
            r.array("signatures", |r| r.take(SIGNATURE_LEN).map(|_| ()))?;
            Ok(())
        }
        other => Err(CodecError::UnknownTypeId { context: "credential", type_id: other }),
    })?;
    if !r.is_empty() {
        return Err(CodecError::TrailingBytes { remaining: r.remaining() });
    }
    Ok(DecodedLedgerTx { tx, credentials: credentials.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(outputs: Vec<TransferableOutput>, inputs: Vec<TransferableInput>) -> BaseTx {
        BaseTx { network_id: 14, blockchain_id: [0u8; 32], outputs, inputs, memo: b"hi".to_vec() }
    }

    fn out(amount: u64, addr: u8) -> TransferableOutput {
        TransferableOutput {
            asset_id: [9u8; 32],
            output: Output::Transfer(TransferOutput { amount, owners: OutputOwners::single([addr; 20]) }),
        }
    }

    fn inp(amount: u64) -> TransferableInput {
        TransferableInput {
            utxo: UtxoId { tx_id: [3u8; 32], output_index: 1 },
            asset_id: [9u8; 32],
            input: Input::Transfer(TransferInput { amount, sig_indices: vec![0] }),
        }
    }

    #[test]
    fn permissionless_validator_survives_pack_and_decode() {
        let tx = LedgerTx::PChain(PlatformTx::AddPermissionlessValidator(AddPermissionlessValidatorTx {
            base: base(vec![out(10, 1)], vec![inp(100)]),
            subnet_validator: SubnetValidator {
                validator: Validator { node_id: [4u8; 20], start_time: 1, end_time: 2, weight: 80 },
                subnet_id: [0u8; 32],
            },
            signer: Signer::ProofOfPossession { public_key: [1u8; 48], signature: [2u8; 96] },
            stake: vec![TransferableOutput {
                asset_id: [9u8; 32],
                output: Output::Locked {
                    locktime: 50,
                    output: TransferOutput { amount: 80, owners: OutputOwners::single([1u8; 20]) },
                },
            }],
            validator_rewards_owner: OutputOwners::single([1u8; 20]),
            delegator_rewards_owner: OutputOwners::single([1u8; 20]),
            shares: 20_000,
        }));
        let bytes = tx.pack().unwrap();
        let decoded = decode_ledger_tx(&bytes).unwrap();
        assert_eq!(decoded.tx, tx);
        assert_eq!(decoded.credentials, 0);
    }

    #[test]
    fn credentials_are_consumed_and_excluded_from_message() {
        let tx = LedgerTx::PChain(PlatformTx::Export(PlatformExportTx {
            base: base(vec![], vec![inp(5)]),
            destination_chain: [8u8; 32],
            exported_outputs: vec![out(4, 2)],
        }));
        let signed = tx.pack_signed(&[vec![[0x11; SIGNATURE_LEN]]]).unwrap();
        let decoded = decode_ledger_tx(&signed).unwrap();
        assert_eq!(decoded.credentials, 1);
        assert_eq!(decoded.tx.pack().unwrap(), tx.pack().unwrap());
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let tx = LedgerTx::CChain(EvmAtomicTx::Export(EvmExportTx {
            network_id: 14,
            blockchain_id: [1u8; 32],
            destination_chain: [0u8; 32],
            ins: vec![EvmInput { address: [5u8; 20], amount: 10, asset_id: [9u8; 32], nonce: 0 }],
            exported_outputs: vec![out(9, 2)],
        }));
        let mut bytes = tx.pack().unwrap();
        assert!(decode_ledger_tx(&bytes).is_ok());
        bytes.push(0);
        assert!(decode_ledger_tx(&bytes).is_err());
    }

    #[test]
    fn unknown_type_id_is_rejected() {
        let bytes = [0u8, 0, 0, 0, 0, 99];
        assert_eq!(
            decode_ledger_tx(&bytes),
            Err(CodecError::UnknownTypeId { context: "P-chain transaction", type_id: 99 })
        );
    }

    #[test]
    fn locked_output_reports_the_stake_lock() {
        let o = Output::Locked {
            locktime: 7,
            output: TransferOutput { amount: 1, owners: OutputOwners::single([0u8; 20]) },
        };
        assert_eq!(o.locktime(), 7);
        assert_eq!(o.amount(), 1);
    }
}
