//! Transaction model: wire format, identity, signature hash, fee and
//! input verification

use std::fmt;

use log::{debug, warn};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{BitcoinError, Result};
use crate::field::from_bytes_be;
use crate::hash::{hash256, hash256_reversed};
use crate::interpreter::verify_script;
use crate::provider::TxProvider;
use crate::script::Script;
use crate::serialize::{write_hash_reversed, write_varint, Reader};
use crate::types::*;

/// Previous-output index used by coinbase inputs
const COINBASE_PREV_INDEX: u32 = 0xffff_ffff;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
    pub network: Network,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// Id of the transaction being spent, in display order
    #[serde(with = "hex::serde")]
    pub prev_tx: Hash,
    pub prev_index: u32,
    pub script_sig: Script,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub value: u64,
    pub script_pubkey: Script,
}

impl Tx {
    /// Parses a complete serialized transaction; trailing bytes are an error.
    pub fn parse(bytes: &[u8], network: Network) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let tx = Self::parse_from(&mut reader, network)?;
        if !reader.is_finished() {
            return Err(BitcoinError::Serialization(format!(
                "{} trailing bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    pub fn parse_from(reader: &mut Reader, network: Network) -> Result<Self> {
        let version = reader.read_u32_le()?;
        let input_count = reader.read_varint()?;
        let mut inputs = Vec::new();
        for _ in 0..input_count {
            inputs.push(TxIn::parse(reader)?);
        }
        let output_count = reader.read_varint()?;
        let mut outputs = Vec::new();
        for _ in 0..output_count {
            outputs.push(TxOut::parse(reader)?);
        }
        let lock_time = reader.read_u32_le()?;
        Ok(Tx {
            version,
            inputs,
            outputs,
            lock_time,
            network,
        })
    }

    pub fn serialize(&self) -> ByteString {
        self.serialize_with(None)
    }

    /// Serializes with every unlocking script emptied except the one at
    /// `substitute.0`, which is replaced by `substitute.1`.
    fn serialize_with(&self, substitute: Option<(usize, &Script)>) -> ByteString {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        write_varint(&mut out, self.inputs.len() as u64);
        for (i, input) in self.inputs.iter().enumerate() {
            let script_sig = match substitute {
                None => input.script_sig.clone(),
                Some((index, script)) if index == i => script.clone(),
                Some(_) => Script::default(),
            };
            input.serialize_with_script(&mut out, &script_sig);
        }
        write_varint(&mut out, self.outputs.len() as u64);
        for output in &self.outputs {
            output.serialize_into(&mut out);
        }
        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    /// Reversed double-SHA256 of the serialization
    pub fn hash(&self) -> Hash {
        hash256_reversed(&self.serialize())
    }

    /// Hex transaction id
    pub fn id(&self) -> String {
        hex::encode(self.hash())
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1
            && self.inputs[0].prev_tx == [0u8; 32]
            && self.inputs[0].prev_index == COINBASE_PREV_INDEX
    }

    /// Sum of spent output values minus sum of created output values.
    /// Negative means the transaction creates money.
    pub fn fee<P: TxProvider>(&self, provider: &P) -> Result<i64> {
        let mut input_sum: i128 = 0;
        for input in &self.inputs {
            input_sum += input.value(provider, self.network)? as i128;
        }
        let output_sum: i128 = self.outputs.iter().map(|o| o.value as i128).sum();
        i64::try_from(input_sum - output_sum)
            .map_err(|_| BitcoinError::Serialization("fee out of range".to_string()))
    }

    /// SIGHASH_ALL signature hash for input `input_index`.
    ///
    /// The input's unlocking script is replaced by `redeem_script` when
    /// given (P2SH), otherwise by the locking script of the output it
    /// spends.
    pub fn sig_hash<P: TxProvider>(
        &self,
        input_index: usize,
        redeem_script: Option<&Script>,
        provider: &P,
    ) -> Result<BigUint> {
        let input = self.input(input_index)?;
        match redeem_script {
            Some(script) => Ok(self.sig_hash_with_script(input_index, script)),
            None => {
                let script_pubkey = input.script_pubkey(provider, self.network)?;
                Ok(self.sig_hash_with_script(input_index, &script_pubkey))
            }
        }
    }

    fn sig_hash_with_script(&self, input_index: usize, script: &Script) -> BigUint {
        let mut data = self.serialize_with(Some((input_index, script)));
        data.extend_from_slice(&SIGHASH_ALL.to_le_bytes());
        from_bytes_be(&hash256(&data))
    }

    fn input(&self, input_index: usize) -> Result<&TxIn> {
        self.inputs.get(input_index).ok_or_else(|| {
            BitcoinError::InputOutOfRange(format!(
                "input {} of {}",
                input_index,
                self.inputs.len()
            ))
        })
    }

    /// Runs the unlocking and locking scripts of one input
    pub fn verify_input<P: TxProvider>(
        &self,
        input_index: usize,
        provider: &P,
    ) -> Result<ValidationResult> {
        let input = self.input(input_index)?;
        let script_pubkey = input.script_pubkey(provider, self.network)?;
        let result = verify_script(&input.script_sig, &script_pubkey, |redeem| {
            Ok(self.sig_hash_with_script(input_index, redeem.unwrap_or(&script_pubkey)))
        })?;
        debug!("tx {} input {}: {:?}", self.id(), input_index, result);
        Ok(result)
    }

    /// Non-negative fee and every input valid
    pub fn verify<P: TxProvider>(&self, provider: &P) -> Result<ValidationResult> {
        let fee = self.fee(provider)?;
        if fee < 0 {
            warn!("tx {} spends more than its inputs: fee {}", self.id(), fee);
            return Ok(ValidationResult::Invalid(format!("negative fee {}", fee)));
        }
        for i in 0..self.inputs.len() {
            if let ValidationResult::Invalid(reason) = self.verify_input(i, provider)? {
                warn!("tx {} input {} rejected: {}", self.id(), i, reason);
                return Ok(ValidationResult::Invalid(format!("input {}: {}", i, reason)));
            }
        }
        Ok(ValidationResult::Valid)
    }
}

impl fmt::Display for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tx: {}", self.id())?;
        writeln!(f, "version: {}", self.version)?;
        writeln!(f, "inputs:")?;
        for input in &self.inputs {
            writeln!(f, "  {}", input)?;
        }
        writeln!(f, "outputs:")?;
        for output in &self.outputs {
            writeln!(f, "  {}", output)?;
        }
        write!(f, "locktime: {}", self.lock_time)
    }
}

impl TxIn {
    /// Input with an empty unlocking script and final sequence
    pub fn new(prev_tx: Hash, prev_index: u32) -> Self {
        TxIn {
            prev_tx,
            prev_index,
            script_sig: Script::default(),
            sequence: 0xffff_ffff,
        }
    }

    pub fn parse(reader: &mut Reader) -> Result<Self> {
        let prev_tx = reader.read_hash_reversed()?;
        let prev_index = reader.read_u32_le()?;
        let script_sig = Script::parse(reader)?;
        let sequence = reader.read_u32_le()?;
        Ok(TxIn {
            prev_tx,
            prev_index,
            script_sig,
            sequence,
        })
    }

    pub fn serialize(&self) -> ByteString {
        let mut out = Vec::new();
        self.serialize_with_script(&mut out, &self.script_sig);
        out
    }

    fn serialize_with_script(&self, out: &mut ByteString, script_sig: &Script) {
        write_hash_reversed(out, &self.prev_tx);
        out.extend_from_slice(&self.prev_index.to_le_bytes());
        out.extend_from_slice(&script_sig.serialize());
        out.extend_from_slice(&self.sequence.to_le_bytes());
    }

    pub fn fetch_tx<P: TxProvider>(&self, provider: &P, network: Network) -> Result<Tx> {
        Ok(provider.fetch(&self.prev_tx, network)?)
    }

    /// The output this input spends
    pub fn prev_output<P: TxProvider>(&self, provider: &P, network: Network) -> Result<TxOut> {
        let tx = self.fetch_tx(provider, network)?;
        tx.outputs
            .get(self.prev_index as usize)
            .cloned()
            .ok_or_else(|| {
                BitcoinError::InputOutOfRange(format!(
                    "output {} of {} in {}",
                    self.prev_index,
                    tx.outputs.len(),
                    hex::encode(self.prev_tx)
                ))
            })
    }

    pub fn value<P: TxProvider>(&self, provider: &P, network: Network) -> Result<u64> {
        Ok(self.prev_output(provider, network)?.value)
    }

    pub fn script_pubkey<P: TxProvider>(&self, provider: &P, network: Network) -> Result<Script> {
        Ok(self.prev_output(provider, network)?.script_pubkey)
    }
}

impl fmt::Display for TxIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(self.prev_tx), self.prev_index)
    }
}

impl TxOut {
    pub fn new(value: u64, script_pubkey: Script) -> Self {
        TxOut { value, script_pubkey }
    }

    pub fn parse(reader: &mut Reader) -> Result<Self> {
        let value = reader.read_u64_le()?;
        let script_pubkey = Script::parse(reader)?;
        Ok(TxOut { value, script_pubkey })
    }

    pub fn serialize(&self) -> ByteString {
        let mut out = Vec::new();
        self.serialize_into(&mut out);
        out
    }

    fn serialize_into(&self, out: &mut ByteString) {
        out.extend_from_slice(&self.value.to_le_bytes());
        out.extend_from_slice(&self.script_pubkey.serialize());
    }
}

impl fmt::Display for TxOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.value, self.script_pubkey)
    }
}
