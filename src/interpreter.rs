//! Script evaluation
//!
//! Scripts run as a single forward pass over their decoded operations.
//! OP_IF/OP_NOTIF/OP_ELSE/OP_ENDIF are tracked with a conditional-execution
//! stack; every other opcode is dispatched through [`crate::opcodes::handler`].

use log::{debug, trace};
use num_bigint::BigUint;
use num_traits::Zero;

use crate::constants::*;
use crate::error::{Result, ScriptFailure};
use crate::num::is_true;
use crate::opcodes::{handler, op_name};
use crate::script::{Operation, Script};
use crate::stack::ScriptStack;
use crate::types::*;

/// State for evaluating the scripts of one transaction input
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub stack: ScriptStack,
    pub alt_stack: ScriptStack,
    /// Message hash that signature opcodes verify against
    pub sig_hash: BigUint,
}

impl ExecutionContext {
    pub fn new(sig_hash: BigUint) -> Self {
        ExecutionContext {
            stack: ScriptStack::new(),
            alt_stack: ScriptStack::new(),
            sig_hash,
        }
    }

    /// Runs `ops` against the current stacks. Stops at the first failing
    /// operation.
    pub fn evaluate(&mut self, ops: &[Operation]) -> std::result::Result<(), ScriptFailure> {
        let mut conditions: Vec<bool> = Vec::new();

        for op in ops {
            let executing = conditions.iter().all(|c| *c);
            match op {
                Operation::PushBytes(data) => {
                    if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
                        return Err(ScriptFailure::PushTooLarge(data.len()));
                    }
                    if executing {
                        self.stack.push(data.clone());
                    }
                }
                Operation::OpCode(code) => {
                    let code = *code;
                    match code {
                        // Fail even inside an unexecuted branch
                        OP_VERIF | OP_VERNOTIF => {
                            return Err(ScriptFailure::UnsupportedOpcode(code));
                        }
                        OP_IF | OP_NOTIF => {
                            let mut value = false;
                            if executing {
                                let top = self
                                    .stack
                                    .pop()
                                    .ok_or(ScriptFailure::StackUnderflow(op_name(code)))?;
                                value = is_true(&top) == (code == OP_IF);
                            }
                            conditions.push(value);
                        }
                        OP_ELSE => {
                            let last = conditions
                                .last_mut()
                                .ok_or(ScriptFailure::UnbalancedConditional)?;
                            *last = !*last;
                        }
                        OP_ENDIF => {
                            conditions
                                .pop()
                                .ok_or(ScriptFailure::UnbalancedConditional)?;
                        }
                        _ if !executing => {}
                        _ => {
                            trace!("{} depth={}", op_name(code), self.stack.len());
                            let run =
                                handler(code).ok_or(ScriptFailure::UnsupportedOpcode(code))?;
                            if !run(self) {
                                return Err(ScriptFailure::OpcodeFailed {
                                    name: op_name(code),
                                });
                            }
                        }
                    }
                }
            }
            if self.stack.len() + self.alt_stack.len() > MAX_STACK_SIZE {
                return Err(ScriptFailure::StackOverflow);
            }
        }

        if !conditions.is_empty() {
            return Err(ScriptFailure::UnbalancedConditional);
        }
        Ok(())
    }

    /// Pops the top element and requires it to be true
    pub fn check_top(&mut self) -> std::result::Result<(), ScriptFailure> {
        match self.stack.pop() {
            None => Err(ScriptFailure::EmptyStack),
            Some(top) if is_true(&top) => Ok(()),
            Some(_) => Err(ScriptFailure::FalseResult),
        }
    }
}

/// Evaluates an unlocking script followed by a locking script, including
/// the pay-to-script-hash redeem stage.
///
/// `sig_hash` is called with `None` for an ordinary locking script and with
/// the redeem script for P2SH, so the signature hash commits to the same
/// redeem script bytes that are executed. Decoding failures of the two
/// scripts and errors from `sig_hash` are returned as `Err`; every other
/// failure is an `Invalid` result.
pub fn verify_script<F>(
    script_sig: &Script,
    script_pubkey: &Script,
    mut sig_hash: F,
) -> Result<ValidationResult>
where
    F: FnMut(Option<&Script>) -> Result<BigUint>,
{
    let unlocking = script_sig.operations()?;
    let locking = script_pubkey.operations()?;
    let is_p2sh = script_pubkey.is_p2sh();

    if is_p2sh && !script_sig.is_push_only() {
        return Ok(invalid("P2SH unlocking script must be push-only"));
    }

    // A push-only unlocking script never consults the hash, so P2SH defers
    // computing it until the redeem script is known.
    let initial_hash = if is_p2sh { BigUint::zero() } else { sig_hash(None)? };
    let mut ctx = ExecutionContext::new(initial_hash);

    if let Err(failure) = ctx.evaluate(unlocking) {
        return Ok(failed("unlocking script", failure));
    }

    let redeem_script = if is_p2sh {
        match ctx.stack.peek() {
            Some(top) => Some(Script::new(top.clone())),
            None => return Ok(failed("unlocking script", ScriptFailure::EmptyStack)),
        }
    } else {
        None
    };

    if let Some(redeem) = &redeem_script {
        ctx.sig_hash = sig_hash(Some(redeem))?;
    }

    if let Err(failure) = ctx.evaluate(locking).and_then(|_| ctx.check_top()) {
        return Ok(failed("locking script", failure));
    }

    if let Some(redeem) = &redeem_script {
        let ops = match redeem.operations() {
            Ok(ops) => ops,
            Err(e) => {
                return Ok(failed(
                    "redeem script",
                    ScriptFailure::InvalidRedeemScript(e.to_string()),
                ))
            }
        };
        if let Err(failure) = ctx.evaluate(ops).and_then(|_| ctx.check_top()) {
            return Ok(failed("redeem script", failure));
        }
    }

    Ok(ValidationResult::Valid)
}

fn failed(stage: &str, failure: ScriptFailure) -> ValidationResult {
    debug!("{} failed: {}", stage, failure);
    ValidationResult::Invalid(format!("{}: {}", stage, failure))
}

fn invalid(reason: &str) -> ValidationResult {
    debug!("{}", reason);
    ValidationResult::Invalid(reason.to_string())
}
