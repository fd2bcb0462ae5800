//! Opcode table: display names and execution handlers
//!
//! Every opcode byte maps to at most one handler. A handler receives the
//! execution context and reports success; a `false` return stops the script.
//! Flow control (OP_IF family) is handled by the interpreter itself since it
//! needs the conditional-execution stack.

use log::debug;
use num_bigint::BigUint;

use crate::constants::*;
use crate::hash::{hash160, hash256, ripemd160, sha1, sha256};
use crate::interpreter::ExecutionContext;
use crate::num::{decode_num, encode_num, is_true};
use crate::point::Point;
use crate::signature::Signature;
use crate::types::*;

pub type OpHandler = fn(&mut ExecutionContext) -> bool;

/// Canonical name of an opcode byte
pub fn op_name(code: u8) -> &'static str {
    match code {
        0x00 => "OP_0",
        0x01..=0x4b => "OP_PUSHBYTES",
        0x4c => "OP_PUSHDATA1",
        0x4d => "OP_PUSHDATA2",
        0x4e => "OP_PUSHDATA4",
        0x4f => "OP_1NEGATE",
        0x50 => "OP_RESERVED",
        0x51 => "OP_1",
        0x52 => "OP_2",
        0x53 => "OP_3",
        0x54 => "OP_4",
        0x55 => "OP_5",
        0x56 => "OP_6",
        0x57 => "OP_7",
        0x58 => "OP_8",
        0x59 => "OP_9",
        0x5a => "OP_10",
        0x5b => "OP_11",
        0x5c => "OP_12",
        0x5d => "OP_13",
        0x5e => "OP_14",
        0x5f => "OP_15",
        0x60 => "OP_16",
        0x61 => "OP_NOP",
        0x62 => "OP_VER",
        0x63 => "OP_IF",
        0x64 => "OP_NOTIF",
        0x65 => "OP_VERIF",
        0x66 => "OP_VERNOTIF",
        0x67 => "OP_ELSE",
        0x68 => "OP_ENDIF",
        0x69 => "OP_VERIFY",
        0x6a => "OP_RETURN",
        0x6b => "OP_TOALTSTACK",
        0x6c => "OP_FROMALTSTACK",
        0x6d => "OP_2DROP",
        0x6e => "OP_2DUP",
        0x6f => "OP_3DUP",
        0x70 => "OP_2OVER",
        0x71 => "OP_2ROT",
        0x72 => "OP_2SWAP",
        0x73 => "OP_IFDUP",
        0x74 => "OP_DEPTH",
        0x75 => "OP_DROP",
        0x76 => "OP_DUP",
        0x77 => "OP_NIP",
        0x78 => "OP_OVER",
        0x79 => "OP_PICK",
        0x7a => "OP_ROLL",
        0x7b => "OP_ROT",
        0x7c => "OP_SWAP",
        0x7d => "OP_TUCK",
        0x7e => "OP_CAT",
        0x7f => "OP_SUBSTR",
        0x80 => "OP_LEFT",
        0x81 => "OP_RIGHT",
        0x82 => "OP_SIZE",
        0x83 => "OP_INVERT",
        0x84 => "OP_AND",
        0x85 => "OP_OR",
        0x86 => "OP_XOR",
        0x87 => "OP_EQUAL",
        0x88 => "OP_EQUALVERIFY",
        0x89 => "OP_RESERVED1",
        0x8a => "OP_RESERVED2",
        0x8b => "OP_1ADD",
        0x8c => "OP_1SUB",
        0x8d => "OP_2MUL",
        0x8e => "OP_2DIV",
        0x8f => "OP_NEGATE",
        0x90 => "OP_ABS",
        0x91 => "OP_NOT",
        0x92 => "OP_0NOTEQUAL",
        0x93 => "OP_ADD",
        0x94 => "OP_SUB",
        0x95 => "OP_MUL",
        0x96 => "OP_DIV",
        0x97 => "OP_MOD",
        0x98 => "OP_LSHIFT",
        0x99 => "OP_RSHIFT",
        0x9a => "OP_BOOLAND",
        0x9b => "OP_BOOLOR",
        0x9c => "OP_NUMEQUAL",
        0x9d => "OP_NUMEQUALVERIFY",
        0x9e => "OP_NUMNOTEQUAL",
        0x9f => "OP_LESSTHAN",
        0xa0 => "OP_GREATERTHAN",
        0xa1 => "OP_LESSTHANOREQUAL",
        0xa2 => "OP_GREATERTHANOREQUAL",
        0xa3 => "OP_MIN",
        0xa4 => "OP_MAX",
        0xa5 => "OP_WITHIN",
        0xa6 => "OP_RIPEMD160",
        0xa7 => "OP_SHA1",
        0xa8 => "OP_SHA256",
        0xa9 => "OP_HASH160",
        0xaa => "OP_HASH256",
        0xab => "OP_CODESEPARATOR",
        0xac => "OP_CHECKSIG",
        0xad => "OP_CHECKSIGVERIFY",
        0xae => "OP_CHECKMULTISIG",
        0xaf => "OP_CHECKMULTISIGVERIFY",
        0xb0 => "OP_NOP1",
        0xb1 => "OP_CHECKLOCKTIMEVERIFY",
        0xb2 => "OP_CHECKSEQUENCEVERIFY",
        0xb3 => "OP_NOP4",
        0xb4 => "OP_NOP5",
        0xb5 => "OP_NOP6",
        0xb6 => "OP_NOP7",
        0xb7 => "OP_NOP8",
        0xb8 => "OP_NOP9",
        0xb9 => "OP_NOP10",
        _ => "OP_UNKNOWN",
    }
}

/// Handler for an opcode, or `None` for opcodes that always fail:
/// reserved and disabled bytes, flow control, CODESEPARATOR and the
/// timelock checks.
pub fn handler(code: u8) -> Option<OpHandler> {
    let handler: OpHandler = match code {
        // OP_NOP, OP_NOP1, OP_NOP4..OP_NOP10
        0x61 | 0xb0 | 0xb3..=0xb9 => op_nop,
        0x69 => op_verify,
        0x6a => op_return,
        0x6b => op_toaltstack,
        0x6c => op_fromaltstack,
        0x6d => op_2drop,
        0x6e => op_2dup,
        0x6f => op_3dup,
        0x70 => op_2over,
        0x71 => op_2rot,
        0x72 => op_2swap,
        0x73 => op_ifdup,
        0x74 => op_depth,
        0x75 => op_drop,
        0x76 => op_dup,
        0x77 => op_nip,
        0x78 => op_over,
        0x79 => op_pick,
        0x7a => op_roll,
        0x7b => op_rot,
        0x7c => op_swap,
        0x7d => op_tuck,
        0x82 => op_size,
        0x87 => op_equal,
        0x88 => op_equalverify,
        0x8b => |ctx| unary(ctx, |a| a + 1),
        0x8c => |ctx| unary(ctx, |a| a - 1),
        0x8f => |ctx| unary(ctx, |a| -a),
        0x90 => |ctx| unary(ctx, |a| a.abs()),
        0x91 => |ctx| unary(ctx, |a| (a == 0) as i64),
        0x92 => |ctx| unary(ctx, |a| (a != 0) as i64),
        0x93 => |ctx| binary(ctx, |a, b| a + b),
        0x94 => |ctx| binary(ctx, |a, b| a - b),
        0x9a => |ctx| binary(ctx, |a, b| (a != 0 && b != 0) as i64),
        0x9b => |ctx| binary(ctx, |a, b| (a != 0 || b != 0) as i64),
        0x9c => |ctx| binary(ctx, |a, b| (a == b) as i64),
        0x9d => op_numequalverify,
        0x9e => |ctx| binary(ctx, |a, b| (a != b) as i64),
        0x9f => |ctx| binary(ctx, |a, b| (a < b) as i64),
        0xa0 => |ctx| binary(ctx, |a, b| (a > b) as i64),
        0xa1 => |ctx| binary(ctx, |a, b| (a <= b) as i64),
        0xa2 => |ctx| binary(ctx, |a, b| (a >= b) as i64),
        0xa3 => |ctx| binary(ctx, |a, b| a.min(b)),
        0xa4 => |ctx| binary(ctx, |a, b| a.max(b)),
        0xa5 => op_within,
        0xa6 => |ctx| digest(ctx, |data| ripemd160(data).to_vec()),
        0xa7 => |ctx| digest(ctx, |data| sha1(data).to_vec()),
        0xa8 => |ctx| digest(ctx, |data| sha256(data).to_vec()),
        0xa9 => |ctx| digest(ctx, |data| hash160(data).to_vec()),
        0xaa => |ctx| digest(ctx, |data| hash256(data).to_vec()),
        0xac => op_checksig,
        0xad => op_checksigverify,
        0xae => op_checkmultisig,
        0xaf => op_checkmultisigverify,
        _ => return None,
    };
    Some(handler)
}

fn push_bool(ctx: &mut ExecutionContext, value: bool) {
    ctx.stack.push(encode_num(value as i64));
}

/// Pops a numeric operand, rejecting elements wider than four bytes
fn pop_num(ctx: &mut ExecutionContext) -> Option<i64> {
    let element = ctx.stack.pop()?;
    if element.len() > MAX_NUM_SIZE {
        return None;
    }
    Some(decode_num(&element))
}

fn unary(ctx: &mut ExecutionContext, f: fn(i64) -> i64) -> bool {
    match pop_num(ctx) {
        Some(a) => {
            ctx.stack.push(encode_num(f(a)));
            true
        }
        None => false,
    }
}

/// `a` is the second element, `b` the top
fn binary(ctx: &mut ExecutionContext, f: fn(i64, i64) -> i64) -> bool {
    if ctx.stack.len() < 2 {
        return false;
    }
    let b = match pop_num(ctx) {
        Some(b) => b,
        None => return false,
    };
    let a = match pop_num(ctx) {
        Some(a) => a,
        None => return false,
    };
    ctx.stack.push(encode_num(f(a, b)));
    true
}

fn digest(ctx: &mut ExecutionContext, f: fn(&[u8]) -> ByteString) -> bool {
    match ctx.stack.pop() {
        Some(element) => {
            ctx.stack.push(f(&element));
            true
        }
        None => false,
    }
}

fn op_nop(_ctx: &mut ExecutionContext) -> bool {
    true
}

fn op_verify(ctx: &mut ExecutionContext) -> bool {
    match ctx.stack.pop() {
        Some(element) => is_true(&element),
        None => false,
    }
}

fn op_return(_ctx: &mut ExecutionContext) -> bool {
    false
}

fn op_toaltstack(ctx: &mut ExecutionContext) -> bool {
    match ctx.stack.pop() {
        Some(element) => {
            ctx.alt_stack.push(element);
            true
        }
        None => false,
    }
}

fn op_fromaltstack(ctx: &mut ExecutionContext) -> bool {
    match ctx.alt_stack.pop() {
        Some(element) => {
            ctx.stack.push(element);
            true
        }
        None => false,
    }
}

fn op_2drop(ctx: &mut ExecutionContext) -> bool {
    if ctx.stack.len() < 2 {
        return false;
    }
    ctx.stack.pop();
    ctx.stack.pop();
    true
}

/// Pushes copies of the elements at the given depths, deepest first
fn copy_from_depths(ctx: &mut ExecutionContext, depths: &[usize]) -> bool {
    let mut copies = Vec::with_capacity(depths.len());
    for depth in depths {
        match ctx.stack.peek_at(*depth) {
            Some(element) => copies.push(element.clone()),
            None => return false,
        }
    }
    for copy in copies {
        ctx.stack.push(copy);
    }
    true
}

fn op_2dup(ctx: &mut ExecutionContext) -> bool {
    copy_from_depths(ctx, &[1, 0])
}

fn op_3dup(ctx: &mut ExecutionContext) -> bool {
    copy_from_depths(ctx, &[2, 1, 0])
}

fn op_2over(ctx: &mut ExecutionContext) -> bool {
    copy_from_depths(ctx, &[3, 2])
}

/// Moves the elements at the given depths to the top, deepest first.
/// Depths are taken after each preceding removal.
fn move_to_top(ctx: &mut ExecutionContext, depths: &[usize]) -> bool {
    let deepest = depths.iter().copied().max().unwrap_or(0);
    if ctx.stack.len() <= deepest {
        return false;
    }
    let mut moved = Vec::with_capacity(depths.len());
    for depth in depths {
        match ctx.stack.remove_at(*depth) {
            Some(element) => moved.push(element),
            None => return false,
        }
    }
    for element in moved {
        ctx.stack.push(element);
    }
    true
}

/// x1 x2 x3 x4 x5 x6 -> x3 x4 x5 x6 x1 x2
fn op_2rot(ctx: &mut ExecutionContext) -> bool {
    move_to_top(ctx, &[5, 4])
}

/// x1 x2 x3 x4 -> x3 x4 x1 x2
fn op_2swap(ctx: &mut ExecutionContext) -> bool {
    move_to_top(ctx, &[3, 2])
}

fn op_ifdup(ctx: &mut ExecutionContext) -> bool {
    match ctx.stack.peek() {
        Some(top) => {
            if is_true(top) {
                let copy = top.clone();
                ctx.stack.push(copy);
            }
            true
        }
        None => false,
    }
}

fn op_depth(ctx: &mut ExecutionContext) -> bool {
    let depth = ctx.stack.len() as i64;
    ctx.stack.push(encode_num(depth));
    true
}

fn op_drop(ctx: &mut ExecutionContext) -> bool {
    ctx.stack.pop().is_some()
}

fn op_dup(ctx: &mut ExecutionContext) -> bool {
    copy_from_depths(ctx, &[0])
}

fn op_nip(ctx: &mut ExecutionContext) -> bool {
    ctx.stack.remove_at(1).is_some()
}

fn op_over(ctx: &mut ExecutionContext) -> bool {
    copy_from_depths(ctx, &[1])
}

/// Pops `n` and returns it as a depth into the remaining stack
fn pop_depth(ctx: &mut ExecutionContext) -> Option<usize> {
    let n = pop_num(ctx)?;
    if n < 0 || n as usize >= ctx.stack.len() {
        return None;
    }
    Some(n as usize)
}

fn op_pick(ctx: &mut ExecutionContext) -> bool {
    match pop_depth(ctx) {
        Some(n) => copy_from_depths(ctx, &[n]),
        None => false,
    }
}

fn op_roll(ctx: &mut ExecutionContext) -> bool {
    match pop_depth(ctx) {
        Some(n) => move_to_top(ctx, &[n]),
        None => false,
    }
}

/// x1 x2 x3 -> x2 x3 x1
fn op_rot(ctx: &mut ExecutionContext) -> bool {
    move_to_top(ctx, &[2])
}

fn op_swap(ctx: &mut ExecutionContext) -> bool {
    move_to_top(ctx, &[1])
}

/// x1 x2 -> x2 x1 x2
fn op_tuck(ctx: &mut ExecutionContext) -> bool {
    if ctx.stack.len() < 2 {
        return false;
    }
    match ctx.stack.peek() {
        Some(top) => {
            let copy = top.clone();
            ctx.stack.insert_at(2, copy)
        }
        None => false,
    }
}

fn op_size(ctx: &mut ExecutionContext) -> bool {
    match ctx.stack.peek() {
        Some(top) => {
            let size = top.len() as i64;
            ctx.stack.push(encode_num(size));
            true
        }
        None => false,
    }
}

fn op_equal(ctx: &mut ExecutionContext) -> bool {
    if ctx.stack.len() < 2 {
        return false;
    }
    let a = ctx.stack.pop();
    let b = ctx.stack.pop();
    push_bool(ctx, a == b);
    true
}

fn op_equalverify(ctx: &mut ExecutionContext) -> bool {
    op_equal(ctx) && op_verify(ctx)
}

fn op_numequalverify(ctx: &mut ExecutionContext) -> bool {
    binary(ctx, |a, b| (a == b) as i64) && op_verify(ctx)
}

/// x min max -> (min <= x < max)
fn op_within(ctx: &mut ExecutionContext) -> bool {
    if ctx.stack.len() < 3 {
        return false;
    }
    let (max, min, x) = match (pop_num(ctx), pop_num(ctx), pop_num(ctx)) {
        (Some(max), Some(min), Some(x)) => (max, min, x),
        _ => return false,
    };
    push_bool(ctx, min <= x && x < max);
    true
}

/// Verifies a stack signature (DER plus trailing hash-type byte) against a
/// SEC public key and the context's signature hash. Encoding errors count
/// as a failed check.
fn check_signature(sig_hash: &BigUint, sec: &[u8], sig: &[u8]) -> bool {
    let der = match sig.split_last() {
        Some((_hash_type, der)) => der,
        None => return false,
    };
    let point = match Point::parse_sec(sec) {
        Ok(point) => point,
        Err(e) => {
            debug!("signature check skipped: {}", e);
            return false;
        }
    };
    let signature = match Signature::parse_der(der) {
        Ok(signature) => signature,
        Err(e) => {
            debug!("signature check skipped: {}", e);
            return false;
        }
    };
    point.verify(sig_hash, &signature)
}

fn op_checksig(ctx: &mut ExecutionContext) -> bool {
    if ctx.stack.len() < 2 {
        return false;
    }
    let (sec, sig) = match (ctx.stack.pop(), ctx.stack.pop()) {
        (Some(sec), Some(sig)) => (sec, sig),
        _ => return false,
    };
    let valid = check_signature(&ctx.sig_hash, &sec, &sig);
    push_bool(ctx, valid);
    true
}

fn op_checksigverify(ctx: &mut ExecutionContext) -> bool {
    op_checksig(ctx) && op_verify(ctx)
}

/// Pops a count followed by that many elements, returned in push order
fn pop_counted(ctx: &mut ExecutionContext, max: i64) -> Option<Vec<ByteString>> {
    let count = pop_num(ctx)?;
    if count < 0 || count > max || count as usize > ctx.stack.len() {
        return None;
    }
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(ctx.stack.pop()?);
    }
    items.reverse();
    Some(items)
}

/// m-of-n check: `<dummy> <sig>*m <m> <pubkey>*n <n>`.
///
/// Signatures are matched against public keys in order; a key that fails
/// to match the current signature is skipped for every later one. The
/// dummy element is consumed and ignored.
fn op_checkmultisig(ctx: &mut ExecutionContext) -> bool {
    let pubkeys = match pop_counted(ctx, MAX_PUBKEYS_PER_MULTISIG) {
        Some(pubkeys) => pubkeys,
        None => return false,
    };
    let signatures = match pop_counted(ctx, pubkeys.len() as i64) {
        Some(signatures) => signatures,
        None => return false,
    };
    if ctx.stack.pop().is_none() {
        return false;
    }

    let mut keys = pubkeys.iter();
    let mut all_matched = true;
    'signatures: for sig in &signatures {
        for sec in keys.by_ref() {
            if check_signature(&ctx.sig_hash, sec, sig) {
                continue 'signatures;
            }
        }
        all_matched = false;
        break;
    }
    push_bool(ctx, all_matched);
    true
}

fn op_checkmultisigverify(ctx: &mut ExecutionContext) -> bool {
    op_checkmultisig(ctx) && op_verify(ctx)
}
