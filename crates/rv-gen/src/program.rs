use anyhow::{anyhow, ensure, Context, Result};
use rv_macroasm::{BitVector, Catalog, Params};
use tracing::debug;

use crate::board::{AddressLoad, Board};

/// Register holding the UART address.
pub const ADDR_REG: u128 = 1;
/// Register holding the current character.
pub const CHAR_REG: u128 = 2;

/// One instruction to emit: a catalog mnemonic and its field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insn {
    pub mnemonic: &'static str,
    pub params: Params<'static>,
}

impl Insn {
    pub fn new<const N: usize>(mnemonic: &'static str, params: [(&'static str, u128); N]) -> Self {
        Self { mnemonic, params: Params::from(params) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub mnemonic: &'static str,
    pub word: BitVector,
}

impl Encoded {
    pub fn bytes(&self) -> Vec<u8> {
        self.word.to_le_bytes()
    }
}

/// Instructions that leave `addr` in register `rd`.
pub fn load_address(rd: u128, addr: u32, how: AddressLoad) -> Result<Vec<Insn>> {
    match how {
        AddressLoad::AddiSlli => {
            ensure!(
                addr.is_power_of_two(),
                "address {addr:#010x} is not a power of two; use lui loading"
            );
            Ok(vec![
                Insn::new("addi", [("imm", 1), ("rs1", 0), ("rd", rd)]),
                Insn::new(
                    "slli",
                    [("shamt", addr.trailing_zeros() as u128), ("src", rd), ("dest", rd)],
                ),
            ])
        }
        AddressLoad::Lui => {
            // addi sign-extends its immediate, so round the upper part
            let hi = addr.wrapping_add(0x800) >> 12;
            let lo = addr.wrapping_sub(hi << 12) & 0xFFF;
            let mut out = Vec::new();
            if hi != 0 {
                out.push(Insn::new("lui", [("imm", hi as u128), ("rd", rd)]));
            }
            if lo != 0 || hi == 0 {
                let rs1 = if hi != 0 { rd } else { 0 };
                out.push(Insn::new("addi", [("imm", lo as u128), ("rs1", rs1), ("rd", rd)]));
            }
            Ok(out)
        }
    }
}

/// Unrolled UART write of `message`, one store per byte.
pub fn hello_world(board: &Board, message: &str) -> Result<Vec<Insn>> {
    ensure!(board.store_width <= 2, "store width code {} is not 0, 1 or 2", board.store_width);
    let mut prog = load_address(ADDR_REG, board.uart_base, board.address_load)
        .with_context(|| format!("board {}", board.name))?;
    for c in message.bytes() {
        prog.push(Insn::new("addi", [("imm", c as u128), ("rs1", 0), ("rd", CHAR_REG)]));
        prog.push(Insn::new(
            "store",
            [
                ("offset", 0),
                ("src", CHAR_REG),
                ("base", ADDR_REG),
                ("width", board.store_width as u128),
            ],
        ));
    }
    debug!(board = %board.name, insns = prog.len(), "generated program");
    Ok(prog)
}

pub fn encode_program(catalog: &Catalog, program: &[Insn]) -> Result<Vec<Encoded>> {
    program
        .iter()
        .enumerate()
        .map(|(i, insn)| -> Result<Encoded> {
            let format = catalog
                .get(insn.mnemonic)
                .ok_or_else(|| anyhow!("unknown mnemonic: {}", insn.mnemonic))?;
            ensure!(format.width() % 8 == 0, "{} is not a whole number of bytes", insn.mnemonic);
            let word = format
                .encode(&insn.params)
                .with_context(|| format!("encoding #{i} `{}`", insn.mnemonic))?;
            Ok(Encoded { mnemonic: insn.mnemonic, word })
        })
        .collect()
}

/// The raw little-endian byte stream for `program`.
pub fn assemble(catalog: &Catalog, program: &[Insn]) -> Result<Vec<u8>> {
    Ok(encode_program(catalog, program)?
        .iter()
        .flat_map(Encoded::bytes)
        .collect())
}
