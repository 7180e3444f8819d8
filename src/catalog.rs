//! RV32I subset: shared format templates and the named instruction table.

use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, error};

use crate::error::EncodeError;
use crate::format::InstructionFormat;
use crate::range::{bit, bits, fixed};

pub const OP_LUI: u128 = 0b0110111;
pub const OP_AUIPC: u128 = 0b0010111;
pub const OP_JAL: u128 = 0b1101111;
pub const OP_BRANCH: u128 = 0b1100011;
pub const OP_LOAD: u128 = 0b0000011;
pub const OP_STORE: u128 = 0b0100011;
pub const OP_IMM: u128 = 0b0010011;
pub const OP_REG: u128 = 0b0110011;

/// imm[31:12], rd
pub fn utype(opcode: u128) -> InstructionFormat {
    InstructionFormat::new(32)
        .field("imm", bits(31, 12))
        .field("rd", bits(11, 7))
        .field("opcode", fixed(6, 0, opcode))
}

/// imm[11:0], rs1, funct3, rd
pub fn itype(funct3: u128, opcode: u128) -> InstructionFormat {
    InstructionFormat::new(32)
        .field("imm", bits(31, 20))
        .field("rs1", bits(19, 15))
        .field("funct3", fixed(14, 12, funct3))
        .field("rd", bits(11, 7))
        .field("opcode", fixed(6, 0, opcode))
}

/// Shift by immediate: the top six bits of the I-type immediate are fixed.
pub fn shift_imm(funct6: u128, funct3: u128) -> InstructionFormat {
    InstructionFormat::new(32)
        .field("imm", fixed(31, 26, funct6))
        .field("shamt", bits(25, 20))
        .field("src", bits(19, 15))
        .field("funct3", fixed(14, 12, funct3))
        .field("dest", bits(11, 7))
        .field("opcode", fixed(6, 0, OP_IMM))
}

pub fn rtype(funct7: u128, funct3: u128) -> InstructionFormat {
    InstructionFormat::new(32)
        .field("funct7", fixed(31, 25, funct7))
        .field("rs2", bits(24, 20))
        .field("rs1", bits(19, 15))
        .field("funct3", fixed(14, 12, funct3))
        .field("rd", bits(11, 7))
        .field("opcode", fixed(6, 0, OP_REG))
}

/// S-type store with the access width left open (0 byte, 1 half, 2 word).
/// `offset` is imm[11:0]: imm[11:5] lands in 31:25, imm[4:0] in 11:7.
pub fn store() -> InstructionFormat {
    InstructionFormat::new(32)
        .field("offset", [bits(31, 25), bits(11, 7)])
        .field("src", bits(24, 20))
        .field("base", bits(19, 15))
        .field("width", bits(14, 12))
        .field("opcode", fixed(6, 0, OP_STORE))
}

/// B-type; `offset` is imm[12:1], i.e. the byte offset shifted right once.
pub fn btype(funct3: u128) -> InstructionFormat {
    InstructionFormat::new(32)
        .field("offset", [bit(31), bit(7), bits(30, 25), bits(11, 8)])
        .field("rs2", bits(24, 20))
        .field("rs1", bits(19, 15))
        .field("funct3", fixed(14, 12, funct3))
        .field("opcode", fixed(6, 0, OP_BRANCH))
}

/// J-type; `offset` is imm[20:1].
pub fn jtype(opcode: u128) -> InstructionFormat {
    InstructionFormat::new(32)
        .field("offset", [bit(31), bits(19, 12), bit(20), bits(30, 21)])
        .field("rd", bits(11, 7))
        .field("opcode", fixed(6, 0, opcode))
}

/// Named instruction formats, built once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    formats: BTreeMap<&'static str, InstructionFormat>,
}

impl Catalog {
    pub fn get(&self, mnemonic: &str) -> Option<&InstructionFormat> {
        self.formats.get(mnemonic)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &InstructionFormat)> {
        self.formats.iter().map(|(k, v)| (*k, v))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    fn insert(&mut self, mnemonic: &'static str, format: InstructionFormat) {
        self.formats.insert(mnemonic, format);
    }

    /// Insert one derived format per `(mnemonic, value)`, each with `field`
    /// of `template` pinned to `value`.
    pub fn insert_pinned(
        &mut self,
        template: &InstructionFormat,
        field: &str,
        variants: &[(&'static str, u128)],
    ) -> Result<(), EncodeError> {
        for &(mnemonic, value) in variants {
            self.insert(mnemonic, template.pin(field, value)?);
        }
        Ok(())
    }

    /// The RV32I subset table.
    pub fn rv32i() -> Result<Catalog, EncodeError> {
        let mut c = Catalog::default();
        c.insert("lui", utype(OP_LUI));
        c.insert("auipc", utype(OP_AUIPC));
        c.insert("jal", jtype(OP_JAL));
        c.insert("beq", btype(0b000));
        c.insert("bne", btype(0b001));
        c.insert("lb", itype(0b000, OP_LOAD));
        c.insert("lh", itype(0b001, OP_LOAD));
        c.insert("lw", itype(0b010, OP_LOAD));
        c.insert("lbu", itype(0b100, OP_LOAD));
        c.insert("lhu", itype(0b101, OP_LOAD));
        c.insert("addi", itype(0b000, OP_IMM));
        c.insert("slli", shift_imm(0b000000, 0b001));
        c.insert("add", rtype(0b0000000, 0b000));
        c.insert("sub", rtype(0b0100000, 0b000));

        let st = store();
        c.insert_pinned(&st, "width", &[("sb", 0b000), ("sh", 0b001), ("sw", 0b010)])?;
        c.insert("store", st);
        Ok(c)
    }
}

/// Process-wide catalog, built on first use. A table that fails to build
/// keeps failing with the same error.
pub fn catalog() -> Result<&'static Catalog, EncodeError> {
    static CATALOG: OnceLock<Result<Catalog, EncodeError>> = OnceLock::new();
    CATALOG
        .get_or_init(|| {
            let built = Catalog::rv32i();
            match &built {
                Ok(c) => debug!(formats = c.len(), "built instruction catalog"),
                Err(e) => error!(error = %e, "instruction catalog failed to build"),
            }
            built
        })
        .as_ref()
        .map_err(Clone::clone)
}
