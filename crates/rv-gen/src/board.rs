use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the UART address gets into a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressLoad {
    /// `lui` plus an `addi` when the low 12 bits are non-zero
    #[default]
    Lui,
    /// `addi 1` then `slli`; the address must be a power of two
    AddiSlli,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub name: String,
    pub uart_base: u32,
    /// Store width code: 0 byte, 1 half, 2 word
    #[serde(default)]
    pub store_width: u8,
    #[serde(default)]
    pub address_load: AddressLoad,
}

impl Board {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid board description")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading board description {}", path.display()))?;
        Self::from_json(&text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// QEMU `virt` machine, 16550 UART at 0x1000_0000
    QemuVirt,
    /// QEMU `sifive_u`, UART0 at 0x1001_0000 (needs word stores)
    SifiveU,
}

impl Preset {
    pub fn board(self) -> Board {
        match self {
            Preset::QemuVirt => Board {
                name: "qemu-virt".into(),
                uart_base: 0x1000_0000,
                store_width: 0,
                address_load: AddressLoad::AddiSlli,
            },
            Preset::SifiveU => Board {
                name: "sifive-u".into(),
                uart_base: 0x1001_0000,
                store_width: 2,
                address_load: AddressLoad::Lui,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults() {
        let b = Board::from_json(r#"{ "name": "x", "uart_base": 268435456 }"#).unwrap();
        assert_eq!(b.store_width, 0);
        assert_eq!(b.address_load, AddressLoad::Lui);

        let b = Board::from_json(
            r#"{ "name": "y", "uart_base": 4096, "store_width": 2, "address_load": "addi-slli" }"#,
        )
        .unwrap();
        assert_eq!(b.address_load, AddressLoad::AddiSlli);
    }

    #[test]
    fn preset_roundtrips_through_json() {
        let b = Preset::SifiveU.board();
        let text = serde_json::to_string(&b).unwrap();
        assert_eq!(Board::from_json(&text).unwrap(), b);
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("rv_gen_board_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "name": "f", "uart_base": 16 }"#).unwrap();
        let b = Board::load(&path).unwrap();
        assert_eq!(b.uart_base, 16);
        let _ = std::fs::remove_file(&path);
        assert!(Board::load(&path).is_err());
    }
}
