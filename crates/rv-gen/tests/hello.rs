use pretty_assertions::assert_eq;
use rv_gen::program::load_address;
use rv_gen::{assemble, encode_program, hello_world, AddressLoad, Board, Insn, Preset};
use rv_macroasm::catalog;

fn words(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[test]
fn qemu_virt_image() {
    let prog = hello_world(&Preset::QemuVirt.board(), "Hello, World!\n").unwrap();
    assert_eq!(prog.len(), 2 + 2 * 14);
    let bin = assemble(catalog().unwrap(), &prog).unwrap();
    assert_eq!(bin.len(), prog.len() * 4);

    let w = words(&bin);
    // addi x1, x0, 1 ; slli x1, x1, 28
    assert_eq!(&w[..2], &[0x0010_0093, 0x01C0_9093]);
    // addi x2, x0, 'H' ; sb x2, 0(x1)
    assert_eq!(&w[2..4], &[0x0480_0113, 0x0020_8023]);
    // last char is '\n'
    assert_eq!(&w[w.len() - 2..], &[0x00A0_0113, 0x0020_8023]);
}

#[test]
fn sifive_u_image_uses_lui_and_word_stores() {
    let prog = hello_world(&Preset::SifiveU.board(), "Hi").unwrap();
    let bin = assemble(catalog().unwrap(), &prog).unwrap();
    assert_eq!(
        words(&bin),
        vec![0x1001_00B7, 0x0480_0113, 0x0020_A023, 0x0690_0113, 0x0020_A023]
    );
}

#[test]
fn first_word_bytes_are_little_endian() {
    let prog = hello_world(&Preset::QemuVirt.board(), "").unwrap();
    let bin = assemble(catalog().unwrap(), &prog).unwrap();
    assert_eq!(&bin[..4], &[0x93, 0x00, 0x10, 0x00]);
}

#[test]
fn lui_load_rounds_for_negative_low_part() {
    let prog = load_address(1, 0x1000_0800, AddressLoad::Lui).unwrap();
    assert_eq!(
        prog,
        vec![
            Insn::new("lui", [("imm", 0x10001), ("rd", 1)]),
            Insn::new("addi", [("imm", 0x800), ("rs1", 1), ("rd", 1)]),
        ]
    );

    let prog = load_address(3, 0x123, AddressLoad::Lui).unwrap();
    assert_eq!(prog, vec![Insn::new("addi", [("imm", 0x123), ("rs1", 0), ("rd", 3)])]);
}

#[test]
fn addi_slli_needs_power_of_two() {
    assert!(load_address(1, 0x1001_0000, AddressLoad::AddiSlli).is_err());
    assert_eq!(load_address(1, 1 << 12, AddressLoad::AddiSlli).unwrap().len(), 2);
}

#[test]
fn custom_board_from_json() {
    let board = Board::from_json(
        r#"{ "name": "custom", "uart_base": 536870912, "store_width": 1, "address_load": "addi-slli" }"#,
    )
    .unwrap();
    let prog = hello_world(&board, "A").unwrap();
    let enc = encode_program(catalog().unwrap(), &prog).unwrap();
    assert_eq!(enc.last().unwrap().mnemonic, "store");
    // sh x2, 0(x1)
    assert_eq!(enc.last().unwrap().word.value(), Some(0x0020_9023));
}

#[test]
fn bad_store_width_is_rejected() {
    let mut board = Preset::QemuVirt.board();
    board.store_width = 3;
    assert!(hello_world(&board, "x").is_err());
}

#[test]
fn unknown_mnemonic_is_an_error() {
    let prog = vec![Insn::new("mul", [("rd", 1)])];
    let err = assemble(catalog().unwrap(), &prog).unwrap_err();
    assert!(err.to_string().contains("unknown mnemonic"));
}

#[test]
fn encode_errors_carry_context() {
    let prog = vec![Insn::new("addi", [("imm", 1), ("rd", 1)])];
    let err = assemble(catalog().unwrap(), &prog).unwrap_err();
    assert!(err.to_string().contains("encoding #0 `addi`"));
    assert!(format!("{err:#}").contains("missing value for field `rs1`"));
}
