use crate::error::CoreError;
use crate::framebuffer::FrameBuffer;
use crate::memory::Memory;
use crate::operations as ops;
use crate::state::Cpu;

type Handler = fn(&mut Cpu, &mut Memory, &mut FrameBuffer, u16) -> Result<(), CoreError>;

/// The decode table: the first row whose `(opcode & mask) == pattern` wins.
///
/// Opcode families overlap, so the order is load-bearing: the fully-fixed
/// patterns (00E0, 00EE) come before the wide 4-bit families, and the E/F
/// families use 0xF0FF masks. Do not reorder. The 0NNN row can never match
/// any opcode; it is kept so the table reads as the complete 35-entry set.
#[rustfmt::skip]
const DISPATCH_TABLE: [(u16, u16, Handler); 35] = [
    (0x0000, 0xFFFF, ops::sys),   // 0NNN (never matched)
    (0xFFFF, 0x00E0, ops::cls),   // 00E0
    (0xFFFF, 0x00EE, ops::rts),   // 00EE
    (0xF000, 0x1000, ops::jump),  // 1NNN
    (0xF000, 0x2000, ops::call),  // 2NNN
    (0xF000, 0x3000, ops::ske),   // 3XNN
    (0xF000, 0x4000, ops::skne),  // 4XNN
    (0xF00F, 0x5000, ops::skre),  // 5XY0
    (0xF000, 0x6000, ops::load),  // 6XNN
    (0xF000, 0x7000, ops::add),   // 7XNN
    (0xF00F, 0x8000, ops::mv),    // 8XY0
    (0xF00F, 0x8001, ops::or),    // 8XY1
    (0xF00F, 0x8002, ops::and),   // 8XY2
    (0xF00F, 0x8003, ops::xor),   // 8XY3
    (0xF00F, 0x8004, ops::addr),  // 8XY4
    (0xF00F, 0x8005, ops::sub),   // 8XY5
    (0xF00F, 0x8006, ops::shr),   // 8XY6
    (0xF00F, 0x8007, ops::subn),  // 8XY7
    (0xF00F, 0x800E, ops::shl),   // 8XYE
    (0xF00F, 0x9000, ops::skrne), // 9XY0
    (0xF000, 0xA000, ops::loadi), // ANNN
    (0xF000, 0xB000, ops::jumpi), // BNNN
    (0xF000, 0xC000, ops::rnd),   // CXNN
    (0xF000, 0xD000, ops::draw),  // DXYN
    (0xF0FF, 0xE09E, ops::skpr),  // EX9E
    (0xF0FF, 0xE0A1, ops::skup),  // EXA1
    (0xF0FF, 0xF007, ops::moved), // FX07
    (0xF0FF, 0xF00A, ops::keyd),  // FX0A
    (0xF0FF, 0xF015, ops::loadd), // FX15
    (0xF0FF, 0xF018, ops::loads), // FX18
    (0xF0FF, 0xF01E, ops::addi),  // FX1E
    (0xF0FF, 0xF029, ops::ldspr), // FX29
    (0xF0FF, 0xF033, ops::bcd),   // FX33
    (0xF0FF, 0xF055, ops::stor),  // FX55
    (0xF0FF, 0xF065, ops::read),  // FX65
];

/// One fetch-decode-dispatch-execute cycle.
///
/// Fetches the word at PC, runs the first matching handler, then advances
/// PC by 2. A word that matches no row violates the closed instruction set
/// and fails the cycle.
pub fn step(cpu: &mut Cpu, mem: &mut Memory, frame: &mut FrameBuffer) -> Result<(), CoreError> {
    let op = mem.fetch(cpu.pc)?;
    let handler = DISPATCH_TABLE
        .iter()
        .find(|&&(mask, pattern, _)| op & mask == pattern)
        .map(|&(_, _, handler)| handler)
        .ok_or(CoreError::UnknownOpcode { op, pc: cpu.pc })?;
    handler(cpu, mem, frame, op)?;
    cpu.pc = cpu.pc.wrapping_add(2);
    Ok(())
}

#[cfg(test)]
mod test_dispatch {
    use super::*;
    use crate::constants::{MEM_SIZE, STACK_DEPTH};
    use crate::state::Mode;

    fn machine() -> (Cpu, Memory, FrameBuffer) {
        (Cpu::new(), Memory::new(), FrameBuffer::new())
    }

    /// Write `op` at the current PC and execute one cycle.
    fn step_op(cpu: &mut Cpu, mem: &mut Memory, frame: &mut FrameBuffer, op: u16) {
        mem.write(cpu.pc as usize, (op >> 8) as u8).unwrap();
        mem.write(cpu.pc as usize + 1, (op & 0xFF) as u8).unwrap();
        step(cpu, mem, frame).unwrap();
    }

    #[test]
    fn test_unknown_opcode_is_fatal() {
        let (mut cpu, mut mem, mut frame) = machine();
        mem.write(0x200, 0x01).unwrap();
        mem.write(0x201, 0x23).unwrap();
        assert!(matches!(
            step(&mut cpu, &mut mem, &mut frame),
            Err(CoreError::UnknownOpcode { op: 0x0123, pc: 0x200 })
        ));
    }

    #[test]
    fn test_fetch_past_end_of_memory_is_fatal() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.pc = (MEM_SIZE - 1) as u16;
        assert!(matches!(
            step(&mut cpu, &mut mem, &mut frame),
            Err(CoreError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_00e0_cls() {
        let (mut cpu, mut mem, mut frame) = machine();
        frame.toggle(10, 10);
        frame.take_dirty();
        step_op(&mut cpu, &mut mem, &mut frame, 0x00E0);
        assert_eq!(frame.pixel(10, 10), 0);
        // the whole grid is reported dirty
        assert_eq!(frame.dirty().last().unwrap().w, 64);
        assert_eq!(cpu.pc, 0x202);
    }

    #[test]
    fn test_2nnn_then_00ee_returns_past_the_call() {
        let (mut cpu, mut mem, mut frame) = machine();
        step_op(&mut cpu, &mut mem, &mut frame, 0x2ABC);
        assert_eq!(cpu.pc, 0x0ABC);
        assert_eq!(cpu.sp, 1);
        assert_eq!(cpu.stack[0], 0x200);
        step_op(&mut cpu, &mut mem, &mut frame, 0x00EE);
        assert_eq!(cpu.pc, 0x202);
        assert_eq!(cpu.sp, 0);
    }

    #[test]
    fn test_00ee_with_empty_stack_is_a_noop() {
        let (mut cpu, mut mem, mut frame) = machine();
        step_op(&mut cpu, &mut mem, &mut frame, 0x00EE);
        assert_eq!(cpu.pc, 0x202);
        assert_eq!(cpu.sp, 0);
    }

    #[test]
    fn test_2nnn_with_full_stack_is_a_noop() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.sp = STACK_DEPTH as u8;
        step_op(&mut cpu, &mut mem, &mut frame, 0x2ABC);
        assert_eq!(cpu.pc, 0x202);
        assert_eq!(cpu.sp, STACK_DEPTH as u8);
    }

    #[test]
    fn test_1nnn_jumps_exactly_to_target() {
        let (mut cpu, mut mem, mut frame) = machine();
        step_op(&mut cpu, &mut mem, &mut frame, 0x1ABC);
        assert_eq!(cpu.pc, 0x0ABC);
    }

    #[test]
    fn test_6xnn_then_3xnn_skips_once() {
        let (mut cpu, mut mem, mut frame) = machine();
        step_op(&mut cpu, &mut mem, &mut frame, 0x6111);
        let pc = cpu.pc;
        step_op(&mut cpu, &mut mem, &mut frame, 0x3111);
        assert_eq!(cpu.pc, pc + 4);
    }

    #[test]
    fn test_3xnn_falls_through_on_mismatch() {
        let (mut cpu, mut mem, mut frame) = machine();
        step_op(&mut cpu, &mut mem, &mut frame, 0x3111);
        assert_eq!(cpu.pc, 0x202);
    }

    #[test]
    fn test_4xnn_skips_on_mismatch() {
        let (mut cpu, mut mem, mut frame) = machine();
        step_op(&mut cpu, &mut mem, &mut frame, 0x4111);
        assert_eq!(cpu.pc, 0x204);
        step_op(&mut cpu, &mut mem, &mut frame, 0x4100);
        assert_eq!(cpu.pc, 0x206);
    }

    #[test]
    fn test_5xy0_skips_on_equal_registers() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0x11;
        cpu.v[2] = 0x11;
        step_op(&mut cpu, &mut mem, &mut frame, 0x5120);
        assert_eq!(cpu.pc, 0x204);
    }

    #[test]
    fn test_9xy0_skips_on_unequal_registers() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0x11;
        step_op(&mut cpu, &mut mem, &mut frame, 0x9120);
        assert_eq!(cpu.pc, 0x204);
        cpu.v[2] = 0x11;
        step_op(&mut cpu, &mut mem, &mut frame, 0x9120);
        assert_eq!(cpu.pc, 0x206);
    }

    #[test]
    fn test_6xnn_ld() {
        let (mut cpu, mut mem, mut frame) = machine();
        step_op(&mut cpu, &mut mem, &mut frame, 0x6A22);
        assert_eq!(cpu.v[0xA], 0x22);
    }

    #[test]
    fn test_7xnn_wraps_without_touching_vf() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0xFF;
        cpu.v[0xF] = 0x5;
        step_op(&mut cpu, &mut mem, &mut frame, 0x7102);
        assert_eq!(cpu.v[1], 0x01);
        assert_eq!(cpu.v[0xF], 0x5);
    }

    #[test]
    fn test_8xy0_mv() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[2] = 0x42;
        step_op(&mut cpu, &mut mem, &mut frame, 0x8120);
        assert_eq!(cpu.v[1], 0x42);
    }

    #[test]
    fn test_8xy1_8xy2_8xy3_bitwise() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0x6;
        cpu.v[2] = 0x3;
        step_op(&mut cpu, &mut mem, &mut frame, 0x8121);
        assert_eq!(cpu.v[1], 0x7);
        step_op(&mut cpu, &mut mem, &mut frame, 0x8122);
        assert_eq!(cpu.v[1], 0x3);
        step_op(&mut cpu, &mut mem, &mut frame, 0x8123);
        assert_eq!(cpu.v[1], 0x0);
    }

    #[test]
    fn test_8xy4_add_with_carry() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0xFF;
        cpu.v[2] = 0x01;
        step_op(&mut cpu, &mut mem, &mut frame, 0x8124);
        assert_eq!(cpu.v[1], 0x00);
        assert_eq!(cpu.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy4_add_without_carry() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0x01;
        cpu.v[2] = 0x01;
        step_op(&mut cpu, &mut mem, &mut frame, 0x8124);
        assert_eq!(cpu.v[1], 0x02);
        assert_eq!(cpu.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy5_sub_with_borrow() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0x01;
        cpu.v[2] = 0x02;
        step_op(&mut cpu, &mut mem, &mut frame, 0x8125);
        assert_eq!(cpu.v[1], 0xFF);
        assert_eq!(cpu.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy5_sub_without_borrow() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0x02;
        cpu.v[2] = 0x01;
        step_op(&mut cpu, &mut mem, &mut frame, 0x8125);
        assert_eq!(cpu.v[1], 0x01);
        assert_eq!(cpu.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy6_shr_captures_lsb() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0x5;
        step_op(&mut cpu, &mut mem, &mut frame, 0x8126);
        assert_eq!(cpu.v[1], 0x2);
        assert_eq!(cpu.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy7_subn() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0x01;
        cpu.v[2] = 0x03;
        step_op(&mut cpu, &mut mem, &mut frame, 0x8127);
        assert_eq!(cpu.v[1], 0x02);
        assert_eq!(cpu.v[0xF], 0x1);
        cpu.v[1] = 0x03;
        cpu.v[2] = 0x01;
        step_op(&mut cpu, &mut mem, &mut frame, 0x8127);
        assert_eq!(cpu.v[1], 0xFE);
        assert_eq!(cpu.v[0xF], 0x0);
    }

    #[test]
    fn test_8xye_shl_captures_msb() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0xFF;
        step_op(&mut cpu, &mut mem, &mut frame, 0x812E);
        assert_eq!(cpu.v[1], 0xFE);
        assert_eq!(cpu.v[0xF], 0x1);
    }

    #[test]
    fn test_annn_ld() {
        let (mut cpu, mut mem, mut frame) = machine();
        step_op(&mut cpu, &mut mem, &mut frame, 0xAABC);
        assert_eq!(cpu.i, 0xABC);
    }

    #[test]
    fn test_bnnn_jumps_with_offset() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[0] = 0x2;
        step_op(&mut cpu, &mut mem, &mut frame, 0xBABC);
        assert_eq!(cpu.pc, 0xABE);
    }

    #[test]
    fn test_cxnn_stays_within_bound() {
        let (mut cpu, mut mem, mut frame) = machine();
        for _ in 0..32 {
            step_op(&mut cpu, &mut mem, &mut frame, 0xC10F);
            assert!(cpu.v[1] <= 0x0F);
            cpu.pc = 0x200;
        }
    }

    #[test]
    fn test_cxnn_with_zero_bound_yields_zero() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0xAA;
        step_op(&mut cpu, &mut mem, &mut frame, 0xC100);
        assert_eq!(cpu.v[1], 0);
    }

    #[test]
    fn test_dxyn_draws_the_zero_glyph() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[0] = 0x1;
        // glyph 0 lives at I = 0; draw it with a 1x 1y offset
        step_op(&mut cpu, &mut mem, &mut frame, 0xD005);
        let expected = [
            [1, 1, 1, 1],
            [1, 0, 0, 1],
            [1, 0, 0, 1],
            [1, 0, 0, 1],
            [1, 1, 1, 1],
        ];
        for (dy, row) in expected.iter().enumerate() {
            for (dx, &px) in row.iter().enumerate() {
                assert_eq!(frame.pixel(1 + dx, 1 + dy), px);
            }
        }
        assert_eq!(cpu.v[0xF], 0x0);
        assert_eq!(cpu.i, 0);
    }

    #[test]
    fn test_dxyn_double_draw_restores_and_collides() {
        let (mut cpu, mut mem, mut frame) = machine();
        step_op(&mut cpu, &mut mem, &mut frame, 0xD005);
        assert_eq!(cpu.v[0xF], 0x0);
        cpu.pc = 0x200;
        step_op(&mut cpu, &mut mem, &mut frame, 0xD005);
        assert_eq!(cpu.v[0xF], 0x1);
        assert!(frame.pixels().iter().flatten().all(|&p| p == 0));
    }

    #[test]
    fn test_dxyn_skips_offgrid_pixels_instead_of_wrapping() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[0] = 62;
        cpu.v[1] = 0;
        step_op(&mut cpu, &mut mem, &mut frame, 0xD011);
        // glyph 0 top row is 0xF0: bits land on x = 62, 63 and clip there
        assert_eq!(frame.pixel(62, 0), 1);
        assert_eq!(frame.pixel(63, 0), 1);
        assert_eq!(frame.pixel(0, 0), 0);
        assert_eq!(frame.pixel(1, 0), 0);
    }

    #[test]
    fn test_dxyn_records_toggled_pixels_as_dirty() {
        let (mut cpu, mut mem, mut frame) = machine();
        step_op(&mut cpu, &mut mem, &mut frame, 0xD001);
        // glyph 0 top row has four set bits
        assert_eq!(frame.dirty().len(), 4);
    }

    #[test]
    fn test_dxyn_reading_past_memory_is_fatal() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.i = (MEM_SIZE - 1) as u16;
        mem.write(0x200, 0xD0).unwrap();
        mem.write(0x201, 0x02).unwrap();
        assert!(matches!(
            step(&mut cpu, &mut mem, &mut frame),
            Err(CoreError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_ex9e_skips_when_key_pressed() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0xE;
        cpu.keys[0xE] = true;
        step_op(&mut cpu, &mut mem, &mut frame, 0xE19E);
        assert_eq!(cpu.pc, 0x204);
        cpu.keys[0xE] = false;
        step_op(&mut cpu, &mut mem, &mut frame, 0xE19E);
        assert_eq!(cpu.pc, 0x206);
    }

    #[test]
    fn test_exa1_skips_when_key_released() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0xE;
        step_op(&mut cpu, &mut mem, &mut frame, 0xE1A1);
        assert_eq!(cpu.pc, 0x204);
        cpu.keys[0xE] = true;
        step_op(&mut cpu, &mut mem, &mut frame, 0xE1A1);
        assert_eq!(cpu.pc, 0x206);
    }

    #[test]
    fn test_fx07_reads_delay_timer() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.delay_timer = 0xF;
        step_op(&mut cpu, &mut mem, &mut frame, 0xF107);
        assert_eq!(cpu.v[1], 0xF);
    }

    #[test]
    fn test_fx0a_suspends_the_interpreter() {
        let (mut cpu, mut mem, mut frame) = machine();
        step_op(&mut cpu, &mut mem, &mut frame, 0xF30A);
        assert_eq!(cpu.mode, Mode::AwaitingKey { dest: 0x3 });
        assert_eq!(cpu.pc, 0x202);
    }

    #[test]
    fn test_fx15_fx18_set_timers() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0x20;
        step_op(&mut cpu, &mut mem, &mut frame, 0xF115);
        assert_eq!(cpu.delay_timer, 0x20);
        step_op(&mut cpu, &mut mem, &mut frame, 0xF118);
        assert_eq!(cpu.sound_timer, 0x20);
    }

    #[test]
    fn test_fx1e_sets_vf_past_0xfff() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.i = 0xFFF;
        cpu.v[1] = 0x1;
        step_op(&mut cpu, &mut mem, &mut frame, 0xF11E);
        assert_eq!(cpu.i, 0x1000);
        assert_eq!(cpu.v[0xF], 0x1);
    }

    #[test]
    fn test_fx1e_clears_vf_within_range() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.i = 0xFFE;
        cpu.v[1] = 0x1;
        cpu.v[0xF] = 0x1;
        step_op(&mut cpu, &mut mem, &mut frame, 0xF11E);
        assert_eq!(cpu.i, 0xFFF);
        assert_eq!(cpu.v[0xF], 0x0);
    }

    #[test]
    fn test_fx29_locates_glyphs() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 0x2;
        step_op(&mut cpu, &mut mem, &mut frame, 0xF129);
        assert_eq!(cpu.i, 0xA);
    }

    #[test]
    fn test_fx33_stores_decimal_digits() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.v[1] = 156;
        cpu.i = 0x300;
        step_op(&mut cpu, &mut mem, &mut frame, 0xF133);
        assert_eq!(mem.read(0x300).unwrap(), 1);
        assert_eq!(mem.read(0x301).unwrap(), 5);
        assert_eq!(mem.read(0x302).unwrap(), 6);
    }

    #[test]
    fn test_fx55_fx65_round_trip() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.i = 0x300;
        cpu.v[0..4].copy_from_slice(&[0x1, 0x2, 0x3, 0x4]);
        step_op(&mut cpu, &mut mem, &mut frame, 0xF355);
        cpu.v = [0; 16];
        step_op(&mut cpu, &mut mem, &mut frame, 0xF365);
        assert_eq!(cpu.v[0..4], [0x1, 0x2, 0x3, 0x4]);
    }

    #[test]
    fn test_fx55_past_memory_is_fatal() {
        let (mut cpu, mut mem, mut frame) = machine();
        cpu.i = (MEM_SIZE - 2) as u16;
        mem.write(0x200, 0xF5).unwrap();
        mem.write(0x201, 0x55).unwrap();
        assert!(matches!(
            step(&mut cpu, &mut mem, &mut frame),
            Err(CoreError::OutOfBounds { .. })
        ));
    }
}
