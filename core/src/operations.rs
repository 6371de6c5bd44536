use log::warn;
use rand::Rng;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_GLYPH_SIZE, STACK_DEPTH};
use crate::error::CoreError;
use crate::framebuffer::FrameBuffer;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::state::{Cpu, Mode};

/// Every handler mutates the machine in place and returns nothing on
/// success. The dispatcher advances PC by 2 after the handler runs, so the
/// jump handlers (1NNN, 2NNN, BNNN) set `PC = target - 2` to compensate;
/// this is part of the handler contract, not an accident.
///
/// Stack underflow and overflow are recoverable: they are logged and the
/// instruction becomes a no-op. Out-of-range memory access is fatal.

/// 0NNN: machine routine call. The dispatch table entry for it can never
/// match, so this handler is unreachable; it exists to keep the table
/// congruent with the documented 35-instruction set.
pub fn sys(
    _cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    _op: u16,
) -> Result<(), CoreError> {
    Ok(())
}

/// 00E0: clear the framebuffer.
pub fn cls(
    _cpu: &mut Cpu,
    _mem: &mut Memory,
    frame: &mut FrameBuffer,
    _op: u16,
) -> Result<(), CoreError> {
    frame.clear();
    Ok(())
}

/// 00EE: PC = stack.pop()
pub fn rts(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    _op: u16,
) -> Result<(), CoreError> {
    if cpu.sp == 0 {
        warn!("return with an empty stack at {:#05X}; ignoring", cpu.pc);
        return Ok(());
    }
    cpu.sp -= 1;
    cpu.pc = cpu.stack[cpu.sp as usize];
    Ok(())
}

/// 1NNN: PC = NNN
pub fn jump(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.pc = op.nnn().wrapping_sub(2);
    Ok(())
}

/// 2NNN: stack.push(PC); PC = NNN
pub fn call(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    if cpu.sp as usize == STACK_DEPTH {
        warn!("call with a full stack at {:#05X}; ignoring", cpu.pc);
        return Ok(());
    }
    cpu.stack[cpu.sp as usize] = cpu.pc;
    cpu.sp += 1;
    cpu.pc = op.nnn().wrapping_sub(2);
    Ok(())
}

/// 3XNN: if Vx == NN skip the next instruction
pub fn ske(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    if cpu.v[op.x() as usize] == op.nn() {
        cpu.skip();
    }
    Ok(())
}

/// 4XNN: if Vx != NN skip the next instruction
pub fn skne(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    if cpu.v[op.x() as usize] != op.nn() {
        cpu.skip();
    }
    Ok(())
}

/// 5XY0: if Vx == Vy skip the next instruction
pub fn skre(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    if cpu.v[op.x() as usize] == cpu.v[op.y() as usize] {
        cpu.skip();
    }
    Ok(())
}

/// 6XNN: Vx = NN
pub fn load(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.v[op.x() as usize] = op.nn();
    Ok(())
}

/// 7XNN: Vx += NN, wrapping, no flag
pub fn add(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    let x = op.x() as usize;
    cpu.v[x] = cpu.v[x].wrapping_add(op.nn());
    Ok(())
}

/// 8XY0: Vx = Vy
pub fn mv(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.v[op.x() as usize] = cpu.v[op.y() as usize];
    Ok(())
}

/// 8XY1: Vx |= Vy
pub fn or(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.v[op.x() as usize] |= cpu.v[op.y() as usize];
    Ok(())
}

/// 8XY2: Vx &= Vy
pub fn and(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.v[op.x() as usize] &= cpu.v[op.y() as usize];
    Ok(())
}

/// 8XY3: Vx ^= Vy
pub fn xor(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.v[op.x() as usize] ^= cpu.v[op.y() as usize];
    Ok(())
}

/// 8XY4: Vx += Vy; VF = carry
pub fn addr(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    let x = op.x() as usize;
    let (sum, carry) = cpu.v[x].overflowing_add(cpu.v[op.y() as usize]);
    cpu.v[0xF] = carry as u8;
    cpu.v[x] = sum;
    Ok(())
}

/// 8XY5: Vx -= Vy; VF = !borrow
pub fn sub(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    let x = op.x() as usize;
    let (diff, borrow) = cpu.v[x].overflowing_sub(cpu.v[op.y() as usize]);
    cpu.v[0xF] = !borrow as u8;
    cpu.v[x] = diff;
    Ok(())
}

/// 8XY6: VF = Vx & 1; Vx >>= 1
pub fn shr(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    let x = op.x() as usize;
    cpu.v[0xF] = cpu.v[x] & 1;
    cpu.v[x] >>= 1;
    Ok(())
}

/// 8XY7: Vx = Vy - Vx; VF = !borrow
pub fn subn(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    let x = op.x() as usize;
    let (diff, borrow) = cpu.v[op.y() as usize].overflowing_sub(cpu.v[x]);
    cpu.v[0xF] = !borrow as u8;
    cpu.v[x] = diff;
    Ok(())
}

/// 8XYE: VF = Vx >> 7; Vx <<= 1
pub fn shl(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    let x = op.x() as usize;
    cpu.v[0xF] = (cpu.v[x] >> 7) & 1;
    cpu.v[x] <<= 1;
    Ok(())
}

/// 9XY0: if Vx != Vy skip the next instruction
pub fn skrne(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    if cpu.v[op.x() as usize] != cpu.v[op.y() as usize] {
        cpu.skip();
    }
    Ok(())
}

/// ANNN: I = NNN
pub fn loadi(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.i = op.nnn();
    Ok(())
}

/// BNNN: PC = V0 + NNN
pub fn jumpi(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.pc = (u16::from(cpu.v[0]) + op.nnn()).wrapping_sub(2);
    Ok(())
}

/// CXNN: Vx = random in 0..=NN
pub fn rnd(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.v[op.x() as usize] = rand::thread_rng().gen_range(0..=op.nn());
    Ok(())
}

/// DXYN: XOR-draw the N-byte sprite at mem[I..] to (Vx, Vy); VF = collision
///
/// Sprite rows are 8 pixels wide, most significant bit leftmost. Off-grid
/// pixels are skipped, not wrapped. A collision is a pixel that was on and
/// is turned off by the draw. I is left untouched.
pub fn draw(
    cpu: &mut Cpu,
    mem: &mut Memory,
    frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.v[0xF] = 0;
    let x0 = cpu.v[op.x() as usize] as usize;
    let y0 = cpu.v[op.y() as usize] as usize;

    for row in 0..op.n() as usize {
        let bits = mem.read(cpu.i as usize + row)?;
        let y = y0 + row;
        if y >= DISPLAY_HEIGHT {
            continue;
        }
        for bit in 0..8 {
            let x = x0 + bit;
            if x >= DISPLAY_WIDTH {
                continue;
            }
            if (bits >> (7 - bit)) & 1 == 1 && frame.toggle(x, y) == 0 {
                cpu.v[0xF] = 1;
            }
        }
    }
    Ok(())
}

/// EX9E: if key Vx is pressed skip the next instruction
pub fn skpr(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    if cpu.keys[cpu.v[op.x() as usize] as usize & 0xF] {
        cpu.skip();
    }
    Ok(())
}

/// EXA1: if key Vx is released skip the next instruction
pub fn skup(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    if !cpu.keys[cpu.v[op.x() as usize] as usize & 0xF] {
        cpu.skip();
    }
    Ok(())
}

/// FX07: Vx = delay timer
pub fn moved(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.v[op.x() as usize] = cpu.delay_timer;
    Ok(())
}

/// FX0A: suspend until the next key-down event lands in Vx
pub fn keyd(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.mode = Mode::AwaitingKey { dest: op.x() };
    Ok(())
}

/// FX15: delay timer = Vx
pub fn loadd(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.delay_timer = cpu.v[op.x() as usize];
    Ok(())
}

/// FX18: sound timer = Vx
pub fn loads(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.sound_timer = cpu.v[op.x() as usize];
    Ok(())
}

/// FX1E: I += Vx; VF = 1 when the sum passes 0xFFF
pub fn addi(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    let sum = u32::from(cpu.i) + u32::from(cpu.v[op.x() as usize]);
    cpu.v[0xF] = (sum > 0xFFF) as u8;
    cpu.i = sum as u16;
    Ok(())
}

/// FX29: I = address of the built-in glyph for Vx
pub fn ldspr(
    cpu: &mut Cpu,
    _mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    cpu.i = FONT_GLYPH_SIZE * u16::from(cpu.v[op.x() as usize]);
    Ok(())
}

/// FX33: mem[I..I+3] = the decimal digits of Vx
pub fn bcd(
    cpu: &mut Cpu,
    mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    let value = cpu.v[op.x() as usize];
    let i = cpu.i as usize;
    mem.write(i, value / 100)?;
    mem.write(i + 1, (value / 10) % 10)?;
    mem.write(i + 2, value % 10)?;
    Ok(())
}

/// FX55: mem[I..=I+X] = V0..=Vx
pub fn stor(
    cpu: &mut Cpu,
    mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    for offset in 0..=op.x() as usize {
        mem.write(cpu.i as usize + offset, cpu.v[offset])?;
    }
    Ok(())
}

/// FX65: V0..=Vx = mem[I..=I+X]
pub fn read(
    cpu: &mut Cpu,
    mem: &mut Memory,
    _frame: &mut FrameBuffer,
    op: u16,
) -> Result<(), CoreError> {
    for offset in 0..=op.x() as usize {
        cpu.v[offset] = mem.read(cpu.i as usize + offset)?;
    }
    Ok(())
}
