use std::convert::TryFrom;

use chip8_core::{
    chip8::ChipSet,
    opcode::Instruction,
    resources::Rom,
    timer::Worker,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// LD V0,0x05; ADD V0,0x01; JP 0x200
const LOOP_IMAGE: &[u8] = &[0x60, 0x05, 0x70, 0x01, 0x12, 0x00];

fn get_default_chip() -> ChipSet<Worker> {
    let rom = Rom::new("LOOP", LOOP_IMAGE).expect("The bench image always fits into ram.");
    ChipSet::new(rom)
}

pub fn step_bench(c: &mut Criterion) {
    let mut chip = get_default_chip();
    c.bench_function("step_bench", |b| {
        b.iter(|| {
            chip.next().expect("The bench image runs without a fault.");
        });
    });
}

pub fn decode_bench(c: &mut Criterion) {
    c.bench_function("decode_bench", |b| {
        b.iter(|| {
            for opcode in [0x00E0, 0x1234, 0x8124, 0xD122, 0xF465] {
                let _ = Instruction::try_from(black_box(opcode));
            }
        });
    });
}

criterion_group!(benches, step_bench, decode_bench);
criterion_main!(benches);
