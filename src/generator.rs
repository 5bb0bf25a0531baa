//! Plot generation and deadline checking
//!
//! The generator is the deterministic heart of the protocol: a backward
//! cascading Shabal-256 chain seeded from `(account, nonce)` fills one
//! `PLOT_SIZE` buffer, then the whole buffer is XOR-folded with a final
//! digest. The deadline check hashes the round's generation signature with
//! one scoop of that data and divides the result by the base target.

use crate::round::RoundContext;
use crate::types::{Deadline, GenerationSignature, GEN_SIZE, HASH_SIZE, PLOT_SIZE, SCOOPS_PER_PLOT, SCOOP_SIZE};
use crate::{Error, PlotFile, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use shabal::{Digest, Shabal256};
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

/// Upper bound on the input window of each cascade step, in bytes.
/// Protocol constant; numerically equal to `SCOOPS_PER_PLOT`.
const HASH_CAP: usize = 4096;

/// Generate the plot data for one `(account, nonce)` pair.
///
/// Returns the full `GEN_SIZE` working buffer: `PLOT_SIZE` bytes of scoop
/// data followed by the 16-byte big-endian seed tail. Pure and
/// deterministic; identical inputs always produce identical bytes.
pub fn generate(account: u64, nonce: u64) -> Vec<u8> {
    let mut gendata = vec![0u8; GEN_SIZE];
    BigEndian::write_u64(&mut gendata[PLOT_SIZE..PLOT_SIZE + 8], account);
    BigEndian::write_u64(&mut gendata[PLOT_SIZE + 8..], nonce);

    // Backward cascade: each digest lands immediately before the window it
    // was computed from, terminating exactly at offset 0.
    let mut offset = PLOT_SIZE;
    while offset > 0 {
        let len = (GEN_SIZE - offset).min(HASH_CAP);
        let digest = Shabal256::digest(&gendata[offset..offset + len]);
        gendata[offset - HASH_SIZE..offset].copy_from_slice(digest.as_slice());
        offset -= HASH_SIZE;
    }

    let final_digest = Shabal256::digest(&gendata[..]);
    for (i, byte) in gendata[..PLOT_SIZE].iter_mut().enumerate() {
        *byte ^= final_digest[i % HASH_SIZE];
    }

    gendata
}

/// Compute the deadline for one scoop of generated plot data.
///
/// Hashes the generation signature and the `SCOOP_SIZE` slice at
/// `scoop * SCOOP_SIZE`, reads the first 8 digest bytes as a little-endian
/// word and divides by the base target.
pub fn calculate_deadline(
    buffer: &[u8],
    generation_signature: &GenerationSignature,
    scoop: u64,
    base_target: u64,
) -> Result<Deadline> {
    if scoop >= SCOOPS_PER_PLOT as u64 {
        return Err(Error::round(format!(
            "scoop {scoop} out of range (max {})",
            SCOOPS_PER_PLOT - 1
        )));
    }
    if base_target == 0 {
        return Err(Error::round("base target must be non-zero"));
    }
    let start = scoop as usize * SCOOP_SIZE;
    let end = start + SCOOP_SIZE;
    if buffer.len() < end {
        return Err(Error::round(format!(
            "buffer too short for scoop {scoop}: {} < {end}",
            buffer.len()
        )));
    }

    let mut hasher = Shabal256::new();
    hasher.update(generation_signature.as_bytes());
    hasher.update(&buffer[start..end]);
    let digest = hasher.finalize();

    let raw = LittleEndian::read_u64(&digest.as_slice()[..8]);
    Ok(Deadline::new(raw / base_target))
}

/// Generate a nonce and check it against the current round in one step.
pub fn generate_and_check(account: u64, nonce: u64, round: &dyn RoundContext) -> Result<Deadline> {
    let buffer = generate(account, nonce);
    calculate_deadline(
        &buffer,
        &round.generation_signature(),
        round.scoop_number(),
        round.base_target(),
    )
}

/// Write one generated nonce into an open plot file at its stagger-aware
/// position.
///
/// `buffer` is the output of [`generate`] for the same nonce; only its first
/// `PLOT_SIZE` bytes are written. The file must already span the target
/// stagger block (sparse files are fine, seeking past EOF extends them).
pub fn write_nonce(file: &mut File, plot: &PlotFile, nonce: u64, buffer: &[u8]) -> Result<()> {
    if nonce < plot.nonce_start() || nonce >= plot.nonce_end() {
        return Err(Error::round(format!(
            "nonce {nonce} outside of plot range {}..{}",
            plot.nonce_start(),
            plot.nonce_end()
        )));
    }
    if buffer.len() < PLOT_SIZE {
        return Err(Error::round(format!(
            "nonce buffer too short: {} < {PLOT_SIZE}",
            buffer.len()
        )));
    }

    let index = nonce - plot.nonce_start();
    let stagger = plot.stagger_size();
    let base = index / stagger * plot.stagger_bytes() + index % stagger * SCOOP_SIZE as u64;
    let stride = plot.stagger_scoop_bytes();

    for scoop in 0..SCOOPS_PER_PLOT as u64 {
        let data = &buffer[scoop as usize * SCOOP_SIZE..(scoop as usize + 1) * SCOOP_SIZE];
        file.seek(SeekFrom::Start(base + scoop * stride))?;
        file.write_all(data)?;
    }

    Ok(())
}
