//! Perceptual hash primitives.
//!
//! Three hash variants are computed with `image_hasher`, each producing a
//! `hash_size × hash_size` boolean matrix in row-major order:
//!
//! - pHash: DCT preprocessing, low-frequency block compared to its median.
//! - dHash: each pixel compared to its horizontal neighbour.
//! - aHash: each pixel compared to the mean.
//!
//! ## Bit order
//!
//! [`pack_bits`] is the only place a bit matrix becomes an integer. The first
//! bit of the row-major matrix lands in the most significant position, so a
//! full 8×8 hash puts cell `(0, 0)` in bit 63 and cell `(7, 7)` in bit 0.
//! Hamming distances are only meaningful between hashes packed this way.

use std::fmt;

use image::{DynamicImage, GrayImage};
use image_hasher::{HashAlg, Hasher, HasherConfig, ImageHash};

/// Pack a row-major bit matrix into an integer, most significant bit first.
///
/// At most 64 bits are consumed. With fewer than 64 bits the first bit sits at
/// position `bits.len() - 1`.
pub fn pack_bits(bits: &[bool]) -> u64 {
    bits.iter()
        .take(64)
        .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit))
}

/// Number of differing bits between two packed hashes.
#[inline]
pub fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// The three hashers of one hash size, built once and reused for every frame.
pub struct FrameHashers {
    hash_size: u32,
    phash: Hasher,
    dhash: Hasher,
    ahash: Hasher,
}

impl fmt::Debug for FrameHashers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameHashers")
            .field("hash_size", &self.hash_size)
            .finish()
    }
}

impl FrameHashers {
    /// `hash_size` must already be validated (see `FeatureConfig::validate`).
    pub fn new(hash_size: u32) -> Self {
        let base = || HasherConfig::new().hash_size(hash_size, hash_size);
        Self {
            hash_size,
            phash: base().hash_alg(HashAlg::Median).preproc_dct().to_hasher(),
            dhash: base().hash_alg(HashAlg::Gradient).to_hasher(),
            ahash: base().hash_alg(HashAlg::Mean).to_hasher(),
        }
    }

    pub fn hash_size(&self) -> u32 {
        self.hash_size
    }

    /// Frequency-domain hash bits of a grayscale frame.
    pub fn phash_bits(&self, gray: &GrayImage) -> Vec<bool> {
        self.bits(&self.phash, gray)
    }

    /// Gradient hash bits.
    pub fn dhash_bits(&self, gray: &GrayImage) -> Vec<bool> {
        self.bits(&self.dhash, gray)
    }

    /// Average hash bits.
    pub fn ahash_bits(&self, gray: &GrayImage) -> Vec<bool> {
        self.bits(&self.ahash, gray)
    }

    /// Packed frequency-domain hash; the value used by the precise pass.
    pub fn phash(&self, gray: &GrayImage) -> u64 {
        pack_bits(&self.phash_bits(gray))
    }

    fn bits(&self, hasher: &Hasher, gray: &GrayImage) -> Vec<bool> {
        let hash = hasher.hash_image(&DynamicImage::ImageLuma8(gray.clone()));
        unpack(&hash, (self.hash_size * self.hash_size) as usize)
    }
}

/// Hash bits in generation order. `image_hasher` stores bit `i` as bit
/// `i % 8` of byte `i / 8`; trailing padding bits are dropped.
fn unpack(hash: &ImageHash, len: usize) -> Vec<bool> {
    hash.as_bytes()
        .iter()
        .flat_map(|&byte| (0..8).map(move |i| byte & (1 << i) != 0))
        .take(len)
        .collect()
}
