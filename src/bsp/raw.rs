//! # IBSP container reader
//!
//! * Holds the entire level file in RAM.
//! * Parses the fixed 19-entry lump directory.
//! * Decodes binary lumps into typed vectors with **bincode 2**.
//!
//! Only version 38 (`IBSP`, Quake II / Kingpin) is accepted.

use bincode::{Decode, config, decode_from_slice};
use byteorder::{LittleEndian as LE, ReadBytesExt};
use std::{fmt, fs, io, mem, path::Path};
use thiserror::Error;

pub const BSP_MAGIC: &[u8; 4] = b"IBSP";
pub const BSP_VERSION: u32 = 38;
pub const HEADER_LUMPS: usize = 19;

/// magic + version + directory
pub const HEADER_SIZE: usize = 8 + HEADER_LUMPS * 8;

/// Position of a lump in the directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LumpKind {
    Entities = 0,
    Planes,
    Vertices,
    Visibility,
    Nodes,
    TexInfo,
    Faces,
    Lighting,
    Leaves,
    LeafFaces,
    LeafBrushes,
    Edges,
    SurfEdges,
    Models,
    Brushes,
    BrushSides,
    Pop,
    Areas,
    AreaPortals,
}

impl LumpKind {
    pub const ALL: [LumpKind; HEADER_LUMPS] = [
        LumpKind::Entities,
        LumpKind::Planes,
        LumpKind::Vertices,
        LumpKind::Visibility,
        LumpKind::Nodes,
        LumpKind::TexInfo,
        LumpKind::Faces,
        LumpKind::Lighting,
        LumpKind::Leaves,
        LumpKind::LeafFaces,
        LumpKind::LeafBrushes,
        LumpKind::Edges,
        LumpKind::SurfEdges,
        LumpKind::Models,
        LumpKind::Brushes,
        LumpKind::BrushSides,
        LumpKind::Pop,
        LumpKind::Areas,
        LumpKind::AreaPortals,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LumpKind::Entities => "entities",
            LumpKind::Planes => "planes",
            LumpKind::Vertices => "vertices",
            LumpKind::Visibility => "visibility",
            LumpKind::Nodes => "nodes",
            LumpKind::TexInfo => "texinfo",
            LumpKind::Faces => "faces",
            LumpKind::Lighting => "lighting",
            LumpKind::Leaves => "leaves",
            LumpKind::LeafFaces => "leaf faces",
            LumpKind::LeafBrushes => "leaf brushes",
            LumpKind::Edges => "edges",
            LumpKind::SurfEdges => "surface edges",
            LumpKind::Models => "models",
            LumpKind::Brushes => "brushes",
            LumpKind::BrushSides => "brush sides",
            LumpKind::Pop => "pop",
            LumpKind::Areas => "areas",
            LumpKind::AreaPortals => "area portals",
        }
    }
}

impl fmt::Display for LumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry in the lump directory (8 bytes on disk).
#[derive(Clone, Copy, Debug)]
pub struct LumpInfo {
    pub kind: LumpKind,
    pub offset: u32,
    pub size: u32,
}

/// Entire level file in memory (raw bytes + parsed directory).
#[derive(Debug)]
pub struct BspFile {
    lumps: Vec<LumpInfo>,
    bytes: Vec<u8>,
}

/// Container / decoding errors.
#[derive(Error, Debug)]
pub enum BspError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("file is not an IBSP level (magic {0:?})")]
    BadMagic([u8; 4]),

    #[error("unsupported BSP version {0} (expected {BSP_VERSION})")]
    BadVersion(u32),

    #[error("header truncated: {0} bytes, need {HEADER_SIZE}")]
    TruncatedHeader(usize),

    #[error("{lump} lump slice {offset}+{size} past EOF ({file_size})")]
    BadOffset {
        lump: LumpKind,
        offset: i32,
        size: i32,
        file_size: usize,
    },

    #[error("{lump} lump size {size} not multiple of element {elem_size}")]
    BadLumpSize {
        lump: LumpKind,
        size: usize,
        elem_size: usize,
    },

    #[error("{lump} lump element {elem}: {source}")]
    BadElement {
        lump: LumpKind,
        elem: usize,
        source: bincode::error::DecodeError,
    },
}

/// Fixed-width little-endian layout shared by every lump record.
pub(crate) fn record_config() -> impl config::Config {
    config::standard()
        .with_fixed_int_encoding()
        .with_little_endian()
}

impl BspFile {
    // ------------------------------------------------------------------ //
    // Low-level helpers
    // ------------------------------------------------------------------ //

    /// Expose directory as a read-only slice
    pub fn lumps(&self) -> &[LumpInfo] {
        &self.lumps
    }

    /// Size of the whole file in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw bytes of `kind` (bounds were validated when the file was opened).
    pub fn lump_bytes(&self, kind: LumpKind) -> &[u8] {
        let l = &self.lumps[kind as usize];
        let start = l.offset as usize;
        &self.bytes[start..start + l.size as usize]
    }

    /// Entity lump as text, trailing NULs stripped.
    pub fn entity_text(&self) -> String {
        let bytes = self.lump_bytes(LumpKind::Entities);
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        String::from_utf8_lossy(&bytes[..end]).into_owned()
    }

    // ------------------------------------------------------------------ //
    // Generic decode helper
    // ------------------------------------------------------------------ //

    /// Decode every record of `kind`.  An empty lump yields an empty vector;
    /// whether that is acceptable is up to the loader.
    pub fn lump_to_vec<T>(&self, kind: LumpKind) -> Result<Vec<T>, BspError>
    where
        T: Decode<()>,
    {
        let bytes = self.lump_bytes(kind);
        let elem = mem::size_of::<T>();

        if bytes.len() % elem != 0 {
            return Err(BspError::BadLumpSize {
                lump: kind,
                size: bytes.len(),
                elem_size: elem,
            });
        }

        let cfg = record_config();
        let mut out = Vec::with_capacity(bytes.len() / elem);
        let mut slice = bytes;

        while !slice.is_empty() {
            let (val, read) =
                decode_from_slice::<T, _>(slice, cfg).map_err(|e| BspError::BadElement {
                    lump: kind,
                    elem: out.len(),
                    source: e,
                })?;
            out.push(val);
            slice = &slice[read..];
        }
        Ok(out)
    }

    // ------------------------------------------------------------------ //
    // Loading
    // ------------------------------------------------------------------ //

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BspError> {
        Self::from_bytes(fs::read(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, BspError> {
        if bytes.len() < HEADER_SIZE {
            return Err(BspError::TruncatedHeader(bytes.len()));
        }

        let mut cur = &bytes[..HEADER_SIZE];

        let mut magic = [0u8; 4];
        io::Read::read_exact(&mut cur, &mut magic)?;
        if &magic != BSP_MAGIC {
            return Err(BspError::BadMagic(magic));
        }

        let version = cur.read_u32::<LE>()?;
        if version != BSP_VERSION {
            return Err(BspError::BadVersion(version));
        }

        // parse + validate directory
        let mut lumps = Vec::with_capacity(HEADER_LUMPS);
        for kind in LumpKind::ALL {
            let offset = cur.read_i32::<LE>()?;
            let size = cur.read_i32::<LE>()?;

            let in_bounds = offset >= 0
                && size >= 0
                && (offset as usize)
                    .checked_add(size as usize)
                    .is_some_and(|end| end <= bytes.len());
            if !in_bounds {
                return Err(BspError::BadOffset {
                    lump: kind,
                    offset,
                    size,
                    file_size: bytes.len(),
                });
            }

            lumps.push(LumpInfo {
                kind,
                offset: offset as u32,
                size: size as u32,
            });
        }

        Ok(Self { lumps, bytes })
    }
}

// ==========================================================================
// Tests
// ==========================================================================
