use bitflags::bitflags;

bitflags! {
    /// Solidity / material of a BSP volume (leaf or brush).
    ///
    /// The numeric values are the on-disk values of IBSP v38 levels and
    /// must stay bit-exact; unknown bits coming from level data are kept.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ContentFlags: u32 {
        // Visible contents, in priority order.
        const SOLID          = 0x0000_0001;
        const WINDOW         = 0x0000_0002;
        const AUX            = 0x0000_0004;
        const LAVA           = 0x0000_0008;
        const SLIME          = 0x0000_0010;
        const WATER          = 0x0000_0020;
        const MIST           = 0x0000_0040;

        // Invisible / compiler contents
        const AREA_PORTAL    = 0x0000_8000;
        const PLAYER_CLIP    = 0x0001_0000;
        const MONSTER_CLIP   = 0x0002_0000;

        // Currents push whatever stands in them.
        const CURRENT_0      = 0x0004_0000;
        const CURRENT_90     = 0x0008_0000;
        const CURRENT_180    = 0x0010_0000;
        const CURRENT_270    = 0x0020_0000;
        const CURRENT_UP     = 0x0040_0000;
        const CURRENT_DOWN   = 0x0080_0000;

        // Removed before bsp-ing an entity.
        const ORIGIN         = 0x0100_0000;

        // Never present in level data, only on entity boxes.
        const MONSTER        = 0x0200_0000;
        const DEAD_MONSTER   = 0x0400_0000;

        // Brushes not used for the BSP split.
        const DETAIL         = 0x0800_0000;
        const TRANSLUCENT    = 0x1000_0000;
        const LADDER         = 0x2000_0000;

        const _ = !0;
    }
}

impl ContentFlags {
    /// Last of the visible contents bits.
    pub const LAST_VISIBLE_CONTENTS: Self = Self::MIST;

    pub const MASK_ALL: Self = Self::all();
    pub const MASK_SOLID: Self = Self::SOLID.union(Self::WINDOW);
    pub const MASK_PLAYER_SOLID: Self = Self::SOLID
        .union(Self::PLAYER_CLIP)
        .union(Self::WINDOW)
        .union(Self::MONSTER);
    pub const MASK_DEAD_SOLID: Self = Self::SOLID
        .union(Self::PLAYER_CLIP)
        .union(Self::WINDOW);
    pub const MASK_MONSTER_SOLID: Self = Self::SOLID
        .union(Self::MONSTER_CLIP)
        .union(Self::WINDOW)
        .union(Self::MONSTER);
    pub const MASK_WATER: Self = Self::WATER.union(Self::LAVA).union(Self::SLIME);
    pub const MASK_OPAQUE: Self = Self::SOLID.union(Self::SLIME).union(Self::LAVA);
    pub const MASK_SHOT: Self = Self::SOLID
        .union(Self::MONSTER)
        .union(Self::WINDOW)
        .union(Self::DEAD_MONSTER);
    pub const MASK_CURRENT: Self = Self::CURRENT_0
        .union(Self::CURRENT_90)
        .union(Self::CURRENT_180)
        .union(Self::CURRENT_270)
        .union(Self::CURRENT_UP)
        .union(Self::CURRENT_DOWN);

    /// Decode the signed on-disk field, keeping every bit.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self::from_bits_retain(raw as u32)
    }
}

bitflags! {
    /// Per-face material / rendering behaviour (texinfo `flags`).
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SurfaceFlags: u32 {
        // Value will hold the light strength.
        const LIGHT          = 0x0000_0001;
        // Affects game physics.
        const SLICK          = 0x0000_0002;
        // Don't draw, but add to skybox.
        const SKY            = 0x0000_0004;
        // Turbulent water warp.
        const WARP           = 0x0000_0008;
        const TRANS33        = 0x0000_0010;
        const TRANS66        = 0x0000_0020;
        // Scroll towards angle.
        const FLOWING        = 0x0000_0040;
        // Don't bother referencing the texture.
        const NODRAW         = 0x0000_0080;

        // Compiler hints
        const HINT           = 0x0000_0100;
        const SKIP           = 0x0000_0200;

        // Extended material bits
        const SPECULAR       = 0x0000_0400;
        const DIFFUSE        = 0x0000_0800;
        const MASKED         = 0x0000_1000;
        const MIRROR         = 0x0000_2000;
        const WINDOW33       = 0x0000_4000;
        const WINDOW66       = 0x0000_8000;
        const WATER          = 0x0008_0000;
        const CONCRETE       = 0x0010_0000;
        const FABRIC         = 0x0020_0000;
        const GRAVEL         = 0x0040_0000;
        const METAL          = 0x0080_0000;
        const METAL_LITE     = 0x0100_0000;
        const TIN            = 0x0200_0000;
        const WOOD           = 0x0400_0000;
        const REFLECT_FAKE   = 0x0800_0000;
        const REFLECT_LIGHT  = 0x1000_0000;

        // 0x10000, 0x20000, 0x40000 and the top three bits are unnamed.
        const _ = !0;
    }
}

impl SurfaceFlags {
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self::from_bits_retain(raw as u32)
    }

    /// Footstep / impact material carried by this surface, if any.
    pub fn material(self) -> Option<Self> {
        const MATERIALS: [SurfaceFlags; 8] = [
            SurfaceFlags::WATER,
            SurfaceFlags::CONCRETE,
            SurfaceFlags::FABRIC,
            SurfaceFlags::GRAVEL,
            SurfaceFlags::METAL,
            SurfaceFlags::METAL_LITE,
            SurfaceFlags::TIN,
            SurfaceFlags::WOOD,
        ];
        MATERIALS.into_iter().find(|m| self.contains(*m))
    }
}

// ──────────────────────────────────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_bits_match_level_format() {
        assert_eq!(ContentFlags::SOLID.bits(), 1);
        assert_eq!(ContentFlags::WATER.bits(), 32);
        assert_eq!(ContentFlags::AREA_PORTAL.bits(), 0x8000);
        assert_eq!(ContentFlags::CURRENT_DOWN.bits(), 0x80_0000);
        assert_eq!(ContentFlags::LADDER.bits(), 0x2000_0000);
        assert_eq!(SurfaceFlags::NODRAW.bits(), 0x80);
        assert_eq!(SurfaceFlags::REFLECT_LIGHT.bits(), 0x1000_0000);
    }

    #[test]
    fn composite_masks() {
        assert_eq!(ContentFlags::MASK_SOLID.bits(), 0x3);
        assert_eq!(ContentFlags::MASK_PLAYER_SOLID.bits(), 0x0201_0003);
        assert_eq!(ContentFlags::MASK_MONSTER_SOLID.bits(), 0x0202_0003);
        assert_eq!(ContentFlags::MASK_WATER.bits(), 0x38);
        assert_eq!(ContentFlags::MASK_SHOT.bits(), 0x0600_0003);
        assert_eq!(ContentFlags::MASK_CURRENT.bits(), 0x00FC_0000);
        assert_eq!(ContentFlags::MASK_ALL.bits(), u32::MAX);
        assert!(!ContentFlags::MASK_SOLID.intersects(ContentFlags::WATER));
    }

    #[test]
    fn unknown_bits_survive_decode() {
        let c = ContentFlags::from_raw(-1);
        assert_eq!(c.bits(), u32::MAX);
        let s = SurfaceFlags::from_raw(0x0001_0000 | 0x4);
        assert!(s.contains(SurfaceFlags::SKY));
        assert_eq!(s.bits(), 0x0001_0004);
    }

    #[test]
    fn material_lookup() {
        let s = SurfaceFlags::LIGHT | SurfaceFlags::METAL;
        assert_eq!(s.material(), Some(SurfaceFlags::METAL));
        assert_eq!(SurfaceFlags::SKY.material(), None);
    }
}
