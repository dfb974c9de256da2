//! Named color palettes.
//!
//! The registry is built once on first use and is read-only afterwards, so
//! any number of concurrent renders can look palettes up.

use std::collections::BTreeMap;

use image::Rgba;
use lazy_static::lazy_static;

use crate::error::{RenderError, RenderResult};

pub type Palette = Vec<Rgba<u8>>;

pub const PALETTE_NAMES: [&str; 8] = [
    "plan9",
    "websafe",
    "gameboy",
    "retro",
    "gray",
    "cont",
    "alternate",
    "blackwhite",
];

const fn rgb(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 0xff])
}

const GAMEBOY: [Rgba<u8>; 4] = [
    rgb(14, 55, 15),
    rgb(47, 97, 48),
    rgb(138, 171, 25),
    rgb(154, 187, 27),
];

const RETRO: [Rgba<u8>; 16] = [
    rgb(0x00, 0x04, 0x0f),
    rgb(0x03, 0x26, 0x28),
    rgb(0x07, 0x3e, 0x1e),
    rgb(0x18, 0x55, 0x08),
    rgb(0x5f, 0x6e, 0x0f),
    rgb(0x84, 0x50, 0x19),
    rgb(0x9b, 0x30, 0x22),
    rgb(0xb4, 0x92, 0x2f),
    rgb(0x94, 0xca, 0x3d),
    rgb(0x4f, 0xd5, 0x51),
    rgb(0x66, 0xff, 0xb3),
    rgb(0x82, 0xc9, 0xe5),
    rgb(0x9d, 0xa3, 0xeb),
    rgb(0xd7, 0xb5, 0xf3),
    rgb(0xfd, 0xd6, 0xf6),
    rgb(0xff, 0xf0, 0xf2),
];

const ALTERNATE_CYCLE: [Rgba<u8>; 6] = [
    rgb(0x18, 0x4d, 0x68),
    rgb(0x31, 0x80, 0x9f),
    rgb(0xfb, 0x9c, 0x6c),
    rgb(0xd5, 0x51, 0x21),
    rgb(0xcf, 0xe9, 0x90),
    rgb(0xea, 0xfb, 0xc5),
];

/// Plan 9's 256 color map: a 4x4x4 cube of hues, each with 4 shades.
fn plan9() -> Palette {
    (0..256u32)
        .map(|c| {
            let r = c >> 6;
            let v = (c >> 4) & 3;
            let j = (c.wrapping_sub(v) + r) & 15;
            let g = j >> 2;
            let b = j & 3;
            let den = r.max(g).max(b);
            if den == 0 {
                let v = (v * 17) as u8;
                rgb(v, v, v)
            } else {
                let num = 17 * (4 * den + v);
                rgb(
                    (r * num / den) as u8,
                    (g * num / den) as u8,
                    (b * num / den) as u8,
                )
            }
        })
        .collect()
}

/// The 216 web-safe colors, channels stepping by 0x33.
fn websafe() -> Palette {
    let mut palette = Vec::with_capacity(216);
    for r in 0..6u8 {
        for g in 0..6u8 {
            for b in 0..6u8 {
                palette.push(rgb(r * 0x33, g * 0x33, b * 0x33));
            }
        }
    }
    palette
}

fn gray() -> Palette {
    (0..255 * 3u32)
        .map(|i| rgb((i / 3) as u8, ((i + 1) / 3) as u8, ((i + 2) / 3) as u8))
        .collect()
}

fn cont() -> Palette {
    const LEN: u32 = 10000;
    (0..LEN)
        .map(|i| {
            let val = i * 256 / LEN;
            rgb(val as u8, 0, (255 - val) as u8)
        })
        .collect()
}

fn alternate() -> Palette {
    ALTERNATE_CYCLE.iter().cycle().take(20).copied().collect()
}

fn blackwhite() -> Palette {
    [rgb(0, 0, 0), rgb(255, 255, 255)]
        .iter()
        .cycle()
        .take(20)
        .copied()
        .collect()
}

lazy_static! {
    static ref REGISTRY: BTreeMap<&'static str, Palette> = {
        let mut m = BTreeMap::new();
        m.insert("plan9", plan9());
        m.insert("websafe", websafe());
        m.insert("gameboy", GAMEBOY.to_vec());
        m.insert("retro", RETRO.to_vec());
        m.insert("gray", gray());
        m.insert("cont", cont());
        m.insert("alternate", alternate());
        m.insert("blackwhite", blackwhite());
        m
    };
}

pub fn lookup(name: &str) -> RenderResult<&'static Palette> {
    REGISTRY
        .get(name)
        .ok_or_else(|| RenderError::UnknownPalette(name.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_registry_is_closed() {
        for name in PALETTE_NAMES {
            assert!(!lookup(name).unwrap().is_empty(), "{}", name);
        }
        assert_eq!(REGISTRY.len(), PALETTE_NAMES.len());
        assert_eq!(
            lookup("rainbow"),
            Err(RenderError::UnknownPalette("rainbow".to_string()))
        );
    }

    #[test]
    fn test_palette_lengths() {
        let lengths = [
            ("plan9", 256),
            ("websafe", 216),
            ("gameboy", 4),
            ("retro", 16),
            ("gray", 765),
            ("cont", 10000),
            ("alternate", 20),
            ("blackwhite", 20),
        ];
        for (name, len) in lengths {
            assert_eq!(lookup(name).unwrap().len(), len, "{}", name);
        }
    }

    #[test]
    fn test_plan9_entries() {
        let p = lookup("plan9").unwrap();
        assert_eq!(p[0], rgb(0x00, 0x00, 0x00));
        assert_eq!(p[1], rgb(0x00, 0x00, 0x44));
        assert_eq!(p[2], rgb(0x00, 0x00, 0x88));
        assert_eq!(p[3], rgb(0x00, 0x00, 0xcc));
        assert_eq!(p[255], rgb(0xff, 0xff, 0xff));
    }

    #[test]
    fn test_websafe_entries() {
        let p = lookup("websafe").unwrap();
        assert_eq!(p[0], rgb(0, 0, 0));
        assert_eq!(p[1], rgb(0, 0, 0x33));
        assert_eq!(p[6], rgb(0, 0x33, 0));
        assert_eq!(p[215], rgb(0xff, 0xff, 0xff));
    }

    #[test]
    fn test_gray_ramp() {
        let p = lookup("gray").unwrap();
        assert_eq!(p[0], rgb(0, 0, 0));
        assert_eq!(p[1], rgb(0, 0, 1));
        assert_eq!(p[2], rgb(0, 1, 1));
        assert_eq!(p[764], rgb(254, 255, 255));
    }

    #[test]
    fn test_cycled_palettes() {
        let alt = lookup("alternate").unwrap();
        assert_eq!(alt[0], alt[6]);
        assert_eq!(alt[19], ALTERNATE_CYCLE[1]);
        let bw = lookup("blackwhite").unwrap();
        assert!(bw.iter().step_by(2).all(|c| *c == rgb(0, 0, 0)));
        assert!(bw.iter().skip(1).step_by(2).all(|c| *c == rgb(255, 255, 255)));
    }

    #[test]
    fn test_cont_endpoints() {
        let p = lookup("cont").unwrap();
        assert_eq!(p[0], rgb(0, 0, 255));
        assert_eq!(p[9999], rgb(255, 0, 0));
    }
}
