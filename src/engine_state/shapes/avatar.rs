//! Voxel portrait: shirt with a chest graphic, arms, head, beard, sunglasses and cap.

use super::{steps_exclusive, steps_inclusive, ShapeBuilder, ShapeDescriptor};

const SKIN: u32 = 0xE0AC69;
const BEARD: u32 = 0x1A1A1A;
const SHIRT: u32 = 0x3B82F6;
const CAP: u32 = 0x1E293B;
const GLASSES: u32 = 0x111111;
const CHEST_GRAPHIC: u32 = 0xF59E0B;
const CAP_LOGO: u32 = 0xFFFFFF;

/// Builds the portrait with its feet four cells above `floor_y`.
pub fn generate(floor_y: f32) -> ShapeDescriptor {
    let mut builder = ShapeBuilder::new();
    let (x0, y0, z0) = (0.0, floor_y + 4.0, 0.0);

    // Torso, corners rounded off
    for y in steps_exclusive(0.0, 7.0) {
        for x in steps_inclusive(-3.0, 3.0) {
            for z in steps_inclusive(-1.5, 1.5) {
                if x.abs() == 3.0 && z.abs() > 0.5 {
                    continue;
                }

                let on_chest = z > 1.0 && y > 2.0 && y < 6.0 && x.abs() < 2.0;
                let color = if on_chest { CHEST_GRAPHIC } else { SHIRT };
                builder.set_block(x0 + x, y0 + y, z0 + z, color);
            }
        }
    }

    // Arms
    for y in steps_exclusive(0.0, 6.0) {
        for side in [-4.0, 4.0] {
            builder.set_block(x0 + side, y0 + y, z0, SHIRT);
            builder.set_block(x0 + side, y0 + y, z0 + 1.0, SHIRT);
        }
    }

    // Hands
    builder.set_block(x0 - 4.0, y0 - 1.0, z0 + 0.5, SKIN);
    builder.set_block(x0 + 4.0, y0 - 1.0, z0 + 0.5, SKIN);

    let head_y = y0 + 7.0;
    let head_z = z0;

    for y in steps_exclusive(0.0, 5.0) {
        for x in steps_inclusive(-2.5, 2.5) {
            for z in steps_inclusive(-2.5, 2.5) {
                builder.set_block(x0 + x, head_y + y, head_z + z, SKIN);
            }
        }
    }

    // Beard along the jaw and the front
    for x in steps_inclusive(-2.5, 2.5) {
        for z in steps_inclusive(-2.5, 3.0) {
            if z > 1.5 || x <= -2.0 || x >= 2.0 {
                for y in steps_exclusive(0.0, 2.5) {
                    builder.set_block(x0 + x, head_y + y, head_z + z, BEARD);
                }
            }
        }
    }

    // Mustache
    for x in [-1.0, 0.0, 1.0] {
        builder.set_block(x0 + x, head_y + 1.5, head_z + 3.0, BEARD);
    }

    // Sunglasses, gap at the bridge
    for x in steps_inclusive(-2.5, 2.5) {
        if x == 0.0 {
            continue;
        }
        builder.set_block(x0 + x, head_y + 3.0, head_z + 3.0, GLASSES);
        builder.set_block(x0 + x, head_y + 3.5, head_z + 3.0, GLASSES);
    }
    builder.set_block(x0, head_y + 3.5, head_z + 2.8, GLASSES);

    let cap_y = head_y + 4.5;

    for y in steps_exclusive(0.0, 2.0) {
        for x in steps_inclusive(-2.8, 2.8) {
            for z in steps_inclusive(-3.0, 3.0) {
                builder.set_block(x0 + x, cap_y + y, head_z + z, CAP);
            }
        }
    }

    // Visor
    for x in steps_inclusive(-2.5, 2.5) {
        for z in steps_inclusive(3.0, 5.0) {
            builder.set_block(x0 + x, cap_y, head_z + z, CAP);
        }
    }

    for x in [-1.0, 0.0, 1.0] {
        builder.set_block(x0 + x, cap_y + 1.0, head_z + 3.2, CAP_LOGO);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_uses_the_full_palette() {
        let shape = generate(-12.0);
        for color in [SKIN, BEARD, SHIRT, CAP, GLASSES, CHEST_GRAPHIC, CAP_LOGO] {
            assert!(
                shape.iter().any(|entry| entry.color == color),
                "missing color {color:06X}"
            );
        }
    }

    #[test]
    fn avatar_stands_above_the_floor() {
        let floor_y = -12.0;
        let shape = generate(floor_y);
        let lowest = shape.iter().map(|entry| entry.position.y).min();

        // The hands hang one cell below the torso
        assert_eq!(lowest, Some(floor_y as i32 + 3));
    }
}
