//! Desk with a code-covered monitor and an open laptop.

use super::{steps_inclusive, ShapeBuilder, ShapeDescriptor};

const DESK: u32 = 0x475569;
const DESK_LEG: u32 = 0x333333;
const BEZEL: u32 = 0x111111;
const SCREEN: u32 = 0x0EA5E9;
const CODE: u32 = 0xFFFFFF;
const STAND: u32 = 0x222222;
const LAPTOP: u32 = 0x888888;

/// Chance that a screen cell on an even row shows a line of code.
const CODE_DENSITY: f32 = 0.7;

/// Builds the workstation with the desk top two cells above `floor_y`.
pub fn generate(floor_y: f32, rng: &mut fastrand::Rng) -> ShapeDescriptor {
    let mut builder = ShapeBuilder::new();
    let desk_y = (floor_y + 2.0).round() as i32;
    let top = desk_y as f32;

    for x in -8..=8 {
        for z in -4..=4 {
            builder.set_block(x as f32, top, z as f32, DESK);
        }
    }

    for y in ((desk_y - 5)..desk_y).rev() {
        for (x, z) in [(-7.0, -3.0), (-7.0, 3.0), (7.0, -3.0), (7.0, 3.0)] {
            builder.set_block(x, y as f32, z, DESK_LEG);
        }
    }

    // Monitor
    for x in -4..=4 {
        for y in (desk_y + 2)..=(desk_y + 7) {
            builder.set_block(x as f32, y as f32, -2.0, BEZEL);

            let on_border = x == -4 || x == 4 || y == desk_y + 2 || y == desk_y + 7;
            if on_border {
                continue;
            }

            builder.set_block(x as f32, y as f32, -1.8, SCREEN);
            if y.rem_euclid(2) == 0 && rng.f32() < CODE_DENSITY {
                builder.set_block(x as f32, y as f32, -1.7, CODE);
            }
        }
    }
    builder.set_block(0.0, top + 1.0, -2.0, STAND);

    // Laptop base, then the lid
    for x in 5..=8 {
        for z in 0..=2 {
            builder.set_block(x as f32, top + 0.5, z as f32, LAPTOP);
        }
    }
    for x in 5..=8 {
        for y in steps_inclusive(top + 0.5, top + 3.5) {
            builder.set_block(x as f32, y, 0.0, LAPTOP);
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desk_legs_reach_below_the_floor_reference() {
        let shape = generate(-12.0, &mut fastrand::Rng::with_seed(1));
        let lowest = shape.iter().map(|entry| entry.position.y).min();

        assert_eq!(lowest, Some(-15));
    }

    #[test]
    fn screen_cells_sit_in_front_of_the_bezel() {
        let shape = generate(-12.0, &mut fastrand::Rng::with_seed(1));

        assert!(shape
            .iter()
            .filter(|entry| entry.color == SCREEN || entry.color == CODE)
            .all(|entry| entry.position.z == -2));
    }
}
