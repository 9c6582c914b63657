//! Scene drawing: background, player and devils

use super::{Color, DrawSurface};
use crate::sim::{Devil, Player, Simulation};

const PLAYER_BODY: Color = Color::rgb(0xff, 0xb4, 0xb4);
const PLAYER_HORNS: Color = Color::rgb(0xff, 0x3b, 0x30);
const DEVIL: Color = Color::rgb(0xff, 0x3b, 0x30);
const GRID_LINE: Color = Color::rgba(255, 255, 255, 0.01);

/// Vertical distance between background grid lines
const GRID_SPACING: f32 = 40.0;

/// Horn geometry relative to the player's top-left corner
const HORN_INSET: f32 = 6.0;
const HORN_WIDTH: f32 = 6.0;
const HORN_HEIGHT: f32 = 8.0;

pub fn draw_player(player: &Player, surface: &mut dyn DrawSurface) {
    let Player {
        pos, width, height, ..
    } = *player;
    surface.fill_rect(pos.x, pos.y, width, height, PLAYER_BODY);
    // horns
    surface.fill_rect(
        pos.x + HORN_INSET,
        pos.y - HORN_HEIGHT,
        HORN_WIDTH,
        HORN_HEIGHT,
        PLAYER_HORNS,
    );
    surface.fill_rect(
        pos.x + width - HORN_INSET - HORN_WIDTH,
        pos.y - HORN_HEIGHT,
        HORN_WIDTH,
        HORN_HEIGHT,
        PLAYER_HORNS,
    );
}

pub fn draw_devil(devil: &Devil, surface: &mut dyn DrawSurface) {
    surface.fill_ellipse(
        devil.pos.x,
        devil.pos.y,
        devil.size,
        devil.size * 0.8,
        DEVIL,
    );
}

fn draw_grid(width: f32, height: f32, surface: &mut dyn DrawSurface) {
    let mut y = 0.0;
    while y < height {
        surface.fill_rect(0.0, y, width, 1.0, GRID_LINE);
        y += GRID_SPACING;
    }
}

/// Draw a complete frame: clear, optional grid, player, devils
pub fn draw_frame(sim: &Simulation, surface: &mut dyn DrawSurface, grid: bool) {
    surface.clear();
    if grid {
        draw_grid(sim.tuning.surface_width, sim.tuning.surface_height, surface);
    }
    draw_player(&sim.player, surface);
    for devil in &sim.devils {
        draw_devil(devil, surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, RecordingSurface};
    use crate::tuning::Tuning;
    use glam::Vec2;

    #[test]
    fn test_player_body_and_horns() {
        let mut player = Player::new(&Tuning::default());
        player.pos = Vec2::new(100.0, 500.0);
        let mut surface = RecordingSurface::new();
        draw_player(&player, &mut surface);

        assert_eq!(
            surface.commands,
            vec![
                DrawCommand::Rect {
                    x: 100.0,
                    y: 500.0,
                    w: 48.0,
                    h: 24.0,
                    color: PLAYER_BODY
                },
                DrawCommand::Rect {
                    x: 106.0,
                    y: 492.0,
                    w: 6.0,
                    h: 8.0,
                    color: PLAYER_HORNS
                },
                DrawCommand::Rect {
                    x: 136.0,
                    y: 492.0,
                    w: 6.0,
                    h: 8.0,
                    color: PLAYER_HORNS
                },
            ]
        );
    }

    #[test]
    fn test_devil_is_flattened_ellipse() {
        let devil = Devil::new(50.0, 60.0, 1.0, 20.0);
        let mut surface = RecordingSurface::new();
        draw_devil(&devil, &mut surface);
        assert_eq!(
            surface.commands,
            vec![DrawCommand::Ellipse {
                x: 50.0,
                y: 60.0,
                rx: 20.0,
                ry: 16.0,
                color: DEVIL
            }]
        );
    }

    #[test]
    fn test_frame_draws_every_devil() {
        let mut sim = Simulation::new(Tuning::default().with_surface(400.0, 400.0), 1);
        sim.devils.push(Devil::new(50.0, 60.0, 1.0, 20.0));
        sim.devils.push(Devil::new(150.0, 90.0, 1.0, 30.0));

        let mut surface = RecordingSurface::new();
        draw_frame(&sim, &mut surface, false);
        assert_eq!(surface.commands[0], DrawCommand::Clear);
        assert_eq!(surface.ellipses().count(), 2);
        // clear + 3 player rects + 2 devils
        assert_eq!(surface.commands.len(), 6);
    }

    #[test]
    fn test_grid_lines_every_40px() {
        let sim = Simulation::new(Tuning::default().with_surface(400.0, 400.0), 1);
        let mut surface = RecordingSurface::new();
        draw_frame(&sim, &mut surface, true);
        let grid_lines = surface
            .last_frame()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { h, .. } if *h == 1.0))
            .count();
        assert_eq!(grid_lines, 10);
    }
}
