// Decorative tile field drawn behind the task panes.
// Tiles near the mouse pointer are pushed away and lifted, then spring back
// to rest. It knows nothing about tasks.
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

// Tile footprint in terminal cells; cells are roughly twice as tall as wide
const TILE_WIDTH: u16 = 8;
const TILE_HEIGHT: u16 = 4;
const TILE_GAP: u16 = 2;
// Reach of the pointer, in cells
const INFLUENCE_RADIUS: f32 = 18.0;
const PUSH: f32 = 1.2;
const LIFT: f32 = 30.0;
const DAMPING: f32 = 0.88;
const SCALE_EASE: f32 = 0.12;

const TINTS: [(u8, u8, u8); 4] = [
    (232, 230, 240),
    (226, 224, 236),
    (240, 238, 252),
    (222, 216, 250),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    base_x: f32,
    base_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub lift: f32,
    pub scale: f32,
    tint: (u8, u8, u8),
}

impl Tile {
    fn new(base_x: f32, base_y: f32, row: i32, col: i32) -> Tile {
        Tile {
            base_x,
            base_y,
            offset_x: 0.0,
            offset_y: 0.0,
            lift: 0.0,
            scale: 1.0,
            tint: TINTS[tint_index(row, col)],
        }
    }

    fn center(&self) -> (f32, f32) {
        (
            self.base_x + f32::from(TILE_WIDTH) / 2.0,
            self.base_y + f32::from(TILE_HEIGHT) / 2.0,
        )
    }

    // Shade of the tile, lighter while lifted
    fn color(&self) -> Color {
        let boost = (self.lift / LIFT * 24.0).clamp(0.0, 24.0) as u8;
        let (r, g, b) = self.tint;
        Color::Rgb(
            r.saturating_add(boost),
            g.saturating_add(boost),
            b.saturating_add(boost),
        )
    }
}

// Deterministic pick so the pattern is stable across redraws
fn tint_index(row: i32, col: i32) -> usize {
    let mixed = (row.wrapping_mul(73_856_093) ^ col.wrapping_mul(19_349_663)) as u32;
    (mixed % TINTS.len() as u32) as usize
}

#[derive(Debug, Default)]
pub struct TileBackground {
    area: Rect,
    tiles: Vec<Tile>,
    pointer: Option<(f32, f32)>,
}

impl TileBackground {
    // Lay out tiles over `area` with a one-tile margin on every side
    pub fn mount(area: Rect) -> TileBackground {
        let step_x = TILE_WIDTH + TILE_GAP;
        let step_y = TILE_HEIGHT + TILE_GAP;
        let cols = i32::from(area.width.div_ceil(step_x)) + 1;
        let rows = i32::from(area.height.div_ceil(step_y)) + 1;

        let mut tiles = Vec::with_capacity(((rows + 1) * (cols + 1)) as usize);
        for row in -1..rows {
            for col in -1..cols {
                let x = f32::from(area.x) + (col * i32::from(step_x)) as f32;
                let y = f32::from(area.y) + (row * i32::from(step_y)) as f32;
                tiles.push(Tile::new(x, y, row, col));
            }
        }

        TileBackground {
            area,
            tiles,
            pointer: None,
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    // Re-mount when the drawing area changes size
    pub fn resize(&mut self, area: Rect) {
        if area != self.area {
            let pointer = self.pointer;
            *self = TileBackground::mount(area);
            self.pointer = pointer;
        }
    }

    pub fn set_pointer(&mut self, pointer: Option<(u16, u16)>) {
        self.pointer = pointer.map(|(x, y)| (f32::from(x), f32::from(y)));
    }

    // Advance one animation frame
    pub fn tick(&mut self) {
        for tile in &mut self.tiles {
            if let Some((px, py)) = self.pointer {
                let (cx, cy) = tile.center();
                let dx = px - cx;
                // Cells are tall, so vertical distance counts double
                let dy = (py - cy) * 2.0;
                let distance = (dx * dx + dy * dy).sqrt();

                if distance < INFLUENCE_RADIUS {
                    let force = (INFLUENCE_RADIUS - distance) / INFLUENCE_RADIUS;
                    let angle = dy.atan2(dx);
                    tile.offset_x -= angle.cos() * force * PUSH;
                    tile.offset_y -= angle.sin() * force * PUSH / 2.0;
                    tile.lift = force * LIFT;
                    tile.scale = 1.0 + force * 0.15;
                }
            }

            tile.offset_x *= DAMPING;
            tile.offset_y *= DAMPING;
            tile.lift *= DAMPING;
            tile.scale += (1.0 - tile.scale) * SCALE_EASE;
        }
    }
}

impl Widget for &TileBackground {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let clip = area.intersection(buf.area);
        for tile in &self.tiles {
            let x0 = (tile.base_x + tile.offset_x).round() as i32;
            let y0 = (tile.base_y + tile.offset_y).round() as i32;
            // Grow symmetrically with scale
            let width = (f32::from(TILE_WIDTH) * tile.scale).round() as i32;
            let height = (f32::from(TILE_HEIGHT) * tile.scale).round() as i32;
            let x0 = x0 - (width - i32::from(TILE_WIDTH)) / 2;
            let y0 = y0 - (height - i32::from(TILE_HEIGHT)) / 2;
            let color = tile.color();

            for y in y0.max(i32::from(clip.top()))..(y0 + height).min(i32::from(clip.bottom())) {
                for x in x0.max(i32::from(clip.left()))..(x0 + width).min(i32::from(clip.right())) {
                    buf.get_mut(x as u16, y as u16).set_bg(color);
                }
            }
        }
    }
}
