//! Food placement
//!
//! Picks a uniformly random free cell without rejection sampling, so a
//! nearly full board costs one pass over the grid and a full board
//! returns `None` instead of spinning.

use rand::Rng;

use super::state::{Position, Snake};

/// Choose a free cell uniformly at random, or `None` if the snake covers the grid
pub fn place_food<R: Rng + ?Sized>(rng: &mut R, snake: &Snake, grid_size: usize) -> Option<Position> {
    let mut free = free_cells(snake, grid_size);
    let count = free.clone().count();
    if count == 0 {
        return None;
    }

    let index = rng.gen_range(0..count);
    free.nth(index)
}

/// Free cells in row-major order
fn free_cells(snake: &Snake, grid_size: usize) -> impl Iterator<Item = Position> + Clone + '_ {
    let size = grid_size as i32;
    (0..size)
        .flat_map(move |y| (0..size).map(move |x| Position::new(x, y)))
        .filter(move |pos| !snake.occupies(*pos))
}
