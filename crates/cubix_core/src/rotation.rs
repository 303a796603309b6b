//! # Quarter-Turn Transform
//!
//! Every facelet is pinned to a cubie position and an outward normal in a
//! doubled, centered coordinate frame (`2·i - (N-1)`), so a quarter turn is
//! a plain integer rotation of both vectors:
//!
//! ```text
//!   v' = -(a × v) + a (a · v)        a = outward normal of the turned face
//! ```
//!
//! which is a -90° rotation about `a`, i.e. clockwise seen from outside
//! that face. Frame: x grows left → right, y bottom → top, z back → front.
//!
//! | face  | normal | cubie of facelet (row r, col c) |
//! |-------|--------|---------------------------------|
//! | Up    | +y     | (c, N-1, r)                     |
//! | Left  | -x     | (0, N-1-r, c)                   |
//! | Front | +z     | (c, N-1-r, N-1)                 |
//! | Right | +x     | (N-1, N-1-r, N-1-c)             |
//! | Back  | -z     | (N-1-c, N-1-r, 0)               |
//! | Down  | -y     | (c, 0, N-1-r)                   |

use crate::face::{Axis, Face};
use crate::grid::FaceletGrid;

type Vec3 = [i64; 3];

/// One facelet move of a quarter turn: the color at `from` lands on `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceletMove {
    /// Flat source index.
    pub from: usize,
    /// Flat destination index.
    pub to: usize,
}

const fn normal(face: Face) -> Vec3 {
    match face {
        Face::Up => [0, 1, 0],
        Face::Left => [-1, 0, 0],
        Face::Front => [0, 0, 1],
        Face::Right => [1, 0, 0],
        Face::Back => [0, 0, -1],
        Face::Down => [0, -1, 0],
    }
}

fn face_of(normal: Vec3) -> Face {
    match normal {
        [0, 1, 0] => Face::Up,
        [-1, 0, 0] => Face::Left,
        [0, 0, 1] => Face::Front,
        [1, 0, 0] => Face::Right,
        [0, 0, -1] => Face::Back,
        [0, -1, 0] => Face::Down,
        other => unreachable!("not a face normal: {other:?}"),
    }
}

/// Cubie coordinates `(x, y, z)` in `0..N` of a facelet.
#[cfg(test)]
fn cubie_of(face: Face, row: usize, col: usize, size: usize) -> [usize; 3] {
    let last = size - 1;
    match face {
        Face::Up => [col, last, row],
        Face::Left => [0, last - row, col],
        Face::Front => [col, last - row, last],
        Face::Right => [last, last - row, last - col],
        Face::Back => [last - col, last - row, 0],
        Face::Down => [col, 0, last - row],
    }
}

/// `(row, col)` of the facelet of `cubie` that lies on `face`.
fn facelet_of(face: Face, cubie: [usize; 3], size: usize) -> (usize, usize) {
    let last = size - 1;
    let [x, y, z] = cubie;
    match face {
        Face::Up => (z, x),
        Face::Left => (last - y, z),
        Face::Front => (last - y, x),
        Face::Right => (last - y, last - z),
        Face::Back => (last - y, last - x),
        Face::Down => (last - z, x),
    }
}

#[allow(clippy::cast_possible_wrap)]
fn center(cubie: [usize; 3], size: usize) -> Vec3 {
    let span = (size - 1) as i64;
    cubie.map(|c| 2 * c as i64 - span)
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
fn uncenter(v: Vec3, size: usize) -> [usize; 3] {
    let span = (size - 1) as i64;
    v.map(|c| ((c + span) / 2) as usize)
}

/// Quarter turn of `v` clockwise around the unit vector `a`.
fn quarter_turn(v: Vec3, a: Vec3) -> Vec3 {
    let cross = [
        a[1] * v[2] - a[2] * v[1],
        a[2] * v[0] - a[0] * v[2],
        a[0] * v[1] - a[1] * v[0],
    ];
    let dot = a[0] * v[0] + a[1] * v[1] + a[2] * v[2];
    [
        -cross[0] + a[0] * dot,
        -cross[1] + a[1] * dot,
        -cross[2] + a[2] * dot,
    ]
}

/// Faces a cubie carries stickers on.
fn faces_of(cubie: [usize; 3], size: usize) -> impl Iterator<Item = Face> {
    let last = size - 1;
    let [x, y, z] = cubie;
    Face::ALL.into_iter().filter(move |face| match face {
        Face::Up => y == last,
        Face::Down => y == 0,
        Face::Left => x == 0,
        Face::Right => x == last,
        Face::Front => z == last,
        Face::Back => z == 0,
    })
}

/// Surface cubies of the slab at `depth` along `axis`.
///
/// Outer slabs are full `N × N` cross-sections; inner slabs only have
/// their `4N - 4` perimeter on the surface.
fn slab_cubies(axis: Axis, depth: usize, size: usize) -> Vec<[usize; 3]> {
    let last = size - 1;
    let outer = depth == 0 || depth == last;
    let mut cubies = Vec::with_capacity(if outer { size * size } else { 4 * last });
    for u in 0..size {
        let edge = outer || u == 0 || u == last;
        let mut push = |v: usize| {
            cubies.push(match axis {
                Axis::LeftRight => [depth, u, v],
                Axis::UpDown => [u, depth, v],
                Axis::FrontBack => [u, v, depth],
            });
        };
        if edge {
            (0..size).for_each(&mut push);
        } else {
            push(0);
            push(last);
        }
    }
    cubies
}

/// Computes the facelet permutation of turning `(face, layer)`.
///
/// `layer` must be below `size`.
#[must_use]
pub fn slab_moves(face: Face, layer: usize, size: usize) -> Vec<FaceletMove> {
    debug_assert!(layer < size);
    let last = size - 1;
    let axis_normal = normal(face);
    // Depth along the axis, measured from the low side of the frame.
    let depth = if axis_normal.iter().sum::<i64>() > 0 {
        last - layer
    } else {
        layer
    };
    let flat = |face: Face, row: usize, col: usize| (face.index() * size + row) * size + col;

    let mut moves = Vec::new();
    for cubie in slab_cubies(face.axis(), depth, size) {
        let turned = uncenter(quarter_turn(center(cubie, size), axis_normal), size);
        for sticker in faces_of(cubie, size) {
            let (row, col) = facelet_of(sticker, cubie, size);
            let target = face_of(quarter_turn(normal(sticker), axis_normal));
            let (to_row, to_col) = facelet_of(target, turned, size);
            moves.push(FaceletMove {
                from: flat(sticker, row, col),
                to: flat(target, to_row, to_col),
            });
        }
    }
    moves
}

/// Applies the quarter turn of `(face, layer)` to the grid.
pub(crate) fn apply(grid: &FaceletGrid, face: Face, layer: usize) {
    let moves = slab_moves(face, layer, grid.size());
    let colors: Vec<u8> = moves.iter().map(|m| grid.load(m.from)).collect();
    for (m, color) in moves.iter().zip(colors) {
        grid.store(m.to, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cubie_mapping_roundtrip() {
        let size = 4;
        for face in Face::ALL {
            for row in 0..size {
                for col in 0..size {
                    let cubie = cubie_of(face, row, col, size);
                    assert!(faces_of(cubie, size).any(|f| f == face));
                    assert_eq!(facelet_of(face, cubie, size), (row, col));
                }
            }
        }
    }

    #[test]
    fn test_quarter_turn_up_sends_front_to_left() {
        assert_eq!(quarter_turn(normal(Face::Front), normal(Face::Up)), normal(Face::Left));
        assert_eq!(quarter_turn(normal(Face::Up), normal(Face::Left)), normal(Face::Front));
    }

    #[test]
    fn test_moves_are_a_permutation() {
        for size in 1..=5 {
            for face in Face::ALL {
                for layer in 0..size {
                    let moves = slab_moves(face, layer, size);
                    let from: HashSet<_> = moves.iter().map(|m| m.from).collect();
                    let to: HashSet<_> = moves.iter().map(|m| m.to).collect();
                    assert_eq!(from.len(), moves.len());
                    assert_eq!(from, to, "face {face:?} layer {layer} size {size}");
                }
            }
        }
    }

    #[test]
    fn test_move_counts() {
        let size = 4;
        // Outer slab: face plus a ring of 4N side stickers.
        assert_eq!(slab_moves(Face::Up, 0, size).len(), size * size + 4 * size);
        // Inner slab: only the ring.
        assert_eq!(slab_moves(Face::Up, 1, size).len(), 4 * size);
        // Single-cubie cube: the whole surface turns.
        assert_eq!(slab_moves(Face::Front, 0, 1).len(), 6);
    }

    #[test]
    fn test_up_turn_moves_front_row_to_left() {
        let grid = FaceletGrid::new(3).unwrap();
        apply(&grid, Face::Up, 0);
        for col in 0..3 {
            assert_eq!(grid.color(Face::Left, 0, col), Face::Front as u8);
            assert_eq!(grid.color(Face::Front, 0, col), Face::Right as u8);
            assert_eq!(grid.color(Face::Right, 0, col), Face::Back as u8);
            assert_eq!(grid.color(Face::Back, 0, col), Face::Left as u8);
            assert_eq!(grid.color(Face::Left, 1, col), Face::Left as u8);
        }
    }

    #[test]
    fn test_left_turn_moves_up_column_to_front() {
        let grid = FaceletGrid::new(3).unwrap();
        apply(&grid, Face::Left, 0);
        for row in 0..3 {
            assert_eq!(grid.color(Face::Front, row, 0), Face::Up as u8);
            assert_eq!(grid.color(Face::Down, row, 0), Face::Front as u8);
            assert_eq!(grid.color(Face::Up, row, 0), Face::Back as u8);
            assert_eq!(grid.color(Face::Back, row, 2), Face::Down as u8);
        }
    }

    #[test]
    fn test_face_sticker_turns_clockwise() {
        // Mark the top-left corner of Up, then turn Up.
        let grid = FaceletGrid::new(3).unwrap();
        grid.store(grid.index(Face::Up, 0, 0), 9);
        apply(&grid, Face::Up, 0);
        assert_eq!(grid.color(Face::Up, 0, 2), 9);
    }

    #[test]
    fn test_four_turns_are_identity() {
        let grid = FaceletGrid::new(4).unwrap();
        apply(&grid, Face::Front, 0);
        apply(&grid, Face::Up, 1);
        let before = grid.colors();
        for _ in 0..4 {
            apply(&grid, Face::Right, 2);
        }
        assert_eq!(grid.colors(), before);
    }
}
