use std::thread;

use ndarray::{ArrayViewMut2, Axis};

/// Sizes of `n` contiguous parts covering `len` items. The first
/// `len % n` parts get one extra item.
pub fn part_sizes(len: usize, n: usize) -> Vec<usize> {
    assert!(n > 0, "cannot split into zero parts");
    let size = len / n;
    let size_xtra = len % n;
    (0..n)
        .map(|i| if i < size_xtra { size + 1 } else { size })
        .collect()
}

/// Something that can be cut into disjoint pieces which are then worked on
/// independently.
pub trait Split: Sized {
    fn split_parts(self, n: usize) -> Vec<Self>;
}

/// A run of consecutive rows of a 2D buffer, remembering where it sits in
/// the full buffer.
#[derive(Debug)]
pub struct RowBand<'a, T> {
    pub first_row: usize,
    pub rows: ArrayViewMut2<'a, T>,
}

impl<'a, T> RowBand<'a, T> {
    pub fn new(rows: ArrayViewMut2<'a, T>) -> Self {
        Self { first_row: 0, rows }
    }
}

impl<'a, T> Split for RowBand<'a, T> {
    fn split_parts(self, n: usize) -> Vec<Self> {
        let mut first_row = self.first_row;
        let mut rest = self.rows;
        let mut parts = vec![];
        for size in part_sizes(rest.nrows(), n) {
            let (head, tail) = rest.split_at(Axis(0), size);
            parts.push(RowBand {
                first_row,
                rows: head,
            });
            first_row += size;
            rest = tail;
        }
        parts
    }
}

/// Splits `whole` into `n` parts and runs `f` on each part in its own
/// scoped thread. Returns once every part is done.
pub fn fan_out<P, F>(whole: P, n: usize, f: F)
where
    P: Split + Send,
    F: Fn(P) + Sync,
{
    let mut parts = whole.split_parts(n.max(1));
    if parts.len() == 1 {
        if let Some(part) = parts.pop() {
            f(part);
        }
        return;
    }
    let f = &f;
    thread::scope(|scope| {
        for part in parts {
            scope.spawn(move || f(part));
        }
    });
}

#[test]
fn test_part_sizes() {
    assert_eq!(part_sizes(10, 3), vec![4, 3, 3]);
    assert_eq!(part_sizes(2, 4), vec![1, 1, 0, 0]);
    assert_eq!(part_sizes(9, 3), vec![3, 3, 3]);
}

#[test]
fn test_row_bands_cover_rows() {
    let mut a = ndarray::Array2::<usize>::zeros((7, 3));
    let bands = RowBand::new(a.view_mut()).split_parts(3);
    let starts: Vec<(usize, usize)> = bands
        .iter()
        .map(|b| (b.first_row, b.rows.nrows()))
        .collect();
    assert_eq!(starts, vec![(0, 3), (3, 2), (5, 2)]);
}

#[test]
fn test_fan_out_writes_every_row_once() {
    let mut a = ndarray::Array2::<usize>::zeros((13, 5));
    fan_out(RowBand::new(a.view_mut()), 4, |band| {
        let first = band.first_row;
        let mut rows = band.rows;
        for (i, mut row) in rows.outer_iter_mut().enumerate() {
            row.fill(first + i + 1);
        }
    });
    for (y, row) in a.outer_iter().enumerate() {
        assert!(row.iter().all(|&v| v == y + 1));
    }
}
