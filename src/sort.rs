//! In-place comparison sorts used by the array-backed collection.

use std::mem;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum SortAlgorithm {
    Selection,
    Insertion,
    Merge,
    #[default]
    Quick,
}

pub const ALL_ALGORITHMS: [SortAlgorithm; 4] = [
    SortAlgorithm::Selection,
    SortAlgorithm::Insertion,
    SortAlgorithm::Merge,
    SortAlgorithm::Quick,
];

impl SortAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            SortAlgorithm::Selection => "selection_sort",
            SortAlgorithm::Insertion => "insertion_sort",
            SortAlgorithm::Merge => "merge_sort",
            SortAlgorithm::Quick => "quick_sort",
        }
    }

    /// Sorts `data` ascending with this algorithm.
    pub fn sort<T: Ord + Clone>(self, data: &mut [T]) {
        match self {
            SortAlgorithm::Selection => selection_sort(data),
            SortAlgorithm::Insertion => insertion_sort(data),
            SortAlgorithm::Merge => merge_sort(data),
            SortAlgorithm::Quick => quick_sort(data),
        }
    }
}

pub fn selection_sort<T: Ord>(data: &mut [T]) {
    let len = data.len();
    for i in 0..len {
        let mut min = i;
        for j in i + 1..len {
            if data[j] < data[min] {
                min = j;
            }
        }
        data.swap(i, min);
    }
}

/// Stable.
pub fn insertion_sort<T: Ord>(data: &mut [T]) {
    for i in 1..data.len() {
        let mut j = i;
        while j > 0 && data[j - 1] > data[j] {
            data.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Top-down merge sort. Stable, allocates one scratch copy of `data`.
pub fn merge_sort<T: Ord + Clone>(data: &mut [T]) {
    if data.len() < 2 {
        return;
    }
    let mut scratch = data.to_vec();
    merge_sort_recursive(&mut scratch, data);
}

// `src` and `dst` hold the same elements on entry; `dst` ends up sorted.
fn merge_sort_recursive<T: Ord + Clone>(src: &mut [T], dst: &mut [T]) {
    let len = dst.len();
    if len < 2 {
        return;
    }
    let mid = len / 2;
    merge_sort_recursive(&mut dst[..mid], &mut src[..mid]);
    merge_sort_recursive(&mut dst[mid..], &mut src[mid..]);

    if src[mid - 1] <= src[mid] {
        dst.clone_from_slice(src);
        return;
    }

    let (mut i, mut j) = (0, mid);
    for slot in dst.iter_mut() {
        if j == len || (i < mid && src[i] <= src[j]) {
            *slot = src[i].clone();
            i += 1;
        } else {
            *slot = src[j].clone();
            j += 1;
        }
    }
}

/// Quick sort partitioning around the first element.
///
/// Recurses into the smaller side only, so stack depth stays logarithmic even
/// though sorted input still costs quadratic time.
pub fn quick_sort<T: Ord>(mut data: &mut [T]) {
    while data.len() > 1 {
        let pivot = partition(data);
        let (left, right) = mem::take(&mut data).split_at_mut(pivot);
        let right = &mut right[1..];
        if left.len() < right.len() {
            quick_sort(left);
            data = right;
        } else {
            quick_sort(right);
            data = left;
        }
    }
}

/// Lomuto partition with `data[0]` as pivot; returns the pivot's final index.
fn partition<T: Ord>(data: &mut [T]) -> usize {
    let mut store = 0;
    for i in 1..data.len() {
        if data[i] < data[0] {
            store += 1;
            data.swap(store, i);
        }
    }
    data.swap(0, store);
    store
}
