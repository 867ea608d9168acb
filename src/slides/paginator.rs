/// Sections shown per slide.
pub const PAGE_SIZE: usize = 4;

/// Groups items into consecutive pages of at most `page_size`, keeping order.
/// A page size of zero is treated as one.
pub fn paginate<T: Clone>(items: &[T], page_size: usize) -> Vec<Vec<T>> {
    items
        .chunks(page_size.max(1))
        .map(<[T]>::to_vec)
        .collect()
}
