/// Index state of a horizontally scrolling slide carousel with one dot per
/// slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    current: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn has_prev(&self) -> bool {
        self.current > 0
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.len
    }

    pub fn go_to(&mut self, index: usize) -> usize {
        self.current = index.min(self.len.saturating_sub(1));
        self.current
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.current + 1)
    }

    pub fn prev(&mut self) -> usize {
        self.go_to(self.current.saturating_sub(1))
    }

    /// Snaps to the slide nearest to a scroll offset.
    pub fn sync_to_offset(&mut self, scroll_left: f64, slide_width: f64) -> usize {
        if slide_width <= 0.0 || !scroll_left.is_finite() {
            return self.current;
        }
        let nearest = (scroll_left.max(0.0) / slide_width).round() as usize;
        self.go_to(nearest)
    }

    /// Scroll offset that brings the current slide into view.
    pub fn offset(&self, slide_width: f64) -> f64 {
        self.current as f64 * slide_width
    }

    /// One flag per indicator dot, set for the active slide.
    pub fn dots(&self) -> Vec<bool> {
        (0..self.len).map(|i| i == self.current).collect()
    }
}
