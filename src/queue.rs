//! Deferred draws for translucent images
//!
//! Translucent bitmaps are not blitted when drawn. They are recorded here
//! with the depth that was current at the call, and flushed in ascending
//! depth order when the frame is processed.

use crate::bitmap::Bitmap;
use crate::color::Color;

/// One pending translucent blit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawRequest {
    pub bitmap: Bitmap,
    pub depth: i32,
    pub x: i32,
    pub y: i32,
    /// Color-key swap `(from, to)` applied during the blit
    pub recolor: Option<(Color, Color)>,
}

#[derive(Clone, Debug, Default)]
pub struct DeferredDrawQueue {
    requests: Vec<DrawRequest>,
}

impl DeferredDrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: DrawRequest) {
        self.requests.push(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    /// Take every pending request, sorted by ascending depth.
    /// The sort is stable: equal depths keep their submission order.
    pub fn drain_sorted(&mut self) -> Vec<DrawRequest> {
        let mut requests = std::mem::take(&mut self.requests);
        requests.sort_by_key(|r| r.depth);
        requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(depth: i32, x: i32) -> DrawRequest {
        DrawRequest {
            bitmap: Bitmap::new(1, 1),
            depth,
            x,
            y: 0,
            recolor: None,
        }
    }

    #[test]
    fn test_drain_sorts_by_depth() {
        let mut queue = DeferredDrawQueue::new();
        queue.push(request(3, 0));
        queue.push(request(1, 1));
        queue.push(request(2, 2));

        let depths: Vec<i32> = queue.drain_sorted().iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_depths_keep_submission_order() {
        let mut queue = DeferredDrawQueue::new();
        queue.push(request(5, 10));
        queue.push(request(0, 11));
        queue.push(request(5, 12));
        queue.push(request(5, 13));

        let xs: Vec<i32> = queue.drain_sorted().iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![11, 10, 12, 13]);
    }
}
