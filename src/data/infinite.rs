// ============================================================
// Layer 4 - Infinite Iteration
// ============================================================
// Turns finite passes over data into an endless stream.
//
//   InfiniteIter  - wraps a pass factory (e.g. `|| loader.iter()`
//                   over a Burn DataLoader) and calls it again
//                   each time a pass runs dry
//   CyclicCursor  - index cursor over a Burn Dataset that wraps
//                   to index 0 after the last item
//
// Both are pull-based and single-threaded. Items come out in the
// order the underlying pass produces them; shuffling, if any,
// is the loader's business.
//
// A source that produces nothing would loop forever, so an empty
// pass ends the stream instead.

use burn::data::dataset::Dataset;
use std::marker::PhantomData;

enum PassState<It> {
    /// A pass is in progress.
    Active(It),
    /// The next pull starts a new pass.
    Restart,
    /// A fresh pass yielded nothing; the stream is over.
    Exhausted,
}

/// Endless iterator over repeated passes produced by `factory`.
pub struct InfiniteIter<F, It> {
    factory: F,
    state:   PassState<It>,
    passes:  usize,
    in_pass: usize,
}

impl<F, It> InfiniteIter<F, It>
where
    F: FnMut() -> It,
    It: Iterator,
{
    /// The first pass is created lazily on the first `next()`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            state: PassState::Restart,
            passes: 0,
            in_pass: 0,
        }
    }

    /// Number of passes that ran to completion.
    pub fn passes_completed(&self) -> usize {
        self.passes
    }
}

impl<F, It> Iterator for InfiniteIter<F, It>
where
    F: FnMut() -> It,
    It: Iterator,
{
    type Item = It::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.state {
                PassState::Active(pass) => match pass.next() {
                    Some(item) => {
                        self.in_pass += 1;
                        return Some(item);
                    }
                    None if self.in_pass == 0 => {
                        tracing::warn!("Data source produced an empty pass, stopping");
                        self.state = PassState::Exhausted;
                        return None;
                    }
                    None => {
                        self.passes += 1;
                        self.in_pass = 0;
                        self.state = PassState::Restart;
                        tracing::trace!("Pass {} finished, restarting", self.passes);
                    }
                },
                PassState::Restart => {
                    self.state = PassState::Active((self.factory)());
                }
                PassState::Exhausted => return None,
            }
        }
    }
}

/// Cursor that cycles over a dataset's indices forever.
pub struct CyclicCursor<D, I> {
    dataset:  D,
    position: usize,
    epoch:    usize,
    _item:    PhantomData<fn() -> I>,
}

impl<D, I> CyclicCursor<D, I>
where
    D: Dataset<I>,
{
    pub fn new(dataset: D) -> Self {
        Self {
            dataset,
            position: 0,
            epoch: 0,
            _item: PhantomData,
        }
    }

    /// Completed passes over the dataset.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Index of the next item to be yielded.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<D, I> Iterator for CyclicCursor<D, I>
where
    D: Dataset<I>,
{
    type Item = I;

    fn next(&mut self) -> Option<I> {
        let len = self.dataset.len();
        if len == 0 {
            return None;
        }

        let item = self.dataset.get(self.position)?;
        self.position += 1;
        if self.position == len {
            self.position = 0;
            self.epoch += 1;
        }
        Some(item)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        batcher::ImageBatcher,
        dataset::{ImageDataset, ImageSample, PairDataset},
    };
    use burn::{backend::NdArray, data::dataloader::DataLoaderBuilder};

    #[test]
    fn test_repeats_passes_in_order() {
        let data = vec![1, 2, 3, 4];
        let mut stream = InfiniteIter::new(|| data.clone().into_iter());

        let pulled: Vec<i32> = stream.by_ref().take(3 * data.len()).collect();
        assert_eq!(pulled, [data.clone(), data.clone(), data.clone()].concat());
        // the third pass is done but its end has not been observed yet
        assert_eq!(stream.passes_completed(), 2);
        assert_eq!(stream.next(), Some(1));
        assert_eq!(stream.passes_completed(), 3);
    }

    #[test]
    fn test_empty_source_ends_stream() {
        let mut calls = 0;
        let mut stream = InfiniteIter::new(|| {
            calls += 1;
            std::iter::empty::<u8>()
        });
        assert_eq!(stream.next(), None);
        assert_eq!(stream.next(), None);
        drop(stream);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_wraps_a_data_loader() {
        let samples: Vec<ImageSample> = (0..4)
            .map(|i| ImageSample::new(vec![i as f32; 4], [1, 2, 2], i).unwrap())
            .collect();
        let batcher = ImageBatcher::<NdArray>::new(Default::default());
        let loader = DataLoaderBuilder::new(batcher)
            .batch_size(2)
            .build(ImageDataset::new(samples).unwrap());

        let labels: Vec<Vec<i64>> = InfiniteIter::new(|| loader.iter())
            .take(5)
            .map(|(_, labels)| labels.into_data().convert::<i64>().to_vec::<i64>().unwrap())
            .collect();

        assert_eq!(
            labels,
            vec![vec![0, 1], vec![2, 3], vec![0, 1], vec![2, 3], vec![0, 1]]
        );
    }

    #[test]
    fn test_cursor_epoch_and_position() {
        let dataset = PairDataset::new(vec![("a", 0), ("b", 1), ("c", 2)]);
        let mut cursor = CyclicCursor::new(dataset);
        assert_eq!((cursor.epoch(), cursor.position()), (0, 0));

        let first: Vec<_> = cursor.by_ref().take(3).collect();
        assert_eq!(first, vec![("a", 0), ("b", 1), ("c", 2)]);
        assert_eq!((cursor.epoch(), cursor.position()), (1, 0));

        assert_eq!(cursor.next(), Some(("a", 0)));
        assert_eq!((cursor.epoch(), cursor.position()), (1, 1));

        let rest: Vec<_> = cursor.by_ref().take(5).map(|(x, _)| x).collect();
        assert_eq!(rest, vec!["b", "c", "a", "b", "c"]);
        assert_eq!((cursor.epoch(), cursor.position()), (3, 0));
    }

    #[test]
    fn test_cursor_over_empty_dataset() {
        let mut cursor = CyclicCursor::new(PairDataset::<u8, u8>::new(Vec::new()));
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.epoch(), 0);
    }
}
