use burn::prelude::*;
use burn::tensor::TensorData;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::dataset::ImageDataset;

/// One pass over an [`ImageDataset`] in shuffled order, without replacement.
///
/// Yields `[b, width * height]` tensors; the final batch holds the remainder
/// and may be smaller than `batch_size`.
pub struct BatchIter<'a, B: Backend> {
    dataset: &'a ImageDataset,
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
    device: B::Device,
}

impl<'a, B: Backend> BatchIter<'a, B> {
    pub fn new<R: Rng>(
        dataset: &'a ImageDataset,
        batch_size: usize,
        rng: &mut R,
        device: B::Device,
    ) -> Self {
        assert!(batch_size > 0, "batch_size must be > 0");
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        order.shuffle(rng);
        BatchIter {
            dataset,
            order,
            batch_size,
            cursor: 0,
            device,
        }
    }

    /// Total number of batches in the pass, including a short final one.
    pub fn num_batches(&self) -> usize {
        self.order.len().div_ceil(self.batch_size)
    }
}

impl<B: Backend> Iterator for BatchIter<'_, B> {
    type Item = Tensor<B, 2>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let indices = &self.order[self.cursor..end];
        self.cursor = end;

        let dim = self.dataset.sample_dim();
        let mut flat = Vec::with_capacity(indices.len() * dim);
        for &i in indices {
            if let Some(sample) = self.dataset.get(i) {
                flat.extend_from_slice(sample);
            }
        }
        Some(Tensor::from_data(
            TensorData::new(flat, [indices.len(), dim]),
            &self.device,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type TestBackend = NdArray;

    fn indexed_dataset(count: usize) -> ImageDataset {
        // Each sample is filled with its own index so batches can be traced back.
        let samples = (0..count).map(|i| vec![i as f32; 4]).collect();
        ImageDataset::from_samples(samples, 2, 2)
    }

    #[test]
    fn test_last_batch_is_short() {
        let dataset = indexed_dataset(10);
        let mut rng = StdRng::seed_from_u64(3);
        let iter = dataset.batches::<TestBackend, _>(4, &mut rng, &Default::default());
        assert_eq!(iter.num_batches(), 3);

        let sizes: Vec<usize> = iter.map(|batch| batch.dims()[0]).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_batch() {
        let dataset = indexed_dataset(8);
        let mut rng = StdRng::seed_from_u64(3);
        let sizes: Vec<usize> = dataset
            .batches::<TestBackend, _>(4, &mut rng, &Default::default())
            .map(|batch| batch.dims()[0])
            .collect();
        assert_eq!(sizes, vec![4, 4]);
    }

    #[test]
    fn test_pass_covers_every_sample_once() {
        let dataset = indexed_dataset(9);
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen: Vec<usize> = Vec::new();
        for batch in dataset.batches::<TestBackend, _>(4, &mut rng, &Default::default()) {
            assert_eq!(batch.dims()[1], 4);
            let values: Vec<f32> = batch.into_data().to_vec().unwrap();
            seen.extend(values.chunks(4).map(|row| row[0] as usize));
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_order_is_shuffled() {
        let dataset = indexed_dataset(64);
        let mut rng = StdRng::seed_from_u64(5);
        let first: Vec<f32> = dataset
            .batches::<TestBackend, _>(64, &mut rng, &Default::default())
            .next()
            .unwrap()
            .into_data()
            .to_vec()
            .unwrap();
        let identity: Vec<f32> = (0..64).flat_map(|i| vec![i as f32; 4]).collect();
        assert_ne!(first, identity);
    }

    #[test]
    fn test_empty_dataset_yields_nothing() {
        let dataset = indexed_dataset(0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut iter = dataset.batches::<TestBackend, _>(4, &mut rng, &Default::default());
        assert_eq!(iter.num_batches(), 0);
        assert!(iter.next().is_none());
    }
}
