// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Feeds samples to a training driver without ever running dry.
//
//   ImageDataset / PairDataset  → implement Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher                → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader (Burn)           → one finite pass per call to iter()
//       │
//       ▼
//   InfiniteIter                → restarts the pass when it ends
//
// CyclicCursor does the same directly over a Dataset when no
// batching is needed.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// In-memory datasets implementing Burn's Dataset trait
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Endless iteration over finite passes
pub mod infinite;
