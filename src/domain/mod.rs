// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain data types shared by every other layer:
//   - no Burn types
//   - no file I/O beyond (de)serialising the architecture config
//
// Think of this layer as the vocabulary of the crate: what a
// layer kind, a strategy, an architecture and an image ARE.

/// Closed set of layer families
pub mod layer;

/// The five named initialization strategies
pub mod strategy;

/// JSON architecture description used to build models
pub mod architecture;

/// 8-bit HWC image buffer
pub mod image;
