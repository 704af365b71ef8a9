// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Everything that touches the filesystem or the terminal:
//
//   checkpoint.rs  - save/restore parameter mappings with Burn
//                    records, including the "module." prefix
//                    convention of data-parallel checkpoints
//
//   logger.rs      - terminal + file transcript logger
//
//   image_store.rs - writes sample images (128x128, bicubic)
//
//   fs.rs          - idempotent directory creation
//
// Reference: Rust Book §9 (Error Handling)
//            Burn Book §5 (Checkpointing)

/// Checkpoint save and restore
pub mod checkpoint;

/// Dual-sink (terminal + file) logger
pub mod logger;

/// Sample image writer
pub mod image_store;

/// mkdir / mkdirs helpers
pub mod fs;
