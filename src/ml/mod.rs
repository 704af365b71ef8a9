// ============================================================
// Layer 5 - ML Layer (Burn)
// ============================================================
// Everything that manipulates tensors lives here.
//
//   model.rs       - Model / Layer / Parameter containers and
//                    the ordered ParameterMap (state dict)
//
//   initializer.rs - the five weight initialization strategies,
//                    dispatched per LayerKind
//
//   setup.rs       - seed handling, init_model, backend alias
//
//   image.rs       - denormalize + tensor → 8-bit image array
//
//   accuracy.rs    - argmax classification accuracy
//
// Reference: Burn Book §3 (Building Blocks)
//            Glorot & Bengio (2010), He et al. (2015)

/// Parameter containers the helpers mutate
pub mod model;

/// Weight initialization strategies
pub mod initializer;

/// Seeding and model bootstrap
pub mod setup;

/// Tensor/image conversion
pub mod image;

/// Classification accuracy
pub mod accuracy;
