// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers for one CLI command each.
//
// Rules for this layer:
//   - No tensor math here (that's Layer 5)
//   - No argument parsing or printing (that's Layer 1)
//   - Errors carry anyhow context for the user
//
// Reference: Clean Architecture pattern

/// Build, initialize and checkpoint a model
pub mod init_use_case;

/// Summarise the parameters stored in a checkpoint
pub mod inspect_use_case;

/// Draw a convolution filter as an image
pub mod render_use_case;
