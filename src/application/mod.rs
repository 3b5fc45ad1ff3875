// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal
// (fine-tuning on a dataset, or summarizing a piece of text).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct file access (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

// The fine-tuning workflow
pub mod train_use_case;

// The checkpoint-loading / summarization workflow
pub mod summarize_use_case;
