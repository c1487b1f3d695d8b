//! Hierarchical clustering structure.
//!
//! A hierarchy is given as one ancestor path per item. From those paths the
//! [`ChildrenIndex`] derives, once, the sibling groups that are embedded
//! together:
//!
//! ```text
//! paths                     children
//! ─────────────────────     ──────────────────────────
//! A  : R                    (R, 0) → {A, B, D}
//! B  : R                    (D, 1) → {C}
//! C  : R.D
//! D  : R.D
//! ```
//!
//! Roots are the distinct first path elements. They need not be items
//! themselves.

mod index;
mod paths;

pub use index::ChildrenIndex;
pub use paths::HierarchyPaths;
