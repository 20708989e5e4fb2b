// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! GPU point picking built on wgpu.
//!
//! pointpick draws a point dataset twice: once on screen in its display
//! colours and once into an offscreen target with every point coloured by
//! its 24-bit id. Reading the single offscreen pixel under the cursor and
//! decoding it identifies the hovered point, which is then labelled and
//! redrawn at highlight size.
//!
//! # Key entry points
//!
//! - [`picking::PickingRenderer`] - the two render passes and the pixel
//!   query
//! - [`picking::codec`] - id <-> RGB encoding
//! - [`interaction::PointerController`] - pointer move -> query -> tooltip
//!   and highlight
//! - [`gpu::RenderSurface`] - the drawing capabilities the renderer needs,
//!   implemented by [`gpu::GpuSurface`] and the CPU
//!   [`gpu::SoftwareSurface`]
//! - [`options::Options`] - dataset, point size and tooltip configuration
//!
//! # Example
//!
//! ```
//! use pointpick::gpu::SoftwareSurface;
//! use pointpick::options::{Options, PickingOptions};
//! use pointpick::picking::PickingRenderer;
//! use pointpick::scene::Dataset;
//!
//! let options = Options::default();
//! let dataset = Dataset::generate(&options.dataset)?;
//! let surface = SoftwareSurface::new(640, 480, options.points);
//! let mut renderer =
//!     PickingRenderer::initialize(surface, &dataset, &PickingOptions::default())?;
//! let id = renderer.query_at(320, 240)?;
//! assert!(id == 0 || dataset.get(id).is_some());
//! # Ok::<(), pointpick::PickError>(())
//! ```

pub mod error;
pub mod gpu;
pub mod input;
pub mod interaction;
pub mod options;
pub mod picking;
pub mod scene;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use error::PickError;
pub use input::InputEvent;
pub use interaction::{HoverOutcome, PointerController};
pub use picking::PickingRenderer;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
