//! Image artifacts produced by a run: sample grids, the training GIF and the
//! loss curve.

mod animation;
mod grid;
mod plot;

pub use animation::save_gif;
pub use grid::{grid_from_tensor, load_png, make_grid, save_png, to_gray, GridLayout};
pub use plot::{plot_losses, save_loss_plot};
