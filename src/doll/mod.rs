//! The doll gallery and the doll the child has chosen to display.

mod core;
mod gallery_page;

pub use core::{Doll, DollSelection, dolls, find_doll, next_index, previous_index};
pub use gallery_page::{DollState, get_dolls_page, select_doll_endpoint};
