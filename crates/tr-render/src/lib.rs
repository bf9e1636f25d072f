pub mod hit;
pub mod paint;

pub use hit::{hit_control_point, hit_link, hit_node, no_link_between};
pub use paint::{render_link, render_node};
